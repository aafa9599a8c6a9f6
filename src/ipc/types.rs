use std::sync::mpsc::Receiver;

use serde::Deserialize;

use crate::model::StoreEvent;
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub store: Store,
    changes: Receiver<StoreEvent>,
    change_log: Vec<StoreEvent>,
}

impl AppState {
    pub fn new() -> anyhow::Result<Self> {
        let mut store = Store::open()?;
        let changes = store.subscribe();
        Ok(Self {
            store,
            changes,
            change_log: Vec::new(),
        })
    }

    /// Moves pending store notifications into the session change log.
    pub fn drain_changes(&mut self) {
        for event in self.changes.try_iter() {
            tracing::info!(
                revision = event.revision,
                collection = ?event.collection,
                kind = ?event.kind,
                id = %event.id,
                "record changed"
            );
            self.change_log.push(event);
        }
    }

    pub fn changes_since(&self, revision: u64) -> &[StoreEvent] {
        let start = self.change_log.partition_point(|e| e.revision <= revision);
        &self.change_log[start..]
    }
}
