use crate::ipc::error::{db_failed, ok};
use crate::ipc::types::{AppState, Request};
use crate::stats;
use crate::store::Store;
use serde_json::json;

fn overview(store: &Store) -> anyhow::Result<stats::AnalyticsOverview> {
    let students = store.students()?;
    let teachers = store.teachers()?;
    let classes = store.classes()?;
    let notices = store.notices()?;
    Ok(stats::analytics_overview(
        &students, &teachers, &classes, &notices,
    ))
}

fn handle_analytics_overview(state: &mut AppState, req: &Request) -> serde_json::Value {
    match overview(&state.store) {
        Ok(o) => ok(&req.id, json!(o)),
        Err(e) => db_failed(&req.id, "db_query_failed", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "analytics.overview" => Some(handle_analytics_overview(state, req)),
        _ => None,
    }
}
