use crate::ipc::error::{db_failed, ok};
use crate::ipc::types::{AppState, Request};
use crate::stats;
use crate::store::Store;
use serde_json::json;

fn summary(store: &Store) -> anyhow::Result<stats::DashboardSummary> {
    let students = store.students()?;
    let teachers = store.teachers()?;
    let classes = store.classes()?;
    let notices = store.notices()?;
    Ok(stats::dashboard_summary(
        &students, &teachers, &classes, &notices,
    ))
}

fn handle_dashboard_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    match summary(&state.store) {
        Ok(s) => ok(&req.id, json!(s)),
        Err(e) => db_failed(&req.id, "db_query_failed", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(handle_dashboard_summary(state, req)),
        _ => None,
    }
}
