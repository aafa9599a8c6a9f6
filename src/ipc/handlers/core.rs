use crate::ipc::error::{bad_params, db_failed, ok, ParamError};
use crate::ipc::types::{AppState, Request};
use crate::store::Store;
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "revision": state.store.revision(),
        }),
    )
}

fn snapshot(store: &Store) -> anyhow::Result<serde_json::Value> {
    let students = store.students()?;
    let teachers = store.teachers()?;
    let classes = store.classes()?;
    let notices = store.notices()?;
    Ok(json!({
        "students": students,
        "teachers": teachers,
        "classes": classes,
        "notices": notices,
        "subjects": store.subjects(),
        "revision": store.revision(),
    }))
}

fn handle_store_snapshot(state: &mut AppState, req: &Request) -> serde_json::Value {
    match snapshot(&state.store) {
        Ok(v) => ok(&req.id, v),
        Err(e) => db_failed(&req.id, "db_query_failed", e),
    }
}

fn handle_store_changes(state: &mut AppState, req: &Request) -> serde_json::Value {
    let since = match req.params.get("sinceRevision") {
        None | Some(serde_json::Value::Null) => 0,
        Some(v) => match v.as_u64() {
            Some(n) => n,
            None => {
                return bad_params(
                    &req.id,
                    ParamError::new("sinceRevision", "sinceRevision must be a non-negative integer"),
                )
            }
        },
    };
    state.drain_changes();
    ok(
        &req.id,
        json!({
            "events": state.changes_since(since),
            "revision": state.store.revision(),
        }),
    )
}

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "subjects": state.store.subjects() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "store.snapshot" => Some(handle_store_snapshot(state, req)),
        "store.changes" => Some(handle_store_changes(state, req)),
        "subjects.list" => Some(handle_subjects_list(state, req)),
        _ => None,
    }
}
