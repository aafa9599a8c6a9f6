use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    let _span = tracing::info_span!("request", id = %req.id, method = %req.method).entered();
    let resp = dispatch(state, &req);
    state.drain_changes();
    resp
}

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(resp) = handlers::core::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::students::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::teachers::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::classes::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::notices::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::timetable::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::dashboard::try_handle(state, req) {
        return resp;
    }
    if let Some(resp) = handlers::analytics::try_handle(state, req) {
        return resp;
    }

    tracing::warn!(method = %req.method, "unknown method");
    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
