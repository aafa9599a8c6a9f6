use crate::ipc::error::{bad_params, db_failed, ok, ParamError};
use crate::ipc::helpers::{
    matches_search, optional_str, required_audience, required_priority, required_str,
    search_term,
};
use crate::ipc::types::{AppState, Request};
use crate::model::NewNotice;
use serde_json::json;

fn handle_notices_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let needle = match search_term(&req.params) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    match state.store.notices() {
        Ok(notices) => {
            let notices: Vec<_> = notices
                .into_iter()
                .filter(|n| {
                    matches_search(needle.as_deref(), &[n.title.as_str(), n.content.as_str()])
                })
                .collect();
            ok(&req.id, json!({ "notices": notices }))
        }
        Err(e) => db_failed(&req.id, "db_query_failed", e),
    }
}

fn parse_new_notice(params: &serde_json::Value) -> Result<NewNotice, ParamError> {
    // Stored zero-padded so explicit and defaulted dates share one format.
    let date = match optional_str(params, "date")? {
        None => None,
        Some(raw) => match chrono::NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(d) => Some(d.format("%Y-%m-%d").to_string()),
            Err(_) => return Err(ParamError::new("date", "date must be YYYY-MM-DD")),
        },
    };
    Ok(NewNotice {
        title: required_str(params, "title")?,
        content: required_str(params, "content")?,
        priority: required_priority(params, "priority")?,
        audience: required_audience(params, "audience")?,
        date,
        author: optional_str(params, "author")?,
    })
}

fn handle_notices_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new = match parse_new_notice(&req.params) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    match state.store.add_notice(new) {
        Ok(notice) => {
            tracing::info!(id = %notice.id, priority = notice.priority.as_str(), "notice posted");
            ok(&req.id, json!({ "notice": notice }))
        }
        Err(e) => db_failed(&req.id, "db_insert_failed", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "notices.list" => Some(handle_notices_list(state, req)),
        "notices.create" => Some(handle_notices_create(state, req)),
        _ => None,
    }
}
