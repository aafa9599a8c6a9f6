use crate::ipc::error::{bad_params, db_failed, ok, ParamError};
use crate::ipc::helpers::{matches_search, optional_status, required_str, search_term, string_list};
use crate::ipc::types::{AppState, Request};
use crate::model::NewTeacher;
use serde_json::json;

fn handle_teachers_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let needle = match search_term(&req.params) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    match state.store.teachers() {
        Ok(teachers) => {
            let teachers: Vec<_> = teachers
                .into_iter()
                .filter(|t| matches_search(needle.as_deref(), &[t.name.as_str(), t.email.as_str()]))
                .collect();
            ok(&req.id, json!({ "teachers": teachers }))
        }
        Err(e) => db_failed(&req.id, "db_query_failed", e),
    }
}

fn parse_new_teacher(params: &serde_json::Value) -> Result<NewTeacher, ParamError> {
    let subjects = string_list(params, "subjects")?;
    if subjects.is_empty() {
        return Err(ParamError::new("subjects", "at least one subject is required"));
    }
    Ok(NewTeacher {
        name: required_str(params, "name")?,
        email: required_str(params, "email")?,
        password: required_str(params, "password")?,
        subjects,
        classes: string_list(params, "classes")?,
        status: optional_status(params, "status")?,
        total_quizzes: None,
    })
}

fn handle_teachers_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new = match parse_new_teacher(&req.params) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    match state.store.add_teacher(new) {
        Ok(teacher) => {
            tracing::info!(id = %teacher.id, subjects = teacher.subjects.len(), "teacher created");
            ok(&req.id, json!({ "teacher": teacher }))
        }
        Err(e) => db_failed(&req.id, "db_insert_failed", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.list" => Some(handle_teachers_list(state, req)),
        "teachers.create" => Some(handle_teachers_create(state, req)),
        _ => None,
    }
}
