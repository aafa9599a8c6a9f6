use crate::ipc::error::{bad_params, db_failed, ok, ParamError};
use crate::ipc::helpers::{matches_search, required_positive_u32, required_str, search_term};
use crate::ipc::types::{AppState, Request};
use crate::model::NewClass;
use serde_json::json;

const UNASSIGNED: &str = "Unassigned";

fn handle_classes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let needle = match search_term(&req.params) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    let classes = match state.store.classes() {
        Ok(v) => v,
        Err(e) => return db_failed(&req.id, "db_query_failed", e),
    };
    let teachers = match state.store.teachers() {
        Ok(v) => v,
        Err(e) => return db_failed(&req.id, "db_query_failed", e),
    };
    let students = match state.store.students() {
        Ok(v) => v,
        Err(e) => return db_failed(&req.id, "db_query_failed", e),
    };

    // Counts and teacher names are resolved here so the table needs no joins.
    let rows: Vec<serde_json::Value> = classes
        .iter()
        .filter(|c| matches_search(needle.as_deref(), &[c.name.as_str()]))
        .map(|c| {
            let teacher_name = teachers
                .iter()
                .find(|t| t.id == c.teacher_id)
                .map(|t| t.name.as_str())
                .unwrap_or(UNASSIGNED);
            let student_count = students.iter().filter(|s| s.class_id == c.id).count();
            let mut row = json!(c);
            row["teacherName"] = json!(teacher_name);
            row["studentCount"] = json!(student_count);
            row
        })
        .collect();

    ok(&req.id, json!({ "classes": rows }))
}

fn parse_new_class(params: &serde_json::Value) -> Result<NewClass, ParamError> {
    Ok(NewClass {
        name: required_str(params, "name")?,
        teacher_id: required_str(params, "teacherId")?,
        capacity: required_positive_u32(params, "capacity")?,
    })
}

fn handle_classes_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new = match parse_new_class(&req.params) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    match state.store.add_class(new) {
        Ok(class) => {
            tracing::info!(id = %class.id, teacher_id = %class.teacher_id, "class created");
            if let Ok(None) = state.store.find_teacher(&class.teacher_id) {
                tracing::debug!(teacher_id = %class.teacher_id, "teacherId matches no teacher");
            }
            ok(&req.id, json!({ "class": class }))
        }
        Err(e) => db_failed(&req.id, "db_insert_failed", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(handle_classes_list(state, req)),
        "classes.create" => Some(handle_classes_create(state, req)),
        _ => None,
    }
}
