use crate::ipc::error::{bad_params, db_failed, err, ok, ParamError};
use crate::ipc::helpers::{
    matches_search, optional_percent, optional_status, required_str, search_term,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{NewStudent, StudentPatch};
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let needle = match search_term(&req.params) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    let students = match state.store.students() {
        Ok(v) => v,
        Err(e) => return db_failed(&req.id, "db_query_failed", e),
    };
    let classes = match state.store.classes() {
        Ok(v) => v,
        Err(e) => return db_failed(&req.id, "db_query_failed", e),
    };

    let rows: Vec<serde_json::Value> = students
        .iter()
        .filter(|s| {
            matches_search(
                needle.as_deref(),
                &[s.name.as_str(), s.email.as_str(), s.roll_number.as_str()],
            )
        })
        .map(|s| {
            // Dangling classId renders as the raw id.
            let class_name = classes
                .iter()
                .find(|c| c.id == s.class_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| s.class_id.clone());
            let mut row = json!(s);
            row["className"] = json!(class_name);
            row
        })
        .collect();

    ok(&req.id, json!({ "students": rows }))
}

fn parse_new_student(params: &serde_json::Value) -> Result<NewStudent, ParamError> {
    Ok(NewStudent {
        name: required_str(params, "name")?,
        email: required_str(params, "email")?,
        password: required_str(params, "password")?,
        roll_number: required_str(params, "rollNumber")?,
        class_id: required_str(params, "classId")?,
        status: optional_status(params, "status")?,
        average_score: optional_percent(params, "averageScore")?,
        attendance: optional_percent(params, "attendance")?,
    })
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let new = match parse_new_student(&req.params) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    match state.store.add_student(new) {
        Ok(student) => {
            tracing::info!(id = %student.id, class_id = %student.class_id, "student created");
            if let Ok(None) = state.store.find_class(&student.class_id) {
                tracing::debug!(class_id = %student.class_id, "classId matches no class");
            }
            ok(&req.id, json!({ "student": student }))
        }
        Err(e) => db_failed(&req.id, "db_insert_failed", e),
    }
}

fn parse_student_patch(params: &serde_json::Value) -> Result<StudentPatch, ParamError> {
    Ok(StudentPatch {
        status: optional_status(params, "status")?,
        average_score: optional_percent(params, "averageScore")?,
        attendance: optional_percent(params, "attendance")?,
    })
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(&req.params, "studentId") {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    let patch = match parse_student_patch(&req.params) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    match state.store.update_student(&student_id, patch) {
        Ok(Some(student)) => ok(&req.id, json!({ "student": student })),
        Ok(None) => err(&req.id, "not_found", "student not found", None),
        Err(e) => db_failed(&req.id, "db_update_failed", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        _ => None,
    }
}
