use crate::ipc::error::{bad_params, db_failed, ok, ParamError};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use crate::model::{TimetableSlot, DAYS, TIME_SLOTS};
use serde_json::json;

fn grid_value(params: &serde_json::Value, key: &str, grid: &[&str]) -> Result<String, ParamError> {
    let raw = required_str(params, key)?;
    if grid.contains(&raw.as_str()) {
        Ok(raw)
    } else {
        Err(ParamError::new(key, format!("{key} must be one of: {}", grid.join(", "))))
    }
}

fn handle_timetable_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(&req.params, "classId") {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    match state.store.timetable(&class_id) {
        Ok(slots) => ok(
            &req.id,
            json!({
                "classId": class_id,
                "days": DAYS,
                "timeSlots": TIME_SLOTS,
                "slots": slots,
            }),
        ),
        Err(e) => db_failed(&req.id, "db_query_failed", e),
    }
}

fn parse_slot(params: &serde_json::Value) -> Result<TimetableSlot, ParamError> {
    Ok(TimetableSlot {
        class_id: required_str(params, "classId")?,
        day: grid_value(params, "day", &DAYS)?,
        time: grid_value(params, "time", &TIME_SLOTS)?,
        subject: required_str(params, "subject")?,
        teacher: required_str(params, "teacher")?,
    })
}

fn handle_timetable_set_slot(state: &mut AppState, req: &Request) -> serde_json::Value {
    let slot = match parse_slot(&req.params) {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    match state.store.set_timetable_slot(slot) {
        Ok(slot) => ok(&req.id, json!({ "slot": slot })),
        Err(e) => db_failed(&req.id, "db_update_failed", e),
    }
}

fn handle_timetable_clear_slot(state: &mut AppState, req: &Request) -> serde_json::Value {
    let parsed = (|| -> Result<(String, String, String), ParamError> {
        Ok((
            required_str(&req.params, "classId")?,
            grid_value(&req.params, "day", &DAYS)?,
            grid_value(&req.params, "time", &TIME_SLOTS)?,
        ))
    })();
    let (class_id, day, time) = match parsed {
        Ok(v) => v,
        Err(e) => return bad_params(&req.id, e),
    };
    match state.store.clear_timetable_slot(&class_id, &day, &time) {
        Ok(removed) => ok(&req.id, json!({ "removed": removed })),
        Err(e) => db_failed(&req.id, "db_update_failed", e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "timetable.get" => Some(handle_timetable_get(state, req)),
        "timetable.setSlot" => Some(handle_timetable_set_slot(state, req)),
        "timetable.clearSlot" => Some(handle_timetable_clear_slot(state, req)),
        _ => None,
    }
}
