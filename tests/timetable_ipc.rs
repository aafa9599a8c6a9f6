use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar(args: &[&str]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schoold");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoold");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err_code(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false), "{method} should fail");
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}


#[test]
fn timetable_set_replace_and_clear_slots() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);

    let empty = request_ok(&mut stdin, &mut reader, "1", "timetable.get", json!({ "classId": "10-A" }));
    assert_eq!(empty["days"].as_array().map(|a| a.len()), Some(5));
    assert_eq!(empty["timeSlots"].as_array().map(|a| a.len()), Some(7));
    assert_eq!(empty["slots"], json!([]));

    let set = |day: &str, time: &str, subject: &str| {
        json!({
            "classId": "10-A",
            "day": day,
            "time": time,
            "subject": subject,
            "teacher": "Sarah Wilson"
        })
    };
    request_ok(&mut stdin, &mut reader, "2", "timetable.setSlot", set("Tuesday", "10:00 AM", "English"));
    request_ok(&mut stdin, &mut reader, "3", "timetable.setSlot", set("Monday", "09:00 AM", "Math"));
    request_ok(&mut stdin, &mut reader, "4", "timetable.setSlot", set("Monday", "09:00 AM", "Mathematics"));

    let got = request_ok(&mut stdin, &mut reader, "5", "timetable.get", json!({ "classId": "10-A" }));
    let slots = got["slots"].as_array().expect("slots");
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["day"], "Monday");
    assert_eq!(slots[0]["subject"], "Mathematics");
    assert_eq!(slots[1]["day"], "Tuesday");

    let cleared = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "timetable.clearSlot",
        json!({ "classId": "10-A", "day": "Monday", "time": "09:00 AM" }),
    );
    assert_eq!(cleared["removed"], true);
    let again = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "timetable.clearSlot",
        json!({ "classId": "10-A", "day": "Monday", "time": "09:00 AM" }),
    );
    assert_eq!(again["removed"], false);

    let code = request_err_code(&mut stdin, &mut reader, "8", "timetable.setSlot", set("Saturday", "09:00 AM", "Art"));
    assert_eq!(code, "bad_params");
    let code = request_err_code(&mut stdin, &mut reader, "9", "timetable.setSlot", set("Monday", "08:00 AM", "Art"));
    assert_eq!(code, "bad_params");

    drop(stdin);
    let _ = child.wait();
}
