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
fn notices_create_fills_date_and_author_when_omitted() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);

    let res = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "notices.create",
        json!({
            "title": "Exam schedule",
            "content": "Term 1 exams start Monday.",
            "priority": "high",
            "audience": "all"
        }),
    );
    let notice = &res["notice"];
    assert_eq!(notice["priority"], "high");
    assert_eq!(notice["author"], "Admin");
    let date = notice["date"].as_str().expect("date");
    assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok(), "{date}");

    let explicit = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "notices.create",
        json!({
            "title": "Staff meeting",
            "content": "Room 4 after classes.",
            "priority": "medium",
            "audience": "teachers",
            "date": "2026-02-01",
            "author": "Principal"
        }),
    );
    assert_eq!(explicit["notice"]["date"], "2026-02-01");
    assert_eq!(explicit["notice"]["author"], "Principal");

    let unpadded = request_ok(
        &mut stdin,
        &mut reader,
        "2b",
        "notices.create",
        json!({
            "title": "Sports day",
            "content": "Field events.",
            "priority": "low",
            "audience": "students",
            "date": "2026-1-5"
        }),
    );
    assert_eq!(unpadded["notice"]["date"], "2026-01-05");

    let list = request_ok(&mut stdin, &mut reader, "3", "notices.list", json!({}));
    let titles: Vec<&str> = list["notices"]
        .as_array()
        .expect("notices")
        .iter()
        .filter_map(|n| n["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Exam schedule", "Staff meeting", "Sports day"]);

    let filtered = request_ok(&mut stdin, &mut reader, "4", "notices.list", json!({ "search": "room 4" }));
    assert_eq!(filtered["notices"].as_array().map(|a| a.len()), Some(1));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn notices_create_rejects_unknown_priority_and_audience() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "1",
        "notices.create",
        json!({ "title": "t", "content": "c", "priority": "urgent", "audience": "all" }),
    );
    assert_eq!(code, "bad_params");

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "2",
        "notices.create",
        json!({ "title": "t", "content": "c", "priority": "low", "audience": "parents" }),
    );
    assert_eq!(code, "bad_params");

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "3",
        "notices.create",
        json!({ "title": "t", "content": "c", "priority": "low", "audience": "all", "date": "01/02/2026" }),
    );
    assert_eq!(code, "bad_params");

    let numeric_date = request(
        &mut stdin,
        &mut reader,
        "4",
        "notices.create",
        json!({ "title": "t", "content": "c", "priority": "low", "audience": "all", "date": 20260105 }),
    );
    assert_eq!(numeric_date["error"]["code"], "bad_params");
    assert_eq!(numeric_date["error"]["details"]["field"], "date");

    let code = request_err_code(
        &mut stdin,
        &mut reader,
        "5",
        "notices.create",
        json!({ "title": "t", "content": "c", "priority": "low", "audience": "all", "author": 42 }),
    );
    assert_eq!(code, "bad_params");

    let list = request_ok(&mut stdin, &mut reader, "6", "notices.list", json!({}));
    assert_eq!(list["notices"], json!([]));

    drop(stdin);
    let _ = child.wait();
}
