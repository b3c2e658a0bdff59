// tests/service_session.rs
// Drives the framed JSON service through whole request sequences

use gcode_resume::service::{read_message, Message, MessageContent, ResumeServer};
use gcode_resume::ServiceConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::io::Cursor;
use std::path::Path;

const PART: &str = "; Filament gcode\nG28\nG1 Z0.2\n;LAYER_CHANGE\n;Z:0.2\nG1 X10 Y10\n;LAYER_CHANGE\n;Z:5.0\nG1 Z5.0 X1\n";

fn frame(seq: u64, command: &str, arguments: Option<Value>) -> String {
    let mut request = json!({ "seq": seq, "type": "request", "command": command });
    if let Some(arguments) = arguments {
        request["arguments"] = arguments;
    }
    let body = request.to_string();
    format!("Content-Length: {}\r\n\r\n{body}", body.len())
}

// Run a session and collect every message written back.
fn run_session(root: &Path, requests: &[String]) -> Vec<Message> {
    let input = Cursor::new(requests.concat());
    let config = ServiceConfig::new(root).with_gcodes_dir(root.join("gcodes"));
    let mut server = ResumeServer::new(input, Vec::new(), config);
    server.run().expect("session should end cleanly");

    let mut output = Cursor::new(server.into_writer());
    let mut messages = Vec::new();
    while let Some(msg) = read_message(&mut output).expect("server output is framed") {
        messages.push(msg);
    }
    messages
}

fn response(msg: &Message) -> (u64, bool, &str, Option<&str>, Option<&Value>) {
    match &msg.content {
        MessageContent::Response {
            request_seq,
            success,
            command,
            message,
            body,
        } => (
            *request_seq,
            *success,
            command.as_str(),
            message.as_deref(),
            body.as_ref(),
        ),
        other => panic!("expected a response, got {other:?}"),
    }
}

fn event_name(msg: &Message) -> &str {
    match &msg.content {
        MessageContent::Event { event, .. } => event,
        other => panic!("expected an event, got {other:?}"),
    }
}

fn sandbox() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::create_dir_all(dir.path().join("gcodes/archive")).unwrap();
    fs::write(dir.path().join("gcodes/part.gcode"), PART).unwrap();
    fs::write(dir.path().join("gcodes/notes.txt"), "not gcode").unwrap();
    fs::write(dir.path().join("gcodes/.hidden.gcode"), "G28").unwrap();
    dir
}

#[cfg(test)]
mod session_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_initialize_then_terminate() {
        let dir = sandbox();
        let messages = run_session(
            dir.path(),
            &[
                frame(1, "initialize", None),
                frame(2, "terminate", None),
                // Never read: the loop stops at terminate.
                frame(3, "initialize", None),
            ],
        );

        assert_eq!(messages.len(), 4);
        let (request_seq, success, command, _, body) = response(&messages[0]);
        assert_eq!((request_seq, success, command), (1, true, "initialize"));
        assert!(body.unwrap()["commands"]
            .as_array()
            .unwrap()
            .contains(&json!("process")));
        assert_eq!(event_name(&messages[1]), "initialized");
        assert_eq!(response(&messages[2]).2, "terminate");
        assert_eq!(event_name(&messages[3]), "terminated");

        let seqs: Vec<u64> = messages.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_list_files_filters_and_sorts() {
        let dir = sandbox();
        let messages = run_session(dir.path(), &[frame(1, "listFiles", None)]);

        let (_, success, _, _, body) = response(&messages[0]);
        assert!(success);
        let names: Vec<&str> = body.unwrap()["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["..", "archive", "part.gcode"]);

        let part = &body.unwrap()["entries"][2];
        assert_eq!(part["type"], json!("file"));
        assert_eq!(part["size"], json!(PART.len()));
    }

    #[test]
    fn test_list_outside_sandbox_falls_back_to_gcodes() {
        let dir = sandbox();
        let messages = run_session(
            dir.path(),
            &[frame(1, "listFiles", Some(json!({ "path": "/" })))],
        );
        let (_, success, _, _, body) = response(&messages[0]);
        assert!(success);
        let listed = Path::new(body.unwrap()["directory"].as_str().unwrap());
        assert!(listed.ends_with("gcodes"));
    }

    #[test]
    fn test_read_analyze_process_save() {
        let dir = sandbox();
        let messages = run_session(
            dir.path(),
            &[
                frame(1, "readFile", Some(json!({ "filepath": "gcodes/part.gcode" }))),
                frame(2, "analyzeLayers", Some(json!({ "content": PART }))),
                frame(
                    3,
                    "process",
                    Some(json!({
                        "content": PART,
                        "targetZ": 5.0,
                        "originalFilename": "part.gcode",
                    })),
                ),
                frame(
                    4,
                    "saveFile",
                    Some(json!({ "filename": "part_resume_Z5.0mm.gcode", "content": "G1 X1\n" })),
                ),
                frame(5, "disconnect", None),
            ],
        );

        let (_, success, _, _, body) = response(&messages[0]);
        assert!(success);
        assert_eq!(body.unwrap()["content"], json!(PART));

        let (_, success, _, _, body) = response(&messages[1]);
        assert!(success);
        assert_eq!(body.unwrap()["count"], json!(2));
        assert_eq!(body.unwrap()["layers"][1]["lineNumber"], json!(7));
        assert_eq!(body.unwrap()["layers"][1]["zHeight"], json!(5.0));

        let (_, success, _, _, body) = response(&messages[2]);
        assert!(success);
        let body = body.unwrap();
        assert_eq!(body["filename"], json!("part_resume_Z5.0mm.gcode"));
        assert_eq!(body["stats"]["targetLineIndex"], json!(6));
        assert_eq!(body["stats"]["homingRemoved"], json!(1));
        assert_eq!(body["stats"]["verticalMovesRemoved"], json!(1));
        assert!(body["content"]
            .as_str()
            .unwrap()
            .contains("; REMOVED G28: G28\n"));

        let (_, success, _, _, body) = response(&messages[3]);
        assert!(success);
        let saved = dir.path().join("gcodes/part_resume_Z5.0mm.gcode");
        assert_eq!(fs::read_to_string(&saved).unwrap(), "G1 X1\n");
        assert_eq!(body.unwrap()["size"], json!(6));

        assert_eq!(event_name(messages.last().unwrap()), "terminated");
    }

    #[test]
    fn test_failures_are_reported_not_fatal() {
        let dir = sandbox();
        let messages = run_session(
            dir.path(),
            &[
                frame(
                    1,
                    "process",
                    Some(json!({ "content": PART, "targetZ": 100.0 })),
                ),
                frame(2, "readFile", Some(json!({ "filepath": "/etc/passwd" }))),
                frame(3, "readFile", Some(json!({ "filepath": "gcodes/notes.txt" }))),
                frame(4, "saveFile", Some(json!({ "filename": "", "content": "x" }))),
                frame(5, "bogus", None),
                frame(6, "process", None),
            ],
        );

        assert_eq!(messages.len(), 6);
        for msg in &messages {
            let (_, success, _, message, body) = response(msg);
            assert!(!success);
            assert!(message.is_some());
            assert!(body.is_none());
        }
        assert_eq!(
            response(&messages[0]).3,
            Some("Target Z height 100.0mm not reached. Maximum Z in file: 5.0mm")
        );
        assert!(response(&messages[1]).3.unwrap().starts_with("Access denied"));
        assert!(response(&messages[2]).3.unwrap().starts_with("Invalid file type"));
        assert_eq!(
            response(&messages[3]).3,
            Some("Invalid filename - filename cannot be empty")
        );
        assert_eq!(
            response(&messages[4]).3,
            Some("Invalid request data: unknown command: bogus")
        );
    }

    #[test]
    fn test_bad_json_body_keeps_session_open() {
        let dir = sandbox();
        let bad = "{not json";
        let messages = run_session(
            dir.path(),
            &[
                format!("Content-Length: {}\r\n\r\n{bad}", bad.len()),
                frame(2, "initialize", None),
            ],
        );

        let (request_seq, success, command, message, _) = response(&messages[0]);
        assert_eq!((request_seq, success, command), (0, false, "unknown"));
        assert!(message.unwrap().starts_with("Invalid JSON"));
        assert_eq!(response(&messages[1]).2, "initialize");
    }

    #[test]
    fn test_missing_length_ends_session() {
        let dir = sandbox();
        let body = r#"{"seq":1,"type":"request","command":"initialize"}"#;
        let messages = run_session(
            dir.path(),
            &[
                format!("Content-Type: application/json\r\n\r\n{body}"),
                frame(2, "initialize", None),
            ],
        );

        assert_eq!(messages.len(), 1);
        let (_, success, _, message, _) = response(&messages[0]);
        assert!(!success);
        assert_eq!(
            message,
            Some("Malformed frame: missing Content-Length header")
        );
    }

    #[test]
    fn test_save_renames_extension_and_strips_directories() {
        let dir = sandbox();
        let messages = run_session(
            dir.path(),
            &[frame(
                1,
                "saveFile",
                Some(json!({
                    "filename": "../../escape.txt",
                    "content": "G28\n",
                    "directory": "gcodes/out",
                })),
            )],
        );

        let (_, success, _, _, body) = response(&messages[0]);
        assert!(success);
        assert_eq!(body.unwrap()["filename"], json!("escape.gcode"));
        assert!(dir.path().join("gcodes/out/escape.gcode").exists());
    }
}
