//! End-to-end loop behavior with scripted models and recording tools.

use std::sync::Arc;

use factotum_agent::TurnOutcome;
use factotum_core::config::AgentConfig;
use factotum_core::conversation::{Role, TurnContent};
use factotum_core::model::{ModelResponse, ResponsePart, ToolCallRequest};
use factotum_core::tool::ToolKind;
use factotum_testing::{RecordingTool, SessionHarness};
use serde_json::{Map, json};

fn call(name: &str) -> ModelResponse {
    ModelResponse::tool_call(ToolCallRequest::new(name, Map::new()))
}

#[test]
fn n_tool_rounds_execute_n_tools_and_n_plus_one_model_calls() {
    let tool = RecordingTool::succeeding(ToolKind::GetSystemInfo, json!({"platform": "test"}));
    let mut harness = SessionHarness::new(
        vec![
            call("get_system_info"),
            call("get_system_info"),
            ModelResponse::text("finished"),
        ],
        vec![Arc::new(tool.clone())],
    );

    let report = harness.run("how is the machine doing?").unwrap();

    assert_eq!(report.outcome, TurnOutcome::Completed);
    assert_eq!(report.model_calls, 3);
    assert_eq!(tool.call_count(), 2);
    assert_eq!(report.replies, vec!["finished"]);
}

#[test]
fn relentless_tool_requests_stop_at_the_iteration_ceiling() {
    let tool = RecordingTool::succeeding(ToolKind::GetSystemInfo, json!({"ok": true}));
    // Exactly as many scripted tool calls as the ceiling allows; the next
    // turn falls through to the scripted model's terminal text.
    let script: Vec<ModelResponse> = (0..15).map(|_| call("get_system_info")).collect();

    let config = AgentConfig {
        max_iterations: 15,
        ..AgentConfig::default()
    };
    let mut harness = SessionHarness::with_config(script, vec![Arc::new(tool.clone())], config);

    let report = harness.run("never stop").unwrap();

    assert_eq!(report.outcome, TurnOutcome::LimitReached);
    assert_eq!(report.model_calls, 15);
    assert_eq!(tool.call_count(), 15);

    // The session survives: the next turn completes normally.
    let report = harness.run("are you still there?").unwrap();
    assert_eq!(report.outcome, TurnOutcome::Completed);
}

#[test]
fn failing_tool_is_contained_and_the_loop_continues() {
    let tool = RecordingTool::failing(ToolKind::FetchUrlContent, "socket closed");
    let mut harness = SessionHarness::new(
        vec![call("fetch_url_content"), ModelResponse::text("could not fetch")],
        vec![Arc::new(tool.clone())],
    );

    let report = harness.run("fetch the page").unwrap();

    assert_eq!(report.outcome, TurnOutcome::Completed);
    assert_eq!(tool.call_count(), 1);

    let error_payload = harness
        .session()
        .conversation()
        .turns()
        .iter()
        .find_map(|turn| match &turn.content {
            TurnContent::ToolResult { payload, .. } => Some(payload.clone()),
            _ => None,
        })
        .expect("tool result turn");
    let message = error_payload["error"].as_str().unwrap();
    assert!(message.starts_with("Function execution error: "));
    assert!(message.contains("socket closed"));
}

#[test]
fn unknown_tool_names_do_not_abort_the_turn() {
    let mut harness = SessionHarness::new(
        vec![call("warp_drive"), ModelResponse::text("no such ability")],
        Vec::new(),
    );

    let report = harness.run("engage").unwrap();

    assert_eq!(report.outcome, TurnOutcome::Completed);
    let error_payload = harness
        .session()
        .conversation()
        .turns()
        .iter()
        .find_map(|turn| match &turn.content {
            TurnContent::ToolResult { name, payload } if name == "warp_drive" => {
                Some(payload.clone())
            }
            _ => None,
        })
        .expect("error result for the unknown tool");
    assert_eq!(error_payload["error"], "Unknown function: warp_drive");
}

#[test]
fn multi_part_responses_execute_in_emission_order() {
    let first = RecordingTool::succeeding(ToolKind::FindFiles, json!({"files": ["a.txt"]}));
    let second = RecordingTool::succeeding(ToolKind::ReadFileContent, json!({"content": "hi"}));

    let mut args = Map::new();
    args.insert("pattern".to_string(), json!("*.txt"));
    let response = ModelResponse::from_parts(vec![
        ResponsePart::Text("searching".to_string()),
        ResponsePart::ToolCall(ToolCallRequest::new("find_files", args)),
        ResponsePart::ToolCall(ToolCallRequest::new("read_file_content", Map::new())),
    ]);

    let mut harness = SessionHarness::new(
        vec![response, ModelResponse::text("summary")],
        vec![Arc::new(first.clone()), Arc::new(second.clone())],
    );

    let report = harness.run("find and read").unwrap();

    assert_eq!(report.replies, vec!["searching", "summary"]);
    assert_eq!(first.call_count(), 1);
    assert_eq!(second.call_count(), 1);
    assert_eq!(first.recorded_args()[0]["pattern"], "*.txt");

    // History interleaves in emission order: text, then the two exchanges.
    let turns = harness.session().conversation().turns();
    let find_idx = turns
        .iter()
        .position(|t| {
            matches!(&t.content, TurnContent::ToolCall(c) if c.name == "find_files")
        })
        .unwrap();
    let read_idx = turns
        .iter()
        .position(|t| {
            matches!(&t.content, TurnContent::ToolCall(c) if c.name == "read_file_content")
        })
        .unwrap();
    assert!(find_idx < read_idx);
    // Each call's result lands immediately after it.
    assert!(matches!(
        &turns[find_idx + 1].content,
        TurnContent::ToolResult { name, .. } if name == "find_files"
    ));
}

#[test]
fn conversation_invariant_holds_after_mixed_turns() {
    let good = RecordingTool::succeeding(ToolKind::GetSystemInfo, json!({"ok": true}));
    let bad = RecordingTool::failing(ToolKind::FetchUrlContent, "down");

    let mut harness = SessionHarness::new(
        vec![
            call("get_system_info"),
            call("fetch_url_content"),
            call("no_such_tool"),
            ModelResponse::text("done with all of it"),
        ],
        vec![Arc::new(good), Arc::new(bad)],
    );

    harness.run("do a mix of things").unwrap();
    harness.run("and a plain question").unwrap();

    let conversation = harness.session().conversation();
    assert!(conversation.tool_results_are_paired());

    // No tool_result turn appears without a preceding model call turn.
    let mut seen_calls = 0usize;
    for turn in conversation.turns() {
        match (&turn.role, &turn.content) {
            (Role::Model, TurnContent::ToolCall(_)) => seen_calls += 1,
            (Role::ToolResult, _) => assert!(seen_calls > 0),
            _ => {}
        }
    }
}

#[test]
fn cancellation_mid_session_returns_control() {
    let tool = RecordingTool::succeeding(ToolKind::GetSystemInfo, json!({"ok": true}));
    let mut harness = SessionHarness::new(
        (0..10).map(|_| call("get_system_info")).collect(),
        vec![Arc::new(tool)],
    );

    harness.cancel_flag().cancel();
    let report = harness.run("long job").unwrap();
    assert_eq!(report.outcome, TurnOutcome::Cancelled);
    assert!(harness.session().conversation().tool_results_are_paired());
}
