use super::*;

#[test]
fn stop_flushes_the_buffer_as_a_single_content_delta() {
    let mut tracker = TurnTracker::new();
    let t0 = Instant::now();
    tracker.on_content("hello ", t0);
    tracker.on_content("world", t0 + Duration::from_millis(10));

    let deltas = tracker.on_finish_reason("stop");

    assert!(deltas.iter().any(|d| matches!(d, ProxyDelta::Content { text, filtered: false } if text == "hello world")));
    assert!(tracker.emitted_any_content());
}

#[test]
fn tool_calls_clears_the_buffer_without_emitting_content() {
    let mut tracker = TurnTracker::new();
    let t0 = Instant::now();
    tracker.on_content("thinking...", t0);

    let deltas = tracker.on_finish_reason("tool_calls");
    assert!(deltas.is_empty());
    assert_eq!(tracker.turn_count(), 1);

    let final_deltas = tracker.on_finish_reason("stop");
    assert!(!final_deltas
        .iter()
        .any(|d| matches!(d, ProxyDelta::Content { text, .. } if text.contains("thinking"))));
}

#[test]
fn a_long_gap_between_content_chunks_is_an_implicit_boundary() {
    let mut tracker = TurnTracker::new();
    let t0 = Instant::now();
    tracker.on_content("first turn", t0);

    let deltas = tracker.on_content("second turn", t0 + Duration::from_secs(5));
    assert!(deltas.iter().any(|d| matches!(d, ProxyDelta::Thinking { text } if text == "\n\n")));
    assert_eq!(tracker.turn_count(), 1);

    let flushed = tracker.on_finish_reason("stop");
    assert!(flushed
        .iter()
        .any(|d| matches!(d, ProxyDelta::Content { text, .. } if text == "second turn")));
}

#[test]
fn a_short_gap_does_not_trigger_an_implicit_boundary() {
    let mut tracker = TurnTracker::new();
    let t0 = Instant::now();
    tracker.on_content("a", t0);
    let deltas = tracker.on_content("b", t0 + Duration::from_millis(500));
    assert!(!deltas.iter().any(|d| matches!(d, ProxyDelta::Thinking { text } if text == "\n\n")));
}

#[test]
fn thinking_deltas_coalesce_around_eighty_characters() {
    let mut tracker = TurnTracker::new();
    let t0 = Instant::now();
    let chunk = "x".repeat(40);
    let first = tracker.on_content(&chunk, t0);
    assert!(first.is_empty());
    let second = tracker.on_content(&chunk, t0 + Duration::from_millis(10));
    assert_eq!(second.len(), 1);
    assert!(matches!(&second[0], ProxyDelta::Thinking { text } if text.len() == 80));
}

#[test]
fn first_tool_call_emits_a_status_and_repeats_are_suppressed() {
    let mut tracker = TurnTracker::new();
    let first = tracker.on_tool_call("read");
    assert_eq!(first, Some(ProxyDelta::Thinking { text: "正在读取文件...".to_string() }));
    assert_eq!(tracker.on_tool_call("read"), None);
}

#[test]
fn unknown_tool_names_fall_back_to_a_generic_status() {
    let mut tracker = TurnTracker::new();
    let delta = tracker.on_tool_call("custom_tool").unwrap();
    assert_eq!(delta, ProxyDelta::Thinking { text: "正在执行 custom_tool...".to_string() });
}

#[test]
fn finalize_flushes_a_pending_buffer_when_the_stream_ends_without_stop() {
    let mut tracker = TurnTracker::new();
    let t0 = Instant::now();
    tracker.on_content("A", t0);
    tracker.on_content("B", t0 + Duration::from_millis(10));
    tracker.on_content("C", t0 + Duration::from_secs_f64(3.5));
    tracker.on_content("D", t0 + Duration::from_secs_f64(3.6));

    let deltas = tracker.finalize();

    assert!(deltas
        .iter()
        .any(|d| matches!(d, ProxyDelta::Content { text, filtered: false } if text == "CD")));
    assert!(tracker.emitted_any_content());
}

#[test]
fn finalize_after_an_explicit_stop_is_a_no_op() {
    let mut tracker = TurnTracker::new();
    let t0 = Instant::now();
    tracker.on_content("hello", t0);
    tracker.on_finish_reason("stop");

    assert!(tracker.finalize().is_empty());
}

#[test]
fn empty_stream_with_many_messages_reports_a_filtered_notice() {
    let deltas = TurnTracker::empty_stream_deltas(5);
    assert_eq!(
        deltas,
        vec![ProxyDelta::Content {
            text: "该内容暂时无法处理，已自动清理相关对话记录，请换个话题继续。".to_string(),
            filtered: true,
        }]
    );
}

#[test]
fn empty_stream_with_few_messages_reports_a_plain_retry_notice() {
    let deltas = TurnTracker::empty_stream_deltas(1);
    assert_eq!(
        deltas,
        vec![ProxyDelta::Content { text: "出了一点小问题，请稍后重试".to_string(), filtered: false }]
    );
}
