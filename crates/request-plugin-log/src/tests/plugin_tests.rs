//! Tests for the LogPlugin lifecycle hooks
//!
//! Includes the reference scenarios for init, complete and error, the silent
//! flag, the single-`next` guarantee and property-based checks of the timing
//! invariants.

use proptest::prelude::*;
use serde_json::{Value, json};
use std::cell::Cell;

use crate::clock::ManualClock;
use crate::context::{Context, RequestContext};
use crate::error::RequestError;
use crate::logging::{
    LOG, LogLevel, LogMetadata, LogPlugin, LogPluginConfig, Logger, MissingStartPolicy,
    MockLogger, log_plugin,
};
use crate::plugin::{Phase, Plugin, dispatch};
use crate::request::Request;

// =============================================================================
// Helpers
// =============================================================================

const NOW: i64 = 32_523_523_535;

fn setup(name: &str, now: i64) -> (LogPlugin, MockLogger, ManualClock) {
    let logger = MockLogger::new();
    let clock = ManualClock::new(now);
    let plugin = LogPlugin::new(
        LogPluginConfig::new()
            .with_name(name)
            .with_logger_factory(logger.factory())
            .with_clock(clock.clone()),
    );
    (plugin, logger, clock)
}

/// Runs one hook and returns how many times `next` was called.
fn run_hook(plugin: &dyn Plugin, phase: Phase, ctx: &mut Context) -> usize {
    let calls = Cell::new(0);
    dispatch(plugin, phase, ctx, Box::new(|| calls.set(calls.get() + 1)));
    calls.get()
}

fn with_start(request: Request, start: i64) -> Context {
    let mut ctx = Context::new(request);
    ctx.update_external_meta(LOG, json!({ "start": start }));
    ctx
}

// =============================================================================
// Logger binding
// =============================================================================

#[test]
fn test_logger_bound_with_prefixed_name() {
    let (plugin, logger, _) = setup("test", NOW);

    assert_eq!(logger.names(), vec!["request.test".to_string()]);
    assert_eq!(plugin.logger_name(), "request.test");
}

#[test]
fn test_logger_bound_once_per_plugin() {
    let (plugin, logger, _) = setup("test", NOW);
    let mut ctx = Context::new(Request::new("a"));

    run_hook(&plugin, Phase::Init, &mut ctx);
    run_hook(&plugin, Phase::Complete, &mut ctx);

    assert_eq!(logger.names().len(), 1);
}

#[test]
fn test_empty_name_binds_bare_prefix() {
    let (plugin, logger, _) = setup("", NOW);

    assert_eq!(plugin.logger_name(), "request.");
    assert_eq!(logger.names(), vec!["request.".to_string()]);
}

#[test]
fn test_log_plugin_constructor_matches_new() {
    let logger = MockLogger::new();
    let plugin = log_plugin(
        LogPluginConfig::new()
            .with_name("api")
            .with_logger_factory(logger.factory()),
    );

    assert_eq!(plugin.logger_name(), "request.api");
}

// =============================================================================
// init
// =============================================================================

#[test]
fn test_init_logs_and_records_start() {
    let (plugin, logger, _) = setup("test", NOW);
    let request = Request::new("test1")
        .with_query(json!({ "a": 1 }))
        .with_payload(json!({ "b": 2 }))
        .with_field("a", json!(1));
    let mut ctx = Context::new(request);

    let next_calls = run_hook(&plugin, Phase::Init, &mut ctx);

    assert_eq!(next_calls, 1);

    let info = logger.calls_at(LogLevel::Info);
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].message, "init");
    assert_eq!(
        info[0].args,
        vec![json!({ "url": "test1", "query": { "a": 1 }, "payload": { "b": 2 } })]
    );

    let debug = logger.calls_at(LogLevel::Debug);
    assert_eq!(debug.len(), 1);
    assert_eq!(debug[0].message, "init");
    assert_eq!(
        debug[0].args,
        vec![json!({ "url": "test1", "query": { "a": 1 }, "payload": { "b": 2 }, "a": 1 })]
    );

    assert!(logger.calls_at(LogLevel::Error).is_empty());
    assert_eq!(ctx.external_meta(LOG), Some(&json!({ "start": NOW })));
}

#[test]
fn test_init_projection_omits_absent_fields() {
    let (plugin, logger, _) = setup("test", NOW);
    let mut ctx = Context::new(Request::new("/plain").with_field("headers", json!({ "x": 1 })));

    run_hook(&plugin, Phase::Init, &mut ctx);

    let info = logger.last_at(LogLevel::Info).unwrap();
    assert_eq!(info.args, vec![json!({ "url": "/plain" })]);
}

#[test]
fn test_init_keeps_existing_log_keys() {
    let (plugin, _, _) = setup("test", NOW);
    let mut ctx = Context::new(Request::new("x"));
    ctx.update_external_meta(LOG, json!({ "attempt": 2 }));

    run_hook(&plugin, Phase::Init, &mut ctx);

    assert_eq!(
        ctx.external_meta(LOG),
        Some(&json!({ "attempt": 2, "start": NOW }))
    );
}

#[test]
fn test_init_start_taken_before_next() {
    let (plugin, _, clock) = setup("test", 100);
    let mut ctx = Context::new(Request::new("x"));

    dispatch(&plugin, Phase::Init, &mut ctx, Box::new(|| clock.advance(50)));

    assert_eq!(ctx.external_meta(LOG), Some(&json!({ "start": 100 })));
}

// =============================================================================
// complete
// =============================================================================

#[test]
fn test_complete_logs_timing() {
    let start = 1_242_152_525;
    let (plugin, logger, _) = setup("test", NOW);
    let mut ctx = with_start(Request::new("test2"), start);

    let next_calls = run_hook(&plugin, Phase::Complete, &mut ctx);

    assert_eq!(next_calls, 1);

    let meta = json!({ "start": start, "end": NOW, "duration": NOW - start });
    assert_eq!(ctx.external_meta(LOG), Some(&meta));

    let info = logger.calls_at(LogLevel::Info);
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].message, "complete");
    assert_eq!(info[0].args, vec![json!({ "url": "test2" }), json!({ "log": meta })]);

    let debug = logger.last_at(LogLevel::Debug).unwrap();
    assert_eq!(debug.message, "complete");
    assert_eq!(
        debug.args,
        vec![
            json!({ "request": { "url": "test2" } }),
            json!({ "log": meta }),
            json!({}),
        ]
    );
}

#[test]
fn test_complete_logs_other_metatypes() {
    let (plugin, logger, _) = setup("test", 10);
    let mut ctx = with_start(Request::new("x"), 4);
    ctx.update_external_meta("cache", json!({ "hit": true }));
    ctx.update_internal_meta("retry", json!({ "count": 1 }));

    run_hook(&plugin, Phase::Complete, &mut ctx);

    let expected = json!({
        "cache": { "hit": true },
        "log": { "start": 4, "end": 10, "duration": 6 },
    });
    let info = logger.last_at(LogLevel::Info).unwrap();
    assert_eq!(info.args[1], expected);

    let debug = logger.last_at(LogLevel::Debug).unwrap();
    assert_eq!(debug.args[1], expected);
    assert_eq!(debug.args[2], json!({ "retry": { "count": 1 } }));
}

#[test]
fn test_full_lifecycle_complete() {
    let (plugin, logger, clock) = setup("test", 1_000);
    let mut ctx = Context::new(Request::new("/users"));

    run_hook(&plugin, Phase::Init, &mut ctx);
    clock.advance(250);
    run_hook(&plugin, Phase::Complete, &mut ctx);

    let timing = LogMetadata::from_value(ctx.external_meta(LOG).unwrap()).unwrap();
    assert_eq!(timing, LogMetadata::started(1_000).finish(1_250));
    assert_eq!(timing.duration, Some(250));

    let messages: Vec<_> = logger
        .calls()
        .into_iter()
        .map(|call| (call.level, call.message))
        .collect();
    assert_eq!(
        messages,
        vec![
            (LogLevel::Info, "init".to_string()),
            (LogLevel::Debug, "init".to_string()),
            (LogLevel::Info, "complete".to_string()),
            (LogLevel::Debug, "complete".to_string()),
        ]
    );
}

// =============================================================================
// error
// =============================================================================

#[test]
fn test_error_logs_failure() {
    let start = 1_242_152_525;
    let (plugin, logger, _) = setup("test", NOW);
    let mut ctx = with_start(Request::new("test3"), start);
    ctx.set_error(RequestError::unknown("test"));

    let next_calls = run_hook(&plugin, Phase::Error, &mut ctx);

    assert_eq!(next_calls, 1);

    let meta = json!({ "start": start, "end": NOW, "duration": NOW - start });
    assert_eq!(ctx.external_meta(LOG), Some(&meta));

    assert!(logger.calls_at(LogLevel::Info).is_empty());

    let errors = logger.calls_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "error");
    assert_eq!(
        errors[0].args,
        vec![
            json!({ "url": "test3" }),
            json!({ "code": "UNKNOWN", "message": "test" }),
            json!({ "log": meta }),
        ]
    );

    let debug = logger.last_at(LogLevel::Debug).unwrap();
    assert_eq!(debug.message, "error");
    assert_eq!(
        debug.args,
        vec![
            json!({
                "request": { "url": "test3" },
                "error": { "code": "UNKNOWN", "message": "test" },
            }),
            meta,
            json!({}),
        ]
    );
}

#[test]
fn test_error_without_recorded_failure_logs_null() {
    let (plugin, logger, _) = setup("test", 20);
    let mut ctx = with_start(Request::new("x"), 5);

    run_hook(&plugin, Phase::Error, &mut ctx);

    let error = logger.last_at(LogLevel::Error).unwrap();
    assert_eq!(error.args[1], Value::Null);
}

#[test]
fn test_error_nests_only_log_slot() {
    let (plugin, logger, _) = setup("test", 20);
    let mut ctx = with_start(Request::new("x"), 5);
    ctx.update_external_meta("cache", json!({ "hit": false }));
    ctx.set_error(RequestError::timeout("slow").with_details(json!({ "after": 15 })));

    run_hook(&plugin, Phase::Error, &mut ctx);

    let error = logger.last_at(LogLevel::Error).unwrap();
    assert_eq!(
        error.args[1],
        json!({ "code": "TIMEOUT", "message": "slow", "details": { "after": 15 } })
    );
    assert_eq!(
        error.args[2],
        json!({ "log": { "start": 5, "end": 20, "duration": 15 } })
    );

    let debug = logger.last_at(LogLevel::Debug).unwrap();
    assert_eq!(debug.args[1], json!({ "start": 5, "end": 20, "duration": 15 }));
}

#[test]
fn test_error_does_not_touch_recorded_failure() {
    let (plugin, _, _) = setup("test", 20);
    let failure = RequestError::network("connection reset");
    let mut ctx = with_start(Request::new("x"), 5);
    ctx.set_error(failure.clone());

    run_hook(&plugin, Phase::Error, &mut ctx);

    assert_eq!(ctx.state().error, Some(failure));
}

// =============================================================================
// Silent requests
// =============================================================================

#[test]
fn test_silent_init_only_debug() {
    let (plugin, logger, _) = setup("test", NOW);
    let mut ctx = Context::new(Request::new("quiet").with_silent(true));

    let next_calls = run_hook(&plugin, Phase::Init, &mut ctx);

    assert_eq!(next_calls, 1);
    assert!(logger.calls_at(LogLevel::Info).is_empty());
    assert_eq!(logger.calls_at(LogLevel::Debug).len(), 1);
    assert_eq!(ctx.external_meta(LOG), Some(&json!({ "start": NOW })));
}

#[test]
fn test_silent_complete_still_times() {
    let (plugin, logger, _) = setup("test", 30);
    let mut ctx = with_start(Request::new("quiet").with_silent(true), 10);

    run_hook(&plugin, Phase::Complete, &mut ctx);

    assert!(logger.calls_at(LogLevel::Info).is_empty());
    assert_eq!(logger.calls_at(LogLevel::Debug).len(), 1);
    assert_eq!(
        ctx.external_meta(LOG),
        Some(&json!({ "start": 10, "end": 30, "duration": 20 }))
    );
}

#[test]
fn test_silent_error_suppresses_error_level() {
    let (plugin, logger, _) = setup("test", 30);
    let mut ctx = with_start(Request::new("quiet").with_silent(true), 10);
    ctx.set_error(RequestError::aborted("cancelled"));

    run_hook(&plugin, Phase::Error, &mut ctx);

    assert!(logger.calls_at(LogLevel::Error).is_empty());
    assert_eq!(logger.calls_at(LogLevel::Debug).len(), 1);
    assert_eq!(
        ctx.external_meta(LOG),
        Some(&json!({ "start": 10, "end": 30, "duration": 20 }))
    );
}

#[test]
fn test_silent_false_logs_normally() {
    let (plugin, logger, _) = setup("test", NOW);
    let mut ctx = Context::new(Request::new("loud").with_silent(false));

    run_hook(&plugin, Phase::Init, &mut ctx);

    assert_eq!(logger.calls_at(LogLevel::Info).len(), 1);
}

// =============================================================================
// Missing start
// =============================================================================

#[test]
fn test_missing_start_zero_duration() {
    let (plugin, logger, _) = setup("test", 77);
    let mut ctx = Context::new(Request::new("x"));
    ctx.set_error(RequestError::plugin("rejected before init"));

    let next_calls = run_hook(&plugin, Phase::Error, &mut ctx);

    assert_eq!(next_calls, 1);
    assert_eq!(
        ctx.external_meta(LOG),
        Some(&json!({ "start": 77, "end": 77, "duration": 0 }))
    );
    assert_eq!(logger.calls_at(LogLevel::Error).len(), 1);
}

#[test]
fn test_missing_start_leave_unset() {
    let logger = MockLogger::new();
    let plugin = LogPlugin::new(
        LogPluginConfig::new()
            .with_logger_factory(logger.factory())
            .with_clock(ManualClock::new(77))
            .with_missing_start(MissingStartPolicy::LeaveUnset),
    );
    let mut ctx = Context::new(Request::new("x"));

    let next_calls = run_hook(&plugin, Phase::Complete, &mut ctx);

    assert_eq!(next_calls, 1);
    assert_eq!(ctx.external_meta(LOG), None);

    let info = logger.last_at(LogLevel::Info).unwrap();
    assert_eq!(info.args, vec![json!({ "url": "x" }), json!({})]);

    let debug = logger.last_at(LogLevel::Debug).unwrap();
    assert_eq!(debug.args[1], json!({}));
}

#[test]
fn test_missing_start_leave_unset_error_logs_null_meta() {
    let logger = MockLogger::new();
    let plugin = LogPlugin::new(
        LogPluginConfig::new()
            .with_logger_factory(logger.factory())
            .with_missing_start(MissingStartPolicy::LeaveUnset),
    );
    let mut ctx = Context::new(Request::new("x"));

    run_hook(&plugin, Phase::Error, &mut ctx);

    let error = logger.last_at(LogLevel::Error).unwrap();
    assert_eq!(error.args[2], json!({ "log": null }));

    let debug = logger.last_at(LogLevel::Debug).unwrap();
    assert_eq!(debug.args[1], Value::Null);
}

#[test]
fn test_unreadable_start_is_replaced() {
    let (plugin, _, _) = setup("test", 50);
    let mut ctx = Context::new(Request::new("x"));
    ctx.update_external_meta(LOG, json!({ "start": "yesterday" }));

    let next_calls = run_hook(&plugin, Phase::Complete, &mut ctx);

    assert_eq!(next_calls, 1);
    assert_eq!(
        ctx.external_meta(LOG),
        Some(&json!({ "start": 50, "end": 50, "duration": 0 }))
    );
}

#[test]
fn test_overflowing_start_is_replaced() {
    let (plugin, logger, _) = setup("test", 1_000);
    let mut ctx = with_start(Request::new("x"), i64::MIN);
    ctx.set_error(RequestError::unknown("boom"));

    let next_calls = run_hook(&plugin, Phase::Error, &mut ctx);

    assert_eq!(next_calls, 1);
    assert_eq!(
        ctx.external_meta(LOG),
        Some(&json!({ "start": 1_000, "end": 1_000, "duration": 0 }))
    );
    assert_eq!(logger.calls_at(LogLevel::Error).len(), 1);
}

#[test]
fn test_overflowing_start_leave_unset() {
    let logger = MockLogger::new();
    let plugin = LogPlugin::new(
        LogPluginConfig::new()
            .with_logger_factory(logger.factory())
            .with_clock(ManualClock::new(1_000))
            .with_missing_start(MissingStartPolicy::LeaveUnset),
    );
    let mut ctx = with_start(Request::new("x"), i64::MIN);

    let next_calls = run_hook(&plugin, Phase::Complete, &mut ctx);

    assert_eq!(next_calls, 1);
    assert_eq!(ctx.external_meta(LOG), Some(&json!({ "start": i64::MIN })));
}

// =============================================================================
// Redaction
// =============================================================================

#[test]
fn test_redaction_applies_to_projection_only() {
    let logger = MockLogger::new();
    let plugin = LogPlugin::new(
        LogPluginConfig::new()
            .with_logger_factory(logger.factory())
            .with_clock(ManualClock::new(1))
            .redact_field("password"),
    );
    let request = Request::new("/login")
        .with_payload(json!({ "user": "alice", "password": "hunter2" }))
        .with_query(json!({ "next": "/home" }));
    let mut ctx = Context::new(request);

    run_hook(&plugin, Phase::Init, &mut ctx);

    let info = logger.last_at(LogLevel::Info).unwrap();
    assert_eq!(
        info.args[0],
        json!({
            "url": "/login",
            "query": { "next": "/home" },
            "payload": { "user": "alice", "password": "[REDACTED]" },
        })
    );

    let debug = logger.last_at(LogLevel::Debug).unwrap();
    assert_eq!(debug.args[0]["payload"]["password"], json!("hunter2"));
}

// =============================================================================
// Logger failures
// =============================================================================

struct PanickingLogger;

impl Logger for PanickingLogger {
    fn info(&self, _message: &str, _args: &[Value]) {
        panic!("sink unavailable");
    }

    fn debug(&self, _message: &str, _args: &[Value]) {}

    fn error(&self, _message: &str, _args: &[Value]) {}
}

#[test]
#[should_panic(expected = "sink unavailable")]
fn test_logger_panic_propagates() {
    let plugin = LogPlugin::new(LogPluginConfig::new().with_logger(PanickingLogger));
    let mut ctx = Context::new(Request::new("x"));

    run_hook(&plugin, Phase::Init, &mut ctx);
}

// =============================================================================
// Property-Based Tests
// =============================================================================

fn arb_request() -> impl Strategy<Value = Request> {
    (
        "[a-z/]{0,16}",
        prop::option::of(any::<i32>()),
        prop::option::of("[a-z]{0,8}"),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(url, query, payload, silent)| {
            let mut request = Request::new(url);
            request.query = query.map(|q| json!({ "q": q }));
            request.payload = payload.map(|p| json!({ "body": p }));
            request.silent = silent;
            request
        })
}

proptest! {
    /// Property: duration always equals end - start
    #[test]
    fn prop_duration_is_end_minus_start(
        start in 0i64..10_000_000_000_000,
        elapsed in 0i64..1_000_000_000,
        fail in any::<bool>(),
    ) {
        let (plugin, _, clock) = setup("prop", start);
        let mut ctx = Context::new(Request::new("x"));

        run_hook(&plugin, Phase::Init, &mut ctx);
        clock.advance(elapsed);
        let phase = if fail { Phase::Error } else { Phase::Complete };
        run_hook(&plugin, phase, &mut ctx);

        let timing = LogMetadata::from_value(ctx.external_meta(LOG).unwrap()).unwrap();
        prop_assert_eq!(timing.start, start);
        prop_assert_eq!(timing.end, Some(start + elapsed));
        prop_assert_eq!(timing.duration, Some(elapsed));
    }

    /// Property: every hook calls next exactly once
    #[test]
    fn prop_next_called_exactly_once(request in arb_request(), fail in any::<bool>()) {
        let (plugin, _, _) = setup("prop", 1);
        let mut ctx = Context::new(request);

        prop_assert_eq!(run_hook(&plugin, Phase::Init, &mut ctx), 1);
        let phase = if fail { Phase::Error } else { Phase::Complete };
        prop_assert_eq!(run_hook(&plugin, phase, &mut ctx), 1);
    }

    /// Property: silent requests only produce one debug call per hook
    #[test]
    fn prop_silent_only_debug(request in arb_request(), fail in any::<bool>()) {
        let silent = request.is_silent();
        let (plugin, logger, _) = setup("prop", 1);
        let mut ctx = Context::new(request);

        run_hook(&plugin, Phase::Init, &mut ctx);
        let phase = if fail { Phase::Error } else { Phase::Complete };
        run_hook(&plugin, phase, &mut ctx);

        prop_assert_eq!(logger.calls_at(LogLevel::Debug).len(), 2);
        let loud = logger.calls_at(LogLevel::Info).len() + logger.calls_at(LogLevel::Error).len();
        prop_assert_eq!(loud, if silent { 0 } else { 2 });
    }

    /// Property: projected output never carries fields other than url/query/payload
    #[test]
    fn prop_projection_limits_fields(request in arb_request(), extra in "[a-z]{1,8}") {
        let (plugin, logger, _) = setup("prop", 1);
        let request = request.with_silent(false).with_field(format!("x_{extra}"), json!(true));
        let mut ctx = Context::new(request);

        run_hook(&plugin, Phase::Init, &mut ctx);

        let info = logger.last_at(LogLevel::Info).unwrap();
        let fields = info.args[0].as_object().unwrap();
        prop_assert!(fields.contains_key("url"));
        prop_assert!(fields.keys().all(|key| ["url", "query", "payload"].contains(&key.as_str())));
    }
}
