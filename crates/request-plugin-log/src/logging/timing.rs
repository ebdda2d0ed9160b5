//! Timing helpers over the [`LOG`] metadata slot.
//!
//! `init` records `start`; both terminal hooks go through [`fill_duration`],
//! which merges `end` and `duration` next to the existing `start`.

use serde_json::{Value, json};

use super::constants::LOG;
use super::types::LogMetadata;
use crate::clock::{Clock, Timestamp};
use crate::context::RequestContext;
use crate::error::TimingError;

/// Merges `{ start }` into the LOG slot.
pub fn record_start(ctx: &mut dyn RequestContext, start: Timestamp) {
    ctx.update_external_meta(LOG, json!({ "start": start }));
}

/// Reads the recorded `start` timestamp.
pub fn read_start(ctx: &dyn RequestContext) -> Result<Timestamp, TimingError> {
    let meta = ctx
        .external_meta(LOG)
        .ok_or(TimingError::MissingStart { key: LOG })?;

    let Some(fields) = meta.as_object() else {
        return Err(TimingError::InvalidStart {
            key: LOG,
            value: meta.clone(),
        });
    };

    match fields.get("start") {
        None | Some(Value::Null) => Err(TimingError::MissingStart { key: LOG }),
        Some(start) => start.as_i64().ok_or_else(|| TimingError::InvalidStart {
            key: LOG,
            value: meta.clone(),
        }),
    }
}

/// Computes `end` and `duration` from the recorded `start` and merges them
/// into the LOG slot.
///
/// The slot is left untouched on error. A `start` so far from the clock that
/// `end - start` overflows is reported as [`TimingError::InvalidStart`].
pub fn fill_duration(
    ctx: &mut dyn RequestContext,
    clock: &dyn Clock,
) -> Result<LogMetadata, TimingError> {
    let start = read_start(ctx)?;
    let timing = LogMetadata::started(start)
        .checked_finish(clock.now())
        .ok_or_else(|| TimingError::InvalidStart {
            key: LOG,
            value: log_meta_snapshot(&*ctx),
        })?;

    ctx.update_external_meta(
        LOG,
        json!({
            "end": timing.end,
            "duration": timing.duration,
        }),
    );

    Ok(timing)
}

/// Current content of the LOG slot, `null` when absent.
pub fn log_meta_snapshot(ctx: &dyn RequestContext) -> Value {
    ctx.external_meta(LOG).cloned().unwrap_or(Value::Null)
}
