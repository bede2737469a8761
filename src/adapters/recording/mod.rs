//! Recording adapters that capture interactions to cassettes.

pub mod tracker;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;

use crate::cassette::recorder::CassetteRecorder;

pub use tracker::RecordingTracker;

/// Record a `Result<T, E>` interaction using the Ok/Err JSON convention.
///
/// - `Ok(v)` is serialized as `{"Ok": v}`
/// - `Err(e)` is serialized as `{"Err": e.to_string()}`
///
/// A value that cannot be serialized is recorded as `null` and logged.
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    let input_json = serde_json::to_value(input).unwrap_or_else(|e| {
        warn!(method, error = %e, "failed to serialize recorded input");
        serde_json::Value::Null
    });

    let output_json = match result {
        Ok(v) => {
            let inner = serde_json::to_value(v).unwrap_or_else(|e| {
                warn!(method, error = %e, "failed to serialize recorded output");
                serde_json::Value::Null
            });
            serde_json::json!({ "Ok": inner })
        }
        Err(e) => serde_json::json!({ "Err": e.to_string() }),
    };

    match recorder.lock() {
        Ok(mut guard) => guard.record(method, input_json, output_json),
        Err(_) => warn!(method, "recorder lock poisoned; interaction dropped"),
    }
}
