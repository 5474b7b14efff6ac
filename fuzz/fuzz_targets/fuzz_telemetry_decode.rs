//! Fuzz target: telemetry record decode path (as exercised by the relay).
//!
//! The relay must survive arbitrary bytes on the telemetry topic: decode
//! either fails cleanly or yields a record that re-serializes.
//!
//! cargo fuzz run fuzz_telemetry_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use greenhouse::app::events::TelemetryRecord;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = serde_json::from_slice::<TelemetryRecord>(data) {
        // Anything that decodes must serialize back without panicking.
        let _ = serde_json::to_vec(&record);
    }
});
