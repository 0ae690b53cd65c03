//! Fuzz target: JSON value tagging and command decoding
//!
//! Parses arbitrary bytes as JSON and runs the result through the
//! listener's decoder for both watched paths.  Any accepted command must
//! agree with the value's tag.
//!
//! cargo fuzz run fuzz_remote_value

#![no_main]

use gasguard::app::commands::RemoteCommand;
use gasguard::app::listener::{WATCHED_PATHS, decode};
use gasguard::rtdb::{RemoteValue, ValueTag};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let value = RemoteValue::from_json(json);
    for path in WATCHED_PATHS {
        match decode(path, &value) {
            Some(RemoteCommand::SetBuzzerTest(_)) => assert_eq!(value.tag(), ValueTag::Boolean),
            Some(RemoteCommand::SetSmokeThreshold(_)) => assert_eq!(value.tag(), ValueTag::Integer),
            None => {}
        }
    }
});
