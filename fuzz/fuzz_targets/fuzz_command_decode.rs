//! Fuzz target: `RemoteCommand::decode`
//!
//! Drives arbitrary byte sequences into the remote-command decoder and
//! asserts that it never panics and that the toggle predicates are
//! consistent on anything that decodes.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use greenhouse::app::commands::RemoteCommand;

fuzz_target!(|data: &[u8]| {
    if let Ok(cmd) = RemoteCommand::decode(data) {
        // Predicates are pure — calling them twice must agree.
        assert_eq!(cmd.wants_mode_toggle(), cmd.wants_mode_toggle());
        assert_eq!(cmd.wants_motor_toggle(), cmd.wants_motor_toggle());
    }
});
