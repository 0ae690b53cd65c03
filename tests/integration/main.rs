//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock or simulated adapters.  All tests run on the host
//! (x86_64) with no real hardware or network required.

#![cfg(not(target_os = "espidf"))]

mod firebase_flow_tests;
mod mock_hw;
mod service_tests;
