//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the rules of the GasGuard monitor: when to
//! report, which remote values to accept, and how the buzzer self-test
//! steps.  All interaction with hardware and the network happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod buzzer;
pub mod commands;
pub mod events;
pub mod listener;
pub mod ports;
pub mod reporter;
pub mod service;
pub mod state;
