//! Trim lifecycle core: timestamp parsing, the operation state machine and
//! the controller that drives a single request against the trim service.

pub mod cancel;
pub mod controller;
pub mod error;
pub mod request;
pub mod state;
pub mod time;
