//! Application-level orchestration.
//!
//! Owns the publication controller on an async task and serialises UI
//! commands into controller operations, so presentation layers never mutate
//! dashboard state directly.

mod controller;

pub(crate) use controller::run_controller;
