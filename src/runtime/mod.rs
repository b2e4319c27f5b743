//! # Runtime
//!
//! Controller runtime shared by every kind.
//!
//! - `error_policy`: per-resource Fibonacci backoff and watch stream error classification
//! - `watch_loop`: the kube-runtime `Controller` loop with restart handling

pub mod error_policy;
pub mod watch_loop;
