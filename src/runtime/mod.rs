//! Compatibility runtime
//!
//! This module provides the evaluation engine, the worker message protocol,
//! and the request handling boundary. On native targets it also provides an
//! asynchronous worker pool.

pub mod handler;
pub mod protocol;
pub mod timer;
pub mod validation;

#[cfg(not(target_arch = "wasm32"))]
pub mod worker;

pub use handler::MessageHandler;
pub use protocol::{Envelope, Request, RequestKind, Response, ResponseData, ResponseKind};
pub use validation::CompatibilityEngine;

#[cfg(not(target_arch = "wasm32"))]
pub use worker::{CompatibilityService, CompatibilityWorker, WorkerError};
