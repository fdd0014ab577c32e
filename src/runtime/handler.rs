//! Message handling boundary
//!
//! Turns one request into exactly one response. Nothing escapes this layer as
//! an error or a panic: malformed input, unknown message types, and faults
//! during evaluation all become `ERROR` responses, so one bad request never
//! takes the worker down.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use super::protocol::{Envelope, ProtocolError, Request, RequestKind, Response};
use super::validation::CompatibilityEngine;

/// Stateless request handler around a `CompatibilityEngine`
#[derive(Clone, Default)]
pub struct MessageHandler {
    engine: CompatibilityEngine,
}

impl MessageHandler {
    pub fn new(engine: CompatibilityEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &CompatibilityEngine {
        &self.engine
    }

    /// Handle a typed request
    pub fn handle(&self, request: &Request) -> Response {
        debug!(id = %request.id, kind = request.kind.type_name(), "handling request");
        self.guarded(&request.id, |engine| dispatch(engine, &request.id, &request.kind))
    }

    /// Handle a wire envelope whose payload has not been decoded yet
    pub fn handle_envelope(&self, envelope: &Envelope) -> Response {
        match envelope.decode() {
            Ok(kind) => {
                debug!(id = %envelope.id, kind = kind.type_name(), "handling request");
                self.guarded(&envelope.id, |engine| dispatch(engine, &envelope.id, &kind))
            }
            Err(err) => {
                warn!(id = %envelope.id, "{}", err);
                Response::error(envelope.id.clone(), err.to_string())
            }
        }
    }

    /// Handle one JSON-encoded request and return the JSON-encoded response
    pub fn handle_json(&self, input: &str) -> String {
        let response = match serde_json::from_str::<Envelope>(input) {
            Ok(envelope) => self.handle_envelope(&envelope),
            Err(err) => {
                let err = ProtocolError::Malformed(err.to_string());
                warn!("{}", err);
                Response::error(recover_id(input), err.to_string())
            }
        };
        encode(&response)
    }

    /// Run evaluation, converting a panic into an `ERROR` response.
    fn guarded<F>(&self, id: &str, f: F) -> Response
    where
        F: FnOnce(&CompatibilityEngine) -> Response,
    {
        match panic::catch_unwind(AssertUnwindSafe(|| f(&self.engine))) {
            Ok(response) => response,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(id, "evaluation panicked: {}", message);
                Response::error(id, message)
            }
        }
    }
}

fn dispatch(engine: &CompatibilityEngine, id: &str, kind: &RequestKind) -> Response {
    // A missing context is rejected the same way as an unknown one
    match kind {
        RequestKind::Check(p) => {
            let context = p.context.as_deref().unwrap_or_default();
            Response::verdict(id, engine.check(&p.block, context, &p.existing_blocks))
        }
        RequestKind::Batch(p) => {
            let context = p.context.as_deref().unwrap_or_default();
            Response::batch(id, engine.check_batch(&p.blocks, context, &p.existing_blocks))
        }
    }
}

/// Best-effort `id` extraction from input that failed envelope decoding
pub(crate) fn recover_id(input: &str) -> String {
    serde_json::from_str::<serde_json::Value>(input)
        .ok()
        .and_then(|v| match v.get("id") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

pub(crate) fn encode(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        format!(
            r#"{{"id":{},"type":"ERROR","data":{{"error":{}}}}}"#,
            serde_json::Value::String(response.id.clone()),
            serde_json::Value::String(e.to_string())
        )
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error during compatibility check".to_string()
    }
}
