//! WASM API: `#[wasm_bindgen]` exports for the editor's compatibility worker.
//!
//! This module is only compiled when targeting `wasm32`. It provides:
//! - `init_engine` / `destroy_engine`: lifecycle
//! - `handle_message`: the full `{ id, type, data }` protocol
//! - `check_compatibility` / `batch_check`: direct calls without an envelope
//! - `get_rules`: rule and migration tables for tooling

use std::cell::RefCell;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::core::{Block, CompatibilityRule, RuleRegistry};
use crate::categories::MigrationRule;
use crate::runtime::handler::{encode, recover_id};
use crate::runtime::{CompatibilityEngine, MessageHandler, Response};

// ── Global state ────────────────────────────────────────────────────────────

thread_local! {
    static HANDLER: RefCell<Option<MessageHandler>> = RefCell::new(None);
}

fn with_handler<R>(f: impl FnOnce(&MessageHandler) -> R) -> Result<R, String> {
    HANDLER.with(|cell| match cell.borrow().as_ref() {
        Some(handler) => Ok(f(handler)),
        None => Err("Engine not initialized. Call init_engine() first.".into()),
    })
}

// ── JSON interchange types ──────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RulesResponse {
    rules: Vec<CompatibilityRule>,
    migrations: Vec<MigrationRule>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn json_err(msg: impl Into<String>) -> String {
    serde_json::to_string(&ErrorResponse { error: msg.into() }).unwrap_or_default()
}

fn parse_blocks(json: &str, what: &str) -> Result<Vec<Block>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

// ── Exported functions ──────────────────────────────────────────────────────

#[wasm_bindgen]
pub fn init_engine() {
    console_error_panic_hook::set_once();

    HANDLER.with(|cell| {
        *cell.borrow_mut() = Some(MessageHandler::new(CompatibilityEngine::new(
            RuleRegistry::with_defaults(),
        )));
    });
}

#[wasm_bindgen]
pub fn destroy_engine() {
    HANDLER.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Handle one protocol message; always returns exactly one response envelope.
#[wasm_bindgen]
pub fn handle_message(request_json: &str) -> String {
    match with_handler(|h| h.handle_json(request_json)) {
        Ok(out) => out,
        Err(e) => encode(&Response::error(recover_id(request_json), e)),
    }
}

/// Returns a `ValidationVerdict` as JSON, or `{ "error": ... }`.
#[wasm_bindgen]
pub fn check_compatibility(block_json: &str, context: &str, existing_json: &str) -> String {
    let block: Block = match serde_json::from_str(block_json) {
        Ok(b) => b,
        Err(e) => return json_err(format!("Invalid block JSON: {}", e)),
    };
    let existing = match parse_blocks(existing_json, "existing blocks") {
        Ok(b) => b,
        Err(e) => return json_err(e),
    };

    match with_handler(|h| h.engine().check(&block, context, &existing)) {
        Ok(verdict) => serde_json::to_string(&verdict).unwrap_or_default(),
        Err(e) => json_err(e),
    }
}

/// Returns an array of `ValidationVerdict` as JSON, or `{ "error": ... }`.
#[wasm_bindgen]
pub fn batch_check(blocks_json: &str, context: &str, existing_json: &str) -> String {
    let blocks = match parse_blocks(blocks_json, "blocks") {
        Ok(b) => b,
        Err(e) => return json_err(e),
    };
    let existing = match parse_blocks(existing_json, "existing blocks") {
        Ok(b) => b,
        Err(e) => return json_err(e),
    };

    match with_handler(|h| h.engine().check_batch(&blocks, context, &existing)) {
        Ok(verdicts) => serde_json::to_string(&verdicts).unwrap_or_default(),
        Err(e) => json_err(e),
    }
}

#[wasm_bindgen]
pub fn get_rules() -> String {
    match with_handler(|h| {
        let registry = h.engine().registry();
        RulesResponse {
            rules: registry.rules(),
            migrations: registry.migrations(),
        }
    }) {
        Ok(rules) => serde_json::to_string(&rules).unwrap_or_default(),
        Err(e) => json_err(e),
    }
}
