//! WASM bindings for running the codec in the editor frontend.
//!
//! This module exposes conversion and round-trip checking to JavaScript
//! via wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::convert::{self, ConvertContext};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Result of a round-trip check, readable from JavaScript as
/// `{ warn, annotated }`.
#[wasm_bindgen]
pub struct CheckOutcome {
    warn: bool,
    annotated: String,
}

#[wasm_bindgen]
impl CheckOutcome {
    #[wasm_bindgen(getter)]
    pub fn warn(&self) -> bool {
        self.warn
    }

    #[wasm_bindgen(getter)]
    pub fn annotated(&self) -> String {
        self.annotated.clone()
    }
}

/// Normalize persisted markup.
///
/// Parses, repairs, and re-serializes; returns the clean markup string.
#[wasm_bindgen]
pub fn convert_markup(markup: &str, language: Option<String>) -> Result<String, JsValue> {
    let ctx = context(language);
    let doc =
        convert::read_document(markup, &ctx).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(convert::write_document(&doc, &ctx))
}

/// Round-trip markup and report whether saving it would lose content.
#[wasm_bindgen]
pub fn check_markup(markup: &str, language: Option<String>) -> Result<CheckOutcome, JsValue> {
    let ctx = context(language);
    let outcome =
        convert::check_markup(markup, &ctx).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(CheckOutcome {
        warn: outcome.warn,
        annotated: outcome.annotated,
    })
}

fn context(language: Option<String>) -> ConvertContext {
    match language {
        Some(lang) => ConvertContext::with_language(lang),
        None => ConvertContext::new(),
    }
}
