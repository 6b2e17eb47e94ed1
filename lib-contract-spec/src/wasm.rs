//! Wasm custom section lookup
//!
//! Compiled contracts carry their interface spec in a custom section named
//! `contractspecv0`. Only section headers are parsed; code and data
//! sections are skipped.

use wasmparser::{Parser, Payload};

use crate::config::CONTRACT_SPEC_SECTION;
use crate::errors::{SpecError, SpecResult};

/// Wasm binary magic number
pub const WASM_MAGIC: [u8; 4] = *b"\0asm";

/// Contents of the first custom section called `name`, if any
pub fn custom_section<'a>(module: &'a [u8], name: &str) -> SpecResult<Option<&'a [u8]>> {
    for payload in Parser::new(0).parse_all(module) {
        let payload = payload.map_err(|e| SpecError::InvalidModule(format!("parse error: {e}")))?;
        if let Payload::CustomSection(reader) = payload {
            if reader.name() == name {
                return Ok(Some(reader.data()));
            }
        }
    }
    Ok(None)
}

/// The contract spec section; missing section is an error
pub fn contract_spec_section(module: &[u8]) -> SpecResult<&[u8]> {
    custom_section(module, CONTRACT_SPEC_SECTION)?
        .ok_or_else(|| SpecError::SectionNotFound(CONTRACT_SPEC_SECTION.to_string()))
}

pub fn is_wasm_module(bytes: &[u8]) -> bool {
    bytes.starts_with(&WASM_MAGIC)
}
