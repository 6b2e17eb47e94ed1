//! Contract Interface Spec Decoder
//!
//! Recovers the function signatures a contract declares in its interface
//! spec section (the `contractspecv0` wasm custom section): a concatenation
//! of self-delimited XDR entries with no outer framing.
//!
//! # Pipeline
//!
//! 1. **Boundary scan** ([`scanner`]): partition the buffer into entries by
//!    asking the XDR decoder which prefix decodes exactly. An undecodable
//!    tail stops the scan and is reported as a [`Truncation`], never an error.
//! 2. **Projection** ([`signature`], [`interface`]): turn function entries
//!    into [`FunctionSignature`]s, or every entry into a [`ContractInterface`].
//!    A validated entry that still fails projection is a
//!    [`SpecError::MalformedRecord`].
//!
//! An unrecognised type code fails XDR validation, so the entry holding it
//! and every entry after it end up in the truncated tail. The
//! [`TypeName::Unknown`] sentinel therefore never appears in a decoded
//! [`FunctionSignature`]; only [`TypeName::from_code`] produces it.
//!
//! # Usage
//!
//! ```ignore
//! use lib_contract_spec::{contract_spec_section, decode_function_signatures};
//!
//! let section = contract_spec_section(&wasm)?;
//! let outcome = decode_function_signatures(section)?;
//! if outcome.is_truncated() {
//!     tracing::warn!("spec truncated: {:?}", outcome.truncation);
//! }
//! for signature in &outcome.signatures {
//!     println!("{}", signature.name);
//! }
//! ```

pub mod config;
pub mod decoder;
pub mod entry;
pub mod errors;
pub mod interface;
pub mod observer;
pub mod scanner;
pub mod signature;
pub mod source;
pub mod task;
pub mod types;
pub mod wasm;
pub mod xdr;

pub use config::{DecoderConfig, ScanStrategy, CONTRACT_SPEC_SECTION};
pub use decoder::{decode_function_signatures, DecodeOutcome, InterfaceOutcome, SpecDecoder};
pub use entry::{EntryKind, FunctionSpec, SpecEntry};
pub use errors::{SpecError, SpecResult};
pub use interface::ContractInterface;
pub use observer::{DecodeObserver, NoopObserver, RecordingObserver, ScanEvent, TracingObserver};
pub use scanner::{
    BoundaryScanner, BruteForceScanner, DecodedRecord, ScanOutcome, StreamingScanner, Truncation,
};
pub use signature::{extract_signature, FunctionInput, FunctionOutput, FunctionSignature};
pub use source::{load_spec_bytes, SpecSource};
pub use task::decode_with_deadline;
pub use types::{TypeDef, TypeName};
pub use wasm::{contract_spec_section, custom_section};
pub use xdr::{Limits, ReadXdr, WriteXdr, XdrError};
