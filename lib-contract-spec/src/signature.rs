//! Function signature extraction
//!
//! Projects function entries into the flat signature model handed to
//! downstream services. Only entries that already passed XDR validation
//! reach this step, so any failure here is reported as
//! [`SpecError::MalformedRecord`] with the entry's byte offset.

use serde::{Deserialize, Serialize};

use crate::entry::FunctionSpec;
use crate::errors::{SpecError, SpecResult};
use crate::scanner::DecodedRecord;
use crate::types::TypeName;

/// Callable function exposed by a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,

    /// `None` when the entry carries no documentation
    pub docs: Option<String>,

    /// Parameters in declaration order
    pub inputs: Vec<FunctionInput>,

    /// Return types in declaration order
    pub outputs: Vec<FunctionOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInput {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: TypeName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionOutput {
    #[serde(rename = "type")]
    pub type_name: TypeName,
}

/// Decode a UTF-8 field of the entry at `offset`
pub(crate) fn utf8_field(bytes: &[u8], offset: usize, field: &str) -> SpecResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| SpecError::malformed(offset, format!("{} is not valid UTF-8: {}", field, e)))
}

/// Documentation strings collapse to `None` when empty
pub(crate) fn docs_field(bytes: &[u8], offset: usize, field: &str) -> SpecResult<Option<String>> {
    let docs = utf8_field(bytes, offset, field)?;
    Ok(if docs.is_empty() { None } else { Some(docs) })
}

/// Project a function entry decoded at `offset`
pub fn project_function(function: &FunctionSpec, offset: usize) -> SpecResult<FunctionSignature> {
    let name = utf8_field(&function.name, offset, "function name")?;
    if name.is_empty() {
        return Err(SpecError::malformed(offset, "function name is empty"));
    }
    let docs = docs_field(&function.doc, offset, "function docs")?;

    let inputs = function
        .inputs
        .iter()
        .map(|input| -> SpecResult<FunctionInput> {
            Ok(FunctionInput {
                name: utf8_field(&input.name, offset, "input name")?,
                type_name: input.type_def.type_name(),
            })
        })
        .collect::<SpecResult<Vec<_>>>()?;

    let outputs = function
        .outputs
        .iter()
        .map(|output| FunctionOutput {
            type_name: output.type_name(),
        })
        .collect();

    Ok(FunctionSignature {
        name,
        docs,
        inputs,
        outputs,
    })
}

/// Signature for a function record; `None` for every other record kind
pub fn extract_signature(record: &DecodedRecord) -> SpecResult<Option<FunctionSignature>> {
    match record.entry.as_function() {
        Some(function) => project_function(function, record.offset).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EnumSpec, SpecEntry};
    use crate::types::TypeDef;

    fn record(entry: SpecEntry, offset: usize) -> DecodedRecord {
        DecodedRecord {
            offset,
            length: 0,
            entry,
        }
    }

    #[test]
    fn test_increment_signature() {
        let entry = SpecEntry::Function(FunctionSpec::new("increment").with_output(TypeDef::U32));
        let signature = extract_signature(&record(entry, 0)).unwrap().unwrap();

        assert_eq!(signature.name, "increment");
        assert_eq!(signature.docs, None);
        assert!(signature.inputs.is_empty());
        assert_eq!(
            signature.outputs,
            vec![FunctionOutput {
                type_name: TypeName::U32
            }]
        );
    }

    #[test]
    fn test_signature_json_shape() {
        let entry = SpecEntry::Function(
            FunctionSpec::new("transfer")
                .with_doc("Move funds")
                .with_input("to", TypeDef::Address)
                .with_input("amount", TypeDef::I128),
        );
        let signature = extract_signature(&record(entry, 0)).unwrap().unwrap();
        let json = serde_json::to_value(&signature).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "transfer",
                "docs": "Move funds",
                "inputs": [
                    { "name": "to", "type": "SC_SPEC_TYPE_ADDRESS" },
                    { "name": "amount", "type": "SC_SPEC_TYPE_I128" }
                ],
                "outputs": []
            })
        );
    }

    #[test]
    fn test_compound_types_project_to_outer_code() {
        let entry = SpecEntry::Function(
            FunctionSpec::new("lookup")
                .with_input("key", TypeDef::option(TypeDef::Symbol))
                .with_output(TypeDef::result(TypeDef::vec(TypeDef::U64), TypeDef::Error)),
        );
        let signature = extract_signature(&record(entry, 0)).unwrap().unwrap();
        assert_eq!(signature.inputs[0].type_name, TypeName::Option);
        assert_eq!(signature.outputs[0].type_name, TypeName::Result);
    }

    #[test]
    fn test_non_function_records_yield_none() {
        let entry = SpecEntry::Enum(EnumSpec {
            doc: Vec::new(),
            lib: Vec::new(),
            name: b"Color".to_vec(),
            cases: Vec::new(),
        });
        assert_eq!(extract_signature(&record(entry, 0)).unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let mut function = FunctionSpec::new("ok");
        function.name = vec![0xc3, 0x28];
        let err = extract_signature(&record(SpecEntry::Function(function), 96)).unwrap_err();
        assert!(matches!(err, SpecError::MalformedRecord { offset: 96, .. }));
    }

    #[test]
    fn test_empty_name_is_malformed() {
        let function = FunctionSpec::new("");
        let err = extract_signature(&record(SpecEntry::Function(function), 12)).unwrap_err();
        assert_eq!(
            err,
            SpecError::MalformedRecord {
                offset: 12,
                reason: "function name is empty".to_string()
            }
        );
    }
}
