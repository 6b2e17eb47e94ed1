//! Full contract interface projection
//!
//! Where [`crate::FunctionSignature`] keeps only the outer type code of
//! each parameter, [`ContractInterface`] projects every entry kind and
//! renders complete types (`Option<u32>`, `Map<Symbol, i128>`, ...).

use serde::{Deserialize, Serialize};

use crate::entry::{
    EnumSpec, EventDataFormat, EventParamLocation, EventSpec, FunctionSpec, SpecEntry,
    StructSpec, UnionCaseSpec, UnionSpec,
};
use crate::errors::{SpecError, SpecResult};
use crate::scanner::DecodedRecord;
use crate::signature::{docs_field, utf8_field};
use crate::types::{TypeDef, TypeName};

/// Every definition recovered from a contract spec, in section order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInterface {
    pub functions: Vec<FunctionDefinition>,
    pub structs: Vec<StructDefinition>,
    pub unions: Vec<UnionDefinition>,
    pub enums: Vec<EnumDefinition>,
    pub error_enums: Vec<EnumDefinition>,
    pub events: Vec<EventDefinition>,
}

/// Named, typed slot (function input, struct field)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    pub docs: Option<String>,
    #[serde(rename = "type")]
    pub type_def: String,
    pub code: TypeName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub docs: Option<String>,
    pub inputs: Vec<NamedType>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lib: Option<String>,
    pub docs: Option<String>,
    pub fields: Vec<NamedType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lib: Option<String>,
    pub docs: Option<String>,
    pub cases: Vec<UnionCaseDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionCaseDefinition {
    pub name: String,
    pub docs: Option<String>,
    /// Empty for unit cases
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lib: Option<String>,
    pub docs: Option<String>,
    pub cases: Vec<EnumCaseDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumCaseDefinition {
    pub name: String,
    pub docs: Option<String>,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lib: Option<String>,
    pub docs: Option<String>,
    pub prefix_topics: Vec<String>,
    pub params: Vec<EventParamDefinition>,
    pub data_format: EventDataFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParamDefinition {
    pub name: String,
    pub docs: Option<String>,
    #[serde(rename = "type")]
    pub type_def: String,
    pub location: EventParamLocation,
}

fn render(type_def: &TypeDef, offset: usize) -> SpecResult<String> {
    type_def
        .render()
        .map_err(|e| SpecError::malformed(offset, format!("type name is not valid UTF-8: {}", e)))
}

fn named(
    name: &[u8],
    doc: &[u8],
    type_def: &TypeDef,
    offset: usize,
) -> SpecResult<NamedType> {
    Ok(NamedType {
        name: utf8_field(name, offset, "field name")?,
        docs: docs_field(doc, offset, "field docs")?,
        type_def: render(type_def, offset)?,
        code: type_def.type_name(),
    })
}

fn required_name(bytes: &[u8], offset: usize, what: &str) -> SpecResult<String> {
    let name = utf8_field(bytes, offset, what)?;
    if name.is_empty() {
        return Err(SpecError::malformed(offset, format!("{} is empty", what)));
    }
    Ok(name)
}

impl FunctionDefinition {
    fn project(function: &FunctionSpec, offset: usize) -> SpecResult<Self> {
        Ok(Self {
            name: required_name(&function.name, offset, "function name")?,
            docs: docs_field(&function.doc, offset, "function docs")?,
            inputs: function
                .inputs
                .iter()
                .map(|input| named(&input.name, &input.doc, &input.type_def, offset))
                .collect::<SpecResult<_>>()?,
            outputs: function
                .outputs
                .iter()
                .map(|output| render(output, offset))
                .collect::<SpecResult<_>>()?,
        })
    }
}

impl StructDefinition {
    fn project(udt: &StructSpec, offset: usize) -> SpecResult<Self> {
        Ok(Self {
            name: required_name(&udt.name, offset, "struct name")?,
            lib: docs_field(&udt.lib, offset, "struct lib")?,
            docs: docs_field(&udt.doc, offset, "struct docs")?,
            fields: udt
                .fields
                .iter()
                .map(|field| named(&field.name, &field.doc, &field.type_def, offset))
                .collect::<SpecResult<_>>()?,
        })
    }
}

impl UnionDefinition {
    fn project(udt: &UnionSpec, offset: usize) -> SpecResult<Self> {
        let cases = udt
            .cases
            .iter()
            .map(|case| -> SpecResult<UnionCaseDefinition> {
                Ok(match case {
                    UnionCaseSpec::Void { doc, name } => UnionCaseDefinition {
                        name: utf8_field(name, offset, "union case name")?,
                        docs: docs_field(doc, offset, "union case docs")?,
                        types: Vec::new(),
                    },
                    UnionCaseSpec::Tuple { doc, name, types } => UnionCaseDefinition {
                        name: utf8_field(name, offset, "union case name")?,
                        docs: docs_field(doc, offset, "union case docs")?,
                        types: types
                            .iter()
                            .map(|ty| render(ty, offset))
                            .collect::<SpecResult<_>>()?,
                    },
                })
            })
            .collect::<SpecResult<_>>()?;

        Ok(Self {
            name: required_name(&udt.name, offset, "union name")?,
            lib: docs_field(&udt.lib, offset, "union lib")?,
            docs: docs_field(&udt.doc, offset, "union docs")?,
            cases,
        })
    }
}

impl EnumDefinition {
    fn project(udt: &EnumSpec, offset: usize) -> SpecResult<Self> {
        Ok(Self {
            name: required_name(&udt.name, offset, "enum name")?,
            lib: docs_field(&udt.lib, offset, "enum lib")?,
            docs: docs_field(&udt.doc, offset, "enum docs")?,
            cases: udt
                .cases
                .iter()
                .map(|case| -> SpecResult<EnumCaseDefinition> {
                    Ok(EnumCaseDefinition {
                        name: utf8_field(&case.name, offset, "enum case name")?,
                        docs: docs_field(&case.doc, offset, "enum case docs")?,
                        value: case.value,
                    })
                })
                .collect::<SpecResult<_>>()?,
        })
    }
}

impl EventDefinition {
    fn project(event: &EventSpec, offset: usize) -> SpecResult<Self> {
        Ok(Self {
            name: required_name(&event.name, offset, "event name")?,
            lib: docs_field(&event.lib, offset, "event lib")?,
            docs: docs_field(&event.doc, offset, "event docs")?,
            prefix_topics: event
                .prefix_topics
                .iter()
                .map(|topic| utf8_field(topic, offset, "event topic"))
                .collect::<SpecResult<_>>()?,
            params: event
                .params
                .iter()
                .map(|param| -> SpecResult<EventParamDefinition> {
                    Ok(EventParamDefinition {
                        name: utf8_field(&param.name, offset, "event param name")?,
                        docs: docs_field(&param.doc, offset, "event param docs")?,
                        type_def: render(&param.type_def, offset)?,
                        location: param.location,
                    })
                })
                .collect::<SpecResult<_>>()?,
            data_format: event.data_format,
        })
    }
}

impl ContractInterface {
    /// Project every record, keeping section order within each kind
    pub fn from_records(records: &[DecodedRecord]) -> SpecResult<Self> {
        let mut interface = Self::default();
        for record in records {
            let offset = record.offset;
            match &record.entry {
                SpecEntry::Function(function) => interface
                    .functions
                    .push(FunctionDefinition::project(function, offset)?),
                SpecEntry::Struct(udt) => {
                    interface.structs.push(StructDefinition::project(udt, offset)?)
                }
                SpecEntry::Union(udt) => interface.unions.push(UnionDefinition::project(udt, offset)?),
                SpecEntry::Enum(udt) => interface.enums.push(EnumDefinition::project(udt, offset)?),
                SpecEntry::ErrorEnum(udt) => interface
                    .error_enums
                    .push(EnumDefinition::project(udt, offset)?),
                SpecEntry::Event(event) => {
                    interface.events.push(EventDefinition::project(event, offset)?)
                }
            }
        }
        Ok(interface)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.structs.is_empty()
            && self.unions.is_empty()
            && self.enums.is_empty()
            && self.error_enums.is_empty()
            && self.events.is_empty()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// BLAKE3 hash of the compact JSON form
    ///
    /// Stable for a given interface because every collection is ordered.
    pub fn fingerprint(&self) -> SpecResult<[u8; 32]> {
        let json = serde_json::to_vec(self)
            .map_err(|e| SpecError::Serialization(format!("Failed to encode interface: {}", e)))?;
        Ok(*blake3::hash(&json).as_bytes())
    }

    pub fn fingerprint_hex(&self) -> SpecResult<String> {
        Ok(hex::encode(self.fingerprint()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EnumCaseSpec, EventParamSpec, StructFieldSpec};

    fn record(entry: SpecEntry, offset: usize) -> DecodedRecord {
        DecodedRecord {
            offset,
            length: 0,
            entry,
        }
    }

    fn token_records() -> Vec<DecodedRecord> {
        vec![
            record(
                SpecEntry::Struct(StructSpec {
                    doc: Vec::new(),
                    lib: Vec::new(),
                    name: b"Allowance".to_vec(),
                    fields: vec![StructFieldSpec {
                        doc: b"Spend limit".to_vec(),
                        name: b"amount".to_vec(),
                        type_def: TypeDef::I128,
                    }],
                }),
                0,
            ),
            record(
                SpecEntry::Function(
                    FunctionSpec::new("balance")
                        .with_input("id", TypeDef::Address)
                        .with_output(TypeDef::I128),
                ),
                64,
            ),
            record(
                SpecEntry::Union(UnionSpec {
                    doc: Vec::new(),
                    lib: Vec::new(),
                    name: b"DataKey".to_vec(),
                    cases: vec![
                        UnionCaseSpec::Void {
                            doc: Vec::new(),
                            name: b"Admin".to_vec(),
                        },
                        UnionCaseSpec::Tuple {
                            doc: Vec::new(),
                            name: b"Balance".to_vec(),
                            types: vec![TypeDef::Address],
                        },
                    ],
                }),
                128,
            ),
            record(
                SpecEntry::ErrorEnum(EnumSpec {
                    doc: Vec::new(),
                    lib: Vec::new(),
                    name: b"TokenError".to_vec(),
                    cases: vec![EnumCaseSpec {
                        doc: Vec::new(),
                        name: b"InsufficientBalance".to_vec(),
                        value: 3,
                    }],
                }),
                192,
            ),
            record(
                SpecEntry::Event(EventSpec {
                    doc: Vec::new(),
                    lib: Vec::new(),
                    name: b"mint".to_vec(),
                    prefix_topics: vec![b"mint".to_vec()],
                    params: vec![EventParamSpec {
                        doc: Vec::new(),
                        name: b"amount".to_vec(),
                        type_def: TypeDef::option(TypeDef::I128),
                        location: EventParamLocation::Data,
                    }],
                    data_format: EventDataFormat::SingleValue,
                }),
                256,
            ),
        ]
    }

    #[test]
    fn test_projects_every_kind() {
        let interface = ContractInterface::from_records(&token_records()).unwrap();

        assert_eq!(interface.structs[0].name, "Allowance");
        assert_eq!(interface.structs[0].fields[0].docs.as_deref(), Some("Spend limit"));
        assert_eq!(interface.structs[0].fields[0].type_def, "i128");

        let balance = interface.function("balance").unwrap();
        assert_eq!(balance.inputs[0].code, TypeName::Address);
        assert_eq!(balance.outputs, vec!["i128".to_string()]);

        assert_eq!(interface.unions[0].cases[0].types.len(), 0);
        assert_eq!(interface.unions[0].cases[1].types, vec!["Address".to_string()]);
        assert_eq!(interface.error_enums[0].cases[0].value, 3);
        assert_eq!(interface.events[0].params[0].type_def, "Option<i128>");
        assert!(interface.enums.is_empty());
    }

    #[test]
    fn test_malformed_udt_reference_names_offset() {
        let records = vec![record(
            SpecEntry::Function(
                FunctionSpec::new("get").with_output(TypeDef::Udt(vec![0xff])),
            ),
            40,
        )];
        let err = ContractInterface::from_records(&records).unwrap_err();
        assert!(matches!(err, SpecError::MalformedRecord { offset: 40, .. }));
    }

    #[test]
    fn test_fingerprint_is_deterministic_and_order_sensitive() {
        let records = token_records();
        let a = ContractInterface::from_records(&records).unwrap();
        let b = ContractInterface::from_records(&records).unwrap();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint_hex().unwrap().len(), 64);

        let mut shuffled = a.clone();
        shuffled.functions.push(shuffled.functions[0].clone());
        assert_ne!(a.fingerprint().unwrap(), shuffled.fingerprint().unwrap());
    }

    #[test]
    fn test_empty_interface() {
        let interface = ContractInterface::from_records(&[]).unwrap();
        assert!(interface.is_empty());
    }

    #[test]
    fn test_missing_docs_serialize_as_null_everywhere() {
        let interface = ContractInterface::from_records(&token_records()).unwrap();
        let json = serde_json::to_value(&interface).unwrap();

        assert!(json["functions"][0]["docs"].is_null());
        assert!(json["functions"][0]["inputs"][0]
            .as_object()
            .unwrap()
            .contains_key("docs"));
        assert!(json["functions"][0]["inputs"][0]["docs"].is_null());
        assert_eq!(json["structs"][0]["fields"][0]["docs"], "Spend limit");
        assert!(json["unions"][0]["cases"][0]["docs"].is_null());
        assert!(json["error_enums"][0]["cases"][0]["docs"].is_null());
        assert!(json["events"][0]["params"][0]
            .as_object()
            .unwrap()
            .contains_key("docs"));
    }
}
