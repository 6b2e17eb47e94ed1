//! Spec entry records
//!
//! A contract's interface section is a concatenation of XDR-encoded
//! [`SpecEntry`] values with no outer framing. Each entry is a union keyed
//! by [`EntryKind`]; string fields are kept as raw bytes here and only
//! checked for UTF-8 when projected.

use serde::{Deserialize, Serialize};

use crate::types::{TypeDef, UDT_NAME_MAX};
use crate::xdr::{ReadXdr, WriteXdr, XdrError, XdrReader, XdrResult, XdrWriter};

pub const DOC_MAX: u32 = 1024;
pub const SYMBOL_MAX: u32 = 32;
pub const LIB_MAX: u32 = 80;
pub const FIELD_NAME_MAX: u32 = 30;
pub const FUNCTION_INPUTS_MAX: u32 = 10;
pub const FUNCTION_OUTPUTS_MAX: u32 = 1;
pub const STRUCT_FIELDS_MAX: u32 = 40;
pub const UNION_CASES_MAX: u32 = 50;
pub const UNION_CASE_TYPES_MAX: u32 = 12;
pub const ENUM_CASES_MAX: u32 = 50;
pub const EVENT_PREFIX_TOPICS_MAX: u32 = 2;
pub const EVENT_PARAMS_MAX: u32 = 50;

/// Entry discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    FunctionV0,
    UdtStructV0,
    UdtUnionV0,
    UdtEnumV0,
    UdtErrorEnumV0,
    EventV0,
}

impl EntryKind {
    pub fn discriminant(self) -> i32 {
        match self {
            EntryKind::FunctionV0 => 0,
            EntryKind::UdtStructV0 => 1,
            EntryKind::UdtUnionV0 => 2,
            EntryKind::UdtEnumV0 => 3,
            EntryKind::UdtErrorEnumV0 => 4,
            EntryKind::EventV0 => 5,
        }
    }

    pub fn from_discriminant(value: i32) -> Option<Self> {
        match value {
            0 => Some(EntryKind::FunctionV0),
            1 => Some(EntryKind::UdtStructV0),
            2 => Some(EntryKind::UdtUnionV0),
            3 => Some(EntryKind::UdtEnumV0),
            4 => Some(EntryKind::UdtErrorEnumV0),
            5 => Some(EntryKind::EventV0),
            _ => None,
        }
    }
}

/// One decoded spec entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecEntry {
    Function(FunctionSpec),
    Struct(StructSpec),
    Union(UnionSpec),
    Enum(EnumSpec),
    ErrorEnum(EnumSpec),
    Event(EventSpec),
}

impl SpecEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            SpecEntry::Function(_) => EntryKind::FunctionV0,
            SpecEntry::Struct(_) => EntryKind::UdtStructV0,
            SpecEntry::Union(_) => EntryKind::UdtUnionV0,
            SpecEntry::Enum(_) => EntryKind::UdtEnumV0,
            SpecEntry::ErrorEnum(_) => EntryKind::UdtErrorEnumV0,
            SpecEntry::Event(_) => EntryKind::EventV0,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionSpec> {
        match self {
            SpecEntry::Function(function) => Some(function),
            _ => None,
        }
    }
}

/// Callable contract function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionSpec {
    pub doc: Vec<u8>,
    pub name: Vec<u8>,
    pub inputs: Vec<FunctionInputSpec>,
    pub outputs: Vec<TypeDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInputSpec {
    pub doc: Vec<u8>,
    pub name: Vec<u8>,
    pub type_def: TypeDef,
}

impl FunctionSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            ..Self::default()
        }
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = doc.as_bytes().to_vec();
        self
    }

    pub fn with_input(mut self, name: &str, type_def: TypeDef) -> Self {
        self.inputs.push(FunctionInputSpec {
            doc: Vec::new(),
            name: name.as_bytes().to_vec(),
            type_def,
        });
        self
    }

    pub fn with_output(mut self, type_def: TypeDef) -> Self {
        self.outputs.push(type_def);
        self
    }
}

/// User-defined struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructSpec {
    pub doc: Vec<u8>,
    pub lib: Vec<u8>,
    pub name: Vec<u8>,
    pub fields: Vec<StructFieldSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructFieldSpec {
    pub doc: Vec<u8>,
    pub name: Vec<u8>,
    pub type_def: TypeDef,
}

/// User-defined tagged union
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionSpec {
    pub doc: Vec<u8>,
    pub lib: Vec<u8>,
    pub name: Vec<u8>,
    pub cases: Vec<UnionCaseSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionCaseSpec {
    Void { doc: Vec<u8>, name: Vec<u8> },
    Tuple { doc: Vec<u8>, name: Vec<u8>, types: Vec<TypeDef> },
}

/// User-defined integer enum; also used for contract error enums
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    pub doc: Vec<u8>,
    pub lib: Vec<u8>,
    pub name: Vec<u8>,
    pub cases: Vec<EnumCaseSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCaseSpec {
    pub doc: Vec<u8>,
    pub name: Vec<u8>,
    pub value: u32,
}

/// Contract event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    pub doc: Vec<u8>,
    pub lib: Vec<u8>,
    pub name: Vec<u8>,
    pub prefix_topics: Vec<Vec<u8>>,
    pub params: Vec<EventParamSpec>,
    pub data_format: EventDataFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParamSpec {
    pub doc: Vec<u8>,
    pub name: Vec<u8>,
    pub type_def: TypeDef,
    pub location: EventParamLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventParamLocation {
    Data,
    TopicList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventDataFormat {
    SingleValue,
    Vec,
    Map,
}

// ============================================================================
// Decoding
// ============================================================================

impl ReadXdr for SpecEntry {
    fn read_xdr(reader: &mut XdrReader<'_>) -> XdrResult<Self> {
        let discriminant = reader.read_i32()?;
        let kind = EntryKind::from_discriminant(discriminant).ok_or(
            XdrError::InvalidDiscriminant {
                what: "ScSpecEntryKind",
                value: discriminant as i64,
            },
        )?;
        let entry = match kind {
            EntryKind::FunctionV0 => SpecEntry::Function(FunctionSpec::read_xdr(reader)?),
            EntryKind::UdtStructV0 => SpecEntry::Struct(StructSpec::read_xdr(reader)?),
            EntryKind::UdtUnionV0 => SpecEntry::Union(UnionSpec::read_xdr(reader)?),
            EntryKind::UdtEnumV0 => SpecEntry::Enum(EnumSpec::read_xdr(reader)?),
            EntryKind::UdtErrorEnumV0 => SpecEntry::ErrorEnum(EnumSpec::read_xdr(reader)?),
            EntryKind::EventV0 => SpecEntry::Event(EventSpec::read_xdr(reader)?),
        };
        Ok(entry)
    }
}

impl ReadXdr for FunctionSpec {
    fn read_xdr(r: &mut XdrReader<'_>) -> XdrResult<Self> {
        let doc = r.read_var_opaque(DOC_MAX)?;
        let name = r.read_var_opaque(SYMBOL_MAX)?;
        let inputs = r.read_array(FUNCTION_INPUTS_MAX, |r| {
            Ok(FunctionInputSpec {
                doc: r.read_var_opaque(DOC_MAX)?,
                name: r.read_var_opaque(FIELD_NAME_MAX)?,
                type_def: TypeDef::read_xdr(r)?,
            })
        })?;
        let outputs = r.read_array(FUNCTION_OUTPUTS_MAX, TypeDef::read_xdr)?;
        Ok(Self {
            doc,
            name,
            inputs,
            outputs,
        })
    }
}

impl ReadXdr for StructSpec {
    fn read_xdr(r: &mut XdrReader<'_>) -> XdrResult<Self> {
        Ok(Self {
            doc: r.read_var_opaque(DOC_MAX)?,
            lib: r.read_var_opaque(LIB_MAX)?,
            name: r.read_var_opaque(UDT_NAME_MAX)?,
            fields: r.read_array(STRUCT_FIELDS_MAX, |r| {
                Ok(StructFieldSpec {
                    doc: r.read_var_opaque(DOC_MAX)?,
                    name: r.read_var_opaque(FIELD_NAME_MAX)?,
                    type_def: TypeDef::read_xdr(r)?,
                })
            })?,
        })
    }
}

impl ReadXdr for UnionSpec {
    fn read_xdr(r: &mut XdrReader<'_>) -> XdrResult<Self> {
        Ok(Self {
            doc: r.read_var_opaque(DOC_MAX)?,
            lib: r.read_var_opaque(LIB_MAX)?,
            name: r.read_var_opaque(UDT_NAME_MAX)?,
            cases: r.read_array(UNION_CASES_MAX, UnionCaseSpec::read_xdr)?,
        })
    }
}

impl ReadXdr for UnionCaseSpec {
    fn read_xdr(r: &mut XdrReader<'_>) -> XdrResult<Self> {
        match r.read_i32()? {
            0 => Ok(UnionCaseSpec::Void {
                doc: r.read_var_opaque(DOC_MAX)?,
                name: r.read_var_opaque(UDT_NAME_MAX)?,
            }),
            1 => Ok(UnionCaseSpec::Tuple {
                doc: r.read_var_opaque(DOC_MAX)?,
                name: r.read_var_opaque(UDT_NAME_MAX)?,
                types: r.read_array(UNION_CASE_TYPES_MAX, TypeDef::read_xdr)?,
            }),
            other => Err(XdrError::InvalidDiscriminant {
                what: "ScSpecUDTUnionCaseV0Kind",
                value: other as i64,
            }),
        }
    }
}

impl ReadXdr for EnumSpec {
    fn read_xdr(r: &mut XdrReader<'_>) -> XdrResult<Self> {
        Ok(Self {
            doc: r.read_var_opaque(DOC_MAX)?,
            lib: r.read_var_opaque(LIB_MAX)?,
            name: r.read_var_opaque(UDT_NAME_MAX)?,
            cases: r.read_array(ENUM_CASES_MAX, |r| {
                Ok(EnumCaseSpec {
                    doc: r.read_var_opaque(DOC_MAX)?,
                    name: r.read_var_opaque(UDT_NAME_MAX)?,
                    value: r.read_u32()?,
                })
            })?,
        })
    }
}

impl ReadXdr for EventSpec {
    fn read_xdr(r: &mut XdrReader<'_>) -> XdrResult<Self> {
        let doc = r.read_var_opaque(DOC_MAX)?;
        let lib = r.read_var_opaque(LIB_MAX)?;
        let name = r.read_var_opaque(SYMBOL_MAX)?;
        let prefix_topics =
            r.read_array(EVENT_PREFIX_TOPICS_MAX, |r| r.read_var_opaque(SYMBOL_MAX))?;
        let params = r.read_array(EVENT_PARAMS_MAX, |r| {
            let doc = r.read_var_opaque(DOC_MAX)?;
            let name = r.read_var_opaque(FIELD_NAME_MAX)?;
            let type_def = TypeDef::read_xdr(r)?;
            let location = match r.read_i32()? {
                0 => EventParamLocation::Data,
                1 => EventParamLocation::TopicList,
                other => {
                    return Err(XdrError::InvalidDiscriminant {
                        what: "ScSpecEventParamLocationV0",
                        value: other as i64,
                    })
                }
            };
            Ok(EventParamSpec {
                doc,
                name,
                type_def,
                location,
            })
        })?;
        let data_format = match r.read_i32()? {
            0 => EventDataFormat::SingleValue,
            1 => EventDataFormat::Vec,
            2 => EventDataFormat::Map,
            other => {
                return Err(XdrError::InvalidDiscriminant {
                    what: "ScSpecEventDataFormat",
                    value: other as i64,
                })
            }
        };
        Ok(Self {
            doc,
            lib,
            name,
            prefix_topics,
            params,
            data_format,
        })
    }
}

// ============================================================================
// Encoding
// ============================================================================

impl WriteXdr for SpecEntry {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_i32(self.kind().discriminant());
        match self {
            SpecEntry::Function(function) => function.write_xdr(w),
            SpecEntry::Struct(udt) => udt.write_xdr(w),
            SpecEntry::Union(udt) => udt.write_xdr(w),
            SpecEntry::Enum(udt) | SpecEntry::ErrorEnum(udt) => udt.write_xdr(w),
            SpecEntry::Event(event) => event.write_xdr(w),
        }
    }
}

impl WriteXdr for FunctionSpec {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_var_opaque(&self.doc);
        w.write_var_opaque(&self.name);
        w.write_array(&self.inputs, |w, input| {
            w.write_var_opaque(&input.doc);
            w.write_var_opaque(&input.name);
            input.type_def.write_xdr(w);
        });
        w.write_array(&self.outputs, |w, output| output.write_xdr(w));
    }
}

impl WriteXdr for StructSpec {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_var_opaque(&self.doc);
        w.write_var_opaque(&self.lib);
        w.write_var_opaque(&self.name);
        w.write_array(&self.fields, |w, field| {
            w.write_var_opaque(&field.doc);
            w.write_var_opaque(&field.name);
            field.type_def.write_xdr(w);
        });
    }
}

impl WriteXdr for UnionSpec {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_var_opaque(&self.doc);
        w.write_var_opaque(&self.lib);
        w.write_var_opaque(&self.name);
        w.write_array(&self.cases, |w, case| match case {
            UnionCaseSpec::Void { doc, name } => {
                w.write_i32(0);
                w.write_var_opaque(doc);
                w.write_var_opaque(name);
            }
            UnionCaseSpec::Tuple { doc, name, types } => {
                w.write_i32(1);
                w.write_var_opaque(doc);
                w.write_var_opaque(name);
                w.write_array(types, |w, ty| ty.write_xdr(w));
            }
        });
    }
}

impl WriteXdr for EnumSpec {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_var_opaque(&self.doc);
        w.write_var_opaque(&self.lib);
        w.write_var_opaque(&self.name);
        w.write_array(&self.cases, |w, case| {
            w.write_var_opaque(&case.doc);
            w.write_var_opaque(&case.name);
            w.write_u32(case.value);
        });
    }
}

impl WriteXdr for EventSpec {
    fn write_xdr(&self, w: &mut XdrWriter) {
        w.write_var_opaque(&self.doc);
        w.write_var_opaque(&self.lib);
        w.write_var_opaque(&self.name);
        w.write_array(&self.prefix_topics, |w, topic| w.write_var_opaque(topic));
        w.write_array(&self.params, |w, param| {
            w.write_var_opaque(&param.doc);
            w.write_var_opaque(&param.name);
            param.type_def.write_xdr(w);
            w.write_i32(match param.location {
                EventParamLocation::Data => 0,
                EventParamLocation::TopicList => 1,
            });
        });
        w.write_i32(match self.data_format {
            EventDataFormat::SingleValue => 0,
            EventDataFormat::Vec => 1,
            EventDataFormat::Map => 2,
        });
    }
}
