//! Spec type codes and type definitions
//!
//! [`TypeName`] is the closed table of type codes used by the projection
//! layer; [`TypeDef`] is the full recursive type definition as it appears
//! inside spec entries.

use std::fmt;
use std::str::Utf8Error;

use serde::{Deserialize, Serialize};

use crate::xdr::{ReadXdr, WriteXdr, XdrError, XdrReader, XdrResult, XdrWriter};

/// Maximum number of element types in a tuple
pub const TUPLE_TYPES_MAX: u32 = 12;

/// Maximum length of a user-defined type name
pub const UDT_NAME_MAX: u32 = 60;

/// Symbolic name of a spec type code
///
/// Serialized as the upper-case XDR constant name. Codes outside the
/// table map to [`TypeName::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeName {
    #[serde(rename = "SC_SPEC_TYPE_VAL")]
    Val,
    #[serde(rename = "SC_SPEC_TYPE_BOOL")]
    Bool,
    #[serde(rename = "SC_SPEC_TYPE_VOID")]
    Void,
    #[serde(rename = "SC_SPEC_TYPE_ERROR")]
    Error,
    #[serde(rename = "SC_SPEC_TYPE_U32")]
    U32,
    #[serde(rename = "SC_SPEC_TYPE_I32")]
    I32,
    #[serde(rename = "SC_SPEC_TYPE_U64")]
    U64,
    #[serde(rename = "SC_SPEC_TYPE_I64")]
    I64,
    #[serde(rename = "SC_SPEC_TYPE_TIMEPOINT")]
    Timepoint,
    #[serde(rename = "SC_SPEC_TYPE_DURATION")]
    Duration,
    #[serde(rename = "SC_SPEC_TYPE_U128")]
    U128,
    #[serde(rename = "SC_SPEC_TYPE_I128")]
    I128,
    #[serde(rename = "SC_SPEC_TYPE_U256")]
    U256,
    #[serde(rename = "SC_SPEC_TYPE_I256")]
    I256,
    #[serde(rename = "SC_SPEC_TYPE_BYTES")]
    Bytes,
    #[serde(rename = "SC_SPEC_TYPE_STRING")]
    String,
    #[serde(rename = "SC_SPEC_TYPE_SYMBOL")]
    Symbol,
    #[serde(rename = "SC_SPEC_TYPE_ADDRESS")]
    Address,
    #[serde(rename = "SC_SPEC_TYPE_MUXED_ADDRESS")]
    MuxedAddress,
    #[serde(rename = "SC_SPEC_TYPE_OPTION")]
    Option,
    #[serde(rename = "SC_SPEC_TYPE_RESULT")]
    Result,
    #[serde(rename = "SC_SPEC_TYPE_VEC")]
    Vec,
    #[serde(rename = "SC_SPEC_TYPE_MAP")]
    Map,
    #[serde(rename = "SC_SPEC_TYPE_TUPLE")]
    Tuple,
    #[serde(rename = "SC_SPEC_TYPE_BYTES_N")]
    BytesN,
    #[serde(rename = "SC_SPEC_TYPE_UDT")]
    Udt,
    #[serde(rename = "SC_SPEC_TYPE_UNKNOWN")]
    Unknown,
}

/// (code, name) pairs for every known type
const TYPE_TABLE: [(u32, TypeName); 26] = [
    (0, TypeName::Val),
    (1, TypeName::Bool),
    (2, TypeName::Void),
    (3, TypeName::Error),
    (4, TypeName::U32),
    (5, TypeName::I32),
    (6, TypeName::U64),
    (7, TypeName::I64),
    (8, TypeName::Timepoint),
    (9, TypeName::Duration),
    (10, TypeName::U128),
    (11, TypeName::I128),
    (12, TypeName::U256),
    (13, TypeName::I256),
    (14, TypeName::Bytes),
    (16, TypeName::String),
    (17, TypeName::Symbol),
    (19, TypeName::Address),
    (20, TypeName::MuxedAddress),
    (1000, TypeName::Option),
    (1001, TypeName::Result),
    (1002, TypeName::Vec),
    (1004, TypeName::Map),
    (1005, TypeName::Tuple),
    (1006, TypeName::BytesN),
    (2000, TypeName::Udt),
];

impl TypeName {
    /// Map a type code to its name; never fails
    pub fn from_code(code: u32) -> Self {
        TYPE_TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| *name)
            .unwrap_or(TypeName::Unknown)
    }

    /// Type code for this name, `None` for the unknown sentinel
    pub fn code(self) -> Option<u32> {
        TYPE_TABLE
            .iter()
            .find(|(_, name)| *name == self)
            .map(|(code, _)| *code)
    }

    /// Every known type code
    pub fn known_codes() -> impl Iterator<Item = u32> {
        TYPE_TABLE.iter().map(|(code, _)| *code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeName::Val => "SC_SPEC_TYPE_VAL",
            TypeName::Bool => "SC_SPEC_TYPE_BOOL",
            TypeName::Void => "SC_SPEC_TYPE_VOID",
            TypeName::Error => "SC_SPEC_TYPE_ERROR",
            TypeName::U32 => "SC_SPEC_TYPE_U32",
            TypeName::I32 => "SC_SPEC_TYPE_I32",
            TypeName::U64 => "SC_SPEC_TYPE_U64",
            TypeName::I64 => "SC_SPEC_TYPE_I64",
            TypeName::Timepoint => "SC_SPEC_TYPE_TIMEPOINT",
            TypeName::Duration => "SC_SPEC_TYPE_DURATION",
            TypeName::U128 => "SC_SPEC_TYPE_U128",
            TypeName::I128 => "SC_SPEC_TYPE_I128",
            TypeName::U256 => "SC_SPEC_TYPE_U256",
            TypeName::I256 => "SC_SPEC_TYPE_I256",
            TypeName::Bytes => "SC_SPEC_TYPE_BYTES",
            TypeName::String => "SC_SPEC_TYPE_STRING",
            TypeName::Symbol => "SC_SPEC_TYPE_SYMBOL",
            TypeName::Address => "SC_SPEC_TYPE_ADDRESS",
            TypeName::MuxedAddress => "SC_SPEC_TYPE_MUXED_ADDRESS",
            TypeName::Option => "SC_SPEC_TYPE_OPTION",
            TypeName::Result => "SC_SPEC_TYPE_RESULT",
            TypeName::Vec => "SC_SPEC_TYPE_VEC",
            TypeName::Map => "SC_SPEC_TYPE_MAP",
            TypeName::Tuple => "SC_SPEC_TYPE_TUPLE",
            TypeName::BytesN => "SC_SPEC_TYPE_BYTES_N",
            TypeName::Udt => "SC_SPEC_TYPE_UDT",
            TypeName::Unknown => "SC_SPEC_TYPE_UNKNOWN",
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recursive type definition carried by spec entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Val,
    Bool,
    Void,
    Error,
    U32,
    I32,
    U64,
    I64,
    Timepoint,
    Duration,
    U128,
    I128,
    U256,
    I256,
    Bytes,
    String,
    Symbol,
    Address,
    MuxedAddress,
    Option(Box<TypeDef>),
    Result { ok: Box<TypeDef>, error: Box<TypeDef> },
    Vec(Box<TypeDef>),
    Map { key: Box<TypeDef>, value: Box<TypeDef> },
    Tuple(Vec<TypeDef>),
    BytesN(u32),
    /// User-defined type, referenced by raw name bytes
    Udt(Vec<u8>),
}

impl TypeDef {
    /// Wire discriminant of this definition
    pub fn code(&self) -> u32 {
        match self {
            TypeDef::Val => 0,
            TypeDef::Bool => 1,
            TypeDef::Void => 2,
            TypeDef::Error => 3,
            TypeDef::U32 => 4,
            TypeDef::I32 => 5,
            TypeDef::U64 => 6,
            TypeDef::I64 => 7,
            TypeDef::Timepoint => 8,
            TypeDef::Duration => 9,
            TypeDef::U128 => 10,
            TypeDef::I128 => 11,
            TypeDef::U256 => 12,
            TypeDef::I256 => 13,
            TypeDef::Bytes => 14,
            TypeDef::String => 16,
            TypeDef::Symbol => 17,
            TypeDef::Address => 19,
            TypeDef::MuxedAddress => 20,
            TypeDef::Option(_) => 1000,
            TypeDef::Result { .. } => 1001,
            TypeDef::Vec(_) => 1002,
            TypeDef::Map { .. } => 1004,
            TypeDef::Tuple(_) => 1005,
            TypeDef::BytesN(_) => 1006,
            TypeDef::Udt(_) => 2000,
        }
    }

    pub fn type_name(&self) -> TypeName {
        TypeName::from_code(self.code())
    }

    pub fn option(inner: TypeDef) -> Self {
        TypeDef::Option(Box::new(inner))
    }

    pub fn result(ok: TypeDef, error: TypeDef) -> Self {
        TypeDef::Result {
            ok: Box::new(ok),
            error: Box::new(error),
        }
    }

    pub fn vec(element: TypeDef) -> Self {
        TypeDef::Vec(Box::new(element))
    }

    pub fn map(key: TypeDef, value: TypeDef) -> Self {
        TypeDef::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn udt(name: &str) -> Self {
        TypeDef::Udt(name.as_bytes().to_vec())
    }

    /// Human-readable rendering, failing on a non UTF-8 UDT name
    pub fn render(&self) -> Result<String, Utf8Error> {
        let mut out = String::new();
        self.render_into(&mut out, true)?;
        Ok(out)
    }

    fn render_into(&self, out: &mut String, strict: bool) -> Result<(), Utf8Error> {
        let simple = match self {
            TypeDef::Val => "Val",
            TypeDef::Bool => "bool",
            TypeDef::Void => "()",
            TypeDef::Error => "Error",
            TypeDef::U32 => "u32",
            TypeDef::I32 => "i32",
            TypeDef::U64 => "u64",
            TypeDef::I64 => "i64",
            TypeDef::Timepoint => "Timepoint",
            TypeDef::Duration => "Duration",
            TypeDef::U128 => "u128",
            TypeDef::I128 => "i128",
            TypeDef::U256 => "U256",
            TypeDef::I256 => "I256",
            TypeDef::Bytes => "Bytes",
            TypeDef::String => "String",
            TypeDef::Symbol => "Symbol",
            TypeDef::Address => "Address",
            TypeDef::MuxedAddress => "MuxedAddress",
            TypeDef::Option(inner) => {
                out.push_str("Option<");
                inner.render_into(out, strict)?;
                out.push('>');
                return Ok(());
            }
            TypeDef::Result { ok, error } => {
                out.push_str("Result<");
                ok.render_into(out, strict)?;
                out.push_str(", ");
                error.render_into(out, strict)?;
                out.push('>');
                return Ok(());
            }
            TypeDef::Vec(element) => {
                out.push_str("Vec<");
                element.render_into(out, strict)?;
                out.push('>');
                return Ok(());
            }
            TypeDef::Map { key, value } => {
                out.push_str("Map<");
                key.render_into(out, strict)?;
                out.push_str(", ");
                value.render_into(out, strict)?;
                out.push('>');
                return Ok(());
            }
            TypeDef::Tuple(types) => {
                out.push('(');
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    ty.render_into(out, strict)?;
                }
                out.push(')');
                return Ok(());
            }
            TypeDef::BytesN(n) => {
                out.push_str(&format!("BytesN<{}>", n));
                return Ok(());
            }
            TypeDef::Udt(name) => {
                if strict {
                    out.push_str(std::str::from_utf8(name)?);
                } else {
                    out.push_str(&String::from_utf8_lossy(name));
                }
                return Ok(());
            }
        };
        out.push_str(simple);
        Ok(())
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        // Lossy rendering cannot fail
        let _ = self.render_into(&mut out, false);
        f.write_str(&out)
    }
}

impl ReadXdr for TypeDef {
    fn read_xdr(reader: &mut XdrReader<'_>) -> XdrResult<Self> {
        reader.nested(|r| {
            let code = r.read_i32()?;
            let def = match code {
                0 => TypeDef::Val,
                1 => TypeDef::Bool,
                2 => TypeDef::Void,
                3 => TypeDef::Error,
                4 => TypeDef::U32,
                5 => TypeDef::I32,
                6 => TypeDef::U64,
                7 => TypeDef::I64,
                8 => TypeDef::Timepoint,
                9 => TypeDef::Duration,
                10 => TypeDef::U128,
                11 => TypeDef::I128,
                12 => TypeDef::U256,
                13 => TypeDef::I256,
                14 => TypeDef::Bytes,
                16 => TypeDef::String,
                17 => TypeDef::Symbol,
                19 => TypeDef::Address,
                20 => TypeDef::MuxedAddress,
                1000 => TypeDef::Option(Box::new(TypeDef::read_xdr(r)?)),
                1001 => {
                    let ok = TypeDef::read_xdr(r)?;
                    let error = TypeDef::read_xdr(r)?;
                    TypeDef::result(ok, error)
                }
                1002 => TypeDef::Vec(Box::new(TypeDef::read_xdr(r)?)),
                1004 => {
                    let key = TypeDef::read_xdr(r)?;
                    let value = TypeDef::read_xdr(r)?;
                    TypeDef::map(key, value)
                }
                1005 => TypeDef::Tuple(r.read_array(TUPLE_TYPES_MAX, TypeDef::read_xdr)?),
                1006 => TypeDef::BytesN(r.read_u32()?),
                2000 => TypeDef::Udt(r.read_var_opaque(UDT_NAME_MAX)?),
                other => {
                    return Err(XdrError::InvalidDiscriminant {
                        what: "ScSpecType",
                        value: other as i64,
                    })
                }
            };
            Ok(def)
        })
    }
}

impl WriteXdr for TypeDef {
    fn write_xdr(&self, writer: &mut XdrWriter) {
        writer.write_i32(self.code() as i32);
        match self {
            TypeDef::Option(inner) | TypeDef::Vec(inner) => inner.write_xdr(writer),
            TypeDef::Result { ok, error } => {
                ok.write_xdr(writer);
                error.write_xdr(writer);
            }
            TypeDef::Map { key, value } => {
                key.write_xdr(writer);
                value.write_xdr(writer);
            }
            TypeDef::Tuple(types) => writer.write_array(types, |w, ty| ty.write_xdr(w)),
            TypeDef::BytesN(n) => writer.write_u32(*n),
            TypeDef::Udt(name) => writer.write_var_opaque(name),
            _ => {}
        }
    }
}
