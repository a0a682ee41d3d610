//! Move type layouts
//!
//! A layout is the byte shape of a concrete type. It mirrors the signature's
//! recursion, but struct nodes carry their fields (name + layout) so the
//! decoder never needs to look anything up.
//!
//! Struct nodes also keep the struct's type reference. The decoder uses it to
//! recognize the handful of framework structs that have a dedicated value
//! representation (strings, UIDs, options).

use crate::address::Address;
use crate::package::{PackageDecl, StructDecl};
use crate::signature::{
    DatatypeRef, SignatureError, TypeSignature, FRAMEWORK_ADDRESS, MOVE_STDLIB_ADDRESS,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Layout of a concrete type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeLayout {
    /// One byte, 0 or 1
    Bool,
    /// 1 byte
    U8,
    /// 2 bytes LE
    U16,
    /// 4 bytes LE
    U32,
    /// 8 bytes LE
    U64,
    /// 16 bytes LE
    U128,
    /// 32 bytes LE
    U256,
    /// 32 bytes
    Address,
    /// ULEB128 length then elements
    Vector(Box<TypeLayout>),
    /// Fields in declaration order
    Struct(Box<StructLayout>),
}

/// Layout of one struct instantiation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructLayout {
    /// Struct type this layout was built from
    #[serde(rename = "type")]
    pub type_: DatatypeRef,
    /// Fields in declaration order
    pub fields: Vec<FieldLayout>,
}

/// One field of a struct layout
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldLayout {
    /// Field name
    pub name: String,
    /// Field layout
    pub layout: TypeLayout,
}

/// Framework structs with a dedicated value representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnownStruct {
    /// `0x1::string::String` or `0x1::ascii::String`
    String,
    /// `0x2::object::UID` or `0x2::object::ID`
    Uid,
    /// `0x1::option::Option<T>`
    Option,
}

impl StructLayout {
    /// Classify framework structs
    pub fn well_known(&self) -> Option<WellKnownStruct> {
        let t = &self.type_;
        if t.is(&MOVE_STDLIB_ADDRESS, "string", "String")
            || t.is(&MOVE_STDLIB_ADDRESS, "ascii", "String")
        {
            Some(WellKnownStruct::String)
        } else if t.is(&FRAMEWORK_ADDRESS, "object", "UID")
            || t.is(&FRAMEWORK_ADDRESS, "object", "ID")
        {
            Some(WellKnownStruct::Uid)
        } else if t.is(&MOVE_STDLIB_ADDRESS, "option", "Option") {
            Some(WellKnownStruct::Option)
        } else {
            None
        }
    }
}

impl TypeLayout {
    /// Signature this layout describes
    pub fn signature(&self) -> TypeSignature {
        match self {
            TypeLayout::Bool => TypeSignature::Bool,
            TypeLayout::U8 => TypeSignature::U8,
            TypeLayout::U16 => TypeSignature::U16,
            TypeLayout::U32 => TypeSignature::U32,
            TypeLayout::U64 => TypeSignature::U64,
            TypeLayout::U128 => TypeSignature::U128,
            TypeLayout::U256 => TypeSignature::U256,
            TypeLayout::Address => TypeSignature::Address,
            TypeLayout::Vector(inner) => TypeSignature::Vector(Box::new(inner.signature())),
            TypeLayout::Struct(s) => TypeSignature::Datatype(Box::new(s.type_.clone())),
        }
    }

    /// Layout for a signature that contains no structs
    pub fn primitive(sig: &TypeSignature) -> Option<TypeLayout> {
        Some(match sig {
            TypeSignature::Bool => TypeLayout::Bool,
            TypeSignature::U8 => TypeLayout::U8,
            TypeSignature::U16 => TypeLayout::U16,
            TypeSignature::U32 => TypeLayout::U32,
            TypeSignature::U64 => TypeLayout::U64,
            TypeSignature::U128 => TypeLayout::U128,
            TypeSignature::U256 => TypeLayout::U256,
            TypeSignature::Address => TypeLayout::Address,
            TypeSignature::Vector(inner) => TypeLayout::Vector(Box::new(Self::primitive(inner)?)),
            TypeSignature::Datatype(_) => return None,
        })
    }
}

// =============================================================================
// Layout construction
// =============================================================================

/// Failure to build a layout from a signature
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The package, module or struct does not exist
    #[error("unknown type: {type_name}")]
    UnknownType {
        /// `package::module::name` that failed to resolve
        type_name: String,
    },

    /// Type-argument count does not match the declaration
    #[error("type {type_name} expects {expected} type arguments, got {found}")]
    ArityMismatch {
        /// Struct being instantiated
        type_name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        found: usize,
    },

    /// Field signature could not be instantiated
    #[error("malformed field type in {type_name}: {source}")]
    Signature {
        /// Struct being instantiated
        type_name: String,
        /// Underlying signature error
        source: SignatureError,
    },

    /// Layout nests deeper than allowed
    #[error("layout nesting exceeds limit {max}")]
    TooDeep {
        /// Configured maximum
        max: usize,
    },
}

/// Declarations a layout can be built against
pub trait StructSource {
    /// Struct declared in `package::module`, if any
    fn find_struct(&self, package: &Address, module: &str, name: &str) -> Option<&StructDecl>;
}

impl StructSource for PackageDecl {
    fn find_struct(&self, package: &Address, module: &str, name: &str) -> Option<&StructDecl> {
        if *package == self.id || *package == self.original_id {
            PackageDecl::find_struct(self, module, name)
        } else {
            None
        }
    }
}

impl StructSource for HashMap<Address, PackageDecl> {
    fn find_struct(&self, package: &Address, module: &str, name: &str) -> Option<&StructDecl> {
        self.get(package)?.find_struct(module, name)
    }
}

impl StructSource for BTreeMap<Address, PackageDecl> {
    fn find_struct(&self, package: &Address, module: &str, name: &str) -> Option<&StructDecl> {
        self.get(package)?.find_struct(module, name)
    }
}

/// Build the layout of `sig`, resolving every struct against `source`
pub fn build_layout<S: StructSource + ?Sized>(
    sig: &TypeSignature,
    source: &S,
    max_depth: usize,
) -> Result<TypeLayout, LayoutError> {
    build_at_depth(sig, source, 0, max_depth)
}

fn build_at_depth<S: StructSource + ?Sized>(
    sig: &TypeSignature,
    source: &S,
    depth: usize,
    max_depth: usize,
) -> Result<TypeLayout, LayoutError> {
    if depth > max_depth {
        return Err(LayoutError::TooDeep { max: max_depth });
    }
    let datatype = match sig {
        TypeSignature::Vector(inner) => {
            return Ok(TypeLayout::Vector(Box::new(build_at_depth(
                inner,
                source,
                depth + 1,
                max_depth,
            )?)))
        }
        TypeSignature::Datatype(d) => d,
        TypeSignature::Bool => return Ok(TypeLayout::Bool),
        TypeSignature::U8 => return Ok(TypeLayout::U8),
        TypeSignature::U16 => return Ok(TypeLayout::U16),
        TypeSignature::U32 => return Ok(TypeLayout::U32),
        TypeSignature::U64 => return Ok(TypeLayout::U64),
        TypeSignature::U128 => return Ok(TypeLayout::U128),
        TypeSignature::U256 => return Ok(TypeLayout::U256),
        TypeSignature::Address => return Ok(TypeLayout::Address),
    };

    let type_name = datatype.base_repr();
    let decl = source
        .find_struct(&datatype.package, &datatype.module, &datatype.name)
        .ok_or_else(|| LayoutError::UnknownType {
            type_name: type_name.clone(),
        })?;

    if decl.type_parameters.len() != datatype.type_arguments.len() {
        return Err(LayoutError::ArityMismatch {
            type_name,
            expected: decl.type_parameters.len(),
            found: datatype.type_arguments.len(),
        });
    }

    let mut fields = Vec::with_capacity(decl.fields.len());
    for field in &decl.fields {
        let concrete = field
            .signature
            .body
            .instantiate(&datatype.type_arguments)
            .map_err(|source| LayoutError::Signature {
                type_name: type_name.clone(),
                source,
            })?;
        fields.push(FieldLayout {
            name: field.name.clone(),
            layout: build_at_depth(&concrete, source, depth + 1, max_depth)?,
        });
    }

    Ok(TypeLayout::Struct(Box::new(StructLayout {
        type_: (**datatype).clone(),
        fields,
    })))
}

/// Packages named by a signature and its type arguments
///
/// Field types are not visited; they are discovered as declarations load.
pub fn referenced_packages(sig: &TypeSignature, out: &mut Vec<Address>) {
    match sig {
        TypeSignature::Vector(inner) => referenced_packages(inner, out),
        TypeSignature::Datatype(d) => {
            if !out.contains(&d.package) {
                out.push(d.package);
            }
            for arg in &d.type_arguments {
                referenced_packages(arg, out);
            }
        }
        _ => {}
    }
}
