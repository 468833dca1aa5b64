// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::abi::layout::TupleLayout;
use crate::abi::value::AbiValue;
use crate::error::IrError;
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// ABI type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    Bool,
    Byte,
    /// Unsigned integer of the given bit width (8..=512, multiple of 8)
    Uint(u16),
    Address,
    String,
    StaticArray { elem: Box<TypeSpec>, length: usize },
    DynamicArray(Box<TypeSpec>),
    Tuple(Vec<TypeSpec>),
}

impl TypeSpec {
    pub fn static_array(elem: TypeSpec, length: usize) -> Self {
        TypeSpec::StaticArray {
            elem: Box::new(elem),
            length,
        }
    }

    pub fn dynamic_array(elem: TypeSpec) -> Self {
        TypeSpec::DynamicArray(Box::new(elem))
    }

    /// Fresh placeholder of this type
    pub fn new_instance(&self) -> AbiValue {
        AbiValue::new(self.clone())
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            TypeSpec::String | TypeSpec::DynamicArray(_) => true,
            TypeSpec::StaticArray { elem, .. } => elem.is_dynamic(),
            TypeSpec::Tuple(elems) => elems.iter().any(TypeSpec::is_dynamic),
            TypeSpec::Bool | TypeSpec::Byte | TypeSpec::Uint(_) | TypeSpec::Address => false,
        }
    }

    /// Encoded length in bytes, `None` for dynamic types
    pub fn byte_length_static(&self) -> Option<usize> {
        match self {
            TypeSpec::Bool | TypeSpec::Byte => Some(1),
            TypeSpec::Uint(bits) => Some(*bits as usize / 8),
            TypeSpec::Address => Some(32),
            TypeSpec::String | TypeSpec::DynamicArray(_) => None,
            TypeSpec::StaticArray { elem, length } => match elem.as_ref() {
                TypeSpec::Bool => Some(length.div_ceil(8)),
                other => other.byte_length_static().map(|l| l * length),
            },
            TypeSpec::Tuple(elems) => TupleLayout::new(elems).static_length(),
        }
    }

    /// Tuple element types, `None` for other types
    pub fn tuple_elements(&self) -> Option<&[TypeSpec]> {
        match self {
            TypeSpec::Tuple(elems) => Some(elems),
            _ => None,
        }
    }
}

impl Display for TypeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Bool => write!(f, "bool"),
            TypeSpec::Byte => write!(f, "byte"),
            TypeSpec::Uint(bits) => write!(f, "uint{}", bits),
            TypeSpec::Address => write!(f, "address"),
            TypeSpec::String => write!(f, "string"),
            TypeSpec::StaticArray { elem, length } => write!(f, "{}[{}]", elem, length),
            TypeSpec::DynamicArray(elem) => write!(f, "{}[]", elem),
            TypeSpec::Tuple(elems) => write!(f, "({})", elems.iter().join(",")),
        }
    }
}

impl FromStr for TypeSpec {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IrError::InvalidTypeSpec(s.to_string());
        let s = s.trim();

        if let Some(body) = s.strip_suffix(']') {
            let open = body.rfind('[').ok_or_else(invalid)?;
            let elem: TypeSpec = body[..open].parse()?;
            let length = &body[open + 1..];
            return if length.is_empty() {
                Ok(TypeSpec::dynamic_array(elem))
            } else {
                let length = length.parse::<usize>().map_err(|_| invalid())?;
                Ok(TypeSpec::static_array(elem, length))
            };
        }

        if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            let elems = split_top_level(inner)
                .ok_or_else(invalid)?
                .into_iter()
                .map(TypeSpec::from_str)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(TypeSpec::Tuple(elems));
        }

        match s {
            "bool" => Ok(TypeSpec::Bool),
            "byte" => Ok(TypeSpec::Byte),
            "address" => Ok(TypeSpec::Address),
            "string" => Ok(TypeSpec::String),
            _ => {
                let bits = s
                    .strip_prefix("uint")
                    .and_then(|b| b.parse::<u16>().ok())
                    .ok_or_else(invalid)?;
                if bits < 8 || bits > 512 || bits % 8 != 0 {
                    return Err(invalid());
                }
                Ok(TypeSpec::Uint(bits))
            }
        }
    }
}

/// Split a comma-separated list at nesting depth zero.
/// Returns `None` when parentheses are unbalanced; an empty input yields no items.
pub fn split_top_level(s: &str) -> Option<Vec<&str>> {
    if s.is_empty() {
        return Some(vec![]);
    }
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                items.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    items.push(&s[start..]);
    Some(items)
}
