// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! ABI value placeholders
//!
//! A placeholder owns one scratch slot holding the value's encoding. Decoding
//! stores source bytes into the slot, encoding loads them back.

use crate::abi::type_spec::TypeSpec;
use crate::error::IrError;
use crate::expr::Expr;
use crate::scratch::ScratchSlot;

#[derive(Debug, Clone, PartialEq)]
pub struct AbiValue {
    spec: TypeSpec,
    slot: ScratchSlot,
}

impl AbiValue {
    pub fn new(spec: TypeSpec) -> Self {
        Self {
            spec,
            slot: ScratchSlot::fresh(),
        }
    }

    pub fn spec(&self) -> &TypeSpec {
        &self.spec
    }

    pub fn slot(&self) -> ScratchSlot {
        self.slot
    }

    /// Read this value from encoded bytes
    pub fn decode(&self, source: Expr) -> Expr {
        Expr::store(self.slot, source)
    }

    /// Encoded bytes of this value
    pub fn encode(&self) -> Expr {
        Expr::Load(self.slot)
    }

    /// Copy this value into `target`
    pub fn store_into(&self, target: &AbiValue) -> Expr {
        Expr::store(target.slot, self.encode())
    }

    /// Positional access into a tuple value
    pub fn element(&self, index: usize) -> Result<TupleElement, IrError> {
        let elems = self
            .spec
            .tuple_elements()
            .ok_or_else(|| IrError::NotATuple(self.spec.to_string()))?;
        let spec = elems
            .get(index)
            .cloned()
            .ok_or_else(|| IrError::TupleIndexOutOfRange {
                spec: self.spec.to_string(),
                index,
            })?;
        Ok(TupleElement {
            tuple: self.clone(),
            index,
            spec,
        })
    }
}

/// One element of a tuple placeholder
#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    tuple: AbiValue,
    index: usize,
    spec: TypeSpec,
}

impl TupleElement {
    pub fn spec(&self) -> &TypeSpec {
        &self.spec
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn encode(&self) -> Expr {
        Expr::TupleElement {
            tuple: self.tuple.clone(),
            index: self.index,
        }
    }

    pub fn store_into(&self, target: &AbiValue) -> Expr {
        Expr::store(target.slot(), self.encode())
    }
}

/// Encoded result of a subroutine call, not yet stored anywhere
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnedValue {
    spec: TypeSpec,
    computation: Expr,
}

impl ReturnedValue {
    pub fn new(spec: TypeSpec, computation: Expr) -> Self {
        Self { spec, computation }
    }

    pub fn spec(&self) -> &TypeSpec {
        &self.spec
    }

    pub fn store_into(self, target: &AbiValue) -> Expr {
        Expr::store(target.slot(), self.computation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_access() {
        let tuple = TypeSpec::Tuple(vec![TypeSpec::Uint(64), TypeSpec::String]).new_instance();
        let second = tuple.element(1).unwrap();
        assert_eq!(second.spec(), &TypeSpec::String);

        let target = TypeSpec::String.new_instance();
        assert_eq!(
            second.store_into(&target),
            Expr::store(
                target.slot(),
                Expr::TupleElement {
                    tuple: tuple.clone(),
                    index: 1
                }
            )
        );
        assert!(tuple.element(2).is_err());
        assert!(TypeSpec::Bool.new_instance().element(0).is_err());
    }

    #[test]
    fn test_placeholders_never_share_slots() {
        let a = TypeSpec::Uint(64).new_instance();
        let b = TypeSpec::Uint(64).new_instance();
        assert_ne!(a.slot(), b.slot());
    }
}
