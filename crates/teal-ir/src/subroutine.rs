// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Subroutine definitions
//!
//! A definition is shared by reference count between every call site, so a
//! handler registered in several programs is emitted once per program and
//! never copied.

use crate::abi::{AbiValue, TypeSpec};
use crate::error::IrError;
use crate::expr::Expr;
use crate::types::TealType;
use itertools::Itertools;
use std::rc::Rc;

/// How a parameter is passed
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// Raw stack value
    Stack(TealType),
    /// ABI value, passed as its encoding
    Abi(TypeSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
}

impl Param {
    pub fn stack(name: impl Into<String>, ty: TealType) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Stack(ty),
        }
    }

    pub fn abi(name: impl Into<String>, spec: TypeSpec) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Abi(spec),
        }
    }

    /// Stack type of the parameter inside the subroutine body
    pub fn stack_type(&self) -> TealType {
        match &self.kind {
            ParamKind::Stack(ty) => *ty,
            ParamKind::Abi(_) => TealType::Bytes,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct SubroutineDefinition {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TealType,
    pub body: Expr,
}

impl SubroutineDefinition {
    pub fn argument_count(&self) -> usize {
        self.params.len()
    }

    /// Reference to parameter `index` for use inside the body
    pub fn param(&self, index: usize) -> Option<Expr> {
        self.params.get(index).map(|p| Expr::Param {
            index,
            ty: p.stack_type(),
        })
    }
}

/// Subroutine over raw stack values
#[derive(Debug, Clone, PartialEq)]
pub struct Subroutine {
    definition: Rc<SubroutineDefinition>,
}

impl Subroutine {
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        return_type: TealType,
        body: Expr,
    ) -> Self {
        Self {
            definition: Rc::new(SubroutineDefinition {
                name: name.into(),
                params,
                return_type,
                body,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn type_of(&self) -> TealType {
        self.definition.return_type
    }

    pub fn argument_count(&self) -> usize {
        self.definition.argument_count()
    }

    pub fn definition(&self) -> &Rc<SubroutineDefinition> {
        &self.definition
    }

    pub fn call(&self, args: Vec<Expr>) -> Expr {
        Expr::Call {
            subroutine: Rc::clone(&self.definition),
            args,
        }
    }
}

/// Subroutine whose parameters and output are ABI values
#[derive(Debug, Clone, PartialEq)]
pub struct AbiReturnSubroutine {
    definition: Rc<SubroutineDefinition>,
    output: Option<TypeSpec>,
}

impl AbiReturnSubroutine {
    /// The body leaves the encoded output on the stack (or returns it) when
    /// `output` is set, and nothing otherwise.
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        output: Option<TypeSpec>,
        body: Expr,
    ) -> Self {
        let return_type = if output.is_some() {
            TealType::Bytes
        } else {
            TealType::None
        };
        Self {
            definition: Rc::new(SubroutineDefinition {
                name: name.into(),
                params,
                return_type,
                body,
            }),
            output,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &Rc<SubroutineDefinition> {
        &self.definition
    }

    pub fn argument_count(&self) -> usize {
        self.definition.argument_count()
    }

    /// Declared ABI parameter types, skipping raw stack parameters
    pub fn abi_args(&self) -> Vec<&TypeSpec> {
        self.definition
            .params
            .iter()
            .filter_map(|p| match &p.kind {
                ParamKind::Abi(spec) => Some(spec),
                ParamKind::Stack(_) => None,
            })
            .collect()
    }

    pub fn output(&self) -> Option<&TypeSpec> {
        self.output.as_ref()
    }

    pub fn is_void(&self) -> bool {
        self.output.is_none()
    }

    /// ABI name of the output type, `void` when there is none
    pub fn type_of(&self) -> String {
        self.output
            .as_ref()
            .map_or_else(|| "void".to_string(), |spec| spec.to_string())
    }

    /// Every parameter carries an ABI type, so arguments can be decoded
    /// from application arguments
    pub fn is_abi_routable(&self) -> bool {
        self.abi_args().len() == self.argument_count()
    }

    /// Canonical `name(arg,...)ret` signature
    pub fn method_signature(&self, overriding_name: Option<&str>) -> Result<String, IrError> {
        if !self.is_abi_routable() {
            return Err(IrError::InvalidSignature(format!(
                "{} takes {} args of which {} are ABI typed",
                self.name(),
                self.argument_count(),
                self.abi_args().len()
            )));
        }
        Ok(format!(
            "{}({}){}",
            overriding_name.unwrap_or(self.name()),
            self.abi_args().iter().join(","),
            self.type_of()
        ))
    }

    /// Call with ABI placeholders, passing their encodings positionally
    pub fn invoke(&self, args: &[AbiValue]) -> Expr {
        self.call(args.iter().map(AbiValue::encode).collect())
    }

    pub fn call(&self, args: Vec<Expr>) -> Expr {
        Expr::Call {
            subroutine: Rc::clone(&self.definition),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint64() -> TypeSpec {
        TypeSpec::Uint(64)
    }

    #[test]
    fn test_method_signature() {
        let add = AbiReturnSubroutine::new(
            "add",
            vec![Param::abi("a", uint64()), Param::abi("b", uint64())],
            Some(uint64()),
            Expr::approve(),
        );
        assert_eq!(add.method_signature(None).unwrap(), "add(uint64,uint64)uint64");
        assert_eq!(
            add.method_signature(Some("plus")).unwrap(),
            "plus(uint64,uint64)uint64"
        );

        let noop = AbiReturnSubroutine::new("noop", vec![], None, Expr::Return(None));
        assert_eq!(noop.method_signature(None).unwrap(), "noop()void");
    }

    #[test]
    fn test_unroutable_signature() {
        let mixed = AbiReturnSubroutine::new(
            "mixed",
            vec![
                Param::abi("a", uint64()),
                Param::stack("raw", TealType::Uint64),
            ],
            None,
            Expr::Return(None),
        );
        assert!(!mixed.is_abi_routable());
        assert!(mixed.method_signature(None).is_err());
    }
}
