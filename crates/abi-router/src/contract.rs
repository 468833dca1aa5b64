// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! ARC-4 contract descriptor
//!
//! Lists the name of a contract and the signatures of its routable methods so
//! off-chain clients can encode calls. Bare calls are not part of it.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use teal_ir::abi::{method_selector, split_top_level, Selector, TypeSpec};
use teal_ir::IrError;

const VOID: &str = "void";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Returns {
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub args: Vec<Argument>,
    pub returns: Returns,
}

impl Method {
    /// Parse `name(arg,...)ret`. Argument and return types are validated and
    /// kept in canonical form.
    pub fn from_signature(signature: &str) -> Result<Self, IrError> {
        let invalid = || IrError::InvalidSignature(signature.to_string());

        let open = signature.find('(').ok_or_else(invalid)?;
        let name = &signature[..open];
        if name.is_empty() || name.contains(')') {
            return Err(invalid());
        }

        let mut depth = 0usize;
        let mut close = None;
        for (i, c) in signature[open..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(open + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(invalid)?;

        let args = split_top_level(&signature[open + 1..close])
            .ok_or_else(invalid)?
            .into_iter()
            .map(|arg| {
                Ok(Argument {
                    type_name: arg.parse::<TypeSpec>()?.to_string(),
                })
            })
            .collect::<Result<Vec<_>, IrError>>()?;

        let ret = &signature[close + 1..];
        let returns = Returns {
            type_name: if ret == VOID {
                VOID.to_string()
            } else {
                ret.parse::<TypeSpec>()?.to_string()
            },
        };

        Ok(Self {
            name: name.to_string(),
            args,
            returns,
        })
    }

    pub fn signature(&self) -> String {
        format!(
            "{}({}){}",
            self.name,
            self.args.iter().map(|a| &a.type_name).join(","),
            self.returns.type_name
        )
    }

    pub fn selector(&self) -> Selector {
        method_selector(&self.signature())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub name: String,
    pub methods: Vec<Method>,
}

impl Contract {
    pub fn new(name: impl Into<String>, methods: Vec<Method>) -> Self {
        Self {
            name: name.into(),
            methods,
        }
    }

    pub fn from_signatures<'a>(
        name: impl Into<String>,
        signatures: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, IrError> {
        let methods = signatures
            .into_iter()
            .map(Method::from_signature)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(name, methods))
    }

    pub fn method_by_name(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
