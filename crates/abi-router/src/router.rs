// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! The router builds the approval and clear-state programs of an ARC-4
//! application together with its contract descriptor.
//!
//! Dispatch evaluates the bare-call node first, then every method in
//! registration order; the first matching node runs.

use crate::ast_builder::{AstBuilder, CondNode};
use crate::bare_calls::BareCallActions;
use crate::call_config::MethodConfig;
use crate::contract::{Contract, Method};
use crate::error::RouterError;
use crate::selector_table::SelectorTable;
use log::{debug, info};
use teal_ir::abi::method_selector;
use teal_ir::{compile, AbiReturnSubroutine, CompileOptions, Expr};

/// Compiled programs of a contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledContract {
    pub approval_program: String,
    pub clear_state_program: String,
    pub contract: Contract,
}

#[derive(Debug, Clone)]
pub struct Router {
    name: String,
    approval_ast: AstBuilder,
    clear_state_ast: AstBuilder,
    selectors: SelectorTable,
}

impl Router {
    pub fn new(
        name: impl Into<String>,
        bare_calls: Option<&BareCallActions<'_>>,
    ) -> Result<Self, RouterError> {
        let mut router = Self {
            name: name.into(),
            approval_ast: AstBuilder::new(),
            clear_state_ast: AstBuilder::new(),
            selectors: SelectorTable::new(),
        };

        let Some(bare_calls) = bare_calls.filter(|b| !b.is_empty()) else {
            return Ok(router);
        };
        let no_args = || Expr::eq(Expr::num_app_args(), Expr::int(0));
        if let Some(approval) = bare_calls.approval_construction()? {
            router.approval_ast.push(CondNode::new(no_args(), approval));
        }
        if let Some(clear_state) = bare_calls.clear_state_construction()? {
            router.clear_state_ast.push(CondNode::new(no_args(), clear_state));
        }
        debug!(
            "router {}: registered bare calls ({} approval, {} clear-state)",
            router.name,
            router.approval_ast.len(),
            router.clear_state_ast.len()
        );
        Ok(router)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn approval_ast(&self) -> &AstBuilder {
        &self.approval_ast
    }

    pub fn clear_state_ast(&self) -> &AstBuilder {
        &self.clear_state_ast
    }

    pub fn selectors(&self) -> &SelectorTable {
        &self.selectors
    }

    /// Register `method` under its ABI signature. The router is left
    /// untouched when registration fails.
    pub fn add_method_handler(
        &mut self,
        method: &AbiReturnSubroutine,
        overriding_name: Option<&str>,
        config: MethodConfig,
    ) -> Result<(), RouterError> {
        if !method.is_abi_routable() {
            return Err(RouterError::NotRoutable {
                name: method.name().to_string(),
                argument_count: method.argument_count(),
                abi_argument_count: method.abi_args().len(),
            });
        }
        let signature = method.method_signature(overriding_name)?;
        // an overriding name can still yield an unparseable signature
        Method::from_signature(&signature)?;
        if config.is_never() {
            return Err(RouterError::NeverExecuted(signature));
        }
        let selector = method_selector(&signature);
        self.selectors.check(&signature, &selector)?;

        let approval = CondNode::for_method(&signature, config.approval_cond(), method)?;
        let clear_state = CondNode::for_method(&signature, config.clear_state_cond(), method)?;

        self.selectors.insert(&signature)?;
        self.approval_ast.extend(approval);
        self.clear_state_ast.extend(clear_state);
        debug!(
            "router {}: registered {} as 0x{}",
            self.name,
            signature,
            hex::encode(selector)
        );
        Ok(())
    }

    /// Descriptor of every registered method, in registration order
    pub fn contract_construct(&self) -> Result<Contract, RouterError> {
        Ok(Contract::from_signatures(
            self.name.as_str(),
            self.selectors.signatures(),
        )?)
    }

    /// Approval program, clear-state program and contract descriptor.
    /// Building leaves the router unchanged and can be repeated.
    pub fn build_program(&self) -> Result<(Expr, Expr, Contract), RouterError> {
        if self.approval_ast.is_empty() && self.clear_state_ast.is_empty() {
            return Err(RouterError::EmptyProgram);
        }
        let approval = self.approval_ast.program_construction();
        let clear_state = self.clear_state_ast.program_construction();
        let contract = self.contract_construct()?;
        info!(
            "built router {}: {} approval branches, {} clear-state branches, {} methods",
            self.name,
            self.approval_ast.len(),
            self.clear_state_ast.len(),
            contract.methods.len()
        );
        Ok((approval, clear_state, contract))
    }

    /// `build_program`, then lower both programs with the same options
    pub fn compile_program(&self, options: &CompileOptions) -> Result<CompiledContract, RouterError> {
        let (approval, clear_state, contract) = self.build_program()?;
        Ok(CompiledContract {
            approval_program: compile(&approval, options)?,
            clear_state_program: compile(&clear_state, options)?,
            contract,
        })
    }
}
