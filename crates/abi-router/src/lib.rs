// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! ARC-4 router
//!
//! Registers bare-call and method handlers and compiles them into the
//! approval and clear-state programs of an application, plus the contract
//! descriptor clients use to call it.

mod ast_builder;
mod bare_calls;
mod call_config;
pub mod contract;
mod error;
mod handler;
mod router;
mod selector_table;

pub use ast_builder::{AstBuilder, CondNode};
pub use bare_calls::{BareCallActions, OnCompleteAction};
pub use call_config::{CallConfig, Condition, MethodConfig};
pub use contract::{Contract, Method};
pub use error::RouterError;
pub use handler::{
    pack_overflow_args, wrap_bare_call, wrap_handler, wrap_method_call, Handler, HandlerKind,
    METHOD_ARG_NUM_LIMIT,
};
pub use router::{CompiledContract, Router};
pub use selector_table::SelectorTable;
