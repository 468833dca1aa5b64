// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::handler::HandlerKind;
use teal_ir::IrError;
use thiserror::Error;

/// Errors raised while registering handlers or building programs.
/// All of them are fatal to the contract build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    // === Shape ===
    #[error("bare call {kind} handler must not produce a value, it produces {found}")]
    BareCallReturnType { kind: HandlerKind, found: String },

    #[error("bare call {kind} handler must take 0 args, it takes {count}")]
    BareCallArgumentCount { kind: HandlerKind, count: usize },

    #[error("method call handler must be an ABI-returning subroutine, got {0}")]
    NotAbiMethod(HandlerKind),

    #[error("method call handler {name} is not routable: got {argument_count} args with {abi_argument_count} ABI args")]
    NotRoutable {
        name: String,
        argument_count: usize,
        abi_argument_count: usize,
    },

    // === Registration ===
    #[error("registered method {0} is never executed")]
    NeverExecuted(String),

    #[error("re-registering method {0} detected")]
    DuplicateMethod(String),

    #[error("re-registering method {signature} has hash collision with {existing}")]
    SelectorCollision { signature: String, existing: String },

    // === Build ===
    #[error("cannot build program with an empty AST")]
    EmptyProgram,

    #[error("call config value {0} is outside of never/call/create/all")]
    InvalidCallConfig(u8),

    // === Capability and IR ===
    #[error(transparent)]
    Ir(#[from] IrError),
}
