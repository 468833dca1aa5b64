// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! TEAL intermediate representation
//!
//! Expression trees for contract programs, ABI value placeholders, subroutine
//! definitions, and their lowering to TEAL assembly text. Dispatch logic lives
//! in the `abi-router` crate; this crate only provides the building blocks it
//! composes.

pub mod abi;
pub mod compiler;
mod error;
mod expr;
mod scratch;
mod subroutine;
mod types;

pub use compiler::{
    compile, compile_components, CompileOptions, OptimizeOptions, DEFAULT_PROGRAM_VERSION,
    MAX_PROGRAM_VERSION, MIN_PROGRAM_VERSION,
};
pub use error::IrError;
pub use expr::{BinOp, Expr, NaryOp, UnOp};
pub use scratch::ScratchSlot;
pub use subroutine::{AbiReturnSubroutine, Param, ParamKind, Subroutine, SubroutineDefinition};
pub use types::{OnComplete, TealType, TxnField};
