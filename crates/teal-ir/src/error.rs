// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised while building or lowering expressions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// An instruction is not available at the requested program version
    #[error("current version {current} is lower than {op}'s min version {min}")]
    VersionTooLow {
        op: &'static str,
        min: u64,
        current: u64,
    },
    #[error("unsupported program version {version}, expected {min}..={max}")]
    UnsupportedVersion { version: u64, min: u64, max: u64 },
    #[error("invalid ABI type: {0}")]
    InvalidTypeSpec(String),
    #[error("invalid method signature: {0}")]
    InvalidSignature(String),
    #[error("tuple element {index} out of range for {spec}")]
    TupleIndexOutOfRange { spec: String, index: usize },
    #[error("{0} is not a tuple type")]
    NotATuple(String),
    #[error("encoded value is too short: needed {needed} bytes, got {got}")]
    EncodingTooShort { needed: usize, got: usize },
    #[error("program uses {0} scratch slots, at most 256 are available")]
    TooManyScratchSlots(usize),
    #[error("return in the main program must carry a value")]
    MainReturnWithoutValue,
    #[error("parameter {index} referenced outside of a subroutine with that many parameters")]
    ParamOutOfScope { index: usize },
    #[error("failed to parse compile options: {0}")]
    InvalidOptions(String),
}
