// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Instructions emitted by lowering, with the program version that introduced them

use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Int,
    Byte,
    Method,
    Intcblock,
    Bytecblock,
    Intc,
    Intc0,
    Intc1,
    Intc2,
    Intc3,
    Bytec,
    Bytec0,
    Bytec1,
    Bytec2,
    Bytec3,
    Txn,
    Txna,
    Eq,
    Neq,
    Add,
    Not,
    And,
    Or,
    Concat,
    Btoi,
    Itob,
    Len,
    Pop,
    Err,
    Bnz,
    B,
    Return,
    Assert,
    Log,
    Load,
    Store,
    Callsub,
    Retsub,
    Getbit,
    Setbit,
    Uncover,
    Extract,
    Extract3,
    ExtractUint16,
    Substring3,
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::Int => "int",
            Op::Byte => "byte",
            Op::Method => "method",
            Op::Intcblock => "intcblock",
            Op::Bytecblock => "bytecblock",
            Op::Intc => "intc",
            Op::Intc0 => "intc_0",
            Op::Intc1 => "intc_1",
            Op::Intc2 => "intc_2",
            Op::Intc3 => "intc_3",
            Op::Bytec => "bytec",
            Op::Bytec0 => "bytec_0",
            Op::Bytec1 => "bytec_1",
            Op::Bytec2 => "bytec_2",
            Op::Bytec3 => "bytec_3",
            Op::Txn => "txn",
            Op::Txna => "txna",
            Op::Eq => "==",
            Op::Neq => "!=",
            Op::Add => "+",
            Op::Not => "!",
            Op::And => "&&",
            Op::Or => "||",
            Op::Concat => "concat",
            Op::Btoi => "btoi",
            Op::Itob => "itob",
            Op::Len => "len",
            Op::Pop => "pop",
            Op::Err => "err",
            Op::Bnz => "bnz",
            Op::B => "b",
            Op::Return => "return",
            Op::Assert => "assert",
            Op::Log => "log",
            Op::Load => "load",
            Op::Store => "store",
            Op::Callsub => "callsub",
            Op::Retsub => "retsub",
            Op::Getbit => "getbit",
            Op::Setbit => "setbit",
            Op::Uncover => "uncover",
            Op::Extract => "extract",
            Op::Extract3 => "extract3",
            Op::ExtractUint16 => "extract_uint16",
            Op::Substring3 => "substring3",
        }
    }

    pub fn min_version(self) -> u64 {
        match self {
            Op::Assert | Op::Getbit | Op::Setbit => 3,
            Op::Callsub | Op::Retsub => 4,
            Op::Log | Op::Uncover | Op::Extract | Op::Extract3 | Op::ExtractUint16 => 5,
            _ => 2,
        }
    }

    /// Slot-indexed constant reference for pool position `index`
    pub fn intc(index: usize) -> (Op, Vec<String>) {
        match index {
            0 => (Op::Intc0, vec![]),
            1 => (Op::Intc1, vec![]),
            2 => (Op::Intc2, vec![]),
            3 => (Op::Intc3, vec![]),
            _ => (Op::Intc, vec![index.to_string()]),
        }
    }

    pub fn bytec(index: usize) -> (Op, Vec<String>) {
        match index {
            0 => (Op::Bytec0, vec![]),
            1 => (Op::Bytec1, vec![]),
            2 => (Op::Bytec2, vec![]),
            3 => (Op::Bytec3, vec![]),
            _ => (Op::Bytec, vec![index.to_string()]),
        }
    }
}

/// One line of assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TealComponent {
    Op { op: Op, args: Vec<String> },
    Label(String),
}

impl TealComponent {
    pub fn op(&self) -> Option<Op> {
        match self {
            TealComponent::Op { op, .. } => Some(*op),
            TealComponent::Label(_) => None,
        }
    }

    /// First immediate argument of an instruction
    pub fn arg(&self) -> Option<&str> {
        match self {
            TealComponent::Op { args, .. } => args.first().map(String::as_str),
            TealComponent::Label(_) => None,
        }
    }
}

impl Display for TealComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TealComponent::Op { op, args } if args.is_empty() => write!(f, "{}", op.name()),
            TealComponent::Op { op, args } => write!(f, "{} {}", op.name(), args.iter().join(" ")),
            TealComponent::Label(label) => write!(f, "{}:", label),
        }
    }
}
