// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Expression tree for contract programs
//!
//! Everything is an expression: sequencing, branching and effects are nodes like
//! any other. Each node exposes the stack type it leaves behind (`type_of`) and
//! whether every path through it ends the program or subroutine (`has_return`).

use crate::abi::AbiValue;
use crate::scratch::ScratchSlot;
use crate::subroutine::SubroutineDefinition;
use crate::types::{OnComplete, TealType, TxnField};
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // === Atoms ===
    Int(u64),
    /// Named on-completion constant, rendered by name
    EnumInt(OnComplete),
    Bytes(Vec<u8>),
    Txn(TxnField),
    /// Application argument at a fixed index
    TxnArg(usize),
    /// 4-byte selector of a method signature
    MethodSignature(String),

    // === Operators ===
    BinOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    UnOp {
        op: UnOp,
        operand: Box<Expr>,
    },
    /// Logical and/or over two or more operands
    Nary {
        op: NaryOp,
        args: Vec<Expr>,
    },

    // === Control flow ===
    Seq(Vec<Expr>),
    /// Ordered (condition, branch) pairs; the first true condition wins,
    /// and the program fails if none holds
    Cond(Vec<(Expr, Expr)>),
    Assert(Box<Expr>),
    /// Ends the program (with a value) or the enclosing subroutine
    Return(Option<Box<Expr>>),
    Err,

    // === Effects and storage ===
    Log(Box<Expr>),
    Load(ScratchSlot),
    Store {
        slot: ScratchSlot,
        value: Box<Expr>,
    },
    /// Parameter of the enclosing subroutine
    Param {
        index: usize,
        ty: TealType,
    },
    Call {
        subroutine: Rc<SubroutineDefinition>,
        args: Vec<Expr>,
    },

    // === ABI ===
    /// Encoded bytes of one element of an encoded tuple
    TupleElement {
        tuple: AbiValue,
        index: usize,
    },
    /// Logs the return tag followed by the encoded value
    MethodReturn(AbiValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    Neq,
    Add,
    Concat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Btoi,
    Itob,
    Len,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaryOp {
    And,
    Or,
}

impl Expr {
    pub fn int(value: u64) -> Expr {
        Expr::Int(value)
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Expr {
        Expr::Bytes(value.into())
    }

    pub fn on_complete(action: OnComplete) -> Expr {
        Expr::EnumInt(action)
    }

    pub fn application_id() -> Expr {
        Expr::Txn(TxnField::ApplicationId)
    }

    pub fn on_completion() -> Expr {
        Expr::Txn(TxnField::OnCompletion)
    }

    pub fn num_app_args() -> Expr {
        Expr::Txn(TxnField::NumAppArgs)
    }

    pub fn app_arg(index: usize) -> Expr {
        Expr::TxnArg(index)
    }

    pub fn method_signature(signature: impl Into<String>) -> Expr {
        Expr::MethodSignature(signature.into())
    }

    /// Accept the transaction
    pub fn approve() -> Expr {
        Expr::Return(Some(Box::new(Expr::Int(1))))
    }

    /// Reject the transaction
    pub fn reject() -> Expr {
        Expr::Return(Some(Box::new(Expr::Int(0))))
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binop(BinOp::Eq, lhs, rhs)
    }

    pub fn neq(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binop(BinOp::Neq, lhs, rhs)
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binop(BinOp::Add, lhs, rhs)
    }

    pub fn concat(lhs: Expr, rhs: Expr) -> Expr {
        Expr::binop(BinOp::Concat, lhs, rhs)
    }

    pub fn binop(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::BinOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unop(op: UnOp, operand: Expr) -> Expr {
        Expr::UnOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// Conjunction; a single operand is returned unchanged
    pub fn and(args: Vec<Expr>) -> Expr {
        Expr::nary(NaryOp::And, args)
    }

    /// Disjunction; a single operand is returned unchanged
    pub fn or(args: Vec<Expr>) -> Expr {
        Expr::nary(NaryOp::Or, args)
    }

    fn nary(op: NaryOp, mut args: Vec<Expr>) -> Expr {
        if args.len() == 1 {
            return args.remove(0);
        }
        Expr::Nary { op, args }
    }

    pub fn seq(exprs: Vec<Expr>) -> Expr {
        Expr::Seq(exprs)
    }

    pub fn cond(branches: Vec<(Expr, Expr)>) -> Expr {
        Expr::Cond(branches)
    }

    pub fn assert(cond: Expr) -> Expr {
        Expr::Assert(Box::new(cond))
    }

    pub fn log(message: Expr) -> Expr {
        Expr::Log(Box::new(message))
    }

    pub fn store(slot: ScratchSlot, value: Expr) -> Expr {
        Expr::Store {
            slot,
            value: Box::new(value),
        }
    }

    /// The stack type left behind after evaluating this expression
    pub fn type_of(&self) -> TealType {
        match self {
            Expr::Int(_) | Expr::EnumInt(_) | Expr::Txn(_) => TealType::Uint64,
            Expr::Bytes(_) | Expr::TxnArg(_) | Expr::MethodSignature(_) => TealType::Bytes,
            Expr::BinOp { op, .. } => match op {
                BinOp::Eq | BinOp::Neq | BinOp::Add => TealType::Uint64,
                BinOp::Concat => TealType::Bytes,
            },
            Expr::UnOp { op, .. } => match op {
                UnOp::Not | UnOp::Btoi | UnOp::Len => TealType::Uint64,
                UnOp::Itob => TealType::Bytes,
            },
            Expr::Nary { .. } => TealType::Uint64,
            Expr::Seq(exprs) => exprs.last().map_or(TealType::None, Expr::type_of),
            Expr::Cond(branches) => branches
                .first()
                .map_or(TealType::None, |(_, branch)| branch.type_of()),
            Expr::Assert(_)
            | Expr::Return(_)
            | Expr::Err
            | Expr::Log(_)
            | Expr::Store { .. }
            | Expr::MethodReturn(_) => TealType::None,
            Expr::Load(_) => TealType::Anytype,
            Expr::Param { ty, .. } => *ty,
            Expr::Call { subroutine, .. } => subroutine.return_type,
            Expr::TupleElement { .. } => TealType::Bytes,
        }
    }

    /// Check if every path through this expression terminates
    pub fn has_return(&self) -> bool {
        match self {
            Expr::Return(_) | Expr::Err => true,
            Expr::Seq(exprs) => exprs.last().is_some_and(Expr::has_return),
            Expr::Cond(branches) => branches.iter().all(|(_, branch)| branch.has_return()),
            _ => false,
        }
    }

    /// Direct children, in evaluation order
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::BinOp { lhs, rhs, .. } => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::UnOp { operand, .. } => vec![operand.as_ref()],
            Expr::Nary { args, .. } | Expr::Seq(args) | Expr::Call { args, .. } => {
                args.iter().collect()
            }
            Expr::Cond(branches) => branches.iter().flat_map(|(c, b)| [c, b]).collect(),
            Expr::Assert(e) | Expr::Log(e) => vec![e.as_ref()],
            Expr::Return(value) => value.iter().map(|v| v.as_ref()).collect(),
            Expr::Store { value, .. } => vec![value.as_ref()],
            _ => vec![],
        }
    }

    /// All nodes of this tree (including itself), depth first
    pub fn iter(&self) -> impl Iterator<Item = &Expr> {
        fn collect<'a>(node: &'a Expr, out: &mut Vec<&'a Expr>) {
            out.push(node);
            for child in node.children() {
                collect(child, out);
            }
        }
        let mut out = Vec::new();
        collect(self, &mut out);
        out.into_iter()
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(v) => write!(f, "(Int {})", v),
            Expr::EnumInt(oc) => write!(f, "(IntEnum {})", oc),
            Expr::Bytes(b) => write!(f, "(Bytes 0x{})", hex::encode(b)),
            Expr::Txn(field) => write!(f, "(Txn {})", field.name()),
            Expr::TxnArg(i) => write!(f, "(Txna ApplicationArgs {})", i),
            Expr::MethodSignature(sig) => write!(f, "(MethodSignature '{}')", sig),
            Expr::BinOp { op, lhs, rhs } => {
                let name = match op {
                    BinOp::Eq => "==",
                    BinOp::Neq => "!=",
                    BinOp::Add => "+",
                    BinOp::Concat => "concat",
                };
                write!(f, "({} {} {})", name, lhs, rhs)
            }
            Expr::UnOp { op, operand } => {
                let name = match op {
                    UnOp::Not => "!",
                    UnOp::Btoi => "btoi",
                    UnOp::Itob => "itob",
                    UnOp::Len => "len",
                };
                write!(f, "({} {})", name, operand)
            }
            Expr::Nary { op, args } => {
                let name = match op {
                    NaryOp::And => "And",
                    NaryOp::Or => "Or",
                };
                write!(f, "({} {})", name, args.iter().join(" "))
            }
            Expr::Seq(exprs) => write!(f, "(Seq {})", exprs.iter().join(" ")),
            Expr::Cond(branches) => {
                write!(f, "(Cond")?;
                for (c, b) in branches {
                    write!(f, " [{}, {}]", c, b)?;
                }
                write!(f, ")")
            }
            Expr::Assert(c) => write!(f, "(Assert {})", c),
            Expr::Return(Some(v)) => write!(f, "(Return {})", v),
            Expr::Return(None) => write!(f, "(Return)"),
            Expr::Err => write!(f, "(Err)"),
            Expr::Log(m) => write!(f, "(Log {})", m),
            Expr::Load(slot) => write!(f, "(Load slot#{})", slot.id()),
            Expr::Store { slot, value } => write!(f, "(Store slot#{} {})", slot.id(), value),
            Expr::Param { index, .. } => write!(f, "(Param {})", index),
            Expr::Call { subroutine, args } => {
                write!(f, "(SubroutineCall {}", subroutine.name)?;
                for a in args {
                    write!(f, " {}", a)?;
                }
                write!(f, ")")
            }
            Expr::TupleElement { tuple, index } => {
                write!(f, "(TupleElement slot#{} {})", tuple.slot().id(), index)
            }
            Expr::MethodReturn(value) => write!(f, "(MethodReturn {})", value.spec()),
        }
    }
}
