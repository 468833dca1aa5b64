// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Lowering of expression trees to assembly components

use crate::abi::{ElementLocation, TupleLayout, RETURN_METHOD_SELECTOR};
use crate::compiler::ops::{Op, TealComponent};
use crate::compiler::CompileOptions;
use crate::error::IrError;
use crate::expr::{BinOp, Expr, NaryOp, UnOp};
use crate::scratch::ScratchSlot;
use crate::subroutine::SubroutineDefinition;
use crate::types::TealType;
use indexmap::IndexMap;
use std::rc::Rc;

/// Number of physical scratch slots
const SCRATCH_SLOTS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SlotKey {
    Scratch(u64),
    Param { subroutine: usize, index: usize },
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    Main,
    Subroutine { key: usize, params: usize },
}

struct SubroutineEntry {
    label: String,
    definition: Rc<SubroutineDefinition>,
}

pub(crate) struct Lowering<'o> {
    options: &'o CompileOptions,
    out: Vec<TealComponent>,
    slots: IndexMap<SlotKey, usize>,
    subroutines: IndexMap<usize, SubroutineEntry>,
    next_label: usize,
    scope: Scope,
    label_prefix: String,
}

impl<'o> Lowering<'o> {
    pub(crate) fn new(options: &'o CompileOptions) -> Self {
        Self {
            options,
            out: Vec::new(),
            slots: IndexMap::new(),
            subroutines: IndexMap::new(),
            next_label: 0,
            scope: Scope::Main,
            label_prefix: "main".to_string(),
        }
    }

    /// Lower the main program followed by every subroutine it reaches
    pub(crate) fn lower_program(mut self, program: &Expr) -> Result<Vec<TealComponent>, IrError> {
        self.lower(program)?;
        // never fall through into subroutine code
        if !program.has_return() && !self.subroutines.is_empty() {
            self.emit(Op::Return, vec![])?;
        }

        // bodies may discover further subroutines while being lowered
        let mut next = 0;
        while let Some((&key, entry)) = self.subroutines.get_index(next) {
            let label = entry.label.clone();
            let definition = Rc::clone(&entry.definition);
            self.lower_subroutine(key, label, &definition)?;
            next += 1;
        }

        if self.slots.len() > SCRATCH_SLOTS {
            return Err(IrError::TooManyScratchSlots(self.slots.len()));
        }
        log::debug!(
            "lowered program: {} instructions, {} scratch slots, {} subroutines",
            self.out.len(),
            self.slots.len(),
            self.subroutines.len()
        );
        Ok(self.out)
    }

    fn lower_subroutine(
        &mut self,
        key: usize,
        label: String,
        definition: &SubroutineDefinition,
    ) -> Result<(), IrError> {
        self.out.push(TealComponent::Label(label.clone()));
        self.scope = Scope::Subroutine {
            key,
            params: definition.argument_count(),
        };
        self.label_prefix = label;

        // arguments arrive in order, so the last one is on top
        for index in (0..definition.argument_count()).rev() {
            let slot = self.slot_index(SlotKey::Param { subroutine: key, index });
            self.emit(Op::Store, vec![slot.to_string()])?;
        }
        self.lower(&definition.body)?;
        if !definition.body.has_return() {
            self.emit(Op::Retsub, vec![])?;
        }
        Ok(())
    }

    fn emit(&mut self, op: Op, args: Vec<String>) -> Result<(), IrError> {
        self.check_version(op)?;
        self.out.push(TealComponent::Op { op, args });
        Ok(())
    }

    fn check_version(&self, op: Op) -> Result<(), IrError> {
        if self.options.version < op.min_version() {
            return Err(IrError::VersionTooLow {
                op: op.name(),
                min: op.min_version(),
                current: self.options.version,
            });
        }
        Ok(())
    }

    fn new_label(&mut self) -> String {
        let label = format!("{}_l{}", self.label_prefix, self.next_label);
        self.next_label += 1;
        label
    }

    fn slot_index(&mut self, key: SlotKey) -> usize {
        let next = self.slots.len();
        *self.slots.entry(key).or_insert(next)
    }

    fn scratch(&mut self, slot: ScratchSlot) -> String {
        self.slot_index(SlotKey::Scratch(slot.id())).to_string()
    }

    fn subroutine_label(&mut self, definition: &Rc<SubroutineDefinition>) -> String {
        let key = Rc::as_ptr(definition) as usize;
        let count = self.subroutines.len();
        self.subroutines
            .entry(key)
            .or_insert_with(|| SubroutineEntry {
                label: format!("{}_{}", definition.name, count),
                definition: Rc::clone(definition),
            })
            .label
            .clone()
    }

    fn lower(&mut self, expr: &Expr) -> Result<(), IrError> {
        match expr {
            Expr::Int(value) => self.emit(Op::Int, vec![value.to_string()]),
            Expr::EnumInt(action) => self.emit(Op::Int, vec![action.name().to_string()]),
            Expr::Bytes(bytes) => self.emit(Op::Byte, vec![byte_literal(bytes)]),
            Expr::Txn(field) => self.emit(Op::Txn, vec![field.name().to_string()]),
            Expr::TxnArg(index) => {
                self.emit(Op::Txna, vec!["ApplicationArgs".to_string(), index.to_string()])
            }
            Expr::MethodSignature(signature) => {
                self.emit(Op::Method, vec![format!("\"{}\"", signature)])
            }
            Expr::BinOp { op, lhs, rhs } => {
                self.lower(lhs)?;
                self.lower(rhs)?;
                let op = match op {
                    BinOp::Eq => Op::Eq,
                    BinOp::Neq => Op::Neq,
                    BinOp::Add => Op::Add,
                    BinOp::Concat => Op::Concat,
                };
                self.emit(op, vec![])
            }
            Expr::UnOp { op, operand } => {
                self.lower(operand)?;
                let op = match op {
                    UnOp::Not => Op::Not,
                    UnOp::Btoi => Op::Btoi,
                    UnOp::Itob => Op::Itob,
                    UnOp::Len => Op::Len,
                };
                self.emit(op, vec![])
            }
            Expr::Nary { op, args } => {
                let (teal_op, identity) = match op {
                    NaryOp::And => (Op::And, 1),
                    NaryOp::Or => (Op::Or, 0),
                };
                let Some((first, rest)) = args.split_first() else {
                    return self.emit(Op::Int, vec![identity.to_string()]);
                };
                self.lower(first)?;
                for arg in rest {
                    self.lower(arg)?;
                    self.emit(teal_op, vec![])?;
                }
                Ok(())
            }
            Expr::Seq(exprs) => {
                for (i, e) in exprs.iter().enumerate() {
                    self.lower(e)?;
                    if i + 1 < exprs.len() && e.type_of() != TealType::None {
                        self.emit(Op::Pop, vec![])?;
                    }
                }
                Ok(())
            }
            Expr::Cond(branches) => self.lower_cond(branches),
            Expr::Assert(cond) => {
                self.lower(cond)?;
                self.emit(Op::Assert, vec![])
            }
            Expr::Return(value) => {
                match (value, self.scope) {
                    (None, Scope::Main) => return Err(IrError::MainReturnWithoutValue),
                    (Some(v), _) => self.lower(v)?,
                    (None, Scope::Subroutine { .. }) => {}
                }
                match self.scope {
                    Scope::Main => self.emit(Op::Return, vec![]),
                    Scope::Subroutine { .. } => self.emit(Op::Retsub, vec![]),
                }
            }
            Expr::Err => self.emit(Op::Err, vec![]),
            Expr::Log(message) => {
                self.lower(message)?;
                self.emit(Op::Log, vec![])
            }
            Expr::Load(slot) => {
                let index = self.scratch(*slot);
                self.emit(Op::Load, vec![index])
            }
            Expr::Store { slot, value } => {
                self.lower(value)?;
                let index = self.scratch(*slot);
                self.emit(Op::Store, vec![index])
            }
            Expr::Param { index, .. } => match self.scope {
                Scope::Subroutine { key, params } if *index < params => {
                    let slot = self.slot_index(SlotKey::Param {
                        subroutine: key,
                        index: *index,
                    });
                    self.emit(Op::Load, vec![slot.to_string()])
                }
                _ => Err(IrError::ParamOutOfScope { index: *index }),
            },
            Expr::Call { subroutine, args } => {
                for arg in args {
                    self.lower(arg)?;
                }
                let label = self.subroutine_label(subroutine);
                self.emit(Op::Callsub, vec![label])
            }
            Expr::TupleElement { tuple, index } => {
                let elems = tuple
                    .spec()
                    .tuple_elements()
                    .ok_or_else(|| IrError::NotATuple(tuple.spec().to_string()))?;
                let location = TupleLayout::new(elems).location(*index).ok_or_else(|| {
                    IrError::TupleIndexOutOfRange {
                        spec: tuple.spec().to_string(),
                        index: *index,
                    }
                })?;
                let slot = self.scratch(tuple.slot());
                self.lower_element(&slot, location)
            }
            Expr::MethodReturn(value) => {
                // fail before emitting anything for the return
                self.check_version(Op::Log)?;
                self.emit(Op::Byte, vec![byte_literal(&RETURN_METHOD_SELECTOR)])?;
                let index = self.scratch(value.slot());
                self.emit(Op::Load, vec![index])?;
                self.emit(Op::Concat, vec![])?;
                self.emit(Op::Log, vec![])
            }
        }
    }

    fn lower_cond(&mut self, branches: &[(Expr, Expr)]) -> Result<(), IrError> {
        let labels: Vec<String> = branches.iter().map(|_| self.new_label()).collect();
        for ((cond, _), label) in branches.iter().zip(&labels) {
            self.lower(cond)?;
            self.emit(Op::Bnz, vec![label.clone()])?;
        }
        self.emit(Op::Err, vec![])?;

        let end = branches
            .iter()
            .any(|(_, branch)| !branch.has_return())
            .then(|| self.new_label());
        for (i, ((_, branch), label)) in branches.iter().zip(labels).enumerate() {
            self.out.push(TealComponent::Label(label));
            self.lower(branch)?;
            let is_last = i + 1 == branches.len();
            if let Some(end) = &end {
                if !branch.has_return() && !is_last {
                    self.emit(Op::B, vec![end.clone()])?;
                }
            }
        }
        if let Some(end) = end {
            self.out.push(TealComponent::Label(end));
        }
        Ok(())
    }

    fn lower_element(&mut self, slot: &str, location: ElementLocation) -> Result<(), IrError> {
        let load = |l: &mut Self| l.emit(Op::Load, vec![slot.to_string()]);
        match location {
            ElementLocation::Static { offset, length } => {
                load(self)?;
                if offset <= 255 && (1..=255).contains(&length) {
                    self.emit(Op::Extract, vec![offset.to_string(), length.to_string()])
                } else {
                    self.emit(Op::Int, vec![offset.to_string()])?;
                    self.emit(Op::Int, vec![length.to_string()])?;
                    self.emit(Op::Extract3, vec![])
                }
            }
            ElementLocation::Bool { bit } => {
                load(self)?;
                self.emit(Op::Int, vec![bit.to_string()])?;
                self.emit(Op::Getbit, vec![])?;
                // re-encode the bit as a standalone bool byte
                self.emit(Op::Byte, vec![byte_literal(&[0x00])])?;
                self.emit(Op::Int, vec!["0".to_string()])?;
                self.emit(Op::Uncover, vec!["2".to_string()])?;
                self.emit(Op::Setbit, vec![])
            }
            ElementLocation::Dynamic { head, next_head } => {
                load(self)?;
                load(self)?;
                self.emit(Op::Int, vec![head.to_string()])?;
                self.emit(Op::ExtractUint16, vec![])?;
                load(self)?;
                match next_head {
                    Some(next) => {
                        self.emit(Op::Int, vec![next.to_string()])?;
                        self.emit(Op::ExtractUint16, vec![])?;
                    }
                    None => self.emit(Op::Len, vec![])?,
                }
                self.emit(Op::Substring3, vec![])
            }
        }
    }
}

/// Assembly literal for a byte string
pub(crate) fn byte_literal(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        "\"\"".to_string()
    } else {
        format!("0x{}", hex::encode(bytes))
    }
}
