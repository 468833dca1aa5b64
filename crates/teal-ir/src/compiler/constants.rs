// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Constant pooling
//!
//! Integer and byte constants used more than once move into `intcblock` /
//! `bytecblock` at the start of the program, most frequent first, and their
//! uses become indexed references.

use crate::abi::method_selector;
use crate::compiler::lower::byte_literal;
use crate::compiler::ops::{Op, TealComponent};
use crate::types::OnComplete;
use indexmap::IndexMap;

pub(crate) fn assemble_constants(components: Vec<TealComponent>) -> Vec<TealComponent> {
    let mut ints: IndexMap<u64, usize> = IndexMap::new();
    let mut bytes: IndexMap<Vec<u8>, usize> = IndexMap::new();
    for component in &components {
        if let Some(value) = int_value(component) {
            *ints.entry(value).or_default() += 1;
        } else if let Some(value) = bytes_value(component) {
            *bytes.entry(value).or_default() += 1;
        }
    }

    let int_pool = pool(ints);
    let byte_pool = pool(bytes);

    let mut result = Vec::with_capacity(components.len() + 2);
    if !int_pool.is_empty() {
        result.push(TealComponent::Op {
            op: Op::Intcblock,
            args: int_pool.iter().map(u64::to_string).collect(),
        });
    }
    if !byte_pool.is_empty() {
        result.push(TealComponent::Op {
            op: Op::Bytecblock,
            args: byte_pool.iter().map(|b| byte_literal(b)).collect(),
        });
    }

    for component in components {
        let replacement = if let Some(i) = int_value(&component)
            .and_then(|v| int_pool.iter().position(|p| *p == v))
        {
            Some(Op::intc(i))
        } else if let Some(i) = bytes_value(&component)
            .and_then(|v| byte_pool.iter().position(|p| *p == v))
        {
            Some(Op::bytec(i))
        } else {
            None
        };
        match replacement {
            Some((op, args)) => result.push(TealComponent::Op { op, args }),
            None => result.push(component),
        }
    }
    result
}

/// Constants used more than once, most frequent first (ties keep first use order)
fn pool<T>(counts: IndexMap<T, usize>) -> Vec<T> {
    let mut entries: Vec<(T, usize)> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.into_iter().map(|(v, _)| v).collect()
}

fn int_value(component: &TealComponent) -> Option<u64> {
    if component.op()? != Op::Int {
        return None;
    }
    let arg = component.arg()?;
    arg.parse::<u64>()
        .ok()
        .or_else(|| OnComplete::from_name(arg).map(OnComplete::value))
}

fn bytes_value(component: &TealComponent) -> Option<Vec<u8>> {
    let arg = component.arg()?;
    match component.op()? {
        Op::Byte if arg == "\"\"" => Some(vec![]),
        Op::Byte => hex::decode(arg.strip_prefix("0x")?).ok(),
        Op::Method => {
            let signature = arg.strip_prefix('"')?.strip_suffix('"')?;
            Some(method_selector(signature).to_vec())
        }
        _ => None,
    }
}
