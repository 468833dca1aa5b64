// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::compiler::ops::{Op, TealComponent};
use std::collections::HashMap;

/// Drop `store i; load i` pairs when slot `i` is touched nowhere else:
/// the value simply stays on the stack.
pub(crate) fn remove_redundant_slots(components: Vec<TealComponent>) -> Vec<TealComponent> {
    let mut uses: HashMap<String, usize> = HashMap::new();
    for component in &components {
        if matches!(component.op(), Some(Op::Store | Op::Load)) {
            if let Some(slot) = component.arg() {
                *uses.entry(slot.to_string()).or_default() += 1;
            }
        }
    }

    let mut result = Vec::with_capacity(components.len());
    let mut iter = components.into_iter().peekable();
    while let Some(component) = iter.next() {
        if let (Some(Op::Store), Some(slot)) = (component.op(), component.arg()) {
            let paired = iter.peek().is_some_and(|next| {
                next.op() == Some(Op::Load) && next.arg() == Some(slot)
            });
            if paired && uses.get(slot) == Some(&2) {
                iter.next();
                continue;
            }
        }
        result.push(component);
    }
    result
}
