// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::error::RouterError;
use bimap::BiBTreeMap;
use teal_ir::abi::{method_selector, Selector};

/// Bidirectional signature/selector registry, remembering registration order
#[derive(Debug, Clone, Default)]
pub struct SelectorTable {
    entries: BiBTreeMap<String, Selector>,
    order: Vec<String>,
}

impl SelectorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails on an already registered signature, or on a selector already
    /// owned by another signature
    pub fn check(&self, signature: &str, selector: &Selector) -> Result<(), RouterError> {
        if self.entries.contains_left(signature) {
            return Err(RouterError::DuplicateMethod(signature.to_string()));
        }
        if let Some(existing) = self.entries.get_by_right(selector) {
            return Err(RouterError::SelectorCollision {
                signature: signature.to_string(),
                existing: existing.clone(),
            });
        }
        Ok(())
    }

    /// Register `signature` under its selector; nothing changes on failure
    pub fn insert(&mut self, signature: &str) -> Result<Selector, RouterError> {
        let selector = method_selector(signature);
        self.check(signature, &selector)?;
        if self
            .entries
            .insert_no_overwrite(signature.to_string(), selector)
            .is_err()
        {
            return Err(RouterError::DuplicateMethod(signature.to_string()));
        }
        self.order.push(signature.to_string());
        Ok(selector)
    }

    /// Registered signatures, oldest first
    pub fn signatures(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn selector_of(&self, signature: &str) -> Option<&Selector> {
        self.entries.get_by_left(signature)
    }

    pub fn signature_of(&self, selector: &Selector) -> Option<&str> {
        self.entries.get_by_right(selector).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
