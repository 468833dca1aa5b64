// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(0);

/// Symbolic scratch-space slot.
///
/// Ids are unique for the lifetime of the process so that expressions built
/// independently never share storage. Lowering maps them onto the machine's
/// 256 physical slots in order of first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScratchSlot {
    id: u64,
}

impl ScratchSlot {
    pub fn fresh() -> Self {
        Self {
            id: NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}
