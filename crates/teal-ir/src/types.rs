// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Value types and transaction-level enumerations of the target machine.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The stack type an expression leaves behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TealType {
    Uint64,
    Bytes,
    /// Either of the above, decided at runtime (e.g. a scratch load)
    Anytype,
    /// No value: the expression only has effects
    None,
}

impl Display for TealType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            TealType::Uint64 => "uint64",
            TealType::Bytes => "bytes",
            TealType::Anytype => "anytype",
            TealType::None => "none",
        };
        write!(f, "{}", s)
    }
}

/// On-completion action of an application call transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OnComplete {
    NoOp,
    OptIn,
    CloseOut,
    ClearState,
    UpdateApplication,
    DeleteApplication,
}

impl OnComplete {
    /// All actions in protocol order
    pub const ALL: [OnComplete; 6] = [
        OnComplete::NoOp,
        OnComplete::OptIn,
        OnComplete::CloseOut,
        OnComplete::ClearState,
        OnComplete::UpdateApplication,
        OnComplete::DeleteApplication,
    ];

    /// Protocol value of the action
    pub fn value(self) -> u64 {
        match self {
            OnComplete::NoOp => 0,
            OnComplete::OptIn => 1,
            OnComplete::CloseOut => 2,
            OnComplete::ClearState => 3,
            OnComplete::UpdateApplication => 4,
            OnComplete::DeleteApplication => 5,
        }
    }

    /// Name of the assembler constant for this action
    pub fn name(self) -> &'static str {
        match self {
            OnComplete::NoOp => "NoOp",
            OnComplete::OptIn => "OptIn",
            OnComplete::CloseOut => "CloseOut",
            OnComplete::ClearState => "ClearState",
            OnComplete::UpdateApplication => "UpdateApplication",
            OnComplete::DeleteApplication => "DeleteApplication",
        }
    }

    /// Resolve an assembler constant name
    pub fn from_name(name: &str) -> Option<OnComplete> {
        OnComplete::ALL.into_iter().find(|oc| oc.name() == name)
    }
}

impl Display for OnComplete {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Transaction fields read by dispatch conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxnField {
    ApplicationId,
    OnCompletion,
    NumAppArgs,
}

impl TxnField {
    pub fn name(self) -> &'static str {
        match self {
            TxnField::ApplicationId => "ApplicationID",
            TxnField::OnCompletion => "OnCompletion",
            TxnField::NumAppArgs => "NumAppArgs",
        }
    }
}
