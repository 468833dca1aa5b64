// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Call configurations
//!
//! A `CallConfig` says whether a handler may run on a call to an existing
//! application, on the creation call, on both, or never, for one on-completion
//! action. A `MethodConfig` holds one of them per action and derives the guard
//! conditions of the approval and clear-state programs.

use crate::error::RouterError;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;
use teal_ir::{Expr, OnComplete};

/// On-completion actions whose transactions run the approval program
const APPROVAL_ACTIONS: [OnComplete; 5] = [
    OnComplete::NoOp,
    OnComplete::OptIn,
    OnComplete::CloseOut,
    OnComplete::UpdateApplication,
    OnComplete::DeleteApplication,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallConfig {
    #[default]
    Never,
    Call,
    Create,
    /// `Call | Create`
    All,
}

impl CallConfig {
    pub fn from_bits(bits: u8) -> Result<Self, RouterError> {
        match bits {
            0 => Ok(CallConfig::Never),
            1 => Ok(CallConfig::Call),
            2 => Ok(CallConfig::Create),
            3 => Ok(CallConfig::All),
            _ => Err(RouterError::InvalidCallConfig(bits)),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            CallConfig::Never => 0,
            CallConfig::Call => 1,
            CallConfig::Create => 2,
            CallConfig::All => 3,
        }
    }

    /// Whether every case allowed by `other` is allowed by `self`
    pub fn contains(self, other: CallConfig) -> bool {
        self.bits() & other.bits() == other.bits()
    }

    /// Application-id guard distinguishing creation from calls
    pub fn app_id_condition(self) -> Condition {
        match self {
            CallConfig::Never => Condition::Never,
            CallConfig::Call => Condition::Expr(Expr::neq(Expr::application_id(), Expr::int(0))),
            CallConfig::Create => Condition::Expr(Expr::eq(Expr::application_id(), Expr::int(0))),
            CallConfig::All => Condition::Always,
        }
    }
}

impl BitOr for CallConfig {
    type Output = CallConfig;

    fn bitor(self, rhs: CallConfig) -> CallConfig {
        match self.bits() | rhs.bits() {
            0 => CallConfig::Never,
            1 => CallConfig::Call,
            2 => CallConfig::Create,
            _ => CallConfig::All,
        }
    }
}

impl TryFrom<u8> for CallConfig {
    type Error = RouterError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        CallConfig::from_bits(bits)
    }
}

/// A guard that is either statically known or computed at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Constant 0
    Never,
    /// Constant 1
    Always,
    Expr(Expr),
}

/// Per on-completion call configuration of one method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MethodConfig {
    pub no_op: CallConfig,
    pub opt_in: CallConfig,
    pub close_out: CallConfig,
    pub clear_state: CallConfig,
    pub update_application: CallConfig,
    pub delete_application: CallConfig,
}

impl Default for MethodConfig {
    fn default() -> Self {
        Self {
            no_op: CallConfig::Call,
            opt_in: CallConfig::Never,
            close_out: CallConfig::Never,
            clear_state: CallConfig::Never,
            update_application: CallConfig::Never,
            delete_application: CallConfig::Never,
        }
    }
}

impl MethodConfig {
    /// Allowed under every on-completion action, on creation and on calls
    pub fn arc4_compliant() -> Self {
        Self {
            no_op: CallConfig::All,
            opt_in: CallConfig::All,
            close_out: CallConfig::All,
            clear_state: CallConfig::All,
            update_application: CallConfig::All,
            delete_application: CallConfig::All,
        }
    }

    pub fn never() -> Self {
        Self {
            no_op: CallConfig::Never,
            ..Self::default()
        }
    }

    pub fn is_arc4_compliant(&self) -> bool {
        *self == Self::arc4_compliant()
    }

    pub fn is_never(&self) -> bool {
        OnComplete::ALL
            .iter()
            .all(|action| self.get(*action) == CallConfig::Never)
    }

    pub fn get(&self, action: OnComplete) -> CallConfig {
        match action {
            OnComplete::NoOp => self.no_op,
            OnComplete::OptIn => self.opt_in,
            OnComplete::CloseOut => self.close_out,
            OnComplete::ClearState => self.clear_state,
            OnComplete::UpdateApplication => self.update_application,
            OnComplete::DeleteApplication => self.delete_application,
        }
    }

    /// Copy with the config for `action` replaced
    pub fn with(mut self, action: OnComplete, config: CallConfig) -> Self {
        let field = match action {
            OnComplete::NoOp => &mut self.no_op,
            OnComplete::OptIn => &mut self.opt_in,
            OnComplete::CloseOut => &mut self.close_out,
            OnComplete::ClearState => &mut self.clear_state,
            OnComplete::UpdateApplication => &mut self.update_application,
            OnComplete::DeleteApplication => &mut self.delete_application,
        };
        *field = config;
        self
    }

    /// When an approval-program call matches this method
    pub fn approval_cond(&self) -> Condition {
        let configs = APPROVAL_ACTIONS.map(|action| (action, self.get(action)));
        if configs.iter().all(|(_, cc)| *cc == CallConfig::Never) {
            return Condition::Never;
        }
        if configs.iter().all(|(_, cc)| *cc == CallConfig::All) {
            return Condition::Always;
        }

        let terms = configs
            .into_iter()
            .filter_map(|(action, cc)| {
                let on_completion = Expr::eq(Expr::on_completion(), Expr::on_complete(action));
                match cc.app_id_condition() {
                    Condition::Never => None,
                    Condition::Always => Some(on_completion),
                    Condition::Expr(app_id) => Some(Expr::and(vec![on_completion, app_id])),
                }
            })
            .collect();
        Condition::Expr(Expr::or(terms))
    }

    /// When a clear-state-program call matches this method
    pub fn clear_state_cond(&self) -> Condition {
        self.clear_state.app_id_condition()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_completion_is(action: OnComplete) -> Expr {
        Expr::eq(Expr::on_completion(), Expr::on_complete(action))
    }

    #[test]
    fn test_call_config_union() {
        assert_eq!(CallConfig::Call | CallConfig::Create, CallConfig::All);
        assert_eq!(CallConfig::Never | CallConfig::Call, CallConfig::Call);
        assert_eq!(CallConfig::All | CallConfig::Create, CallConfig::All);
        assert!(CallConfig::All.contains(CallConfig::Create));
        assert!(!CallConfig::Call.contains(CallConfig::Create));
        assert!(CallConfig::Never.contains(CallConfig::Never));
    }

    #[test]
    fn test_call_config_bits() {
        for bits in 0..4 {
            assert_eq!(CallConfig::from_bits(bits).unwrap().bits(), bits);
        }
        assert_eq!(CallConfig::from_bits(4), Err(RouterError::InvalidCallConfig(4)));
        assert_eq!(CallConfig::try_from(255u8), Err(RouterError::InvalidCallConfig(255)));
    }

    #[test]
    fn test_never_everywhere() {
        let config = MethodConfig::never();
        assert!(config.is_never());
        assert_eq!(config.approval_cond(), Condition::Never);
        assert_eq!(config.clear_state_cond(), Condition::Never);
        assert!(!MethodConfig::default().is_never());
        // clear state alone still counts as executable
        assert!(!MethodConfig::never()
            .with(OnComplete::ClearState, CallConfig::Call)
            .is_never());
    }

    #[test]
    fn test_all_everywhere() {
        let config = MethodConfig::arc4_compliant();
        assert!(config.is_arc4_compliant());
        assert_eq!(config.approval_cond(), Condition::Always);
        assert_eq!(config.clear_state_cond(), Condition::Always);

        let mut built = MethodConfig::never();
        for action in OnComplete::ALL {
            built = built.with(action, CallConfig::All);
        }
        assert_eq!(built, MethodConfig::arc4_compliant());
    }

    #[test]
    fn test_default_config_condition() {
        assert_eq!(
            MethodConfig::default().approval_cond(),
            Condition::Expr(Expr::and(vec![
                on_completion_is(OnComplete::NoOp),
                Expr::neq(Expr::application_id(), Expr::int(0)),
            ]))
        );
        assert_eq!(MethodConfig::default().clear_state_cond(), Condition::Never);
    }

    #[test]
    fn test_mixed_config_condition() {
        let config = MethodConfig::never()
            .with(OnComplete::NoOp, CallConfig::All)
            .with(OnComplete::OptIn, CallConfig::Create)
            .with(OnComplete::DeleteApplication, CallConfig::Call)
            .with(OnComplete::ClearState, CallConfig::Create);
        assert_eq!(
            config.approval_cond(),
            Condition::Expr(Expr::or(vec![
                on_completion_is(OnComplete::NoOp),
                Expr::and(vec![
                    on_completion_is(OnComplete::OptIn),
                    Expr::eq(Expr::application_id(), Expr::int(0)),
                ]),
                Expr::and(vec![
                    on_completion_is(OnComplete::DeleteApplication),
                    Expr::neq(Expr::application_id(), Expr::int(0)),
                ]),
            ]))
        );
        assert_eq!(
            config.clear_state_cond(),
            Condition::Expr(Expr::eq(Expr::application_id(), Expr::int(0)))
        );
    }

    #[test]
    fn test_equal_configs_on_different_actions_are_all_kept() {
        let config = MethodConfig::never()
            .with(OnComplete::NoOp, CallConfig::Call)
            .with(OnComplete::OptIn, CallConfig::Call);
        let Condition::Expr(Expr::Nary { args, .. }) = config.approval_cond() else {
            panic!("expected a disjunction");
        };
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_config_deserialize() {
        let config: MethodConfig =
            serde_json::from_str(r#"{"opt_in": "all", "no_op": "create"}"#).unwrap();
        assert_eq!(config.opt_in, CallConfig::All);
        assert_eq!(config.no_op, CallConfig::Create);
        assert_eq!(config.close_out, CallConfig::Never);

        // omitted fields fall back to the default config
        let config: MethodConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MethodConfig::default());

        assert!(serde_json::from_str::<MethodConfig>(r#"{"noop": "call"}"#).is_err());
        assert!(serde_json::from_str::<MethodConfig>(r#"{"no_op": "sometimes"}"#).is_err());
    }
}
