// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Bare application calls: no application arguments, dispatch on the
//! on-completion action and on whether the application is being created.

use crate::ast_builder::CondNode;
use crate::error::RouterError;
use crate::handler::{wrap_handler, Handler};
use teal_ir::{Expr, OnComplete};

/// Handlers for one on-completion action
#[derive(Debug, Clone, Copy, Default)]
pub struct OnCompleteAction<'h> {
    pub on_create: Option<Handler<'h>>,
    pub on_call: Option<Handler<'h>>,
}

impl<'h> OnCompleteAction<'h> {
    pub fn never() -> Self {
        Self::default()
    }

    pub fn create_only(handler: impl Into<Handler<'h>>) -> Self {
        Self {
            on_create: Some(handler.into()),
            on_call: None,
        }
    }

    pub fn call_only(handler: impl Into<Handler<'h>>) -> Self {
        Self {
            on_create: None,
            on_call: Some(handler.into()),
        }
    }

    pub fn always(handler: impl Into<Handler<'h>>) -> Self {
        let handler = handler.into();
        Self {
            on_create: Some(handler),
            on_call: Some(handler),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.on_create.is_none() && self.on_call.is_none()
    }

    /// On-call node then on-create node, each under `guard && <app id check>`
    fn nodes(&self, guard: Option<Expr>) -> Result<Vec<CondNode>, RouterError> {
        let with_guard = |app_id: Expr| match &guard {
            Some(g) => Expr::and(vec![g.clone(), app_id]),
            None => app_id,
        };
        let mut nodes = Vec::new();
        if let Some(handler) = self.on_call {
            nodes.push(CondNode::new(
                with_guard(Expr::neq(Expr::application_id(), Expr::int(0))),
                wrap_handler(false, handler)?,
            ));
        }
        if let Some(handler) = self.on_create {
            nodes.push(CondNode::new(
                with_guard(Expr::eq(Expr::application_id(), Expr::int(0))),
                wrap_handler(false, handler)?,
            ));
        }
        Ok(nodes)
    }
}

/// Bare-call handlers for every on-completion action
#[derive(Debug, Clone, Copy, Default)]
pub struct BareCallActions<'h> {
    pub no_op: OnCompleteAction<'h>,
    pub opt_in: OnCompleteAction<'h>,
    pub close_out: OnCompleteAction<'h>,
    pub clear_state: OnCompleteAction<'h>,
    pub update_application: OnCompleteAction<'h>,
    pub delete_application: OnCompleteAction<'h>,
}

impl<'h> BareCallActions<'h> {
    pub fn is_empty(&self) -> bool {
        self.approval_actions().iter().all(|(_, a)| a.is_empty()) && self.clear_state.is_empty()
    }

    fn approval_actions(&self) -> [(OnComplete, &OnCompleteAction<'h>); 5] {
        [
            (OnComplete::NoOp, &self.no_op),
            (OnComplete::OptIn, &self.opt_in),
            (OnComplete::CloseOut, &self.close_out),
            (OnComplete::UpdateApplication, &self.update_application),
            (OnComplete::DeleteApplication, &self.delete_application),
        ]
    }

    /// Dispatch over every action except clear state, or `None` if none of
    /// them has a handler
    pub fn approval_construction(&self) -> Result<Option<Expr>, RouterError> {
        let actions = self.approval_actions();
        if actions.iter().all(|(_, a)| a.is_empty()) {
            return Ok(None);
        }
        let mut nodes = Vec::new();
        for (action, handlers) in actions {
            let is_action = Expr::eq(Expr::on_completion(), Expr::on_complete(action));
            nodes.extend(handlers.nodes(Some(is_action))?);
        }
        Ok(Some(CondNode::fold(nodes)))
    }

    pub fn clear_state_construction(&self) -> Result<Option<Expr>, RouterError> {
        if self.clear_state.is_empty() {
            return Ok(None);
        }
        Ok(Some(CondNode::fold(self.clear_state.nodes(None)?)))
    }
}
