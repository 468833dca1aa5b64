// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use crate::call_config::Condition;
use crate::error::RouterError;
use crate::handler::{wrap_handler, Handler};
use teal_ir::{AbiReturnSubroutine, Expr};

/// One guarded branch of a program's top-level dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct CondNode {
    pub condition: Expr,
    pub branch: Expr,
}

impl CondNode {
    pub fn new(condition: Expr, branch: Expr) -> Self {
        Self { condition, branch }
    }

    /// First matching node wins; no match fails the program
    pub fn fold(nodes: impl IntoIterator<Item = CondNode>) -> Expr {
        Expr::cond(
            nodes
                .into_iter()
                .map(|node| (node.condition, node.branch))
                .collect(),
        )
    }

    /// Node dispatching `method` when application argument 0 is its selector,
    /// or `None` when the method can never run here
    pub fn for_method(
        signature: &str,
        condition: Condition,
        method: &AbiReturnSubroutine,
    ) -> Result<Option<CondNode>, RouterError> {
        let selected = Expr::eq(Expr::app_arg(0), Expr::method_signature(signature));
        let branch = match condition {
            Condition::Never => return Ok(None),
            Condition::Always => wrap_handler(true, Handler::AbiMethod(method))?,
            Condition::Expr(cond) => Expr::seq(vec![
                Expr::assert(cond),
                wrap_handler(true, Handler::AbiMethod(method))?,
            ]),
        };
        Ok(Some(CondNode::new(selected, branch)))
    }
}

/// Ordered dispatch nodes of one program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AstBuilder {
    conditions_n_branches: Vec<CondNode>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: CondNode) {
        self.conditions_n_branches.push(node);
    }

    pub fn nodes(&self) -> &[CondNode] {
        &self.conditions_n_branches
    }

    pub fn len(&self) -> usize {
        self.conditions_n_branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions_n_branches.is_empty()
    }

    pub fn add_method_to_ast(
        &mut self,
        signature: &str,
        condition: Condition,
        method: &AbiReturnSubroutine,
    ) -> Result<(), RouterError> {
        if let Some(node) = CondNode::for_method(signature, condition, method)? {
            self.push(node);
        }
        Ok(())
    }

    /// Dispatch over all nodes in insertion order. With no nodes the result
    /// rejects every transaction.
    pub fn program_construction(&self) -> Expr {
        CondNode::fold(self.conditions_n_branches.iter().cloned())
    }
}

impl Extend<CondNode> for AstBuilder {
    fn extend<I: IntoIterator<Item = CondNode>>(&mut self, iter: I) {
        self.conditions_n_branches.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teal_ir::abi::TypeSpec;
    use teal_ir::Param;

    fn ping() -> AbiReturnSubroutine {
        AbiReturnSubroutine::new("ping", vec![], None, Expr::Return(None))
    }

    #[test]
    fn test_condition_gating() {
        let ping = ping();
        let mut builder = AstBuilder::new();
        builder
            .add_method_to_ast("ping()void", Condition::Never, &ping)
            .unwrap();
        assert!(builder.is_empty());

        builder
            .add_method_to_ast("ping()void", Condition::Always, &ping)
            .unwrap();
        let gate = Expr::neq(Expr::application_id(), Expr::int(0));
        builder
            .add_method_to_ast("ping()void", Condition::Expr(gate.clone()), &ping)
            .unwrap();
        assert_eq!(builder.len(), 2);

        let selected = Expr::eq(Expr::app_arg(0), Expr::method_signature("ping()void"));
        let wrapped = Expr::seq(vec![ping.invoke(&[]), Expr::approve()]);
        assert_eq!(builder.nodes()[0], CondNode::new(selected.clone(), wrapped.clone()));
        assert_eq!(
            builder.nodes()[1],
            CondNode::new(selected, Expr::seq(vec![Expr::assert(gate), wrapped]))
        );
    }

    #[test]
    fn test_program_construction() {
        assert_eq!(AstBuilder::new().program_construction(), Expr::cond(vec![]));

        let mut builder = AstBuilder::new();
        builder.push(CondNode::new(Expr::int(1), Expr::approve()));
        builder.push(CondNode::new(Expr::int(0), Expr::reject()));
        assert_eq!(
            builder.program_construction(),
            Expr::cond(vec![
                (Expr::int(1), Expr::approve()),
                (Expr::int(0), Expr::reject())
            ])
        );
        // building does not consume the nodes
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_unroutable_method_is_rejected() {
        let mixed = AbiReturnSubroutine::new(
            "mixed",
            vec![
                Param::abi("a", TypeSpec::Uint(64)),
                Param::stack("b", teal_ir::TealType::Bytes),
            ],
            None,
            Expr::Return(None),
        );
        let mut builder = AstBuilder::new();
        assert!(matches!(
            builder.add_method_to_ast("mixed(uint64)void", Condition::Always, &mixed),
            Err(RouterError::NotRoutable { .. })
        ));
        assert!(builder.is_empty());
    }
}
