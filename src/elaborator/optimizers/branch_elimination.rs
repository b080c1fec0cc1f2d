//! Elimination of conditionals whose test folded to a literal.
//!
//! Runs after the constant folder, which has already collapsed every
//! statically decidable test bottom-up, so a single pass suffices here.
//! Children are visited before their parent: innermost conditionals are
//! resolved first, then the surviving statements splice into the enclosing
//! block. A decided conditional whose chosen branch is empty simply
//! vanishes.

use crate::elaborator::parsers::ast_nodes::{AstNode, ExpressionKind, NodeKind};

/// Remove every conditional whose test is a literal from a reduced tree
pub fn eliminate_branches(tree: AstNode) -> AstNode {
    let AstNode { kind, location } = tree;

    let kind = match kind {
        NodeKind::FunctionDef { name, params, body } => NodeKind::FunctionDef {
            name,
            params,
            body: eliminate_in_block(body),
        },
        other => other,
    };

    AstNode { kind, location }
}

fn eliminate_in_block(body: Vec<AstNode>) -> Vec<AstNode> {
    let mut surviving = Vec::with_capacity(body.len());

    for statement in body {
        match statement.kind {
            NodeKind::If {
                condition,
                then_body,
                else_body,
            } => {
                let then_body = eliminate_in_block(then_body);
                let else_body = eliminate_in_block(else_body);

                match &condition.kind {
                    ExpressionKind::Literal(value) => {
                        // The chosen branch replaces the conditional in place
                        let chosen = if value.truthy() { then_body } else { else_body };
                        surviving.extend(chosen);
                    }
                    _ => surviving.push(AstNode {
                        kind: NodeKind::If {
                            condition,
                            then_body,
                            else_body,
                        },
                        location: statement.location,
                    }),
                }
            }

            kind => surviving.push(AstNode {
                kind,
                location: statement.location,
            }),
        }
    }

    surviving
}
