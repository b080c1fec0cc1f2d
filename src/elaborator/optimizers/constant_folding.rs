//! Constant propagation and folding over one captured function body.
//!
//! The folder walks the tree post-order: children are fully reduced before
//! their parent is examined, so a freshly folded sibling can make a
//! previously unfoldable parent foldable. Name substitution is re-applied
//! at every visit for the same reason.
//!
//! Folding is fail-open: an evaluation that cannot be performed (kind
//! mismatch, division by zero, overflow) leaves the node exactly as
//! received. A node is either fully replaced by a literal or untouched,
//! never half-evaluated. Conditionals are never collapsed here; only their
//! test is folded, and the branch eliminator runs as a separate pass.

use crate::elaborator::closure::ClosureBindings;
use crate::elaborator::constants::ConstantSet;
use crate::elaborator::elaborator_errors::ElabError;
use crate::elaborator::func_def::CaptureCell;
use crate::elaborator::optimizers::inline::expand_call;
use crate::elaborator::parsers::ast_nodes::{
    AstNode, BinaryOperator, BooleanOperator, CompareOperator, Expression, ExpressionKind,
    LiteralValue, NodeKind, UnaryOperator,
};
use crate::elaborator::parsers::tokens::TextLocation;
use crate::elaborator::string_interning::StringTable;
use crate::fold_log;

pub struct ConstantFolder<'a> {
    constants: &'a ConstantSet,
    captures: &'a ClosureBindings,
    string_table: &'a mut StringTable,

    // Inline expansion context: the dunder-joined chain of callee names
    // above this folder, and how deep the expansion already is
    inline_prefix: String,
    inline_depth: usize,
}

impl<'a> ConstantFolder<'a> {
    pub fn new(
        constants: &'a ConstantSet,
        captures: &'a ClosureBindings,
        string_table: &'a mut StringTable,
    ) -> Self {
        Self {
            constants,
            captures,
            string_table,
            inline_prefix: String::new(),
            inline_depth: 0,
        }
    }

    pub fn new_nested(
        constants: &'a ConstantSet,
        captures: &'a ClosureBindings,
        string_table: &'a mut StringTable,
        inline_prefix: String,
        inline_depth: usize,
    ) -> Self {
        Self {
            constants,
            captures,
            string_table,
            inline_prefix,
            inline_depth,
        }
    }

    /// Reduce a whole function tree in one bottom-up pass
    pub fn fold_function(&mut self, tree: AstNode) -> Result<AstNode, ElabError> {
        self.fold_statement(tree)
    }

    fn fold_block(&mut self, body: Vec<AstNode>) -> Result<Vec<AstNode>, ElabError> {
        body.into_iter()
            .map(|statement| self.fold_statement(statement))
            .collect()
    }

    fn fold_statement(&mut self, node: AstNode) -> Result<AstNode, ElabError> {
        let AstNode { kind, location } = node;

        let kind = match kind {
            NodeKind::FunctionDef { name, params, body } => NodeKind::FunctionDef {
                name,
                params,
                body: self.fold_block(body)?,
            },

            NodeKind::Assign { target, value } => NodeKind::Assign {
                target,
                value: self.fold_expression(value)?,
            },

            // Only the condition is folded. Collapsing the conditional is
            // the branch eliminator's job, so nested and sequential
            // conditionals are all handled uniformly after this pass.
            NodeKind::If {
                condition,
                then_body,
                else_body,
            } => NodeKind::If {
                condition: self.fold_expression(condition)?,
                then_body: self.fold_block(then_body)?,
                else_body: self.fold_block(else_body)?,
            },

            NodeKind::Return(value) => NodeKind::Return(match value {
                Some(expression) => Some(self.fold_expression(expression)?),
                None => None,
            }),

            NodeKind::ExpressionStatement(expression) => {
                NodeKind::ExpressionStatement(self.fold_expression(expression)?)
            }

            NodeKind::Pass => NodeKind::Pass,
        };

        Ok(AstNode { kind, location })
    }

    // The rewrite driver. Takes the expression by value and returns the
    // replacement, so there is no shared-node aliasing to worry about.
    // Every synthesized literal inherits the location of the node it
    // replaces.
    pub fn fold_expression(&mut self, expression: Expression) -> Result<Expression, ElabError> {
        let Expression { kind, location } = expression;

        let kind = match kind {
            ExpressionKind::Literal(value) => ExpressionKind::Literal(value),

            ExpressionKind::Reference(name) => match self.constants.get(&name) {
                Some(value) => {
                    fold_log!(
                        "substituting constant {} = {:?}",
                        self.string_table.resolve(name),
                        value
                    );
                    ExpressionKind::Literal(value.to_owned())
                }
                None => ExpressionKind::Reference(name),
            },

            ExpressionKind::Binary { op, lhs, rhs } => {
                let lhs = self.fold_expression(*lhs)?;
                let rhs = self.fold_expression(*rhs)?;

                match (lhs.as_literal(), rhs.as_literal()) {
                    (Some(a), Some(b)) => match eval_binary(op, a, b) {
                        Some(value) => ExpressionKind::Literal(value),
                        None => ExpressionKind::Binary {
                            op,
                            lhs: Box::new(lhs),
                            rhs: Box::new(rhs),
                        },
                    },
                    _ => ExpressionKind::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                }
            }

            ExpressionKind::Boolean { op, operands } => {
                return self.fold_boolean(op, operands, location);
            }

            ExpressionKind::Unary { op, operand } => {
                let operand = self.fold_expression(*operand)?;
                match operand.as_literal().and_then(|value| eval_unary(op, value)) {
                    Some(value) => ExpressionKind::Literal(value),
                    None => ExpressionKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                }
            }

            ExpressionKind::Comparison { left, legs } => {
                let left = self.fold_expression(*left)?;
                let mut folded_legs = Vec::with_capacity(legs.len());
                for (op, comparator) in legs {
                    folded_legs.push((op, self.fold_expression(comparator)?));
                }

                // Folding requires every leg literal; a partial chain is
                // never folded, and an evaluation failure anywhere leaves
                // the whole node as it is
                match self.eval_comparison(&left, &folded_legs) {
                    Some(result) => ExpressionKind::Literal(LiteralValue::Bool(result)),
                    None => ExpressionKind::Comparison {
                        left: Box::new(left),
                        legs: folded_legs,
                    },
                }
            }

            ExpressionKind::Call { callee, args } => {
                let mut folded_args = Vec::with_capacity(args.len());
                for arg in args {
                    folded_args.push(self.fold_expression(arg)?);
                }

                // A call to a capture tagged inline is replaced by the
                // helper's renamed return expression
                if let ExpressionKind::Reference(name) = &callee.kind {
                    let captures = self.captures;
                    if let Some(CaptureCell::Function(helper)) = captures.get(name) {
                        if helper.inline {
                            let callee_name = self.string_table.resolve(*name).to_owned();
                            let prefix = if self.inline_prefix.is_empty() {
                                callee_name
                            } else {
                                format!("{}__{}", self.inline_prefix, callee_name)
                            };

                            fold_log!("inlining call to {}", prefix);
                            let mut expanded = expand_call(
                                helper,
                                &prefix,
                                folded_args,
                                self.string_table,
                                self.inline_depth + 1,
                            )?;
                            expanded.location = location;

                            // The substituted arguments can make the spliced
                            // expression foldable, so it gets one more pass
                            // in the caller's context
                            return self.fold_expression(expanded);
                        }
                    }
                }

                ExpressionKind::Call {
                    callee,
                    args: folded_args,
                }
            }
        };

        Ok(Expression { kind, location })
    }

    // Short-circuit and/or folding. A decisive literal operand folds the
    // whole node and discards the rest, which is sound because only
    // side-effect-free constant-classified leaves are ever folded. Neutral
    // literal operands are dropped from the list.
    fn fold_boolean(
        &mut self,
        op: BooleanOperator,
        operands: Vec<Expression>,
        location: TextLocation,
    ) -> Result<Expression, ElabError> {
        let mut remaining: Vec<Expression> = Vec::with_capacity(operands.len());

        for operand in operands {
            let folded = self.fold_expression(operand)?;
            match folded.as_literal() {
                Some(value) => match (op, value.truthy()) {
                    (BooleanOperator::And, false) => {
                        return Ok(Expression::bool(false, location));
                    }
                    (BooleanOperator::Or, true) => {
                        return Ok(Expression::bool(true, location));
                    }
                    // Neutral operand: dropped
                    _ => {}
                },
                None => remaining.push(folded),
            }
        }

        match remaining.len() {
            // Every operand was a neutral literal
            0 => Ok(Expression::bool(
                matches!(op, BooleanOperator::And),
                location,
            )),
            1 => Ok(remaining.remove(0)),
            _ => Ok(Expression::boolean(op, remaining, location)),
        }
    }

    fn eval_comparison(
        &self,
        left: &Expression,
        legs: &[(CompareOperator, Expression)],
    ) -> Option<bool> {
        let mut previous = left.as_literal()?;
        let mut leg_values = Vec::with_capacity(legs.len());
        for (op, comparator) in legs {
            leg_values.push((*op, comparator.as_literal()?));
        }

        for (op, value) in leg_values {
            if self.compare_values(previous, op, value)? {
                previous = value;
            } else {
                return Some(false);
            }
        }
        Some(true)
    }

    fn compare_values(
        &self,
        a: &LiteralValue,
        op: CompareOperator,
        b: &LiteralValue,
    ) -> Option<bool> {
        use std::cmp::Ordering;

        let ordering = match (a, b) {
            (LiteralValue::Str(x), LiteralValue::Str(y)) => self
                .string_table
                .resolve(*x)
                .cmp(self.string_table.resolve(*y)),

            (LiteralValue::Bool(x), LiteralValue::Bool(y)) => {
                // Booleans only support equality comparisons
                return match op {
                    CompareOperator::Equal => Some(x == y),
                    CompareOperator::NotEqual => Some(x != y),
                    _ => None,
                };
            }

            (LiteralValue::None, LiteralValue::None) => {
                return match op {
                    CompareOperator::Equal => Some(true),
                    CompareOperator::NotEqual => Some(false),
                    _ => None,
                };
            }

            // Int and Bounded interoperate numerically; every other kind
            // pairing is an evaluation failure, not an error
            _ => match (a.as_int(), b.as_int()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => return None,
            },
        };

        Some(match op {
            CompareOperator::Equal => ordering == Ordering::Equal,
            CompareOperator::NotEqual => ordering != Ordering::Equal,
            CompareOperator::LessThan => ordering == Ordering::Less,
            CompareOperator::LessThanOrEqual => ordering != Ordering::Greater,
            CompareOperator::GreaterThan => ordering == Ordering::Greater,
            CompareOperator::GreaterThanOrEqual => ordering != Ordering::Less,
        })
    }
}

/// Evaluate a binary operator over two literals under the target integer
/// semantics. Returns None when the operation cannot be evaluated, which
/// leaves the node unfolded.
pub fn eval_binary(op: BinaryOperator, a: &LiteralValue, b: &LiteralValue) -> Option<LiteralValue> {
    // Arithmetic is integer-only. Bounded vectors participate through
    // their value; the result is a plain Int since an expression result
    // has no inherent hardware width.
    let x = a.as_int()?;
    let y = b.as_int()?;

    let value = match op {
        BinaryOperator::Add => x.checked_add(y)?,
        BinaryOperator::Subtract => x.checked_sub(y)?,
        BinaryOperator::Multiply => x.checked_mul(y)?,
        BinaryOperator::FloorDivide => floor_div(x, y)?,
        BinaryOperator::Modulus => floor_mod(x, y)?,
        BinaryOperator::ShiftLeft => {
            // checked_shl only validates the shift amount; bits lost off
            // the top are an overflow like any other
            let shift = u32::try_from(y).ok()?;
            let shifted = x.checked_shl(shift)?;
            if shifted >> shift != x {
                return None;
            }
            shifted
        }
        BinaryOperator::ShiftRight => x.checked_shr(u32::try_from(y).ok()?)?,
        BinaryOperator::BitwiseAnd => x & y,
        BinaryOperator::BitwiseOr => x | y,
        BinaryOperator::BitwiseXor => x ^ y,
    };

    Some(LiteralValue::Int(value))
}

pub fn eval_unary(op: UnaryOperator, value: &LiteralValue) -> Option<LiteralValue> {
    match op {
        UnaryOperator::Not => Some(LiteralValue::Bool(!value.truthy())),
        UnaryOperator::Negate => value.as_int()?.checked_neg().map(LiteralValue::Int),
        UnaryOperator::Invert => Some(LiteralValue::Int(!value.as_int()?)),
    }
}

// Division and modulus round toward negative infinity, matching the
// source language the bodies are written in
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && (remainder < 0) != (b < 0) {
        Some(remainder + b)
    } else {
        Some(remainder)
    }
}
