//! On-demand expansion of calls to helpers explicitly tagged inline.
//!
//! Only the narrowest shape is supported: a helper whose body is exactly
//! one return expression with no preceding statements. Everything else is
//! refused with an explicit error rather than risking a silently wrong
//! tree. Locals of the helper are renamed with a caller-supplied prefix so
//! the spliced expression can never collide with call-site names.

use crate::elaborator::closure::resolve_captures;
use crate::elaborator::constants::classify_constants;
use crate::elaborator::elaborator_errors::ElabError;
use crate::elaborator::extract::source_to_tree;
use crate::elaborator::func_def::FuncDef;
use crate::elaborator::optimizers::constant_folding::ConstantFolder;
use crate::elaborator::parsers::ast_nodes::{Expression, ExpressionKind, NodeKind};
use crate::elaborator::string_interning::{InternedString, StringTable};
use crate::return_inline_error;
use rustc_hash::{FxHashMap, FxHashSet};

// Expansion is bounded: helpers calling helpers is fine, unbounded
// recursion through the capture graph is not
pub const MAX_INLINE_DEPTH: usize = 32;

/// Expand a call to an inline-tagged helper into a standalone expression.
/// The argument expressions arrive already reduced by the caller's folder.
pub fn expand_call(
    helper: &FuncDef,
    prefix: &str,
    args: Vec<Expression>,
    string_table: &mut StringTable,
    depth: usize,
) -> Result<Expression, ElabError> {
    let tree = source_to_tree(helper, string_table)?;
    let location = tree.location;

    if depth > MAX_INLINE_DEPTH {
        return_inline_error!(
            format!(
                "Inline expansion of '{}' exceeded the depth limit of {}",
                helper.name, MAX_INLINE_DEPTH
            ),
            location
        )
    }

    if !helper.inline {
        return_inline_error!(
            format!("'{}' is not tagged for inlining", helper.name),
            location
        )
    }

    let (params, body) = match tree.kind {
        NodeKind::FunctionDef { params, body, .. } => (params, body),
        _ => return_inline_error!(
            format!("'{}' did not extract to a function definition", helper.name),
            location
        ),
    };

    // The only supported body shape: exactly one `return <expr>`
    let return_expression = match body.as_slice() {
        [statement] => match &statement.kind {
            NodeKind::Return(Some(expression)) => expression.to_owned(),
            _ => return_inline_error!(
                format!(
                    "'{}' cannot be inlined: its body must be a single return expression",
                    helper.name
                ),
                statement.location
            ),
        },
        _ => return_inline_error!(
            format!(
                "'{}' cannot be inlined: its body must be a single return expression with no other statements",
                helper.name
            ),
            location
        ),
    };

    if params.len() != args.len() {
        return_inline_error!(
            format!(
                "Call to '{}' passes {} arguments but the helper takes {}",
                helper.name,
                args.len(),
                params.len()
            ),
            location
        )
    }

    // Fold the helper's own closure constants first, while its capture
    // names are still distinguishable from anything at the call site.
    // Nested calls to inline-tagged helpers expand here with the extended
    // prefix.
    let helper_bindings = resolve_captures(helper, string_table)?;
    let helper_constants = classify_constants(&helper_bindings);
    let mut folder = ConstantFolder::new_nested(
        &helper_constants,
        &helper_bindings,
        string_table,
        prefix.to_owned(),
        depth,
    );
    let folded = folder.fold_expression(return_expression)?;

    // Parameters become the caller's argument expressions; every other
    // local reference is renamed to `prefix__name`
    let mut substitutions: FxHashMap<InternedString, Expression> = FxHashMap::default();
    for (param, arg) in params.iter().zip(args) {
        substitutions.insert(*param, arg);
    }

    let mut locals: FxHashSet<InternedString> = FxHashSet::default();
    for name in &helper.local_vars {
        let id = string_table.intern(name);
        if !substitutions.contains_key(&id) {
            locals.insert(id);
        }
    }

    Ok(rewrite_names(
        folded,
        &substitutions,
        &locals,
        prefix,
        string_table,
    ))
}

fn rewrite_names(
    expression: Expression,
    substitutions: &FxHashMap<InternedString, Expression>,
    locals: &FxHashSet<InternedString>,
    prefix: &str,
    string_table: &mut StringTable,
) -> Expression {
    let Expression { kind, location } = expression;

    let kind = match kind {
        ExpressionKind::Reference(name) => {
            if let Some(replacement) = substitutions.get(&name) {
                return replacement.to_owned();
            }
            if locals.contains(&name) {
                let renamed = format!("{}__{}", prefix, string_table.resolve(name));
                ExpressionKind::Reference(string_table.get_or_intern(renamed))
            } else {
                ExpressionKind::Reference(name)
            }
        }

        ExpressionKind::Literal(value) => ExpressionKind::Literal(value),

        ExpressionKind::Binary { op, lhs, rhs } => ExpressionKind::Binary {
            op,
            lhs: Box::new(rewrite_names(*lhs, substitutions, locals, prefix, string_table)),
            rhs: Box::new(rewrite_names(*rhs, substitutions, locals, prefix, string_table)),
        },

        ExpressionKind::Boolean { op, operands } => ExpressionKind::Boolean {
            op,
            operands: operands
                .into_iter()
                .map(|operand| rewrite_names(operand, substitutions, locals, prefix, string_table))
                .collect(),
        },

        ExpressionKind::Unary { op, operand } => ExpressionKind::Unary {
            op,
            operand: Box::new(rewrite_names(
                *operand,
                substitutions,
                locals,
                prefix,
                string_table,
            )),
        },

        ExpressionKind::Comparison { left, legs } => ExpressionKind::Comparison {
            left: Box::new(rewrite_names(*left, substitutions, locals, prefix, string_table)),
            legs: legs
                .into_iter()
                .map(|(op, comparator)| {
                    (
                        op,
                        rewrite_names(comparator, substitutions, locals, prefix, string_table),
                    )
                })
                .collect(),
        },

        ExpressionKind::Call { callee, args } => ExpressionKind::Call {
            callee: Box::new(rewrite_names(
                *callee,
                substitutions,
                locals,
                prefix,
                string_table,
            )),
            args: args
                .into_iter()
                .map(|arg| rewrite_names(arg, substitutions, locals, prefix, string_table))
                .collect(),
        },
    };

    Expression { kind, location }
}
