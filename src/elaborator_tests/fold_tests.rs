#[cfg(test)]
mod tests {
    use crate::{
        reduce_all, AstNode, BoundedInt, CaptureCell, Elaborator, Expression, ExpressionKind,
        FuncDef, LiteralValue, NodeKind, ReducedFunction, StringTable,
    };

    fn reduce(func: &FuncDef) -> ReducedFunction {
        Elaborator::new()
            .reduce(func)
            .expect("reduction should succeed")
    }

    fn function_body(tree: &AstNode) -> &[AstNode] {
        match &tree.kind {
            NodeKind::FunctionDef { body, .. } => body,
            other => panic!("expected a function definition, got {:?}", other),
        }
    }

    fn assign_parts<'t>(
        node: &'t AstNode,
        table: &StringTable,
    ) -> (String, &'t Expression) {
        match &node.kind {
            NodeKind::Assign { target, value } => (table.resolve(*target).to_owned(), value),
            other => panic!("expected an assignment, got {:?}", other),
        }
    }

    // Scenario: closure constant WIDTH = 4, expression WIDTH * 2
    #[test]
    fn test_constant_multiplication_folds() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = WIDTH * 2\n")
            .with_constant("WIDTH", LiteralValue::Int(4));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (target, value) = assign_parts(&body[0], &reduced.string_table);

        assert_eq!(target, "a");
        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(8)));
    }

    // Scenario: FLAG = true, `if FLAG: a = 1 else: a = 2` reduces to exactly `a = 1`
    #[test]
    fn test_decided_conditional_leaves_only_the_taken_branch() {
        let source = "\
def logic():
    if FLAG:
        a = 1
    else:
        a = 2
";
        let func =
            FuncDef::from_source("logic", source).with_constant("FLAG", LiteralValue::Bool(true));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);

        assert_eq!(body.len(), 1);
        let (target, value) = assign_parts(&body[0], &reduced.string_table);
        assert_eq!(target, "a");
        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(1)));
    }

    // Scenario: chained comparison 1 < 2 < 0 folds to false
    #[test]
    fn test_literal_comparison_chain_folds() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = 1 < 2 < 0\n");

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);

        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Bool(false)));
    }

    // Scenario: `x or True` folds to true whatever x is
    #[test]
    fn test_or_short_circuits_past_an_unresolvable_name() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = x or True\n")
            .with_capture("x", CaptureCell::Opaque("Signal".to_string()));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);

        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Bool(true)));
    }

    #[test]
    fn test_and_short_circuits_on_a_literal_false() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = False and x\n");

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);

        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Bool(false)));
    }

    #[test]
    fn test_neutral_boolean_operands_are_dropped() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = x and True and y\n");

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);

        match &value.kind {
            ExpressionKind::Boolean { operands, .. } => assert_eq!(operands.len(), 2),
            other => panic!("expected a pruned boolean expression, got {:?}", other),
        }
    }

    #[test]
    fn test_single_surviving_operand_replaces_the_boolean_node() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = x and True\n");

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);

        match &value.kind {
            ExpressionKind::Reference(name) => {
                assert!(name.eq_str(&reduced.string_table, "x"));
            }
            other => panic!("expected the surviving operand, got {:?}", other),
        }
    }

    #[test]
    fn test_bounded_vector_arithmetic_folds_to_int() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = WIDTH * 2\n")
            .with_constant(
                "WIDTH",
                LiteralValue::Bounded(BoundedInt {
                    value: 4,
                    min: 0,
                    max: 15,
                }),
            );

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);

        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(8)));
    }

    #[test]
    fn test_floor_division_and_modulus_semantics() {
        let source = "\
def logic():
    a = 7 // 2
    b = -7 // 2
    c = 7 % 3
    d = 7 % -3
";
        let func = FuncDef::from_source("logic", source);
        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);

        let expected = [3, -4, 1, -2];
        for (statement, want) in body.iter().zip(expected) {
            let (_, value) = assign_parts(statement, &reduced.string_table);
            assert_eq!(
                value.kind,
                ExpressionKind::Literal(LiteralValue::Int(want)),
                "statement folded to the wrong value"
            );
        }
    }

    #[test]
    fn test_division_by_zero_is_left_unfolded() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = 1 // 0\n");

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);

        assert!(matches!(value.kind, ExpressionKind::Binary { .. }));
    }

    #[test]
    fn test_overflowing_shift_is_left_unfolded() {
        let source = "\
def logic():
    a = 1 << 63
    b = 1 << 3
";
        let func = FuncDef::from_source("logic", source);
        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);

        let (_, a) = assign_parts(&body[0], &reduced.string_table);
        assert!(matches!(a.kind, ExpressionKind::Binary { .. }));

        let (_, b) = assign_parts(&body[1], &reduced.string_table);
        assert_eq!(b.kind, ExpressionKind::Literal(LiteralValue::Int(8)));
    }

    #[test]
    fn test_unary_operators_fold() {
        let source = "\
def logic():
    a = not FLAG
    b = -WIDTH
    c = ~0
";
        let func = FuncDef::from_source("logic", source)
            .with_constant("FLAG", LiteralValue::Bool(true))
            .with_constant("WIDTH", LiteralValue::Int(5));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);

        let (_, a) = assign_parts(&body[0], &reduced.string_table);
        assert_eq!(a.kind, ExpressionKind::Literal(LiteralValue::Bool(false)));

        let (_, b) = assign_parts(&body[1], &reduced.string_table);
        assert_eq!(b.kind, ExpressionKind::Literal(LiteralValue::Int(-5)));

        let (_, c) = assign_parts(&body[2], &reduced.string_table);
        assert_eq!(c.kind, ExpressionKind::Literal(LiteralValue::Int(-1)));
    }

    #[test]
    fn test_partial_folding_keeps_the_outer_node() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = x + 2 * 3\n");

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);

        match &value.kind {
            ExpressionKind::Binary { lhs, rhs, .. } => {
                assert!(matches!(lhs.kind, ExpressionKind::Reference(_)));
                assert_eq!(rhs.kind, ExpressionKind::Literal(LiteralValue::Int(6)));
            }
            other => panic!("expected a partially folded binary, got {:?}", other),
        }
    }

    #[test]
    fn test_incomparable_kinds_leave_the_chain_unfolded() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = None < 1\n");

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);

        assert!(matches!(value.kind, ExpressionKind::Comparison { .. }));
    }

    #[test]
    fn test_string_equality_folds() {
        let mut elaborator = Elaborator::new();
        let greeting = elaborator.string_table_mut().intern("ready");
        let func = FuncDef::from_source("logic", "def logic():\n    a = MODE == 'ready'\n")
            .with_constant("MODE", LiteralValue::Str(greeting));

        let tree = elaborator.source_to_tree(&func).expect("extraction");
        let bindings = elaborator.resolve_captures(&func).expect("captures");
        let constants = elaborator.classify_constants(&bindings);
        let tree = elaborator
            .fold_constants(tree, &constants, &bindings)
            .expect("folding");

        let body = function_body(&tree);
        let (_, value) = assign_parts(&body[0], elaborator.string_table());
        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Bool(true)));
    }

    #[test]
    fn test_truthy_integer_condition_takes_the_then_branch() {
        let source = "\
def logic():
    if WIDTH:
        a = 1
    else:
        a = 2
";
        let func =
            FuncDef::from_source("logic", source).with_constant("WIDTH", LiteralValue::Int(4));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);

        assert_eq!(body.len(), 1);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);
        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(1)));
    }

    #[test]
    fn test_decided_conditional_with_empty_branch_vanishes() {
        let source = "\
def logic():
    if FLAG:
        a = 1
    b = 2
";
        let func =
            FuncDef::from_source("logic", source).with_constant("FLAG", LiteralValue::Bool(false));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);

        assert_eq!(body.len(), 1);
        let (target, _) = assign_parts(&body[0], &reduced.string_table);
        assert_eq!(target, "b");
    }

    #[test]
    fn test_nested_conditionals_resolve_in_one_pass() {
        let source = "\
def logic():
    if OUTER:
        if INNER:
            x = 1
        else:
            x = 2
    else:
        x = 3
";
        let func = FuncDef::from_source("logic", source)
            .with_constant("OUTER", LiteralValue::Bool(true))
            .with_constant("INNER", LiteralValue::Bool(false));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);

        assert_eq!(body.len(), 1);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);
        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(2)));
    }

    #[test]
    fn test_undecided_conditionals_survive_both_passes() {
        let source = "\
def logic():
    if enable:
        a = WIDTH * 2
";
        let func =
            FuncDef::from_source("logic", source).with_constant("WIDTH", LiteralValue::Int(4));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);

        match &body[0].kind {
            NodeKind::If {
                condition,
                then_body,
                ..
            } => {
                assert!(matches!(condition.kind, ExpressionKind::Reference(_)));
                let (_, value) = assign_parts(&then_body[0], &reduced.string_table);
                assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(8)));
            }
            other => panic!("expected the conditional to survive, got {:?}", other),
        }
    }

    #[test]
    fn test_folded_literal_inherits_the_replaced_position() {
        let func = FuncDef::from_source("logic", "def logic():\n    a = WIDTH * 2\n")
            .with_constant("WIDTH", LiteralValue::Int(4));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let (_, value) = assign_parts(&body[0], &reduced.string_table);

        assert!(value.is_literal());
        assert_eq!(value.location.start_pos.line_number, 2);
        assert!(value.location.start_pos.char_column > 0);
    }

    #[test]
    fn test_reduction_is_idempotent() {
        let source = "\
def logic():
    if FLAG:
        a = WIDTH * 2
    else:
        a = x + 1
";
        let func = FuncDef::from_source("logic", source)
            .with_constant("FLAG", LiteralValue::Bool(false))
            .with_constant("WIDTH", LiteralValue::Int(4));

        let mut elaborator = Elaborator::new();
        let tree = elaborator.source_to_tree(&func).expect("extraction");
        let bindings = elaborator.resolve_captures(&func).expect("captures");
        let constants = elaborator.classify_constants(&bindings);

        let tree = elaborator
            .fold_constants(tree, &constants, &bindings)
            .expect("first fold");
        let tree = elaborator.eliminate_branches(tree);

        let again = elaborator
            .fold_constants(tree.to_owned(), &constants, &bindings)
            .expect("second fold");
        let again = elaborator.eliminate_branches(again);

        assert_eq!(tree, again);
    }

    #[test]
    fn test_reduce_all_runs_each_function_independently() {
        let funcs = vec![
            FuncDef::from_source("first", "def first():\n    a = WIDTH * 2\n")
                .with_constant("WIDTH", LiteralValue::Int(4)),
            FuncDef::from_source("second", "def second():\n    a = WIDTH + 1\n")
                .with_constant("WIDTH", LiteralValue::Int(10)),
        ];

        let results = reduce_all(&funcs);
        assert_eq!(results.len(), 2);

        let first = results[0].as_ref().expect("first should reduce");
        let (_, value) = assign_parts(&function_body(&first.tree)[0], &first.string_table);
        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(8)));

        let second = results[1].as_ref().expect("second should reduce");
        let (_, value) = assign_parts(&function_body(&second.tree)[0], &second.string_table);
        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(11)));
    }
}
