#[cfg(test)]
mod tests {
    use crate::{
        AstNode, CaptureCell, Elaborator, ErrorType, Expression, ExpressionKind, FuncDef,
        LiteralValue, NodeKind, ReducedFunction, StringTable,
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

    fn assign_value<'t>(node: &'t AstNode) -> &'t Expression {
        match &node.kind {
            NodeKind::Assign { value, .. } => value,
            other => panic!("expected an assignment, got {:?}", other),
        }
    }

    fn resolves_to(expression: &Expression, table: &StringTable, name: &str) -> bool {
        match &expression.kind {
            ExpressionKind::Reference(id) => id.eq_str(table, name),
            _ => false,
        }
    }

    // Scenario: `def double(n): return n * 2` tagged inline, called with a
    // closure constant, folds all the way down to a literal
    #[test]
    fn test_inline_call_with_constant_argument_folds_to_a_literal() {
        let double = FuncDef::from_source("double", "def double(n):\n    return n * 2\n")
            .with_locals(&["n"])
            .tagged_inline();
        let func = FuncDef::from_source("logic", "def logic():\n    a = double(WIDTH)\n")
            .with_constant("WIDTH", LiteralValue::Int(4))
            .with_capture("double", CaptureCell::Function(Box::new(double)));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let value = assign_value(&body[0]);

        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(8)));
    }

    #[test]
    fn test_inline_expansion_keeps_unresolvable_arguments_symbolic() {
        let double = FuncDef::from_source("double", "def double(n):\n    return n * 2\n")
            .with_locals(&["n"])
            .tagged_inline();
        let func = FuncDef::from_source("logic", "def logic():\n    a = double(x)\n")
            .with_capture("x", CaptureCell::Opaque("Signal".to_string()))
            .with_capture("double", CaptureCell::Function(Box::new(double)));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let value = assign_value(&body[0]);

        match &value.kind {
            ExpressionKind::Binary { lhs, rhs, .. } => {
                assert!(resolves_to(lhs, &reduced.string_table, "x"));
                assert_eq!(rhs.kind, ExpressionKind::Literal(LiteralValue::Int(2)));
            }
            other => panic!("expected the spliced multiplication, got {:?}", other),
        }
        // The spliced expression reports the call site, not the helper
        assert_eq!(value.location.start_pos.line_number, 2);
    }

    #[test]
    fn test_helper_locals_are_renamed_with_the_callee_prefix() {
        let offset = FuncDef::from_source("offset", "def offset(n):\n    return n + step\n")
            .with_locals(&["n", "step"])
            .with_capture("step", CaptureCell::Opaque("Signal".to_string()))
            .tagged_inline();
        let func = FuncDef::from_source("logic", "def logic():\n    a = offset(1)\n")
            .with_capture("offset", CaptureCell::Function(Box::new(offset)));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let value = assign_value(&body[0]);

        match &value.kind {
            ExpressionKind::Binary { lhs, rhs, .. } => {
                assert_eq!(lhs.kind, ExpressionKind::Literal(LiteralValue::Int(1)));
                assert!(resolves_to(rhs, &reduced.string_table, "offset__step"));
            }
            other => panic!("expected the spliced addition, got {:?}", other),
        }
    }

    #[test]
    fn test_untagged_helper_call_is_left_as_a_call() {
        let double =
            FuncDef::from_source("double", "def double(n):\n    return n * 2\n").with_locals(&["n"]);
        let func = FuncDef::from_source("logic", "def logic():\n    a = double(2 + 3)\n")
            .with_capture("double", CaptureCell::Function(Box::new(double)));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let value = assign_value(&body[0]);

        match &value.kind {
            ExpressionKind::Call { callee, args } => {
                assert!(resolves_to(callee, &reduced.string_table, "double"));
                // Arguments still fold even when the call does not expand
                assert_eq!(args[0].kind, ExpressionKind::Literal(LiteralValue::Int(5)));
            }
            other => panic!("expected the call to survive, got {:?}", other),
        }
    }

    #[test]
    fn test_multi_statement_helper_is_refused() {
        let helper = FuncDef::from_source(
            "helper",
            "def helper(n):\n    x = n * 2\n    return x\n",
        )
        .with_locals(&["n", "x"])
        .tagged_inline();
        let func = FuncDef::from_source("logic", "def logic():\n    a = helper(1)\n")
            .with_capture("helper", CaptureCell::Function(Box::new(helper)));

        let error = Elaborator::new()
            .reduce(&func)
            .expect_err("a multi-statement helper should be refused");
        assert_eq!(error.error_type, ErrorType::InlineUnsupported);
    }

    #[test]
    fn test_helper_without_a_return_expression_is_refused() {
        let helper = FuncDef::from_source("helper", "def helper():\n    pass\n").tagged_inline();
        let func = FuncDef::from_source("logic", "def logic():\n    a = helper()\n")
            .with_capture("helper", CaptureCell::Function(Box::new(helper)));

        let error = Elaborator::new()
            .reduce(&func)
            .expect_err("a helper with no return expression should be refused");
        assert_eq!(error.error_type, ErrorType::InlineUnsupported);
    }

    #[test]
    fn test_arity_mismatch_is_refused() {
        let double = FuncDef::from_source("double", "def double(n):\n    return n * 2\n")
            .with_locals(&["n"])
            .tagged_inline();
        let func = FuncDef::from_source("logic", "def logic():\n    a = double(1, 2)\n")
            .with_capture("double", CaptureCell::Function(Box::new(double)));

        let error = Elaborator::new()
            .reduce(&func)
            .expect_err("an arity mismatch should be refused");
        assert_eq!(error.error_type, ErrorType::InlineUnsupported);
    }

    #[test]
    fn test_nested_inline_helpers_expand_and_fold_through() {
        let increment = FuncDef::from_source("increment", "def increment(n):\n    return n + 1\n")
            .with_locals(&["n"])
            .tagged_inline();
        let double_next = FuncDef::from_source(
            "double_next",
            "def double_next(n):\n    return increment(n) * 2\n",
        )
        .with_locals(&["n"])
        .with_capture("increment", CaptureCell::Function(Box::new(increment)))
        .tagged_inline();
        let func = FuncDef::from_source("logic", "def logic():\n    a = double_next(3)\n")
            .with_capture("double_next", CaptureCell::Function(Box::new(double_next)));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let value = assign_value(&body[0]);

        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(8)));
    }

    #[test]
    fn test_helper_closure_constants_fold_during_expansion() {
        let scaled = FuncDef::from_source("scaled", "def scaled(n):\n    return n * FACTOR\n")
            .with_locals(&["n"])
            .with_constant("FACTOR", LiteralValue::Int(3))
            .tagged_inline();
        let func = FuncDef::from_source("logic", "def logic():\n    a = scaled(5)\n")
            .with_capture("scaled", CaptureCell::Function(Box::new(scaled)));

        let reduced = reduce(&func);
        let body = function_body(&reduced.tree);
        let value = assign_value(&body[0]);

        assert_eq!(value.kind, ExpressionKind::Literal(LiteralValue::Int(15)));
    }

    #[test]
    fn test_expansion_depth_is_bounded() {
        // A 40-deep chain of helpers each expanding into a call to the next
        let mut helper =
            FuncDef::from_source("f39", "def f39():\n    return 1\n").tagged_inline();
        for i in (0..39).rev() {
            let name = format!("f{}", i);
            let next = format!("f{}", i + 1);
            let source = format!("def {}():\n    return {}()\n", name, next);
            helper = FuncDef::from_source(&name, source)
                .with_capture(next, CaptureCell::Function(Box::new(helper)))
                .tagged_inline();
        }
        let func = FuncDef::from_source("logic", "def logic():\n    a = f0()\n")
            .with_capture("f0", CaptureCell::Function(Box::new(helper)));

        let error = Elaborator::new()
            .reduce(&func)
            .expect_err("unbounded expansion should be refused");
        assert_eq!(error.error_type, ErrorType::InlineUnsupported);
        assert!(error.msg.contains("depth"));
    }
}
