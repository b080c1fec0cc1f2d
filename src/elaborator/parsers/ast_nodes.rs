use crate::elaborator::parsers::tokens::TextLocation;
use crate::elaborator::string_interning::{InternedString, StringTable};
use serde::Serialize;

// Statements. The tree handed to the downstream generator is always rooted
// at exactly one FunctionDef node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstNode {
    pub kind: NodeKind,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    FunctionDef {
        name: InternedString,
        params: Vec<InternedString>,
        body: Vec<AstNode>,
    },

    // target = value
    Assign {
        target: InternedString,
        value: Expression,
    },

    // The condition is folded by the reducer, but the node itself is only
    // ever collapsed by the branch eliminator pass.
    If {
        condition: Expression,
        then_body: Vec<AstNode>,
        else_body: Vec<AstNode>,
    },

    Return(Option<Expression>),

    ExpressionStatement(Expression),

    Pass,
}

// Anything that produces a value.
// Locations are kept separate from the kind so a folded literal can take
// over the location of the expression it replaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExpressionKind {
    Literal(LiteralValue),

    // Reference to a name from the enclosing scope or a local variable
    Reference(InternedString),

    Binary {
        op: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    // and/or over an ordered operand sequence, short-circuit semantics
    Boolean {
        op: BooleanOperator,
        operands: Vec<Expression>,
    },

    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    // Chained comparison: left, then one (operator, comparator) leg per link.
    // `a < b < c` is one node with two legs.
    Comparison {
        left: Box<Expression>,
        legs: Vec<(CompareOperator, Expression)>,
    },

    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
}

// The closed allow-list of foldable value kinds.
// Anything not representable here is never folded into the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Int(i64),
    Bool(bool),
    Str(InternedString),
    None,
    Bounded(BoundedInt),
}

/// A fixed-width integer with an inclusive value range, representing a
/// hardware bit vector. Arithmetic on bounded values folds to plain Int:
/// the result of an expression has no inherent hardware width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundedInt {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

impl LiteralValue {
    // Truthiness used by boolean short-circuit folding and branch elimination
    pub fn truthy(&self) -> bool {
        match self {
            LiteralValue::Int(v) => *v != 0,
            LiteralValue::Bool(b) => *b,
            LiteralValue::Str(_) => true,
            LiteralValue::None => false,
            LiteralValue::Bounded(b) => b.value != 0,
        }
    }

    // Numeric view shared by Int and Bounded. Bools and strings are kept out
    // of arithmetic folding on purpose.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            LiteralValue::Int(v) => Some(*v),
            LiteralValue::Bounded(b) => Some(b.value),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            LiteralValue::Int(_) => "integer",
            LiteralValue::Bool(_) => "boolean",
            LiteralValue::Str(_) => "string",
            LiteralValue::None => "none",
            LiteralValue::Bounded(_) => "bounded integer vector",
        }
    }

    pub fn as_string(&self, string_table: &StringTable) -> String {
        match self {
            LiteralValue::Int(v) => v.to_string(),
            LiteralValue::Bool(b) => b.to_string(),
            LiteralValue::Str(id) => string_table.resolve(*id).to_owned(),
            LiteralValue::None => "None".to_owned(),
            LiteralValue::Bounded(b) => format!("intbv({}, {}, {})", b.value, b.min, b.max),
        }
    }
}

impl Expression {
    pub fn new(kind: ExpressionKind, location: TextLocation) -> Self {
        Self { kind, location }
    }

    pub fn literal(value: LiteralValue, location: TextLocation) -> Self {
        Self {
            kind: ExpressionKind::Literal(value),
            location,
        }
    }

    pub fn int(value: i64, location: TextLocation) -> Self {
        Self::literal(LiteralValue::Int(value), location)
    }

    pub fn bool(value: bool, location: TextLocation) -> Self {
        Self::literal(LiteralValue::Bool(value), location)
    }

    pub fn reference(name: InternedString, location: TextLocation) -> Self {
        Self {
            kind: ExpressionKind::Reference(name),
            location,
        }
    }

    pub fn binary(
        op: BinaryOperator,
        lhs: Expression,
        rhs: Expression,
        location: TextLocation,
    ) -> Self {
        Self {
            kind: ExpressionKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            location,
        }
    }

    pub fn boolean(op: BooleanOperator, operands: Vec<Expression>, location: TextLocation) -> Self {
        Self {
            kind: ExpressionKind::Boolean { op, operands },
            location,
        }
    }

    pub fn unary(op: UnaryOperator, operand: Expression, location: TextLocation) -> Self {
        Self {
            kind: ExpressionKind::Unary {
                op,
                operand: Box::new(operand),
            },
            location,
        }
    }

    pub fn comparison(
        left: Expression,
        legs: Vec<(CompareOperator, Expression)>,
        location: TextLocation,
    ) -> Self {
        Self {
            kind: ExpressionKind::Comparison {
                left: Box::new(left),
                legs,
            },
            location,
        }
    }

    pub fn call(callee: Expression, args: Vec<Expression>, location: TextLocation) -> Self {
        Self {
            kind: ExpressionKind::Call {
                callee: Box::new(callee),
                args,
            },
            location,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ExpressionKind::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match &self.kind {
            ExpressionKind::Literal(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    FloorDivide,
    Modulus,
    ShiftLeft,
    ShiftRight,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
}

impl BinaryOperator {
    pub fn to_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::FloorDivide => "//",
            BinaryOperator::Modulus => "%",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BooleanOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum UnaryOperator {
    Not,
    Negate,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CompareOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl CompareOperator {
    pub fn to_str(&self) -> &'static str {
        match self {
            CompareOperator::Equal => "==",
            CompareOperator::NotEqual => "!=",
            CompareOperator::LessThan => "<",
            CompareOperator::LessThanOrEqual => "<=",
            CompareOperator::GreaterThan => ">",
            CompareOperator::GreaterThanOrEqual => ">=",
        }
    }
}

/// JSON dump of a tree for the show_ast logging path and tests
pub fn ast_to_json(node: &AstNode) -> String {
    serde_json::to_string_pretty(node).unwrap_or_default()
}
