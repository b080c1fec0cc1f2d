use crate::elaborator::string_interning::InternedString;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub struct CharPosition {
    pub line_number: i32,
    pub char_column: i32,
}

// Every node in the syntax tree carries one of these.
// Synthesized nodes (folded literals, inlined expressions) inherit the
// location of the node they replace, so no node ever has a missing position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
pub struct TextLocation {
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl TextLocation {
    pub fn new(start: CharPosition, end: CharPosition) -> Self {
        Self {
            start_pos: start,
            end_pos: end,
        }
    }

    pub fn new_just_line(line: i32) -> Self {
        Self {
            start_pos: CharPosition {
                line_number: line,
                char_column: 0,
            },
            end_pos: CharPosition {
                line_number: line,
                char_column: 120, // Arbitrary number
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Keywords
    Def,
    If,
    Elif,
    Else,
    Return,
    Pass,
    And,
    Or,
    Not,
    True,
    False,
    None,

    Identifier(InternedString),
    IntLiteral(i64),
    StringLiteral(InternedString),

    // Arithmetic / bitwise operators
    Plus,
    Minus,
    Star,
    DoubleSlash,
    Percent,
    ShiftLeft,
    ShiftRight,
    Ampersand,
    Pipe,
    Caret,
    Tilde,

    // Comparisons
    Equality,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    Assign,
    OpenParen,
    CloseParen,
    Comma,
    Colon,

    // Block structure from significant whitespace
    Newline,
    Indent,
    Dedent,
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: TextLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: TextLocation) -> Self {
        Self { kind, location }
    }
}

pub fn keyword_from_str(word: &str) -> Option<TokenKind> {
    match word {
        "def" => Some(TokenKind::Def),
        "if" => Some(TokenKind::If),
        "elif" => Some(TokenKind::Elif),
        "else" => Some(TokenKind::Else),
        "return" => Some(TokenKind::Return),
        "pass" => Some(TokenKind::Pass),
        "and" => Some(TokenKind::And),
        "or" => Some(TokenKind::Or),
        "not" => Some(TokenKind::Not),
        "True" => Some(TokenKind::True),
        "False" => Some(TokenKind::False),
        "None" => Some(TokenKind::None),
        _ => Option::None,
    }
}
