use crate::elaborator::elaborator_errors::ElabError;
use crate::elaborator::parsers::ast_nodes::{
    AstNode, BinaryOperator, BooleanOperator, CompareOperator, Expression, LiteralValue, NodeKind,
    UnaryOperator,
};
use crate::elaborator::parsers::tokens::{TextLocation, Token, TokenKind};
use crate::{return_internal_error, return_parse_error};

// Recursive descent parser over the token stream produced by the tokenizer.
// The grammar is the small imperative subset the reducer understands:
// one def header, assignments, if/elif/else, return, pass and expression
// statements, with Python-like operator precedence and chained comparisons.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

/// Parse a token stream into a tree rooted at exactly one function definition
pub fn parse_function(tokens: Vec<Token>) -> Result<AstNode, ElabError> {
    let mut parser = Parser {
        tokens,
        position: 0,
    };

    let function = parser.parse_function_def()?;

    parser.skip_newlines();
    if parser.current_kind() != &TokenKind::Eof {
        return_parse_error!(
            "Unexpected tokens after the function definition: a definition must contain exactly one function",
            parser.current_location()
        )
    }

    Ok(function)
}

impl Parser {
    fn current(&self) -> &Token {
        // The token stream always ends with Eof, so clamping is safe
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn current_location(&self) -> TextLocation {
        self.current().location
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind {
        let index = (self.position + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().to_owned();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, expected: TokenKind, context: &str) -> Result<Token, ElabError> {
        if self.current_kind() == &expected {
            Ok(self.advance())
        } else {
            return_parse_error!(
                format!("Expected {:?} {}, found {:?}", expected, context, self.current_kind()),
                self.current_location()
            )
        }
    }

    fn skip_newlines(&mut self) {
        while self.current_kind() == &TokenKind::Newline {
            self.advance();
        }
    }

    // def name(params):
    //     body
    fn parse_function_def(&mut self) -> Result<AstNode, ElabError> {
        self.skip_newlines();
        let def_token = self.expect(TokenKind::Def, "at the start of the definition")?;

        let name = match self.advance() {
            Token {
                kind: TokenKind::Identifier(id),
                ..
            } => id,
            token => return_parse_error!(
                "Expected a function name after 'def'",
                token.location
            ),
        };

        self.expect(TokenKind::OpenParen, "after the function name")?;
        let mut params = Vec::new();
        while let TokenKind::Identifier(id) = self.current_kind() {
            params.push(*id);
            self.advance();
            if self.current_kind() == &TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenKind::CloseParen, "after the parameter list")?;
        self.expect(TokenKind::Colon, "after the function header")?;
        self.expect(TokenKind::Newline, "after the function header")?;

        let body = self.parse_block()?;

        Ok(AstNode {
            kind: NodeKind::FunctionDef { name, params, body },
            location: def_token.location,
        })
    }

    // An indented statement block
    fn parse_block(&mut self) -> Result<Vec<AstNode>, ElabError> {
        self.expect(TokenKind::Indent, "to open an indented block")?;

        let mut statements = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::Dedent => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.advance();
                }
                _ => statements.push(self.parse_statement()?),
            }
        }

        if statements.is_empty() {
            return_parse_error!("A block must contain at least one statement", self.current_location())
        }

        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<AstNode, ElabError> {
        match self.current_kind() {
            TokenKind::If => self.parse_if(),

            TokenKind::Return => {
                let return_token = self.advance();
                let value = if self.current_kind() == &TokenKind::Newline {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(TokenKind::Newline, "after the return statement")?;
                Ok(AstNode {
                    kind: NodeKind::Return(value),
                    location: return_token.location,
                })
            }

            TokenKind::Pass => {
                let pass_token = self.advance();
                self.expect(TokenKind::Newline, "after 'pass'")?;
                Ok(AstNode {
                    kind: NodeKind::Pass,
                    location: pass_token.location,
                })
            }

            // A translated body is always a single flat function
            TokenKind::Def => return_parse_error!(
                "Nested function definitions are not supported inside a translated body",
                self.current_location()
            ),

            TokenKind::Elif | TokenKind::Else => return_parse_error!(
                "'elif'/'else' without a matching 'if'",
                self.current_location()
            ),

            TokenKind::Identifier(_) if self.peek_kind(1) == &TokenKind::Assign => {
                let target_token = self.advance();
                let target = match target_token.kind {
                    TokenKind::Identifier(id) => id,
                    kind => return_internal_error!(
                        "Assignment target changed between lookahead and advance: {:?}",
                        kind
                    ),
                };
                self.advance(); // '='
                let value = self.parse_expression()?;
                self.expect(TokenKind::Newline, "after the assignment")?;
                Ok(AstNode {
                    kind: NodeKind::Assign { target, value },
                    location: target_token.location,
                })
            }

            _ => {
                let expression = self.parse_expression()?;
                let location = expression.location;
                self.expect(TokenKind::Newline, "after the expression statement")?;
                Ok(AstNode {
                    kind: NodeKind::ExpressionStatement(expression),
                    location,
                })
            }
        }
    }

    // if/elif/else. An elif chain parses as a nested If in the else body,
    // which keeps branch elimination uniform over a single node shape.
    fn parse_if(&mut self) -> Result<AstNode, ElabError> {
        let if_token = self.advance(); // 'if' or 'elif'
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon, "after the condition")?;
        self.expect(TokenKind::Newline, "after the condition")?;
        let then_body = self.parse_block()?;

        let else_body = match self.current_kind() {
            TokenKind::Elif => vec![self.parse_if()?],
            TokenKind::Else => {
                self.advance();
                self.expect(TokenKind::Colon, "after 'else'")?;
                self.expect(TokenKind::Newline, "after 'else'")?;
                self.parse_block()?
            }
            _ => Vec::new(),
        };

        Ok(AstNode {
            kind: NodeKind::If {
                condition,
                then_body,
                else_body,
            },
            location: if_token.location,
        })
    }

    // Expression precedence, loosest first:
    // or -> and -> not -> comparison -> | -> ^ -> & -> shifts -> + - -> * // % -> unary -> atom
    fn parse_expression(&mut self) -> Result<Expression, ElabError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression, ElabError> {
        let first = self.parse_and()?;
        if self.current_kind() != &TokenKind::Or {
            return Ok(first);
        }

        let location = first.location;
        let mut operands = vec![first];
        while self.current_kind() == &TokenKind::Or {
            self.advance();
            operands.push(self.parse_and()?);
        }
        Ok(Expression::boolean(BooleanOperator::Or, operands, location))
    }

    fn parse_and(&mut self) -> Result<Expression, ElabError> {
        let first = self.parse_not()?;
        if self.current_kind() != &TokenKind::And {
            return Ok(first);
        }

        let location = first.location;
        let mut operands = vec![first];
        while self.current_kind() == &TokenKind::And {
            self.advance();
            operands.push(self.parse_not()?);
        }
        Ok(Expression::boolean(BooleanOperator::And, operands, location))
    }

    fn parse_not(&mut self) -> Result<Expression, ElabError> {
        if self.current_kind() == &TokenKind::Not {
            let not_token = self.advance();
            let operand = self.parse_not()?;
            return Ok(Expression::unary(
                UnaryOperator::Not,
                operand,
                not_token.location,
            ));
        }
        self.parse_comparison()
    }

    // Comparisons chain: `a < b < c` is one node with two legs
    fn parse_comparison(&mut self) -> Result<Expression, ElabError> {
        let left = self.parse_bitor()?;

        let mut legs = Vec::new();
        while let Some(op) = compare_operator(self.current_kind()) {
            self.advance();
            legs.push((op, self.parse_bitor()?));
        }

        if legs.is_empty() {
            Ok(left)
        } else {
            let location = left.location;
            Ok(Expression::comparison(left, legs, location))
        }
    }

    fn parse_bitor(&mut self) -> Result<Expression, ElabError> {
        let mut lhs = self.parse_bitxor()?;
        while self.current_kind() == &TokenKind::Pipe {
            self.advance();
            let rhs = self.parse_bitxor()?;
            let location = lhs.location;
            lhs = Expression::binary(BinaryOperator::BitwiseOr, lhs, rhs, location);
        }
        Ok(lhs)
    }

    fn parse_bitxor(&mut self) -> Result<Expression, ElabError> {
        let mut lhs = self.parse_bitand()?;
        while self.current_kind() == &TokenKind::Caret {
            self.advance();
            let rhs = self.parse_bitand()?;
            let location = lhs.location;
            lhs = Expression::binary(BinaryOperator::BitwiseXor, lhs, rhs, location);
        }
        Ok(lhs)
    }

    fn parse_bitand(&mut self) -> Result<Expression, ElabError> {
        let mut lhs = self.parse_shift()?;
        while self.current_kind() == &TokenKind::Ampersand {
            self.advance();
            let rhs = self.parse_shift()?;
            let location = lhs.location;
            lhs = Expression::binary(BinaryOperator::BitwiseAnd, lhs, rhs, location);
        }
        Ok(lhs)
    }

    fn parse_shift(&mut self) -> Result<Expression, ElabError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::ShiftLeft => BinaryOperator::ShiftLeft,
                TokenKind::ShiftRight => BinaryOperator::ShiftRight,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            let location = lhs.location;
            lhs = Expression::binary(op, lhs, rhs, location);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expression, ElabError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            let location = lhs.location;
            lhs = Expression::binary(op, lhs, rhs, location);
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expression, ElabError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::DoubleSlash => BinaryOperator::FloorDivide,
                TokenKind::Percent => BinaryOperator::Modulus,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            let location = lhs.location;
            lhs = Expression::binary(op, lhs, rhs, location);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expression, ElabError> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Tilde => UnaryOperator::Invert,
            _ => return self.parse_atom(),
        };
        let op_token = self.advance();
        let operand = self.parse_unary()?;
        Ok(Expression::unary(op, operand, op_token.location))
    }

    fn parse_atom(&mut self) -> Result<Expression, ElabError> {
        let token = self.advance();
        let mut expression = match token.kind {
            TokenKind::IntLiteral(value) => {
                Expression::literal(LiteralValue::Int(value), token.location)
            }
            TokenKind::StringLiteral(id) => {
                Expression::literal(LiteralValue::Str(id), token.location)
            }
            TokenKind::True => Expression::literal(LiteralValue::Bool(true), token.location),
            TokenKind::False => Expression::literal(LiteralValue::Bool(false), token.location),
            TokenKind::None => Expression::literal(LiteralValue::None, token.location),
            TokenKind::Identifier(id) => Expression::reference(id, token.location),
            TokenKind::OpenParen => {
                let inner = self.parse_expression()?;
                self.expect(TokenKind::CloseParen, "to close the parenthesized expression")?;
                inner
            }
            _ => return_parse_error!(
                format!("Expected an expression, found {:?}", token.kind),
                token.location
            ),
        };

        // Call suffixes: f(a, b) and chained f(a)(b)
        while self.current_kind() == &TokenKind::OpenParen {
            self.advance();
            let mut args = Vec::new();
            if self.current_kind() != &TokenKind::CloseParen {
                loop {
                    args.push(self.parse_expression()?);
                    if self.current_kind() == &TokenKind::Comma {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
            self.expect(TokenKind::CloseParen, "to close the argument list")?;
            let location = expression.location;
            expression = Expression::call(expression, args, location);
        }

        Ok(expression)
    }
}

fn compare_operator(kind: &TokenKind) -> Option<CompareOperator> {
    match kind {
        TokenKind::Equality => Some(CompareOperator::Equal),
        TokenKind::NotEqual => Some(CompareOperator::NotEqual),
        TokenKind::LessThan => Some(CompareOperator::LessThan),
        TokenKind::LessThanOrEqual => Some(CompareOperator::LessThanOrEqual),
        TokenKind::GreaterThan => Some(CompareOperator::GreaterThan),
        TokenKind::GreaterThanOrEqual => Some(CompareOperator::GreaterThanOrEqual),
        _ => None,
    }
}
