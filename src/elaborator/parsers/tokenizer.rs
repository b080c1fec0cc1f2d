use crate::elaborator::elaborator_errors::ElabError;
use crate::elaborator::parsers::tokens::{
    keyword_from_str, CharPosition, TextLocation, Token, TokenKind,
};
use crate::elaborator::string_interning::StringTable;
use crate::return_parse_error;

// Indentation-sensitive tokenizer for function body sources.
// Block structure is emitted as Indent/Dedent tokens driven by an indent
// stack, the same way the downstream parser expects to see it. Any dedent
// that does not land exactly on an enclosing indentation level is a parse
// error, so inconsistent indentation can never produce a half-built tree.
pub fn tokenize(source: &str, string_table: &mut StringTable) -> Result<Vec<Token>, ElabError> {
    let mut tokens: Vec<Token> = Vec::new();

    // The exact whitespace prefix of every open block, innermost last
    let mut indent_stack: Vec<String> = vec![String::new()];

    let mut last_line_number: i32 = 1;

    for (line_index, line) in source.lines().enumerate() {
        let line_number = line_index as i32 + 1;

        let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
        let (indent, rest) = line.split_at(indent_len);

        // Blank lines and comment-only lines don't affect block structure
        if rest.is_empty() || rest.starts_with('#') {
            continue;
        }

        last_line_number = line_number;
        let line_start = CharPosition {
            line_number,
            char_column: indent_len as i32 + 1,
        };

        if indent != indent_stack[indent_stack.len() - 1] {
            if indent.starts_with(indent_stack[indent_stack.len() - 1].as_str()) {
                // Deeper than the current block: open a new one
                indent_stack.push(indent.to_owned());
                tokens.push(Token::new(
                    TokenKind::Indent,
                    TextLocation::new(line_start, line_start),
                ));
            } else {
                // Shallower: close blocks until the indentation matches one
                // of the enclosing levels exactly
                loop {
                    indent_stack.pop();
                    tokens.push(Token::new(
                        TokenKind::Dedent,
                        TextLocation::new(line_start, line_start),
                    ));

                    match indent_stack.last() {
                        Some(level) if level == indent => break,
                        Some(level) if indent.starts_with(level.as_str()) => {
                            return_parse_error!(
                                format!(
                                    "Inconsistent indentation on line {}: does not match any enclosing block",
                                    line_number
                                ),
                                TextLocation::new_just_line(line_number)
                            )
                        }
                        Some(_) => continue,
                        None => return_parse_error!(
                            format!("Inconsistent indentation on line {}", line_number),
                            TextLocation::new_just_line(line_number)
                        ),
                    }
                }
            }
        }

        tokenize_line(rest, line_number, indent_len, &mut tokens, string_table)?;

        let line_end = CharPosition {
            line_number,
            char_column: line.len() as i32 + 1,
        };
        tokens.push(Token::new(
            TokenKind::Newline,
            TextLocation::new(line_end, line_end),
        ));
    }

    // Close every still-open block at end of input
    let eof_pos = CharPosition {
        line_number: last_line_number + 1,
        char_column: 1,
    };
    while indent_stack.len() > 1 {
        indent_stack.pop();
        tokens.push(Token::new(
            TokenKind::Dedent,
            TextLocation::new(eof_pos, eof_pos),
        ));
    }
    tokens.push(Token::new(
        TokenKind::Eof,
        TextLocation::new(eof_pos, eof_pos),
    ));

    Ok(tokens)
}

fn tokenize_line(
    rest: &str,
    line_number: i32,
    indent_len: usize,
    tokens: &mut Vec<Token>,
    string_table: &mut StringTable,
) -> Result<(), ElabError> {
    let chars: Vec<char> = rest.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let column = (indent_len + i) as i32 + 1;
        let start = CharPosition {
            line_number,
            char_column: column,
        };

        if c == ' ' || c == '\t' {
            i += 1;
            continue;
        }

        // Trailing comment: the rest of the line is ignored
        if c == '#' {
            break;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let word_start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[word_start..i].iter().collect();
            let location = location_for(start, i - word_start);

            match keyword_from_str(&word) {
                Some(kind) => tokens.push(Token::new(kind, location)),
                None => {
                    let id = string_table.get_or_intern(word);
                    tokens.push(Token::new(TokenKind::Identifier(id), location));
                }
            }
            continue;
        }

        if c.is_ascii_digit() {
            let (value, consumed) = tokenize_number(&chars[i..], start)?;
            tokens.push(Token::new(
                TokenKind::IntLiteral(value),
                location_for(start, consumed),
            ));
            i += consumed;
            continue;
        }

        if c == '"' || c == '\'' {
            let (value, consumed) = tokenize_string(&chars[i..], c, start)?;
            let id = string_table.get_or_intern(value);
            tokens.push(Token::new(
                TokenKind::StringLiteral(id),
                location_for(start, consumed),
            ));
            i += consumed;
            continue;
        }

        // Two-character operators are matched before their one-character prefixes
        let next = chars.get(i + 1).copied();
        let (kind, width) = match (c, next) {
            ('<', Some('<')) => (TokenKind::ShiftLeft, 2),
            ('>', Some('>')) => (TokenKind::ShiftRight, 2),
            ('<', Some('=')) => (TokenKind::LessThanOrEqual, 2),
            ('>', Some('=')) => (TokenKind::GreaterThanOrEqual, 2),
            ('=', Some('=')) => (TokenKind::Equality, 2),
            ('!', Some('=')) => (TokenKind::NotEqual, 2),
            ('/', Some('/')) => (TokenKind::DoubleSlash, 2),
            ('<', _) => (TokenKind::LessThan, 1),
            ('>', _) => (TokenKind::GreaterThan, 1),
            ('=', _) => (TokenKind::Assign, 1),
            ('+', _) => (TokenKind::Plus, 1),
            ('-', _) => (TokenKind::Minus, 1),
            ('*', _) => (TokenKind::Star, 1),
            ('%', _) => (TokenKind::Percent, 1),
            ('&', _) => (TokenKind::Ampersand, 1),
            ('|', _) => (TokenKind::Pipe, 1),
            ('^', _) => (TokenKind::Caret, 1),
            ('~', _) => (TokenKind::Tilde, 1),
            ('(', _) => (TokenKind::OpenParen, 1),
            (')', _) => (TokenKind::CloseParen, 1),
            (',', _) => (TokenKind::Comma, 1),
            (':', _) => (TokenKind::Colon, 1),
            _ => return_parse_error!(
                format!("Unexpected character '{}' on line {}", c, line_number),
                TextLocation::new(start, start)
            ),
        };
        tokens.push(Token::new(kind, location_for(start, width)));
        i += width;
    }

    Ok(())
}

fn location_for(start: CharPosition, width: usize) -> TextLocation {
    TextLocation::new(
        start,
        CharPosition {
            line_number: start.line_number,
            char_column: start.char_column + width as i32,
        },
    )
}

// Decimal, hex (0x) and binary (0b) integer literals
fn tokenize_number(chars: &[char], start: CharPosition) -> Result<(i64, usize), ElabError> {
    let (radix, digit_start) = match (chars.first(), chars.get(1)) {
        (Some('0'), Some('x')) | (Some('0'), Some('X')) => (16, 2),
        (Some('0'), Some('b')) | (Some('0'), Some('B')) => (2, 2),
        _ => (10, 0),
    };

    let mut i = digit_start;
    let mut digits = String::new();
    while i < chars.len() {
        let c = chars[i];
        if c == '_' {
            i += 1;
            continue;
        }
        if c.is_digit(radix) {
            digits.push(c);
            i += 1;
        } else {
            break;
        }
    }

    if digits.is_empty() {
        return_parse_error!(
            format!("Malformed number literal on line {}", start.line_number),
            TextLocation::new(start, start)
        )
    }

    match i64::from_str_radix(&digits, radix) {
        Ok(value) => Ok((value, i)),
        Err(_) => return_parse_error!(
            format!(
                "Number literal too large on line {}",
                start.line_number
            ),
            TextLocation::new(start, start)
        ),
    }
}

// Single- or double-quoted strings with a small escape set
fn tokenize_string(
    chars: &[char],
    quote: char,
    start: CharPosition,
) -> Result<(String, usize), ElabError> {
    let mut value = String::new();
    let mut i = 1;

    while i < chars.len() {
        match chars[i] {
            c if c == quote => return Ok((value, i + 1)),
            '\\' => {
                let escaped = match chars.get(i + 1) {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('\\') => '\\',
                    Some(c) if *c == quote => quote,
                    _ => return_parse_error!(
                        format!("Unknown escape sequence on line {}", start.line_number),
                        TextLocation::new(start, start)
                    ),
                };
                value.push(escaped);
                i += 2;
            }
            c => {
                value.push(c);
                i += 1;
            }
        }
    }

    return_parse_error!(
        format!("Unterminated string literal on line {}", start.line_number),
        TextLocation::new(start, start)
    )
}
