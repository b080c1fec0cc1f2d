use crate::elaborator::elaborator_errors::ElabError;
use crate::elaborator::func_def::{Definition, FuncDef};
use crate::elaborator::parsers::ast_nodes::{AstNode, NodeKind};
use crate::elaborator::parsers::parse_body::parse_function;
use crate::elaborator::parsers::tokenizer::tokenize;
use crate::elaborator::parsers::tokens::TextLocation;
use crate::elaborator::string_interning::StringTable;
use crate::return_parse_error;

// The source extractor: turns a function definition into a syntax tree
// rooted at exactly one FunctionDef node. Source definitions are usually
// captured from inside an enclosing scope, so the whole block arrives
// indented and must be dedented before it can be tokenized.
pub fn source_to_tree(func: &FuncDef, string_table: &mut StringTable) -> Result<AstNode, ElabError> {
    match &func.definition {
        Definition::Source(source) => {
            let dedented = dedent(source).map_err(|e| e.with_function_name(&func.name))?;
            let tokens = tokenize(&dedented, string_table)
                .map_err(|e| e.with_function_name(&func.name))?;
            parse_function(tokens).map_err(|e| e.with_function_name(&func.name))
        }

        Definition::Tree(tree) => {
            validate_tree(tree).map_err(|e| e.with_function_name(&func.name))?;
            Ok(tree.to_owned())
        }
    }
}

// Strip the first non-blank line's leading whitespace from every line.
// A shallower line means the block's indentation cannot be stripped
// deterministically, which is a parse error rather than a guess.
pub fn dedent(source: &str) -> Result<String, ElabError> {
    let prefix = match source
        .lines()
        .find(|line| !line.trim().is_empty())
    {
        Some(first) => {
            let indent_len = first.len() - first.trim_start_matches([' ', '\t']).len();
            first[..indent_len].to_owned()
        }
        None => return_parse_error!(
            "The function definition is empty",
            TextLocation::default()
        ),
    };

    if prefix.is_empty() {
        return Ok(source.to_owned());
    }

    let mut dedented = String::with_capacity(source.len());
    for (line_index, line) in source.lines().enumerate() {
        if line.trim().is_empty() {
            dedented.push('\n');
            continue;
        }

        match line.strip_prefix(prefix.as_str()) {
            Some(stripped) => {
                dedented.push_str(stripped);
                dedented.push('\n');
            }
            None => return_parse_error!(
                format!(
                    "Inconsistent indentation on line {}: the definition cannot be dedented deterministically",
                    line_index + 1
                ),
                TextLocation::new_just_line(line_index as i32 + 1)
            ),
        }
    }

    Ok(dedented)
}

// Pre-built trees skip the parser, so the same structural rules are
// checked here: one FunctionDef at the root, none anywhere below it.
fn validate_tree(tree: &AstNode) -> Result<(), ElabError> {
    let body = match &tree.kind {
        NodeKind::FunctionDef { body, .. } => body,
        _ => return_parse_error!(
            "A definition tree must be rooted at exactly one function definition",
            tree.location
        ),
    };

    check_no_nested_def(body)
}

fn check_no_nested_def(body: &[AstNode]) -> Result<(), ElabError> {
    for statement in body {
        match &statement.kind {
            NodeKind::FunctionDef { .. } => return_parse_error!(
                "Nested function definitions are not supported inside a translated body",
                statement.location
            ),
            NodeKind::If {
                then_body,
                else_body,
                ..
            } => {
                check_no_nested_def(then_body)?;
                check_no_nested_def(else_body)?;
            }
            _ => {}
        }
    }
    Ok(())
}
