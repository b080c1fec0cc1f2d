mod elaborator {
    pub(crate) mod parsers {
        pub(crate) mod ast_nodes;
        pub(crate) mod parse_body;
        pub(crate) mod tokenizer;
        pub(crate) mod tokens;
    }

    pub(crate) mod optimizers {
        pub(crate) mod branch_elimination;
        pub(crate) mod constant_folding;
        pub(crate) mod inline;
    }

    pub(crate) mod closure;
    pub(crate) mod constants;
    pub(crate) mod dev_logging;
    pub(crate) mod elaborator_errors;
    pub(crate) mod extract;
    pub(crate) mod func_def;
    pub(crate) mod string_interning;
}


use crate::elaborator::closure::resolve_captures;
use crate::elaborator::constants::classify_constants;
use crate::elaborator::extract::source_to_tree;
use crate::elaborator::optimizers::branch_elimination;
use crate::elaborator::optimizers::constant_folding::ConstantFolder;

// Re-export the caller-facing types
pub use crate::elaborator::closure::ClosureBindings;
pub use crate::elaborator::constants::ConstantSet;
pub use crate::elaborator::elaborator_errors::{
    error_type_to_str, ElabError, ErrorMetaDataKey, ErrorType,
};
pub use crate::elaborator::func_def::{CaptureBinding, CaptureCell, Definition, FuncDef};
pub use crate::elaborator::parsers::ast_nodes::{
    ast_to_json, AstNode, BinaryOperator, BooleanOperator, BoundedInt, CompareOperator, Expression,
    ExpressionKind, LiteralValue, NodeKind, UnaryOperator,
};
pub use crate::elaborator::parsers::tokens::{CharPosition, TextLocation};
pub use crate::elaborator::string_interning::{InternedString, StringTable};

use rayon::prelude::*;

// A reduced tree plus the interning table its identifiers live in.
// Ownership of both passes to the downstream signal-classification and
// code-generation stage.
#[derive(Debug)]
pub struct ReducedFunction {
    pub name: String,
    pub tree: AstNode,
    pub string_table: StringTable,
}

/// One reduction pipeline instance. Owns the string table the function's
/// identifiers are interned into and nothing else: every call allocates
/// its own classifier and folder state, so independent functions can be
/// reduced concurrently with one Elaborator each.
pub struct Elaborator {
    string_table: StringTable,
}

impl Default for Elaborator {
    fn default() -> Self {
        Self::new()
    }
}

impl Elaborator {
    pub fn new() -> Self {
        Self {
            string_table: StringTable::new(),
        }
    }

    pub fn string_table(&self) -> &StringTable {
        &self.string_table
    }

    pub fn string_table_mut(&mut self) -> &mut StringTable {
        &mut self.string_table
    }

    /// -----------------------------
    ///   EXTRACTION
    /// -----------------------------
    /// Normalize and parse one function definition into a tree rooted at
    /// exactly one function node.
    pub fn source_to_tree(&mut self, func: &FuncDef) -> Result<AstNode, ElabError> {
        source_to_tree(func, &mut self.string_table)
    }

    /// -----------------------------
    ///   CLOSURE RESOLUTION
    /// -----------------------------
    /// Read the function's capture record. Fails with the complete list of
    /// unresolved names if any cell has no value yet.
    pub fn resolve_captures(&mut self, func: &FuncDef) -> Result<ClosureBindings, ElabError> {
        resolve_captures(func, &mut self.string_table)
    }

    /// -----------------------------
    ///   CONSTANT CLASSIFICATION
    /// -----------------------------
    /// Filter the bindings down to the literal-compatible subset the
    /// folder may substitute into the tree.
    pub fn classify_constants(&self, bindings: &ClosureBindings) -> ConstantSet {
        classify_constants(bindings)
    }

    /// -----------------------------
    ///   CONSTANT FOLDING
    /// -----------------------------
    /// Bottom-up substitution and folding of every statically computable
    /// expression. Calls to inline-tagged helper captures expand here.
    pub fn fold_constants(
        &mut self,
        tree: AstNode,
        constants: &ConstantSet,
        captures: &ClosureBindings,
    ) -> Result<AstNode, ElabError> {
        ConstantFolder::new(constants, captures, &mut self.string_table).fold_function(tree)
    }

    /// -----------------------------
    ///   BRANCH ELIMINATION
    /// -----------------------------
    /// Collapse every conditional whose test folded to a literal.
    pub fn eliminate_branches(&self, tree: AstNode) -> AstNode {
        branch_elimination::eliminate_branches(tree)
    }

    /// Run the whole pipeline for one function. Consumes the elaborator so
    /// the reduced tree leaves together with its string table.
    pub fn reduce(mut self, func: &FuncDef) -> Result<ReducedFunction, ElabError> {
        let tree = self.source_to_tree(func)?;
        let bindings = self.resolve_captures(func)?;
        let constants = self.classify_constants(&bindings);

        let tree = self.fold_constants(tree, &constants, &bindings)?;
        let tree = self.eliminate_branches(tree);

        ast_log!("reduced '{}':\n{}", func.name, ast_to_json(&tree));

        Ok(ReducedFunction {
            name: func.name.to_owned(),
            tree,
            string_table: self.string_table,
        })
    }
}

/// Reduce a batch of independent functions in parallel, one fresh
/// elaborator per function
pub fn reduce_all(funcs: &[FuncDef]) -> Vec<Result<ReducedFunction, ElabError>> {
    funcs
        .par_iter()
        .map(|func| Elaborator::new().reduce(func))
        .collect()
}
