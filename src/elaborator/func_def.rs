use crate::elaborator::parsers::ast_nodes::{AstNode, LiteralValue};

// The caller-facing description of one function to reduce.
// There is no live closure to introspect on this side of the boundary, so
// the capture set arrives as an explicit record built by the caller: every
// free variable the body references must appear as a binding, whether or
// not its value is available yet.
#[derive(Debug, Clone)]
pub struct FuncDef {
    pub name: String,

    pub definition: Definition,

    // One entry per free variable, in declaration order
    pub captures: Vec<CaptureBinding>,

    // Names local to the function: parameters and assigned variables.
    // The inliner uses these for collision-free renaming.
    pub local_vars: Vec<String>,

    // Marks a helper eligible for the inliner. Has no effect on constant
    // classification: callables are never folded as constants.
    pub inline: bool,
}

// A definition is either source text (normalized and parsed by the
// extractor) or a pre-built tree whose identifiers were interned through
// the same elaborator that will reduce it.
#[derive(Debug, Clone)]
pub enum Definition {
    Source(String),
    Tree(AstNode),
}

#[derive(Debug, Clone)]
pub struct CaptureBinding {
    pub name: String,
    pub cell: CaptureCell,
}

#[derive(Debug, Clone)]
pub enum CaptureCell {
    // The cell exists but its value is not available yet, e.g. the name is
    // declared after the function in the enclosing scope
    Unbound,

    // A literal-compatible value, eligible for constant folding
    Value(LiteralValue),

    // A captured callable, eligible for inlining when tagged
    Function(Box<FuncDef>),

    // Any other captured object. Carried for completeness, never folded.
    // The string describes the object's kind for error reporting.
    Opaque(String),
}

impl FuncDef {
    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Self {
        FuncDef {
            name: name.into(),
            definition: Definition::Source(source.into()),
            captures: Vec::new(),
            local_vars: Vec::new(),
            inline: false,
        }
    }

    pub fn from_tree(name: impl Into<String>, tree: AstNode) -> Self {
        FuncDef {
            name: name.into(),
            definition: Definition::Tree(tree),
            captures: Vec::new(),
            local_vars: Vec::new(),
            inline: false,
        }
    }

    pub fn with_capture(mut self, name: impl Into<String>, cell: CaptureCell) -> Self {
        self.captures.push(CaptureBinding {
            name: name.into(),
            cell,
        });
        self
    }

    pub fn with_constant(self, name: impl Into<String>, value: LiteralValue) -> Self {
        self.with_capture(name, CaptureCell::Value(value))
    }

    pub fn with_locals(mut self, names: &[&str]) -> Self {
        self.local_vars
            .extend(names.iter().map(|n| (*n).to_owned()));
        self
    }

    pub fn tagged_inline(mut self) -> Self {
        self.inline = true;
        self
    }
}
