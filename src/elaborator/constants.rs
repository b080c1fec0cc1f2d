use crate::elaborator::closure::ClosureBindings;
use crate::elaborator::func_def::CaptureCell;
use crate::elaborator::parsers::ast_nodes::LiteralValue;
use crate::elaborator::string_interning::InternedString;
use rustc_hash::FxHashMap;

pub type ConstantSet = FxHashMap<InternedString, LiteralValue>;

// The constant classifier: the subset of the closure bindings the reducer
// may substitute into the tree. The allow-list is closed: integers,
// booleans, strings, none and bounded integer vectors. Callables are never
// constants, whatever their inline tag says; that tag only concerns the
// inliner. Opaque captures stay out because folding them could bake a
// mutable or non-deterministic object into the tree.
//
// Recomputed fresh for every reduction call and never cached: closure
// values are assumed final at extraction time.
pub fn classify_constants(bindings: &ClosureBindings) -> ConstantSet {
    let mut constants = FxHashMap::default();

    for (name, cell) in bindings {
        if let CaptureCell::Value(value) = cell {
            constants.insert(*name, value.to_owned());
        }
    }

    constants
}
