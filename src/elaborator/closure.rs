use crate::elaborator::elaborator_errors::ElabError;
use crate::elaborator::func_def::{CaptureCell, FuncDef};
use crate::elaborator::string_interning::{InternedString, StringTable};
use crate::return_closure_error;
use rustc_hash::FxHashMap;

pub type ClosureBindings = FxHashMap<InternedString, CaptureCell>;

// The closure resolver: reads the capture record into a name-keyed map.
// Every free variable must resolve before any folding starts. One walk
// collects every unbound cell so the error can report the complete list,
// not just the first failure.
pub fn resolve_captures(
    func: &FuncDef,
    string_table: &mut StringTable,
) -> Result<ClosureBindings, ElabError> {
    let mut bindings = ClosureBindings::default();
    let mut unresolved: Vec<String> = Vec::new();

    for binding in &func.captures {
        match &binding.cell {
            CaptureCell::Unbound => unresolved.push(binding.name.to_owned()),
            cell => {
                let id = string_table.intern(&binding.name);
                bindings.insert(id, cell.to_owned());
            }
        }
    }

    if !unresolved.is_empty() {
        unresolved.sort();
        return_closure_error!(unresolved, &func.name);
    }

    // A function with no free variables is an empty map, not an error
    Ok(bindings)
}
