use rustc_hash::FxHashMap;
use serde::Serialize;

/// A unique identifier for an interned identifier or string literal.
/// Interning keeps the syntax tree small and makes name comparisons O(1),
/// which the reducer relies on when it looks names up in the constant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StringId(u32);

pub type InternedString = StringId;

impl StringId {
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn from_u32(id: u32) -> Self {
        Self(id)
    }

    /// Compare this interned string with a string slice without allocating.
    /// Requires access to the StringTable that created this ID.
    pub fn eq_str(self, table: &StringTable, other: &str) -> bool {
        table.resolve(self) == other
    }

    pub fn resolve(self, table: &StringTable) -> &str {
        table.resolve(self)
    }
}

impl std::fmt::Display for StringId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StringId({})", self.0)
    }
}

/// Interning table for every name and string literal that appears in one
/// reduced function. The table travels with the reduced tree so the
/// downstream generator can resolve names back to text.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    // ID -> string storage for O(1) resolution
    strings: Vec<String>,

    // Reverse lookup for O(1) interning of repeated names
    string_to_id: FxHashMap<String, StringId>,
}

impl StringTable {
    pub fn new() -> Self {
        Self {
            strings: Vec::new(),
            string_to_id: FxHashMap::default(),
        }
    }

    /// Intern a string slice, returning its unique ID.
    /// Repeated strings always return the ID created on first sight.
    pub fn intern(&mut self, s: &str) -> InternedString {
        if let Some(&existing_id) = self.string_to_id.get(s) {
            return existing_id;
        }

        let new_id = StringId(self.strings.len() as u32);
        self.strings.push(s.to_owned());
        self.string_to_id.insert(s.to_owned(), new_id);
        new_id
    }

    /// Intern an owned String, avoiding a copy when the string is new
    pub fn get_or_intern(&mut self, s: String) -> InternedString {
        if let Some(&existing_id) = self.string_to_id.get(s.as_str()) {
            return existing_id;
        }

        let new_id = StringId(self.strings.len() as u32);
        self.string_to_id.insert(s.clone(), new_id);
        self.strings.push(s);
        new_id
    }

    pub fn resolve(&self, id: InternedString) -> &str {
        &self.strings[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
