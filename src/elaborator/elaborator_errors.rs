use crate::elaborator::parsers::tokens::TextLocation;
use std::collections::HashMap;

// Keys for structured error metadata.
// Kept as an enum so stages can't invent ad-hoc keys that
// downstream tooling doesn't know how to display.
#[derive(Debug, Eq, Hash, PartialEq)]
pub enum ErrorMetaDataKey {
    FunctionName,
    ElaborationStage,

    // Optional suggestions
    PrimarySuggestion,
    SuggestedReplacement,
}

#[derive(Debug)]
pub struct ElabError {
    pub msg: String,

    // Position inside the function body being reduced.
    // Extraction errors that happen before any token exists use the default location.
    pub location: TextLocation,
    pub error_type: ErrorType,

    // The complete list of closure names that could not be resolved.
    // Only populated for ErrorType::UnresolvedClosure.
    pub unresolved_names: Vec<String>,

    // Structured details for tooling that wants more than the message string
    pub metadata: HashMap<ErrorMetaDataKey, String>,
}

impl ElabError {
    pub fn new(msg: impl Into<String>, location: TextLocation, error_type: ErrorType) -> ElabError {
        ElabError {
            msg: msg.into(),
            location,
            error_type,
            unresolved_names: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_function_name(mut self, name: &str) -> Self {
        self.metadata
            .insert(ErrorMetaDataKey::FunctionName, name.to_owned());
        self
    }

    pub fn new_metadata_entry(&mut self, key: ErrorMetaDataKey, value: impl Into<String>) {
        self.metadata.insert(key, value.into());
    }

    /// Create a new parse error for a definition that could not be
    /// retrieved, normalized or parsed into a single function tree
    pub fn new_parse_error(msg: impl Into<String>, location: TextLocation) -> Self {
        ElabError {
            msg: msg.into(),
            location,
            error_type: ErrorType::Parse,
            unresolved_names: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Create a new closure resolution error carrying every unresolved name.
    /// The message already hints that the names may be declared after the function.
    pub fn new_closure_error(unresolved_names: Vec<String>) -> Self {
        ElabError {
            msg: format!(
                "Use of undefined variables: {}. Maybe declared after the function?",
                unresolved_names.join(", ")
            ),
            location: TextLocation::default(),
            error_type: ErrorType::UnresolvedClosure,
            unresolved_names,
            metadata: HashMap::new(),
        }
    }

    /// Create a new error for an inlining target with an unsupported shape
    pub fn new_inline_error(msg: impl Into<String>, location: TextLocation) -> Self {
        ElabError {
            msg: msg.into(),
            location,
            error_type: ErrorType::InlineUnsupported,
            unresolved_names: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Internal invariant violation (a bug in sprig, not in the caller's function)
    pub fn internal_error(msg: impl Into<String>) -> Self {
        ElabError {
            msg: msg.into(),
            location: TextLocation::default(),
            error_type: ErrorType::Internal,
            unresolved_names: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}

// The error taxonomy of the reduction pipeline.
// Parse and UnresolvedClosure are structural: they abort the whole
// reduction for that function. Folding failures inside expressions are
// never errors, the node is simply left unfolded.
#[derive(PartialEq, Debug)]
pub enum ErrorType {
    Parse,
    UnresolvedClosure,
    InlineUnsupported,
    Internal,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::Parse => "Parse Error",
        ErrorType::UnresolvedClosure => "Unresolved Closure",
        ErrorType::InlineUnsupported => "Unsupported Inline Target",
        ErrorType::Internal => "Sprig Bug",
    }
}

impl std::fmt::Display for ElabError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} (line {})",
            error_type_to_str(&self.error_type),
            self.msg,
            self.location.start_pos.line_number
        )
    }
}

impl std::error::Error for ElabError {}

/// Returns a new ElabError for definitions that can't be normalized or parsed.
///
/// Usage:
/// `return_parse_error!("message", location)`;
/// `return_parse_error!("message", location, { PrimarySuggestion => "try this" })`;
#[macro_export]
macro_rules! return_parse_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::elaborator::elaborator_errors::ElabError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::elaborator::elaborator_errors::ErrorType::Parse,
            unresolved_names: Vec::new(),
            metadata: {
                let mut map = std::collections::HashMap::new();
                $(
                    map.insert($crate::elaborator::elaborator_errors::ErrorMetaDataKey::$key, String::from($value));
                )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::elaborator::elaborator_errors::ElabError::new_parse_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new ElabError listing every closure name that failed to resolve.
///
/// Usage:
/// `return_closure_error!(vec!["y".to_string()])`;
/// `return_closure_error!(names, "function_name")`;
#[macro_export]
macro_rules! return_closure_error {
    ($names:expr, $func_name:expr) => {
        return Err(
            $crate::elaborator::elaborator_errors::ElabError::new_closure_error($names)
                .with_function_name($func_name),
        )
    };
    ($names:expr) => {
        return Err($crate::elaborator::elaborator_errors::ElabError::new_closure_error($names))
    };
}

/// Returns a new ElabError for inlining targets the inliner refuses to touch.
///
/// Usage: `return_inline_error!("message", location)`;
#[macro_export]
macro_rules! return_inline_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::elaborator::elaborator_errors::ElabError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::elaborator::elaborator_errors::ErrorType::InlineUnsupported,
            unresolved_names: Vec::new(),
            metadata: {
                let mut map = std::collections::HashMap::new();
                $(
                    map.insert($crate::elaborator::elaborator_errors::ErrorMetaDataKey::$key, String::from($value));
                )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::elaborator::elaborator_errors::ElabError::new_inline_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new ElabError for states the pipeline should never reach
#[macro_export]
macro_rules! return_internal_error {
    ($($arg:tt)*) => {
        return Err($crate::elaborator::elaborator_errors::ElabError::internal_error(
            format!($($arg)*),
        ))
    };
}
