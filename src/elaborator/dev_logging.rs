// AST LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_ast")]
macro_rules! ast_log {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_ast"))]
macro_rules! ast_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// FOLDING LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_folding")]
macro_rules! fold_log {
    ($($arg:tt)*) => {
        eprintln!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_folding"))]
macro_rules! fold_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}
