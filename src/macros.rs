#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// `eprintln!` that only fires when `BRIAN_DEBUG_REWRITE` is set.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        if *$crate::DEBUG_REWRITE {
            eprintln!($($arg)*);
        }
    };
}
