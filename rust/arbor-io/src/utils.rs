//! Input validation for the `std::io`-level backend implementations, which sit
//! below the workspace error type and speak `std::io::Error` directly.

/// Bails out of the enclosing function with an `InvalidInput` I/O error unless
/// the condition holds; the failed condition text becomes the error message.
#[macro_export]
macro_rules! verify {
    ($cond:expr) => {
        if !($cond) {
            return Err($crate::utils::input_violation(stringify!($cond)));
        }
    };
}

#[cold]
pub fn input_violation(condition: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        format!("input condition violated: {condition}"),
    )
}
