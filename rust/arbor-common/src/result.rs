//! Result alias and the verification macros enforcing the error taxonomy.

/// Workspace-wide result type carrying [`crate::error::Error`].
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Bails out of the enclosing function with
/// [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) unless the
/// condition holds. The failed condition text becomes the error message, so
/// callers pass the raw predicate rather than a prose description.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $cond:expr) => {
        if !($cond) {
            return Err($crate::result::arg_violation(
                stringify!($name),
                stringify!($cond),
            ));
        }
    };
}

/// Counterpart of [`verify_arg!`] for stored data: bails with
/// [`InvalidFormat`](crate::error::ErrorKind::InvalidFormat), naming the
/// on-disk element whose framing was violated.
#[macro_export]
macro_rules! verify_data {
    ($element:expr, $cond:expr) => {
        if !($cond) {
            return Err($crate::result::format_violation(
                stringify!($element),
                stringify!($cond),
            ));
        }
    };
}

#[cold]
pub fn arg_violation(name: &str, condition: &str) -> crate::error::Error {
    crate::error::Error::invalid_arg(name, condition)
}

#[cold]
pub fn format_violation(element: &str, condition: &str) -> crate::error::Error {
    crate::error::Error::invalid_format(element, condition)
}

#[cfg(test)]
mod tests {
    use crate::{Result, error::ErrorKind};

    fn check_len(len: usize) -> Result<()> {
        verify_arg!(len, len > 0);
        Ok(())
    }

    fn check_magic(magic: u8) -> Result<()> {
        verify_data!("header", magic == 0xA7);
        Ok(())
    }

    #[test]
    fn test_verify_arg() {
        assert!(check_len(1).is_ok());
        let err = check_len(0).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert!(err.to_string().contains("len > 0"));
    }

    #[test]
    fn test_verify_data() {
        assert!(check_magic(0xA7).is_ok());
        let err = check_magic(0).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));
    }
}
