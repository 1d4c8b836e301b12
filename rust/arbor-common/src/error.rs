use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Contract violation on the caller's side: bad argument value.
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    /// Operation invoked in a state that does not permit it (e.g. writing
    /// to a full block buffer, reading past exhaustion).
    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    /// Malformed or truncated stored data; fatal for the cursor that hit it.
    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    /// Failure propagated unchanged from the storage backend.
    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

// No blanket From<std::io::Error>: backend failures must carry the context of
// the operation that hit them, so conversion always goes through `Error::io`.

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_io_error_carries_context() {
        let err = Error::io("block data", std::io::Error::other("disk gone"));
        let msg = err.to_string();
        assert!(msg.contains("block data"));
        assert!(msg.contains("disk gone"));
    }
}
