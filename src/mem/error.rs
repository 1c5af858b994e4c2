use super::{Address, Scene};

/// Execution point an error was raised at.
pub type Location = Option<(Scene, Address)>;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    location: Location,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::mem::Error::new($crate::mem::ErrorCode::$err)
    };
    ($err:ident, $loc:expr) => {
        $crate::mem::Error::new($crate::mem::ErrorCode::$err).in_location($loc)
    };
    ($err:ident; $msg:expr) => {
        $crate::mem::Error::new($crate::mem::ErrorCode::$err).message($msg)
    };
    ($err:ident, $loc:expr; $msg:expr) => {
        $crate::mem::Error::new($crate::mem::ErrorCode::$err)
            .in_location($loc)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            location: None,
            message: String::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn text(&self) -> &str {
        &self.message
    }

    pub fn in_location(self, location: Location) -> Error {
        debug_assert!(self.location.is_none());
        Error { location, ..self }
    }

    pub fn message(self, message: &str) -> Error {
        debug_assert!(self.message.is_empty());
        Error {
            message: message.to_string(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    IndexOutOfRange,
    InvalidBank,
    MalformedIndex,
    CallStackMismatch,
    CallStackOverflow,
    CorruptData,
    DoubleInitialization,
    DiskIoError,
    UnknownOpcode,
    TypeMismatch,
    InternalError,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        use ErrorCode::*;
        match self {
            IndexOutOfRange => "INDEX OUT OF RANGE",
            InvalidBank => "INVALID BANK",
            MalformedIndex => "MALFORMED INDEX",
            CallStackMismatch => "CALL STACK MISMATCH",
            CallStackOverflow => "CALL STACK OVERFLOW",
            CorruptData => "CORRUPT DATA",
            DoubleInitialization => "DOUBLE INITIALIZATION",
            DiskIoError => "DISK I/O ERROR",
            UnknownOpcode => "UNKNOWN OPCODE",
            TypeMismatch => "TYPE MISMATCH",
            InternalError => "INTERNAL ERROR",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        let msg = error.to_string();
        match error.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData => {
                error!(CorruptData; &msg)
            }
            _ => error!(DiskIoError; &msg),
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut suffix = String::new();
        if let Some((scene, pc)) = self.location {
            suffix.push_str(&format!(" SCENE {} PC {}", scene, pc));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        if suffix.is_empty() {
            write!(f, "{}", self.code.as_str())
        } else if self.location.is_some() {
            write!(f, "{} IN{}", self.code.as_str(), suffix)
        } else {
            write!(f, "{}{}", self.code.as_str(), suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(error!(CorruptData).to_string(), "CORRUPT DATA");
        assert_eq!(
            error!(CallStackMismatch, Some((5, 12)); "RETURN WITHOUT GOSUB").to_string(),
            "CALL STACK MISMATCH IN SCENE 5 PC 12; RETURN WITHOUT GOSUB"
        );
        assert_eq!(
            error!(InvalidBank; "BANK X").to_string(),
            "INVALID BANK; BANK X"
        );
    }

    #[test]
    fn test_code_text_is_distinct() {
        use ErrorCode::*;
        let codes = [
            IndexOutOfRange,
            InvalidBank,
            MalformedIndex,
            CallStackMismatch,
            CallStackOverflow,
            CorruptData,
            DoubleInitialization,
            DiskIoError,
            UnknownOpcode,
            TypeMismatch,
            InternalError,
        ];
        let text: std::collections::HashSet<&str> = codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(text.len(), codes.len());
    }

    #[test]
    fn test_truncated_stream_is_corrupt() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        assert_eq!(Error::from(io).code(), ErrorCode::CorruptData);
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad frame");
        assert_eq!(Error::from(io).code(), ErrorCode::CorruptData);
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(Error::from(io).code(), ErrorCode::DiskIoError);
    }
}
