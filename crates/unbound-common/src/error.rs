use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnboundError {
    #[error("{line:?} is not a valid key-value pair")]
    MalformedLine { line: String },
    #[error("invalid value for {key}: {value:?} is not a valid {expected}")]
    NumericParse {
        key: String,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read stats stream: {0}")]
    StreamRead(#[from] std::io::Error),
    #[error("invalid key pattern for metric {metric}: {reason}")]
    InvalidPattern { metric: String, reason: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl UnboundError {
    pub fn malformed_line(line: &str) -> Self {
        Self::MalformedLine {
            line: line.to_string(),
        }
    }

    pub fn numeric_parse(key: &str, value: &str, expected: &'static str) -> Self {
        Self::NumericParse {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    /// Stable identifier for structured log fields.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::MalformedLine { .. } => "MalformedLine",
            Self::NumericParse { .. } => "NumericParse",
            Self::StreamRead(_) => "StreamRead",
            Self::InvalidPattern { .. } => "InvalidPattern",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::InvalidConfig(_) => "InvalidConfig",
        }
    }

    /// Errors raised while scanning a stats dump. Any of them aborts the
    /// collection pass.
    pub fn aborts_pass(&self) -> bool {
        matches!(
            self,
            Self::MalformedLine { .. } | Self::NumericParse { .. } | Self::StreamRead(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, UnboundError>;

#[cfg(test)]
mod tests {
    use super::UnboundError;

    #[test]
    fn malformed_line_message_quotes_input() {
        let err = UnboundError::malformed_line("a=b=c");
        assert_eq!(err.to_string(), "\"a=b=c\" is not a valid key-value pair");
        assert_eq!(err.error_class(), "MalformedLine");
    }

    #[test]
    fn scan_errors_abort_pass() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "closed");
        assert!(UnboundError::from(io).aborts_pass());
        assert!(
            UnboundError::numeric_parse("total.recursion.time.avg", "x", "float").aborts_pass()
        );
        assert!(!UnboundError::InvalidConfig("bad".to_string()).aborts_pass());
    }
}
