use std::fmt;

/// Errors produced when parsing expression text.
#[derive(Debug)]
pub struct ParseError {
    message: String,
    offset: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }

    /// Byte offset into the input where parsing failed.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// What the parser expected or found at [`offset`](Self::offset).
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ParseError {}
