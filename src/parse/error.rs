use std::fmt;

/// Malformed rule text.
///
/// `context` names the construct being parsed when the failure came from
/// one of the [`parse`](crate::parse) entry points, e.g. `"instruction"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    context: Option<&'static str>,
    message: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            context: None,
            message: message.into(),
        }
    }

    pub(crate) fn within(mut self, context: &'static str) -> Self {
        self.context.get_or_insert(context);
        self
    }

    #[must_use]
    pub fn context(&self) -> Option<&'static str> {
        self.context
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.context {
            Some(context) => write!(f, "malformed {context}: {}", self.message),
            None => write!(f, "parse error: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_message() {
        let err = ParseError::new("unexpected token");
        assert_eq!(err.to_string(), "parse error: unexpected token");
        assert_eq!(err.message(), "unexpected token");
        assert_eq!(err.context(), None);
    }

    #[test]
    fn first_context_wins() {
        let err = ParseError::new("missing ']'")
            .within("inheritance")
            .within("bind rule");
        assert_eq!(err.context(), Some("inheritance"));
        assert_eq!(err.to_string(), "malformed inheritance: missing ']'");
    }
}
