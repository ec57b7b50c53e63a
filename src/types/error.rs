use thiserror::Error;

use super::{ComparisonOperator, Keyword};

/// Errors reported while building or validating rules.
///
/// Construction and mutation are fail-soft: these errors surface through
/// `validate()` and the `try_*` methods rather than aborting a build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("comparison operator '{operator}' is not permitted for keyword '{keyword}'")]
    InvalidOperator {
        keyword: Keyword,
        operator: ComparisonOperator,
    },

    #[error("{kind} instance is nil or zero")]
    NilOrZero { kind: &'static str },

    #[error("{kind} requires at least {minimum} element(s), found {found}")]
    Population {
        kind: String,
        minimum: usize,
        found: usize,
    },

    #[error("keyword '{keyword}' is already present")]
    DuplicateKeyword { keyword: Keyword },

    #[error("value '{value}' is already present")]
    DuplicateValue { value: String },

    #[error("keyword '{keyword}' cannot be used in {context}")]
    WrongContext {
        keyword: Keyword,
        context: &'static str,
    },

    #[error("capacity of {capacity} element(s) exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("nested stacks are not permitted in {context}")]
    NestingDisallowed { context: String },

    #[error("index {index} is out of range")]
    OutOfRange { index: usize },

    #[error("invalid {kind} '{value}': {reason}")]
    InvalidValue {
        kind: &'static str,
        value: String,
        reason: String,
    },
}

impl RuleError {
    pub(crate) fn invalid_value(
        kind: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RuleError::InvalidValue {
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BindKeyword, TargetKeyword};

    #[test]
    fn invalid_operator_message() {
        let err = RuleError::InvalidOperator {
            keyword: Keyword::Target(TargetKeyword::TargetScope),
            operator: ComparisonOperator::Ne,
        };
        assert_eq!(
            err.to_string(),
            "comparison operator '!=' is not permitted for keyword 'targetscope'"
        );
    }

    #[test]
    fn nil_or_zero_message() {
        let err = RuleError::NilOrZero { kind: "Inheritance" };
        assert_eq!(err.to_string(), "Inheritance instance is nil or zero");
    }

    #[test]
    fn population_message() {
        let err = RuleError::Population {
            kind: "AND stack".into(),
            minimum: 1,
            found: 0,
        };
        assert_eq!(
            err.to_string(),
            "AND stack requires at least 1 element(s), found 0"
        );
    }

    #[test]
    fn duplicate_keyword_message() {
        let err = RuleError::DuplicateKeyword {
            keyword: Keyword::Target(TargetKeyword::Target),
        };
        assert_eq!(err.to_string(), "keyword 'target' is already present");
    }

    #[test]
    fn wrong_context_message() {
        let err = RuleError::WrongContext {
            keyword: Keyword::Bind(BindKeyword::UserDn),
            context: "target rules",
        };
        assert_eq!(err.to_string(), "keyword 'userdn' cannot be used in target rules");
    }

    #[test]
    fn invalid_value_message() {
        let err = RuleError::invalid_value("time of day", "2500", "hour out of range");
        assert_eq!(
            err.to_string(),
            "invalid time of day '2500': hour out of range"
        );
    }
}
