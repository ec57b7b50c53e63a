use std::fmt;
use std::str::FromStr;

use super::Operand;
use crate::parse::ParseError;
use crate::types::{Expression, Keyword, TargetKeyword};

/// Search scope for `targetscope`. Only `=` is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchScope {
    Base,
    OneLevel,
    Subtree,
    Subordinate,
}

impl SearchScope {
    pub const ALL: [SearchScope; 4] = [
        SearchScope::Base,
        SearchScope::OneLevel,
        SearchScope::Subtree,
        SearchScope::Subordinate,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SearchScope::Base => "base",
            SearchScope::OneLevel => "onelevel",
            SearchScope::Subtree => "subtree",
            SearchScope::Subordinate => "subordinate",
        }
    }

    /// Case-insensitive. The short forms `one` and `sub` are accepted.
    #[must_use]
    pub fn matching(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("one") {
            return Some(SearchScope::OneLevel);
        }
        if text.eq_ignore_ascii_case("sub") {
            return Some(SearchScope::Subtree);
        }
        Self::ALL
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchScope {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::matching(s).ok_or_else(|| ParseError::new(format!("unknown search scope '{s}'")))
    }
}

impl Operand for SearchScope {
    fn keyword(&self) -> Option<Keyword> {
        Some(Keyword::Target(TargetKeyword::TargetScope))
    }

    fn expression(&self) -> Option<Expression> {
        Some(Expression::Value(self.as_str().to_owned()))
    }
}

equality_conditions!(SearchScope);
