use std::fmt;
use std::str::FromStr;

/// Comparison operators available to target and bind rule conditions.
///
/// Which operators a given condition may use is decided by its keyword; see
/// [`Keyword::permitted_operators`](super::Keyword::permitted_operators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComparisonOperator {
    Eq = 1,
    Ne = 2,
    Lt = 3,
    Le = 4,
    Gt = 5,
    Ge = 6,
}

impl ComparisonOperator {
    /// All operators in ordinal order.
    pub const ALL: [ComparisonOperator; 6] = [
        ComparisonOperator::Eq,
        ComparisonOperator::Ne,
        ComparisonOperator::Lt,
        ComparisonOperator::Le,
        ComparisonOperator::Gt,
        ComparisonOperator::Ge,
    ];

    /// The symbol used in rule text, e.g. `">="`.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Le => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Ge => ">=",
        }
    }

    /// The short context name, e.g. `"Ge"`.
    #[must_use]
    pub fn context(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "Eq",
            ComparisonOperator::Ne => "Ne",
            ComparisonOperator::Lt => "Lt",
            ComparisonOperator::Le => "Le",
            ComparisonOperator::Gt => "Gt",
            ComparisonOperator::Ge => "Ge",
        }
    }

    /// The long description, e.g. `"Greater Than Or Equal"`.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "Equal To",
            ComparisonOperator::Ne => "Not Equal To",
            ComparisonOperator::Lt => "Less Than",
            ComparisonOperator::Le => "Less Than Or Equal",
            ComparisonOperator::Gt => "Greater Than",
            ComparisonOperator::Ge => "Greater Than Or Equal",
        }
    }

    /// Resolve an operator from its symbol, context name or description.
    /// Case is not significant.
    #[must_use]
    pub fn matching(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|op| {
            op.symbol() == text
                || op.context().eq_ignore_ascii_case(text)
                || op.description().eq_ignore_ascii_case(text)
        })
    }

    /// Resolve an operator from its ordinal (`1..=6`).
    #[must_use]
    pub fn from_ordinal(n: u8) -> Option<Self> {
        match n {
            1..=6 => Some(Self::ALL[usize::from(n - 1)]),
            _ => None,
        }
    }

    /// Whether this operator only makes sense for ordered values.
    #[must_use]
    pub fn is_ordinal(self) -> bool {
        !matches!(self, ComparisonOperator::Eq | ComparisonOperator::Ne)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOperator {
    type Err = crate::parse::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::matching(s).ok_or_else(|| {
            crate::parse::ParseError::new(format!("unknown comparison operator '{s}'"))
        })
    }
}
