use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::Operand;
use crate::parse::ParseError;
use crate::types::{BindKeyword, Expression, Keyword};

/// Security strength factor for `ssf`, `0` through `256`.
///
/// ```
/// use aciv3::values::SecurityStrengthFactor;
///
/// let mut factor = SecurityStrengthFactor::default();
/// factor.set("MAX");
/// assert_eq!(factor.ge().to_string(), r#"ssf >= "256""#);
/// factor.set(128);
/// assert_eq!(factor.to_string(), "128");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SecurityStrengthFactor(u16);

impl SecurityStrengthFactor {
    pub const MAX: u16 = 256;

    #[must_use]
    pub fn new(factor: u16) -> Option<Self> {
        (factor <= Self::MAX).then_some(Self(factor))
    }

    /// Set from an integer or one of the words `none`/`off` (0) and
    /// `max`/`full` (256), case-insensitively. Anything else leaves the
    /// factor unchanged.
    pub fn set(&mut self, value: impl fmt::Display) -> &mut Self {
        let text = value.to_string();
        match Self::resolve(&text) {
            Some(factor) => *self = factor,
            None => debug!(value = %text, "security strength factor unchanged"),
        }
        self
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }

    fn resolve(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("none") || text.eq_ignore_ascii_case("off") {
            return Some(Self(0));
        }
        if text.eq_ignore_ascii_case("max") || text.eq_ignore_ascii_case("full") {
            return Some(Self(Self::MAX));
        }
        text.parse::<u16>().ok().and_then(Self::new)
    }
}

impl fmt::Display for SecurityStrengthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SecurityStrengthFactor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s).ok_or_else(|| {
            ParseError::new(format!("invalid security strength factor '{s}'"))
        })
    }
}

impl Operand for SecurityStrengthFactor {
    fn keyword(&self) -> Option<Keyword> {
        Some(Keyword::Bind(BindKeyword::Ssf))
    }

    fn expression(&self) -> Option<Expression> {
        Some(Expression::Value(self.to_string()))
    }
}

ordinal_conditions!(SecurityStrengthFactor);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_domain() {
        let mut factor = SecurityStrengthFactor::default();
        for i in 0..=256u16 {
            assert_eq!(factor.set(i).to_string(), i.to_string());
            assert_eq!(factor.set(i.to_string()).to_string(), i.to_string());
        }
    }

    #[test]
    fn words() {
        let mut factor = SecurityStrengthFactor::default();
        assert_eq!(factor.set("mAx").get(), 256);
        assert_eq!(factor.set("nOnE").get(), 0);
        assert_eq!(factor.set("full").get(), 256);
        assert_eq!(factor.set("OFF").get(), 0);
        assert_eq!(factor.set("fart").get(), 0);
        factor.set(128);
        assert_eq!(factor.set(257).get(), 128);
        assert_eq!(factor.set(-1).get(), 128);
    }

    #[test]
    fn all_six_operators() {
        let mut factor = SecurityStrengthFactor::default();
        factor.set(128);
        assert_eq!(factor.eq().to_string(), r#"ssf = "128""#);
        assert_eq!(factor.ne().to_string(), r#"ssf != "128""#);
        assert_eq!(factor.lt().to_string(), r#"ssf < "128""#);
        assert_eq!(factor.le().to_string(), r#"ssf <= "128""#);
        assert_eq!(factor.gt().to_string(), r#"ssf > "128""#);
        assert_eq!(factor.ge().to_string(), r#"ssf >= "128""#);
        assert_eq!(factor.operators().len(), 6);
    }

    #[test]
    fn parse_is_strict() {
        assert_eq!("full".parse::<SecurityStrengthFactor>().map(|f| f.get()).ok(), Some(256));
        assert!("300".parse::<SecurityStrengthFactor>().is_err());
        assert!("fast".parse::<SecurityStrengthFactor>().is_err());
    }
}
