use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::{is_identifier, AttributeBindTypeOrValue, Operand};
use crate::parse::ParseError;
use crate::types::{Expression, Keyword, RuleError};

const INVALID: &str = "<invalid_inheritance>";

/// One inheritance depth, `0` (the target entry itself) through `9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Level(u8);

impl Level {
    pub const MAX: u8 = 9;

    #[must_use]
    pub fn new(level: u8) -> Option<Self> {
        (level <= Self::MAX).then_some(Self(level))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inherited `userattr` / `groupattr` value:
/// `parent[<levels>].<attribute>#<bind type or value>`.
///
/// Levels keep the order they were given in. The zero value renders as
/// `<invalid_inheritance>`, so a failed parse is always visible in output.
///
/// ```
/// use aciv3::values::{AttributeBindTypeOrValue, BindType, Inheritance};
///
/// let manager = AttributeBindTypeOrValue::userattr("manager", BindType::UserDn);
/// let inh = Inheritance::new(manager, [0, 1, 2, 8]);
/// assert_eq!(inh.eq().to_string(), r#"userattr = "parent[0,1,2,8].manager#USERDN""#);
///
/// let parsed: Inheritance = "parent[0,5,9].manager#USERDN".parse().unwrap();
/// assert_eq!(parsed.to_string(), "parent[0,5,9].manager#USERDN");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Inheritance {
    levels: Vec<Level>,
    value: Option<AttributeBindTypeOrValue>,
}

impl Inheritance {
    /// Levels outside `0..=9` and repeated levels are skipped.
    #[must_use]
    pub fn new(value: AttributeBindTypeOrValue, levels: impl IntoIterator<Item = u8>) -> Self {
        let mut inh = Self {
            levels: Vec::new(),
            value: Some(value),
        };
        for level in levels {
            inh.push_level(level);
        }
        inh
    }

    pub fn try_new(
        value: AttributeBindTypeOrValue,
        levels: impl IntoIterator<Item = u8>,
    ) -> Result<Self, RuleError> {
        let mut inh = Self {
            levels: Vec::new(),
            value: Some(value),
        };
        for level in levels {
            inh.try_push_level(level)?;
        }
        inh.validate()?;
        Ok(inh)
    }

    /// Add a level. Invalid or repeated levels are ignored.
    pub fn push_level(&mut self, level: u8) -> &mut Self {
        if let Err(err) = self.try_push_level(level) {
            debug!(level, error = %err, "inheritance level rejected");
        }
        self
    }

    pub fn try_push_level(&mut self, level: u8) -> Result<(), RuleError> {
        let lvl = Level::new(level).ok_or_else(|| {
            RuleError::invalid_value("inheritance level", level.to_string(), "must be 0 through 9")
        })?;
        if self.levels.contains(&lvl) {
            return Err(RuleError::DuplicateValue {
                value: level.to_string(),
            });
        }
        self.levels.push(lvl);
        Ok(())
    }

    /// Whether `level` is one of the inherited levels.
    #[must_use]
    pub fn has_level(&self, level: u8) -> bool {
        self.levels.iter().any(|l| l.get() == level)
    }

    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[must_use]
    pub fn attribute_bind_type_or_value(&self) -> Option<&AttributeBindTypeOrValue> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn keyword(&self) -> Option<Keyword> {
        self.value.as_ref().map(AttributeBindTypeOrValue::keyword)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.levels.is_empty() && self.value.is_none()
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        let value = self
            .value
            .as_ref()
            .ok_or(RuleError::NilOrZero { kind: "inheritance" })?;
        if self.levels.is_empty() {
            return Err(RuleError::invalid_value(
                "inheritance",
                "parent[]",
                "at least one level is required",
            ));
        }
        value.validate()?;
        let attribute = value.attribute().as_str().unwrap_or_default();
        if !is_identifier(attribute) {
            return Err(RuleError::invalid_value(
                "inheritance",
                attribute,
                "attribute type is not an identifier",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Inheritance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(value) = self.value.as_ref().filter(|_| self.validate().is_ok()) else {
            return f.write_str(INVALID);
        };
        let levels: Vec<String> = self.levels.iter().map(ToString::to_string).collect();
        write!(f, "parent[{}].{value}", levels.join(","))
    }
}

impl FromStr for Inheritance {
    type Err = ParseError;

    /// Parse as a `userattr` value. Use
    /// [`parse::inheritance_for`](crate::parse::inheritance_for) for `groupattr`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::inheritance(s)
    }
}

impl Operand for Inheritance {
    fn keyword(&self) -> Option<Keyword> {
        Inheritance::keyword(self)
    }

    fn expression(&self) -> Option<Expression> {
        self.validate()
            .ok()
            .map(|()| Expression::Value(self.to_string()))
    }
}

equality_conditions!(Inheritance);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::BindType;
    use crate::ComparisonOperator;

    fn manager() -> AttributeBindTypeOrValue {
        AttributeBindTypeOrValue::userattr("manager", BindType::UserDn)
    }

    #[test]
    fn renders_levels_in_given_order() {
        let inh = Inheritance::new(manager(), [8, 0, 2, 1]);
        assert_eq!(inh.to_string(), "parent[8,0,2,1].manager#USERDN");
    }

    #[test]
    fn literal_values() {
        let uat = AttributeBindTypeOrValue::userattr("manager", "uid=frank,ou=People,dc=example,dc=com");
        let inh = Inheritance::new(uat, [1, 3]);
        assert_eq!(
            inh.eq().to_string(),
            r#"userattr = "parent[1,3].manager#uid=frank,ou=People,dc=example,dc=com""#
        );
    }

    #[test]
    fn groupattr_keyword_follows_value() {
        let gat = AttributeBindTypeOrValue::groupattr("owner", BindType::UserDn);
        let inh = Inheritance::new(gat, [3, 4]);
        assert_eq!(inh.eq().to_string(), r#"groupattr = "parent[3,4].owner#USERDN""#);
        assert_eq!(inh.ne().to_string(), r#"groupattr != "parent[3,4].owner#USERDN""#);
    }

    #[test]
    fn bad_levels_are_skipped() {
        let inh = Inheritance::new(manager(), [1, 1, 10, 255, 2]);
        assert_eq!(inh.levels(), &[Level(1), Level(2)]);
        assert!(inh.has_level(2));
        assert!(!inh.has_level(10));
        assert!(Inheritance::try_new(manager(), [1, 1]).is_err());
        assert!(Inheritance::try_new(manager(), [12]).is_err());
        assert!(Inheritance::try_new(manager(), []).is_err());
    }

    #[test]
    fn zero_value() {
        let inh = Inheritance::default();
        assert!(inh.is_zero());
        assert!(inh.validate().is_err());
        assert_eq!(inh.to_string(), INVALID);
        assert_eq!(inh.eq(), crate::Condition::default());
        assert_eq!(inh.ne(), crate::Condition::default());
    }

    #[test]
    fn only_equality_operators() {
        let inh = Inheritance::new(manager(), [0]);
        assert!(inh.condition(ComparisonOperator::Gt).is_zero());
        let ops: Vec<ComparisonOperator> = inh.operators().into_iter().map(|(op, _)| op).collect();
        assert_eq!(ops, vec![ComparisonOperator::Eq, ComparisonOperator::Ne]);
    }

    #[test]
    fn attribute_must_be_identifier() {
        let uat = AttributeBindTypeOrValue::userattr("Manager", BindType::UserDn);
        assert!(Inheritance::new(uat, [0]).validate().is_err());
    }
}
