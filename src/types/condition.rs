use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::error::RuleError;
use super::stack::{Element, QuoteStyle, Stack};
use super::{ComparisonOperator, Keyword};
use crate::error::AciError;
use crate::values::{AttributeFilterOperation, AttributeType, DistinguishedName, ObjectIdentifier};

/// The right-hand side of a condition.
///
/// Single values are kept as their canonical text. Multi-valued expressions
/// keep their typed stack so the quote style can be switched after the fact.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Value(String),
    DistinguishedNames(Stack<DistinguishedName>),
    ObjectIdentifiers(Stack<ObjectIdentifier>),
    AttributeTypes(Stack<AttributeType>),
    AttributeFilterOperations(Stack<AttributeFilterOperation>),
}

impl Expression {
    #[must_use]
    pub fn quote_style(&self) -> QuoteStyle {
        match self {
            Expression::Value(_) => QuoteStyle::Outer,
            Expression::DistinguishedNames(s) => s.get_quote_style(),
            Expression::ObjectIdentifiers(s) => s.get_quote_style(),
            Expression::AttributeTypes(s) => s.get_quote_style(),
            Expression::AttributeFilterOperations(s) => s.get_quote_style(),
        }
    }

    /// Switch between outer and per-element quoting. Single values ignore it.
    pub fn set_quote_style(&mut self, style: QuoteStyle) {
        match self {
            Expression::Value(_) => {}
            Expression::DistinguishedNames(s) => {
                s.set_quote_style(style);
            }
            Expression::ObjectIdentifiers(s) => {
                s.set_quote_style(style);
            }
            Expression::AttributeTypes(s) => {
                s.set_quote_style(style);
            }
            Expression::AttributeFilterOperations(s) => {
                s.set_quote_style(style);
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Expression::Value(v) => v.is_empty(),
            Expression::DistinguishedNames(s) => s.is_empty(),
            Expression::ObjectIdentifiers(s) => s.is_empty(),
            Expression::AttributeTypes(s) => s.is_empty(),
            Expression::AttributeFilterOperations(s) => s.is_empty(),
        }
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        match self {
            Expression::Value(v) if v.is_empty() => Err(RuleError::NilOrZero { kind: "expression" }),
            Expression::Value(v) if v.contains('"') => Err(RuleError::invalid_value(
                "expression",
                v.as_str(),
                "values may not contain double quotes",
            )),
            Expression::Value(_) => Ok(()),
            Expression::DistinguishedNames(s) => s.validate(),
            Expression::ObjectIdentifiers(s) => s.validate(),
            Expression::AttributeTypes(s) => s.validate(),
            Expression::AttributeFilterOperations(s) => s.validate(),
        }
    }

    fn list_text(&self) -> Option<String> {
        match self {
            Expression::Value(_) => None,
            Expression::DistinguishedNames(s) => Some(s.to_string()),
            Expression::ObjectIdentifiers(s) => Some(s.to_string()),
            Expression::AttributeTypes(s) => Some(s.to_string()),
            Expression::AttributeFilterOperations(s) => Some(s.to_string()),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.list_text()) {
            (Expression::Value(v), _) => write!(f, "\"{v}\""),
            (_, Some(text)) if self.quote_style() == QuoteStyle::PerElement => f.write_str(&text),
            (_, text) => write!(f, "\"{}\"", text.unwrap_or_default()),
        }
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Expression::Value(value.to_owned())
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        Expression::Value(value)
    }
}

impl From<Stack<DistinguishedName>> for Expression {
    fn from(stack: Stack<DistinguishedName>) -> Self {
        Expression::DistinguishedNames(stack)
    }
}

impl From<Stack<ObjectIdentifier>> for Expression {
    fn from(stack: Stack<ObjectIdentifier>) -> Self {
        Expression::ObjectIdentifiers(stack)
    }
}

impl From<Stack<AttributeType>> for Expression {
    fn from(stack: Stack<AttributeType>) -> Self {
        Expression::AttributeTypes(stack)
    }
}

impl From<Stack<AttributeFilterOperation>> for Expression {
    fn from(stack: Stack<AttributeFilterOperation>) -> Self {
        Expression::AttributeFilterOperations(stack)
    }
}

/// A single `keyword operator "expression"` comparison.
///
/// Target conditions are parenthesised by default, bind conditions are not.
/// The zero value renders as an empty string and fails validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    keyword: Option<Keyword>,
    operator: Option<ComparisonOperator>,
    expression: Option<Expression>,
    paren: bool,
    padding: bool,
}

impl Condition {
    /// Build a condition. The operator is stored even when the keyword does
    /// not permit it; [`validate`](Self::validate) reports the mismatch.
    #[must_use]
    pub fn new(
        keyword: impl Into<Keyword>,
        operator: ComparisonOperator,
        expression: impl Into<Expression>,
    ) -> Self {
        let keyword = keyword.into();
        Self {
            keyword: Some(keyword),
            operator: Some(operator),
            expression: Some(expression.into()),
            paren: keyword.is_target(),
            padding: true,
        }
    }

    /// Build a condition and validate it.
    pub fn try_new(
        keyword: impl Into<Keyword>,
        operator: ComparisonOperator,
        expression: impl Into<Expression>,
    ) -> Result<Self, RuleError> {
        let condition = Self::new(keyword, operator, expression);
        condition.validate()?;
        Ok(condition)
    }

    #[must_use]
    pub fn paren(mut self, parenthesized: bool) -> Self {
        self.paren = parenthesized;
        self
    }

    #[must_use]
    pub fn padding(mut self, padded: bool) -> Self {
        self.padding = padded;
        self
    }

    #[must_use]
    pub fn quote_style(mut self, style: QuoteStyle) -> Self {
        self.set_quote_style(style);
        self
    }

    pub fn set_quote_style(&mut self, style: QuoteStyle) -> &mut Self {
        if let Some(expression) = self.expression.as_mut() {
            expression.set_quote_style(style);
        }
        self
    }

    pub fn set_paren(&mut self, parenthesized: bool) -> &mut Self {
        self.paren = parenthesized;
        self
    }

    pub fn set_keyword(&mut self, keyword: impl Into<Keyword>) -> &mut Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Change the operator. Operators the keyword does not permit are ignored.
    pub fn set_operator(&mut self, operator: ComparisonOperator) -> &mut Self {
        match self.keyword {
            Some(keyword) if keyword.permits(operator) => self.operator = Some(operator),
            _ => debug!(%operator, keyword = ?self.keyword, "operator change ignored"),
        }
        self
    }

    pub fn set_expression(&mut self, expression: impl Into<Expression>) -> &mut Self {
        self.expression = Some(expression.into());
        self
    }

    #[must_use]
    pub fn keyword(&self) -> Option<Keyword> {
        self.keyword
    }

    #[must_use]
    pub fn operator(&self) -> Option<ComparisonOperator> {
        self.operator
    }

    #[must_use]
    pub fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }

    #[must_use]
    pub fn is_parenthesized(&self) -> bool {
        self.paren
    }

    #[must_use]
    pub fn has_padding(&self) -> bool {
        self.padding
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.keyword.is_none() && self.operator.is_none() && self.expression.is_none()
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        let keyword = self.keyword.ok_or(RuleError::NilOrZero {
            kind: "condition keyword",
        })?;
        let operator = self.operator.ok_or(RuleError::NilOrZero {
            kind: "condition operator",
        })?;
        if !keyword.permits(operator) {
            return Err(RuleError::InvalidOperator { keyword, operator });
        }
        match &self.expression {
            Some(expression) if !expression.is_empty() => expression.validate(),
            _ => Err(RuleError::NilOrZero {
                kind: "condition expression",
            }),
        }
    }
}

impl Element for Condition {
    const KIND: &'static str = "condition";

    fn validate(&self) -> Result<(), RuleError> {
        Condition::validate(self)
    }

    fn bound_keyword(&self) -> Option<Keyword> {
        self.keyword
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(keyword), Some(operator)) = (self.keyword, self.operator) else {
            return Ok(());
        };
        let expression = self
            .expression
            .as_ref()
            .map_or_else(|| String::from("\"\""), ToString::to_string);
        match (self.paren, self.padding) {
            (true, true) => write!(f, "( {keyword} {operator} {expression} )"),
            (true, false) => write!(f, "({keyword}{operator}{expression})"),
            (false, true) => write!(f, "{keyword} {operator} {expression}"),
            (false, false) => write!(f, "{keyword}{operator}{expression}"),
        }
    }
}

impl FromStr for Condition {
    type Err = AciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::condition(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BindKeyword, TargetKeyword};

    #[test]
    fn target_conditions_are_parenthesized() {
        let c = Condition::new(
            TargetKeyword::Target,
            ComparisonOperator::Eq,
            "ldap:///cn=*,ou=People,dc=example,dc=com",
        );
        assert_eq!(
            c.to_string(),
            r#"( target = "ldap:///cn=*,ou=People,dc=example,dc=com" )"#
        );
        assert_eq!(
            c.padding(false).to_string(),
            r#"(target="ldap:///cn=*,ou=People,dc=example,dc=com")"#
        );
    }

    #[test]
    fn bind_conditions_are_bare() {
        let c = Condition::new(BindKeyword::Ssf, ComparisonOperator::Ge, "128");
        assert_eq!(c.to_string(), r#"ssf >= "128""#);
        assert_eq!(c.clone().paren(true).to_string(), r#"( ssf >= "128" )"#);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_condition() {
        let c = Condition::default();
        assert!(c.is_zero());
        assert_eq!(c.to_string(), "");
        assert_eq!(
            c.validate(),
            Err(RuleError::NilOrZero {
                kind: "condition keyword"
            })
        );
    }

    #[test]
    fn illegal_operator_fails_validation() {
        let c = Condition::new(TargetKeyword::TargetScope, ComparisonOperator::Ne, "base");
        assert!(matches!(c.validate(), Err(RuleError::InvalidOperator { .. })));
        assert!(Condition::try_new(BindKeyword::UserDn, ComparisonOperator::Gt, "x").is_err());
    }

    #[test]
    fn set_operator_ignores_illegal_values() {
        let mut c = Condition::new(BindKeyword::UserDn, ComparisonOperator::Eq, "ldap:///anyone");
        c.set_operator(ComparisonOperator::Ge);
        assert_eq!(c.operator(), Some(ComparisonOperator::Eq));
        c.set_operator(ComparisonOperator::Ne);
        assert_eq!(c.operator(), Some(ComparisonOperator::Ne));
    }

    #[test]
    fn empty_expression_is_invalid() {
        let c = Condition::new(BindKeyword::Dns, ComparisonOperator::Eq, "");
        assert_eq!(
            c.validate(),
            Err(RuleError::NilOrZero {
                kind: "condition expression"
            })
        );
    }

    #[test]
    fn quotes_in_values_are_rejected() {
        let c = Condition::new(BindKeyword::Dns, ComparisonOperator::Eq, r#"a"b"#);
        assert!(matches!(c.validate(), Err(RuleError::InvalidValue { .. })));
    }

    #[test]
    fn keyword_change() {
        let mut c = Condition::new(BindKeyword::UserDn, ComparisonOperator::Eq, "ldap:///all");
        c.set_keyword(BindKeyword::GroupDn);
        assert_eq!(c.keyword(), Some(Keyword::Bind(BindKeyword::GroupDn)));
        assert_eq!(c.to_string(), r#"groupdn = "ldap:///all""#);
    }
}
