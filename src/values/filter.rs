use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::{AttributeType, Operand};
use crate::parse::ParseError;
use crate::types::{
    Category, Delimiter, Element, Expression, Keyword, PushPolicy, RuleError, Stack, StackKind,
    TargetKeyword,
};
use crate::Config;

const TARGET_ATTR_FILTERS: Keyword = Keyword::Target(TargetKeyword::TargetAttrFilters);

fn check_filter(raw: &str) -> Result<String, RuleError> {
    let filter = raw.trim();
    if !(filter.starts_with('(') && filter.ends_with(')')) || filter.len() < 3 {
        return Err(RuleError::invalid_value(
            "filter",
            raw,
            "must be a non-empty parenthesized expression",
        ));
    }
    if filter.contains('"') {
        return Err(RuleError::invalid_value("filter", raw, "contains a double quote"));
    }
    let mut depth = 0usize;
    for (i, c) in filter.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    RuleError::invalid_value("filter", raw, "unbalanced parentheses")
                })?;
                if depth == 0 && i + 1 != filter.len() {
                    return Err(RuleError::invalid_value(
                        "filter",
                        raw,
                        "more than one top-level expression",
                    ));
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(RuleError::invalid_value("filter", raw, "unbalanced parentheses"));
    }
    Ok(filter.to_owned())
}

/// An LDAP search filter for `targetfilter`, e.g. `(objectClass=person)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Filter(Option<String>);

impl Filter {
    #[must_use]
    pub fn new(filter: &str) -> Self {
        Self(
            check_filter(filter)
                .map_err(|err| debug!(error = %err, "invalid filter"))
                .ok(),
        )
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        match self.0 {
            Some(_) => Ok(()),
            None => Err(RuleError::NilOrZero { kind: "filter" }),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or("<invalid_filter>"))
    }
}

impl FromStr for Filter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_filter(s)
            .map(|filter| Self(Some(filter)))
            .map_err(|err| ParseError::new(err.to_string()))
    }
}

impl Operand for Filter {
    fn keyword(&self) -> Option<Keyword> {
        Some(Keyword::Target(TargetKeyword::TargetFilter))
    }

    fn expression(&self) -> Option<Expression> {
        self.0.clone().map(Expression::Value)
    }
}

equality_conditions!(Filter);

/// `attr:(filter)`, one term of an attribute filter operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeFilter {
    attribute: AttributeType,
    filter: Filter,
}

impl AttributeFilter {
    #[must_use]
    pub fn new(attribute: &str, filter: &str) -> Self {
        Self {
            attribute: AttributeType::new(attribute),
            filter: Filter::new(filter),
        }
    }

    #[must_use]
    pub fn attribute(&self) -> &AttributeType {
        &self.attribute
    }

    #[must_use]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        self.attribute.validate()?;
        if self.attribute.as_str() == Some("*") {
            return Err(RuleError::invalid_value(
                "attribute filter",
                "*",
                "a concrete attribute type is required",
            ));
        }
        self.filter.validate()
    }
}

impl fmt::Display for AttributeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.validate().is_err() {
            return f.write_str("<invalid_attribute_filter>");
        }
        write!(f, "{}:{}", self.attribute, self.filter)
    }
}

impl Element for AttributeFilter {
    const KIND: &'static str = "attribute filter";

    fn validate(&self) -> Result<(), RuleError> {
        AttributeFilter::validate(self)
    }
}

/// The LDAP operation an attribute filter operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeOperation {
    Add,
    Delete,
}

impl AttributeOperation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeOperation::Add => "add",
            AttributeOperation::Delete => "delete",
        }
    }

    /// Case-insensitive; `del` is accepted for `delete`.
    #[must_use]
    pub fn matching(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("add") {
            Some(AttributeOperation::Add)
        } else if text.eq_ignore_ascii_case("delete") || text.eq_ignore_ascii_case("del") {
            Some(AttributeOperation::Delete)
        } else {
            None
        }
    }
}

impl fmt::Display for AttributeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `add=attr:(filter) && attr:(filter)` or the `delete=` equivalent.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeFilterOperation {
    operation: AttributeOperation,
    filters: Stack<AttributeFilter>,
}

/// A list of attribute filter operations for `targetattrfilters`, delimited
/// by `,` by default or `;`.
pub type AttributeFilterOperations = Stack<AttributeFilterOperation>;

impl AttributeFilterOperation {
    #[must_use]
    pub fn new(operation: AttributeOperation) -> Self {
        Self {
            operation,
            filters: Stack::new(StackKind::List, Category::AttributeFilters)
                .nesting(false)
                .minimum(1)
                .delimiter(Delimiter::DoubleAmpersand)
                .policy(PushPolicy::TypeOnly),
        }
    }

    #[must_use]
    pub fn add() -> Self {
        Self::new(AttributeOperation::Add)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::new(AttributeOperation::Delete)
    }

    #[must_use]
    pub fn with(mut self, filter: AttributeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn push(&mut self, filter: AttributeFilter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn operation(&self) -> AttributeOperation {
        self.operation
    }

    #[must_use]
    pub fn filters(&self) -> &Stack<AttributeFilter> {
        &self.filters
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        self.filters.validate()
    }
}

impl fmt::Display for AttributeFilterOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.validate().is_err() {
            return f.write_str("<invalid_attribute_filter_operation>");
        }
        write!(f, "{}={}", self.operation, self.filters)
    }
}

impl Element for AttributeFilterOperation {
    const KIND: &'static str = "attribute filter operation";

    fn validate(&self) -> Result<(), RuleError> {
        AttributeFilterOperation::validate(self)
    }

    fn bound_keyword(&self) -> Option<Keyword> {
        Some(TARGET_ATTR_FILTERS)
    }
}

impl Operand for AttributeFilterOperation {
    fn keyword(&self) -> Option<Keyword> {
        Some(TARGET_ATTR_FILTERS)
    }

    fn expression(&self) -> Option<Expression> {
        self.validate()
            .ok()
            .map(|()| Expression::Value(self.to_string()))
    }
}

equality_conditions!(AttributeFilterOperation);

impl Stack<AttributeFilterOperation> {
    /// Empty comma-delimited list. Switch to `;` with
    /// [`set_delimiter`](Stack::set_delimiter).
    #[must_use]
    pub fn attribute_filter_operations() -> Self {
        Self::attribute_filter_operations_with(&Config::default())
    }

    #[must_use]
    pub fn attribute_filter_operations_with(config: &Config) -> Self {
        Stack::new(StackKind::List, Category::Values(TARGET_ATTR_FILTERS))
            .nesting(false)
            .minimum(1)
            .delimiter(Delimiter::Comma)
            .policy(PushPolicy::TypeOnly)
            .padding(config.has_stack_padding())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee_add() -> AttributeFilterOperation {
        AttributeFilterOperation::add()
            .with(AttributeFilter::new("objectClass", "(objectClass=employee)"))
            .with(AttributeFilter::new("cn", "(cn=*)"))
    }

    #[test]
    fn filters() {
        assert!(!Filter::new("(&(objectClass=person)(uid=*))").is_zero());
        for bad in ["", "()", "objectClass=person", "(a))(", "(a)(b)", "((a)", r#"(cn="x")"#] {
            assert!(Filter::new(bad).is_zero(), "{bad} should be rejected");
        }
        assert_eq!(
            Filter::new("(objectClass=*)").ne().to_string(),
            r#"( targetfilter != "(objectClass=*)" )"#
        );
        assert!("(uid=x".parse::<Filter>().is_err());
    }

    #[test]
    fn attribute_filter() {
        let af = AttributeFilter::new("nsroleDN", "(!(nsroledn=cn=superAdmin))");
        assert_eq!(af.to_string(), "nsroleDN:(!(nsroledn=cn=superAdmin))");
        assert!(AttributeFilter::new("*", "(cn=*)").validate().is_err());
        assert_eq!(
            AttributeFilter::new("cn", "cn=*").to_string(),
            "<invalid_attribute_filter>"
        );
    }

    #[test]
    fn operation_renders_and_list() {
        assert_eq!(
            employee_add().to_string(),
            "add=objectClass:(objectClass=employee) && cn:(cn=*)"
        );
        assert_eq!(
            employee_add().eq().to_string(),
            r#"( targetattrfilters = "add=objectClass:(objectClass=employee) && cn:(cn=*)" )"#
        );
        assert!(employee_add().ne().is_zero());
    }

    #[test]
    fn empty_operation_is_invalid() {
        let op = AttributeFilterOperation::delete();
        assert!(op.validate().is_err());
        assert_eq!(op.to_string(), "<invalid_attribute_filter_operation>");
        assert!(op.eq().is_zero());
    }

    #[test]
    fn operations_list_delimiters() {
        let del = AttributeFilterOperation::delete()
            .with(AttributeFilter::new("telephoneNumber", "(telephoneNumber=123*)"));
        let mut list = AttributeFilterOperations::attribute_filter_operations()
            .with(employee_add())
            .with(del);
        assert_eq!(
            list.eq().to_string(),
            r#"( targetattrfilters = "add=objectClass:(objectClass=employee) && cn:(cn=*),delete=telephoneNumber:(telephoneNumber=123*)" )"#
        );
        list.set_delimiter(Delimiter::Semicolon);
        assert_eq!(
            list.to_string(),
            "add=objectClass:(objectClass=employee) && cn:(cn=*);delete=telephoneNumber:(telephoneNumber=123*)"
        );
    }

    #[test]
    fn operation_names() {
        assert_eq!(AttributeOperation::matching("DEL"), Some(AttributeOperation::Delete));
        assert_eq!(AttributeOperation::matching("Add"), Some(AttributeOperation::Add));
        assert_eq!(AttributeOperation::matching("modify"), None);
    }
}
