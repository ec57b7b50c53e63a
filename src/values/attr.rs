use std::fmt;

use tracing::debug;

use super::Operand;
use crate::types::{
    BindKeyword, Category, Delimiter, Element, Expression, Keyword, PushPolicy, RuleError, Stack,
    StackKind, TargetKeyword,
};
use crate::Config;

/// Whether `val` is an attribute identifier: a lowercase letter first,
/// alphanumerics, hyphens or semicolons after, and an alphanumeric last.
pub(crate) fn is_identifier(val: &str) -> bool {
    let bytes = val.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_lowercase()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b';'))
        }
        _ => false,
    }
}

fn is_attribute_name(val: &str) -> bool {
    if val == "*" {
        return true;
    }
    let bytes = val.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphabetic()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b';'))
        }
        _ => false,
    }
}

/// An LDAP attribute type name, optionally tagged (`cn;lang-en`), or `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AttributeType(Option<String>);

/// A `||`-delimited list of attribute types for `targetattr`.
pub type AttributeTypes = Stack<AttributeType>;

impl AttributeType {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        if is_attribute_name(name) {
            Self(Some(name.to_owned()))
        } else {
            debug!(name, "invalid attribute type");
            Self(None)
        }
    }

    /// `*`, every attribute.
    #[must_use]
    pub fn all() -> Self {
        Self(Some("*".to_owned()))
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
            None => Err(RuleError::NilOrZero {
                kind: "attribute type",
            }),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or("<invalid_attribute_type>"))
    }
}

impl Element for AttributeType {
    const KIND: &'static str = "attribute type";

    fn validate(&self) -> Result<(), RuleError> {
        AttributeType::validate(self)
    }
}

impl Operand for AttributeType {
    fn keyword(&self) -> Option<Keyword> {
        Some(Keyword::Target(TargetKeyword::TargetAttr))
    }

    fn expression(&self) -> Option<Expression> {
        self.0.clone().map(Expression::Value)
    }
}

equality_conditions!(AttributeType);

impl Stack<AttributeType> {
    /// Empty `targetattr` list.
    #[must_use]
    pub fn attribute_types() -> Self {
        Self::attribute_types_with(&Config::default())
    }

    #[must_use]
    pub fn attribute_types_with(config: &Config) -> Self {
        Stack::new(
            StackKind::List,
            Category::Values(Keyword::Target(TargetKeyword::TargetAttr)),
        )
        .nesting(false)
        .minimum(1)
        .delimiter(Delimiter::DoublePipe)
        .policy(PushPolicy::TypeOnly)
        .padding(config.has_stack_padding())
    }

    pub fn push_attr(&mut self, name: &str) -> &mut Self {
        self.push(AttributeType::new(name))
    }
}

/// The bind types understood after `#` in `userattr` and `groupattr` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindType {
    UserDn,
    GroupDn,
    RoleDn,
    SelfDn,
    LdapUri,
}

impl BindType {
    pub const ALL: [BindType; 5] = [
        BindType::UserDn,
        BindType::GroupDn,
        BindType::RoleDn,
        BindType::SelfDn,
        BindType::LdapUri,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BindType::UserDn => "USERDN",
            BindType::GroupDn => "GROUPDN",
            BindType::RoleDn => "ROLEDN",
            BindType::SelfDn => "SELFDN",
            BindType::LdapUri => "LDAPURI",
        }
    }

    /// Exact, case-sensitive match. Anything else is a literal value.
    #[must_use]
    pub fn matching(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bt| bt.as_str() == text)
    }
}

impl fmt::Display for BindType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of `attr#...`: a bind type or a literal attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindTypeOrValue {
    BindType(BindType),
    Value(String),
}

impl From<BindType> for BindTypeOrValue {
    fn from(bt: BindType) -> Self {
        BindTypeOrValue::BindType(bt)
    }
}

impl From<&str> for BindTypeOrValue {
    fn from(text: &str) -> Self {
        BindType::matching(text)
            .map_or_else(|| BindTypeOrValue::Value(text.to_owned()), BindTypeOrValue::BindType)
    }
}

impl fmt::Display for BindTypeOrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindTypeOrValue::BindType(bt) => write!(f, "{bt}"),
            BindTypeOrValue::Value(v) => f.write_str(v),
        }
    }
}

/// `attr#BINDTYPE` or `attr#value`, for `userattr` and `groupattr`.
///
/// ```
/// use aciv3::values::{AttributeBindTypeOrValue, BindType};
///
/// let manager = AttributeBindTypeOrValue::userattr("manager", BindType::UserDn);
/// assert_eq!(manager.eq().to_string(), r#"userattr = "manager#USERDN""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeBindTypeOrValue {
    keyword: Keyword,
    attribute: AttributeType,
    value: BindTypeOrValue,
}

impl AttributeBindTypeOrValue {
    #[must_use]
    pub fn new(
        keyword: impl Into<Keyword>,
        attribute: AttributeType,
        value: impl Into<BindTypeOrValue>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            attribute,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn userattr(attribute: &str, value: impl Into<BindTypeOrValue>) -> Self {
        Self::new(BindKeyword::UserAttr, AttributeType::new(attribute), value)
    }

    #[must_use]
    pub fn groupattr(attribute: &str, value: impl Into<BindTypeOrValue>) -> Self {
        Self::new(BindKeyword::GroupAttr, AttributeType::new(attribute), value)
    }

    #[must_use]
    pub fn keyword(&self) -> Keyword {
        self.keyword
    }

    #[must_use]
    pub fn attribute(&self) -> &AttributeType {
        &self.attribute
    }

    #[must_use]
    pub fn value(&self) -> &BindTypeOrValue {
        &self.value
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if !matches!(
            self.keyword,
            Keyword::Bind(BindKeyword::UserAttr | BindKeyword::GroupAttr)
        ) {
            return Err(RuleError::WrongContext {
                keyword: self.keyword,
                context: "an attribute bind type or value",
            });
        }
        self.attribute.validate()?;
        if let BindTypeOrValue::Value(v) = &self.value {
            if v.is_empty() || v.contains('"') {
                return Err(RuleError::invalid_value(
                    "attribute bind type or value",
                    v.as_str(),
                    "value must be non-empty and unquoted",
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for AttributeBindTypeOrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.validate().is_err() {
            return f.write_str("<invalid_attribute_bind_type_or_value>");
        }
        write!(f, "{}#{}", self.attribute, self.value)
    }
}

impl Operand for AttributeBindTypeOrValue {
    fn keyword(&self) -> Option<Keyword> {
        Some(self.keyword)
    }

    fn expression(&self) -> Option<Expression> {
        self.validate()
            .ok()
            .map(|()| Expression::Value(self.to_string()))
    }
}

equality_conditions!(AttributeBindTypeOrValue);
