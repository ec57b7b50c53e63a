use std::fmt;

use tracing::debug;

use super::Operand;
use crate::types::{
    BindKeyword, Category, Delimiter, Element, Expression, Keyword, PushPolicy, RuleError, Stack,
    StackKind, TargetKeyword,
};
use crate::Config;

pub(crate) const LDAP_PREFIX: &str = "ldap:///";
const INVALID: &str = "<invalid_distinguished_name>";
const ALIASES: [&str; 4] = ["anyone", "all", "self", "parent"];

/// A distinguished name bound to one of the DN-valued keywords: `target`,
/// `target_to`, `target_from`, `userdn`, `roledn` or `groupdn`.
///
/// Renders with the `ldap:///` prefix. Besides regular DNs the well-known
/// aliases `anyone`, `all`, `self` and `parent` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistinguishedName {
    keyword: Keyword,
    dn: Option<String>,
}

/// A `||`-delimited list of distinguished names for one keyword.
pub type DistinguishedNames = Stack<DistinguishedName>;

fn is_dn_keyword(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::Target(TargetKeyword::Target | TargetKeyword::TargetTo | TargetKeyword::TargetFrom)
            | Keyword::Bind(BindKeyword::UserDn | BindKeyword::RoleDn | BindKeyword::GroupDn)
    )
}

fn check(keyword: Keyword, raw: &str) -> Result<String, RuleError> {
    if !is_dn_keyword(keyword) {
        return Err(RuleError::WrongContext {
            keyword,
            context: "a distinguished name",
        });
    }
    let trimmed = raw.trim();
    let dn = trimmed.strip_prefix(LDAP_PREFIX).unwrap_or(trimmed);
    if dn.is_empty() {
        return Err(RuleError::invalid_value("distinguished name", raw, "empty value"));
    }
    if dn.contains('"') || dn.contains("||") {
        return Err(RuleError::invalid_value(
            "distinguished name",
            raw,
            "contains a reserved sequence",
        ));
    }
    let alias = ALIASES.iter().any(|a| a.eq_ignore_ascii_case(dn));
    if !alias && !dn.contains('=') {
        return Err(RuleError::invalid_value(
            "distinguished name",
            raw,
            "expected attribute=value components or a well-known alias",
        ));
    }
    Ok(dn.to_owned())
}

impl DistinguishedName {
    /// Build a DN for `keyword`. The `ldap:///` prefix is optional.
    #[must_use]
    pub fn new(keyword: impl Into<Keyword>, dn: &str) -> Self {
        let keyword = keyword.into();
        let dn = check(keyword, dn)
            .map_err(|err| debug!(%keyword, error = %err, "invalid distinguished name"))
            .ok();
        Self { keyword, dn }
    }

    pub fn try_new(keyword: impl Into<Keyword>, dn: &str) -> Result<Self, RuleError> {
        let keyword = keyword.into();
        let dn = check(keyword, dn)?;
        Ok(Self {
            keyword,
            dn: Some(dn),
        })
    }

    #[must_use]
    pub fn target(dn: &str) -> Self {
        Self::new(TargetKeyword::Target, dn)
    }

    #[must_use]
    pub fn target_to(dn: &str) -> Self {
        Self::new(TargetKeyword::TargetTo, dn)
    }

    #[must_use]
    pub fn target_from(dn: &str) -> Self {
        Self::new(TargetKeyword::TargetFrom, dn)
    }

    #[must_use]
    pub fn userdn(dn: &str) -> Self {
        Self::new(BindKeyword::UserDn, dn)
    }

    #[must_use]
    pub fn roledn(dn: &str) -> Self {
        Self::new(BindKeyword::RoleDn, dn)
    }

    #[must_use]
    pub fn groupdn(dn: &str) -> Self {
        Self::new(BindKeyword::GroupDn, dn)
    }

    /// `userdn = "ldap:///anyone"`: any client, including anonymous ones.
    #[must_use]
    pub fn anyone() -> Self {
        Self::userdn("anyone")
    }

    /// `userdn = "ldap:///all"`: any authenticated client.
    #[must_use]
    pub fn all() -> Self {
        Self::userdn("all")
    }

    #[must_use]
    pub fn keyword(&self) -> Keyword {
        self.keyword
    }

    /// The DN without its `ldap:///` prefix.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.dn.as_deref()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dn.is_none()
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.dn.is_none() {
            return Err(RuleError::NilOrZero {
                kind: "distinguished name",
            });
        }
        Ok(())
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dn {
            Some(dn) => write!(f, "{LDAP_PREFIX}{dn}"),
            None => f.write_str(INVALID),
        }
    }
}

impl Element for DistinguishedName {
    const KIND: &'static str = "distinguished name";

    fn validate(&self) -> Result<(), RuleError> {
        DistinguishedName::validate(self)
    }

    fn bound_keyword(&self) -> Option<Keyword> {
        Some(self.keyword)
    }

    fn matches(&self, text: &str) -> bool {
        let bare = text.strip_prefix(LDAP_PREFIX).unwrap_or(text);
        self.dn
            .as_deref()
            .is_some_and(|dn| dn.eq_ignore_ascii_case(bare))
    }
}

impl Operand for DistinguishedName {
    fn keyword(&self) -> Option<Keyword> {
        Some(self.keyword)
    }

    fn expression(&self) -> Option<Expression> {
        self.dn.as_ref().map(|_| Expression::Value(self.to_string()))
    }
}

equality_conditions!(DistinguishedName);

impl Stack<DistinguishedName> {
    /// Empty DN list for `keyword`.
    #[must_use]
    pub fn distinguished_names(keyword: impl Into<Keyword>) -> Self {
        Self::distinguished_names_with(keyword, &Config::default())
    }

    #[must_use]
    pub fn distinguished_names_with(keyword: impl Into<Keyword>, config: &Config) -> Self {
        Stack::new(StackKind::List, Category::Values(keyword.into()))
            .nesting(false)
            .minimum(1)
            .delimiter(Delimiter::DoublePipe)
            .policy(PushPolicy::TypeOnly)
            .padding(config.has_stack_padding())
    }

    /// Push a DN given as text, bound to this list's keyword.
    pub fn push_dn(&mut self, dn: &str) -> &mut Self {
        match self.keyword() {
            Some(keyword) => self.push(DistinguishedName::new(keyword, dn)),
            None => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuoteStyle;
    use crate::ComparisonOperator;

    #[test]
    fn renders_with_prefix() {
        let dn = DistinguishedName::userdn("uid=jesse,ou=People,dc=example,dc=com");
        assert_eq!(dn.to_string(), "ldap:///uid=jesse,ou=People,dc=example,dc=com");
        assert_eq!(
            dn.eq().to_string(),
            r#"userdn = "ldap:///uid=jesse,ou=People,dc=example,dc=com""#
        );
        assert_eq!(
            DistinguishedName::target("ldap:///ou=People,dc=example,dc=com")
                .ne()
                .to_string(),
            r#"( target != "ldap:///ou=People,dc=example,dc=com" )"#
        );
    }

    #[test]
    fn aliases() {
        assert_eq!(DistinguishedName::anyone().eq().to_string(), r#"userdn = "ldap:///anyone""#);
        assert_eq!(DistinguishedName::all().to_string(), "ldap:///all");
        assert!(!DistinguishedName::groupdn("SELF").is_zero());
    }

    #[test]
    fn rejects_malformed_names() {
        for raw in ["", "ldap:///", "nonsense", r#"cn="x""#, "cn=a || cn=b"] {
            let dn = DistinguishedName::userdn(raw);
            assert!(dn.is_zero(), "{raw} should be rejected");
            assert_eq!(dn.to_string(), INVALID);
            assert!(dn.eq().is_zero());
        }
    }

    #[test]
    fn rejects_non_dn_keywords() {
        let err = DistinguishedName::try_new(BindKeyword::Ssf, "cn=x").unwrap_err();
        assert!(matches!(err, RuleError::WrongContext { .. }));
    }

    #[test]
    fn ordinal_operators_give_zero_condition() {
        let dn = DistinguishedName::roledn("cn=role,dc=example,dc=com");
        assert!(dn.condition(ComparisonOperator::Ge).is_zero());
        assert_eq!(dn.operators().len(), 2);
    }

    #[test]
    fn list_quote_styles() {
        let mut list = DistinguishedNames::distinguished_names(BindKeyword::UserDn);
        list.push_dn("uid=a,dc=example,dc=com")
            .push_dn("uid=b,dc=example,dc=com")
            .push_dn("garbage");
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.eq().to_string(),
            r#"userdn = "ldap:///uid=a,dc=example,dc=com || ldap:///uid=b,dc=example,dc=com""#
        );
        list.set_quote_style(QuoteStyle::PerElement);
        assert_eq!(
            list.eq().to_string(),
            r#"userdn = "ldap:///uid=a,dc=example,dc=com" || "ldap:///uid=b,dc=example,dc=com""#
        );
        assert!(list.contains("UID=A,DC=EXAMPLE,DC=COM"));
        assert!(list.contains("ldap:///uid=b,dc=example,dc=com"));
    }

    #[test]
    fn list_rejects_other_keywords() {
        let mut list = DistinguishedNames::distinguished_names(TargetKeyword::Target);
        assert!(matches!(
            list.try_push(DistinguishedName::userdn("cn=x")),
            Err(RuleError::WrongContext { .. })
        ));
        assert!(list.eq().is_zero());
    }
}
