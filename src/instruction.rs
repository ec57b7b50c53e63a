//! Permissions, permission bind rules and complete instructions.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::AciError;
use crate::parse::ParseError;
use crate::types::{
    BindRule, Category, Delimiter, Element, Node, PushPolicy, RuleError, Stack, StackKind,
    TargetRules,
};

/// An access right granted or withheld by a [`Permission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Right {
    Read,
    Write,
    Add,
    Delete,
    Search,
    Compare,
    SelfWrite,
    Proxy,
    Import,
    Export,
}

impl Right {
    /// Every right, in bit order.
    pub const ALL: [Right; 10] = [
        Right::Read,
        Right::Write,
        Right::Add,
        Right::Delete,
        Right::Search,
        Right::Compare,
        Right::SelfWrite,
        Right::Proxy,
        Right::Import,
        Right::Export,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Right::Read => "read",
            Right::Write => "write",
            Right::Add => "add",
            Right::Delete => "delete",
            Right::Search => "search",
            Right::Compare => "compare",
            Right::SelfWrite => "selfwrite",
            Right::Proxy => "proxy",
            Right::Import => "import",
            Right::Export => "export",
        }
    }

    #[must_use]
    pub fn matching(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|right| right.as_str().eq_ignore_ascii_case(text))
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every right except `proxy`, which `all` does not cover.
const ALL_RIGHTS: u16 = 0b11_0111_1111;

/// Whether a permission grants or withholds its rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    Allow,
    Deny,
}

impl Disposition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Allow => "allow",
            Disposition::Deny => "deny",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `allow(...)` or `deny(...)` with a set of rights.
///
/// ```
/// use aciv3::{Permission, Right};
///
/// let p = Permission::allow([Right::Read, Right::Search, Right::Compare]);
/// assert_eq!(p.to_string(), "allow(read,search,compare)");
/// assert_eq!(Permission::deny([]).to_string(), "deny(none)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permission {
    disposition: Option<Disposition>,
    rights: u16,
}

impl Permission {
    #[must_use]
    pub fn new(disposition: Disposition, rights: impl IntoIterator<Item = Right>) -> Self {
        let mut permission = Self {
            disposition: Some(disposition),
            rights: 0,
        };
        for right in rights {
            permission.shift(right);
        }
        permission
    }

    #[must_use]
    pub fn allow(rights: impl IntoIterator<Item = Right>) -> Self {
        Self::new(Disposition::Allow, rights)
    }

    #[must_use]
    pub fn deny(rights: impl IntoIterator<Item = Right>) -> Self {
        Self::new(Disposition::Deny, rights)
    }

    /// `allow(all)`.
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            disposition: Some(Disposition::Allow),
            rights: ALL_RIGHTS,
        }
    }

    /// `deny(all)`.
    #[must_use]
    pub fn deny_all() -> Self {
        Self {
            disposition: Some(Disposition::Deny),
            rights: ALL_RIGHTS,
        }
    }

    /// Add a right.
    pub fn shift(&mut self, right: Right) -> &mut Self {
        self.rights |= right.bit();
        self
    }

    /// Add every right `all` covers.
    pub(crate) fn shift_all(&mut self) -> &mut Self {
        self.rights |= ALL_RIGHTS;
        self
    }

    /// Remove a right.
    pub fn unshift(&mut self, right: Right) -> &mut Self {
        self.rights &= !right.bit();
        self
    }

    #[must_use]
    pub fn has(&self, right: Right) -> bool {
        self.rights & right.bit() != 0
    }

    pub fn rights(&self) -> impl Iterator<Item = Right> + '_ {
        Right::ALL.into_iter().filter(|right| self.has(*right))
    }

    #[must_use]
    pub fn disposition(&self) -> Option<Disposition> {
        self.disposition
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.disposition.is_none()
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        match self.disposition {
            Some(_) => Ok(()),
            None => Err(RuleError::NilOrZero { kind: "permission" }),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(disposition) = self.disposition else {
            return f.write_str("<invalid_permission>");
        };
        let rights: Vec<&str> = if self.rights & ALL_RIGHTS == ALL_RIGHTS {
            let mut rights = vec!["all"];
            if self.has(Right::Proxy) {
                rights.push(Right::Proxy.as_str());
            }
            rights
        } else if self.rights == 0 {
            vec!["none"]
        } else {
            self.rights().map(Right::as_str).collect()
        };
        write!(f, "{disposition}({})", rights.join(","))
    }
}

impl FromStr for Permission {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::permission(s)
    }
}

/// A permission paired with the bind rule that grants it:
/// `allow(read) userdn = "ldap:///anyone";`.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionBindRule {
    permission: Permission,
    bind: BindRule,
}

/// Space-delimited permission bind rules of one instruction.
pub type PermissionBindRules = Stack<PermissionBindRule>;

impl PermissionBindRule {
    #[must_use]
    pub fn new(permission: Permission, bind: impl Into<BindRule>) -> Self {
        Self {
            permission,
            bind: bind.into(),
        }
    }

    /// Build and validate.
    pub fn try_new(permission: Permission, bind: impl Into<BindRule>) -> Result<Self, RuleError> {
        let pbr = Self::new(permission, bind);
        pbr.validate()?;
        Ok(pbr)
    }

    #[must_use]
    pub fn permission(&self) -> &Permission {
        &self.permission
    }

    #[must_use]
    pub fn bind_rule(&self) -> &BindRule {
        &self.bind
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        self.permission.validate()?;
        self.bind.validate()?;
        match &self.bind {
            Node::Leaf(condition) => match condition.keyword() {
                Some(keyword) if keyword.is_target() => Err(RuleError::WrongContext {
                    keyword,
                    context: "a bind rule",
                }),
                _ => Ok(()),
            },
            Node::Stack(stack) if stack.category() != Category::BindRules => {
                Err(RuleError::NestingDisallowed {
                    context: format!("a bind rule (found {})", stack.category()),
                })
            }
            Node::Stack(_) => Ok(()),
        }
    }
}

impl fmt::Display for PermissionBindRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.validate().is_err() {
            return f.write_str("<invalid_pbrule>");
        }
        write!(f, "{} {};", self.permission, self.bind)
    }
}

impl Element for PermissionBindRule {
    const KIND: &'static str = "permission bind rule";

    fn validate(&self) -> Result<(), RuleError> {
        PermissionBindRule::validate(self)
    }
}

impl Stack<PermissionBindRule> {
    #[must_use]
    pub fn permission_bind_rules() -> Self {
        Stack::new(StackKind::List, Category::PermissionBindRules)
            .nesting(false)
            .minimum(1)
            .delimiter(Delimiter::Space)
            .policy(PushPolicy::UniqueValue)
    }
}

impl From<PermissionBindRule> for Stack<PermissionBindRule> {
    fn from(pbr: PermissionBindRule) -> Self {
        Stack::permission_bind_rules().with(pbr)
    }
}

/// A complete access control instruction.
///
/// ```
/// use aciv3::values::{DistinguishedName, TimeOfDay};
/// use aciv3::{BindRules, Instruction, Permission, PermissionBindRule, Right, TargetRules};
///
/// let targets = TargetRules::target_rules()
///     .with(DistinguishedName::target("uid=*,ou=People,dc=example,dc=com").eq());
/// let window = BindRules::and()
///     .paren(true)
///     .with(TimeOfDay::from_hhmm("1730").ge())
///     .with(TimeOfDay::from_hhmm("2400").lt());
/// let pbr = PermissionBindRule::new(
///     Permission::allow([Right::Read, Right::Search, Right::Compare]),
///     window,
/// );
/// let aci = Instruction::new("Limit people access to timeframe", targets, pbr);
/// assert_eq!(
///     aci.to_string(),
///     r#"( target = "ldap:///uid=*,ou=People,dc=example,dc=com" )(version 3.0; acl "Limit people access to timeframe"; allow(read,search,compare) ( timeofday >= "1730" AND timeofday < "2400" );)"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    name: String,
    targets: TargetRules,
    rules: PermissionBindRules,
}

/// Newline-delimited instructions with no repeats.
pub type Instructions = Stack<Instruction>;

impl Instruction {
    #[must_use]
    pub fn new(
        name: &str,
        targets: TargetRules,
        rules: impl Into<PermissionBindRules>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            targets,
            rules: rules.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.name = name.to_owned();
        self
    }

    #[must_use]
    pub fn target_rules(&self) -> &TargetRules {
        &self.targets
    }

    pub fn target_rules_mut(&mut self) -> &mut TargetRules {
        &mut self.targets
    }

    #[must_use]
    pub fn permission_bind_rules(&self) -> &PermissionBindRules {
        &self.rules
    }

    pub fn permission_bind_rules_mut(&mut self) -> &mut PermissionBindRules {
        &mut self.rules
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.name.trim().is_empty() {
            return Err(RuleError::NilOrZero {
                kind: "instruction name",
            });
        }
        if self.name.contains('"') {
            return Err(RuleError::invalid_value(
                "instruction name",
                self.name.as_str(),
                "contains a double quote",
            ));
        }
        if self.targets.category() != Category::TargetRules {
            return Err(RuleError::NestingDisallowed {
                context: format!("target rules (found {})", self.targets.category()),
            });
        }
        self.targets.validate()?;
        self.rules.validate()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Err(err) = self.validate() {
            debug!(error = %err, "rendering invalid instruction");
            return f.write_str("<invalid_instruction>");
        }
        write!(
            f,
            "{}(version 3.0; acl \"{}\"; {})",
            self.targets, self.name, self.rules
        )
    }
}

impl FromStr for Instruction {
    type Err = AciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::instruction(s)
    }
}

impl Element for Instruction {
    const KIND: &'static str = "instruction";

    fn validate(&self) -> Result<(), RuleError> {
        Instruction::validate(self)
    }
}

impl Stack<Instruction> {
    #[must_use]
    pub fn instructions() -> Self {
        Stack::new(StackKind::List, Category::Instructions)
            .nesting(false)
            .minimum(0)
            .delimiter(Delimiter::Newline)
            .policy(PushPolicy::UniqueValue)
    }
}

impl FromStr for Stack<Instruction> {
    type Err = AciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::instructions(s)
    }
}
