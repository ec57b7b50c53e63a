use std::fmt;

use tracing::debug;

use super::Operand;
use crate::types::{
    Category, Delimiter, Element, Expression, Keyword, PushPolicy, RuleError, Stack, StackKind,
    TargetKeyword,
};
use crate::Config;

const INVALID: &str = "<invalid_object_identifier>";

/// A dotted-decimal object identifier for `targetcontrol` or `extop`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    keyword: Keyword,
    oid: Option<String>,
}

/// A `||`-delimited list of object identifiers for one keyword.
pub type ObjectIdentifiers = Stack<ObjectIdentifier>;

fn check(keyword: Keyword, raw: &str) -> Result<String, RuleError> {
    if !matches!(
        keyword,
        Keyword::Target(TargetKeyword::TargetControl | TargetKeyword::ExtOp)
    ) {
        return Err(RuleError::WrongContext {
            keyword,
            context: "an object identifier",
        });
    }
    let oid = raw.trim();
    let arcs: Vec<&str> = oid.split('.').collect();
    if arcs.len() < 2 {
        return Err(RuleError::invalid_value(
            "object identifier",
            raw,
            "at least two arcs required",
        ));
    }
    for arc in &arcs {
        if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RuleError::invalid_value(
                "object identifier",
                raw,
                format!("arc '{arc}' is not a number"),
            ));
        }
        if arc.len() > 1 && arc.starts_with('0') {
            return Err(RuleError::invalid_value(
                "object identifier",
                raw,
                format!("arc '{arc}' has a leading zero"),
            ));
        }
    }
    if !matches!(arcs[0], "0" | "1" | "2") {
        return Err(RuleError::invalid_value(
            "object identifier",
            raw,
            "root arc must be 0, 1 or 2",
        ));
    }
    Ok(oid.to_owned())
}

impl ObjectIdentifier {
    #[must_use]
    pub fn new(keyword: impl Into<Keyword>, oid: &str) -> Self {
        let keyword = keyword.into();
        let oid = check(keyword, oid)
            .map_err(|err| debug!(%keyword, error = %err, "invalid object identifier"))
            .ok();
        Self { keyword, oid }
    }

    pub fn try_new(keyword: impl Into<Keyword>, oid: &str) -> Result<Self, RuleError> {
        let keyword = keyword.into();
        let oid = check(keyword, oid)?;
        Ok(Self {
            keyword,
            oid: Some(oid),
        })
    }

    /// An LDAP control OID (`targetcontrol`).
    #[must_use]
    pub fn control(oid: &str) -> Self {
        Self::new(TargetKeyword::TargetControl, oid)
    }

    /// An extended operation OID (`extop`).
    #[must_use]
    pub fn extended_operation(oid: &str) -> Self {
        Self::new(TargetKeyword::ExtOp, oid)
    }

    #[must_use]
    pub fn keyword(&self) -> Keyword {
        self.keyword
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.oid.as_deref()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.oid.is_none()
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.oid.is_none() {
            return Err(RuleError::NilOrZero {
                kind: "object identifier",
            });
        }
        Ok(())
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.oid.as_deref().unwrap_or(INVALID))
    }
}

impl Element for ObjectIdentifier {
    const KIND: &'static str = "object identifier";

    fn validate(&self) -> Result<(), RuleError> {
        ObjectIdentifier::validate(self)
    }

    fn bound_keyword(&self) -> Option<Keyword> {
        Some(self.keyword)
    }
}

impl Operand for ObjectIdentifier {
    fn keyword(&self) -> Option<Keyword> {
        Some(self.keyword)
    }

    fn expression(&self) -> Option<Expression> {
        self.oid.clone().map(Expression::Value)
    }
}

equality_conditions!(ObjectIdentifier);

impl Stack<ObjectIdentifier> {
    #[must_use]
    pub fn object_identifiers(keyword: impl Into<Keyword>) -> Self {
        Self::object_identifiers_with(keyword, &Config::default())
    }

    #[must_use]
    pub fn object_identifiers_with(keyword: impl Into<Keyword>, config: &Config) -> Self {
        Stack::new(StackKind::List, Category::Values(keyword.into()))
            .nesting(false)
            .minimum(1)
            .delimiter(Delimiter::DoublePipe)
            .policy(PushPolicy::TypeOnly)
            .padding(config.has_stack_padding())
    }

    #[must_use]
    pub fn controls() -> Self {
        Self::object_identifiers(TargetKeyword::TargetControl)
    }

    #[must_use]
    pub fn extended_operations() -> Self {
        Self::object_identifiers(TargetKeyword::ExtOp)
    }

    /// Push an OID given as text, bound to this list's keyword.
    pub fn push_oid(&mut self, oid: &str) -> &mut Self {
        match self.keyword() {
            Some(keyword) => self.push(ObjectIdentifier::new(keyword, oid)),
            None => self,
        }
    }
}
