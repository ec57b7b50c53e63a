use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::Operand;
use crate::parse::ParseError;
use crate::types::{BindKeyword, Expression, Keyword, RuleError};

const MAX_FQDN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

fn check_address(raw: &str) -> Result<&str, RuleError> {
    let addr = raw.trim();
    if addr.is_empty() {
        return Err(RuleError::invalid_value("ip address", raw, "empty value"));
    }
    if !addr
        .chars()
        .all(|c| c.is_ascii_hexdigit() || matches!(c, '.' | ':' | '*' | '/'))
    {
        return Err(RuleError::invalid_value(
            "ip address",
            raw,
            "unexpected character",
        ));
    }
    if addr != "*" && !addr.contains(['.', ':']) {
        return Err(RuleError::invalid_value(
            "ip address",
            raw,
            "expected an IPv4 or IPv6 address",
        ));
    }
    Ok(addr)
}

/// One or more IPv4/IPv6 addresses for `ip`, rendered comma-separated.
/// Wildcards (`192.168.*`) and CIDR suffixes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IpAddress {
    addrs: Vec<String>,
}

impl IpAddress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address. Malformed and repeated addresses are ignored.
    pub fn push(&mut self, addr: &str) -> &mut Self {
        if let Err(err) = self.try_push(addr) {
            debug!(addr, error = %err, "ip address rejected");
        }
        self
    }

    #[must_use]
    pub fn with(mut self, addr: &str) -> Self {
        self.push(addr);
        self
    }

    pub fn try_push(&mut self, addr: &str) -> Result<(), RuleError> {
        let addr = check_address(addr)?;
        if self.addrs.iter().any(|a| a.eq_ignore_ascii_case(addr)) {
            return Err(RuleError::DuplicateValue {
                value: addr.to_owned(),
            });
        }
        self.addrs.push(addr.to_owned());
        Ok(())
    }

    #[must_use]
    pub fn addresses(&self) -> &[String] {
        &self.addrs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.addrs.is_empty() {
            return Err(RuleError::NilOrZero { kind: "ip address" });
        }
        Ok(())
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.addrs.is_empty() {
            return f.write_str("<invalid_ip_address>");
        }
        f.write_str(&self.addrs.join(","))
    }
}

impl FromStr for IpAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ip = IpAddress::new();
        for addr in s.split(',') {
            ip.try_push(addr)
                .map_err(|err| ParseError::new(err.to_string()))?;
        }
        Ok(ip)
    }
}

impl Operand for IpAddress {
    fn keyword(&self) -> Option<Keyword> {
        Some(Keyword::Bind(BindKeyword::Ip))
    }

    fn expression(&self) -> Option<Expression> {
        self.validate()
            .ok()
            .map(|()| Expression::Value(self.to_string()))
    }
}

equality_conditions!(IpAddress);

fn check_fqdn(raw: &str) -> Result<String, RuleError> {
    let name = raw.trim();
    if name.is_empty() || name.len() > MAX_FQDN_LEN {
        return Err(RuleError::invalid_value(
            "fqdn",
            raw,
            "length must be 1 through 253",
        ));
    }
    for (i, label) in name.split('.').enumerate() {
        if i == 0 && label == "*" {
            continue;
        }
        let valid = !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(RuleError::invalid_value(
                "fqdn",
                raw,
                format!("invalid label '{label}'"),
            ));
        }
    }
    Ok(name.to_owned())
}

/// A fully-qualified domain name for `dns`. The leftmost label may be `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Fqdn(Option<String>);

impl Fqdn {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(
            check_fqdn(name)
                .map_err(|err| debug!(error = %err, "invalid fqdn"))
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
            None => Err(RuleError::NilOrZero { kind: "fqdn" }),
        }
    }
}

impl fmt::Display for Fqdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or("<invalid_fqdn>"))
    }
}

impl FromStr for Fqdn {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_fqdn(s)
            .map(|name| Self(Some(name)))
            .map_err(|err| ParseError::new(err.to_string()))
    }
}

impl Operand for Fqdn {
    fn keyword(&self) -> Option<Keyword> {
        Some(Keyword::Bind(BindKeyword::Dns))
    }

    fn expression(&self) -> Option<Expression> {
        self.0.clone().map(Expression::Value)
    }
}

equality_conditions!(Fqdn);
