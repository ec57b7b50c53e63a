use std::fmt;
use std::str::FromStr;

use super::Operand;
use crate::parse::ParseError;
use crate::types::{BindKeyword, Expression, Keyword};

/// Bind authentication method for `authmethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthenticationMethod {
    /// Anonymous.
    None,
    Simple,
    Ssl,
    Sasl,
    SaslExternal,
    SaslDigestMd5,
    SaslGssapi,
}

impl AuthenticationMethod {
    pub const ALL: [AuthenticationMethod; 7] = [
        AuthenticationMethod::None,
        AuthenticationMethod::Simple,
        AuthenticationMethod::Ssl,
        AuthenticationMethod::Sasl,
        AuthenticationMethod::SaslExternal,
        AuthenticationMethod::SaslDigestMd5,
        AuthenticationMethod::SaslGssapi,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AuthenticationMethod::None => "NONE",
            AuthenticationMethod::Simple => "SIMPLE",
            AuthenticationMethod::Ssl => "SSL",
            AuthenticationMethod::Sasl => "SASL",
            AuthenticationMethod::SaslExternal => "SASL EXTERNAL",
            AuthenticationMethod::SaslDigestMd5 => "SASL DIGEST-MD5",
            AuthenticationMethod::SaslGssapi => "SASL GSSAPI",
        }
    }

    /// Case-insensitive. `anonymous` is accepted for `NONE`.
    #[must_use]
    pub fn matching(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("anonymous") {
            return Some(AuthenticationMethod::None);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for AuthenticationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthenticationMethod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::matching(s)
            .ok_or_else(|| ParseError::new(format!("unknown authentication method '{s}'")))
    }
}

impl Operand for AuthenticationMethod {
    fn keyword(&self) -> Option<Keyword> {
        Some(Keyword::Bind(BindKeyword::AuthMethod))
    }

    fn expression(&self) -> Option<Expression> {
        Some(Expression::Value(self.as_str().to_owned()))
    }
}

equality_conditions!(AuthenticationMethod);
