use std::fmt;
use std::str::FromStr;

use super::ComparisonOperator;

const EQUALITY: &[ComparisonOperator] = &[ComparisonOperator::Eq, ComparisonOperator::Ne];
const EQUAL_ONLY: &[ComparisonOperator] = &[ComparisonOperator::Eq];
const ORDINAL: &[ComparisonOperator] = &ComparisonOperator::ALL;

/// Keywords that may appear in a target rule. Each may be used at most once
/// per instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKeyword {
    Target,
    TargetTo,
    TargetFrom,
    TargetAttr,
    TargetControl,
    TargetScope,
    TargetFilter,
    TargetAttrFilters,
    ExtOp,
}

/// Keywords that may appear in a bind rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindKeyword {
    UserDn,
    RoleDn,
    GroupDn,
    Ip,
    AuthMethod,
    Dns,
    UserAttr,
    GroupAttr,
    DayOfWeek,
    Ssf,
    TimeOfDay,
}

/// A rule keyword, resolved once into its target or bind context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Keyword {
    Target(TargetKeyword),
    Bind(BindKeyword),
}

impl TargetKeyword {
    pub const ALL: [TargetKeyword; 9] = [
        TargetKeyword::Target,
        TargetKeyword::TargetTo,
        TargetKeyword::TargetFrom,
        TargetKeyword::TargetAttr,
        TargetKeyword::TargetControl,
        TargetKeyword::TargetScope,
        TargetKeyword::TargetFilter,
        TargetKeyword::TargetAttrFilters,
        TargetKeyword::ExtOp,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKeyword::Target => "target",
            TargetKeyword::TargetTo => "target_to",
            TargetKeyword::TargetFrom => "target_from",
            TargetKeyword::TargetAttr => "targetattr",
            TargetKeyword::TargetControl => "targetcontrol",
            TargetKeyword::TargetScope => "targetscope",
            TargetKeyword::TargetFilter => "targetfilter",
            TargetKeyword::TargetAttrFilters => "targetattrfilters",
            TargetKeyword::ExtOp => "extop",
        }
    }

    #[must_use]
    pub fn permitted_operators(self) -> &'static [ComparisonOperator] {
        match self {
            TargetKeyword::TargetScope | TargetKeyword::TargetAttrFilters => EQUAL_ONLY,
            _ => EQUALITY,
        }
    }

    /// Resolve a target keyword. The legacy `targattrfilters` spelling is
    /// accepted as well.
    #[must_use]
    pub fn matching(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("targattrfilters") {
            return Some(TargetKeyword::TargetAttrFilters);
        }
        Self::ALL
            .into_iter()
            .find(|kw| kw.as_str().eq_ignore_ascii_case(text))
    }
}

impl BindKeyword {
    pub const ALL: [BindKeyword; 11] = [
        BindKeyword::UserDn,
        BindKeyword::RoleDn,
        BindKeyword::GroupDn,
        BindKeyword::Ip,
        BindKeyword::AuthMethod,
        BindKeyword::Dns,
        BindKeyword::UserAttr,
        BindKeyword::GroupAttr,
        BindKeyword::DayOfWeek,
        BindKeyword::Ssf,
        BindKeyword::TimeOfDay,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BindKeyword::UserDn => "userdn",
            BindKeyword::RoleDn => "roledn",
            BindKeyword::GroupDn => "groupdn",
            BindKeyword::Ip => "ip",
            BindKeyword::AuthMethod => "authmethod",
            BindKeyword::Dns => "dns",
            BindKeyword::UserAttr => "userattr",
            BindKeyword::GroupAttr => "groupattr",
            BindKeyword::DayOfWeek => "dayofweek",
            BindKeyword::Ssf => "ssf",
            BindKeyword::TimeOfDay => "timeofday",
        }
    }

    #[must_use]
    pub fn permitted_operators(self) -> &'static [ComparisonOperator] {
        match self {
            BindKeyword::Ssf | BindKeyword::TimeOfDay => ORDINAL,
            _ => EQUALITY,
        }
    }

    #[must_use]
    pub fn matching(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kw| kw.as_str().eq_ignore_ascii_case(text.trim()))
    }
}

impl Keyword {
    /// Every keyword, target keywords first.
    pub fn all() -> impl Iterator<Item = Keyword> {
        TargetKeyword::ALL
            .into_iter()
            .map(Keyword::Target)
            .chain(BindKeyword::ALL.into_iter().map(Keyword::Bind))
    }

    /// Resolve a keyword from its canonical spelling. Case is not significant.
    #[must_use]
    pub fn matching(text: &str) -> Option<Self> {
        TargetKeyword::matching(text)
            .map(Keyword::Target)
            .or_else(|| BindKeyword::matching(text).map(Keyword::Bind))
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Target(kw) => kw.as_str(),
            Keyword::Bind(kw) => kw.as_str(),
        }
    }

    #[must_use]
    pub fn is_target(self) -> bool {
        matches!(self, Keyword::Target(_))
    }

    #[must_use]
    pub fn is_bind(self) -> bool {
        matches!(self, Keyword::Bind(_))
    }

    #[must_use]
    pub fn permitted_operators(self) -> &'static [ComparisonOperator] {
        match self {
            Keyword::Target(kw) => kw.permitted_operators(),
            Keyword::Bind(kw) => kw.permitted_operators(),
        }
    }

    #[must_use]
    pub fn permits(self, op: ComparisonOperator) -> bool {
        self.permitted_operators().contains(&op)
    }
}

impl From<TargetKeyword> for Keyword {
    fn from(kw: TargetKeyword) -> Self {
        Keyword::Target(kw)
    }
}

impl From<BindKeyword> for Keyword {
    fn from(kw: BindKeyword) -> Self {
        Keyword::Bind(kw)
    }
}

impl fmt::Display for TargetKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BindKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Keyword {
    type Err = crate::parse::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Keyword::matching(s)
            .ok_or_else(|| crate::parse::ParseError::new(format!("unknown keyword '{s}'")))
    }
}
