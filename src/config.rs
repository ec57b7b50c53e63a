use crate::types::{BindRules, Condition, Expression, Keyword, Stack, TargetRules};
use crate::values::{
    AttributeFilterOperations, AttributeTypes, DistinguishedNames, ObjectIdentifiers,
};
use crate::ComparisonOperator;

/// Rendering defaults applied to rules and stacks when they are built.
///
/// A `Config` is read once, at construction. Changing it later has no effect
/// on instances that already exist.
///
/// ```
/// use aciv3::{BindKeyword, ComparisonOperator, Config, Keyword};
///
/// let compact = Config::new().rule_padding(false).stack_padding(false);
/// let rule = compact.condition(
///     Keyword::Bind(BindKeyword::Ssf),
///     ComparisonOperator::Ge,
///     "128",
/// );
/// assert_eq!(rule.to_string(), r#"ssf>="128""#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    rule_padding: bool,
    stack_padding: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rule_padding: true,
            stack_padding: true,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pad operators and parentheses of conditions with spaces.
    #[must_use]
    pub fn rule_padding(mut self, enabled: bool) -> Self {
        self.rule_padding = enabled;
        self
    }

    /// Pad delimiters and parentheses of stacks with spaces.
    #[must_use]
    pub fn stack_padding(mut self, enabled: bool) -> Self {
        self.stack_padding = enabled;
        self
    }

    #[must_use]
    pub fn has_rule_padding(&self) -> bool {
        self.rule_padding
    }

    #[must_use]
    pub fn has_stack_padding(&self) -> bool {
        self.stack_padding
    }

    /// Build a condition using this configuration's rule padding.
    #[must_use]
    pub fn condition(
        &self,
        keyword: Keyword,
        operator: ComparisonOperator,
        expression: impl Into<Expression>,
    ) -> Condition {
        Condition::new(keyword, operator, expression).padding(self.rule_padding)
    }

    #[must_use]
    pub fn target_rules(&self) -> TargetRules {
        Stack::target_rules_with(self)
    }

    #[must_use]
    pub fn and(&self) -> BindRules {
        Stack::and_with(self)
    }

    #[must_use]
    pub fn or(&self) -> BindRules {
        Stack::or_with(self)
    }

    #[must_use]
    pub fn not(&self) -> BindRules {
        Stack::not_with(self)
    }

    #[must_use]
    pub fn distinguished_names(&self, keyword: impl Into<Keyword>) -> DistinguishedNames {
        Stack::distinguished_names_with(keyword, self)
    }

    #[must_use]
    pub fn object_identifiers(&self, keyword: impl Into<Keyword>) -> ObjectIdentifiers {
        Stack::object_identifiers_with(keyword, self)
    }

    #[must_use]
    pub fn attribute_types(&self) -> AttributeTypes {
        Stack::attribute_types_with(self)
    }

    #[must_use]
    pub fn attribute_filter_operations(&self) -> AttributeFilterOperations {
        Stack::attribute_filter_operations_with(self)
    }
}
