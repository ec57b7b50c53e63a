use super::condition::Condition;
use super::stack::{Category, Delimiter, Node, PushPolicy, Stack, StackKind};
use super::TargetKeyword;
use crate::Config;

/// Ordered collection of target conditions, at most one per keyword.
pub type TargetRules = Stack<Condition>;

/// Boolean stack of bind conditions.
pub type BindRules = Stack<Condition>;

/// A single bind condition or a boolean stack of them.
pub type BindRule = Node<Condition>;

impl Stack<Condition> {
    /// Empty target rule collection with default padding.
    #[must_use]
    pub fn target_rules() -> Self {
        Self::target_rules_with(&Config::default())
    }

    #[must_use]
    pub fn target_rules_with(config: &Config) -> Self {
        Stack::new(StackKind::List, Category::TargetRules)
            .nesting(false)
            .capacity(TargetKeyword::ALL.len())
            .minimum(0)
            .delimiter(Delimiter::Space)
            .policy(PushPolicy::UniqueKeyword)
            .padding(config.has_stack_padding())
    }

    #[must_use]
    pub fn and() -> Self {
        Self::and_with(&Config::default())
    }

    #[must_use]
    pub fn and_with(config: &Config) -> Self {
        Self::bind(StackKind::And, config)
    }

    #[must_use]
    pub fn or() -> Self {
        Self::or_with(&Config::default())
    }

    #[must_use]
    pub fn or_with(config: &Config) -> Self {
        Self::bind(StackKind::Or, config)
    }

    #[must_use]
    pub fn not() -> Self {
        Self::not_with(&Config::default())
    }

    #[must_use]
    pub fn not_with(config: &Config) -> Self {
        Self::bind(StackKind::Not, config)
    }

    fn bind(kind: StackKind, config: &Config) -> Self {
        Stack::new(kind, Category::BindRules).padding(config.has_stack_padding())
    }
}
