mod condition;
pub(crate) mod error;
mod keyword;
mod operator;
mod rules;
mod stack;

pub use condition::{Condition, Expression};
pub use error::RuleError;
pub use keyword::{BindKeyword, Keyword, TargetKeyword};
pub use operator::ComparisonOperator;
pub use rules::{BindRule, BindRules, TargetRules};
pub use stack::{Category, Delimiter, Element, Node, PushPolicy, QuoteStyle, Stack, StackKind};
