//! Build, validate, render and parse ACI v3 access control instructions.
//!
//! Rules are assembled from typed values, each of which knows the keyword
//! it belongs to and the comparison operators that keyword permits.
//! Construction is fail-soft: invalid input produces a zero value that
//! renders a sentinel and fails `validate()`. The `try_*` methods and the
//! parsers in [`parse`] report the error instead.

mod config;
#[cfg(feature = "digest")]
mod digest;
mod error;
mod instruction;
#[cfg(feature = "serde")]
mod serial;
mod types;

pub mod parse;
pub mod values;

pub use config::Config;
#[cfg(feature = "digest")]
pub use digest::{Digest, Digestible};
pub use error::AciError;
pub use instruction::{
    Disposition, Instruction, Instructions, Permission, PermissionBindRule, PermissionBindRules,
    Right,
};
pub use parse::ParseError;
pub use types::{
    BindKeyword, BindRule, BindRules, Category, ComparisonOperator, Condition, Delimiter, Element,
    Expression, Keyword, Node, PushPolicy, QuoteStyle, RuleError, Stack, StackKind, TargetKeyword,
    TargetRules,
};
