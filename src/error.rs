use thiserror::Error;

use crate::parse::ParseError;
use crate::types::RuleError;

/// Unified error type covering parsing and rule validation.
///
/// Returned by the parsers that assemble rules, such as
/// [`parse::instruction`](crate::parse::instruction) and
/// [`Instruction::from_str`](std::str::FromStr).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AciError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Rule(#[from] RuleError),
}
