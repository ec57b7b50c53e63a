//! Text parsers for rule syntax.
//!
//! The value parsers (`inheritance`, `distinguished_names`, ...) return
//! [`ParseError`]. Parsers that assemble rules also validate what they
//! build and return [`AciError`].

mod error;
mod grammar;
mod parser;
mod values;

use tracing::debug;
use winnow::Parser;

pub use error::ParseError;
pub use values::{
    attribute_bind_type_or_value, attribute_filter_operation, attribute_filter_operations,
    attribute_types, distinguished_names, inheritance, inheritance_for, object_identifiers,
};

use crate::error::AciError;
use crate::instruction::{Instruction, Instructions, Permission, PermissionBindRules};
use crate::types::{BindRule, Condition, TargetRules};
use crate::Config;

fn syntax<T>(
    what: &'static str,
    input: &str,
    result: Result<T, impl std::fmt::Display>,
) -> Result<T, ParseError> {
    result.map_err(|e| {
        let err = ParseError::new(e.to_string()).within(what);
        debug!(what, input, error = %err, "parse failed");
        err
    })
}

/// Parse `allow(...)` or `deny(...)`.
///
/// # Errors
///
/// Returns [`ParseError`] for an unknown disposition or right.
pub fn permission(input: &str) -> Result<Permission, ParseError> {
    syntax("permission", input, grammar::parse_permission.parse(input))
}

/// Parse one condition, e.g. `ssf >= "128"` or `( targetscope = "base" )`.
/// Parentheses and padding are kept as written.
///
/// # Errors
///
/// Returns [`AciError`] for malformed text, an operator the keyword does not
/// permit, or a value the keyword does not accept.
pub fn condition(input: &str) -> Result<Condition, AciError> {
    let (parsed, paren) = syntax("condition", input, grammar::parse_condition.parse(input))?;
    parsed.lower(paren)
}

/// Parse a sequence of parenthesized target conditions.
///
/// # Errors
///
/// Returns [`AciError`] for malformed text, bind keywords, or a keyword
/// that appears twice.
pub fn target_rules(input: &str) -> Result<TargetRules, AciError> {
    target_rules_with(input, &Config::default())
}

/// [`target_rules`] with explicit rendering defaults.
///
/// # Errors
///
/// See [`target_rules`].
pub fn target_rules_with(input: &str, config: &Config) -> Result<TargetRules, AciError> {
    let parsed = syntax("target rules", input, grammar::parse_target_rules.parse(input))?;
    parser::lower_targets(&parsed, config)
}

/// Parse a bind rule: a condition or an `AND`/`OR`/`NOT` expression with
/// parentheses.
///
/// # Errors
///
/// Returns [`AciError`] for malformed text or invalid conditions.
pub fn bind_rule(input: &str) -> Result<BindRule, AciError> {
    bind_rule_with(input, &Config::default())
}

/// [`bind_rule`] with explicit rendering defaults.
///
/// # Errors
///
/// See [`bind_rule`].
pub fn bind_rule_with(input: &str, config: &Config) -> Result<BindRule, AciError> {
    let parsed = syntax("bind rule", input, grammar::parse_bind_rule.parse(input))?;
    parsed.lower(config)
}

/// Parse one or more `permission bindrule;` pairs.
///
/// # Errors
///
/// Returns [`AciError`] for malformed text, invalid bind rules or repeated
/// pairs.
pub fn permission_bind_rules(input: &str) -> Result<PermissionBindRules, AciError> {
    let parsed = syntax(
        "permission bind rules",
        input,
        grammar::parse_pbrs.parse(input),
    )?;
    parser::lower_pbrs(&parsed, &Config::default())
}

/// Parse a complete instruction.
///
/// ```
/// let src = r#"( targetattr = "cn || sn" )(version 3.0; acl "names"; allow(read) userdn = "ldap:///anyone";)"#;
/// let aci = aciv3::parse::instruction(src).unwrap();
/// assert_eq!(aci.name(), "names");
/// assert_eq!(aci.to_string(), src);
/// ```
///
/// # Errors
///
/// Returns [`AciError`] for malformed text or an instruction that fails
/// validation.
pub fn instruction(input: &str) -> Result<Instruction, AciError> {
    instruction_with(input, &Config::default())
}

/// [`instruction`] with explicit rendering defaults.
///
/// # Errors
///
/// See [`instruction`].
pub fn instruction_with(input: &str, config: &Config) -> Result<Instruction, AciError> {
    let parsed = syntax("instruction", input, grammar::parse_instruction.parse(input))?;
    parsed.lower(config)
}

/// Parse whitespace-separated instructions. Empty input gives an empty list.
///
/// # Errors
///
/// Returns [`AciError`] for the first malformed or invalid instruction, or
/// a repeated one.
pub fn instructions(input: &str) -> Result<Instructions, AciError> {
    let parsed = syntax(
        "instructions",
        input,
        grammar::parse_instructions.parse(input),
    )?;
    parser::lower_instructions(&parsed, &Config::default())
}
