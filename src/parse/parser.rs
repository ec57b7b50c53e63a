use tracing::debug;

use super::values::expression;
use crate::error::AciError;
use crate::instruction::{Instruction, Instructions, Permission, PermissionBindRule};
use crate::types::{
    BindRule, ComparisonOperator, Condition, Keyword, Node, QuoteStyle, Stack, StackKind,
};
use crate::{BindRules, Config, PermissionBindRules, TargetRules};

/// A condition as written, before its value is checked against the keyword.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedCondition {
    pub keyword: Keyword,
    pub operator: ComparisonOperator,
    pub values: Vec<String>,
    pub quote: QuoteStyle,
    pub padded: bool,
}

/// Bind rule syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedBind {
    Condition(ParsedCondition),
    Group { inner: Box<ParsedBind>, padded: bool },
    And(Vec<ParsedBind>),
    Or(Vec<ParsedBind>),
    Not(Box<ParsedBind>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedPbr {
    pub permission: Permission,
    pub bind: ParsedBind,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedInstruction {
    pub targets: Vec<ParsedCondition>,
    pub name: String,
    pub rules: Vec<ParsedPbr>,
}

impl ParsedCondition {
    pub(crate) fn lower(&self, paren: bool) -> Result<Condition, AciError> {
        let expr = expression(self.keyword, &self.values, self.quote)?;
        let condition = Condition::try_new(self.keyword, self.operator, expr)?
            .paren(paren)
            .padding(self.padded);
        Ok(condition)
    }
}

fn is_parenthesized(node: &BindRule) -> bool {
    match node {
        Node::Leaf(condition) => condition.is_parenthesized(),
        Node::Stack(stack) => stack.is_parenthesized(),
    }
}

impl ParsedBind {
    pub(crate) fn lower(&self, config: &Config) -> Result<BindRule, AciError> {
        match self {
            ParsedBind::Condition(c) => Ok(Node::Leaf(c.lower(false)?)),
            ParsedBind::And(items) => boolean(BindRules::and_with(config), items, config),
            ParsedBind::Or(items) => boolean(BindRules::or_with(config), items, config),
            ParsedBind::Not(inner) => {
                let mut not = BindRules::not_with(config);
                let child = match inner.as_ref() {
                    ParsedBind::Group { inner, padded } => {
                        not.set_paren(true).set_padding(*padded);
                        inner.lower(config)?
                    }
                    other => other.lower(config)?,
                };
                not.try_push(child)?;
                Ok(Node::Stack(not))
            }
            ParsedBind::Group { inner, padded } => {
                let node = inner.lower(config)?;
                // One padding flag covers a condition's parens and operator.
                let wrap = is_parenthesized(&node)
                    || matches!(&node, Node::Stack(s) if s.kind() == StackKind::Not)
                    || matches!(&node, Node::Leaf(c) if c.has_padding() != *padded);
                if wrap {
                    let mut group = BindRules::and_with(config);
                    group.set_paren(true).set_padding(*padded);
                    group.try_push(node)?;
                    return Ok(Node::Stack(group));
                }
                Ok(match node {
                    Node::Leaf(condition) => Node::Leaf(condition.paren(true)),
                    Node::Stack(mut stack) => {
                        stack.set_paren(true).set_padding(*padded);
                        Node::Stack(stack)
                    }
                })
            }
        }
    }
}

fn boolean(
    mut stack: BindRules,
    items: &[ParsedBind],
    config: &Config,
) -> Result<BindRule, AciError> {
    for item in items {
        stack.try_push(item.lower(config)?)?;
    }
    Ok(Node::Stack(stack))
}

impl ParsedPbr {
    pub(crate) fn lower(&self, config: &Config) -> Result<PermissionBindRule, AciError> {
        let bind = self.bind.lower(config)?;
        Ok(PermissionBindRule::try_new(self.permission, bind)?)
    }
}

pub(crate) fn lower_targets(
    targets: &[ParsedCondition],
    config: &Config,
) -> Result<TargetRules, AciError> {
    let mut rules = TargetRules::target_rules_with(config);
    for target in targets {
        rules.try_push(target.lower(true)?)?;
    }
    Ok(rules)
}

pub(crate) fn lower_pbrs(
    pbrs: &[ParsedPbr],
    config: &Config,
) -> Result<PermissionBindRules, AciError> {
    let mut rules = PermissionBindRules::permission_bind_rules();
    for pbr in pbrs {
        rules.try_push(pbr.lower(config)?)?;
    }
    rules.validate()?;
    Ok(rules)
}

impl ParsedInstruction {
    pub(crate) fn lower(&self, config: &Config) -> Result<Instruction, AciError> {
        let targets = lower_targets(&self.targets, config)?;
        let rules = lower_pbrs(&self.rules, config)?;
        let instruction = Instruction::new(&self.name, targets, rules);
        if let Err(err) = instruction.validate() {
            debug!(name = %self.name, error = %err, "parsed instruction failed validation");
            return Err(err.into());
        }
        Ok(instruction)
    }
}

pub(crate) fn lower_instructions(
    parsed: &[ParsedInstruction],
    config: &Config,
) -> Result<Instructions, AciError> {
    let mut list: Instructions = Stack::instructions();
    for instruction in parsed {
        list.try_push(instruction.lower(config)?)?;
    }
    Ok(list)
}
