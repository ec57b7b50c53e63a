use winnow::ascii::{multispace0, Caseless};
use winnow::combinator::{alt, cut_err, delimited, not, opt, preceded, repeat, separated, terminated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

use crate::instruction::{Disposition, Permission, Right};
use crate::types::{ComparisonOperator, Keyword, QuoteStyle};

use super::parser::{ParsedBind, ParsedCondition, ParsedInstruction, ParsedPbr};

// -- Whitespace & words -----------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

fn boundary(input: &mut &str) -> ModalResult<()> {
    not(one_of(|c: char| c.is_ascii_alphanumeric() || c == '_')).parse_next(input)
}

fn and_word(input: &mut &str) -> ModalResult<()> {
    (ws, Caseless("AND"), boundary).void().parse_next(input)
}

fn or_word(input: &mut &str) -> ModalResult<()> {
    (ws, Caseless("OR"), boundary).void().parse_next(input)
}

fn not_word(input: &mut &str) -> ModalResult<()> {
    (Caseless("NOT"), boundary).void().parse_next(input)
}

// -- Conditions -------------------------------------------------------------

fn keyword(input: &mut &str) -> ModalResult<Keyword> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_')
        .verify_map(Keyword::matching)
        .context(StrContext::Label("keyword"))
        .parse_next(input)
}

fn operator(input: &mut &str) -> ModalResult<ComparisonOperator> {
    alt((
        ">=".value(ComparisonOperator::Ge),
        "<=".value(ComparisonOperator::Le),
        "!=".value(ComparisonOperator::Ne),
        "=".value(ComparisonOperator::Eq),
        ">".value(ComparisonOperator::Gt),
        "<".value(ComparisonOperator::Lt),
    ))
    .context(StrContext::Label("comparison operator"))
    .parse_next(input)
}

fn quoted<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited(
        '"',
        take_till(0.., '"'),
        cut_err('"').context(StrContext::Expected(StrContextValue::CharLiteral('"'))),
    )
    .parse_next(input)
}

/// `"a || b"` keeps one quoted value, `"a" || "b"` is quoted per element.
fn quoted_values(input: &mut &str) -> ModalResult<(Vec<String>, QuoteStyle)> {
    let values: Vec<&str> = separated(1.., quoted, (ws, "||", ws)).parse_next(input)?;
    let quote = if values.len() > 1 {
        QuoteStyle::PerElement
    } else {
        QuoteStyle::Outer
    };
    Ok((values.into_iter().map(str::to_owned).collect(), quote))
}

fn condition(input: &mut &str) -> ModalResult<ParsedCondition> {
    let keyword = keyword.parse_next(input)?;
    let gap = multispace0.parse_next(input)?;
    let operator = cut_err(operator).parse_next(input)?;
    ws.parse_next(input)?;
    let (values, quote) = cut_err(quoted_values)
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted value",
        )))
        .parse_next(input)?;
    Ok(ParsedCondition {
        keyword,
        operator,
        values,
        quote,
        padded: !gap.is_empty(),
    })
}

fn target_rule(input: &mut &str) -> ModalResult<ParsedCondition> {
    delimited(
        ('(', ws),
        condition,
        (
            ws,
            cut_err(')').context(StrContext::Expected(StrContextValue::CharLiteral(')'))),
        ),
    )
    .parse_next(input)
}

// -- Bind rules (precedence: OR < AND < NOT < primary) ----------------------

fn group(input: &mut &str) -> ModalResult<ParsedBind> {
    '('.parse_next(input)?;
    let gap = multispace0.parse_next(input)?;
    let inner = cut_err(or_expr).parse_next(input)?;
    ws.parse_next(input)?;
    cut_err(')')
        .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
        .parse_next(input)?;
    Ok(ParsedBind::Group {
        inner: Box::new(inner),
        padded: !gap.is_empty(),
    })
}

fn primary(input: &mut &str) -> ModalResult<ParsedBind> {
    ws.parse_next(input)?;
    alt((group, condition.map(ParsedBind::Condition)))
        .context(StrContext::Expected(StrContextValue::Description(
            "bind rule",
        )))
        .parse_next(input)
}

fn unary(input: &mut &str) -> ModalResult<ParsedBind> {
    ws.parse_next(input)?;
    if opt(not_word).parse_next(input)?.is_some() {
        let inner = cut_err(unary).parse_next(input)?;
        Ok(ParsedBind::Not(Box::new(inner)))
    } else {
        primary(input)
    }
}

fn and_expr(input: &mut &str) -> ModalResult<ParsedBind> {
    let first = unary(input)?;
    let rest: Vec<ParsedBind> = repeat(0.., preceded(and_word, cut_err(unary))).parse_next(input)?;
    if rest.is_empty() {
        return Ok(first);
    }
    Ok(ParsedBind::And(std::iter::once(first).chain(rest).collect()))
}

fn or_expr(input: &mut &str) -> ModalResult<ParsedBind> {
    let first = and_expr(input)?;
    let rest: Vec<ParsedBind> =
        repeat(0.., preceded(or_word, cut_err(and_expr))).parse_next(input)?;
    if rest.is_empty() {
        return Ok(first);
    }
    Ok(ParsedBind::Or(std::iter::once(first).chain(rest).collect()))
}

// -- Permissions ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Grant {
    All,
    Nothing,
    Right(Right),
}

fn grant(input: &mut &str) -> ModalResult<Grant> {
    take_while(1.., |c: char| c.is_ascii_alphabetic())
        .verify_map(|word: &str| {
            if word.eq_ignore_ascii_case("all") {
                Some(Grant::All)
            } else if word.eq_ignore_ascii_case("none") {
                Some(Grant::Nothing)
            } else {
                Right::matching(word).map(Grant::Right)
            }
        })
        .context(StrContext::Label("right"))
        .parse_next(input)
}

fn disposition(input: &mut &str) -> ModalResult<Disposition> {
    alt((
        Caseless("allow").value(Disposition::Allow),
        Caseless("deny").value(Disposition::Deny),
    ))
    .context(StrContext::Label("permission"))
    .parse_next(input)
}

fn permission(input: &mut &str) -> ModalResult<Permission> {
    let disposition = disposition.parse_next(input)?;
    (ws, cut_err('('), ws).parse_next(input)?;
    let grants: Vec<Grant> = cut_err(separated(1.., grant, (ws, ',', ws))).parse_next(input)?;
    (ws, cut_err(')')).parse_next(input)?;
    let rights = grants.iter().filter_map(|g| match g {
        Grant::Right(right) => Some(*right),
        Grant::All | Grant::Nothing => None,
    });
    let mut permission = Permission::new(disposition, rights);
    if grants.contains(&Grant::All) {
        permission.shift_all();
    }
    Ok(permission)
}

fn pbr(input: &mut &str) -> ModalResult<ParsedPbr> {
    ws.parse_next(input)?;
    let permission = permission.parse_next(input)?;
    let bind = cut_err(or_expr).parse_next(input)?;
    ws.parse_next(input)?;
    cut_err(';')
        .context(StrContext::Expected(StrContextValue::CharLiteral(';')))
        .parse_next(input)?;
    Ok(ParsedPbr { permission, bind })
}

// -- Instructions -----------------------------------------------------------

fn header(input: &mut &str) -> ModalResult<()> {
    (
        '(',
        ws,
        Caseless("version"),
        ws,
        cut_err("3.0").context(StrContext::Expected(StrContextValue::StringLiteral("3.0"))),
        ws,
        cut_err(';'),
        ws,
        cut_err(Caseless("acl")).context(StrContext::Expected(StrContextValue::StringLiteral("acl"))),
        ws,
    )
        .void()
        .parse_next(input)
}

fn instruction(input: &mut &str) -> ModalResult<ParsedInstruction> {
    ws.parse_next(input)?;
    let targets: Vec<ParsedCondition> = repeat(0.., terminated(target_rule, ws)).parse_next(input)?;
    header.parse_next(input)?;
    let name = cut_err(quoted)
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted instruction name",
        )))
        .parse_next(input)?;
    (ws, cut_err(';')).parse_next(input)?;
    let rules: Vec<ParsedPbr> = cut_err(repeat(1.., pbr)).parse_next(input)?;
    (ws, cut_err(')')).parse_next(input)?;
    Ok(ParsedInstruction {
        targets,
        name: name.to_owned(),
        rules,
    })
}

// -- Entry points -----------------------------------------------------------

/// A single condition, optionally parenthesized. Returns whether it was.
pub(super) fn parse_condition(input: &mut &str) -> ModalResult<(ParsedCondition, bool)> {
    delimited(
        ws,
        alt((target_rule.map(|c| (c, true)), condition.map(|c| (c, false)))),
        ws,
    )
    .parse_next(input)
}

pub(super) fn parse_target_rules(input: &mut &str) -> ModalResult<Vec<ParsedCondition>> {
    preceded(ws, repeat(0.., terminated(target_rule, ws))).parse_next(input)
}

pub(super) fn parse_bind_rule(input: &mut &str) -> ModalResult<ParsedBind> {
    terminated(or_expr, ws).parse_next(input)
}

pub(super) fn parse_permission(input: &mut &str) -> ModalResult<Permission> {
    delimited(ws, permission, ws).parse_next(input)
}

pub(super) fn parse_pbrs(input: &mut &str) -> ModalResult<Vec<ParsedPbr>> {
    terminated(repeat(1.., pbr), ws).parse_next(input)
}

pub(super) fn parse_instruction(input: &mut &str) -> ModalResult<ParsedInstruction> {
    terminated(instruction, ws).parse_next(input)
}

pub(super) fn parse_instructions(input: &mut &str) -> ModalResult<Vec<ParsedInstruction>> {
    terminated(repeat(0.., instruction), ws).parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BindKeyword, TargetKeyword};

    fn bind(src: &str) -> ParsedBind {
        parse_bind_rule.parse(src).unwrap()
    }

    #[test]
    fn condition_padding_and_quotes() {
        let (c, paren) = parse_condition.parse(r#"ssf>="128""#).unwrap();
        assert!(!paren);
        assert!(!c.padded);
        assert_eq!(c.keyword, Keyword::Bind(BindKeyword::Ssf));
        assert_eq!(c.operator, ComparisonOperator::Ge);
        assert_eq!(c.values, vec!["128".to_owned()]);

        let (c, paren) =
            parse_condition.parse(r#"( targetattr = "cn" || "sn" )"#).unwrap();
        assert!(paren);
        assert!(c.padded);
        assert_eq!(c.quote, QuoteStyle::PerElement);
        assert_eq!(c.values.len(), 2);
    }

    #[test]
    fn operators_longest_first() {
        for (src, op) in [
            (r#"timeofday <= "0800""#, ComparisonOperator::Le),
            (r#"timeofday < "0800""#, ComparisonOperator::Lt),
            (r#"timeofday >= "0800""#, ComparisonOperator::Ge),
            (r#"timeofday > "0800""#, ComparisonOperator::Gt),
            (r#"timeofday != "0800""#, ComparisonOperator::Ne),
            (r#"timeofday = "0800""#, ComparisonOperator::Eq),
        ] {
            let (c, _) = parse_condition.parse(src).unwrap();
            assert_eq!(c.operator, op, "{src}");
        }
    }

    #[test]
    fn unknown_keyword_rejected() {
        assert!(parse_condition.parse(r#"usrdn = "ldap:///anyone""#).is_err());
        assert!(parse_condition.parse(r#"userdn == "ldap:///anyone""#).is_err());
        assert!(parse_condition.parse(r#"userdn = "ldap:///anyone"#).is_err());
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let tree = bind(r#"ssf >= "128" AND ip = "10.0.0.1" OR dns = "example.com""#);
        match tree {
            ParsedBind::Or(items) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(&items[0], ParsedBind::And(inner) if inner.len() == 2));
                assert!(matches!(&items[1], ParsedBind::Condition(_)));
            }
            other => panic!("expected OR, got {other:?}"),
        }
    }

    #[test]
    fn chains_flatten() {
        let tree = bind(r#"ssf > "1" and ssf > "2" AND ssf > "3""#);
        assert!(matches!(tree, ParsedBind::And(items) if items.len() == 3));
    }

    #[test]
    fn not_and_groups() {
        let tree = bind(r#"userdn = "ldap:///anyone" AND NOT ( ip = "10.0.0.1" OR ip = "10.0.0.2" )"#);
        let ParsedBind::And(items) = tree else {
            panic!("expected AND");
        };
        let ParsedBind::Not(inner) = &items[1] else {
            panic!("expected NOT");
        };
        assert!(matches!(
            inner.as_ref(),
            ParsedBind::Group { padded: true, inner } if matches!(inner.as_ref(), ParsedBind::Or(_))
        ));
    }

    #[test]
    fn keyword_prefix_is_not_an_operator_word() {
        // "ORx" must not be read as OR followed by x.
        assert!(parse_bind_rule.parse(r#"ssf > "1" ORx ssf > "2""#).is_err());
    }

    #[test]
    fn permissions() {
        let p = parse_permission.parse("allow(read, search,compare)").unwrap();
        assert_eq!(p.to_string(), "allow(read,search,compare)");
        let p = parse_permission.parse("DENY (all,proxy)").unwrap();
        assert_eq!(p.to_string(), "deny(all,proxy)");
        let p = parse_permission.parse("allow(none)").unwrap();
        assert_eq!(p.to_string(), "allow(none)");
        assert!(parse_permission.parse("allow()").is_err());
        assert!(parse_permission.parse("allow(fly)").is_err());
        assert!(parse_permission.parse("permit(read)").is_err());
    }

    #[test]
    fn instruction_shape() {
        let src = r#"( targetscope = "subtree" )( targetattr = "cn" )(version 3.0; acl "x"; allow(read) userdn = "ldap:///anyone"; deny(write) ssf < "56";)"#;
        let parsed = parse_instruction.parse(src).unwrap();
        assert_eq!(parsed.name, "x");
        assert_eq!(parsed.targets.len(), 2);
        assert_eq!(parsed.targets[0].keyword, Keyword::Target(TargetKeyword::TargetScope));
        assert_eq!(parsed.rules.len(), 2);
    }

    #[test]
    fn malformed_instructions() {
        for src in [
            r#"(version 2.0; acl "x"; allow(read) userdn = "ldap:///anyone";)"#,
            r#"(version 3.0; acl x; allow(read) userdn = "ldap:///anyone";)"#,
            r#"(version 3.0; acl "x";)"#,
            r#"(version 3.0; acl "x"; allow(read) userdn = "ldap:///anyone")"#,
            r#"(version 3.0; acl "x"; allow(read) userdn = "ldap:///anyone";"#,
        ] {
            assert!(parse_instruction.parse(src).is_err(), "{src} should be rejected");
        }
    }
}
