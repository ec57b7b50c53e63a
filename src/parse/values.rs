//! Parsers for the value side of a condition.

use winnow::ascii::{dec_uint, multispace0};
use winnow::combinator::{cut_err, delimited, preceded, repeat, separated, separated_pair};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, rest, take_till, take_while};

use super::ParseError;
use crate::types::{BindKeyword, Delimiter, Expression, Keyword, QuoteStyle, Stack, TargetKeyword};
use crate::values::{
    AttributeBindTypeOrValue, AttributeFilter, AttributeFilterOperation,
    AttributeFilterOperations, AttributeOperation, AttributeType, AttributeTypes,
    AuthenticationMethod, DayOfWeek, DistinguishedName, DistinguishedNames, Filter, Fqdn,
    Inheritance, IpAddress, Level, ObjectIdentifier, ObjectIdentifiers, SearchScope,
    SecurityStrengthFactor, TimeOfDay, is_identifier, LDAP_PREFIX,
};

fn rule_error(err: impl std::fmt::Display) -> ParseError {
    ParseError::new(err.to_string())
}

// -- Inheritance -------------------------------------------------------------

fn level(input: &mut &str) -> ModalResult<u8> {
    dec_uint::<_, u8, _>
        .verify(|n: &u8| *n <= Level::MAX)
        .context(StrContext::Label("inheritance level"))
        .parse_next(input)
}

fn levels(input: &mut &str) -> ModalResult<Vec<u8>> {
    delimited(
        "parent[",
        cut_err(separated(1.., level, ',')),
        cut_err(']').context(StrContext::Expected(StrContextValue::CharLiteral(']'))),
    )
    .parse_next(input)
}

fn attribute_bind<'i>(input: &mut &'i str) -> ModalResult<(&'i str, &'i str)> {
    separated_pair(
        take_till(1.., '#'),
        '#',
        rest.verify(|s: &str| !s.is_empty()),
    )
    .context(StrContext::Expected(StrContextValue::Description(
        "attribute#bindtype",
    )))
    .parse_next(input)
}

fn inheritance_parts<'i>(input: &mut &'i str) -> ModalResult<(Vec<u8>, &'i str, &'i str)> {
    let lv = levels.parse_next(input)?;
    cut_err('.')
        .context(StrContext::Expected(StrContextValue::CharLiteral('.')))
        .parse_next(input)?;
    let (attr, value) = cut_err(attribute_bind).parse_next(input)?;
    Ok((lv, attr, value))
}

/// Parse an inherited `userattr` value such as `parent[0,5,9].manager#USERDN`.
///
/// # Errors
///
/// Returns [`ParseError`] for malformed text, levels outside `0..=9`,
/// repeated levels, or an attribute that is not an identifier.
pub fn inheritance(raw: &str) -> Result<Inheritance, ParseError> {
    inheritance_for(BindKeyword::UserAttr, raw)
}

/// Parse an inherited value for `userattr` or `groupattr`.
///
/// # Errors
///
/// See [`inheritance`].
pub fn inheritance_for(keyword: impl Into<Keyword>, raw: &str) -> Result<Inheritance, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::new("empty value").within("inheritance"));
    }
    let (lv, attr, value) = inheritance_parts
        .parse(raw)
        .map_err(|e| ParseError::new(e.to_string()).within("inheritance"))?;
    if !is_identifier(attr) {
        return Err(
            ParseError::new(format!("attribute type '{attr}' is not an identifier"))
                .within("inheritance"),
        );
    }
    let abtv = AttributeBindTypeOrValue::new(keyword, AttributeType::new(attr), value);
    Inheritance::try_new(abtv, lv).map_err(|e| rule_error(e).within("inheritance"))
}

/// Parse `attr#BINDTYPE` or `attr#value`.
///
/// # Errors
///
/// Returns [`ParseError`] if the `#` separator, the attribute or the value
/// is missing or invalid.
pub fn attribute_bind_type_or_value(
    keyword: impl Into<Keyword>,
    raw: &str,
) -> Result<AttributeBindTypeOrValue, ParseError> {
    let (attr, value) = attribute_bind
        .parse(raw.trim())
        .map_err(|e| ParseError::new(e.to_string()))?;
    let abtv = AttributeBindTypeOrValue::new(keyword, AttributeType::new(attr), value);
    abtv.validate().map_err(rule_error)?;
    Ok(abtv)
}

// -- Multi-valued lists ------------------------------------------------------

/// Parse `ldap:///dn || ldap:///dn ...` for a DN keyword.
///
/// # Errors
///
/// Returns [`ParseError`] if any value lacks the `ldap:///` prefix or is not
/// a valid DN for `keyword`.
pub fn distinguished_names(
    keyword: impl Into<Keyword>,
    raw: &str,
) -> Result<DistinguishedNames, ParseError> {
    let keyword = keyword.into();
    let mut list = DistinguishedNames::distinguished_names(keyword);
    for token in raw.split("||").map(str::trim) {
        if !token.starts_with(LDAP_PREFIX) {
            return Err(ParseError::new(format!(
                "distinguished name '{token}' lacks the {LDAP_PREFIX} prefix"
            )));
        }
        let dn = DistinguishedName::try_new(keyword, token).map_err(rule_error)?;
        list.try_push(dn).map_err(rule_error)?;
    }
    Ok(list)
}

/// Parse `oid || oid ...` for `targetcontrol` or `extop`.
///
/// # Errors
///
/// Returns [`ParseError`] if any value is not a dotted-decimal OID.
pub fn object_identifiers(
    keyword: impl Into<Keyword>,
    raw: &str,
) -> Result<ObjectIdentifiers, ParseError> {
    let keyword = keyword.into();
    let mut list = ObjectIdentifiers::object_identifiers(keyword);
    for token in raw.split("||") {
        let oid = ObjectIdentifier::try_new(keyword, token).map_err(rule_error)?;
        list.try_push(oid).map_err(rule_error)?;
    }
    Ok(list)
}

/// Parse `attr || attr ...` for `targetattr`.
///
/// # Errors
///
/// Returns [`ParseError`] if any value is not an attribute type.
pub fn attribute_types(raw: &str) -> Result<AttributeTypes, ParseError> {
    let mut list = AttributeTypes::attribute_types();
    for token in raw.split("||") {
        let attr = AttributeType::new(token);
        if attr.is_zero() {
            return Err(ParseError::new(format!(
                "invalid attribute type '{}'",
                token.trim()
            )));
        }
        list.try_push(attr).map_err(rule_error)?;
    }
    Ok(list)
}

// -- Attribute filter operations ---------------------------------------------

/// A balanced parenthesized group, e.g. `(&(a=b)(!(c=d)))`.
fn balanced<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return Ok(input.next_slice(i + 1));
                }
            }
            _ if depth == 0 => break,
            _ => {}
        }
    }
    Err(ErrMode::from_input(input))
}

fn attribute_filter(input: &mut &str) -> ModalResult<AttributeFilter> {
    let (attr, filter) = separated_pair(
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-' || c == ';'),
        ':',
        cut_err(balanced).context(StrContext::Expected(StrContextValue::Description(
            "parenthesized filter",
        ))),
    )
    .parse_next(input)?;
    Ok(AttributeFilter::new(attr, filter))
}

fn operation(input: &mut &str) -> ModalResult<AttributeFilterOperation> {
    let op = take_while(1.., |c: char| c.is_ascii_alphabetic())
        .verify_map(AttributeOperation::matching)
        .context(StrContext::Label("attribute operation"))
        .parse_next(input)?;
    cut_err('=').parse_next(input)?;
    let filters: Vec<AttributeFilter> = cut_err(separated(
        1..,
        attribute_filter,
        (multispace0, "&&", multispace0),
    ))
    .parse_next(input)?;
    Ok(filters
        .into_iter()
        .fold(AttributeFilterOperation::new(op), AttributeFilterOperation::with))
}

fn operations(input: &mut &str) -> ModalResult<(Vec<AttributeFilterOperation>, Option<char>)> {
    let first = operation.parse_next(input)?;
    let rest: Vec<(char, AttributeFilterOperation)> = repeat(
        0..,
        (
            delimited(multispace0, one_of([',', ';']), multispace0),
            cut_err(operation),
        ),
    )
    .parse_next(input)?;
    let delimiter = rest.first().map(|(c, _)| *c);
    let mut ops = vec![first];
    ops.extend(rest.into_iter().map(|(_, op)| op));
    Ok((ops, delimiter))
}

fn checked(op: AttributeFilterOperation) -> Result<AttributeFilterOperation, ParseError> {
    if let Some(bad) = op.filters().iter().find(|f| f.validate().is_err()) {
        return Err(ParseError::new(format!("invalid attribute filter '{bad}'")));
    }
    op.validate().map_err(rule_error)?;
    Ok(op)
}

/// Parse one `add=attr:(filter) && ...` operation.
///
/// # Errors
///
/// Returns [`ParseError`] for an unknown operation or malformed filters.
pub fn attribute_filter_operation(raw: &str) -> Result<AttributeFilterOperation, ParseError> {
    let op = preceded(multispace0, operation)
        .parse(raw.trim_end())
        .map_err(|e| ParseError::new(e.to_string()))?;
    checked(op)
}

/// Parse a `,`- or `;`-delimited list of attribute filter operations. The
/// delimiter found is kept for rendering.
///
/// # Errors
///
/// Returns [`ParseError`] for malformed operations.
pub fn attribute_filter_operations(raw: &str) -> Result<AttributeFilterOperations, ParseError> {
    let (ops, delimiter) = preceded(multispace0, operations)
        .parse(raw.trim_end())
        .map_err(|e| ParseError::new(e.to_string()))?;
    let mut list = AttributeFilterOperations::attribute_filter_operations();
    if delimiter == Some(';') {
        list.set_delimiter(Delimiter::Semicolon);
    }
    for op in ops {
        list.try_push(checked(op)?).map_err(rule_error)?;
    }
    Ok(list)
}

// -- Keyword dispatch --------------------------------------------------------

fn single_or_list<T>(mut list: Stack<T>, quote: QuoteStyle) -> Expression
where
    T: crate::types::Element,
    Stack<T>: Into<Expression>,
{
    if list.len() == 1 && quote == QuoteStyle::Outer {
        if let Some(value) = list.leaves().next() {
            return Expression::Value(value.to_string());
        }
    }
    list.set_quote_style(quote);
    list.into()
}

/// Build the expression for `keyword` from its quoted value(s).
pub(crate) fn expression(
    keyword: Keyword,
    values: &[String],
    quote: QuoteStyle,
) -> Result<Expression, ParseError> {
    let joined = values.join(" || ");
    let scalar = || -> Result<&str, ParseError> {
        match values {
            [value] => Ok(value.as_str()),
            _ => Err(ParseError::new(format!(
                "keyword '{keyword}' takes a single value"
            ))),
        }
    };

    let expr = match keyword {
        Keyword::Target(TargetKeyword::Target | TargetKeyword::TargetTo | TargetKeyword::TargetFrom)
        | Keyword::Bind(BindKeyword::UserDn | BindKeyword::RoleDn | BindKeyword::GroupDn) => {
            single_or_list(distinguished_names(keyword, &joined)?, quote)
        }
        Keyword::Target(TargetKeyword::TargetControl | TargetKeyword::ExtOp) => {
            single_or_list(object_identifiers(keyword, &joined)?, quote)
        }
        Keyword::Target(TargetKeyword::TargetAttr) => {
            single_or_list(attribute_types(&joined)?, quote)
        }
        Keyword::Target(TargetKeyword::TargetAttrFilters) => {
            let ops = attribute_filter_operations(scalar()?)?;
            single_or_list(ops, QuoteStyle::Outer)
        }
        Keyword::Target(TargetKeyword::TargetScope) => {
            Expression::Value(scalar()?.parse::<SearchScope>()?.to_string())
        }
        Keyword::Target(TargetKeyword::TargetFilter) => {
            Expression::Value(scalar()?.parse::<Filter>()?.to_string())
        }
        Keyword::Bind(BindKeyword::Ip) => {
            Expression::Value(scalar()?.parse::<IpAddress>()?.to_string())
        }
        Keyword::Bind(BindKeyword::Dns) => {
            Expression::Value(scalar()?.parse::<Fqdn>()?.to_string())
        }
        Keyword::Bind(BindKeyword::AuthMethod) => {
            Expression::Value(scalar()?.parse::<AuthenticationMethod>()?.to_string())
        }
        Keyword::Bind(BindKeyword::UserAttr | BindKeyword::GroupAttr) => {
            let value = scalar()?;
            let text = if value.starts_with("parent[") {
                inheritance_for(keyword, value)?.to_string()
            } else {
                attribute_bind_type_or_value(keyword, value)?.to_string()
            };
            Expression::Value(text)
        }
        Keyword::Bind(BindKeyword::DayOfWeek) => {
            Expression::Value(scalar()?.parse::<DayOfWeek>()?.to_string())
        }
        Keyword::Bind(BindKeyword::Ssf) => {
            Expression::Value(scalar()?.parse::<SecurityStrengthFactor>()?.to_string())
        }
        Keyword::Bind(BindKeyword::TimeOfDay) => {
            Expression::Value(scalar()?.parse::<TimeOfDay>()?.to_string())
        }
    };
    Ok(expr)
}
