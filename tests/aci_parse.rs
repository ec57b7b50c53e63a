use aciv3::values::{DistinguishedName, TimeOfDay};
use aciv3::{
    parse, AciError, BindRules, Instruction, Instructions, Node, Permission, PermissionBindRule,
    Right, RuleError, StackKind, TargetRules,
};

const TIMEFRAME: &str = r#"( target = "ldap:///uid=*,ou=People,dc=example,dc=com" )(version 3.0; acl "Limit people access to timeframe"; allow(read,search,compare) ( timeofday >= "1730" AND timeofday < "2400" );)"#;

#[test]
fn end_to_end_assembly_matches_text() {
    let targets = TargetRules::target_rules()
        .with(DistinguishedName::target("uid=*,ou=People,dc=example,dc=com").eq());
    let window = BindRules::and()
        .paren(true)
        .with(TimeOfDay::from_hhmm("1730").ge())
        .with(TimeOfDay::from_hhmm("2400").lt());
    let pbr = PermissionBindRule::new(
        Permission::allow([Right::Read, Right::Search, Right::Compare]),
        window,
    );
    let aci = Instruction::new("Limit people access to timeframe", targets, pbr);
    assert_eq!(aci.to_string(), TIMEFRAME);

    let parsed: Instruction = TIMEFRAME.parse().unwrap();
    assert_eq!(parsed.to_string(), TIMEFRAME);
    assert_eq!(parsed, aci);
}

#[test]
fn simple_round_trips() {
    for src in [
        r#"(version 3.0; acl "Anonymous read"; allow(read,search) userdn = "ldap:///anyone";)"#,
        r#"( targetattr = "cn || sn || givenName" )(version 3.0; acl "names"; allow(read) userdn = "ldap:///all";)"#,
        r#"( targetattr = "cn" || "sn" || "givenName" )(version 3.0; acl "names"; allow(read) userdn = "ldap:///all";)"#,
        r#"( targetscope = "onelevel" ) ( targetfilter = "(objectClass=person)" )(version 3.0; acl "people"; deny(all) authmethod = "NONE";)"#,
        r#"( extop = "1.3.6.1.4.1.1466.20037" )(version 3.0; acl "starttls"; allow(read) ssf >= "128";)"#,
        r#"( targetcontrol = "1.2.840.113556.1.4.319 || 1.2.840.113556.1.4.473" )(version 3.0; acl "controls"; allow(read) ip = "192.168.*,10.0.0.1";)"#,
        r#"(version 3.0; acl "weekend"; deny(write,add,delete) dayofweek = "Sun,Sat";)"#,
        r#"(version 3.0; acl "hosts"; allow(all,proxy) dns = "*.example.com";)"#,
        r#"(version 3.0; acl "managers"; allow(selfwrite) userattr = "parent[0,1].manager#USERDN";)"#,
        r#"(version 3.0; acl "owners"; allow(write) groupattr = "owner#GROUPDN";)"#,
        r#"(version 3.0; acl "two rules"; allow(read) userdn = "ldap:///anyone"; deny(none) roledn = "ldap:///cn=Guests,dc=example,dc=com";)"#,
    ] {
        let aci = parse::instruction(src).unwrap_or_else(|e| panic!("{src}: {e}"));
        assert_eq!(aci.to_string(), src);
    }
}

#[test]
fn nested_round_trips() {
    for src in [
        r#"(version 3.0; acl "n1"; allow(read) userdn = "ldap:///anyone" AND NOT ( ip = "10.0.0.1" OR ip = "10.0.0.2" );)"#,
        r#"(version 3.0; acl "n2"; allow(read) ( ssf >= "128" AND ( timeofday >= "0800" AND timeofday < "1700" ) ) OR userdn = "ldap:///cn=Directory Manager";)"#,
        r#"(version 3.0; acl "n3"; allow(read) NOT NOT authmethod = "SIMPLE";)"#,
        r#"(version 3.0; acl "n4"; allow(read) ( ( userdn = "ldap:///self" ) );)"#,
        r#"(version 3.0; acl "n5"; allow(read) ( NOT dns = "example.com" ) AND ssf > "0";)"#,
        r#"(version 3.0; acl "n6"; allow(read) ( groupdn = "ldap:///cn=a,dc=example,dc=com" );)"#,
    ] {
        let aci = parse::instruction(src).unwrap_or_else(|e| panic!("{src}: {e}"));
        assert_eq!(aci.to_string(), src);
    }
}

#[test]
fn nested_structure() {
    let rule = parse::bind_rule(
        r#"userdn = "ldap:///anyone" AND NOT ( ip = "10.0.0.1" OR ip = "10.0.0.2" )"#,
    )
    .unwrap();
    let Node::Stack(and) = rule else {
        panic!("expected a stack");
    };
    assert_eq!(and.kind(), StackKind::And);
    assert_eq!(and.len(), 2);
    let not = and.get(1).and_then(Node::as_stack).unwrap();
    assert_eq!(not.kind(), StackKind::Not);
    assert!(not.is_parenthesized());
    let or = not.get(0).and_then(Node::as_stack).unwrap();
    assert_eq!(or.kind(), StackKind::Or);
    assert_eq!(or.len(), 2);
}

#[test]
fn lowercase_boolean_words_normalize() {
    let rule = parse::bind_rule(r#"ssf >= "128" and not ip = "10.0.0.1" or dns = "example.com""#)
        .unwrap();
    assert_eq!(
        rule.to_string(),
        r#"ssf >= "128" AND NOT ip = "10.0.0.1" OR dns = "example.com""#
    );
}

#[test]
fn values_are_canonicalized() {
    let aci = parse::instruction(
        r#"( targetscope = "sub" )(version 3.0; acl "c"; allow(READ, Search) authmethod = "anonymous" AND dayofweek = "friday,mon" AND ssf >= "max";)"#,
    )
    .unwrap();
    assert_eq!(
        aci.to_string(),
        r#"( targetscope = "subtree" )(version 3.0; acl "c"; allow(read,search) authmethod = "NONE" AND dayofweek = "Mon,Fri" AND ssf >= "256";)"#
    );
}

#[test]
fn unpadded_input_keeps_its_shape() {
    let src = r#"(targetattr="cn")(version 3.0; acl "tight"; allow(read) userdn="ldap:///anyone";)"#;
    assert_eq!(parse::instruction(src).unwrap().to_string(), src);
}

#[test]
fn invalid_rules_are_rule_errors() {
    let cases = [
        r#"( targetscope != "base" )(version 3.0; acl "x"; allow(read) userdn = "ldap:///anyone";)"#,
        r#"( target = "ldap:///anyone" )( target = "ldap:///self" )(version 3.0; acl "x"; allow(read) userdn = "ldap:///anyone";)"#,
        r#"( userdn = "ldap:///anyone" )(version 3.0; acl "x"; allow(read) userdn = "ldap:///anyone";)"#,
        r#"(version 3.0; acl "x"; allow(read) targetattr = "cn";)"#,
        r#"(version 3.0; acl "x"; allow(read) ip > "10.0.0.1";)"#,
        r#"(version 3.0; acl "x"; allow(read) userdn = "ldap:///anyone"; allow(read) userdn = "ldap:///anyone";)"#,
    ];
    for src in cases {
        let err = parse::instruction(src).unwrap_err();
        assert!(matches!(err, AciError::Rule(_)), "{src}: {err}");
    }

    let err = parse::instruction(cases[1]).unwrap_err();
    assert!(matches!(err, AciError::Rule(RuleError::DuplicateKeyword { .. })));
}

#[test]
fn malformed_text_is_a_parse_error() {
    for src in [
        "",
        r#"(version 3.0; acl "x"; allow(read) userdn = "ldap:///anyone""#,
        r#"(version 3.0; acl "x"; allow(read) userdn = "uid=x,dc=example,dc=com";)"#,
        r#"(version 3.0; acl "x"; allow(read) ssf >= "fast";)"#,
        r#"(version 3.0; acl "x"; allow(read) userattr = "parent[10].manager#USERDN";)"#,
        r#"(version 3.0; acl "x"; allow(read) ( ssf >= "1";)"#,
        r#"(version 3.0; acl "x"; allow(read) ssf >= "1" AND;)"#,
        r#"( targetfilter = "objectClass=*" )(version 3.0; acl "x"; allow(read) ssf >= "1";)"#,
    ] {
        let err = parse::instruction(src).unwrap_err();
        assert!(matches!(err, AciError::Parse(_)), "{src}: {err}");
    }
}

#[test]
fn instruction_lists() {
    let text = format!(
        "{TIMEFRAME}\n\n  (version 3.0; acl \"second\"; deny(write) ssf < \"56\";)\n"
    );
    let list: Instructions = text.parse().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(
        list.to_string(),
        format!("{TIMEFRAME}\n(version 3.0; acl \"second\"; deny(write) ssf < \"56\";)")
    );
    assert!(parse::instructions("").unwrap().is_empty());

    let twice = format!("{TIMEFRAME}\n{TIMEFRAME}");
    assert!(matches!(
        parse::instructions(&twice),
        Err(AciError::Rule(RuleError::DuplicateValue { .. }))
    ));
}

#[test]
fn partial_parsers() {
    let targets =
        parse::target_rules(r#"( targetattr = "*" ) ( targetscope = "base" )"#).unwrap();
    assert_eq!(targets.len(), 2);
    assert!(targets.contains("targetscope"));

    let rules = parse::permission_bind_rules(
        r#"allow(read) userdn = "ldap:///anyone"; deny(write) ssf < "128";"#,
    )
    .unwrap();
    assert_eq!(rules.len(), 2);

    let c = parse::condition(r#"( targetscope = "base" )"#).unwrap();
    assert!(c.is_parenthesized());
    let c: aciv3::Condition = r#"timeofday < "0800""#.parse().unwrap();
    assert!(!c.is_parenthesized());
    assert_eq!(c.to_string(), r#"timeofday < "0800""#);
}

#[test]
fn parse_errors_name_the_construct() {
    let Err(AciError::Parse(err)) = parse::bind_rule(r#"ssf >= "1" AND"#) else {
        panic!("expected a parse error");
    };
    assert_eq!(err.context(), Some("bind rule"));
    assert!(err.to_string().starts_with("malformed bind rule: "));

    let err = parse::inheritance("parent[4]#ROLEDN").unwrap_err();
    assert_eq!(err.context(), Some("inheritance"));
}

#[test]
fn group_spacing_is_kept_as_written() {
    for src in [
        r#"(ssf >= "1")"#,
        r#"( ssf>="1" )"#,
        r#"(ssf>="1")"#,
        r#"( ssf >= "1" )"#,
        r#"(userdn = "ldap:///anyone") AND (ssf>="1")"#,
    ] {
        let rule = parse::bind_rule(src).unwrap_or_else(|e| panic!("{src}: {e}"));
        assert_eq!(rule.to_string(), src);
    }
}
