use aciv3::values::{
    AttributeBindTypeOrValue, AttributeTypes, BindType, Day, DayOfWeek, DistinguishedName,
    Inheritance, SearchScope, SecurityStrengthFactor,
};
use aciv3::{BindRules, Instruction, Permission, PermissionBindRule, Right, TargetRules};

fn main() {
    // Targets: who the instruction applies to
    let mut attrs = AttributeTypes::attribute_types();
    attrs.push_attr("telephoneNumber").push_attr("mobile");
    let targets = TargetRules::target_rules()
        .with(DistinguishedName::target("ou=People,dc=example,dc=com").eq())
        .with(attrs.eq())
        .with(SearchScope::Subtree.eq());

    // Bind rule: managers on weekdays over an encrypted connection
    let manager = Inheritance::new(
        AttributeBindTypeOrValue::userattr("manager", BindType::UserDn),
        [0, 1],
    );
    let weekdays: DayOfWeek = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri]
        .into_iter()
        .collect();
    let mut ssf = SecurityStrengthFactor::default();
    ssf.set(128);

    let bind = BindRules::and()
        .with(manager.eq())
        .with(weekdays.eq())
        .with(ssf.ge());

    let aci = Instruction::new(
        "Managers edit phone numbers",
        targets,
        PermissionBindRule::new(Permission::allow([Right::Read, Right::Write]), bind),
    );

    match aci.validate() {
        Ok(()) => println!("{aci}"),
        Err(err) => eprintln!("invalid instruction: {err}"),
    }
}
