use aciv3::{parse, Node};

const ACI: &str = r#"( targetattr = "userPassword" )(version 3.0; acl "Self password change"; allow(write) userdn = "ldap:///self" AND ( ssf >= "128" OR ip = "127.0.0.1" );)"#;

fn main() {
    let aci = match parse::instruction(ACI) {
        Ok(aci) => aci,
        Err(err) => {
            eprintln!("failed to parse: {err}");
            return;
        }
    };

    println!("name: {}", aci.name());
    for target in aci.target_rules().leaves() {
        println!("target: {target}");
    }
    for pbr in aci.permission_bind_rules().leaves() {
        println!("permission: {}", pbr.permission());
        match pbr.bind_rule() {
            Node::Leaf(condition) => println!("  condition: {condition}"),
            Node::Stack(stack) => {
                println!("  {} of {} rule(s)", stack.kind(), stack.len());
                for node in stack {
                    println!("    {node}");
                }
            }
        }
    }

    println!("{aci}");
}
