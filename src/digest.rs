//! BLAKE3 digests of rendered rule text.

use std::fmt;

use crate::{BindRules, Condition, Instruction, Instructions, PermissionBindRule};

/// A 32-byte BLAKE3 digest. Displays as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 32]);

impl Digest {
    fn of(text: &str) -> Self {
        Self(*blake3::hash(text.as_bytes()).as_bytes())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

/// Digest of a value's rendered text. Two values with equal digests render
/// identically.
pub trait Digestible: fmt::Display {
    fn digest(&self) -> Digest {
        Digest::of(&self.to_string())
    }
}

impl Digestible for Condition {}
impl Digestible for BindRules {}
impl Digestible for PermissionBindRule {}
impl Digestible for Instruction {}
impl Digestible for Instructions {}

impl Instructions {
    /// Order-independent digest: the digest of the sorted member digests.
    #[must_use]
    pub fn set_digest(&self) -> Digest {
        let mut members: Vec<Digest> = self.leaves().map(Digestible::digest).collect();
        members.sort_unstable();
        let mut hasher = blake3::Hasher::new();
        for member in &members {
            hasher.update(member.as_bytes());
        }
        Digest(*hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: &str = r#"(version 3.0; acl "one"; allow(read) userdn = "ldap:///anyone";)"#;
    const TWO: &str = r#"( targetattr = "cn" )(version 3.0; acl "two"; deny(write) ssf < "56";)"#;

    #[test]
    fn digest_follows_text() {
        let a: Instruction = ONE.parse().unwrap();
        let b: Instruction = ONE.parse().unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().to_string().len(), 64);
        let c: Instruction = TWO.parse().unwrap();
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn set_digest_ignores_order() {
        let forward: Instructions = format!("{ONE}\n{TWO}").parse().unwrap();
        let reverse: Instructions = format!("{TWO}\n{ONE}").parse().unwrap();
        assert_ne!(forward.digest(), reverse.digest());
        assert_eq!(forward.set_digest(), reverse.set_digest());
    }
}
