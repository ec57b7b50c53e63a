//! `serde` support through the rule text of each type.
//!
//! Values serialize as the string they render to and deserialize through
//! the parser, so a stored rule is always one the parser accepts. Invalid
//! conditions and instructions refuse to serialize rather than writing
//! their sentinel.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};

use crate::{ComparisonOperator, Condition, Instruction, Instructions, Keyword, Permission};

struct TextVisitor<T>(PhantomData<T>);

impl<T> Visitor<'_> for TextVisitor<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("rule text")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        v.parse().map_err(E::custom)
    }
}

macro_rules! text_serde {
    ($ty:ty) => {
        text_serde!($ty, |_: &$ty| -> Result<(), String> { Ok(()) });
    };
    ($ty:ty, $check:expr) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let check = $check;
                check(self).map_err(<S::Error as ser::Error>::custom)?;
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_str(TextVisitor(PhantomData))
            }
        }
    };
}

text_serde!(ComparisonOperator);
text_serde!(Keyword);
text_serde!(Permission, |p: &Permission| p.validate());
text_serde!(Condition, |c: &Condition| c.validate());
text_serde!(Instruction, |i: &Instruction| i.validate());
text_serde!(Instructions, |list: &Instructions| list.validate());
