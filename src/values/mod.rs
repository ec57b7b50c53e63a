//! Typed values that produce conditions for a specific keyword.
//!
//! Every builder validates its input at construction. Invalid input yields a
//! zero value: it renders a fixed sentinel, fails `validate()`, and every
//! condition built from it is the zero [`Condition`].

use tracing::debug;

use crate::types::{ComparisonOperator, Condition, Element, Expression, Keyword, Stack};
use crate::Config;

/// Adds `eq()` and `ne()` condition builders to an [`Operand`].
macro_rules! equality_conditions {
    ($ty:ty) => {
        impl $ty {
            /// `=` condition for this value.
            #[must_use]
            pub fn eq(&self) -> $crate::Condition {
                $crate::values::Operand::condition(self, $crate::ComparisonOperator::Eq)
            }

            /// `!=` condition for this value.
            #[must_use]
            pub fn ne(&self) -> $crate::Condition {
                $crate::values::Operand::condition(self, $crate::ComparisonOperator::Ne)
            }
        }
    };
}

/// Adds all six comparison builders to an ordered [`Operand`].
macro_rules! ordinal_conditions {
    ($ty:ty) => {
        equality_conditions!($ty);

        impl $ty {
            #[must_use]
            pub fn lt(&self) -> $crate::Condition {
                $crate::values::Operand::condition(self, $crate::ComparisonOperator::Lt)
            }

            #[must_use]
            pub fn le(&self) -> $crate::Condition {
                $crate::values::Operand::condition(self, $crate::ComparisonOperator::Le)
            }

            #[must_use]
            pub fn gt(&self) -> $crate::Condition {
                $crate::values::Operand::condition(self, $crate::ComparisonOperator::Gt)
            }

            #[must_use]
            pub fn ge(&self) -> $crate::Condition {
                $crate::values::Operand::condition(self, $crate::ComparisonOperator::Ge)
            }
        }
    };
}

mod attr;
mod auth;
mod dn;
mod filter;
mod inherit;
mod net;
mod oid;
mod scope;
mod ssf;
mod time;

pub use attr::{
    AttributeBindTypeOrValue, AttributeType, AttributeTypes, BindType, BindTypeOrValue,
};
pub use auth::AuthenticationMethod;
pub use dn::{DistinguishedName, DistinguishedNames};
pub use filter::{
    AttributeFilter, AttributeFilterOperation, AttributeFilterOperations, AttributeOperation,
    Filter,
};
pub use inherit::{Inheritance, Level};
pub use net::{Fqdn, IpAddress};
pub use oid::{ObjectIdentifier, ObjectIdentifiers};
pub use scope::SearchScope;
pub use ssf::SecurityStrengthFactor;
pub use time::{Day, DayOfWeek, TimeOfDay};

pub(crate) use attr::is_identifier;
pub(crate) use dn::LDAP_PREFIX;

/// A value that can stand on the right-hand side of a condition.
pub trait Operand {
    /// Keyword the value renders for, `None` when it cannot be determined.
    fn keyword(&self) -> Option<Keyword>;

    /// The expression for this value, `None` when the value is invalid.
    fn expression(&self) -> Option<Expression>;

    fn permitted_operators(&self) -> &'static [ComparisonOperator] {
        match self.keyword() {
            Some(keyword) => keyword.permitted_operators(),
            None => &[],
        }
    }

    /// Build a condition with `operator`. Returns the zero condition when
    /// the operator is not permitted or the value is invalid.
    fn condition(&self, operator: ComparisonOperator) -> Condition {
        self.condition_with(operator, &Config::default())
    }

    /// [`condition`](Self::condition) padded according to `config`.
    fn condition_with(&self, operator: ComparisonOperator, config: &Config) -> Condition {
        let Some(keyword) = self.keyword() else {
            debug!(%operator, "condition requested for a value without keyword");
            return Condition::default();
        };
        if !keyword.permits(operator) {
            debug!(%keyword, %operator, "operator not permitted");
            return Condition::default();
        }
        match self.expression() {
            Some(expression) => {
                Condition::new(keyword, operator, expression).padding(config.has_rule_padding())
            }
            None => {
                debug!(%keyword, "condition requested for an invalid value");
                Condition::default()
            }
        }
    }

    /// Every permitted operator paired with its condition.
    fn operators(&self) -> Vec<(ComparisonOperator, Condition)> {
        self.operators_with(&Config::default())
    }

    fn operators_with(&self, config: &Config) -> Vec<(ComparisonOperator, Condition)> {
        self.permitted_operators()
            .iter()
            .map(|&operator| (operator, self.condition_with(operator, config)))
            .collect()
    }
}

impl<T> Operand for Stack<T>
where
    T: Element,
    Stack<T>: Into<Expression>,
{
    fn keyword(&self) -> Option<Keyword> {
        self.category().keyword()
    }

    fn expression(&self) -> Option<Expression> {
        self.validate().ok().map(|()| self.clone().into())
    }
}

impl<T> Stack<T>
where
    T: Element,
    Stack<T>: Into<Expression>,
{
    /// `=` condition for the whole list.
    #[must_use]
    pub fn eq(&self) -> Condition {
        Operand::condition(self, ComparisonOperator::Eq)
    }

    /// `!=` condition for the whole list.
    #[must_use]
    pub fn ne(&self) -> Condition {
        Operand::condition(self, ComparisonOperator::Ne)
    }
}
