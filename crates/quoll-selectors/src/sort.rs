//! Canonical ordering of simple selectors within a compound.
//!
//! Cheap, selective tests run first so a compound fails fast; pseudo-classes,
//! which may recurse or consult the host, run last. Only the simple
//! selectors between two combinators are ever reordered.

use crate::ast::SimpleSelector;

/// Match-order rank of a simple selector; lower runs earlier.
#[must_use]
pub const fn priority(simple: &SimpleSelector) -> u8 {
    match simple {
        SimpleSelector::PseudoElement(_) => 0,
        SimpleSelector::Id(_) => 1,
        SimpleSelector::Class(_) => 2,
        SimpleSelector::Type(_) => 3,
        SimpleSelector::Attribute(_) => 4,
        SimpleSelector::PseudoClass(_) => 5,
    }
}

/// Stable-sort a compound by [`priority`]; equal ranks keep source order.
pub fn sort_compound(simple_selectors: &mut [SimpleSelector]) {
    simple_selectors.sort_by_key(priority);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Identifier, KeywordPseudoClass, NamespaceConstraint, PseudoClass, QualifiedName};

    fn class(name: &str) -> SimpleSelector {
        SimpleSelector::Class(Identifier {
            raw: name.to_string(),
            value: name.to_string(),
        })
    }

    #[test]
    fn test_sort_is_stable_for_classes() {
        let mut compound = vec![
            SimpleSelector::PseudoClass(PseudoClass::Keyword(KeywordPseudoClass::FirstChild)),
            class("b"),
            SimpleSelector::Type(QualifiedName {
                namespace: NamespaceConstraint::Any,
                local_name: "li".to_string(),
            }),
            class("a"),
        ];
        sort_compound(&mut compound);
        assert_eq!(compound[0], class("b"));
        assert_eq!(compound[1], class("a"));
        assert!(matches!(compound[2], SimpleSelector::Type(_)));
        assert!(matches!(compound[3], SimpleSelector::PseudoClass(_)));
    }
}
