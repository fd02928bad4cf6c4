//! Compendium pack references
//!
//! A pack is addressed by its qualified name `<namespace>.<collection>`,
//! e.g. `world.new-compendium`. The namespace never contains a dot, so
//! parsing splits on the first one; the collection half may contain
//! further dots.

use std::fmt;
use std::str::FromStr;

use crate::error::ImportError;

/// Reference to a compendium pack in the host registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackRef {
    pub namespace: String,
    pub collection: String,
}

impl PackRef {
    pub fn new(namespace: &str, collection: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            collection: collection.to_string(),
        }
    }

    /// Qualified name as the host registry knows it
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.namespace, self.collection)
    }
}

impl FromStr for PackRef {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((namespace, collection))
                if !namespace.is_empty() && !collection.is_empty() =>
            {
                Ok(Self::new(namespace, collection))
            }
            _ => Err(ImportError::InvalidPackRef(s.to_string())),
        }
    }
}

impl fmt::Display for PackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_qualified_name() {
        let pack: PackRef = "world.new-compendium".parse().unwrap();
        assert_eq!(pack.namespace, "world");
        assert_eq!(pack.collection, "new-compendium");
        assert_eq!(pack.qualified(), "world.new-compendium");
    }

    #[test]
    fn collection_keeps_extra_dots() {
        let pack: PackRef = "module.tables.treasure".parse().unwrap();
        assert_eq!(pack.namespace, "module");
        assert_eq!(pack.collection, "tables.treasure");
    }

    #[test]
    fn rejects_missing_separator() {
        let err = "justoneword".parse::<PackRef>().unwrap_err();
        assert!(matches!(err, ImportError::InvalidPackRef(_)));
    }

    #[test]
    fn rejects_empty_halves() {
        assert!(".collection".parse::<PackRef>().is_err());
        assert!("namespace.".parse::<PackRef>().is_err());
        assert!(".".parse::<PackRef>().is_err());
        assert!("".parse::<PackRef>().is_err());
    }

    proptest! {
        /// Any non-empty dotless halves produce a parseable reference
        /// that displays back to the same qualified name
        #[test]
        fn roundtrips_through_display(
            namespace in "[a-z][a-z0-9_-]{0,20}",
            collection in "[a-z][a-z0-9_.-]{0,30}"
        ) {
            let qualified = format!("{}.{}", namespace, collection);
            let pack: PackRef = qualified.parse().unwrap();
            prop_assert_eq!(&pack.namespace, &namespace);
            prop_assert_eq!(pack.to_string(), qualified);
        }

        /// Strings without a dot never parse
        #[test]
        fn dotless_strings_rejected(s in "[a-z0-9_-]{0,40}") {
            prop_assert!(s.parse::<PackRef>().is_err());
        }
    }
}
