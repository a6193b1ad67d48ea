//! Interned identifiers.
//!
//! Every state, endpoint, connection and collection member in Switchboard
//! is keyed by an [`Id`]. Ids are symbols into one process-wide interner,
//! so they are `Copy` and compare in constant time.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<T>(f: impl FnOnce(&mut DefaultStringInterner) -> T) -> T {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

fn resolve(interner: &DefaultStringInterner, id: Id) -> &str {
    interner
        .resolve(id.0)
        .expect("Symbols are only created by the interner")
}

/// A key into the diagram.
///
/// ```
/// use switchboard_core::identifier::Id;
///
/// let endpoint = Id::new("state-1-exit");
///
/// // Connections are named after the endpoints they join
/// let connection = Id::connection(endpoint, Id::new("state-2-entry"));
/// assert_eq!(connection, "state-1-exit-state-2-entry");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// The identity of the connection from `source` to `target`:
    /// `"{source}-{target}"`.
    ///
    /// Joining the same pair twice yields the same `Id`.
    pub fn connection(source: Id, target: Id) -> Self {
        with_interner(|interner| {
            let joined = format!(
                "{}-{}",
                resolve(interner, source),
                resolve(interner, target)
            );
            Self(interner.get_or_intern(joined))
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = with_interner(|interner| resolve(interner, *self).to_owned());
        f.write_str(&name)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({:?})", self.to_string())
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| resolve(interner, *self) == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_interning() {
        let first = Id::new("choice-1");

        assert_eq!(first, Id::new("choice-1"));
        assert_ne!(first, Id::new("end-1"));
        assert_eq!(first, "choice-1");
        assert!(Id::new("") == "");
    }

    #[test]
    fn test_connection_identity() {
        let source = Id::new("s1-choice-1");
        let target = Id::new("s2-entry");

        assert_eq!(
            Id::connection(source, target),
            Id::connection(source, target)
        );
        assert_ne!(
            Id::connection(source, target),
            Id::connection(target, source)
        );
        assert_eq!(Id::connection(source, target), "s1-choice-1-s2-entry");
    }

    #[test]
    fn test_display_and_debug() {
        let id = Id::new("state-3");
        assert_eq!(format!("{id}"), "state-3");
        assert_eq!(format!("{id:?}"), "Id(\"state-3\")");
    }

    #[test]
    fn test_usable_as_set_key() {
        let keys: HashSet<Id> = ["a", "b", "a"].into_iter().map(Id::new).collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_serde_as_string() {
        let id = Id::new("state-7");

        let json = serde_json::to_string(&id).expect("Id serializes");
        assert_eq!(json, "\"state-7\"");

        let back: Id = serde_json::from_str(&json).expect("Id deserializes");
        assert_eq!(back, id);
    }
}
