//! Identifier management using string interning for efficient storage and comparison
//!
//! Entity, enum, field and type names are compared constantly while the model is
//! built and relationships are resolved, so every name is interned into an [`Id`].

use std::{
    cmp::Ordering,
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by all validation runs.
///
/// # Thread Safety
///
/// Access goes through a `Mutex`, so independent runs on different threads can
/// intern names concurrently.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Interned name of a declaration, field or type reference.
///
/// # Examples
///
/// ```
/// use modelcheck_core::identifier::Id;
///
/// let building = Id::new("Building");
/// assert_eq!(building, "Building");
/// assert_eq!(building, Id::new("Building"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns an owned copy of the interned string.
    pub fn to_name(self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        })
    }

    /// Compares two identifiers by their text rather than by interning order.
    ///
    /// Used wherever a tie-break must be stable across runs.
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use modelcheck_core::identifier::Id;
    ///
    /// let zeta = Id::new("Zeta");
    /// let alpha = Id::new("Alpha");
    /// assert_eq!(alpha.cmp_lexical(zeta), Ordering::Less);
    /// ```
    pub fn cmp_lexical(self, other: Id) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        with_interner(|interner| {
            let lhs = interner.resolve(self.0).expect("Symbol should exist in interner");
            let rhs = interner
                .resolve(other.0)
                .expect("Symbol should exist in interner");
            lhs.cmp(rhs)
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_name())
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                == other
        })
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
