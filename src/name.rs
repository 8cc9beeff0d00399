//! Filename tokens with a display form and a canonical form.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single filename.
///
/// A `Name` carries two strings: the *display* form, which is what the user
/// sees and what directory listings sort by, and the *canonical* form, which
/// identifies the entry. Equality, hashing and the natural ordering all use
/// the canonical form, so `"FOO"` and `"foo"` are the same name when the
/// canonical normalizer folds case.
///
/// Names are normally created through [`PathService::name`](crate::PathService::name),
/// which applies the configured normalizers.
///
/// # Examples
///
/// ```rust
/// use anyfs_namespace::Name;
///
/// let a = Name::create("README", "readme");
/// let b = Name::create("readme", "readme");
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "README");
/// ```
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name {
    display: Cow<'static, str>,
    canonical: Cow<'static, str>,
}

impl Name {
    /// The empty name, used only by the empty relative path.
    pub const EMPTY: Name = Name::fixed("");

    /// The `.` name, referring to a directory itself.
    pub const SELF: Name = Name::fixed(".");

    /// The `..` name, referring to a directory's parent.
    pub const PARENT: Name = Name::fixed("..");

    const fn fixed(s: &'static str) -> Name {
        Name {
            display: Cow::Borrowed(s),
            canonical: Cow::Borrowed(s),
        }
    }

    /// Creates a name with the given display and canonical forms.
    ///
    /// `""`, `"."` and `".."` always map to the fixed names, whatever
    /// canonical form is passed.
    pub fn create(display: impl Into<String>, canonical: impl Into<String>) -> Name {
        let display = display.into();
        match display.as_str() {
            "" => return Name::EMPTY,
            "." => return Name::SELF,
            ".." => return Name::PARENT,
            _ => {}
        }
        Name {
            display: Cow::Owned(display),
            canonical: Cow::Owned(canonical.into()),
        }
    }

    /// Creates a name whose display and canonical forms are the same string.
    pub fn simple(name: impl Into<String>) -> Name {
        let name = name.into();
        let canonical = name.clone();
        Name::create(name, canonical)
    }

    /// The display form.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The canonical form.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Returns `true` for `.` and `..`.
    pub fn is_reserved(&self) -> bool {
        *self == Name::SELF || *self == Name::PARENT
    }

    /// Returns `true` for the empty name.
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Orders two names by their display strings, then by canonical form.
    ///
    /// This is the directory-listing order and does not depend on how names
    /// are normalized.
    pub fn display_order(a: &Name, b: &Name) -> Ordering {
        a.display
            .cmp(&b.display)
            .then_with(|| a.canonical.cmp(&b.canonical))
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.display == self.canonical {
            write!(f, "Name({:?})", self.display)
        } else {
            write!(f, "Name({:?} / {:?})", self.display, self.canonical)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn case_insensitive(name: &str) -> Name {
        Name::create(name, name.to_lowercase())
    }

    #[test]
    fn reserved_strings_map_to_fixed_names() {
        assert_eq!(Name::create(".", "ignored"), Name::SELF);
        assert_eq!(Name::create("..", "ignored"), Name::PARENT);
        assert_eq!(Name::create("", "ignored"), Name::EMPTY);
        assert_eq!(Name::create(".", "ignored").canonical(), ".");
    }

    #[test]
    fn equality_uses_canonical_form() {
        assert_eq!(case_insensitive("Foo"), case_insensitive("FOO"));
        assert_ne!(Name::simple("Foo"), Name::simple("FOO"));
    }

    #[test]
    fn hash_follows_canonical_form() {
        let mut set = HashSet::new();
        set.insert(case_insensitive("bar"));
        assert!(set.contains(&case_insensitive("BAR")));
    }

    #[test]
    fn display_is_literal() {
        assert_eq!(case_insensitive("MiXeD").to_string(), "MiXeD");
        assert_eq!(case_insensitive("MiXeD").canonical(), "mixed");
    }

    #[test]
    fn display_order_differs_from_natural_order() {
        let upper = case_insensitive("FOO");
        let lower = case_insensitive("bar");
        assert_eq!(upper.cmp(&lower), Ordering::Greater);
        assert_eq!(Name::display_order(&upper, &lower), Ordering::Less);
    }

    #[test]
    fn reserved_names() {
        assert!(Name::SELF.is_reserved());
        assert!(Name::PARENT.is_reserved());
        assert!(!Name::simple("foo").is_reserved());
        assert!(Name::EMPTY.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn name_serializes_both_forms() {
        let json = serde_json::to_string(&case_insensitive("Foo")).unwrap();
        assert!(json.contains("\"Foo\""));
        assert!(json.contains("\"foo\""));
        let back: Name = serde_json::from_str(&json).unwrap();
        assert_eq!(back.display(), "Foo");
    }
}
