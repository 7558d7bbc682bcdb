//! Definition of lint rule tags.

use strum::IntoEnumIterator;

/// A lint rule tag.
#[derive(
    Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, strum::Display, strum::EnumIter,
)]
#[repr(u8)]
pub enum Tag {
    /// Rules associated with the whitespace in a document.
    Spacing,

    /// Rules associated with the style of a document.
    Style,

    /// Rules associated with the clarity of a document.
    Clarity,
}

/// A set of lint tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagSet(u32);

impl TagSet {
    /// Constructs a tag set from a slice of tags.
    ///
    /// Spacing rules are always style rules as well.
    ///
    /// # Panics
    ///
    /// This method will panic if the provided slice is empty.
    pub const fn new(tags: &[Tag]) -> Self {
        if tags.is_empty() {
            panic!("a tag set must be non-empty");
        }

        let mut bits = 0u32;
        let mut i = 0;
        while i < tags.len() {
            bits |= Self::mask(tags[i]);
            if matches!(tags[i], Tag::Spacing) {
                bits |= Self::mask(Tag::Style);
            }
            i += 1;
        }
        Self(bits)
    }

    /// Unions two tag sets together.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Checks if the tag is contained in the set.
    pub const fn contains(&self, tag: Tag) -> bool {
        self.0 & Self::mask(tag) != 0
    }

    /// Gets the count of tags in the set.
    pub const fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Masks the given tag to a `u32`.
    const fn mask(tag: Tag) -> u32 {
        1u32 << (tag as u8)
    }

    /// Iterates the tags in the set in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Tag> {
        let set = *self;
        Tag::iter().filter(move |t| set.contains(*t))
    }
}

impl std::fmt::Display for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tags = self.iter().collect::<Vec<_>>();
        write!(f, "{:?}", tags)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn spacing_implies_style() {
        let tags = TagSet::new(&[Tag::Spacing]);
        assert!(tags.contains(Tag::Style));
        assert!(!tags.contains(Tag::Clarity));
        assert_eq!(tags.count(), 2);
        assert_eq!(tags.to_string(), "[Spacing, Style]");
    }

    #[test]
    fn union() {
        let tags = TagSet::new(&[Tag::Clarity]).union(TagSet::new(&[Tag::Style]));
        assert_eq!(tags.iter().collect::<Vec<_>>(), [Tag::Style, Tag::Clarity]);
        assert_eq!(Tag::Clarity.to_string(), "Clarity");
    }
}
