//! Character sets
//!
//! A `CharacterSet` is the unit every stage of the pipeline exchanges: the
//! scanner produces one, the classifier narrows it per family, the coverage
//! oracle partitions it, and the subset generator consumes it.

use serde::{Serialize, Serializer};
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;

/// CJK punctuation and full-width forms that must always render from the
/// local artifact, even when the content does not use them yet.
pub const CJK_PUNCTUATION: &str = "　、。〃〈〉《》「」『』【】〔〕〖〗〘〙〜〝〞・\
！＂＃％＆＇（）＊＋，－．／：；＜＝＞？［＼］＿｛｜｝～￥…‥—–‘’“”·";

/// Interface glyphs used by templates rather than by authored content.
pub const UI_GLYPHS: &str = "←↑→↓↩★☆✓✗•◆◇○●□■△▲▽▼※§¶©®™°±×÷";

/// An ordered, duplicate-free set of Unicode scalar values.
///
/// Ordering is by code point, which keeps every rendering of the set
/// (log lines, engine input files, reports) stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterSet {
    chars: BTreeSet<char>,
}

impl CharacterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from every character of `text`.
    pub fn from_text(text: &str) -> Self {
        text.chars().collect()
    }

    pub fn insert(&mut self, c: char) -> bool {
        self.chars.insert(c)
    }

    /// Fold every character of `text` into the set.
    pub fn extend_from_text(&mut self, text: &str) {
        self.chars.extend(text.chars());
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, char> {
        self.chars.iter()
    }

    pub fn union(&self, other: &CharacterSet) -> CharacterSet {
        self.chars.union(&other.chars).copied().collect()
    }

    pub fn difference(&self, other: &CharacterSet) -> CharacterSet {
        self.chars.difference(&other.chars).copied().collect()
    }

    pub fn intersection(&self, other: &CharacterSet) -> CharacterSet {
        self.chars.intersection(&other.chars).copied().collect()
    }

    pub fn is_disjoint(&self, other: &CharacterSet) -> bool {
        self.chars.is_disjoint(&other.chars)
    }

    /// Keep only the characters matching `predicate`.
    pub fn filtered(&self, mut predicate: impl FnMut(char) -> bool) -> CharacterSet {
        self.chars.iter().copied().filter(|c| predicate(*c)).collect()
    }

    /// Code points in ascending order.
    pub fn code_points(&self) -> impl Iterator<Item = u32> + '_ {
        self.chars.iter().map(|c| u32::from(*c))
    }

    /// Comma-separated `U+XXXX` list, the notation font tools accept.
    pub fn to_unicode_list(&self) -> String {
        self.code_points()
            .map(format_code_point)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Format a code point as `U+XXXX` (at least four hex digits).
pub fn format_code_point(cp: u32) -> String {
    format!("U+{cp:04X}")
}

/// Characters rendered verbatim, in code point order.
impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromIterator<char> for CharacterSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self {
            chars: iter.into_iter().collect(),
        }
    }
}

impl Extend<char> for CharacterSet {
    fn extend<I: IntoIterator<Item = char>>(&mut self, iter: I) {
        self.chars.extend(iter);
    }
}

impl<'a> IntoIterator for &'a CharacterSet {
    type Item = &'a char;
    type IntoIter = btree_set::Iter<'a, char>;

    fn into_iter(self) -> Self::IntoIter {
        self.chars.iter()
    }
}

impl Serialize for CharacterSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Baseline characters unioned into every scan before coverage checking.
///
/// Printable ASCII (space through tilde), the curated CJK punctuation list
/// and the interface glyphs, plus any `extra` characters from the plan.
pub fn always_include(extra: &str) -> CharacterSet {
    let mut set: CharacterSet = (' '..='~').collect();
    set.extend_from_text(CJK_PUNCTUATION);
    set.extend_from_text(UI_GLYPHS);
    set.extend_from_text(extra);
    set
}
