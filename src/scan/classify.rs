//! Range classification
//!
//! Sorts scanned characters into the logical groups a plan defines. A
//! character may land in several groups; nothing here enforces exclusivity.

use super::charset::CharacterSet;
use crate::config::{FamilyPlan, FontPlan, RangeSpec};
use std::collections::BTreeMap;

/// Characters of `chars` belonging to each range, keyed by range id.
pub fn classify(chars: &CharacterSet, ranges: &[RangeSpec]) -> BTreeMap<String, CharacterSet> {
    ranges
        .iter()
        .map(|range| (range.id.clone(), chars.filtered(|c| range.contains(c))))
        .collect()
}

/// Whether a character can ever be drawn by a font.
///
/// Control characters (line breaks, tabs, C1 controls) never map to glyphs
/// and are left out of the implicit "everything in content" range.
pub fn is_renderable(c: char) -> bool {
    !c.is_control()
}

/// Characters `family` should carry.
///
/// A family without ranges takes every renderable character; otherwise it
/// takes the union of its ranges.
pub fn family_characters(plan: &FontPlan, family: &FamilyPlan, chars: &CharacterSet) -> CharacterSet {
    if !family.is_range_limited() {
        return chars.filtered(is_renderable);
    }
    let ranges = plan.family_ranges(family);
    chars.filtered(|c| ranges.iter().any(|range| range.contains(c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> FontPlan {
        FontPlan::from_json(
            r#"{
                "font_dir": "/fonts",
                "ranges": [
                    { "id": "ext-b", "label": "Extension B", "start": "U+20000", "end": "U+2A6DF" },
                    { "id": "rare", "label": "Rare", "start": "U+4E00", "end": "U+9FFF", "whitelist": "丌" },
                    { "id": "cjk", "label": "CJK", "start": "U+4E00", "end": "U+9FFF" }
                ],
                "families": [
                    { "id": "Main", "label": "Main", "weights": { "400": "Main.otf" } },
                    { "id": "Rare", "label": "Rare", "ranges": ["ext-b", "rare"], "weights": { "400": "Rare.otf" } }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_classify_allows_overlapping_groups() {
        let plan = plan();
        let chars = CharacterSet::from_text("丌漢𠀀a");
        let groups = classify(&chars, &plan.ranges);

        assert_eq!(groups["ext-b"], CharacterSet::from_text("𠀀"));
        assert_eq!(groups["rare"], CharacterSet::from_text("丌"));
        assert_eq!(groups["cjk"], CharacterSet::from_text("丌漢"));
    }

    #[test]
    fn test_classify_empty_group() {
        let plan = plan();
        let groups = classify(&CharacterSet::from_text("abc"), &plan.ranges);
        assert!(groups.values().all(|group| group.is_empty()));
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_implicit_family_takes_everything_renderable() {
        let plan = plan();
        let chars = CharacterSet::from_text("a漢\n\t\u{85}𠀀");
        let selected = family_characters(&plan, plan.family("Main").unwrap(), &chars);
        assert_eq!(selected, CharacterSet::from_text("a漢𠀀"));
    }

    #[test]
    fn test_range_family_takes_union_of_ranges() {
        let plan = plan();
        let chars = CharacterSet::from_text("丌漢𠀀a");
        let selected = family_characters(&plan, plan.family("Rare").unwrap(), &chars);
        assert_eq!(selected, CharacterSet::from_text("丌𠀀"));
    }
}
