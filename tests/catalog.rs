// Fruit catalog invariants.
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::HashSet;

use fruit_clapper::FRUIT_CATALOG;

#[test]
fn catalog_has_the_six_fruit_types() {
    let pairs: Vec<(&str, u32)> = FRUIT_CATALOG.iter().map(|k| (k.name, k.points)).collect();
    assert_eq!(
        pairs,
        vec![
            ("apple", 10),
            ("orange", 15),
            ("banana", 20),
            ("grape", 25),
            ("strawberry", 30),
            ("watermelon", 50),
        ]
    );
}

#[test]
fn catalog_entries_are_unique_and_valid() {
    let mut names = HashSet::new();
    let mut emojis = HashSet::new();
    for kind in FRUIT_CATALOG {
        assert!(names.insert(kind.name), "duplicate name '{}'", kind.name);
        assert!(emojis.insert(kind.emoji), "duplicate emoji '{}'", kind.emoji);
        assert!(!kind.emoji.is_empty(), "empty glyph for '{}'", kind.name);
        assert!(kind.points > 0, "'{}' is worth nothing", kind.name);
    }
}

#[test]
fn rarer_looking_fruit_score_higher() {
    for pair in FRUIT_CATALOG.windows(2) {
        assert!(pair[0].points < pair[1].points, "{} >= {}", pair[0].name, pair[1].name);
    }
}
