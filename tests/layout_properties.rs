use std::collections::HashSet;
use placegrid::{
    check_layout, generate_layout, Direction, DirectionPolicy, Layout, LayoutConfig, LayoutFailure,
};

const WORD_SETS: &[&[&str]] = &[
    &["tap", "cat"],
    &["planet", "apple", "lane"],
    &["rope", "letter", "stone", "hat"],
    &["crossword", "words", "cross", "sword", "row"],
    &["cross", "dog", "note", "ten", "stone"],
    &["puzzle", "letters", "grid", "search", "random", "layout", "words", "tiles"],
    &["ice cream", "cone", "mint", "scoop"],
];

static POLICIES: [DirectionPolicy; 2] = [DirectionPolicy::InferFromNeighbor, DirectionPolicy::TryBoth];

fn layouts() -> impl Iterator<Item = (&'static [&'static str], Layout)> {
    WORD_SETS.iter().flat_map(|&words| {
        POLICIES.iter().flat_map(move |&direction_policy| {
            (0..25).map(move |seed| {
                let config = LayoutConfig { direction_policy, seed: Some(seed) };
                let result = generate_layout(words, &config).unwrap_or_else(|failure| {
                    panic!("Failed to lay out {:?} with seed {}: {}", words, seed, failure)
                });

                (words, result.layout)
            })
        })
    })
}

#[test]
fn test_every_word_is_placed_once_in_input_order() {
    for (words, layout) in layouts() {
        let placed: Vec<&str> = layout.placements.iter().map(|placed| placed.word.as_str()).collect();
        assert_eq!(placed, words);
    }
}

#[test]
fn test_layouts_pass_the_checker() {
    for (words, layout) in layouts() {
        assert_eq!(check_layout(&layout), vec![], "{:?}\n{}", words, layout);
    }
}

#[test]
fn test_bounding_box_is_tight() {
    for (_, layout) in layouts() {
        let filled: HashSet<(usize, usize)> = layout.placements.iter().flat_map(|placed| {
            (0..placed.len()).map(move |offset| placed.cell(offset))
        }).collect();

        assert_eq!(filled.iter().map(|&(x, _)| x).min(), Some(0));
        assert_eq!(filled.iter().map(|&(_, y)| y).min(), Some(0));
        assert_eq!(filled.iter().map(|&(x, _)| x).max(), Some(layout.width - 1));
        assert_eq!(filled.iter().map(|&(_, y)| y).max(), Some(layout.height - 1));
    }
}

#[test]
fn test_shared_cells_agree_and_carry_both_owners() {
    for (_, layout) in layouts() {
        for placed in &layout.placements {
            for (offset, letter) in placed.word.chars().enumerate() {
                let (x, y) = placed.cell(offset);
                let cell = layout.cell(x, y).expect("Placed letter missing from grid");

                assert_eq!(cell.letter, letter);
                assert_eq!(cell.owner(placed.direction).map(|owner| owner.offset), Some(offset));
            }
        }

        // Each word after the first crosses something, so there are at least that many
        // intersections.
        let crossings = layout.cells.iter().flatten().flatten()
            .filter(|cell| cell.across.is_some() && cell.down.is_some())
            .count();
        assert!(crossings >= layout.placements.len() - 1);
    }
}

#[test]
fn test_longest_word_runs_across() {
    let result = generate_layout(&["cat", "planet", "lane"], &LayoutConfig::default())
        .expect("Failed to lay out words");

    assert_eq!(result.layout.placements[1].direction, Direction::Across);
    assert_eq!(result.layout.placements[2].direction, Direction::Down);
}

#[test]
fn test_disjoint_words_fail_under_every_policy() {
    for direction_policy in POLICIES {
        for seed in 0..10 {
            let config = LayoutConfig { direction_policy, seed: Some(seed) };

            assert_eq!(
                generate_layout(&["dog", "fly"], &config).unwrap_err(),
                LayoutFailure::Exhausted,
            );
            assert_eq!(
                generate_layout(&["planet", "apple", "fizz"], &config).unwrap_err(),
                LayoutFailure::Exhausted,
            );
        }
    }
}

#[test]
fn test_layout_serializes_for_renderers() {
    let config = LayoutConfig { seed: Some(3), ..LayoutConfig::default() };
    let layout = generate_layout(&["tap", "cat"], &config).expect("Failed to lay out words").layout;

    let json = serde_json::to_value(&layout).expect("Failed to serialize layout");

    assert_eq!(json["width"], layout.width);
    assert_eq!(json["placements"][0]["word"], "tap");
    assert_eq!(json["placements"][0]["direction"], "horizontal");
    assert_eq!(json["placements"][1]["direction"], "vertical");
}
