use std::cmp::Reverse;
use instant::Instant;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use crate::candidates::{find_candidates, index_placements};
use crate::layout::{Layout, normalize};
use crate::{Direction, DirectionPolicy, LayoutConfig, Placement, Statistics, Word, WordId};

/// The ways a layout attempt can come up empty. None of these leave a partial layout behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutFailure {
    #[error("There are no words to lay out.")]
    NoWords,
    #[error("Word {index} is empty and can't cross anything.")]
    EmptyWord { index: usize },
    #[error("No consistent layout was found for these words.")]
    Exhausted,
}

/// A struct representing the results of a successful layout attempt.
#[derive(Debug)]
pub struct LayoutSuccess {
    pub layout: Layout,
    pub statistics: Statistics,
}

/// One level of the search: the candidates for a single word that haven't been tried yet, in
/// shuffled order. Candidates are taken from the back.
#[derive(Debug)]
struct Frame {
    candidates: Vec<Placement>,
}

/// Derive the occupancy for the committed placements and build the frame for the next word.
fn expand_frame<R: Rng + ?Sized>(
    words: &[Word],
    committed: &[Placement],
    word_id: WordId,
    policy: DirectionPolicy,
    rng: &mut R,
    statistics: &mut Statistics,
) -> Frame {
    let (occupancy, letter_index) = index_placements(words, committed);
    let mut candidates =
        find_candidates(&occupancy, &letter_index, word_id, &words[word_id], policy);

    candidates.shuffle(rng);

    statistics.states += 1;
    statistics.candidates += candidates.len() as u64;

    trace!(
        "Level {}: {} candidates for {:?}",
        committed.len(),
        candidates.len(),
        words[word_id].string,
    );

    Frame { candidates }
}

/// Lay out the given words, shuffling candidates with a generator seeded from `config.seed` (or
/// from the OS if there's no seed).
pub fn generate_layout<S: AsRef<str>>(
    words: &[S],
    config: &LayoutConfig,
) -> Result<LayoutSuccess, LayoutFailure> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    generate_layout_with_rng(words, config, &mut rng)
}

/// Lay out the given words, using `rng` to shuffle the candidates at each level. `config.seed` is
/// ignored.
///
/// The longest word goes across at the origin, then the rest are added from longest to shortest,
/// each crossing a letter of the words already on the grid. When a word has nowhere left to go we
/// backtrack to the previous one and try its next candidate. The word order itself is never
/// changed, so a failure here just means this set of words didn't work out in this order.
pub fn generate_layout_with_rng<S: AsRef<str>, R: Rng + ?Sized>(
    words: &[S],
    config: &LayoutConfig,
    rng: &mut R,
) -> Result<LayoutSuccess, LayoutFailure> {
    let start = Instant::now();

    let words: Vec<Word> = words.iter().map(|word| Word::new(word.as_ref())).collect();

    if words.is_empty() {
        return Err(LayoutFailure::NoWords);
    }
    if let Some(index) = words.iter().position(Word::is_empty) {
        return Err(LayoutFailure::EmptyWord { index });
    }

    // Longest first. The sort is stable, so words of the same length keep their input order.
    let mut order: Vec<WordId> = (0..words.len()).collect();
    order.sort_by_key(|&word_id| Reverse(words[word_id].len()));

    let mut statistics = Statistics::default();

    let mut committed: Vec<Placement> = Vec::with_capacity(order.len());
    committed.push(Placement { word_id: order[0], x: 0, y: 0, direction: Direction::Across });

    // Frame `n` places `order[n + 1]` on top of the first `n + 1` committed placements. The words
    // still to be placed are always `order[committed.len()..]`.
    let mut frames: Vec<Frame> = vec![];
    if order.len() > 1 {
        frames.push(expand_frame(
            &words,
            &committed,
            order[1],
            config.direction_policy,
            rng,
            &mut statistics,
        ));
    }

    while committed.len() < order.len() {
        let depth = frames.len();

        let Some(frame) = frames.last_mut() else {
            statistics.duration = start.elapsed();
            debug!("Search exhausted: {:?}", statistics);
            return Err(LayoutFailure::Exhausted);
        };

        match frame.candidates.pop() {
            Some(candidate) => {
                committed.truncate(depth);
                committed.push(candidate);

                if committed.len() < order.len() {
                    let frame = expand_frame(
                        &words,
                        &committed,
                        order[committed.len()],
                        config.direction_policy,
                        rng,
                        &mut statistics,
                    );
                    frames.push(frame);
                }
            }
            None => {
                frames.pop();
                statistics.backtracks += 1;
            }
        }
    }

    let layout = normalize(&words, &committed);
    statistics.duration = start.elapsed();
    debug!(
        "Laid out {} words on a {}x{} grid: {:?}",
        words.len(),
        layout.width,
        layout.height,
        statistics,
    );

    Ok(LayoutSuccess { layout, statistics })
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use crate::{check_layout, Direction, DirectionPolicy, LayoutConfig, PlacedWord};
    use super::{generate_layout, generate_layout_with_rng, LayoutFailure};

    fn seeded(seed: u64) -> LayoutConfig {
        LayoutConfig { seed: Some(seed), ..LayoutConfig::default() }
    }

    #[test]
    fn test_single_word_layout() {
        let result = generate_layout(&["cat"], &seeded(1)).expect("Failed to lay out one word");
        let layout = result.layout;

        assert_eq!((layout.width, layout.height), (3, 1));
        assert_eq!(layout.placements, vec![PlacedWord {
            word: "cat".to_string(),
            x: 0,
            y: 0,
            direction: Direction::Across,
        }]);

        let letters: Vec<char> =
            (0..3).map(|x| layout.cell(x, 0).map(|cell| cell.letter).unwrap_or('.')).collect();
        assert_eq!(letters, vec!['c', 'a', 't']);
        assert_eq!(result.statistics.states, 0);
    }

    #[test]
    fn test_words_without_shared_letters_fail() {
        for seed in 0..10 {
            let result = generate_layout(&["dog", "fly"], &seeded(seed));
            assert_eq!(result.unwrap_err(), LayoutFailure::Exhausted);
        }
    }

    #[test]
    fn test_empty_input_fails() {
        let words: [&str; 0] = [];
        assert_eq!(generate_layout(&words, &seeded(0)).unwrap_err(), LayoutFailure::NoWords);
        assert_eq!(
            generate_layout(&["tap", "", "cat"], &seeded(0)).unwrap_err(),
            LayoutFailure::EmptyWord { index: 1 },
        );
    }

    #[test]
    fn test_shared_letters_always_succeed() {
        for seed in 0..50 {
            let result = generate_layout(&["tap", "cat"], &seeded(seed))
                .expect("Failed to lay out words sharing letters");

            assert_eq!(result.layout.placements[0].word, "tap");
            assert_eq!(result.layout.placements[1].word, "cat");
            assert!(check_layout(&result.layout).is_empty());
        }
    }

    #[test]
    fn test_backtracks_out_of_dead_ends() {
        // Most ways of hanging "stone" and "rope" off "letter" leave nowhere for "hat", but
        // there's always a way back to one that works.
        let words = ["rope", "letter", "stone", "hat"];
        let mut backtracks = 0;

        for seed in 0..20 {
            let result = generate_layout(&words, &seeded(seed)).expect("Failed to lay out words");

            assert!(check_layout(&result.layout).is_empty());
            backtracks += result.statistics.backtracks;
        }

        assert!(backtracks > 0);
    }

    #[test]
    fn test_same_seed_gives_same_layout() {
        let words = ["crossword", "words", "cross", "sword", "row"];

        for seed in 0..10 {
            let first = generate_layout(&words, &seeded(seed));
            let second = generate_layout(&words, &seeded(seed));

            match (first, second) {
                (Ok(first), Ok(second)) => assert_eq!(first.layout, second.layout),
                (Err(first), Err(second)) => assert_eq!(first, second),
                _ => panic!("Same seed gave different outcomes"),
            }
        }
    }

    #[test]
    fn test_every_expanded_level_is_kept_or_abandoned() {
        let config = LayoutConfig {
            direction_policy: DirectionPolicy::TryBoth,
            seed: None,
        };
        let mut rng = StdRng::seed_from_u64(99);

        let result =
            generate_layout_with_rng(&["cross", "dog", "note", "ten", "stone"], &config, &mut rng)
                .expect("Failed to lay out words");
        let statistics = &result.statistics;

        assert!(check_layout(&result.layout).is_empty());
        assert_eq!(statistics.states, 4 + statistics.backtracks);
        assert!(statistics.candidates >= statistics.states - statistics.backtracks);
    }
}
