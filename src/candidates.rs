use std::collections::hash_map::Entry;
use std::collections::HashMap;
use smallvec::{SmallVec, smallvec};
use crate::{Direction, DirectionPolicy, GridCoord, MAX_WORD_LENGTH, Placement, Word, WordId};

/// A map from each occupied cell to the character stored there.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    cells: HashMap<GridCoord, char>,
}

impl Occupancy {
    pub fn get(&self, loc: GridCoord) -> Option<char> {
        self.cells.get(&loc).copied()
    }

    pub fn is_occupied(&self, loc: GridCoord) -> bool {
        self.cells.contains_key(&loc)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A map from each character to every cell currently holding it, in the order the cells were
/// first filled. A cell shared by two words is only listed once.
#[derive(Debug, Clone, Default)]
pub struct LetterIndex {
    cells_by_glyph: HashMap<char, Vec<GridCoord>>,
}

impl LetterIndex {
    pub fn cells_for(&self, glyph: char) -> &[GridCoord] {
        self.cells_by_glyph.get(&glyph).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Build the occupancy view and letter index for a list of placements. If two placements
/// disagree about a cell, the earlier one wins.
pub fn index_placements(words: &[Word], placements: &[Placement]) -> (Occupancy, LetterIndex) {
    let mut occupancy = Occupancy::default();
    let mut letter_index = LetterIndex::default();

    for placement in placements {
        let word = &words[placement.word_id];

        for (loc, &glyph) in placement.cell_coords(word.len()).zip(&word.glyphs) {
            if let Entry::Vacant(entry) = occupancy.cells.entry(loc) {
                entry.insert(glyph);
                letter_index.cells_by_glyph.entry(glyph).or_insert_with(Vec::new).push(loc);
            }
        }
    }

    (occupancy, letter_index)
}

/// A reason a word can't be laid over the grid at a given placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conflict {
    /// The cell right before the first character or right after the last one holds a letter.
    OpenEnd,
    /// The cell at `offset` already holds a different letter.
    Mismatch { offset: usize },
    /// The cell at `offset` is free, but a letter sits right beside it.
    Crowded { offset: usize },
}

/// The result of laying a word over an occupancy view.
#[derive(Debug)]
pub(crate) struct Fit {
    /// Offsets within the word whose cells already hold the same letter.
    pub crossings: SmallVec<[usize; MAX_WORD_LENGTH]>,
    pub conflicts: SmallVec<[Conflict; 4]>,
}

/// Check `glyphs` laid out at `placement` against the occupied cells. Cells already holding the
/// same letter count as crossings, and their neighbours belong to the crossing word so they
/// aren't inspected. Every other cell must have both perpendicular neighbours free.
pub(crate) fn check_fit(occupancy: &Occupancy, placement: &Placement, glyphs: &[char]) -> Fit {
    let mut fit = Fit { crossings: smallvec![], conflicts: smallvec![] };

    let (dx, dy) = placement.direction.step();
    let (px, py) = placement.direction.perpendicular_step();

    for end in [(placement.x - dx, placement.y - dy), placement.cell(glyphs.len())] {
        if occupancy.is_occupied(end) {
            fit.conflicts.push(Conflict::OpenEnd);
        }
    }

    for (offset, &glyph) in glyphs.iter().enumerate() {
        let (x, y) = placement.cell(offset);

        match occupancy.get((x, y)) {
            Some(existing) if existing == glyph => fit.crossings.push(offset),
            Some(_) => fit.conflicts.push(Conflict::Mismatch { offset }),
            None => {
                if occupancy.is_occupied((x + px, y + py)) || occupancy.is_occupied((x - px, y - py)) {
                    fit.conflicts.push(Conflict::Crowded { offset });
                }
            }
        }
    }

    fit
}

/// Find every placement of `word` that crosses exactly one existing letter and otherwise only
/// touches free cells. The candidates are returned in the order they were found: by character
/// of the word, then by the order the crossed cell was filled.
pub fn find_candidates(
    occupancy: &Occupancy,
    letter_index: &LetterIndex,
    word_id: WordId,
    word: &Word,
    policy: DirectionPolicy,
) -> Vec<Placement> {
    let mut candidates = vec![];

    for (anchor, &glyph) in word.glyphs.iter().enumerate() {
        for &(cx, cy) in letter_index.cells_for(glyph) {
            // If the letter has a free cell to its right we assume it belongs to a down word, so
            // the new word should run across it.
            let directions: SmallVec<[Direction; 2]> = match policy {
                DirectionPolicy::InferFromNeighbor => {
                    if occupancy.is_occupied((cx + 1, cy)) {
                        smallvec![Direction::Down]
                    } else {
                        smallvec![Direction::Across]
                    }
                }
                DirectionPolicy::TryBoth => smallvec![Direction::Across, Direction::Down],
            };

            for direction in directions {
                let (dx, dy) = direction.step();
                let placement = Placement {
                    word_id,
                    x: cx - dx * anchor as i32,
                    y: cy - dy * anchor as i32,
                    direction,
                };

                let fit = check_fit(occupancy, &placement, &word.glyphs);

                if fit.conflicts.is_empty() && fit.crossings.as_slice() == [anchor] {
                    candidates.push(placement);
                }
            }
        }
    }

    candidates
}
