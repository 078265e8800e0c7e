use std::collections::{HashMap, VecDeque};
use std::fmt::{Display, Formatter};
use bit_set::BitSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use crate::candidates::{check_fit, Conflict, index_placements};
use crate::{Direction, GridCoord, Placement, Word, WordId};

/// A word's final position. Coords are zero-indexed with y = 0 in the top row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedWord {
    pub word: String,
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
}

impl PlacedWord {
    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    /// The coords of the cell holding the character at `offset`.
    pub fn cell(&self, offset: usize) -> (usize, usize) {
        match self.direction {
            Direction::Across => (self.x + offset, self.y),
            Direction::Down => (self.x, self.y + offset),
        }
    }
}

/// Which word a cell belongs to, and where in that word it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOwner {
    /// Index into `Layout::placements`.
    pub word_index: usize,
    pub offset: usize,
}

/// A filled cell of the grid. A cell where two words cross has both owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub letter: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub across: Option<CellOwner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down: Option<CellOwner>,
}

impl Cell {
    pub fn owner(&self, direction: Direction) -> Option<CellOwner> {
        match direction {
            Direction::Across => self.across,
            Direction::Down => self.down,
        }
    }
}

/// A finished layout. `placements` is in the same order as the words passed in, and `cells` is
/// indexed as `cells[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    pub placements: Vec<PlacedWord>,
    pub cells: Vec<Vec<Option<Cell>>>,
}

impl Layout {
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells.get(y)?.get(x)?.as_ref()
    }
}

/// Renders the grid one row per line, with `.` for empty cells.
impl Display for Layout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (y, row) in self.cells.iter().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }

            for cell in row {
                write!(f, "{}", cell.map(|cell| cell.letter).unwrap_or('.'))?;
            }
        }

        Ok(())
    }
}

/// Turn the committed placements into a layout: shift everything so the bounding box starts at
/// (0, 0), put the words back in input order and fill in the owner grid.
pub(crate) fn normalize(words: &[Word], committed: &[Placement]) -> Layout {
    if committed.is_empty() {
        return Layout { width: 0, height: 0, placements: vec![], cells: vec![] };
    }

    let last_cell = |placement: &Placement| {
        placement.cell(words[placement.word_id].len().saturating_sub(1))
    };

    let min_x = committed.iter().map(|placement| placement.x).min().unwrap_or(0);
    let min_y = committed.iter().map(|placement| placement.y).min().unwrap_or(0);
    let max_x = committed.iter().map(|placement| last_cell(placement).0).max().unwrap_or(0);
    let max_y = committed.iter().map(|placement| last_cell(placement).1).max().unwrap_or(0);

    let width = (max_x - min_x + 1) as usize;
    let height = (max_y - min_y + 1) as usize;

    let mut sorted = committed.to_vec();
    sorted.sort_by_key(|placement| placement.word_id);

    let mut cells: Vec<Vec<Option<Cell>>> = vec![vec![None; width]; height];
    let mut placements: Vec<PlacedWord> = Vec::with_capacity(sorted.len());

    for (word_index, placement) in sorted.iter().enumerate() {
        let word = &words[placement.word_id];
        let placed = PlacedWord {
            word: word.string.clone(),
            x: (placement.x - min_x) as usize,
            y: (placement.y - min_y) as usize,
            direction: placement.direction,
        };

        for (offset, &glyph) in word.glyphs.iter().enumerate() {
            let (x, y) = placed.cell(offset);
            let cell = cells[y][x].get_or_insert(Cell { letter: glyph, across: None, down: None });
            let owner = Some(CellOwner { word_index, offset });

            match placed.direction {
                Direction::Across => cell.across = owner,
                Direction::Down => cell.down = owner,
            }
        }

        placements.push(placed);
    }

    Layout { width, height, placements, cells }
}

/// A broken rule found by `check_layout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutViolation {
    /// The grid is empty, or `cells` doesn't have `height` rows of `width` cells.
    BadDimensions,
    /// Part of the word is outside the grid.
    OutOfBounds { word_index: usize },
    /// Two words put different letters in the same cell.
    Contradiction { x: usize, y: usize },
    /// Two words running the same way share a cell.
    Overlap { x: usize, y: usize },
    /// The owner grid doesn't match the placements at this cell.
    CellMismatch { x: usize, y: usize },
    /// The cell right before or right after the word holds a letter.
    OpenEnd { word_index: usize },
    /// A letter of the word that isn't a crossing has another letter beside it.
    Crowded { word_index: usize, offset: usize },
    /// The first or last row or column of the grid is empty.
    LooseBorder,
    /// There's no chain of crossings from the first word to this one.
    Disconnected { word_index: usize },
}

/// Check a layout against every rule the generator follows, rebuilding the occupancy from the
/// placements. Returns an empty list for any layout the generator produced from words of at least
/// two letters.
pub fn check_layout(layout: &Layout) -> Vec<LayoutViolation> {
    let mut violations = vec![];

    if {
        layout.width == 0 ||
            layout.height == 0 ||
            layout.cells.len() != layout.height ||
            layout.cells.iter().any(|row| row.len() != layout.width)
    } {
        violations.push(LayoutViolation::BadDimensions);
        return violations;
    }

    let words: Vec<Word> =
        layout.placements.iter().map(|placed| Word::new(&placed.word)).collect();
    let placements: Vec<Placement> = layout.placements.iter().enumerate().map(|(word_id, placed)| {
        Placement {
            word_id,
            x: placed.x as i32,
            y: placed.y as i32,
            direction: placed.direction,
        }
    }).collect();

    // Words that are entirely inside the grid. Anything else is reported and then ignored.
    let mut in_bounds = BitSet::with_capacity(placements.len());
    for (word_id, placed) in layout.placements.iter().enumerate() {
        let (end_x, end_y) = placed.cell(placed.len().saturating_sub(1));

        if placed.is_empty() || end_x >= layout.width || end_y >= layout.height {
            violations.push(LayoutViolation::OutOfBounds { word_index: word_id });
        } else {
            in_bounds.insert(word_id);
        }
    }

    // (word, offset, letter, direction) for every word covering each cell.
    let mut covers: HashMap<GridCoord, SmallVec<[(WordId, usize, char, Direction); 2]>> =
        HashMap::new();
    for word_id in &in_bounds {
        let placement = &placements[word_id];
        let word = &words[word_id];

        for (offset, (loc, &glyph)) in placement.cell_coords(word.len()).zip(&word.glyphs).enumerate() {
            covers.entry(loc).or_default().push((word_id, offset, glyph, placement.direction));
        }
    }

    for y in 0..layout.height {
        for x in 0..layout.width {
            let owners = covers.get(&(x as i32, y as i32)).map(SmallVec::as_slice).unwrap_or(&[]);

            if owners.iter().any(|&(_, _, glyph, _)| glyph != owners[0].2) {
                violations.push(LayoutViolation::Contradiction { x, y });
            }
            if {
                owners.iter().filter(|owner| owner.3 == Direction::Across).count() > 1 ||
                    owners.iter().filter(|owner| owner.3 == Direction::Down).count() > 1
            } {
                violations.push(LayoutViolation::Overlap { x, y });
            }

            let expected = owners.first().map(|&(_, _, letter, _)| {
                let mut cell = Cell { letter, across: None, down: None };
                for &(word_index, offset, _, direction) in owners {
                    let owner = Some(CellOwner { word_index, offset });
                    match direction {
                        Direction::Across => cell.across = owner,
                        Direction::Down => cell.down = owner,
                    }
                }
                cell
            });

            if layout.cells[y][x] != expected {
                violations.push(LayoutViolation::CellMismatch { x, y });
            }
        }
    }

    // Re-run the placement rules for each word against all the others. Mismatched letters were
    // already reported as contradictions above.
    for word_id in &in_bounds {
        let others: Vec<Placement> = in_bounds
            .iter()
            .filter(|&other_id| other_id != word_id)
            .map(|other_id| placements[other_id])
            .collect();
        let (occupancy, _) = index_placements(&words, &others);
        let fit = check_fit(&occupancy, &placements[word_id], &words[word_id].glyphs);

        if fit.conflicts.contains(&Conflict::OpenEnd) {
            violations.push(LayoutViolation::OpenEnd { word_index: word_id });
        }
        for conflict in fit.conflicts {
            if let Conflict::Crowded { offset } = conflict {
                violations.push(LayoutViolation::Crowded { word_index: word_id, offset });
            }
        }
    }

    let last_row = &layout.cells[layout.height - 1];
    if {
        !layout.cells[0].iter().any(Option::is_some) ||
            !last_row.iter().any(Option::is_some) ||
            !layout.cells.iter().any(|row| row[0].is_some()) ||
            !layout.cells.iter().any(|row| row[layout.width - 1].is_some())
    } {
        violations.push(LayoutViolation::LooseBorder);
    }

    // Walk the crossings outwards from the first word. Every word should be reachable.
    let mut crossings_by_word: Vec<SmallVec<[WordId; 4]>> =
        placements.iter().map(|_| SmallVec::new()).collect();
    for owners in covers.values() {
        for &(word_id, ..) in owners {
            for &(other_id, ..) in owners {
                if other_id != word_id {
                    crossings_by_word[word_id].push(other_id);
                }
            }
        }
    }

    if let Some(first_id) = in_bounds.iter().next() {
        let mut visited = BitSet::with_capacity(placements.len());
        let mut to_visit: VecDeque<WordId> = VecDeque::with_capacity(placements.len());
        to_visit.push_back(first_id);

        while let Some(word_id) = to_visit.pop_front() {
            if !visited.insert(word_id) {
                continue;
            }

            for &other_id in &crossings_by_word[word_id] {
                if !visited.contains(other_id) {
                    to_visit.push_back(other_id);
                }
            }
        }

        for word_id in in_bounds.difference(&visited) {
            violations.push(LayoutViolation::Disconnected { word_index: word_id });
        }
    }

    violations
}
