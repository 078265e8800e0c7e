use std::fmt::{Debug, Formatter};
use instant::Duration;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub mod candidates;
pub mod layout;
pub mod search;

pub use candidates::{find_candidates, LetterIndex, Occupancy};
pub use layout::{check_layout, Cell, CellOwner, Layout, LayoutViolation, PlacedWord};
pub use search::{generate_layout, generate_layout_with_rng, LayoutFailure, LayoutSuccess};

/// The expected maximum length for a single word. Longer words still work, they just spill onto
/// the heap.
pub const MAX_WORD_LENGTH: usize = 21;

/// An identifier for a given word, based on its index in the caller's input list.
pub type WordId = usize;

/// Signed x and y coords for a cell during the search, where the first word starts at (0, 0) and
/// y grows downwards.
pub type GridCoord = (i32, i32);

/// Direction that a word runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "horizontal")]
    Across,
    #[serde(rename = "vertical")]
    Down,
}

impl Direction {
    /// The offset from one cell of a word to the next.
    pub fn step(self) -> GridCoord {
        match self {
            Direction::Across => (1, 0),
            Direction::Down => (0, 1),
        }
    }

    /// The offset from a cell to its neighbour on one side of the word.
    pub fn perpendicular_step(self) -> GridCoord {
        match self {
            Direction::Across => (0, 1),
            Direction::Down => (1, 0),
        }
    }
}

/// How the candidate finder picks a direction for a word crossing an existing letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionPolicy {
    /// Look at the cell to the right of the existing letter: if it's empty the new word goes
    /// across, otherwise down. Only one direction is tried per occurrence.
    #[default]
    InferFromNeighbor,
    /// Try both directions at every occurrence.
    TryBoth,
}

/// Settings for a single layout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub direction_policy: DirectionPolicy,
    /// Seed for the candidate shuffle. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// A word from the input list, split into the chars that get laid out on the grid.
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[char; MAX_WORD_LENGTH]>,
}

impl Word {
    pub fn new(string: &str) -> Word {
        Word {
            string: string.to_string(),
            glyphs: string.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Word").field(&self.string).finish()
    }
}

/// A word assigned to a start cell and a direction. During the search these are both the
/// candidates under consideration and the committed choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub word_id: WordId,
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

impl Placement {
    /// The coords of the cell holding the character at `offset`.
    pub fn cell(&self, offset: usize) -> GridCoord {
        let (dx, dy) = self.direction.step();
        (self.x + dx * offset as i32, self.y + dy * offset as i32)
    }

    /// Generate the coords for each cell of this placement.
    pub fn cell_coords(&self, length: usize) -> impl Iterator<Item = GridCoord> {
        let placement = *self;
        (0..length).map(move |offset| placement.cell(offset))
    }
}

/// A struct tracking statistics about the search.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Number of search levels expanded, i.e. candidate lists built.
    pub states: u64,
    /// Total number of candidates produced by the candidate finder.
    pub candidates: u64,
    /// Number of times a level ran out of candidates and was abandoned.
    pub backtracks: u64,
    pub duration: Duration,
}
