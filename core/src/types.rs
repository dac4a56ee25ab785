use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::GameError;

/// Linear dimension, used for the side length of the square grid
pub type Ix = u8;

/// Area dimension, used for tile/pair counts
pub type Ax = u16;

/// Position of a tile in the board's ordered sequence
pub type TileIndex = usize;

/// Largest supported grid side length.
pub const MAX_DIMENSION: Ix = 15;

pub const fn area(dimension: Ix) -> Ax {
    let d = dimension as Ax;
    d.saturating_mul(d)
}

/// Preset grid sizes, each with its own score list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub const fn dimension(self) -> Ix {
        use Difficulty::*;
        match self {
            Easy => 3,
            Medium => 5,
            Hard => 7,
        }
    }

    pub const fn name(self) -> &'static str {
        use Difficulty::*;
        match self {
            Easy => "Easy",
            Medium => "Medium",
            Hard => "Hard",
        }
    }

    /// Storage key of the append-only score list.
    pub fn scores_key(self) -> String {
        format!("scores_{}", self.name())
    }

    /// Storage key of the derived high score cache.
    pub fn high_score_key(self) -> String {
        format!("highScore_{}", self.name())
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::UnknownDifficulty)
    }
}
