use serde::{Deserialize, Serialize};

use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    fn generate(self, config: BoardConfig) -> Board;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub dimension: Ix,
}

impl BoardConfig {
    pub(crate) const fn new_unchecked(dimension: Ix) -> Self {
        Self { dimension }
    }

    pub fn new(dimension: Ix) -> Self {
        Self::new_unchecked(dimension.clamp(1, MAX_DIMENSION))
    }

    pub fn try_new(dimension: Ix) -> Result<Self> {
        if (1..=MAX_DIMENSION).contains(&dimension) {
            Ok(Self::new_unchecked(dimension))
        } else {
            Err(GameError::InvalidDimension(dimension))
        }
    }

    pub const fn total_tiles(&self) -> Ax {
        area(self.dimension)
    }

    pub const fn pair_count(&self) -> Ax {
        self.total_tiles() / 2
    }

    /// Odd boards get one extra tile that is left out of play
    pub const fn has_spare(&self) -> bool {
        self.total_tiles() % 2 == 1
    }
}

impl From<Difficulty> for BoardConfig {
    fn from(difficulty: Difficulty) -> Self {
        Self::new_unchecked(difficulty.dimension())
    }
}
