use core::ops::Index;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::*;

/// Square grid of tiles stored row by row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    dimension: Ix,
    tiles: Vec<Tile>,
}

impl Board {
    pub(crate) fn from_tiles(dimension: Ix, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), usize::from(area(dimension)));
        Self { dimension, tiles }
    }

    pub fn dimension(&self) -> Ix {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: TileIndex) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub(crate) fn tile_mut(&mut self, index: TileIndex) -> &mut Tile {
        &mut self.tiles[index]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(usize::from(self.dimension.max(1)))
    }

    /// `(row, column)` of a tile index
    pub fn position(&self, index: TileIndex) -> Option<(Ix, Ix)> {
        if index >= self.tiles.len() {
            return None;
        }
        let side = usize::from(self.dimension);
        Some(((index / side) as Ix, (index % side) as Ix))
    }

    pub fn spare_index(&self) -> Option<TileIndex> {
        self.tiles.iter().position(Tile::is_spare)
    }

    /// Number of pairs the board was generated with
    pub fn pair_count(&self) -> Ax {
        (self.tiles.iter().filter(|tile| !tile.is_spare()).count() / 2) as Ax
    }

    pub fn unmatched_pairs(&self) -> Ax {
        (self.tiles.iter().filter(|tile| tile.is_playable()).count() / 2) as Ax
    }

    /// Other unmatched tile with the same color, if any
    pub fn partner_of(&self, index: TileIndex) -> Option<TileIndex> {
        let tile = self.tile(index).filter(|tile| tile.is_playable())?;
        self.tiles
            .iter()
            .enumerate()
            .find(|&(other_index, other)| {
                other_index != index && other.is_playable() && other.matches(tile)
            })
            .map(|(other_index, _)| other_index)
    }

    pub fn color_counts(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for tile in &self.tiles {
            *counts.entry(tile.color().name()).or_insert(0) += 1;
        }
        counts
    }

    /// Every color pairs up, except at most one spare color on odd boards.
    pub fn is_pairable(&self) -> bool {
        let odd_colors = self
            .color_counts()
            .values()
            .filter(|&&count| count % 2 == 1)
            .count();
        odd_colors == self.tiles.len() % 2
    }
}

impl Index<TileIndex> for Board {
    type Output = Tile;

    fn index(&self, index: TileIndex) -> &Self::Output {
        &self.tiles[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(name: &str) -> NamedColor {
        NamedColor::new(0, Rgba::default(), name)
    }

    fn board(names: &[&str]) -> Board {
        let dimension = (names.len() as f64).sqrt() as Ix;
        let tiles = names
            .iter()
            .zip(0..)
            .map(|(name, id)| Tile::new(id, color(name)))
            .collect();
        Board::from_tiles(dimension, tiles)
    }

    #[test]
    fn rows_and_positions_follow_the_grid() {
        let board = board(&["a", "b", "a", "b"]);

        let rows: Vec<_> = board.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0].color().name(), "a");
        assert_eq!(board.position(3), Some((1, 1)));
        assert_eq!(board.position(4), None);
    }

    #[test]
    fn partner_skips_matched_tiles() {
        let mut board = board(&["a", "b", "a", "b"]);
        assert_eq!(board.partner_of(0), Some(2));

        board.tile_mut(0).set_matched();
        board.tile_mut(2).set_matched();
        assert_eq!(board.partner_of(0), None);
        assert_eq!(board.partner_of(1), Some(3));
        assert_eq!(board.unmatched_pairs(), 1);
        assert_eq!(board.pair_count(), 2);
    }

    #[test]
    fn pairable_detects_stray_colors() {
        assert!(board(&["a", "b", "a", "b"]).is_pairable());
        assert!(!board(&["a", "b", "a", "c"]).is_pairable());
    }
}
