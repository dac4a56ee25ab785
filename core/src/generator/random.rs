use super::*;

/// Generation strategy that paints pairs with distinct palette colors and shuffles the result.
///
/// Odd-sized boards get one spare tile with a color no pair uses, so it can never be mistaken for half of a pair and
/// the stage stays clearable.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
    palette: Palette,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64, palette: Palette) -> Self {
        Self { seed, palette }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: BoardConfig) -> Board {
        use rand::prelude::*;

        let config = if (1..=MAX_DIMENSION).contains(&config.dimension) {
            config
        } else {
            log::warn!(
                "Board dimension {} out of range, clamped into 1..={}",
                config.dimension,
                MAX_DIMENSION
            );
            BoardConfig::new(config.dimension)
        };

        let pairs = usize::from(config.pair_count());
        let spare = config.has_spare();
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let colors = self.palette.draw(pairs + usize::from(spare), &mut rng);

        let mut tiles = Vec::with_capacity(usize::from(config.total_tiles()));
        let mut ids = 0..;
        for color in &colors[..pairs] {
            for id in ids.by_ref().take(2) {
                tiles.push(Tile::new(id, color.clone()));
            }
        }
        if spare {
            let id = ids.next().unwrap_or_default();
            tiles.push(Tile::spare(id, colors[pairs].clone()));
        }

        tiles.shuffle(&mut rng);
        log::debug!(
            "Generated {}x{} board with {} pairs{}",
            config.dimension,
            config.dimension,
            pairs,
            if spare { " and a spare tile" } else { "" }
        );

        Board::from_tiles(config.dimension, tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64, dimension: Ix) -> Board {
        RandomBoardGenerator::new(seed, Palette::default()).generate(BoardConfig::new(dimension))
    }

    #[test]
    fn even_boards_have_each_color_exactly_twice() {
        for dimension in [2, 4, 6, 8] {
            let board = generate(42, dimension);
            let total = usize::from(area(dimension));
            let counts = board.color_counts();

            assert_eq!(board.len(), total);
            assert_eq!(counts.len(), total / 2, "dimension {}", dimension);
            assert!(counts.values().all(|&count| count == 2));
            assert_eq!(board.spare_index(), None);
        }
    }

    #[test]
    fn odd_boards_have_one_spare_with_its_own_color() {
        for dimension in [1, 3, 5, 7] {
            let board = generate(9, dimension);
            let spare = board.spare_index().expect("odd board needs a spare");
            let counts = board.color_counts();

            assert_eq!(counts[board[spare].color().name()], 1);
            assert_eq!(board.pair_count(), area(dimension) / 2);
            assert!(board.is_pairable());
        }
    }

    #[test]
    fn easy_board_has_four_pairs_and_a_spare() {
        let board = generate(3, Difficulty::Easy.dimension());
        assert_eq!(board.len(), 9);
        assert_eq!(board.pair_count(), 4);
        assert!(board.spare_index().is_some());
    }

    #[test]
    fn same_seed_same_board() {
        assert_eq!(generate(1234, 5), generate(1234, 5));
    }

    #[test]
    fn shuffle_preserves_the_color_multiset() {
        let small_palette = Palette::classic();
        for seed in 0..20 {
            let board = RandomBoardGenerator::new(seed, small_palette.clone())
                .generate(BoardConfig::new(4));
            let mut counts: Vec<_> = board.color_counts().into_values().collect();
            counts.sort_unstable();
            assert_eq!(counts, vec![2; 8]);
            let ids: hashbrown::HashSet<_> = board.tiles().iter().map(Tile::id).collect();
            assert_eq!(ids.len(), 16);
        }
    }

    #[test]
    fn out_of_range_dimension_is_clamped() {
        let board = RandomBoardGenerator::new(0, Palette::classic())
            .generate(BoardConfig::new_unchecked(0));
        assert_eq!(board.dimension(), 1);
        assert_eq!(board.len(), 1);
        assert_eq!(BoardConfig::try_new(0), Err(GameError::InvalidDimension(0)));
        assert_eq!(
            BoardConfig::try_new(MAX_DIMENSION + 1),
            Err(GameError::InvalidDimension(MAX_DIMENSION + 1))
        );
    }
}
