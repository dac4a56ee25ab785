use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// What a mismatch does to the run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MismatchPolicy {
    /// Any mismatch ends the run
    EndRun,
    /// Mismatches only cost time
    #[default]
    Continue,
}

impl MismatchPolicy {
    pub const fn from_end_on_mismatch(end_on_mismatch: bool) -> Self {
        if end_on_mismatch {
            Self::EndRun
        } else {
            Self::Continue
        }
    }

    pub const fn ends_run(self) -> bool {
        matches!(self, Self::EndRun)
    }
}

/// Valid transitions:
/// - Idle -> OneSelected
/// - OneSelected -> Idle (match)
/// - OneSelected -> Revealing (mismatch)
/// - Revealing -> Idle (mismatch cleared)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionState {
    Idle,
    OneSelected,
    /// Two mismatched tiles stay visible until the display delay clears them
    Revealing,
}

/// Outcome of tapping a tile
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    Ignored,
    Selected,
    Matched { stage_cleared: bool },
    Mismatched { ends_run: bool },
}

impl SelectOutcome {
    /// Whether this outcome could have caused an update to the board
    pub const fn has_update(self) -> bool {
        use SelectOutcome::*;
        match self {
            Ignored => false,
            Selected => true,
            Matched { .. } => true,
            Mismatched { .. } => true,
        }
    }
}

/// Selection and pair resolution for the board of a single stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchEngine {
    board: Board,
    selection: SmallVec<[TileIndex; 2]>,
    score: u32,
    remaining_pairs: Ax,
    policy: MismatchPolicy,
    finished: bool,
}

impl MatchEngine {
    pub fn new(board: Board, policy: MismatchPolicy) -> Self {
        Self::with_score(board, policy, 0)
    }

    /// Engine whose score continues from earlier stages
    pub fn with_score(board: Board, policy: MismatchPolicy, score: u32) -> Self {
        let remaining_pairs = board.unmatched_pairs();
        Self {
            board,
            selection: SmallVec::new(),
            score,
            remaining_pairs,
            policy,
            finished: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn remaining_pairs(&self) -> Ax {
        self.remaining_pairs
    }

    pub fn selection(&self) -> &[TileIndex] {
        &self.selection
    }

    pub fn policy(&self) -> MismatchPolicy {
        self.policy
    }

    pub fn state(&self) -> SelectionState {
        match self.selection.len() {
            0 => SelectionState::Idle,
            1 => SelectionState::OneSelected,
            _ => SelectionState::Revealing,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.remaining_pairs == 0
    }

    /// No more taps are accepted, either cleared or stopped by the run
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn select(&mut self, index: TileIndex) -> SelectOutcome {
        use SelectOutcome::*;

        if self.finished {
            log::trace!("Ignoring tap on {} after the stage finished", index);
            return Ignored;
        }
        if matches!(self.state(), SelectionState::Revealing) {
            log::trace!("Ignoring tap on {} while a mismatch is shown", index);
            return Ignored;
        }
        match self.board.tile(index) {
            Some(tile) if tile.is_playable() && !tile.is_selected() => {}
            Some(_) => {
                log::trace!("Ignoring tap on unavailable tile {}", index);
                return Ignored;
            }
            None => {
                log::trace!("Ignoring tap on out of range tile {}", index);
                return Ignored;
            }
        }

        self.board.tile_mut(index).set_selected(true);
        let Some(&first) = self.selection.first() else {
            self.selection.push(index);
            log::trace!("Selected tile {}", index);
            return Selected;
        };
        self.selection.push(index);

        if self.board[first].matches(&self.board[index]) {
            self.board.tile_mut(first).set_matched();
            self.board.tile_mut(index).set_matched();
            self.selection.clear();
            self.score = self.score.saturating_add(1);
            self.remaining_pairs = self.remaining_pairs.saturating_sub(1);
            let stage_cleared = self.remaining_pairs == 0;
            if stage_cleared {
                self.finished = true;
            }
            log::debug!(
                "Matched tiles {} and {}, score: {}, pairs left: {}",
                first,
                index,
                self.score,
                self.remaining_pairs
            );
            Matched { stage_cleared }
        } else {
            let ends_run = self.policy.ends_run();
            if ends_run {
                self.finished = true;
            }
            log::debug!("Mismatched tiles {} and {}", first, index);
            Mismatched { ends_run }
        }
    }

    /// Unselects the two tiles of a shown mismatch, returns whether anything changed
    pub fn clear_mismatch(&mut self) -> bool {
        if !matches!(self.state(), SelectionState::Revealing) {
            return false;
        }
        for index in self.selection.drain(..) {
            self.board.tile_mut(index).set_selected(false);
        }
        log::trace!("Cleared mismatched selection");
        true
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(policy: MismatchPolicy) -> MatchEngine {
        let board = RandomBoardGenerator::new(5, Palette::default()).generate(BoardConfig::new(4));
        MatchEngine::new(board, policy)
    }

    fn mismatched_pair(engine: &MatchEngine) -> (TileIndex, TileIndex) {
        let board = engine.board();
        let other = (1..board.len())
            .find(|&index| !board[0].matches(&board[index]))
            .unwrap();
        (0, other)
    }

    #[test]
    fn reselecting_a_selected_tile_is_a_noop() {
        let mut engine = engine(MismatchPolicy::Continue);

        assert_eq!(engine.select(0), SelectOutcome::Selected);
        let before = engine.clone();
        assert_eq!(engine.select(0), SelectOutcome::Ignored);
        assert_eq!(engine, before);
    }

    #[test]
    fn match_scores_and_clears_selection() {
        let mut engine = engine(MismatchPolicy::Continue);
        let partner = engine.board().partner_of(0).unwrap();
        let pairs = engine.remaining_pairs();

        engine.select(0);
        let outcome = engine.select(partner);

        assert_eq!(outcome, SelectOutcome::Matched { stage_cleared: false });
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.remaining_pairs(), pairs - 1);
        assert!(engine.selection().is_empty());
        assert!(engine.board()[0].is_matched());
        assert!(engine.board()[partner].is_matched());
        assert_eq!(engine.select(partner), SelectOutcome::Ignored);
    }

    #[test]
    fn mismatch_keeps_selection_until_cleared() {
        let mut engine = engine(MismatchPolicy::Continue);
        let (a, b) = mismatched_pair(&engine);

        engine.select(a);
        assert_eq!(
            engine.select(b),
            SelectOutcome::Mismatched { ends_run: false }
        );
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.selection(), &[a, b]);
        assert_eq!(engine.state(), SelectionState::Revealing);

        let third = (0..engine.board().len())
            .find(|&index| index != a && index != b)
            .unwrap();
        assert_eq!(engine.select(third), SelectOutcome::Ignored);

        assert!(engine.clear_mismatch());
        assert_eq!(engine.state(), SelectionState::Idle);
        assert!(!engine.board()[a].is_selected());
        assert!(!engine.board()[a].is_matched());
        assert!(!engine.board()[b].is_matched());
        assert!(!engine.clear_mismatch());
    }

    #[test]
    fn end_run_policy_finishes_on_mismatch() {
        let mut engine = engine(MismatchPolicy::from_end_on_mismatch(true));
        let (a, b) = mismatched_pair(&engine);

        engine.select(a);
        assert_eq!(engine.select(b), SelectOutcome::Mismatched { ends_run: true });
        assert!(engine.is_finished());
        engine.clear_mismatch();
        assert_eq!(engine.select(a), SelectOutcome::Ignored);
    }

    #[test]
    fn spare_and_out_of_range_taps_are_ignored() {
        let board = RandomBoardGenerator::new(8, Palette::default()).generate(BoardConfig::new(3));
        let spare = board.spare_index().unwrap();
        let mut engine = MatchEngine::new(board, MismatchPolicy::Continue);

        assert_eq!(engine.select(spare), SelectOutcome::Ignored);
        assert_eq!(engine.select(9), SelectOutcome::Ignored);
        assert_eq!(engine.state(), SelectionState::Idle);
    }

    #[test]
    fn clearing_every_pair_finishes_the_stage() {
        let mut engine = engine(MismatchPolicy::Continue);
        let mut last = SelectOutcome::Ignored;

        while let Some(index) = (0..engine.board().len()).find(|&i| engine.board()[i].is_playable()) {
            let partner = engine.board().partner_of(index).unwrap();
            engine.select(index);
            last = engine.select(partner);
        }

        assert_eq!(last, SelectOutcome::Matched { stage_cleared: true });
        assert!(engine.is_cleared());
        assert!(engine.is_finished());
        assert_eq!(engine.score(), 8);
    }
}
