use chrono::prelude::*;
use core::time::Duration;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - NotStarted -> Active
/// - Active -> Won
/// - Active -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// No run was started yet
    #[default]
    NotStarted,
    Active,
    /// Run ended after clearing the last stage
    Won,
    /// Run ended by timeout or by a mismatch under `MismatchPolicy::EndRun`
    Lost,
}

impl RunState {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Indicates the run has ended and no moves can be made anymore
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunComplete {
    pub won: bool,
    pub final_score: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StageAdvance {
    Next(Stage),
    Complete(RunComplete),
}

/// Handle for clearing a shown mismatch once its display delay has passed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClearTicket {
    pub generation: u64,
    pub stage: usize,
    pub delay: Duration,
}

/// Outcome of a tap as seen by the whole run
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    Ignored,
    Selected,
    Matched,
    /// The last pair of a stage was matched and the next stage began
    StageCleared(Stage),
    Mismatched {
        ticket: ClearTicket,
        completion: Option<RunComplete>,
    },
    Complete(RunComplete),
}

impl PlayOutcome {
    /// Whether this outcome could have caused an update to the run
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Ignored)
    }

    pub const fn completion(self) -> Option<RunComplete> {
        match self {
            Self::Complete(complete) => Some(complete),
            Self::Mismatched { completion, .. } => completion,
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunTick {
    Ignored,
    Remaining(u32),
    TimedOut(RunComplete),
}

/// Represents a run from difficulty selection to win or loss
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Run {
    config: RunConfig,
    generation: u64,
    seed: u64,
    stages: SmallVec<[Stage; 4]>,
    stage_index: usize,
    engine: MatchEngine,
    countdown: Countdown,
    state: RunState,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl Run {
    /// Starts a run on its first stage. `generation` tells runs of one session apart, `seed` drives every board.
    pub fn start(config: RunConfig, generation: u64, seed: u64) -> Result<Self> {
        config.validate()?;
        let stages = config.stages();
        let first = stages[0];
        let board = Self::generate_board(&config, seed, &first);
        let engine = MatchEngine::new(board, config.mismatch_policy);
        let started_at = Utc::now();
        log::debug!(
            "Run {} started at {} on {} with {} stages",
            generation,
            started_at,
            config.difficulty,
            stages.len()
        );
        Ok(Self {
            countdown: Countdown::new(first.timeout_secs),
            config,
            generation,
            seed,
            stages,
            stage_index: 0,
            engine,
            state: RunState::Active,
            started_at,
            ended_at: None,
        })
    }

    fn generate_board(config: &RunConfig, seed: u64, stage: &Stage) -> Board {
        let stage_seed = SmallRng::seed_from_u64(seed ^ stage.index as u64).random();
        RandomBoardGenerator::new(stage_seed, config.palette.clone())
            .generate(BoardConfig::new(stage.dimension))
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn ended(&self) -> bool {
        self.state.is_final()
    }

    pub fn stage(&self) -> Stage {
        self.stages[self.stage_index]
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn is_last_stage(&self) -> bool {
        self.stage_index + 1 >= self.stages.len()
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    /// Cumulative over all stages of the run
    pub fn score(&self) -> u32 {
        self.engine.score()
    }

    pub fn remaining_pairs(&self) -> Ax {
        self.engine.remaining_pairs()
    }

    pub fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// How many seconds have passed since the run started
    pub fn elapsed_secs(&self) -> u32 {
        let secs = (self.ended_at.unwrap_or_else(Utc::now) - self.started_at)
            .num_seconds()
            .max(0);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }

    pub fn select(&mut self, index: TileIndex) -> PlayOutcome {
        use PlayOutcome::*;

        if self.state.is_final() {
            log::trace!("Ignoring tap on {} after run {} ended", index, self.generation);
            return Ignored;
        }

        match self.engine.select(index) {
            SelectOutcome::Ignored => Ignored,
            SelectOutcome::Selected => Selected,
            SelectOutcome::Matched {
                stage_cleared: false,
            } => Matched,
            SelectOutcome::Matched {
                stage_cleared: true,
            } => match self.advance() {
                StageAdvance::Next(stage) => StageCleared(stage),
                StageAdvance::Complete(complete) => Complete(complete),
            },
            SelectOutcome::Mismatched { ends_run } => {
                let ticket = ClearTicket {
                    generation: self.generation,
                    stage: self.stage_index,
                    delay: self.config.mismatch_delay(),
                };
                let completion = if ends_run { self.end(false) } else { None };
                Mismatched { ticket, completion }
            }
        }
    }

    /// Clears a shown mismatch, stale tickets from another run or stage are ignored
    pub fn clear_mismatch(&mut self, ticket: ClearTicket) -> bool {
        if ticket.generation != self.generation || ticket.stage != self.stage_index {
            log::debug!(
                "Dropping stale clear for run {} stage {}, current is run {} stage {}",
                ticket.generation,
                ticket.stage,
                self.generation,
                self.stage_index
            );
            return false;
        }
        self.engine.clear_mismatch()
    }

    /// Moves on to the next stage, or completes the run as won from the last one
    pub fn advance_stage(&mut self) -> Result<StageAdvance> {
        if self.state.is_final() {
            return Err(GameError::AlreadyEnded);
        }
        Ok(self.advance())
    }

    fn advance(&mut self) -> StageAdvance {
        if self.is_last_stage() {
            let complete = self.end(true).unwrap_or(RunComplete {
                won: true,
                final_score: self.score(),
            });
            return StageAdvance::Complete(complete);
        }

        self.stage_index += 1;
        let stage = self.stage();
        let board = Self::generate_board(&self.config, self.seed, &stage);
        self.engine = MatchEngine::with_score(board, self.config.mismatch_policy, self.score());
        self.countdown.reset(stage.timeout_secs);
        log::debug!(
            "Run {} advanced to stage {} with {}s, score: {}",
            self.generation,
            stage.index,
            stage.timeout_secs,
            self.score()
        );
        StageAdvance::Next(stage)
    }

    pub fn tick(&mut self) -> RunTick {
        if self.state.is_final() {
            return RunTick::Ignored;
        }
        match self.countdown.tick() {
            TickOutcome::Ignored => RunTick::Ignored,
            TickOutcome::Ticked(remaining) => RunTick::Remaining(remaining),
            TickOutcome::Expired => self
                .on_timeout()
                .map_or(RunTick::Ignored, RunTick::TimedOut),
        }
    }

    /// Ends the run as lost when the stage time is up with pairs left
    pub fn on_timeout(&mut self) -> Option<RunComplete> {
        if self.state.is_final() || self.engine.is_cleared() {
            return None;
        }
        log::debug!(
            "Run {} timed out on stage {} with {} pairs left",
            self.generation,
            self.stage_index,
            self.remaining_pairs()
        );
        self.end(false)
    }

    /// Only the first call reports completion
    fn end(&mut self, won: bool) -> Option<RunComplete> {
        if self.state.is_final() {
            return None;
        }
        self.state = if won { RunState::Won } else { RunState::Lost };
        self.countdown.stop();
        self.engine.finish();
        let now = Utc::now();
        self.ended_at.replace(now);
        log::debug!("Run {} ended at {}, won: {}", self.generation, now, won);
        Some(RunComplete {
            won,
            final_score: self.score(),
        })
    }
}
