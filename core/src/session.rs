use core::time::Duration;
use rand::prelude::*;
use serde::Serialize;

use crate::*;

/// Name recorded when the player submits a blank one.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

pub const MAX_PLAYER_NAME_CHARS: usize = 24;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PendingScore {
    difficulty: Difficulty,
    score: u32,
}

/// Everything a presentation layer needs to draw the game.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameView<'a> {
    pub difficulty: Option<Difficulty>,
    pub board: Option<&'a Board>,
    pub score: u32,
    pub high_score: u32,
    pub time_remaining: u32,
    pub stage_index: usize,
    pub stage_count: usize,
    pub run_state: RunState,
    pub awaiting_name: bool,
}

/// Single owner of the current run, its timers and the score lists.
///
/// The presentation layer sends commands and reads [`Session::view`] afterwards. Timers are either driven through
/// [`Session::advance`]/[`Session::pump`], or by the host calling [`Session::tick`] every second and
/// [`Session::clear_mismatch`] after each ticket's delay.
pub struct Session<B> {
    config: RunConfig,
    store: ScoreStore<B>,
    run: Option<Run>,
    generation: u64,
    rng: SmallRng,
    scheduler: Scheduler,
    pending_score: Option<PendingScore>,
    high_score: u32,
}

impl<B: ScoreBackend> Session<B> {
    /// `config` is the template for every run, its difficulty is replaced by the one passed to `start_run`
    pub fn new(config: RunConfig, store: ScoreStore<B>, seed: u64) -> Self {
        let high_score = store.high_score(config.difficulty);
        Self {
            config,
            store,
            run: None,
            generation: 0,
            rng: SmallRng::seed_from_u64(seed),
            scheduler: Scheduler::new(),
            pending_score: None,
            high_score,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn run(&self) -> Option<&Run> {
        self.run.as_ref()
    }

    pub fn store(&self) -> &ScoreStore<B> {
        &self.store
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn run_state(&self) -> RunState {
        self.run.as_ref().map_or(RunState::NotStarted, Run::state)
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn awaiting_name(&self) -> bool {
        self.pending_score.is_some()
    }

    pub fn scores(&self, difficulty: Difficulty) -> Vec<ScoreEntry> {
        self.store.load_scores(difficulty)
    }

    pub fn view(&self) -> GameView<'_> {
        let run = self.run.as_ref();
        GameView {
            difficulty: run.map(Run::difficulty),
            board: run.map(Run::board),
            score: run.map_or(0, Run::score),
            high_score: self.high_score,
            time_remaining: run.map_or(0, Run::time_remaining),
            stage_index: run.map_or(0, Run::stage_index),
            stage_count: run.map_or(0, Run::stage_count),
            run_state: self.run_state(),
            awaiting_name: self.awaiting_name(),
        }
    }

    /// Replaces any current run, a score still waiting for a name is dropped
    pub fn start_run(&mut self, difficulty: Difficulty) -> Result<RunState> {
        let config = self.config.clone().with_difficulty(difficulty);
        let generation = self.generation + 1;
        let run = Run::start(config, generation, self.rng.random())?;

        if let Some(pending) = self.pending_score.take() {
            log::debug!(
                "Dropping unrecorded score {} on {}",
                pending.score,
                pending.difficulty
            );
        }
        self.generation = generation;
        self.scheduler.clear();
        self.scheduler.schedule_tick(generation);
        self.high_score = self.store.high_score(difficulty);
        let state = run.state();
        self.run = Some(run);
        log::info!("Started run {} on {}", generation, difficulty);
        Ok(state)
    }

    pub fn select(&mut self, index: TileIndex) -> PlayOutcome {
        let Some(run) = self.run.as_mut() else {
            return PlayOutcome::Ignored;
        };
        let outcome = run.select(index);
        match outcome {
            PlayOutcome::StageCleared(stage) => {
                log::info!("Stage {} cleared", stage.index);
                self.scheduler.cancel_ticks(self.generation);
                self.scheduler.schedule_tick(self.generation);
            }
            PlayOutcome::Mismatched { ticket, .. } => {
                self.scheduler
                    .schedule(ticket.delay, ScheduledEvent::ClearSelection(ticket));
            }
            _ => {}
        }
        if let Some(complete) = outcome.completion() {
            self.complete(complete);
        }
        outcome
    }

    pub fn tick(&mut self) -> RunTick {
        let Some(run) = self.run.as_mut() else {
            return RunTick::Ignored;
        };
        let tick = run.tick();
        if let RunTick::TimedOut(complete) = tick {
            self.complete(complete);
        }
        tick
    }

    pub fn clear_mismatch(&mut self, ticket: ClearTicket) -> bool {
        self.run
            .as_mut()
            .is_some_and(|run| run.clear_mismatch(ticket))
    }

    /// Lets `elapsed` of virtual time pass, firing due ticks and mismatch clears. Returns whether anything changed.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.scheduler.advance(elapsed);
        let mut updated = false;
        while let Some(event) = self.scheduler.pop_due() {
            if event.generation() != self.generation {
                log::trace!("Dropping stale event {:?}", event);
                continue;
            }
            match event {
                ScheduledEvent::Tick { .. } => {
                    let tick = self.tick();
                    updated |= !matches!(tick, RunTick::Ignored);
                    if self.run_state().is_active() {
                        self.scheduler.schedule_tick(self.generation);
                    }
                }
                ScheduledEvent::ClearSelection(ticket) => {
                    updated |= self.clear_mismatch(ticket);
                }
            }
        }
        updated
    }

    /// Advances by the wall time since the clock's previous lap
    pub fn pump(&mut self, clock: &mut Clock) -> bool {
        self.advance(clock.lap())
    }

    /// Records the finished run's score under `name`, if one is waiting
    pub fn submit_player_name(&mut self, name: &str) -> Option<ScoreEntry> {
        let pending = self.pending_score.take()?;
        let id = self.rng.random();
        let entry = ScoreEntry::new(id, Self::clean_name(name), pending.score);
        self.store.record_score(pending.difficulty, entry.clone());
        self.high_score = self.store.high_score(pending.difficulty);
        log::info!(
            "Recorded {} for {:?} on {}",
            entry.score(),
            entry.player_name(),
            pending.difficulty
        );
        Some(entry)
    }

    fn clean_name(name: &str) -> String {
        let name: String = name.trim().chars().take(MAX_PLAYER_NAME_CHARS).collect();
        let name = name.trim_end();
        if name.is_empty() {
            DEFAULT_PLAYER_NAME.to_owned()
        } else {
            name.to_owned()
        }
    }

    fn complete(&mut self, complete: RunComplete) {
        self.scheduler.cancel_ticks(self.generation);
        let Some(difficulty) = self.run.as_ref().map(Run::difficulty) else {
            return;
        };
        log::info!(
            "Run {} {} with score {}",
            self.generation,
            if complete.won { "won" } else { "lost" },
            complete.final_score
        );

        let record = match self.config.record_policy {
            RecordPolicy::Always => true,
            RecordPolicy::HighScoreOnly => complete.final_score > self.high_score,
        };
        if record {
            self.pending_score = Some(PendingScore {
                difficulty,
                score: complete.final_score,
            });
        }
    }
}
