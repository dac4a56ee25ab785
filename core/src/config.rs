use core::time::Duration;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

pub const DEFAULT_STAGE_TIMEOUTS: [u32; 3] = [15, 10, 5];

pub const DEFAULT_MISMATCH_DELAY_MS: u64 = 500;

pub const MAX_STAGES: usize = 16;

pub const MAX_STAGE_TIMEOUT_SECS: u32 = 3600;

/// Which finished runs are offered for the score list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordPolicy {
    /// Only runs that beat the stored high score
    #[default]
    HighScoreOnly,
    /// Every finished run
    Always,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub index: usize,
    pub timeout_secs: u32,
    pub dimension: Ix,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub difficulty: Difficulty,
    pub stage_timeouts: SmallVec<[u32; 4]>,
    pub mismatch_policy: MismatchPolicy,
    pub mismatch_delay_ms: u64,
    pub record_policy: RecordPolicy,
    pub palette: Palette,
}

impl RunConfig {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            stage_timeouts: SmallVec::from_slice(&DEFAULT_STAGE_TIMEOUTS),
            mismatch_policy: MismatchPolicy::default(),
            mismatch_delay_ms: DEFAULT_MISMATCH_DELAY_MS,
            record_policy: RecordPolicy::default(),
            palette: Palette::default(),
        }
    }

    /// Parses a JSON config, missing fields take their defaults.
    pub fn from_json(json: &str) -> core::result::Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Replaces the stages, timeouts are clamped to `1..=MAX_STAGE_TIMEOUT_SECS` and at most `MAX_STAGES` are kept.
    pub fn with_stage_timeouts(mut self, timeouts: impl IntoIterator<Item = u32>) -> Self {
        self.stage_timeouts = timeouts
            .into_iter()
            .take(MAX_STAGES)
            .map(|secs| secs.clamp(1, MAX_STAGE_TIMEOUT_SECS))
            .collect();
        self
    }

    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }

    pub fn end_on_mismatch(self, end_on_mismatch: bool) -> Self {
        self.with_mismatch_policy(MismatchPolicy::from_end_on_mismatch(end_on_mismatch))
    }

    pub fn with_mismatch_delay(mut self, delay: Duration) -> Self {
        self.mismatch_delay_ms = delay.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn with_record_policy(mut self, policy: RecordPolicy) -> Self {
        self.record_policy = policy;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_delay_ms)
    }

    pub fn stages(&self) -> SmallVec<[Stage; 4]> {
        let dimension = self.difficulty.dimension();
        self.stage_timeouts
            .iter()
            .enumerate()
            .map(|(index, &timeout_secs)| Stage {
                index,
                timeout_secs,
                dimension,
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.stage_timeouts.is_empty() {
            return Err(GameError::NoStages);
        }
        if self.stage_timeouts.len() > MAX_STAGES {
            return Err(GameError::TooManyStages);
        }
        if !self
            .stage_timeouts
            .iter()
            .all(|secs| (1..=MAX_STAGE_TIMEOUT_SECS).contains(secs))
        {
            return Err(GameError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_three_shrinking_stages() {
        let config = RunConfig::new(Difficulty::Medium);
        let stages = config.stages();

        assert_eq!(stages.len(), 3);
        assert_eq!(
            stages.iter().map(|stage| stage.timeout_secs).collect::<Vec<_>>(),
            [15, 10, 5]
        );
        assert!(stages.iter().all(|stage| stage.dimension == 5));
        assert_eq!(config.mismatch_delay(), Duration::from_millis(500));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn stage_timeouts_are_clamped() {
        let config = RunConfig::default().with_stage_timeouts([0, 30, 99_999]);
        assert_eq!(config.stage_timeouts.as_slice(), &[1, 30, MAX_STAGE_TIMEOUT_SECS]);
    }

    #[test]
    fn json_config_fills_defaults() {
        let config =
            RunConfig::from_json(r#"{"difficulty":"Hard","mismatch_policy":"EndRun"}"#).unwrap();

        assert_eq!(config.difficulty, Difficulty::Hard);
        assert!(config.mismatch_policy.ends_run());
        assert_eq!(config.stage_timeouts.as_slice(), &DEFAULT_STAGE_TIMEOUTS);
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn json_config_is_validated() {
        assert!(matches!(
            RunConfig::from_json(r#"{"stage_timeouts":[]}"#),
            Err(ConfigError::Invalid(GameError::NoStages))
        ));
        assert!(matches!(
            RunConfig::from_json(r#"{"stage_timeouts":[10,0]}"#),
            Err(ConfigError::Invalid(GameError::InvalidTimeout))
        ));
        assert!(matches!(
            RunConfig::from_json(r#"{"stage_timeouts":[10,3601]}"#),
            Err(ConfigError::Invalid(GameError::InvalidTimeout))
        ));
        let too_many = format!("{{\"stage_timeouts\":{:?}}}", [5; MAX_STAGES + 1]);
        assert!(matches!(
            RunConfig::from_json(&too_many),
            Err(ConfigError::Invalid(GameError::TooManyStages))
        ));
        assert!(RunConfig::from_json(r#"{"stage_timeouts":[3600]}"#).is_ok());
        assert!(matches!(
            RunConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
