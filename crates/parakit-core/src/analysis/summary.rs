use tracing::info;

use super::Analyzer;
use crate::game::GameState;

/// Running min / max / mean of a per-frame count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntityStats {
    pub min: usize,
    pub max: usize,
    pub total: usize,
    pub samples: usize,
}

impl EntityStats {
    pub fn record(&mut self, count: usize) {
        if self.samples == 0 {
            self.min = count;
            self.max = count;
        } else {
            self.min = self.min.min(count);
            self.max = self.max.max(count);
        }
        self.total += count;
        self.samples += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.total as f64 / self.samples as f64)
    }
}

impl std::fmt::Display for EntityStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mean() {
            Some(mean) => write!(f, "min {} / max {} / mean {:.1}", self.min, self.max, mean),
            None => write!(f, "not extracted"),
        }
    }
}

/// Logs entity count statistics over the whole run.
#[derive(Debug, Default)]
pub struct SummaryAnalyzer {
    frames: usize,
    boss_frames: usize,
    first_frame: Option<i32>,
    last_frame: Option<i32>,
    graze_gained: i32,
    first_graze: Option<i32>,
    pub bullets: EntityStats,
    pub enemies: EntityStats,
    pub items: EntityStats,
    pub lasers: EntityStats,
}

impl SummaryAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn boss_frames(&self) -> usize {
        self.boss_frames
    }

    pub fn graze_gained(&self) -> i32 {
        self.graze_gained
    }
}

impl Analyzer for SummaryAnalyzer {
    fn step(&mut self, state: GameState) -> anyhow::Result<()> {
        self.frames += 1;
        if state.boss_present() {
            self.boss_frames += 1;
        }
        self.first_frame.get_or_insert(state.frame_stage);
        self.last_frame = Some(state.frame_stage);
        let first_graze = *self.first_graze.get_or_insert(state.graze);
        self.graze_gained = state.graze - first_graze;

        if let Some(bullets) = &state.bullets {
            self.bullets.record(bullets.len());
        }
        if let Some(enemies) = &state.enemies {
            self.enemies.record(enemies.len());
        }
        if let Some(items) = &state.items {
            self.items.record(items.len());
        }
        if let Some(lasers) = &state.lasers {
            self.lasers.record(lasers.len());
        }
        Ok(())
    }

    fn done(&mut self) -> anyhow::Result<()> {
        match (self.first_frame, self.last_frame) {
            (Some(first), Some(last)) => info!(
                "Summary of {} snapshots (in-stage frames {}..={})",
                self.frames, first, last
            ),
            _ => {
                info!("Summary: no snapshots captured");
                return Ok(());
            }
        }
        info!("  Bullets: {}", self.bullets);
        info!("  Enemies: {}", self.enemies);
        info!("  Items:   {}", self.items);
        info!("  Lasers:  {}", self.lasers);
        info!("  Boss present in {} snapshots", self.boss_frames);
        info!("  Graze gained: {}", self.graze_gained);
        Ok(())
    }
}
