use tracing::debug;

use super::Analyzer;
use crate::game::GameState;

/// Does nothing with the snapshots. Starting point for new analyzers and the
/// fallback for unknown names.
#[derive(Debug, Default)]
pub struct TemplateAnalyzer {
    steps: u64,
}

impl TemplateAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Analyzer for TemplateAnalyzer {
    fn step(&mut self, _state: GameState) -> anyhow::Result<()> {
        self.steps += 1;
        Ok(())
    }

    fn done(&mut self) -> anyhow::Result<()> {
        debug!("Template analyzer saw {} snapshots", self.steps);
        Ok(())
    }
}
