//! Consumers of captured snapshots.
//!
//! An [`Analyzer`] receives every snapshot of a run in capture order through
//! [`Analyzer::step`] and is told the run ended through [`Analyzer::done`],
//! which is called exactly once. Analyzers are looked up by name in an
//! [`AnalyzerRegistry`].

mod json_lines;
mod registry;
mod summary;
mod template;

use crate::game::GameState;

pub use json_lines::JsonLinesAnalyzer;
pub use registry::{AnalyzerContext, AnalyzerRegistry, Constructor, FALLBACK_ANALYZER};
pub use summary::{EntityStats, SummaryAnalyzer};
pub use template::TemplateAnalyzer;

pub trait Analyzer {
    /// Consume one snapshot.
    fn step(&mut self, state: GameState) -> anyhow::Result<()>;

    /// The run is over; flush and report.
    fn done(&mut self) -> anyhow::Result<()>;
}

impl<A: Analyzer + ?Sized> Analyzer for Box<A> {
    fn step(&mut self, state: GameState) -> anyhow::Result<()> {
        (**self).step(state)
    }

    fn done(&mut self) -> anyhow::Result<()> {
        (**self).done()
    }
}
