use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::warn;

use super::{Analyzer, JsonLinesAnalyzer, SummaryAnalyzer, TemplateAnalyzer};
use crate::schema::GameTitle;

/// Name used when a requested analyzer does not exist.
pub const FALLBACK_ANALYZER: &str = "template";

/// What an analyzer may need to know when it is created.
#[derive(Debug, Clone)]
pub struct AnalyzerContext {
    pub title: GameTitle,
    /// Directory for analyzers that write files
    pub output_dir: PathBuf,
}

impl AnalyzerContext {
    pub fn new(title: GameTitle, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            title,
            output_dir: output_dir.into(),
        }
    }
}

pub type Constructor = Box<dyn Fn(&AnalyzerContext) -> anyhow::Result<Box<dyn Analyzer>>>;

/// Name → constructor table of the available analyzers.
pub struct AnalyzerRegistry {
    constructors: BTreeMap<String, Constructor>,
}

impl AnalyzerRegistry {
    /// An empty registry holding only the fallback.
    pub fn new() -> Self {
        let mut registry = Self {
            constructors: BTreeMap::new(),
        };
        registry.register(FALLBACK_ANALYZER, |_| Ok(Box::new(TemplateAnalyzer::new())));
        registry
    }

    /// The fallback plus every built-in analyzer.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("json_lines", |ctx| {
            Ok(Box::new(JsonLinesAnalyzer::create(&ctx.output_dir, ctx.title)?))
        });
        registry.register("summary", |_| Ok(Box::new(SummaryAnalyzer::new())));
        registry
    }

    /// Add or replace an analyzer.
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&AnalyzerContext) -> anyhow::Result<Box<dyn Analyzer>> + 'static,
    {
        self.constructors
            .insert(name.to_string(), Box::new(constructor));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Create the analyzer called `name`, or the template analyzer (with a
    /// warning) if no such analyzer is registered.
    pub fn create(&self, name: &str, ctx: &AnalyzerContext) -> anyhow::Result<Box<dyn Analyzer>> {
        let constructor = match self.constructors.get(name) {
            Some(constructor) => constructor,
            None => {
                warn!(
                    "Unrecognized analyzer '{}'; defaulting to {}",
                    name, FALLBACK_ANALYZER
                );
                &self.constructors[FALLBACK_ANALYZER]
            }
        };
        constructor(ctx)
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
