use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use tracing::info;

use super::Analyzer;
use crate::game::GameState;
use crate::schema::GameTitle;

/// Writes every snapshot as one JSON object per line (NDJSON).
///
/// Output goes to `<output_dir>/<title>_<YYYYmmdd_HHMMSS>.jsonl`.
pub struct JsonLinesAnalyzer {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl JsonLinesAnalyzer {
    pub fn create(output_dir: &Path, title: GameTitle) -> anyhow::Result<Self> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("creating {}", output_dir.display()))?;

        let now: DateTime<Local> = Local::now();
        let path = output_dir.join(format!(
            "{}_{}.jsonl",
            title.short_name(),
            now.format("%Y%m%d_%H%M%S")
        ));
        Self::at_path(path)
    }

    /// Write to an explicit file, truncating it.
    pub fn at_path(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Analyzer for JsonLinesAnalyzer {
    fn step(&mut self, state: GameState) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, &state)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn done(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        info!("Wrote {} snapshots to {}", self.written, self.path.display());
        Ok(())
    }
}
