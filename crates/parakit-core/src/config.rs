//! `parakit.toml` settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::capture::{CaptureMode, CaptureOptions, PollPolicy};
use crate::error::{Error, Result};
use crate::extract::ExtractionFlags;
use crate::memory::layout::timing::DEFAULT_POLL_INTERVAL_US;
use crate::schema::{GameSchema, GameTitle};

pub const DEFAULT_CONFIG_FILE: &str = "parakit.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionSection,
    pub single: SingleSection,
    pub sequence: SequenceSection,
    pub target: TargetSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    pub analyzer: String,
    pub bullets: bool,
    pub enemies: bool,
    pub items: bool,
    pub lasers: bool,
    pub screenshots: bool,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        let flags = ExtractionFlags::default();
        Self {
            analyzer: crate::analysis::FALLBACK_ANALYZER.to_string(),
            bullets: flags.bullets,
            enemies: flags.enemies,
            items: flags.items,
            lasers: flags.lasers,
            screenshots: flags.screenshots,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleSection {
    /// Refuse to extract outside the game world
    pub only_game_world: bool,
    /// Also print the per-run values after a single snapshot
    pub show_untracked: bool,
}

impl Default for SingleSection {
    fn default() -> Self {
        Self {
            only_game_world: true,
            show_untracked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceSection {
    /// `<n>f` or `<x>s`; empty for a single snapshot
    pub duration: String,
    pub exact: bool,
    pub need_active: bool,
    pub auto_unpause: bool,
    pub auto_repause: bool,
    pub auto_focus: bool,
    pub poll_interval_us: u64,
    /// 0 waits forever
    pub frame_timeout_ms: u64,
}

impl Default for SequenceSection {
    fn default() -> Self {
        Self {
            duration: String::new(),
            exact: false,
            need_active: true,
            auto_unpause: false,
            auto_repause: false,
            auto_focus: true,
            poll_interval_us: DEFAULT_POLL_INTERVAL_US,
            frame_timeout_ms: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSection {
    pub title: GameTitle,
    /// Schema override file; empty uses the built-in table
    pub schema: String,
}

impl Default for TargetSection {
    fn default() -> Self {
        Self {
            title: GameTitle::Ddc,
            schema: String::new(),
        }
    }
}

impl Config {
    /// Load `path`, using defaults if the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("{} not found, using default settings", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };
        let config = Self::from_toml_str(&content)?;
        info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn extraction_flags(&self) -> ExtractionFlags {
        let e = &self.extraction;
        ExtractionFlags {
            bullets: e.bullets,
            enemies: e.enemies,
            items: e.items,
            lasers: e.lasers,
            screenshots: e.screenshots,
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        let s = &self.sequence;
        PollPolicy {
            interval: Duration::from_micros(s.poll_interval_us),
            timeout: (s.frame_timeout_ms > 0).then(|| Duration::from_millis(s.frame_timeout_ms)),
            need_active: s.need_active,
        }
    }

    pub fn capture_mode(&self) -> CaptureMode {
        CaptureMode::from_duration(&self.sequence.duration)
    }

    pub fn capture_options(&self) -> CaptureOptions {
        let s = &self.sequence;
        CaptureOptions {
            mode: self.capture_mode(),
            exact: s.exact,
            only_game_world: self.single.only_game_world,
            poll: self.poll_policy(),
            auto_unpause: s.auto_unpause,
            auto_repause: s.auto_repause,
            auto_focus: s.auto_focus,
        }
    }

    pub fn schema_path(&self) -> Option<PathBuf> {
        let path = self.target.schema.trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    /// The override schema if one is configured, else the built-in table for
    /// the configured title.
    pub fn schema(&self) -> Result<GameSchema> {
        match self.schema_path() {
            Some(path) => {
                let schema = GameSchema::load(&path)?;
                if schema.title != self.target.title {
                    warn!(
                        "Schema {} is for {}, overriding configured title {}",
                        path.display(),
                        schema.title,
                        self.target.title
                    );
                }
                Ok(schema)
            }
            None => Ok(GameSchema::builtin(self.target.title)),
        }
    }
}
