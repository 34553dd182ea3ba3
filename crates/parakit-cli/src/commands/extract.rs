//! Snapshot extraction command.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use parakit_core::{
    AnalyzerContext, AnalyzerRegistry, CaptureMode, CaptureScheduler, Config, GameSchema,
    GameWindow, MemoryReader, ProcessHandle, SnapshotBuilder, UntrackedValues, read_untracked,
};
use tracing::{debug, info, warn};

use crate::input;
use crate::shutdown::ShutdownSignal;

/// How often to look for the game while waiting for it to start
const PROCESS_RETRY_INTERVAL: Duration = Duration::from_secs(2);

/// Run one extraction with fully resolved settings
pub fn run(config: &Config, schema: &GameSchema, output_dir: &Path, wait: bool) -> Result<()> {
    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.trigger();
    })?;

    let options = config.capture_options();
    if let CaptureMode::Sequence(frames) = options.mode {
        println!(
            "Extracting {} frames (press Esc or q to stop early)",
            frames
        );
        let _keyboard_handle = input::spawn_keyboard_monitor(Arc::clone(&shutdown));
    }

    let Some(process) = open_process(schema, &shutdown, wait)? else {
        return Ok(());
    };
    info!(
        "Found {} (PID: {}, base: {:#x})",
        process.exe_name, process.pid, process.base_address
    );

    let reader = MemoryReader::new(&process);
    let window = match GameWindow::find(process.pid) {
        Ok(window) => Some(window),
        Err(e) => {
            warn!("Game window unavailable: {}", e);
            None
        }
    };

    let flags = config.extraction_flags();
    let mut snapshots = SnapshotBuilder::new(&reader, schema, flags);
    if flags.screenshots {
        match &window {
            Some(window) => snapshots = snapshots.with_screen_capture(window),
            None => warn!("Screenshots requested but no game window was found"),
        }
    }

    let registry = AnalyzerRegistry::with_builtins();
    let ctx = AnalyzerContext::new(schema.title, output_dir);
    let mut analyzer = registry
        .create(&config.extraction.analyzer, &ctx)
        .with_context(|| format!("creating analyzer '{}'", config.extraction.analyzer))?;

    let single = options.mode == CaptureMode::SingleShot;
    let mut scheduler =
        CaptureScheduler::new(snapshots, &process, options, shutdown.as_atomic());
    if let Some(window) = &window {
        scheduler = scheduler.with_window(window);
    }

    let report = scheduler.run(analyzer.as_mut())?;
    debug!("Capture report: {:?}", report);

    if single && config.single.show_untracked {
        match read_untracked(&reader, schema) {
            Ok(values) => print_untracked(&values),
            Err(e) => warn!("Failed to read untracked values: {}", e),
        }
    }

    if !report.is_complete() {
        bail!(
            "extraction ended after {}/{} frames: {}",
            report.captured,
            report.requested,
            report
                .termination
                .map(|t| t.to_string())
                .unwrap_or_else(|| "incomplete".to_string())
        );
    }
    Ok(())
}

/// Open the game, optionally retrying until it starts or shutdown is requested.
fn open_process(
    schema: &GameSchema,
    shutdown: &ShutdownSignal,
    wait: bool,
) -> Result<Option<ProcessHandle>> {
    let exe_name = schema.title.exe_name();
    if !wait {
        return Ok(Some(ProcessHandle::find_and_open(exe_name)?));
    }

    println!("Waiting for {}... (Ctrl+C to quit)", exe_name);
    while !shutdown.is_shutdown() {
        match ProcessHandle::find_and_open(exe_name) {
            Ok(process) => return Ok(Some(process)),
            Err(e) => debug!("{}", e),
        }
        if shutdown.wait(PROCESS_RETRY_INTERVAL) {
            break;
        }
    }
    Ok(None)
}

fn print_untracked(values: &UntrackedValues) {
    println!();
    println!("{}", "Untracked values".bold());
    let rows: [(&str, String); 9] = [
        ("RNG seed", values.rng_seed.to_string()),
        ("Game speed", format!("{:.2}", values.game_speed)),
        ("Visual RNG", values.visual_rng.to_string()),
        ("Replay file", display_or_none(&values.replay_filename)),
        ("Character", values.character.to_string()),
        ("Subshot", values.subshot.to_string()),
        ("Difficulty", values.difficulty.to_string()),
        ("Rank", values.rank.to_string()),
        ("Stage", values.stage.to_string()),
    ];
    for (label, value) in rows {
        println!("  {:<12} {}", label.cyan(), value);
    }
}

fn display_or_none(text: &str) -> String {
    if text.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        text.to_string()
    }
}
