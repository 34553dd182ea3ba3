use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{CaptureMode, FramePoller, PollPolicy, SuspendGuard, Termination, WaitOutcome};
use crate::analysis::Analyzer;
use crate::error::{Error, Result};
use crate::extract::SnapshotBuilder;
use crate::memory::{ProcessControl, ReadMemory};
use crate::window::WindowControl;

/// Run settings of a [`CaptureScheduler`].
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub mode: CaptureMode,
    /// Suspend the target while each snapshot is read
    pub exact: bool,
    /// Refuse to start unless the game world is loaded
    pub only_game_world: bool,
    pub poll: PollPolicy,
    pub auto_unpause: bool,
    pub auto_repause: bool,
    pub auto_focus: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            mode: CaptureMode::SingleShot,
            exact: false,
            only_game_world: true,
            poll: PollPolicy::default(),
            auto_unpause: false,
            auto_repause: false,
            auto_focus: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    SingleShot,
    SequenceRunning { frame: u32 },
    /// Reading a sequence frame with the target suspended
    Suspended { frame: u32 },
    Terminated,
}

/// Outcome of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReport {
    pub requested: u32,
    pub captured: u32,
    /// `None` when every requested frame was captured
    pub termination: Option<Termination>,
    pub elapsed: Duration,
}

impl CaptureReport {
    pub fn is_complete(&self) -> bool {
        self.termination.is_none() && self.captured == self.requested
    }
}

/// Drives snapshot extraction and delivers snapshots to an [`Analyzer`].
pub struct CaptureScheduler<'a, R: ReadMemory + ?Sized, P: ProcessControl + ?Sized> {
    snapshots: SnapshotBuilder<'a, R>,
    process: &'a P,
    window: Option<&'a dyn WindowControl>,
    options: CaptureOptions,
    stop: &'a AtomicBool,
    state: CaptureState,
}

impl<'a, R: ReadMemory + ?Sized, P: ProcessControl + ?Sized> CaptureScheduler<'a, R, P> {
    pub fn new(
        snapshots: SnapshotBuilder<'a, R>,
        process: &'a P,
        options: CaptureOptions,
        stop: &'a AtomicBool,
    ) -> Self {
        Self {
            snapshots,
            process,
            window: None,
            options,
            stop,
            state: CaptureState::Idle,
        }
    }

    /// Window used for focus and pause-key handling.
    pub fn with_window(mut self, window: &'a dyn WindowControl) -> Self {
        self.window = Some(window);
        self
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    fn transition(&mut self, next: CaptureState) {
        debug!("Capture state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Capture according to the options.
    ///
    /// `analyzer.done()` is called exactly once before returning, whether the
    /// run completed, terminated early or failed.
    pub fn run(&mut self, analyzer: &mut dyn Analyzer) -> Result<CaptureReport> {
        let outcome = self.capture(analyzer);
        self.transition(CaptureState::Terminated);

        let done = analyzer
            .done()
            .map_err(|e| Error::Analyzer(format!("{:#}", e)));
        let report = outcome?;
        done?;
        Ok(report)
    }

    fn capture(&mut self, analyzer: &mut dyn Analyzer) -> Result<CaptureReport> {
        if self.options.only_game_world {
            let mode = self.snapshots.game_mode()?;
            if mode != self.snapshots.schema().game_world_mode {
                return Err(Error::NotInGameWorld { mode });
            }
        }

        match self.options.mode {
            CaptureMode::SingleShot => self.run_single(analyzer),
            CaptureMode::Sequence(frames) => self.run_sequence(frames, analyzer),
        }
    }

    fn run_single(&mut self, analyzer: &mut dyn Analyzer) -> Result<CaptureReport> {
        let started = Instant::now();
        self.transition(CaptureState::SingleShot);

        if self.snapshots.flags().screenshots {
            self.window_action("focus", |window| window.focus());
        }

        let state = self.snapshots.build(None, None)?;
        deliver(analyzer, state)?;

        Ok(CaptureReport {
            requested: CaptureMode::SingleShot.frames(),
            captured: 1,
            termination: None,
            elapsed: started.elapsed(),
        })
    }

    fn run_sequence(&mut self, frames: u32, analyzer: &mut dyn Analyzer) -> Result<CaptureReport> {
        info!(
            "Extracting {} frames{}",
            frames,
            if self.options.exact { " (exact mode)" } else { "" }
        );

        if self.options.auto_unpause {
            self.window_action("focus", |window| window.focus());
            self.window_action("unpause", |window| window.tap_pause_key());
        } else {
            if self.options.auto_focus {
                self.window_action("focus", |window| window.focus());
            }
            info!("Unpause the game to begin extraction");
        }

        let started = Instant::now();
        let result = self.sequence_loop(frames, analyzer, started);

        if self.options.auto_repause {
            self.window_action("repause", |window| window.tap_pause_key());
        }

        let (captured, termination) = result?;
        let elapsed = started.elapsed();
        match termination {
            Some(reason) => warn!(
                "{}; terminated after {}/{} frames",
                reason, captured, frames
            ),
            None => info!(
                "Finished extraction of {} frames in {:.2} seconds",
                captured,
                elapsed.as_secs_f64()
            ),
        }

        Ok(CaptureReport {
            requested: frames,
            captured,
            termination,
            elapsed,
        })
    }

    fn sequence_loop(
        &mut self,
        frames: u32,
        analyzer: &mut dyn Analyzer,
        started: Instant,
    ) -> Result<(u32, Option<Termination>)> {
        let poller = FramePoller::new(
            self.snapshots.reader(),
            self.process,
            self.snapshots.schema(),
            self.options.poll,
            self.stop,
        );

        let mut captured = 0;
        for frame in 0..frames {
            if self.stop.load(Ordering::SeqCst) {
                return Ok((captured, Some(Termination::Stopped)));
            }

            let observed = match self.snapshots.frame_counter() {
                Ok(observed) => observed,
                Err(e) => {
                    debug!("Frame counter unreadable: {}", e);
                    return Ok((captured, Some(self.classify_failure())));
                }
            };
            self.transition(CaptureState::SequenceRunning { frame });
            debug!(
                "[{}%] Extracting frame #{} (in-stage: #{})",
                progress_percent(frame, frames),
                frame + 1,
                observed
            );

            let real_time = started.elapsed().as_secs_f64();
            let built = if self.options.exact {
                self.transition(CaptureState::Suspended { frame });
                let guard = SuspendGuard::new(self.process)?;
                let built = self.snapshots.build(Some(frame), Some(real_time));
                guard.release()?;
                self.transition(CaptureState::SequenceRunning { frame });
                built
            } else {
                self.snapshots.build(Some(frame), Some(real_time))
            };

            let state = match built {
                Ok(state) => state,
                Err(e) if e.is_memory_read() => {
                    warn!("Snapshot of frame #{} failed: {}", frame + 1, e);
                    return Ok((captured, Some(self.classify_failure())));
                }
                Err(e) => return Err(e),
            };
            deliver(analyzer, state)?;
            captured += 1;

            if frame + 1 == frames {
                break;
            }
            if let WaitOutcome::Terminated(reason) = poller.wait_for_change(observed) {
                return Ok((captured, Some(reason)));
            }
        }

        Ok((captured, None))
    }

    fn classify_failure(&self) -> Termination {
        if self.process.is_running() {
            Termination::Unresponsive
        } else {
            Termination::ProcessExited
        }
    }

    /// Window helpers are best-effort; failures only warn.
    fn window_action(&self, what: &str, action: impl FnOnce(&dyn WindowControl) -> Result<()>) {
        match self.window {
            Some(window) => {
                if let Err(e) = action(window) {
                    warn!("Window {} failed: {}", what, e);
                }
            }
            None => debug!("No game window attached; skipping {}", what),
        }
    }
}

/// Share of a sequence already captured, in whole percent.
fn progress_percent(frame: u32, frames: u32) -> u64 {
    100 * u64::from(frame) / u64::from(frames.max(1))
}

fn deliver(analyzer: &mut dyn Analyzer, state: crate::game::GameState) -> Result<()> {
    analyzer
        .step(state)
        .map_err(|e| Error::Analyzer(format!("{:#}", e)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::extract::fixture::{self, World};
    use crate::extract::ExtractionFlags;
    use crate::game::GameState;
    use crate::memory::{MockMemoryReader, MockProcess, ProcessEvent};
    use crate::schema::{GameSchema, GameTitle};

    /// Records what it was given and optionally raises the stop flag.
    #[derive(Default)]
    struct Recorder {
        frames: Vec<(Option<u32>, i32)>,
        done_calls: u32,
        stop_after: Option<(usize, Arc<AtomicBool>)>,
        fail_step: bool,
    }

    impl Analyzer for Recorder {
        fn step(&mut self, state: GameState) -> anyhow::Result<()> {
            if self.fail_step {
                anyhow::bail!("analyzer rejected snapshot");
            }
            self.frames.push((state.seq_frame_id, state.frame_stage));
            if let Some((after, stop)) = &self.stop_after
                && self.frames.len() == *after
            {
                stop.store(true, Ordering::SeqCst);
            }
            Ok(())
        }

        fn done(&mut self) -> anyhow::Result<()> {
            self.done_calls += 1;
            Ok(())
        }
    }

    /// Unmaps a field once `after` snapshots were delivered, as if the game
    /// tore its state down mid-run.
    struct Tearing<'r> {
        reader: &'r MockMemoryReader,
        address: u64,
        after: usize,
        recorder: Recorder,
    }

    impl Analyzer for Tearing<'_> {
        fn step(&mut self, state: GameState) -> anyhow::Result<()> {
            self.recorder.step(state)?;
            if self.recorder.frames.len() == self.after {
                self.reader.unmap(self.address, 4);
            }
            Ok(())
        }

        fn done(&mut self) -> anyhow::Result<()> {
            self.recorder.done()
        }
    }

    fn ticking_world() -> (GameSchema, MockMemoryReader) {
        let World { schema, builder } = fixture::world(GameTitle::Ddc);
        let counter = fixture::BASE + schema.globals.time_in_stage;
        (schema, builder.frame_clock(counter).build())
    }

    fn options(mode: CaptureMode, exact: bool) -> CaptureOptions {
        CaptureOptions {
            mode,
            exact,
            poll: PollPolicy {
                timeout: Some(Duration::from_secs(2)),
                ..PollPolicy::default()
            },
            ..CaptureOptions::default()
        }
    }

    #[test]
    fn test_progress_percent_on_long_runs() {
        assert_eq!(progress_percent(0, 10), 0);
        assert_eq!(progress_percent(5, 10), 50);
        assert_eq!(progress_percent(u32::MAX - 1, u32::MAX), 99);
        assert_eq!(progress_percent(50_000_000, 100_000_000), 50);
    }

    #[test]
    fn test_single_shot() {
        let (schema, reader) = ticking_world();
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::default());

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            options(CaptureMode::SingleShot, false),
            &stop,
        );
        let mut recorder = Recorder::default();
        let report = scheduler.run(&mut recorder).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.requested, 1);
        assert_eq!(recorder.frames.len(), 1);
        assert_eq!(recorder.frames[0].0, None);
        assert_eq!(recorder.done_calls, 1);
        assert_eq!(scheduler.state(), CaptureState::Terminated);
        assert!(process.events().is_empty());
    }

    #[test]
    fn test_exact_sequence_alternates_suspend_and_resume() {
        let (schema, reader) = ticking_world();
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::default());

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            options(CaptureMode::Sequence(5), true),
            &stop,
        );
        let mut recorder = Recorder::default();
        let report = scheduler.run(&mut recorder).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.captured, 5);
        let ids: Vec<_> = recorder.frames.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, (0..5).map(Some).collect::<Vec<_>>());
        assert!(recorder.frames.windows(2).all(|w| w[1].1 > w[0].1));

        let expected: Vec<_> = (0..5)
            .flat_map(|_| [ProcessEvent::Suspend, ProcessEvent::Resume])
            .collect();
        assert_eq!(process.events(), expected);
        assert_eq!(process.outstanding_suspensions(), 0);
        assert_eq!(recorder.done_calls, 1);
    }

    #[test]
    fn test_non_exact_never_suspends() {
        let (schema, reader) = ticking_world();
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            options(CaptureMode::Sequence(3), false),
            &stop,
        );
        let report = scheduler.run(&mut Recorder::default()).unwrap();
        assert_eq!(report.captured, 3);
        assert_eq!(process.count(ProcessEvent::Suspend), 0);
    }

    #[test]
    fn test_process_exit_ends_sequence_early() {
        let (schema, reader) = ticking_world();
        // Two successful waits, then the process is gone
        let process = MockProcess::new().exits_after(2);
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            options(CaptureMode::Sequence(10), true),
            &stop,
        );
        let mut recorder = Recorder::default();
        let report = scheduler.run(&mut recorder).unwrap();

        assert_eq!(report.captured, 3);
        assert_eq!(report.termination, Some(Termination::ProcessExited));
        assert!(!report.is_complete());
        assert_eq!(process.count(ProcessEvent::Suspend), 3);
        assert_eq!(process.count(ProcessEvent::Resume), 3);
        assert_eq!(process.outstanding_suspensions(), 0);
        assert_eq!(recorder.done_calls, 1);
    }

    #[test]
    fn test_snapshot_failure_mid_sequence_reports_partial_count() {
        let (schema, reader) = ticking_world();
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            options(CaptureMode::Sequence(6), true),
            &stop,
        );
        let mut analyzer = Tearing {
            reader: &reader,
            address: fixture::BASE + schema.globals.lives,
            after: 2,
            recorder: Recorder::default(),
        };
        let report = scheduler.run(&mut analyzer).unwrap();

        assert_eq!(report.captured, 2);
        assert_eq!(report.requested, 6);
        assert_eq!(report.termination, Some(Termination::Unresponsive));
        assert_eq!(
            process.events(),
            vec![
                ProcessEvent::Suspend,
                ProcessEvent::Resume,
                ProcessEvent::Suspend,
                ProcessEvent::Resume,
                ProcessEvent::Suspend,
                ProcessEvent::Resume,
            ]
        );
        assert_eq!(process.outstanding_suspensions(), 0);
        assert_eq!(analyzer.recorder.done_calls, 1);
        assert_eq!(scheduler.state(), CaptureState::Terminated);
    }

    #[test]
    fn test_snapshot_failure_after_exit_is_process_exited() {
        let (schema, reader) = ticking_world();
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);
        reader.unmap(fixture::BASE + schema.globals.lives, 4);
        process.exit();

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            CaptureOptions {
                only_game_world: false,
                ..options(CaptureMode::Sequence(4), false)
            },
            &stop,
        );
        let mut recorder = Recorder::default();
        let report = scheduler.run(&mut recorder).unwrap();

        assert_eq!(report.captured, 0);
        assert_eq!(report.termination, Some(Termination::ProcessExited));
        assert_eq!(recorder.done_calls, 1);
    }

    #[test]
    fn test_stop_flag_from_analyzer() {
        let (schema, reader) = ticking_world();
        let process = MockProcess::new();
        let stop = Arc::new(AtomicBool::new(false));
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            options(CaptureMode::Sequence(10), true),
            &stop,
        );
        let mut recorder = Recorder {
            stop_after: Some((4, Arc::clone(&stop))),
            ..Recorder::default()
        };
        let report = scheduler.run(&mut recorder).unwrap();

        assert_eq!(report.captured, 4);
        assert_eq!(report.termination, Some(Termination::Stopped));
        assert_eq!(process.outstanding_suspensions(), 0);
    }

    #[test]
    fn test_suspend_failure_aborts_run() {
        let (schema, reader) = ticking_world();
        let process = MockProcess::new().fail_suspend_at(2);
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            options(CaptureMode::Sequence(5), true),
            &stop,
        );
        let mut recorder = Recorder::default();
        let result = scheduler.run(&mut recorder);

        assert!(matches!(result, Err(Error::ProcessControl(_))));
        assert_eq!(recorder.frames.len(), 2);
        assert_eq!(recorder.done_calls, 1);
        assert_eq!(process.outstanding_suspensions(), 0);
    }

    #[test]
    fn test_not_in_game_world() {
        let (schema, reader) = ticking_world();
        reader.set_i32(fixture::BASE + schema.globals.game_mode, 1);
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            options(CaptureMode::Sequence(5), false),
            &stop,
        );
        let mut recorder = Recorder::default();
        let result = scheduler.run(&mut recorder);

        assert!(matches!(result, Err(Error::NotInGameWorld { mode: 1 })));
        assert!(recorder.frames.is_empty());
        assert_eq!(recorder.done_calls, 1);
    }

    #[test]
    fn test_game_world_check_can_be_disabled() {
        let (schema, reader) = ticking_world();
        reader.set_i32(fixture::BASE + schema.globals.game_mode, 1);
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            CaptureOptions {
                only_game_world: false,
                ..options(CaptureMode::SingleShot, false)
            },
            &stop,
        );
        assert!(scheduler.run(&mut Recorder::default()).is_ok());
    }

    #[test]
    fn test_leaving_game_world_terminates_when_required() {
        // No frame clock, so the first wait reaches the game mode check
        let World { schema, builder } = fixture::world(GameTitle::Ddc);
        let reader = builder.build();
        reader.set_i32(fixture::BASE + schema.globals.game_mode, 2);
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            CaptureOptions {
                only_game_world: false,
                ..options(CaptureMode::Sequence(3), false)
            },
            &stop,
        );
        let report = scheduler.run(&mut Recorder::default()).unwrap();
        assert_eq!(report.captured, 1);
        assert_eq!(report.termination, Some(Termination::GameWorldLeft));
    }

    #[test]
    fn test_analyzer_error_propagates_after_done() {
        let (schema, reader) = ticking_world();
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            options(CaptureMode::Sequence(3), true),
            &stop,
        );
        let mut recorder = Recorder {
            fail_step: true,
            ..Recorder::default()
        };
        let result = scheduler.run(&mut recorder);
        assert!(matches!(result, Err(Error::Analyzer(_))));
        assert_eq!(recorder.done_calls, 1);
        assert_eq!(process.outstanding_suspensions(), 0);
    }

    #[test]
    fn test_window_automation() {
        let (schema, reader) = ticking_world();
        let process = MockProcess::new();
        let window = MockProcess::new();
        let stop = AtomicBool::new(false);
        let snapshots = SnapshotBuilder::new(&reader, &schema, ExtractionFlags::NONE);

        let mut scheduler = CaptureScheduler::new(
            snapshots,
            &process,
            CaptureOptions {
                auto_unpause: true,
                auto_repause: true,
                ..options(CaptureMode::Sequence(2), false)
            },
            &stop,
        )
        .with_window(&window);
        scheduler.run(&mut Recorder::default()).unwrap();

        assert_eq!(
            window.events(),
            vec![
                ProcessEvent::Focus,
                ProcessEvent::PauseKey,
                ProcessEvent::PauseKey
            ]
        );
    }
}
