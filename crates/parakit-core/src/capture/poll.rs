use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::memory::layout::timing::DEFAULT_POLL_INTERVAL_US;
use crate::memory::{ProcessControl, ReadMemory};
use crate::schema::GameSchema;

/// Why a sequence ended before its last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    #[strum(to_string = "Game process exited")]
    ProcessExited,
    #[strum(to_string = "Game stopped responding")]
    Unresponsive,
    #[strum(to_string = "Game world left")]
    GameWorldLeft,
    #[strum(to_string = "Capture stopped")]
    Stopped,
}

/// How to wait for the next game frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between polls; zero spins
    pub interval: Duration,
    /// Give up after this long without a new frame
    pub timeout: Option<Duration>,
    /// End the wait if the game world is left
    pub need_active: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_micros(DEFAULT_POLL_INTERVAL_US),
            timeout: None,
            need_active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The frame counter moved to this value
    Advanced(i32),
    Terminated(Termination),
}

/// Busy-waits on the in-stage frame counter.
pub struct FramePoller<'a, R: ReadMemory + ?Sized, P: ProcessControl + ?Sized> {
    reader: &'a R,
    process: &'a P,
    counter: u64,
    game_mode: u64,
    game_world_mode: i32,
    policy: PollPolicy,
    stop: &'a AtomicBool,
}

impl<'a, R: ReadMemory + ?Sized, P: ProcessControl + ?Sized> FramePoller<'a, R, P> {
    pub fn new(
        reader: &'a R,
        process: &'a P,
        schema: &GameSchema,
        policy: PollPolicy,
        stop: &'a AtomicBool,
    ) -> Self {
        Self {
            reader,
            process,
            counter: schema.globals.time_in_stage,
            game_mode: schema.globals.game_mode,
            game_world_mode: schema.game_world_mode,
            policy,
            stop,
        }
    }

    /// Wait until the frame counter differs from `observed`.
    pub fn wait_for_change(&self, observed: i32) -> WaitOutcome {
        let started = Instant::now();

        loop {
            if self.stop.load(Ordering::SeqCst) {
                return WaitOutcome::Terminated(Termination::Stopped);
            }
            if !self.process.is_running() {
                return WaitOutcome::Terminated(Termination::ProcessExited);
            }

            match self.reader.read_int(self.counter, 4, true) {
                Ok(frame) if frame as i32 != observed => return WaitOutcome::Advanced(frame as i32),
                Ok(_) => {}
                Err(_) => return WaitOutcome::Terminated(Termination::Unresponsive),
            }

            if self.policy.need_active {
                match self.reader.read_int(self.game_mode, 4, true) {
                    Ok(mode) if mode as i32 != self.game_world_mode => {
                        return WaitOutcome::Terminated(Termination::GameWorldLeft);
                    }
                    Ok(_) => {}
                    Err(_) => return WaitOutcome::Terminated(Termination::Unresponsive),
                }
            }

            if let Some(timeout) = self.policy.timeout
                && started.elapsed() >= timeout
            {
                return WaitOutcome::Terminated(Termination::Unresponsive);
            }

            if self.policy.interval.is_zero() {
                std::hint::spin_loop();
            } else {
                std::thread::sleep(self.policy.interval);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixture::{self, World};
    use crate::memory::MockProcess;
    use crate::schema::GameTitle;

    fn policy(need_active: bool, timeout_ms: Option<u64>) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(1),
            timeout: timeout_ms.map(Duration::from_millis),
            need_active,
        }
    }

    #[test]
    fn test_advances_when_counter_ticks() {
        let World { schema, builder } = fixture::world(GameTitle::Ddc);
        let counter = fixture::BASE + schema.globals.time_in_stage;
        let reader = builder.frame_clock(counter).build();
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);

        let poller = FramePoller::new(&reader, &process, &schema, PollPolicy::default(), &stop);
        // First read returns 100 and ticks the clock; the poll sees 101
        assert_eq!(reader.read_i32(counter).unwrap(), 100);
        assert_eq!(poller.wait_for_change(100), WaitOutcome::Advanced(101));
    }

    #[test]
    fn test_timeout_on_frozen_counter() {
        let World { schema, builder } = fixture::world(GameTitle::Ddc);
        let reader = builder.build();
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);

        let poller = FramePoller::new(&reader, &process, &schema, policy(false, Some(20)), &stop);
        assert_eq!(
            poller.wait_for_change(100),
            WaitOutcome::Terminated(Termination::Unresponsive)
        );
    }

    #[test]
    fn test_game_world_left() {
        let World { schema, builder } = fixture::world(GameTitle::Ddc);
        let reader = builder.build();
        reader.set_i32(fixture::BASE + schema.globals.game_mode, 4);
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);

        let poller = FramePoller::new(&reader, &process, &schema, policy(true, None), &stop);
        assert_eq!(
            poller.wait_for_change(100),
            WaitOutcome::Terminated(Termination::GameWorldLeft)
        );

        // Ignored unless required; the timeout ends the wait instead
        let poller = FramePoller::new(&reader, &process, &schema, policy(false, Some(10)), &stop);
        assert_eq!(
            poller.wait_for_change(100),
            WaitOutcome::Terminated(Termination::Unresponsive)
        );
    }

    #[test]
    fn test_exit_and_stop() {
        let World { schema, builder } = fixture::world(GameTitle::Ddc);
        let reader = builder.build();
        let stop = AtomicBool::new(false);

        let process = MockProcess::new();
        process.exit();
        let poller = FramePoller::new(&reader, &process, &schema, policy(true, None), &stop);
        assert_eq!(
            poller.wait_for_change(100),
            WaitOutcome::Terminated(Termination::ProcessExited)
        );

        let process = MockProcess::new();
        stop.store(true, Ordering::SeqCst);
        let poller = FramePoller::new(&reader, &process, &schema, policy(true, None), &stop);
        assert_eq!(
            poller.wait_for_change(100),
            WaitOutcome::Terminated(Termination::Stopped)
        );
    }

    #[test]
    fn test_unreadable_counter_is_unresponsive() {
        let World { schema, builder } = fixture::world(GameTitle::Ddc);
        let reader = builder.build();
        reader.unmap(fixture::BASE + schema.globals.time_in_stage, 4);
        let process = MockProcess::new();
        let stop = AtomicBool::new(false);

        let poller = FramePoller::new(&reader, &process, &schema, policy(false, None), &stop);
        assert_eq!(
            poller.wait_for_change(100),
            WaitOutcome::Terminated(Termination::Unresponsive)
        );
    }

    #[test]
    fn test_termination_messages() {
        assert_eq!(Termination::ProcessExited.to_string(), "Game process exited");
        assert_eq!(Termination::GameWorldLeft.to_string(), "Game world left");
    }
}
