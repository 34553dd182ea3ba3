//! Frame-synchronised snapshot capture.
//!
//! A run is either a single snapshot or a sequence of consecutive in-game
//! frames. Sequences wait on the in-stage frame counter between snapshots
//! and, in exact mode, keep the target suspended while each one is read.

mod duration;
mod poll;
mod scheduler;
mod suspend;

pub use duration::{CaptureMode, parse_frame_count};
pub use poll::{FramePoller, PollPolicy, Termination, WaitOutcome};
pub use scheduler::{CaptureOptions, CaptureReport, CaptureScheduler, CaptureState};
pub use suspend::SuspendGuard;
