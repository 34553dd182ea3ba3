//! Memory layout constants shared by every supported title
//!
//! Title-specific addresses and record offsets live in [`crate::schema`];
//! this module only holds the values that do not change between games.

/// Layout of the generic manager list node ("zList")
///
/// ```text
/// Offset   Field   Size   Description
/// ─────────────────────────────────────────────
/// 0x00     entry   4      Pointer to the owning record
/// 0x04     next    4      Pointer to the next node, 0 at the end
/// 0x08     prev    4      (unused)
/// ```
pub mod list {
    /// Pointer size of the 32-bit targets
    pub const POINTER: u64 = 4;

    pub const ENTRY: u64 = 0;
    pub const NEXT: u64 = POINTER;

    /// Upper bound on nodes visited per walk; stops corrupt or cyclic chains
    pub const DEFAULT_MAX_STEPS: usize = 4096;
}

/// Limits applied while decoding records
pub mod limits {
    /// Largest curve laser node count accepted as plausible
    pub const MAX_CURVE_NODES: i32 = 4096;

    /// Bytes read for the last replay file name
    pub const REPLAY_NAME_LEN: usize = 100;
}

/// Timing constants for frame synchronization
pub mod timing {
    /// Nominal game tick rate
    pub const FRAMES_PER_SECOND: u32 = 60;

    /// Default sleep between frame counter polls (0 = spin)
    pub const DEFAULT_POLL_INTERVAL_US: u64 = 0;

    /// Delay between a synthetic key press and its release (ms)
    pub const KEY_TAP_HOLD_MS: u64 = 50;
}
