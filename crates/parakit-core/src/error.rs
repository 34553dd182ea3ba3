use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Unsupported integer width: {0} bytes")]
    InvalidReadSize(usize),

    #[error("Process control failed: {0}")]
    ProcessControl(String),

    #[error("Game world not loaded (game mode {mode})")]
    NotInGameWorld { mode: i32 },

    #[error("Window operation failed: {0}")]
    Window(String),

    #[error("Unknown laser type {0}")]
    UnknownLaserType(i32),

    #[error("Implausible curve laser node count {0}")]
    CurveNodeCount(i32),

    #[error("Unknown game title: {0}")]
    UnknownTitle(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Analyzer error: {0}")]
    Analyzer(String),

    #[error("Not supported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error came from reading target memory
    pub fn is_memory_read(&self) -> bool {
        matches!(self, Error::MemoryReadFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_error_message() {
        let err = Error::MemoryReadFailed {
            address: 0x4B_0000,
            message: "unmapped".to_string(),
        };
        assert!(err.is_memory_read());
        assert_eq!(
            err.to_string(),
            "Failed to read process memory at address 0x4b0000: unmapped"
        );
    }
}
