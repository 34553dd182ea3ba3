use tracing::error;

use crate::error::Result;
use crate::memory::ProcessControl;

/// Keeps the target suspended for as long as it lives.
///
/// [`SuspendGuard::release`] resumes and reports the result; dropping an
/// unreleased guard (early return, panic) resumes and only logs a failure.
pub struct SuspendGuard<'a, P: ProcessControl + ?Sized> {
    process: &'a P,
    suspended: bool,
}

impl<'a, P: ProcessControl + ?Sized> SuspendGuard<'a, P> {
    pub fn new(process: &'a P) -> Result<Self> {
        process.suspend()?;
        Ok(Self {
            process,
            suspended: true,
        })
    }

    pub fn release(mut self) -> Result<()> {
        self.suspended = false;
        self.process.resume()
    }
}

impl<P: ProcessControl + ?Sized> Drop for SuspendGuard<'_, P> {
    fn drop(&mut self) {
        if self.suspended
            && let Err(e) = self.process.resume()
        {
            error!("Failed to resume the game process: {}", e);
        }
    }
}
