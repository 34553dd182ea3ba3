//! In-memory stand-ins for a live target, used by unit and integration tests.
//!
//! `MockMemoryReader` serves reads from a sparse byte map, so any address
//! that was never written fails exactly like an unmapped page would.
//! `MockProcess` records suspend/resume and window calls.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::memory::{ProcessControl, ReadMemory};
use crate::window::WindowControl;

/// Builder for [`MockMemoryReader`].
#[derive(Debug, Default)]
pub struct MockMemoryBuilder {
    base_address: u64,
    memory: HashMap<u64, u8>,
    frame_clock: Option<u64>,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_address(mut self, base: u64) -> Self {
        self.base_address = base;
        self
    }

    pub fn write_bytes(mut self, address: u64, bytes: &[u8]) -> Self {
        for (i, byte) in bytes.iter().enumerate() {
            self.memory.insert(address + i as u64, *byte);
        }
        self
    }

    pub fn write_i32(self, address: u64, value: i32) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_u32(self, address: u64, value: u32) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_u16(self, address: u64, value: u16) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_f32(self, address: u64, value: f32) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_pair(self, address: u64, value: (f32, f32)) -> Self {
        self.write_f32(address, value.0).write_f32(address + 4, value.1)
    }

    /// Store a 32-bit pointer.
    pub fn write_ptr(self, address: u64, target: u64) -> Self {
        self.write_u32(address, target as u32)
    }

    /// Fill `len` bytes with zeroes so the region reads successfully.
    pub fn zeroed(self, address: u64, len: usize) -> Self {
        self.write_bytes(address, &vec![0u8; len])
    }

    /// Make the i32 at `address` advance by one after every read of it,
    /// imitating a game frame counter that ticks between polls.
    pub fn frame_clock(mut self, address: u64) -> Self {
        self.frame_clock = Some(address);
        self
    }

    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            base_address: self.base_address,
            memory: Mutex::new(self.memory),
            frame_clock: self.frame_clock,
            reads: Mutex::new(Vec::new()),
        }
    }
}

/// Sparse, mutable fake of a target address space.
#[derive(Debug)]
pub struct MockMemoryReader {
    base_address: u64,
    memory: Mutex<HashMap<u64, u8>>,
    frame_clock: Option<u64>,
    reads: Mutex<Vec<(u64, usize)>>,
}

impl MockMemoryReader {
    /// Overwrite an i32 after construction.
    pub fn set_i32(&self, address: u64, value: i32) {
        let mut memory = self.memory.lock().unwrap();
        for (i, byte) in value.to_le_bytes().iter().enumerate() {
            memory.insert(address + i as u64, *byte);
        }
    }

    /// Forget every byte in `[address, address + len)`.
    pub fn unmap(&self, address: u64, len: usize) {
        let mut memory = self.memory.lock().unwrap();
        for offset in 0..len as u64 {
            memory.remove(&(address + offset));
        }
    }

    /// Every `(address, size)` read so far, in order.
    pub fn reads(&self) -> Vec<(u64, usize)> {
        self.reads.lock().unwrap().clone()
    }

    /// Whether any read touched `[address, address + len)`.
    pub fn was_read(&self, address: u64, len: usize) -> bool {
        self.reads
            .lock()
            .unwrap()
            .iter()
            .any(|&(start, size)| start < address + len as u64 && address < start + size as u64)
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.reads.lock().unwrap().push((address, size));

        let bytes = {
            let memory = self.memory.lock().unwrap();
            (0..size as u64)
                .map(|offset| {
                    memory
                        .get(&(address + offset))
                        .copied()
                        .ok_or_else(|| Error::MemoryReadFailed {
                            address: address + offset,
                            message: "unmapped address in mock memory".to_string(),
                        })
                })
                .collect::<Result<Vec<u8>>>()?
        };

        if self.frame_clock == Some(address) && size == 4 {
            let current = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            self.set_i32(address, current.wrapping_add(1));
        }

        Ok(bytes)
    }

    fn base_address(&self) -> u64 {
        self.base_address
    }
}

/// A call observed by [`MockProcess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessEvent {
    Suspend,
    Resume,
    Focus,
    PauseKey,
}

/// Fake target process that records control calls.
#[derive(Debug, Default)]
pub struct MockProcess {
    events: Mutex<Vec<ProcessEvent>>,
    exited: AtomicBool,
    suspend_depth: AtomicI32,
    running_checks_left: Mutex<Option<usize>>,
    fail_suspend_at: Option<usize>,
    suspends: AtomicUsize,
}

impl MockProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the process as exited after `checks` calls to `is_running`.
    pub fn exits_after(self, checks: usize) -> Self {
        *self.running_checks_left.lock().unwrap() = Some(checks);
        self
    }

    /// Make the `n`-th suspend call (0-based) fail.
    pub fn fail_suspend_at(mut self, n: usize) -> Self {
        self.fail_suspend_at = Some(n);
        self
    }

    pub fn exit(&self) {
        self.exited.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ProcessEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: ProcessEvent) -> usize {
        self.events().iter().filter(|e| **e == event).count()
    }

    /// Suspensions not yet matched by a resume.
    pub fn outstanding_suspensions(&self) -> i32 {
        self.suspend_depth.load(Ordering::SeqCst)
    }
}

impl ProcessControl for MockProcess {
    fn suspend(&self) -> Result<()> {
        let n = self.suspends.fetch_add(1, Ordering::SeqCst);
        if self.fail_suspend_at == Some(n) {
            return Err(Error::ProcessControl("mock suspend failure".to_string()));
        }
        self.events.lock().unwrap().push(ProcessEvent::Suspend);
        self.suspend_depth.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn resume(&self) -> Result<()> {
        self.events.lock().unwrap().push(ProcessEvent::Resume);
        self.suspend_depth.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_running(&self) -> bool {
        if self.exited.load(Ordering::SeqCst) {
            return false;
        }
        let mut left = self.running_checks_left.lock().unwrap();
        match left.as_mut() {
            Some(0) => {
                self.exited.store(true, Ordering::SeqCst);
                false
            }
            Some(n) => {
                *n -= 1;
                true
            }
            None => true,
        }
    }
}

impl WindowControl for MockProcess {
    fn focus(&self) -> Result<()> {
        self.events.lock().unwrap().push(ProcessEvent::Focus);
        Ok(())
    }

    fn tap_pause_key(&self) -> Result<()> {
        self.events.lock().unwrap().push(ProcessEvent::PauseKey);
        Ok(())
    }
}
