use crate::error::{Error, Result};

/// Coarse control over the whole target process.
///
/// Suspension is process-wide: every thread of the target stops until the
/// matching [`ProcessControl::resume`]. Callers pair the two through
/// [`crate::capture::SuspendGuard`].
pub trait ProcessControl {
    fn suspend(&self) -> Result<()>;
    fn resume(&self) -> Result<()>;
    fn is_running(&self) -> bool;
}

/// An opened handle to the running game.
pub struct ProcessHandle {
    pub pid: u32,
    pub base_address: u64,
    pub exe_name: String,
    #[cfg(target_os = "windows")]
    handle: windows::Win32::Foundation::HANDLE,
}

#[cfg(target_os = "windows")]
impl ProcessHandle {
    /// Find a process by executable name (case-insensitive) and open it for
    /// reading, querying and suspension.
    pub fn find_and_open(exe_name: &str) -> Result<Self> {
        use windows::Win32::System::Threading::{
            OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_SUSPEND_RESUME, PROCESS_VM_READ,
        };

        let pid = win::find_pid(exe_name)?
            .ok_or_else(|| Error::ProcessNotFound(exe_name.to_string()))?;

        // SAFETY: OpenProcess has no memory-safety preconditions; the returned
        // handle is owned by ProcessHandle and closed on drop.
        let handle = unsafe {
            OpenProcess(
                PROCESS_VM_READ | PROCESS_QUERY_INFORMATION | PROCESS_SUSPEND_RESUME,
                false,
                pid,
            )
        }
        .map_err(|e| Error::ProcessOpenFailed(format!("pid {}: {}", pid, e)))?;

        let base_address = match win::module_base(pid) {
            Ok(base) => base,
            Err(e) => {
                // SAFETY: handle was just opened above and is not shared.
                unsafe {
                    let _ = windows::Win32::Foundation::CloseHandle(handle);
                }
                return Err(e);
            }
        };

        Ok(Self {
            pid,
            base_address,
            exe_name: exe_name.to_string(),
            handle,
        })
    }

    /// Fill `buffer` from target memory starting at `address`.
    pub fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<()> {
        use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;

        let mut bytes_read = 0usize;
        // SAFETY: buffer is a valid writable slice of buffer.len() bytes and
        // the handle stays open for the lifetime of self.
        unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const std::ffi::c_void,
                buffer.as_mut_ptr().cast(),
                buffer.len(),
                Some(&mut bytes_read),
            )
        }
        .map_err(|e| Error::MemoryReadFailed {
            address,
            message: e.to_string(),
        })?;

        if bytes_read != buffer.len() {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("partial read: {} of {} bytes", bytes_read, buffer.len()),
            });
        }
        Ok(())
    }
}

#[cfg(target_os = "windows")]
impl ProcessControl for ProcessHandle {
    fn suspend(&self) -> Result<()> {
        use windows::Win32::System::Threading::{ResumeThread, SuspendThread};

        let threads = win::thread_ids(self.pid)?;
        let mut suspended = Vec::new();
        let outcome = run_thread_pass(&threads, ThreadPass::StopAtFirstError, |tid| {
            win::with_thread(tid, |thread| {
                // SAFETY: thread is a valid handle opened with THREAD_SUSPEND_RESUME.
                if unsafe { SuspendThread(thread) } == u32::MAX {
                    return Err(Error::ProcessControl(format!(
                        "SuspendThread failed for thread {}",
                        tid
                    )));
                }
                suspended.push(tid);
                Ok(())
            })
        });

        if let Err(e) = outcome {
            tracing::warn!(
                "Suspend of pid {} failed after {} threads, rolling back",
                self.pid,
                suspended.len()
            );
            let _ = run_thread_pass(&suspended, ThreadPass::VisitAll, |tid| {
                win::with_thread(tid, |thread| {
                    // SAFETY: see above.
                    unsafe { ResumeThread(thread) };
                    Ok(())
                })
            });
            return Err(e);
        }
        Ok(())
    }

    fn resume(&self) -> Result<()> {
        use windows::Win32::System::Threading::ResumeThread;

        let threads = win::thread_ids(self.pid)?;
        run_thread_pass(&threads, ThreadPass::VisitAll, |tid| {
            win::with_thread(tid, |thread| {
                // SAFETY: thread is a valid handle opened with THREAD_SUSPEND_RESUME.
                if unsafe { ResumeThread(thread) } == u32::MAX {
                    return Err(Error::ProcessControl(format!(
                        "ResumeThread failed for thread {}",
                        tid
                    )));
                }
                Ok(())
            })
        })
    }

    fn is_running(&self) -> bool {
        use windows::Win32::Foundation::STILL_ACTIVE;
        use windows::Win32::System::Threading::GetExitCodeProcess;

        let mut code = 0u32;
        // SAFETY: handle is open and code is a valid out pointer.
        match unsafe { GetExitCodeProcess(self.handle, &mut code) } {
            Ok(()) => code == STILL_ACTIVE.0 as u32,
            Err(_) => false,
        }
    }
}

#[cfg(target_os = "windows")]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // SAFETY: the handle is owned by self and closed exactly once.
        unsafe {
            let _ = windows::Win32::Foundation::CloseHandle(self.handle);
        }
    }
}

/// How a per-thread pass treats a failing thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
enum ThreadPass {
    /// Abort on the first failure (suspend, which rolls back)
    StopAtFirstError,
    /// Visit every thread and report the first failure afterwards (resume)
    VisitAll,
}

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn run_thread_pass<F>(threads: &[u32], pass: ThreadPass, mut f: F) -> Result<()>
where
    F: FnMut(u32) -> Result<()>,
{
    let mut first_error = None;
    for &tid in threads {
        if let Err(e) = f(tid) {
            if pass == ThreadPass::StopAtFirstError {
                return Err(e);
            }
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

#[cfg(target_os = "windows")]
mod win {
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, PROCESSENTRY32W,
        Process32FirstW, Process32NextW, TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32,
        TH32CS_SNAPPROCESS, TH32CS_SNAPTHREAD, THREADENTRY32, Thread32First, Thread32Next,
    };
    use windows::Win32::System::Threading::{OpenThread, THREAD_SUSPEND_RESUME};

    use crate::error::{Error, Result};

    fn wide_to_string(wide: &[u16]) -> String {
        let end = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
        String::from_utf16_lossy(&wide[..end])
    }

    pub(super) fn find_pid(exe_name: &str) -> Result<Option<u32>> {
        // SAFETY: snapshot handle is closed before returning.
        unsafe {
            let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0)
                .map_err(|e| Error::ProcessOpenFailed(e.to_string()))?;

            let mut entry = PROCESSENTRY32W {
                dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
                ..Default::default()
            };

            let mut found = None;
            if Process32FirstW(snapshot, &mut entry).is_ok() {
                loop {
                    if wide_to_string(&entry.szExeFile).eq_ignore_ascii_case(exe_name) {
                        found = Some(entry.th32ProcessID);
                        break;
                    }
                    if Process32NextW(snapshot, &mut entry).is_err() {
                        break;
                    }
                }
            }

            let _ = CloseHandle(snapshot);
            Ok(found)
        }
    }

    pub(super) fn module_base(pid: u32) -> Result<u64> {
        // SAFETY: snapshot handle is closed before returning.
        unsafe {
            let snapshot =
                CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid)
                    .map_err(|e| Error::ProcessOpenFailed(e.to_string()))?;

            let mut entry = MODULEENTRY32W {
                dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
                ..Default::default()
            };

            let result = Module32FirstW(snapshot, &mut entry)
                .map(|_| entry.modBaseAddr as u64)
                .map_err(|e| Error::ProcessOpenFailed(format!("module query: {}", e)));

            let _ = CloseHandle(snapshot);
            result
        }
    }

    /// IDs of every thread owned by `pid` at the time of the call.
    pub(super) fn thread_ids(pid: u32) -> Result<Vec<u32>> {
        // SAFETY: snapshot handle is closed before returning.
        unsafe {
            let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0)
                .map_err(|e| Error::ProcessControl(e.to_string()))?;

            let mut entry = THREADENTRY32 {
                dwSize: std::mem::size_of::<THREADENTRY32>() as u32,
                ..Default::default()
            };

            let mut ids = Vec::new();
            if Thread32First(snapshot, &mut entry).is_ok() {
                loop {
                    if entry.th32OwnerProcessID == pid {
                        ids.push(entry.th32ThreadID);
                    }
                    if Thread32Next(snapshot, &mut entry).is_err() {
                        break;
                    }
                }
            }

            let _ = CloseHandle(snapshot);
            Ok(ids)
        }
    }

    /// Open thread `tid` for suspension and pass it to `f`.
    ///
    /// A thread that can no longer be opened has exited since the snapshot
    /// and is skipped.
    pub(super) fn with_thread<F>(tid: u32, f: F) -> Result<()>
    where
        F: FnOnce(HANDLE) -> Result<()>,
    {
        // SAFETY: the handle opened here is closed before returning.
        unsafe {
            match OpenThread(THREAD_SUSPEND_RESUME, false, tid) {
                Ok(thread) => {
                    let outcome = f(thread);
                    let _ = CloseHandle(thread);
                    outcome
                }
                Err(e) => {
                    tracing::debug!("Skipping thread {}: {}", tid, e);
                    Ok(())
                }
            }
        }
    }
}

// --- Non-Windows stubs ---

#[cfg(not(target_os = "windows"))]
impl ProcessHandle {
    pub fn find_and_open(_exe_name: &str) -> Result<Self> {
        Err(Error::Unsupported("process memory access"))
    }

    pub fn read_into(&self, _address: u64, _buffer: &mut [u8]) -> Result<()> {
        Err(Error::Unsupported("process memory access"))
    }
}

#[cfg(not(target_os = "windows"))]
impl ProcessControl for ProcessHandle {
    fn suspend(&self) -> Result<()> {
        Err(Error::Unsupported("process suspension"))
    }

    fn resume(&self) -> Result<()> {
        Err(Error::Unsupported("process suspension"))
    }

    fn is_running(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_on(bad: u32) -> impl FnMut(u32) -> Result<()> {
        move |tid| {
            if tid == bad {
                Err(Error::ProcessControl(format!("thread {}", tid)))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_visit_all_continues_past_failures() {
        let mut visited = Vec::new();
        let mut fail = failing_on(2);
        let result = run_thread_pass(&[1, 2, 3, 4], ThreadPass::VisitAll, |tid| {
            visited.push(tid);
            fail(tid)
        });

        assert_eq!(visited, vec![1, 2, 3, 4]);
        match result {
            Err(Error::ProcessControl(message)) => assert_eq!(message, "thread 2"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_visit_all_reports_first_failure() {
        let result = run_thread_pass(&[5, 6, 7], ThreadPass::VisitAll, |tid| {
            if tid >= 6 {
                Err(Error::ProcessControl(format!("thread {}", tid)))
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(Error::ProcessControl(m)) if m == "thread 6"));
    }

    #[test]
    fn test_stop_at_first_error() {
        let mut visited = Vec::new();
        let mut fail = failing_on(2);
        let result = run_thread_pass(&[1, 2, 3], ThreadPass::StopAtFirstError, |tid| {
            visited.push(tid);
            fail(tid)
        });

        assert!(result.is_err());
        assert_eq!(visited, vec![1, 2]);
    }

    #[test]
    fn test_empty_pass_succeeds() {
        assert!(run_thread_pass(&[], ThreadPass::VisitAll, failing_on(0)).is_ok());
    }
}
