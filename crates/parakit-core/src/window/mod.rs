//! Game window helpers.
//!
//! Locates the game's top-level window by process ID, brings it to the
//! foreground, taps the pause key and captures the client area. These act on
//! the window only, never on process memory.

mod screenshot;

use crate::error::Result;
use crate::game::Screenshot;

#[cfg(target_os = "windows")]
use crate::error::Error;
#[cfg(target_os = "windows")]
use windows::Win32::Foundation::HWND;

/// Input-side control of the game window.
pub trait WindowControl {
    /// Bring the window to the foreground so it receives input.
    fn focus(&self) -> Result<()>;

    /// Press and release the pause key once.
    fn tap_pause_key(&self) -> Result<()>;
}

/// Source of client-area screenshots.
pub trait ScreenCapture {
    fn capture(&self) -> Result<Screenshot>;
}

/// The main window of a running game.
pub struct GameWindow {
    #[cfg(target_os = "windows")]
    hwnd: HWND,
}

#[cfg(target_os = "windows")]
impl GameWindow {
    /// Find the first visible top-level window owned by `pid`.
    pub fn find(pid: u32) -> Result<Self> {
        use windows::Win32::Foundation::LPARAM;
        use windows::Win32::UI::WindowsAndMessaging::EnumWindows;

        FOUND_HWND.with(|cell| cell.set(None));

        // SAFETY: EnumWindows calls the callback synchronously for each
        // top-level window; `pid` outlives the call.
        unsafe {
            // The callback stops enumeration early, which EnumWindows reports as an error.
            let _ = EnumWindows(Some(enum_callback), LPARAM(&pid as *const u32 as isize));
        }

        FOUND_HWND
            .with(|cell| cell.take())
            .map(|hwnd| Self { hwnd })
            .ok_or_else(|| Error::Window(format!("no visible window for pid {}", pid)))
    }

    pub(crate) fn hwnd(&self) -> HWND {
        self.hwnd
    }
}

#[cfg(target_os = "windows")]
thread_local! {
    static FOUND_HWND: std::cell::Cell<Option<HWND>> = const { std::cell::Cell::new(None) };
}

#[cfg(target_os = "windows")]
unsafe extern "system" fn enum_callback(
    hwnd: HWND,
    lparam: windows::Win32::Foundation::LPARAM,
) -> windows::Win32::Foundation::BOOL {
    use windows::Win32::Foundation::BOOL;
    use windows::Win32::UI::WindowsAndMessaging::{GetWindowThreadProcessId, IsWindowVisible};

    let target_pid = unsafe { *(lparam.0 as *const u32) };
    let mut window_pid: u32 = 0;
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut window_pid)) };

    if window_pid == target_pid && unsafe { IsWindowVisible(hwnd) }.as_bool() {
        FOUND_HWND.with(|cell| cell.set(Some(hwnd)));
        return BOOL(0);
    }
    BOOL(1)
}

#[cfg(target_os = "windows")]
impl WindowControl for GameWindow {
    fn focus(&self) -> Result<()> {
        use windows::Win32::UI::WindowsAndMessaging::SetForegroundWindow;

        // SAFETY: SetForegroundWindow is safe to call with any HWND.
        let ok = unsafe { SetForegroundWindow(self.hwnd) };
        if !ok.as_bool() {
            tracing::warn!("Could not bring the game window to the foreground");
        }
        Ok(())
    }

    fn tap_pause_key(&self) -> Result<()> {
        use crate::memory::layout::timing::KEY_TAP_HOLD_MS;
        use windows::Win32::UI::Input::KeyboardAndMouse::{
            INPUT, INPUT_0, INPUT_KEYBOARD, KEYBD_EVENT_FLAGS, KEYBDINPUT, KEYEVENTF_KEYUP,
            KEYEVENTF_SCANCODE, SendInput, VIRTUAL_KEY,
        };

        // DirectInput games read scan codes, not virtual keys
        const ESCAPE_SCAN_CODE: u16 = 0x01;

        let key = |flags: KEYBD_EVENT_FLAGS| INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(0),
                    wScan: ESCAPE_SCAN_CODE,
                    dwFlags: KEYEVENTF_SCANCODE | flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };

        let send = |input: INPUT| -> Result<()> {
            // SAFETY: `input` is a fully initialised keyboard INPUT.
            let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
            if sent == 1 {
                Ok(())
            } else {
                Err(Error::Window("SendInput was blocked".to_string()))
            }
        };

        send(key(KEYBD_EVENT_FLAGS(0)))?;
        std::thread::sleep(std::time::Duration::from_millis(KEY_TAP_HOLD_MS));
        send(key(KEYEVENTF_KEYUP))
    }
}

#[cfg(target_os = "windows")]
impl ScreenCapture for GameWindow {
    fn capture(&self) -> Result<Screenshot> {
        screenshot::capture_client_area(self.hwnd())
    }
}

// --- Non-Windows stubs ---

#[cfg(not(target_os = "windows"))]
impl GameWindow {
    pub fn find(_pid: u32) -> Result<Self> {
        Err(crate::error::Error::Unsupported("window management"))
    }
}

#[cfg(not(target_os = "windows"))]
impl WindowControl for GameWindow {
    fn focus(&self) -> Result<()> {
        Err(crate::error::Error::Unsupported("window management"))
    }

    fn tap_pause_key(&self) -> Result<()> {
        Err(crate::error::Error::Unsupported("window management"))
    }
}

#[cfg(not(target_os = "windows"))]
impl ScreenCapture for GameWindow {
    fn capture(&self) -> Result<Screenshot> {
        Err(crate::error::Error::Unsupported("screen capture"))
    }
}
