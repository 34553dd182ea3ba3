//! GDI capture of a window's client area.

#[cfg(target_os = "windows")]
use windows::Win32::Foundation::HWND;

#[cfg(target_os = "windows")]
use crate::error::{Error, Result};
#[cfg(target_os = "windows")]
use crate::game::Screenshot;

/// Copy the client area of `hwnd` into an RGB8 buffer.
#[cfg(target_os = "windows")]
pub(super) fn capture_client_area(hwnd: HWND) -> Result<Screenshot> {
    use windows::Win32::Foundation::RECT;
    use windows::Win32::Graphics::Gdi::{
        BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BitBlt, CreateCompatibleBitmap, CreateCompatibleDC,
        DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, GetDIBits, ReleaseDC, SRCCOPY,
        SelectObject,
    };
    use windows::Win32::UI::WindowsAndMessaging::GetClientRect;

    let mut rect = RECT::default();
    // SAFETY: `rect` is a valid out-pointer for the duration of the call.
    unsafe { GetClientRect(hwnd, &mut rect) }
        .map_err(|e| Error::Window(format!("GetClientRect failed: {}", e)))?;

    let width = (rect.right - rect.left).max(0);
    let height = (rect.bottom - rect.top).max(0);
    if width == 0 || height == 0 {
        return Err(Error::Window("client area is empty (minimized?)".to_string()));
    }

    // SAFETY: every GDI object created here is released before returning,
    // and the DIB buffer is sized for `width * height` 32-bit pixels.
    unsafe {
        let window_dc = GetDC(hwnd);
        let memory_dc = CreateCompatibleDC(window_dc);
        let bitmap = CreateCompatibleBitmap(window_dc, width, height);
        let previous = SelectObject(memory_dc, bitmap);

        let blit = BitBlt(memory_dc, 0, 0, width, height, window_dc, 0, 0, SRCCOPY);

        let mut info = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                // Negative height requests a top-down DIB
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut bgra = vec![0u8; width as usize * height as usize * 4];
        let lines = GetDIBits(
            memory_dc,
            bitmap,
            0,
            height as u32,
            Some(bgra.as_mut_ptr().cast()),
            &mut info,
            DIB_RGB_COLORS,
        );

        SelectObject(memory_dc, previous);
        let _ = DeleteObject(bitmap);
        let _ = DeleteDC(memory_dc);
        ReleaseDC(hwnd, window_dc);

        blit.map_err(|e| Error::Window(format!("BitBlt failed: {}", e)))?;
        if lines != height {
            return Err(Error::Window(format!(
                "GetDIBits copied {} of {} lines",
                lines, height
            )));
        }

        Ok(Screenshot {
            width: width as u32,
            height: height as u32,
            rgb: bgra_to_rgb(&bgra),
        })
    }
}

/// Drop the alpha channel and reorder GDI's BGRA pixels to RGB.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub(super) fn bgra_to_rgb(bgra: &[u8]) -> Vec<u8> {
    bgra.chunks_exact(4)
        .flat_map(|pixel| [pixel[2], pixel[1], pixel[0]])
        .collect()
}
