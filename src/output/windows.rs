//! Windows pointer output via SetCursorPos and SendInput

use crate::output::sink::{PointerError, PointerResult, PointerSink};
use crate::processing::projection::PixelPoint;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEINPUT, MOUSE_EVENT_FLAGS,
};
use windows::Win32::UI::WindowsAndMessaging::SetCursorPos;

#[derive(Debug, Default)]
pub struct SystemPointer;

impl SystemPointer {
    pub fn new() -> PointerResult<Self> {
        Ok(Self)
    }

    fn send_button(flags: MOUSE_EVENT_FLAGS) -> PointerResult<()> {
        let input = INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: 0,
                    dy: 0,
                    mouseData: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };

        let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if sent != 1 {
            return Err(PointerError::PlatformError(
                "SendInput was blocked".to_string(),
            ));
        }
        Ok(())
    }
}

impl PointerSink for SystemPointer {
    fn move_to(&mut self, point: PixelPoint) -> PointerResult<()> {
        unsafe { SetCursorPos(point.x, point.y) }
            .map_err(|e| PointerError::PlatformError(format!("SetCursorPos failed: {}", e)))
    }

    fn press(&mut self) -> PointerResult<()> {
        Self::send_button(MOUSEEVENTF_LEFTDOWN)
    }

    fn release(&mut self) -> PointerResult<()> {
        Self::send_button(MOUSEEVENTF_LEFTUP)
    }
}
