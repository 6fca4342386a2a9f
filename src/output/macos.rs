//! macOS pointer output via Core Graphics events
//!
//! Posting events requires the Accessibility permission. While the left
//! button is held, moves are posted as drags so applications see a
//! press-drag-release sequence.

use crate::output::sink::{PointerError, PointerResult, PointerSink};
use crate::processing::projection::PixelPoint;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

#[derive(Debug, Default)]
pub struct SystemPointer {
    position: PixelPoint,
    button_down: bool,
}

impl SystemPointer {
    pub fn new() -> PointerResult<Self> {
        // Fail early if the event source is unavailable
        CGEventSource::new(CGEventSourceStateID::HIDSystemState).map_err(|_| {
            PointerError::PlatformError("Failed to create CGEventSource".to_string())
        })?;
        Ok(Self::default())
    }

    fn post(&self, event_type: CGEventType) -> PointerResult<()> {
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState).map_err(|_| {
            PointerError::PlatformError("Failed to create CGEventSource".to_string())
        })?;
        let location = CGPoint::new(self.position.x as f64, self.position.y as f64);
        let event = CGEvent::new_mouse_event(source, event_type, location, CGMouseButton::Left)
            .map_err(|_| PointerError::PlatformError("Failed to create mouse event".to_string()))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }
}

impl PointerSink for SystemPointer {
    fn move_to(&mut self, point: PixelPoint) -> PointerResult<()> {
        self.position = point;
        if self.button_down {
            self.post(CGEventType::LeftMouseDragged)
        } else {
            self.post(CGEventType::MouseMoved)
        }
    }

    fn press(&mut self) -> PointerResult<()> {
        self.post(CGEventType::LeftMouseDown)?;
        self.button_down = true;
        Ok(())
    }

    fn release(&mut self) -> PointerResult<()> {
        self.post(CGEventType::LeftMouseUp)?;
        self.button_down = false;
        Ok(())
    }
}
