//! Pointer output
//!
//! The pointer session talks to a `PointerSink`. On Windows and macOS the
//! system sink moves the real cursor; elsewhere only logging is available.

pub mod sink;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

pub use sink::{
    CommandLog, LoggingSink, PointerCommand, PointerError, PointerResult, PointerSink,
    RecordedCommand, RecordingSink,
};

/// Pointer sink driving the real system cursor
pub fn system_pointer() -> PointerResult<Box<dyn PointerSink>> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::SystemPointer::new()?))
    }

    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(windows::SystemPointer::new()?))
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Err(PointerError::Unsupported)
    }
}
