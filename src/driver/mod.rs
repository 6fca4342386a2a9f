//! Frame loop driver
//!
//! Wires a tracking source, the pointer session and a pointer sink together
//! according to `PointerConfig`.

pub mod channel;

pub use channel::{ChannelError, ChannelResult, FrameCounts, GestureChannel, TrackingChannel};

use crate::config::{PointerConfig, SinkKind};
use crate::output::{self, LoggingSink, PointerSink};
use crate::tracking::{ReplaySource, TrackingSource};

/// Open the tracking source named by the config
pub fn open_source(config: &PointerConfig) -> ChannelResult<Box<dyn TrackingSource>> {
    let path = config.source.replay_path.as_ref().ok_or_else(|| {
        ChannelError::ConfigurationError(format!(
            "No tracking source configured; set {} or source.replayPath",
            crate::config::REPLAY_ENV
        ))
    })?;

    Ok(Box::new(ReplaySource::open(path)?))
}

/// Open the pointer sink named by the config, falling back to logging
pub fn open_sink(config: &PointerConfig) -> Box<dyn PointerSink> {
    match config.sink.kind {
        SinkKind::Log => Box::new(LoggingSink),
        SinkKind::System => match output::system_pointer() {
            Ok(sink) => sink,
            Err(e) => {
                tracing::warn!("System pointer unavailable ({}), logging pointer commands instead", e);
                Box::new(LoggingSink)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::PixelPoint;
    use std::io::Write;

    #[test]
    fn test_open_source_requires_path() {
        let config = PointerConfig::default();
        assert!(matches!(
            open_source(&config),
            Err(ChannelError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_open_source_missing_file() {
        let mut config = PointerConfig::default();
        config.source.replay_path = Some("/nonexistent/frames.jsonl".into());
        assert!(matches!(open_source(&config), Err(ChannelError::Tracking(_))));
    }

    #[test]
    fn test_open_source_replay() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"hands": []}}"#).unwrap();

        let mut config = PointerConfig::default();
        config.source.replay_path = Some(file.path().to_path_buf());
        let source = open_source(&config).unwrap();
        assert!(!source.is_exhausted());
    }

    #[test]
    fn test_open_log_sink() {
        let mut config = PointerConfig::default();
        config.sink.kind = SinkKind::Log;
        let mut sink = open_sink(&config);
        assert!(sink.move_to(PixelPoint::new(1, 2)).is_ok());
    }
}
