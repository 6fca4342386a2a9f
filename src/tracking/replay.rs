//! Replay of recorded tracking frames
//!
//! Frames are stored as JSON lines, one `TrackingFrame` per line. The replay
//! emits `Connected` first, then every frame in file order, then
//! `Disconnected`, after which it is exhausted.

use crate::tracking::source::{TrackingError, TrackingEvent, TrackingResult, TrackingSource};
use crate::tracking::types::TrackingFrame;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplayState {
    Pending,
    Streaming,
    Finished,
    Exhausted,
}

pub struct ReplaySource {
    name: String,
    lines: Vec<(usize, String)>,
    cursor: usize,
    state: ReplayState,
}

impl ReplaySource {
    pub fn open(path: &Path) -> TrackingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::info!("Loaded replay file {}", path.display());
        Ok(Self::from_lines(path.display().to_string(), &content))
    }

    /// Build a replay from in-memory JSON lines
    pub fn from_lines(name: impl Into<String>, content: &str) -> Self {
        let lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| (index + 1, line.to_string()))
            .collect();

        Self {
            name: name.into(),
            lines,
            cursor: 0,
            state: ReplayState::Pending,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.lines.len()
    }

    fn next_frame(&mut self) -> TrackingResult<TrackingFrame> {
        let (line, text) = &self.lines[self.cursor];
        self.cursor += 1;
        serde_json::from_str(text).map_err(|source| TrackingError::Parse { line: *line, source })
    }
}

impl TrackingSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_event(&mut self) -> TrackingResult<Option<TrackingEvent>> {
        match self.state {
            ReplayState::Pending => {
                self.state = ReplayState::Streaming;
                Ok(Some(TrackingEvent::Connected))
            }
            ReplayState::Streaming if self.cursor < self.lines.len() => {
                self.next_frame().map(|frame| Some(TrackingEvent::Frame(frame)))
            }
            ReplayState::Streaming => {
                self.state = ReplayState::Finished;
                Ok(Some(TrackingEvent::Disconnected))
            }
            ReplayState::Finished => {
                self.state = ReplayState::Exhausted;
                Ok(None)
            }
            ReplayState::Exhausted => Ok(None),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.state == ReplayState::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FRAME: &str = r#"{"id": 7, "hands": [], "screens": []}"#;

    #[test]
    fn test_replay_event_order() {
        let content = format!("{}\n\n{}\n", FRAME, FRAME);
        let mut source = ReplaySource::from_lines("test", &content);
        assert_eq!(source.frame_count(), 2);

        assert!(matches!(source.next_event().unwrap(), Some(TrackingEvent::Connected)));
        assert!(matches!(source.next_event().unwrap(), Some(TrackingEvent::Frame(f)) if f.id == 7));
        assert!(matches!(source.next_event().unwrap(), Some(TrackingEvent::Frame(_))));
        assert!(matches!(source.next_event().unwrap(), Some(TrackingEvent::Disconnected)));
        assert!(!source.is_exhausted());
        assert!(source.next_event().unwrap().is_none());
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_malformed_line_reports_line_number_and_continues() {
        let content = format!("{}\nnot json\n{}\n", FRAME, FRAME);
        let mut source = ReplaySource::from_lines("test", &content);

        source.next_event().unwrap();
        assert!(source.next_event().unwrap().is_some());

        match source.next_event() {
            Err(TrackingError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }

        assert!(matches!(source.next_event().unwrap(), Some(TrackingEvent::Frame(_))));
    }

    #[test]
    fn test_open_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", FRAME).unwrap();

        let source = ReplaySource::open(file.path()).unwrap();
        assert_eq!(source.frame_count(), 1);
        assert!(source.name().ends_with(&file.path().file_name().unwrap().to_string_lossy().to_string()));
    }

    #[test]
    fn test_open_missing_file() {
        let result = ReplaySource::open(Path::new("/nonexistent/frames.jsonl"));
        assert!(matches!(result, Err(TrackingError::IoError(_))));
    }
}
