//! Plain-text transcript export
//!
//! Every displayed turn is written as `<Role> (<HH:MM:SS>): <content>`,
//! entries separated by a blank line.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use crate::conversation::Turn;
use crate::error::{EthosError, Result};

/// All turns shown in the current chat, in display order.
///
/// Unlike the session history this is never truncated; it is what the user
/// saw, inline error replies included.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: impl IntoIterator<Item = Turn>) -> Self {
        Self {
            turns: turns.into_iter().collect(),
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Render the export text
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(format_turn)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Write the transcript to `dir`, named after the current time.
    ///
    /// # Errors
    ///
    /// Returns [`EthosError::EmptyTranscript`] when there is nothing to
    /// write, or an IO error.
    pub fn export_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.export_at(dir, Local::now())
    }

    /// Like [`Transcript::export_to`] with an explicit timestamp
    pub fn export_at(&self, dir: impl AsRef<Path>, at: DateTime<Local>) -> Result<PathBuf> {
        if self.is_empty() {
            return Err(EthosError::EmptyTranscript);
        }

        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name(at));
        std::fs::write(&path, self.render())?;

        tracing::info!(path = %path.display(), turns = self.len(), "Exported transcript");
        Ok(path)
    }
}

/// `<Role> (<HH:MM:SS>): <content>`
pub fn format_turn(turn: &Turn) -> String {
    format!(
        "{} ({}): {}",
        turn.role.label(),
        turn.created_at.format("%H:%M:%S"),
        turn.content
    )
}

/// `chat_<YYYYMMDD>_<HHMMSS>.txt`
pub fn file_name(at: DateTime<Local>) -> String {
    format!("chat_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::TurnRole;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, h, m, s).earliest().unwrap()
    }

    fn turn(role: TurnRole, content: &str, time: DateTime<Local>) -> Turn {
        Turn {
            role,
            content: content.to_string(),
            created_at: time,
        }
    }

    #[test]
    fn test_render_format() {
        let transcript = Transcript::from_turns([
            turn(TurnRole::User, "Hello", at(9, 5, 1)),
            turn(TurnRole::Assistant, "Hi there!", at(9, 5, 3)),
        ]);

        assert_eq!(
            transcript.render(),
            "User (09:05:01): Hello\n\nAssistant (09:05:03): Hi there!"
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(at(14, 30, 0)), "chat_20240309_143000.txt");
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = Transcript::from_turns([turn(TurnRole::User, "Hello", at(8, 0, 0))]);

        let path = transcript.export_at(dir.path().join("exports"), at(8, 0, 5)).unwrap();
        assert!(path.ends_with("chat_20240309_080005.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "User (08:00:00): Hello");
    }

    #[test]
    fn test_export_empty_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Transcript::new().export_to(dir.path()).unwrap_err();
        assert!(matches!(err, EthosError::EmptyTranscript));
    }
}
