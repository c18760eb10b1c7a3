// src/infrastructure/editor.rs
use crate::application::AutosaveTimer;
use crate::constants::EDITOR_POLL_INTERVAL_MS;
use crate::domain::NoteDraft;
use anyhow::{bail, Context, Result};
use chrono::Local;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};
use tempfile::Builder;
use tracing::{debug, instrument};

/// Title on the first line, a blank line, then the content
pub fn render_draft(draft: &NoteDraft) -> String {
    format!("{}\n\n{}", draft.title, draft.content)
}

/// Inverse of [`render_draft`]: the first line is the title, leading blank
/// lines of the remainder are dropped, trailing whitespace is trimmed.
pub fn parse_draft(text: &str) -> NoteDraft {
    let (title, rest) = text.split_once('\n').unwrap_or((text, ""));
    let content = rest.trim_start_matches(['\n', '\r']).trim_end();
    NoteDraft::new(title.trim(), content)
}

/// Edits drafts in the user's `$VISUAL` / `$EDITOR`
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_env() -> Self {
        let command = ["VISUAL", "EDITOR"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string());
        Self::new(command)
    }

    /// The configured command when there is one, the environment otherwise
    pub fn resolve(configured: Option<&str>) -> Self {
        match configured {
            Some(command) => Self::new(command),
            None => Self::from_env(),
        }
    }

    /// Open `initial` in the editor and return the edited draft, or `None`
    /// when the title and content came back unchanged. Whitespace the
    /// editor adds around them does not count as a change. The autosave
    /// timer is polled while the editor runs.
    #[instrument(level = "debug", skip(self, initial, timer))]
    pub fn edit(&self, initial: &NoteDraft, timer: &mut AutosaveTimer) -> Result<Option<NoteDraft>> {
        let file = Builder::new()
            .prefix("notesync-")
            .suffix(".md")
            .tempfile()
            .context("Failed to create temporary draft file")?;
        let original = render_draft(initial);
        fs::write(file.path(), &original)
            .with_context(|| format!("Failed to write draft to {}", file.path().display()))?;

        self.run_until_exit(file.path(), timer)?;

        let edited = fs::read_to_string(file.path()).context("Failed to read edited draft")?;
        let draft = parse_draft(&edited);
        if draft == parse_draft(&original) {
            debug!("Draft unchanged");
            return Ok(None);
        }
        Ok(Some(draft))
    }

    fn run_until_exit(&self, path: &Path, timer: &mut AutosaveTimer) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().context("Editor command is empty")?;

        let mut child = Command::new(program)
            .args(parts)
            .arg(path)
            .spawn()
            .with_context(|| format!("Failed to launch editor `{}`", self.command))?;

        let status = loop {
            if let Some(status) = child.try_wait().context("Failed to wait for editor")? {
                break status;
            }
            std::thread::sleep(Duration::from_millis(EDITOR_POLL_INTERVAL_MS));

            // The file may be mid-write, an unreadable snapshot just skips this tick
            if let Ok(text) = fs::read_to_string(path) {
                if let Some(label) = timer.poll(Instant::now(), &Local::now(), &parse_draft(&text)) {
                    debug!("Last saved: {label}");
                }
            }
        };

        if !status.success() {
            bail!("Editor `{}` exited with {}", self.command, status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Title\n\nBody text\n", "Title", "Body text")]
    #[case("Title\nBody right away", "Title", "Body right away")]
    #[case("  Only a title  ", "Only a title", "")]
    #[case("\n\nBody without title", "", "Body without title")]
    #[case("Title\r\n\r\nLine 1\nLine 2\n\n", "Title", "Line 1\nLine 2")]
    fn given_text_when_parsing_draft_then_splits_title_and_content(
        #[case] text: &str,
        #[case] title: &str,
        #[case] content: &str,
    ) {
        assert_eq!(parse_draft(text), NoteDraft::new(title, content));
    }

    #[test]
    fn given_draft_when_rendering_and_parsing_then_recovers_fields() {
        let draft = NoteDraft::new("Grocery List", "Milk\nBread");
        assert_eq!(parse_draft(&render_draft(&draft)), draft);
    }

    #[cfg(unix)]
    #[test]
    fn given_editor_that_changes_nothing_when_editing_then_returns_none() {
        let editor = ExternalEditor::new("true");
        let mut timer = AutosaveTimer::new(Duration::from_secs(30), Instant::now());

        let result = editor
            .edit(&NoteDraft::new("Title", "Body"), &mut timer)
            .expect("Editor should run");

        assert!(result.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn given_editor_that_only_appends_newline_when_editing_then_returns_none() {
        // `$0` is the draft path: sh -c <script> <path>
        let editor = ExternalEditor::new("sh -c echo>>$0");
        let mut timer = AutosaveTimer::new(Duration::from_secs(30), Instant::now());

        let result = editor
            .edit(&NoteDraft::new("Title", "Body"), &mut timer)
            .expect("Editor should run");

        assert!(result.is_none());
    }

    #[test]
    fn given_configured_command_when_resolving_then_prefers_it_over_environment() {
        let editor = ExternalEditor::resolve(Some("nano -w"));

        assert_eq!(editor.command, "nano -w");
    }

    #[cfg(unix)]
    #[test]
    fn given_editor_that_rewrites_file_when_editing_then_returns_new_draft() {
        let editor = ExternalEditor::new("sed -i s/Old/New/");
        let mut timer = AutosaveTimer::new(Duration::from_secs(30), Instant::now());

        let result = editor
            .edit(&NoteDraft::new("Old title", "Body"), &mut timer)
            .expect("Editor should run");

        assert_eq!(result, Some(NoteDraft::new("New title", "Body")));
    }

    #[cfg(unix)]
    #[test]
    fn given_failing_editor_when_editing_then_returns_error() {
        let editor = ExternalEditor::new("false");
        let mut timer = AutosaveTimer::new(Duration::from_secs(30), Instant::now());

        assert!(editor.edit(&NoteDraft::default(), &mut timer).is_err());
    }

    #[test]
    fn given_blank_command_when_editing_then_returns_error() {
        let editor = ExternalEditor::new("   ");
        let mut timer = AutosaveTimer::new(Duration::from_secs(30), Instant::now());

        assert!(editor.edit(&NoteDraft::default(), &mut timer).is_err());
    }
}
