use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const WELCOME_MESSAGE: &str = "Вітаю! Я ваш AI-консультант. Я допоможу знайти притулок, гуманітарну допомогу або контакти волонтерів в Одесі, Миколаєві та Херсоні. Що вас цікавить?";

const TRANSCRIPT_DIVIDER: &str = "\n-------------------\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker name in the chat panel
    pub fn chat_label(&self) -> &'static str {
        match self {
            Role::User => "Ви",
            Role::Assistant => "AI Помічник",
        }
    }

    /// Speaker name in exported transcripts
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Role::User => "Користувач",
            Role::Assistant => "AI Консультант",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

/// Append-only record of the chat session
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log opened by the assistant's greeting
    pub fn with_welcome() -> Self {
        let mut log = Self::new();
        log.append(Role::Assistant, WELCOME_MESSAGE);
        log
    }

    pub fn append(&mut self, role: Role, text: &str) -> &ChatMessage {
        self.append_at(role, text, Local::now())
    }

    pub fn append_at(&mut self, role: Role, text: &str, timestamp: DateTime<Local>) -> &ChatMessage {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            role,
            text: text.to_string(),
            timestamp,
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// A lone greeting is not worth saving
    pub fn is_exportable(&self) -> bool {
        self.messages.len() > 1
    }

    /// Plain-text transcript, one `[time] speaker:` entry per message
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| {
                format!(
                    "[{}] {}:\n{}\n",
                    m.timestamp.format("%H:%M:%S"),
                    m.role.transcript_label(),
                    m.text
                )
            })
            .collect::<Vec<_>>()
            .join(TRANSCRIPT_DIVIDER)
    }

    /// Write the transcript to `dir/chat-transcript-YYYY-MM-DD.txt`.
    /// Returns `None` when there is nothing beyond the greeting.
    pub fn export_transcript(&self, dir: &Path) -> Result<Option<PathBuf>> {
        if !self.is_exportable() {
            return Ok(None);
        }

        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create {}", dir.display()))?;
        let filename = format!("chat-transcript-{}.txt", Local::now().format("%Y-%m-%d"));
        let path = dir.join(filename);
        fs::write(&path, self.transcript())
            .with_context(|| format!("Cannot write {}", path.display()))?;

        info!(
            target: "assistant",
            "Saved transcript with {} messages to {}",
            self.messages.len(),
            path.display()
        );
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ids_are_monotonic() {
        let mut log = ConversationLog::with_welcome();
        log.append(Role::User, "де знайти притулок?");
        log.append(Role::Assistant, "Херсонський Хаб");
        let ids: Vec<u64> = log.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(log.last().unwrap().role, Role::Assistant);
    }

    #[test]
    fn test_transcript_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap();
        let mut log = ConversationLog::new();
        log.append_at(Role::User, "Привіт", at);
        log.append_at(Role::Assistant, "Добрий день", at);

        assert_eq!(
            log.transcript(),
            "[14:05:09] Користувач:\nПривіт\n\n-------------------\n[14:05:09] AI Консультант:\nДобрий день\n"
        );
    }

    #[test]
    fn test_greeting_alone_is_not_exported() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::with_welcome();
        assert!(log.export_transcript(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ConversationLog::with_welcome();
        log.append(Role::User, "Питання");
        let path = log.export_transcript(dir.path()).unwrap().unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Користувач:\nПитання"));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("chat-transcript-"));
    }
}
