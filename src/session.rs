use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::Role;

// Conversations persist as one pretty-printed JSON file per session under
// <state_dir>/sessions/. Assistant messages carry the recovered payload
// (or the parse failure reason) alongside the raw text, so a later render
// can reuse either.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub name: String,
    #[serde(default)]
    pub helper_type: Option<String>,
    #[serde(default)]
    pub language: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    pub created_at: String,
}

impl StoredMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            parsed: None,
            parse_error: None,
            created_at: now_rfc3339(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub name: String,
    pub helper_type: Option<String>,
    pub message_count: usize,
    pub updated_at: String,
}

pub struct SessionStore {
    path: PathBuf,
    name: String,
}

impl SessionStore {
    pub fn open(state_dir: &Path, name: &str) -> Self {
        Self {
            path: sessions_dir(state_dir).join(format!("{name}.json")),
            name: name.to_string(),
        }
    }

    /// Loads the session, or a fresh empty one if it was never saved.
    pub fn load(&self) -> anyhow::Result<SessionData> {
        if !self.path.exists() {
            let now = now_rfc3339();
            return Ok(SessionData {
                name: self.name.clone(),
                helper_type: None,
                language: "en".to_string(),
                created_at: now.clone(),
                updated_at: now,
                messages: Vec::new(),
            });
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session file: {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse session file: {}", self.path.display()))
    }

    pub fn save(&self, data: &mut SessionData) -> anyhow::Result<()> {
        data.updated_at = now_rfc3339();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create session dir: {}", parent.display()))?;
        }
        let payload = serde_json::to_string_pretty(data).context("failed to encode session")?;
        std::fs::write(&self.path, payload)
            .with_context(|| format!("failed to write session file: {}", self.path.display()))
    }

    pub fn append(&self, message: StoredMessage) -> anyhow::Result<()> {
        let mut data = self.load()?;
        data.messages.push(message);
        self.save(&mut data)
    }

    pub fn drop_from(&self, index: usize) -> anyhow::Result<()> {
        let mut data = self.load()?;
        if index >= data.messages.len() {
            return Err(anyhow!(
                "drop index {} out of range ({} messages)",
                index,
                data.messages.len()
            ));
        }
        data.messages.truncate(index);
        self.save(&mut data)
    }

    pub fn drop_last(&self, count: usize) -> anyhow::Result<()> {
        let mut data = self.load()?;
        let keep = data.messages.len().saturating_sub(count);
        data.messages.truncate(keep);
        self.save(&mut data)
    }

    pub fn reset(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove session file: {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Summaries of every stored session, optionally filtered by a glob over
/// the session name.
pub fn list_sessions(
    state_dir: &Path,
    name_glob: Option<&str>,
) -> anyhow::Result<Vec<SessionSummary>> {
    let matcher = match name_glob {
        Some(pattern) => Some(
            globset::Glob::new(pattern)
                .with_context(|| format!("invalid session glob '{pattern}'"))?
                .compile_matcher(),
        ),
        None => None,
    };

    let dir = sessions_dir(state_dir);
    let mut out = Vec::new();
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(out),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Ok(raw) = std::fs::read_to_string(&path) else {
            continue;
        };
        let Ok(data) = serde_json::from_str::<SessionData>(&raw) else {
            continue;
        };
        if let Some(m) = &matcher {
            if !m.is_match(&data.name) {
                continue;
            }
        }
        out.push(SessionSummary {
            name: data.name,
            helper_type: data.helper_type,
            message_count: data.messages.len(),
            updated_at: data.updated_at,
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

fn sessions_dir(state_dir: &Path) -> PathBuf {
    state_dir.join("sessions")
}

pub(crate) fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{list_sessions, SessionStore, StoredMessage};
    use crate::types::Role;

    #[test]
    fn load_of_missing_session_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path(), "fresh");
        let data = store.load().expect("load");
        assert_eq!(data.name, "fresh");
        assert!(data.messages.is_empty());
    }

    #[test]
    fn append_round_trips_parsed_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path(), "chat");

        store
            .append(StoredMessage::new(Role::User, "write a tweet"))
            .expect("append user");
        let mut assistant = StoredMessage::new(Role::Assistant, r#"{"tweet": "hi"}"#);
        assistant.parsed = Some(json!({"tweet": "hi"}));
        store.append(assistant).expect("append assistant");

        let data = store.load().expect("load");
        assert_eq!(data.messages.len(), 2);
        assert_eq!(data.messages[1].parsed, Some(json!({"tweet": "hi"})));
        assert!(data.messages[1].parse_error.is_none());
    }

    #[test]
    fn drop_and_reset_trim_history() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path(), "chat");
        for i in 0..4 {
            store
                .append(StoredMessage::new(Role::User, format!("msg {i}")))
                .expect("append");
        }

        store.drop_last(2).expect("drop last");
        assert_eq!(store.load().expect("load").messages.len(), 2);

        assert!(store.drop_from(5).is_err());
        store.drop_from(1).expect("drop from");
        assert_eq!(store.load().expect("load").messages.len(), 1);

        store.reset().expect("reset");
        assert!(store.load().expect("load").messages.is_empty());
    }

    #[test]
    fn list_filters_by_name_glob() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["tweets-a", "tweets-b", "research"] {
            SessionStore::open(dir.path(), name)
                .append(StoredMessage::new(Role::User, "hi"))
                .expect("append");
        }

        let all = list_sessions(dir.path(), None).expect("list");
        assert_eq!(all.len(), 3);

        let tweets = list_sessions(dir.path(), Some("tweets-*")).expect("list");
        assert_eq!(tweets.len(), 2);
        assert!(tweets.iter().all(|s| s.name.starts_with("tweets-")));

        let none = list_sessions(dir.path(), Some("missing-*")).expect("list");
        assert!(none.is_empty());
    }
}
