use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Checking,
    Idle,
    Error,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Checking => "checking",
            RunState::Idle => "idle",
            RunState::Error => "error",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            RunState::Checking => "mdi:web",
            RunState::Idle => "mdi:power",
            RunState::Error => "mdi:alert",
        }
    }
}

/// Body of a state upsert, `{"state": ..., "attributes": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusReport {
    pub state: RunState,
    pub attributes: Map<String, Value>,
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl StatusReport {
    fn base(state: RunState, friendly_name: &str) -> Self {
        let mut attributes = Map::new();
        attributes.insert("friendly_name".to_string(), json!(friendly_name));
        attributes.insert("icon".to_string(), json!(state.icon()));
        Self { state, attributes }
    }

    pub fn checking(friendly_name: &str, started: DateTime<Utc>) -> Self {
        Self::base(RunState::Checking, friendly_name)
            .with_attribute("last_check_start", json!(timestamp(started)))
    }

    pub fn idle(friendly_name: &str, finished: DateTime<Utc>, count: usize) -> Self {
        Self::base(RunState::Idle, friendly_name)
            .with_attribute("last_check_end", json!(timestamp(finished)))
            .with_attribute("count", json!(count))
    }

    pub fn error(friendly_name: &str, finished: DateTime<Utc>, error: &str) -> Self {
        Self::base(RunState::Error, friendly_name)
            .with_attribute("last_error", json!(error))
            .with_attribute("last_check_end", json!(timestamp(finished)))
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }
}
