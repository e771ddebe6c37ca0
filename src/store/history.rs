use tracing::{info, warn};

use crate::session::{ResultSink, TestResult};
use crate::store::json_store::JsonStore;
use crate::store::schema::{ProfileData, ResultHistoryData, ResultRecord};

pub const ANONYMOUS: &str = "anonymous";

/// Trim a display name. Blank names are rejected.
pub fn normalize_user_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Result history plus the active user, optionally backed by a store.
pub struct ResultHistory {
    records: Vec<ResultRecord>,
    user_name: Option<String>,
    limit: usize,
    store: Option<JsonStore>,
}

impl ResultHistory {
    pub fn in_memory(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            user_name: None,
            limit: limit.max(1),
            store: None,
        }
    }

    pub fn open(store: JsonStore, limit: usize) -> Self {
        if store.check_interrupted_import() {
            warn!("removed leftover backups from an interrupted import");
        }
        let profile = store.load_profile();
        let history = store.load_history();
        info!(
            results = history.results.len(),
            dir = %store.base_dir().display(),
            "loaded result history"
        );

        let mut this = Self {
            records: history.results,
            user_name: profile.user_name.as_deref().and_then(normalize_user_name),
            limit: limit.max(1),
            store: Some(store),
        };
        this.trim();
        this
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Set and persist the active name. Returns false for a blank name.
    pub fn set_user_name(&mut self, raw: &str) -> bool {
        let Some(name) = normalize_user_name(raw) else {
            return false;
        };
        info!(user = %name, "user name set");
        self.user_name = Some(name);
        self.persist_profile();
        true
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&ResultRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn trim(&mut self) {
        if self.records.len() > self.limit {
            let excess = self.records.len() - self.limit;
            self.records.drain(..excess);
        }
    }

    fn persist_profile(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let profile = ProfileData {
            user_name: self.user_name.clone(),
            ..ProfileData::default()
        };
        if let Err(e) = store.save_profile(&profile) {
            warn!(error = %e, "failed to save profile");
        }
    }

    fn persist_history(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let data = ResultHistoryData {
            results: self.records.clone(),
            ..ResultHistoryData::default()
        };
        if let Err(e) = store.save_history(&data) {
            warn!(error = %e, "failed to save results");
        }
    }
}

impl ResultSink for ResultHistory {
    fn submit(&mut self, result: TestResult) {
        let user_name = self
            .user_name
            .clone()
            .unwrap_or_else(|| ANONYMOUS.to_string());
        info!(user = %user_name, wpm = result.wpm, accuracy = result.accuracy, "result recorded");
        self.records.push(ResultRecord { user_name, result });
        self.trim();
        self.persist_history();
    }
}
