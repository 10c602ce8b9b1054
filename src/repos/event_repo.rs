/*
 * Responsibility
 * - events / users の保持 (in-memory; 永続化は外部コラボレータの責務)
 * - 読み取りは並行、書き込みは RwLock で直列化
 */
use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub creator: String,
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct EventRepo {
    events: RwLock<Vec<EventRow>>,
    users: RwLock<BTreeSet<String>>,
}

impl EventRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first.
    pub async fn list(&self, limit: usize) -> Vec<EventRow> {
        let events = self.events.read().await;
        events.iter().rev().take(limit).cloned().collect()
    }

    pub async fn create(
        &self,
        title: &str,
        date: NaiveDate,
        description: Option<&str>,
        creator: &str,
    ) -> EventRow {
        let row = EventRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            date,
            description: description.map(str::to_string),
            creator: creator.to_string(),
            participants: Vec::new(),
            created_at: Utc::now(),
        };

        self.events.write().await.push(row.clone());
        self.users.write().await.insert(creator.to_string());
        row
    }

    /// Adding an existing participant is a no-op. `None` when the event doesn't exist.
    pub async fn add_participant(&self, event_id: Uuid, username: &str) -> Option<EventRow> {
        let row = {
            let mut events = self.events.write().await;
            let event = events.iter_mut().find(|e| e.id == event_id)?;
            if !event.participants.iter().any(|p| p == username) {
                event.participants.push(username.to_string());
            }
            event.clone()
        };

        self.users.write().await.insert(username.to_string());
        Some(row)
    }

    pub async fn remove_participant(&self, event_id: Uuid, username: &str) -> Option<EventRow> {
        let mut events = self.events.write().await;
        let event = events.iter_mut().find(|e| e.id == event_id)?;
        event.participants.retain(|p| p != username);
        Some(event.clone())
    }

    pub async fn list_users(&self) -> Vec<String> {
        self.users.read().await.iter().cloned().collect()
    }
}
