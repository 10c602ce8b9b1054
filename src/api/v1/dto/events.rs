/*
 * Responsibility
 * - events 系 operation の引数 DTO
 * - validate() で形式チェック (業務ルールは service 側)
 */
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize, Default)]
pub struct ListEventsArgs {
    pub first: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventArgs {
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl CreateEventArgs {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.title.len() > 200 {
            return Err("title must be <= 200 chars");
        }
        if let Some(desc) = &self.description
            && desc.len() > 2000
        {
            return Err("description must be <= 2000 chars");
        }
        Ok(())
    }
}

/// joinEvent / unjoinEvent. Without `username` the caller's own subject is used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationArgs {
    pub event_id: Uuid,
    pub username: Option<String>,
}

impl ParticipationArgs {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.username
            && name.trim().is_empty()
        {
            return Err("username cannot be empty");
        }
        Ok(())
    }
}
