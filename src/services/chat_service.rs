use sqlx::SqlitePool;
use tracing::debug;

use crate::chat::{compose, intent};
use crate::db::repository;
use crate::error::AppError;

/// Answers one chat message against a snapshot of the course catalog.
/// Stateless: nothing survives the request.
pub struct ChatService {
    db: SqlitePool,
}

impl ChatService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Expects the message already trimmed and lowercased by the handler.
    pub async fn reply(&self, message: &str) -> Result<String, AppError> {
        if intent::is_greeting(message) {
            return Ok(compose::GREETING_REPLY.to_string());
        }
        if intent::is_thanks(message) {
            return Ok(compose::thanks_reply(&mut rand::rng()).to_string());
        }

        let intent = intent::extract(message);
        debug!(?intent, "extracted chat intent");

        // Without a course topic the composer falls back before ever looking
        // at the catalog, so skip the query.
        let catalog = if intent.topic {
            repository::fetch_catalog(&self.db).await?
        } else {
            Vec::new()
        };

        Ok(compose::compose(&intent, &catalog))
    }
}
