//! Default content seeding
//!
//! Populates a fresh store with the stock entries. Seeding is an upsert of the
//! value only, so running it again keeps existing placement and order.

use crate::models::{ContentNode, NodeUpdate};
use crate::services::content_service::ContentService;
use crate::services::error::ContentServiceError;

/// Stock `(key, value)` entries
pub const DEFAULT_CONTENT: &[(&str, &str)] = &[
    ("home", "Seu conteúdo aqui em string"),
    ("sobre", "Outro conteúdo aqui"),
];

/// Upsert every entry of [`DEFAULT_CONTENT`] and return the stored nodes
pub async fn seed_defaults(
    service: &ContentService,
) -> Result<Vec<ContentNode>, ContentServiceError> {
    let mut seeded = Vec::with_capacity(DEFAULT_CONTENT.len());

    for (key, value) in DEFAULT_CONTENT {
        let node = service
            .update(key, NodeUpdate::new().with_value(*value))
            .await?;
        tracing::info!("Seeded content '{}'", node.key);
        seeded.push(node);
    }

    Ok(seeded)
}
