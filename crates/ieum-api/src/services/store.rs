//! Persistence of analysis results into the search index.

use chrono::Local;
use tracing::{debug, info};
use uuid::Uuid;

use ieum_core::{EmbeddingBackend, Result, StoredMeetingDocument};
use ieum_search::SearchIndexClient;

/// Timestamp format used in the document source label.
const SOURCE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Build the `"<timestamp> 회의 요약"` source label for a new document.
fn source_label() -> String {
    format!("{} 회의 요약", Local::now().format(SOURCE_TIME_FORMAT))
}

/// Embed `text` and upload it as a fresh single-document batch.
///
/// Documents are written exactly once and never updated; each call mints
/// a new UUID. Returns the stored document id.
pub async fn save_analysis(
    embeddings: &dyn EmbeddingBackend,
    search: &SearchIndexClient,
    text: &str,
) -> Result<String> {
    debug!("Saving analysis to the search index");

    let vector = embeddings.embed_query(text).await?;
    let id = Uuid::new_v4().to_string();
    let document = StoredMeetingDocument {
        id: id.clone(),
        content: text.to_string(),
        source: source_label(),
        content_vector: vector,
    };

    search.upload_documents(&[document]).await?;
    info!(document_id = %id, "Analysis saved");
    Ok(id)
}
