//! RAG context assembly over the search index.
//!
//! Not wired to an HTTP endpoint; kept as a library capability for
//! prompt augmentation.

use tracing::warn;

use ieum_core::EmbeddingBackend;

use crate::client::SearchIndexClient;

/// Sentinel returned when the index has nothing relevant.
pub const NO_RELEVANT_INFO: &str = "관련 정보 없음";

/// Number of nearest neighbors requested from the vector query.
const CONTEXT_K: usize = 3;

/// Build a prompt context string for `query`.
///
/// Embeds the query, runs a hybrid lexical+vector search, and
/// concatenates the hits tagged with their source. Returns the
/// [`NO_RELEVANT_INFO`] sentinel when the index is empty, and an empty
/// string when anything fails; retrieval problems degrade the prompt,
/// never the request.
pub async fn context_for(
    client: &SearchIndexClient,
    embeddings: &dyn EmbeddingBackend,
    query: &str,
) -> String {
    let result = async {
        let vector = embeddings.embed_query(query).await?;
        client.search_hybrid(query, &vector, CONTEXT_K).await
    }
    .await;

    let hits = match result {
        Ok(hits) => hits,
        Err(e) => {
            warn!("Context retrieval failed: {}", e);
            return String::new();
        }
    };

    if hits.is_empty() {
        return NO_RELEVANT_INFO.to_string();
    }

    let mut context = String::new();
    for hit in &hits {
        let source = hit.source.as_deref().unwrap_or_default();
        context.push_str(&format!("[출처: {}]\n{}\n\n", source, hit.content));
    }
    context
}
