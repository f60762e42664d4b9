//! Memory service: validation, embedding under the call policy, persistence
//! and ranking.
//!
//! Generic over the repository so mgdi-core never depends on mgdi-infra.

use chrono::{SubsecRound, Utc};
use uuid::Uuid;

use mgdi_types::error::MemoryError;
use mgdi_types::identity::Principal;
use mgdi_types::memory::{
    MAX_SEARCH_LIMIT, MAX_TIMELINE_LIMIT, MemoryEntry, RankedMemory, SearchParams,
    StoreMemoryRequest, TimelineParams,
};

use super::box_embedder::BoxEmbedder;
use super::store::MemoryRepository;
use crate::policy::CallPolicy;

pub struct MemoryService<R: MemoryRepository> {
    repo: R,
    embedder: BoxEmbedder,
    policy: CallPolicy,
}

impl<R: MemoryRepository> MemoryService<R> {
    pub fn new(repo: R, embedder: BoxEmbedder, policy: CallPolicy) -> Self {
        Self {
            repo,
            embedder,
            policy,
        }
    }

    pub fn embedder(&self) -> &BoxEmbedder {
        &self.embedder
    }

    /// Embed and persist a new memory for `principal`.
    ///
    /// Nothing is written unless an embedding of the configured dimension
    /// was produced.
    pub async fn store(
        &self,
        principal: &Principal,
        request: StoreMemoryRequest,
    ) -> Result<MemoryEntry, MemoryError> {
        if request.content.trim().is_empty() {
            return Err(MemoryError::InvalidRequest(
                "content cannot be empty".to_string(),
            ));
        }

        let embedding = self.embed_one(&request.content).await?;

        let entry = MemoryEntry {
            id: Uuid::now_v7(),
            user_id: principal.user_id.clone(),
            content: request.content,
            embedding,
            metadata: request.metadata.unwrap_or_default(),
            // Stored with microsecond precision; keep the returned entry identical.
            created_at: Utc::now().trunc_subsecs(6),
        };

        self.repo.save(&entry).await?;

        tracing::info!(
            user_id = %principal.user_id,
            memory_id = %entry.id,
            "stored memory"
        );
        Ok(entry)
    }

    /// The caller's memories most similar to `params.query`.
    pub async fn search(
        &self,
        principal: &Principal,
        params: &SearchParams,
    ) -> Result<Vec<RankedMemory>, MemoryError> {
        if params.query.trim().is_empty() {
            return Err(MemoryError::InvalidRequest(
                "query cannot be empty".to_string(),
            ));
        }
        validate_limit(params.limit, MAX_SEARCH_LIMIT)?;
        if !params.threshold.is_finite() || !(-1.0..=1.0).contains(&params.threshold) {
            return Err(MemoryError::InvalidRequest(format!(
                "threshold must be between -1 and 1, got {}",
                params.threshold
            )));
        }

        let embedding = self.embed_one(&params.query).await?;
        let results = self
            .repo
            .search(&principal.user_id, &embedding, params.limit, params.threshold)
            .await?;

        tracing::debug!(
            user_id = %principal.user_id,
            results = results.len(),
            threshold = params.threshold,
            "memory search complete"
        );
        Ok(results)
    }

    /// The caller's most recent memories, newest first.
    pub async fn timeline(
        &self,
        principal: &Principal,
        params: &TimelineParams,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        validate_limit(params.limit, MAX_TIMELINE_LIMIT)?;
        Ok(self.repo.timeline(&principal.user_id, params.limit).await?)
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let input = vec![text.to_string()];
        let mut vectors = self
            .policy
            .run("embed", || self.embedder.embed(&input))
            .await?;

        let embedding = vectors.pop().ok_or_else(|| {
            MemoryError::Embedding(mgdi_types::error::EmbeddingError::MalformedResponse(
                "provider returned no vectors".to_string(),
            ))
        })?;

        let expected = self.embedder.dimension();
        if embedding.len() != expected {
            return Err(MemoryError::DimensionMismatch {
                expected,
                actual: embedding.len(),
            });
        }
        Ok(embedding)
    }
}

fn validate_limit(limit: u32, max: u32) -> Result<(), MemoryError> {
    if limit == 0 || limit > max {
        return Err(MemoryError::InvalidRequest(format!(
            "limit must be between 1 and {max}, got {limit}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use mgdi_types::error::{EmbeddingError, RepositoryError};
    use mgdi_types::memory::{DEFAULT_SIMILARITY_THRESHOLD, Metadata};
    use serde_json::json;

    use crate::memory::embedder::Embedder;
    use crate::memory::similarity::rank_candidates;

    /// Maps known words onto fixed axes so similarity is predictable.
    struct KeywordEmbedder {
        dimension: usize,
        calls: Arc<AtomicU32>,
        fail_with: Option<fn() -> EmbeddingError>,
    }

    impl KeywordEmbedder {
        fn new() -> Self {
            Self {
                dimension: 3,
                calls: Arc::new(AtomicU32::new(0)),
                fail_with: None,
            }
        }
    }

    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    let mut v = vec![0.0; self.dimension];
                    if t.contains("theme") {
                        v[0] = 1.0;
                    }
                    if t.contains("coffee") {
                        v[1] = 1.0;
                    }
                    if t.contains("dark") {
                        v[0] += 0.2;
                    }
                    if v.iter().all(|x| *x == 0.0) {
                        v[self.dimension - 1] = 1.0;
                    }
                    v
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "keyword"
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    #[derive(Default)]
    struct InMemoryRepo {
        entries: Mutex<Vec<MemoryEntry>>,
    }

    impl MemoryRepository for Arc<InMemoryRepo> {
        async fn save(&self, entry: &MemoryEntry) -> Result<(), RepositoryError> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn search(
            &self,
            user_id: &str,
            embedding: &[f32],
            limit: u32,
            threshold: f32,
        ) -> Result<Vec<RankedMemory>, RepositoryError> {
            let candidates: Vec<_> = self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect();
            Ok(rank_candidates(embedding, candidates, limit as usize, threshold))
        }

        async fn timeline(
            &self,
            user_id: &str,
            limit: u32,
        ) -> Result<Vec<MemoryEntry>, RepositoryError> {
            let mut entries: Vec<_> = self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect();
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            entries.truncate(limit as usize);
            Ok(entries)
        }
    }

    fn fast_policy() -> CallPolicy {
        CallPolicy {
            timeout: Duration::from_millis(200),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        }
    }

    fn service_with(embedder: KeywordEmbedder) -> (MemoryService<Arc<InMemoryRepo>>, Arc<InMemoryRepo>) {
        let repo = Arc::new(InMemoryRepo::default());
        let service = MemoryService::new(repo.clone(), BoxEmbedder::new(embedder), fast_policy());
        (service, repo)
    }

    fn store_request(content: &str) -> StoreMemoryRequest {
        StoreMemoryRequest {
            content: content.to_string(),
            metadata: None,
        }
    }

    fn search_params(query: &str) -> SearchParams {
        SearchParams {
            query: query.to_string(),
            limit: 10,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    #[tokio::test]
    async fn store_persists_entry_with_embedding() {
        let (service, repo) = service_with(KeywordEmbedder::new());
        let alice = Principal::new("alice");

        let mut metadata = Metadata::new();
        metadata.insert("type".to_string(), json!("preference"));
        let entry = service
            .store(
                &alice,
                StoreMemoryRequest {
                    content: "User prefers dark theme".to_string(),
                    metadata: Some(metadata.clone()),
                },
            )
            .await
            .unwrap();

        assert_eq!(entry.user_id, "alice");
        assert_eq!(entry.embedding.len(), 3);
        assert_eq!(entry.metadata, metadata);
        assert_eq!(repo.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn store_defaults_metadata_to_empty_object() {
        let (service, _) = service_with(KeywordEmbedder::new());
        let entry = service
            .store(&Principal::new("alice"), store_request("hello"))
            .await
            .unwrap();
        assert!(entry.metadata.is_empty());
    }

    #[tokio::test]
    async fn store_rejects_blank_content_without_embedding() {
        let embedder = KeywordEmbedder::new();
        let calls = embedder.calls.clone();
        let (service, repo) = service_with(embedder);

        let err = service
            .store(&Principal::new("alice"), store_request("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, MemoryError::InvalidRequest(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(repo.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_writes_nothing_when_embedding_fails() {
        let mut embedder = KeywordEmbedder::new();
        embedder.fail_with = Some(|| EmbeddingError::AuthenticationFailed);
        let (service, repo) = service_with(embedder);

        let err = service
            .store(&Principal::new("alice"), store_request("hello"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MemoryError::Embedding(EmbeddingError::AuthenticationFailed)
        ));
        assert!(repo.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_retries_transient_failures_then_gives_up() {
        let mut embedder = KeywordEmbedder::new();
        embedder.fail_with = Some(|| EmbeddingError::RateLimited);
        let calls = embedder.calls.clone();
        let (service, repo) = service_with(embedder);

        let err = service
            .store(&Principal::new("alice"), store_request("hello"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MemoryError::Embedding(EmbeddingError::RetriesExhausted { attempts: 3, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(repo.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_rejects_wrong_dimension() {
        let mut embedder = KeywordEmbedder::new();
        embedder.dimension = 2;
        let (service, repo) = service_with(embedder);

        let err = service
            .store(&Principal::new("alice"), store_request("theme"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MemoryError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(repo.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_finds_similar_entries_above_threshold() {
        let (service, _) = service_with(KeywordEmbedder::new());
        let alice = Principal::new("alice");
        service
            .store(&alice, store_request("User prefers dark theme"))
            .await
            .unwrap();
        service
            .store(&alice, store_request("User drinks coffee"))
            .await
            .unwrap();

        let results = service.search(&alice, &search_params("theme")).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.content, "User prefers dark theme");
        assert!(results[0].similarity > DEFAULT_SIMILARITY_THRESHOLD);
    }

    #[tokio::test]
    async fn search_is_scoped_to_principal() {
        let (service, _) = service_with(KeywordEmbedder::new());
        service
            .store(&Principal::new("alice"), store_request("theme"))
            .await
            .unwrap();

        let results = service
            .search(&Principal::new("bob"), &search_params("theme"))
            .await
            .unwrap();
        assert!(results.is_empty());

        let timeline = service
            .timeline(&Principal::new("bob"), &TimelineParams::default())
            .await
            .unwrap();
        assert!(timeline.is_empty());
    }

    #[tokio::test]
    async fn search_validates_parameters() {
        let (service, _) = service_with(KeywordEmbedder::new());
        let alice = Principal::new("alice");

        let mut params = search_params("");
        assert!(matches!(
            service.search(&alice, &params).await,
            Err(MemoryError::InvalidRequest(_))
        ));

        params = search_params("theme");
        params.limit = 0;
        assert!(service.search(&alice, &params).await.is_err());
        params.limit = MAX_SEARCH_LIMIT + 1;
        assert!(service.search(&alice, &params).await.is_err());

        params = search_params("theme");
        params.threshold = f32::NAN;
        assert!(service.search(&alice, &params).await.is_err());
        params.threshold = 1.5;
        assert!(service.search(&alice, &params).await.is_err());
    }

    #[tokio::test]
    async fn timeline_returns_newest_first_with_limit() {
        let (service, _) = service_with(KeywordEmbedder::new());
        let alice = Principal::new("alice");
        for content in ["first", "second", "third"] {
            service.store(&alice, store_request(content)).await.unwrap();
        }

        let timeline = service
            .timeline(&alice, &TimelineParams { limit: 2 })
            .await
            .unwrap();

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].content, "third");
        assert_eq!(timeline[1].content, "second");
    }

    #[tokio::test]
    async fn timeline_rejects_out_of_range_limit() {
        let (service, _) = service_with(KeywordEmbedder::new());
        let alice = Principal::new("alice");
        assert!(
            service
                .timeline(&alice, &TimelineParams { limit: 0 })
                .await
                .is_err()
        );
        assert!(
            service
                .timeline(&alice, &TimelineParams { limit: MAX_TIMELINE_LIMIT + 1 })
                .await
                .is_err()
        );
    }
}
