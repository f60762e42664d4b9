//! Cosine ranking shared by every memory repository.
//!
//! Similarity is `1 - cosine_distance`, i.e. plain cosine similarity, so it
//! always lies in `[-1, 1]`.

use std::cmp::Ordering;

use mgdi_types::memory::{MemoryEntry, RankedMemory};

/// Cosine similarity of two equal-length vectors.
///
/// Returns 0.0 when either vector has zero norm. The result is clamped to
/// `[-1, 1]` to absorb floating point drift.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Score `candidates` against `query`, keep those strictly above `threshold`
/// and return at most `limit` of them, best first.
///
/// Ties on similarity fall back to newest first, then to the larger id.
/// Candidates whose dimension differs from the query are skipped.
pub fn rank_candidates(
    query: &[f32],
    candidates: Vec<MemoryEntry>,
    limit: usize,
    threshold: f32,
) -> Vec<RankedMemory> {
    let mut ranked: Vec<RankedMemory> = candidates
        .into_iter()
        .filter_map(|entry| {
            if entry.embedding.len() != query.len() {
                tracing::warn!(
                    memory_id = %entry.id,
                    expected = query.len(),
                    actual = entry.embedding.len(),
                    "skipping memory with mismatched embedding dimension"
                );
                return None;
            }
            let similarity = cosine_similarity(query, &entry.embedding);
            (similarity > threshold).then_some(RankedMemory { entry, similarity })
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked.truncate(limit);
    ranked
}

fn compare_ranked(a: &RankedMemory, b: &RankedMemory) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| b.entry.created_at.cmp(&a.entry.created_at))
        .then_with(|| b.entry.id.cmp(&a.entry.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use mgdi_types::memory::Metadata;
    use uuid::Uuid;

    fn entry(embedding: Vec<f32>, age_secs: i64) -> MemoryEntry {
        MemoryEntry {
            id: Uuid::now_v7(),
            user_id: "alice".to_string(),
            content: format!("memory {age_secs}"),
            embedding,
            metadata: Metadata::new(),
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn cosine_similarity_identical() {
        let v = vec![0.3, -0.2, 0.9];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_ignores_magnitude() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![2.0, 4.0, 6.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_similarity_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_similarity_zero_vector_is_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&a, &a), 0.0);
    }

    #[test]
    fn rank_orders_by_similarity_and_applies_threshold() {
        let query = vec![1.0, 0.0];
        let exact = entry(vec![1.0, 0.0], 30);
        let close = entry(vec![0.9, 0.1], 20);
        let far = entry(vec![0.0, 1.0], 10);

        let ranked = rank_candidates(
            &query,
            vec![far.clone(), close.clone(), exact.clone()],
            10,
            0.5,
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].entry.id, exact.id);
        assert_eq!(ranked[1].entry.id, close.id);
        assert!(ranked.iter().all(|r| r.similarity > 0.5));
    }

    #[test]
    fn rank_threshold_is_strict() {
        let query = vec![1.0, 0.0];
        let orthogonal = entry(vec![0.0, 1.0], 0);
        let ranked = rank_candidates(&query, vec![orthogonal], 10, 0.0);
        assert!(ranked.is_empty());
    }

    #[test]
    fn rank_threshold_of_minus_one_keeps_all_but_opposite() {
        let query = vec![1.0, 0.0];
        let opposite = entry(vec![-1.0, 0.0], 0);
        let orthogonal = entry(vec![0.0, 1.0], 1);
        let ranked = rank_candidates(&query, vec![opposite, orthogonal.clone()], 10, -1.0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].entry.id, orthogonal.id);
    }

    #[test]
    fn rank_ties_prefer_newest() {
        let query = vec![1.0, 0.0];
        let older = entry(vec![2.0, 0.0], 60);
        let newer = entry(vec![1.0, 0.0], 5);
        let ranked = rank_candidates(&query, vec![older.clone(), newer.clone()], 10, 0.0);
        assert_eq!(ranked[0].entry.id, newer.id);
        assert_eq!(ranked[1].entry.id, older.id);
    }

    #[test]
    fn rank_truncates_to_limit() {
        let query = vec![1.0, 0.0];
        let candidates: Vec<_> = (0..5).map(|i| entry(vec![1.0, 0.0], i)).collect();
        let ranked = rank_candidates(&query, candidates, 3, 0.5);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn rank_skips_mismatched_dimensions() {
        let query = vec![1.0, 0.0];
        let good = entry(vec![1.0, 0.0], 0);
        let bad = entry(vec![1.0, 0.0, 0.0], 0);
        let ranked = rank_candidates(&query, vec![bad, good.clone()], 10, 0.5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].entry.id, good.id);
    }

    #[test]
    fn rank_empty_candidates() {
        assert!(rank_candidates(&[1.0], Vec::new(), 10, 0.8).is_empty());
    }
}
