//! The persistent fact store.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use factotum_core::error::MemoryError;

use crate::encoder::FactEncoder;

/// One stored fact with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MemoryEntry {
    fact: String,
    embedding: Vec<f32>,
    stored_at: String,
}

/// Result of a `remember` call.
#[derive(Debug, Clone, PartialEq)]
pub enum RememberOutcome {
    /// The fact was new and has been persisted.
    Stored,
    /// A near-duplicate already exists; nothing was written.
    Skipped { existing: String, similarity: f32 },
}

/// A candidate match returned by `forget` preview mode.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMatch {
    pub fact: String,
    pub similarity: f32,
}

/// Result of a `forget` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ForgetOutcome {
    /// No stored fact cleared the similarity threshold.
    NotFound,
    /// Preview only: these entries would be deleted on confirm.
    Preview(Vec<MemoryMatch>),
    /// Confirmed: these facts were removed from storage.
    Deleted(Vec<String>),
}

/// Semantic long-term memory with similarity-based dedup and retrieval.
///
/// Entries are keyed by a SHA-256 hash of the fact text, so storing the same
/// literal text twice is idempotent at the storage level; near-duplicates
/// with different wording are caught by the similarity check instead.
///
/// The store assumes a single writer. Duplicate detection is check-then-
/// insert, which is not atomic; callers introducing concurrency must
/// serialize writes externally.
pub struct SemanticMemory {
    path: PathBuf,
    encoder: FactEncoder,
    similarity_threshold: f32,
    entries: HashMap<String, MemoryEntry>,
}

impl SemanticMemory {
    /// Open (or create) a store at `path`, loading any existing entries.
    pub fn open(
        path: impl Into<PathBuf>,
        embedding_dim: usize,
        similarity_threshold: f32,
    ) -> Self {
        let path = path.into();
        let entries = Self::load_entries(&path).unwrap_or_default();
        Self {
            path,
            encoder: FactEncoder::new(embedding_dim),
            similarity_threshold,
            entries,
        }
    }

    fn load_entries(path: &PathBuf) -> Option<HashMap<String, MemoryEntry>> {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<HashMap<String, MemoryEntry>>(&contents) {
                Ok(entries) => {
                    tracing::debug!(path = ?path, facts = entries.len(), "Loaded memory store");
                    Some(entries)
                }
                Err(e) => {
                    tracing::error!(
                        path = ?path,
                        error = %e,
                        "Failed to parse memory store JSON, starting fresh"
                    );
                    if let Some(parent) = path.parent() {
                        let backup = parent.join(format!(
                            "{}.corrupted.{}",
                            path.file_name().unwrap_or_default().to_string_lossy(),
                            chrono::Utc::now().timestamp()
                        ));
                        let _ = fs::copy(path, backup);
                    }
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?path, "Memory store file not found, starting fresh");
                None
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to read memory store");
                None
            }
        }
    }

    fn persist(&self) -> Result<(), MemoryError> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| MemoryError::Serialization(e.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json).map_err(|e| {
            MemoryError::Io(format!("failed to write {}: {e}", tmp_path.display()))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            MemoryError::Io(format!(
                "failed to rename {} to {}: {e}",
                tmp_path.display(),
                self.path.display()
            ))
        })?;

        tracing::debug!(path = ?self.path, facts = self.entries.len(), "Persisted memory store");
        Ok(())
    }

    fn content_key(fact: &str) -> String {
        let digest = Sha256::digest(fact.as_bytes());
        format!("{digest:x}")
    }

    /// Entries ranked by similarity to `embedding`, most similar first.
    fn ranked(&self, embedding: &[f32]) -> Vec<(&MemoryEntry, f32)> {
        let mut scored: Vec<(&MemoryEntry, f32)> = self
            .entries
            .values()
            .map(|entry| {
                let similarity = self.encoder.cosine_similarity(embedding, &entry.embedding);
                (entry, similarity)
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }

    /// Store a fact unless a semantically near-duplicate already exists.
    pub fn remember(&mut self, fact: &str) -> Result<RememberOutcome, MemoryError> {
        let embedding = self.encoder.encode(fact);

        if let Some((entry, similarity)) = self.ranked(&embedding).into_iter().next()
            && similarity >= self.similarity_threshold
        {
            tracing::debug!(similarity, existing = %entry.fact, "Skipping near-duplicate fact");
            return Ok(RememberOutcome::Skipped {
                existing: entry.fact.clone(),
                similarity,
            });
        }

        self.entries.insert(
            Self::content_key(fact),
            MemoryEntry {
                fact: fact.to_string(),
                embedding,
                stored_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        self.persist()?;
        Ok(RememberOutcome::Stored)
    }

    /// Facts most similar to `query`, most similar first.
    ///
    /// Never fails: an empty store, or any internal problem, yields an empty
    /// vec. A memory hiccup must not block the primary conversation.
    pub fn recall(&self, query: &str, top_n: usize) -> Vec<String> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        let embedding = self.encoder.encode(query);
        self.ranked(&embedding)
            .into_iter()
            .take(top_n)
            .map(|(entry, _)| entry.fact.clone())
            .collect()
    }

    /// Search for facts similar to `fact` and optionally delete them.
    ///
    /// With `confirm` false this only previews candidate matches; with
    /// `confirm` true every match at or above `threshold` (capped at
    /// `top_n` candidates) is deleted and reported.
    pub fn forget(
        &mut self,
        fact: &str,
        confirm: bool,
        threshold: f32,
        top_n: usize,
    ) -> Result<ForgetOutcome, MemoryError> {
        let embedding = self.encoder.encode(fact);
        let matches: Vec<MemoryMatch> = self
            .ranked(&embedding)
            .into_iter()
            .take(top_n)
            .filter(|(_, similarity)| *similarity >= threshold)
            .map(|(entry, similarity)| MemoryMatch {
                fact: entry.fact.clone(),
                similarity,
            })
            .collect();

        if matches.is_empty() {
            return Ok(ForgetOutcome::NotFound);
        }

        if !confirm {
            return Ok(ForgetOutcome::Preview(matches));
        }

        let mut deleted = Vec::with_capacity(matches.len());
        for matched in &matches {
            let key = Self::content_key(&matched.fact);
            if self.entries.remove(&key).is_some() {
                deleted.push(matched.fact.clone());
            }
        }
        self.persist()?;
        tracing::info!(count = deleted.len(), "Deleted facts from memory");
        Ok(ForgetOutcome::Deleted(deleted))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> SemanticMemory {
        SemanticMemory::open(dir.path().join("memory.json"), 64, 0.85)
    }

    #[test]
    fn remember_then_duplicate_is_skipped() {
        let dir = tempdir().unwrap();
        let mut memory = store_in(&dir);

        assert_eq!(
            memory.remember("the user prefers dark mode").unwrap(),
            RememberOutcome::Stored
        );
        // Identical text has similarity 1.0 against itself.
        match memory.remember("the user prefers dark mode").unwrap() {
            RememberOutcome::Skipped { similarity, .. } => assert!(similarity >= 0.85),
            other => panic!("expected Skipped, got {other:?}"),
        }
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn recall_on_empty_store_returns_empty() {
        let dir = tempdir().unwrap();
        let memory = store_in(&dir);
        assert!(memory.recall("anything", 3).is_empty());
    }

    #[test]
    fn recall_orders_most_similar_first() {
        let dir = tempdir().unwrap();
        let mut memory = store_in(&dir);
        memory.remember("fact alpha").unwrap();
        memory.remember("fact beta").unwrap();
        memory.remember("completely unrelated gamma text").unwrap();

        let recalled = memory.recall("fact alpha", 2);
        assert_eq!(recalled.len(), 2);
        assert_eq!(recalled[0], "fact alpha");
    }

    #[test]
    fn forget_preview_does_not_delete() {
        let dir = tempdir().unwrap();
        let mut memory = store_in(&dir);
        memory.remember("remember the milk").unwrap();

        match memory.forget("remember the milk", false, 0.85, 3).unwrap() {
            ForgetOutcome::Preview(matches) => {
                assert_eq!(matches.len(), 1);
                assert_eq!(matches[0].fact, "remember the milk");
            }
            other => panic!("expected Preview, got {other:?}"),
        }
        assert_eq!(memory.len(), 1);

        match memory.forget("remember the milk", true, 0.85, 3).unwrap() {
            ForgetOutcome::Deleted(facts) => assert_eq!(facts, vec!["remember the milk"]),
            other => panic!("expected Deleted, got {other:?}"),
        }
        assert!(memory.is_empty());
    }

    #[test]
    fn forget_below_threshold_reports_not_found() {
        let dir = tempdir().unwrap();
        let mut memory = store_in(&dir);
        memory.remember("a fact about databases").unwrap();

        let outcome = memory
            .forget("entirely different subject matter", true, 0.99, 3)
            .unwrap();
        assert_eq!(outcome, ForgetOutcome::NotFound);
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory.json");
        {
            let mut memory = SemanticMemory::open(&path, 64, 0.85);
            memory.remember("persistent fact").unwrap();
        }
        let memory = SemanticMemory::open(&path, 64, 0.85);
        assert_eq!(memory.recall("persistent fact", 1), vec!["persistent fact"]);
    }

    #[test]
    fn corrupted_store_starts_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memory.json");
        fs::write(&path, "{ not json").unwrap();

        let memory = SemanticMemory::open(&path, 64, 0.85);
        assert!(memory.is_empty());
    }
}
