//! The thread-safe index handle and similarity scoring.
use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::config::IndexConfig;
use crate::errors::{Result, SimtextError};
use crate::guard::RepetitionGuard;
use crate::index::{Candidate, IndexStats, InvertedIndex};
use crate::kmer::{KmerExtractor, Kmers, Sliding};

/// Outcome of adding a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddStatus {
    /// The document was indexed.
    Added,
    /// The identifier is already indexed; nothing changed.
    AlreadyPresent,
    /// The text was rejected by the [`RepetitionGuard`]; nothing changed.
    Repetitive,
}

impl AddStatus {
    /// Checks if the document was indexed.
    pub const fn is_added(self) -> bool {
        matches!(self, Self::Added)
    }

    /// Checks if the document was rejected as repetitive.
    pub const fn is_repetitive(self) -> bool {
        matches!(self, Self::Repetitive)
    }
}

/// Best match returned by [`SimilarityIndex::lookup_similar`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimilarMatch {
    /// Identifier of the matched document.
    pub id: String,
    /// Similarity in `[1, 100]`.
    pub similarity: u32,
}

/// Thread-safe index answering which indexed document a text is most similar to.
///
/// Documents are stored only as tiled k-mers. A query is shingled at every offset,
/// and a document scores the larger of two containment ratios: the shared k-mers
/// against the document's distinct k-mers, and against the query's windows.
///
/// # Examples
///
/// ```
/// use simtext::{IndexConfig, SimilarityIndex};
///
/// let index = SimilarityIndex::new(IndexConfig::new(13).unwrap()).unwrap();
/// index
///     .add("fox", "The quick brown fox jumps over the lazy dog")
///     .unwrap();
///
/// let found = index.lookup_similar("the quick brown fox jumps over the lazy dog!").unwrap();
/// assert_eq!(found.id, "fox");
/// assert_eq!(found.similarity, 100);
///
/// assert!(index.lookup_similar("Lorem ipsum dolor sit amet").is_none());
/// ```
pub struct SimilarityIndex {
    config: IndexConfig,
    guard: RepetitionGuard,
    inner: RwLock<InvertedIndex>,
}

impl SimilarityIndex {
    /// Creates an empty index.
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            guard: RepetitionGuard::new(&config),
            inner: RwLock::new(InvertedIndex::new()),
        })
    }

    /// Indexes `text` under `id`, unless the text is repetitive or `id` is already indexed.
    ///
    /// An error is returned only if `id` is empty.
    pub fn add<S>(&self, id: &str, text: S) -> Result<AddStatus>
    where
        S: AsRef<str>,
    {
        check_id(id)?;
        let kmers = KmerExtractor::new(self.config).extract(text, Sliding::Tiling);
        Ok(self.admit(id, kmers))
    }

    /// Same as [`Self::add`], but returns [`AddStatus::AlreadyPresent`] for a known `id`
    /// without normalizing `text`.
    pub fn add_if_absent<S>(&self, id: &str, text: S) -> Result<AddStatus>
    where
        S: AsRef<str>,
    {
        check_id(id)?;
        if self.exists(id) {
            return Ok(AddStatus::AlreadyPresent);
        }
        self.add(id, text)
    }

    /// Indexes pairs of identifier and text, extracting k-mers in parallel.
    ///
    /// All accepted documents are inserted in input order under a single write lock.
    /// When an identifier occurs more than once, the first accepted occurrence wins.
    pub fn add_batch_in_parallel<I, S, T>(&self, documents: I) -> Result<Vec<AddStatus>>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str> + Sync,
        T: AsRef<str> + Sync,
    {
        let documents: Vec<_> = documents.into_iter().collect();
        for (id, _) in &documents {
            check_id(id.as_ref())?;
        }
        let config = self.config;
        let extracted: Vec<_> = documents
            .par_iter()
            .map_init(
                || KmerExtractor::new(config),
                |extractor, (_, text)| extractor.extract(text, Sliding::Tiling),
            )
            .collect();

        let mut statuses = vec![AddStatus::Repetitive; documents.len()];
        let mut accepted = Vec::with_capacity(documents.len());
        for (i, kmers) in extracted.into_iter().enumerate() {
            if !self.rejects(documents[i].0.as_ref(), &kmers) {
                accepted.push((i, kmers));
            }
        }

        let mut inner = self.inner.write();
        for (i, kmers) in accepted {
            let id = documents[i].0.as_ref();
            statuses[i] = if inner.contains(id) {
                AddStatus::AlreadyPresent
            } else {
                inner.insert(id, kmers);
                AddStatus::Added
            };
        }
        drop(inner);

        info!(
            documents = statuses.len(),
            added = statuses.iter().filter(|s| s.is_added()).count(),
            "indexed batch"
        );
        Ok(statuses)
    }

    /// Finds the indexed document most similar to `text`.
    ///
    /// Returns `None` if no document shares a k-mer with `text`. Among equally
    /// similar documents, the earliest indexed one is returned.
    ///
    /// Text whose padded form is shorter than the k-mer length is a single k-mer,
    /// so it only matches a document normalizing to the same characters. In particular,
    /// a query with no letters or digits matches an indexed empty document at 100.
    pub fn lookup_similar<S>(&self, text: S) -> Option<SimilarMatch>
    where
        S: AsRef<str>,
    {
        let query = KmerExtractor::new(self.config).extract(text, Sliding::Overlapping);
        let num_windows = query.num_windows();
        if num_windows == 0 {
            return None;
        }
        let candidates = self.inner.read().candidates(&query);
        best_match(&candidates, num_windows, self.config.min_match())
    }

    /// Checks if `id` is indexed.
    pub fn exists(&self, id: &str) -> bool {
        self.inner.read().contains(id)
    }

    /// Removes the document of `id`, returning `false` if it is not indexed.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.inner.write().remove(id);
        if removed {
            debug!(id, "removed document");
        }
        removed
    }

    /// Removes every document whose identifier satisfies `is_stale`, returning
    /// the number of removed documents.
    ///
    /// `is_stale` is evaluated without holding the lock, so it may call back into the index.
    pub fn remove_stale<F>(&self, mut is_stale: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let ids = self.inner.read().ids();
        let stale: Vec<_> = ids.into_iter().filter(|id| is_stale(id)).collect();
        if stale.is_empty() {
            return 0;
        }
        let mut inner = self.inner.write();
        let mut num_removed = 0;
        for id in &stale {
            if inner.remove(id) {
                num_removed += 1;
            }
        }
        drop(inner);
        info!(removed = num_removed, "removed stale documents");
        num_removed
    }

    /// Reclaims the catalog slots of removed documents, returning how many were freed.
    pub fn compact(&self) -> usize {
        let reclaimed = self.inner.write().compact();
        info!(reclaimed, "compacted catalog");
        reclaimed
    }

    /// Gets the statistics of the index.
    pub fn stats(&self) -> IndexStats {
        self.inner.read().stats()
    }

    /// Gets the number of indexed documents.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Checks if no document is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the configuration.
    pub const fn config(&self) -> IndexConfig {
        self.config
    }

    fn admit(&self, id: &str, kmers: Kmers) -> AddStatus {
        if self.rejects(id, &kmers) {
            return AddStatus::Repetitive;
        }
        let mut inner = self.inner.write();
        if inner.contains(id) {
            return AddStatus::AlreadyPresent;
        }
        let slot = inner.insert(id, kmers);
        trace!(id, slot, "added document");
        AddStatus::Added
    }

    fn rejects(&self, id: &str, kmers: &Kmers) -> bool {
        if !self.guard.is_repetitive(kmers) {
            return false;
        }
        debug!(
            id,
            distinct = kmers.num_distinct(),
            expected = self.guard.expected_distinct(kmers.normalized_len()),
            "rejected repetitive document"
        );
        true
    }
}

fn check_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(SimtextError::input("Document identifier must not be empty."));
    }
    Ok(())
}

/// Takes the larger of the two containment ratios, in percent.
fn similarity(overlap: u64, kmer_count: u32, num_windows: u64) -> u32 {
    let against_doc = if kmer_count == 0 {
        0
    } else {
        100 * overlap / u64::from(kmer_count)
    };
    let against_query = 100 * overlap / num_windows;
    against_doc.max(against_query).min(100) as u32
}

/// Picks the highest-scoring candidate. `candidates` must be sorted by slot,
/// which makes the earliest document win ties.
fn best_match(
    candidates: &[Candidate],
    num_windows: u64,
    min_match: Option<u32>,
) -> Option<SimilarMatch> {
    let mut best: Option<(&Candidate, u32)> = None;
    for candidate in candidates {
        if let Some(percent) = min_match {
            let min_common = u64::from(candidate.kmer_count) * u64::from(percent) / 100;
            if candidate.overlap < min_common {
                continue;
            }
        }
        let score = similarity(candidate.overlap, candidate.kmer_count, num_windows);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate, score));
        }
        if score == 100 {
            break;
        }
    }
    best.filter(|&(_, score)| score > 0)
        .map(|(candidate, similarity)| SimilarMatch {
            id: candidate.id.to_string(),
            similarity,
        })
}
