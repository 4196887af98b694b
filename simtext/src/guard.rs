//! Rejection of degenerate, highly repetitive documents.
use crate::config::IndexConfig;
use crate::kmer::Kmers;

/// Decides whether tiled k-mers of a document are too repetitive to index.
///
/// Text of length `L` tiled with step `k` yields close to `L / k` distinct k-mers
/// unless it repeats itself. A document is rejected when it has fewer than
/// `threshold` percent of that.
#[derive(Clone, Copy, Debug)]
pub struct RepetitionGuard {
    kmer_len: usize,
    threshold: u32,
}

impl RepetitionGuard {
    /// Creates a guard from the k-mer length and threshold of `config`.
    pub const fn new(config: &IndexConfig) -> Self {
        Self {
            kmer_len: config.kmer_len(),
            threshold: config.repeat_percent(),
        }
    }

    /// Gets the minimum number of distinct k-mers for text of `normalized_len` chars.
    pub const fn expected_distinct(&self, normalized_len: usize) -> usize {
        (normalized_len / self.kmer_len) * self.threshold as usize / 100
    }

    /// Checks if `kmers` (extracted with [`Sliding::Tiling`](crate::kmer::Sliding::Tiling))
    /// should be rejected.
    pub fn is_repetitive(&self, kmers: &Kmers) -> bool {
        kmers.num_distinct() < self.expected_distinct(kmers.normalized_len())
    }
}
