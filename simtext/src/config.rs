//! Construction-time settings of a [`SimilarityIndex`](crate::SimilarityIndex).
use crate::errors::{Result, SimtextError};

/// Default percentage for [`IndexConfig::repeat_threshold`].
pub const DEFAULT_REPEAT_THRESHOLD: u32 = 70;

/// Settings fixed for the lifetime of an index.
///
/// # Examples
///
/// ```
/// use simtext::IndexConfig;
///
/// let config = IndexConfig::new(13).unwrap().repeat_threshold(60);
/// assert_eq!(config.kmer_len(), 13);
/// assert_eq!(config.padding(), 7);
/// assert_eq!(config.repeat_percent(), 60);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    kmer_len: usize,
    padding_len: usize,
    repeat_threshold: u32,
    min_match_percent: Option<u32>,
}

impl IndexConfig {
    /// Creates a configuration for shingles of `kmer_len` characters
    /// (must be more than 0; values below 4 make almost everything match).
    ///
    /// The padding length defaults to `ceil(kmer_len / 2)`.
    pub fn new(kmer_len: usize) -> Result<Self> {
        if kmer_len == 0 {
            return Err(SimtextError::input("k-mer length must not be 0."));
        }
        Ok(Self {
            kmer_len,
            padding_len: (kmer_len + 1) / 2,
            repeat_threshold: DEFAULT_REPEAT_THRESHOLD,
            min_match_percent: None,
        })
    }

    /// Sets the percentage of the expected number of distinct shingles under which
    /// a document is rejected as repetitive. `0` disables the check.
    pub const fn repeat_threshold(mut self, percent: u32) -> Self {
        self.repeat_threshold = percent;
        self
    }

    /// Sets the number of sentinel characters appended to normalized text.
    pub const fn padding_len(mut self, len: usize) -> Self {
        self.padding_len = len;
        self
    }

    /// Requires a candidate to share at least `percent` of its distinct shingles
    /// with the query before it can be reported.
    pub const fn min_match_percent(mut self, percent: Option<u32>) -> Self {
        self.min_match_percent = percent;
        self
    }

    /// Gets the shingle length.
    pub const fn kmer_len(&self) -> usize {
        self.kmer_len
    }

    /// Gets the padding length.
    pub const fn padding(&self) -> usize {
        self.padding_len
    }

    /// Gets the repetition threshold in percent.
    pub const fn repeat_percent(&self) -> u32 {
        self.repeat_threshold
    }

    /// Gets the minimum-overlap filter in percent, if any.
    pub const fn min_match(&self) -> Option<u32> {
        self.min_match_percent
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.repeat_threshold > 100 {
            return Err(SimtextError::input(format!(
                "repeat threshold must be in [0,100], got {}.",
                self.repeat_threshold
            )));
        }
        if let Some(percent) = self.min_match_percent {
            if percent > 100 {
                return Err(SimtextError::input(format!(
                    "min match percent must be in [0,100], got {percent}."
                )));
            }
        }
        Ok(())
    }
}
