//! Text normalization and k-mer extraction.
use hashbrown::HashMap;

use crate::config::IndexConfig;
use crate::shingling::ShingleIter;

/// Sentinel appended to normalized text. Never survives normalization.
pub const PAD_CHAR: char = '$';

/// How consecutive windows are placed over the normalized text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sliding {
    /// A window at every character offset. Used for queries.
    Overlapping,
    /// Windows spaced by the k-mer length. Used when indexing.
    Tiling,
}

/// Bag of k-mers with their multiplicities.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Kmers {
    counts: HashMap<String, u32>,
    normalized_len: usize,
}

impl Kmers {
    /// Gets the number of characters left after normalization, without padding.
    pub const fn normalized_len(&self) -> usize {
        self.normalized_len
    }

    /// Gets the number of distinct k-mers.
    pub fn num_distinct(&self) -> usize {
        self.counts.len()
    }

    /// Gets the number of windows, i.e., the sum of all multiplicities.
    pub fn num_windows(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    /// Gets the multiplicity of `kmer`.
    pub fn count(&self, kmer: &str) -> u32 {
        self.counts.get(kmer).copied().unwrap_or(0)
    }

    /// Iterates over `(k-mer, multiplicity)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(k, &c)| (k.as_str(), c))
    }

    pub(crate) fn into_counts(self) -> HashMap<String, u32> {
        self.counts
    }
}

/// Converts text into [`Kmers`], reusing its character buffer between calls.
///
/// # Examples
///
/// ```
/// use simtext::kmer::{KmerExtractor, Sliding};
/// use simtext::IndexConfig;
///
/// let mut extractor = KmerExtractor::new(IndexConfig::new(4).unwrap());
/// let kmers = extractor.extract("Hello, World!", Sliding::Tiling);
/// assert_eq!(kmers.normalized_len(), 10);
/// assert_eq!(kmers.count("hell"), 1);
/// assert_eq!(kmers.count("owor"), 1);
/// assert_eq!(kmers.count("ld$$"), 1);
/// ```
pub struct KmerExtractor {
    config: IndexConfig,
    chars: Vec<char>,
}

impl KmerExtractor {
    /// Creates an extractor using the k-mer and padding lengths of `config`.
    pub const fn new(config: IndexConfig) -> Self {
        Self {
            config,
            chars: vec![],
        }
    }

    /// Normalizes `text` and counts its k-mers.
    ///
    /// Text whose padded form is shorter than the k-mer length yields exactly one
    /// shorter k-mer, so even the empty string produces one.
    pub fn extract<S>(&mut self, text: S, sliding: Sliding) -> Kmers
    where
        S: AsRef<str>,
    {
        self.normalize(text.as_ref());
        let normalized_len = self.chars.len();
        self.chars
            .extend(std::iter::repeat(PAD_CHAR).take(self.config.padding()));

        let k = self.config.kmer_len();
        let step = match sliding {
            Sliding::Overlapping => 1,
            Sliding::Tiling => k,
        };

        let mut counts = HashMap::new();
        if self.chars.len() < k {
            if !self.chars.is_empty() {
                counts.insert(self.chars.iter().collect(), 1);
            }
        } else {
            for window in ShingleIter::new(&self.chars, k, step) {
                bump(counts.entry(window.iter().collect()).or_insert(0));
            }
        }
        Kmers {
            counts,
            normalized_len,
        }
    }

    fn normalize(&mut self, text: &str) {
        self.chars.clear();
        self.chars.extend(
            text.chars()
                .flat_map(char::to_lowercase)
                .filter(|c| c.is_alphanumeric()),
        );
    }
}

/// Increments a multiplicity, saturating at `u32::MAX`.
#[inline(always)]
fn bump(count: &mut u32) {
    *count = count.saturating_add(1);
}

/// Converts a length into a `u32` count, saturating at `u32::MAX`.
#[inline(always)]
pub(crate) fn saturating_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(k: usize) -> KmerExtractor {
        KmerExtractor::new(IndexConfig::new(k).unwrap())
    }

    #[test]
    fn test_normalization() {
        let mut extractor = extractor(3);
        let kmers = extractor.extract("A-b, C!\td?", Sliding::Tiling);
        assert_eq!(kmers.normalized_len(), 4);
        assert_eq!(kmers.count("abc"), 1);
        assert_eq!(kmers.count("d$$"), 1);
        assert_eq!(kmers.num_distinct(), 2);
    }

    #[test]
    fn test_unicode_letters_and_digits() {
        let mut extractor = extractor(4);
        let kmers = extractor.extract("Ärger №5 über ½", Sliding::Tiling);
        // '№' is a symbol; '½' is numeric.
        assert_eq!(kmers.normalized_len(), 11);
        assert_eq!(kmers.count("ärge"), 1);
        assert_eq!(kmers.count("r5üb"), 1);
        assert_eq!(kmers.count("er½$"), 1);
    }

    #[test]
    fn test_overlapping() {
        let mut extractor = extractor(4);
        let kmers = extractor.extract("abab ab", Sliding::Overlapping);
        // "ababab$$"
        assert_eq!(kmers.count("abab"), 2);
        assert_eq!(kmers.count("baba"), 1);
        assert_eq!(kmers.count("bab$"), 1);
        assert_eq!(kmers.count("ab$$"), 1);
        assert_eq!(kmers.num_distinct(), 4);
        assert_eq!(kmers.num_windows(), 5);
    }

    #[test]
    fn test_tiling_counts_repeats() {
        let mut extractor = extractor(2);
        let kmers = extractor.extract("xyxyxy", Sliding::Tiling);
        assert_eq!(kmers.count("xy"), 3);
        assert_eq!(kmers.count("$"), 0);
        assert_eq!(kmers.num_distinct(), 1);
    }

    #[test]
    fn test_empty_text_yields_padding() {
        let mut extractor = extractor(13);
        let kmers = extractor.extract("", Sliding::Overlapping);
        assert_eq!(kmers.normalized_len(), 0);
        assert_eq!(kmers.num_distinct(), 1);
        assert_eq!(kmers.count("$$$$$$$"), 1);

        let kmers = extractor.extract("?! ...", Sliding::Tiling);
        assert_eq!(kmers.normalized_len(), 0);
        assert_eq!(kmers.count("$$$$$$$"), 1);
    }

    #[test]
    fn test_short_text_single_kmer() {
        let mut extractor = extractor(13);
        let kmers = extractor.extract("Hi!", Sliding::Overlapping);
        assert_eq!(kmers.normalized_len(), 2);
        assert_eq!(kmers.num_distinct(), 1);
        assert_eq!(kmers.count("hi$$$$$$$"), 1);

        // Just long enough for two windows.
        let kmers = extractor.extract("Hi there", Sliding::Overlapping);
        assert_eq!(kmers.count("hithere$$$$$$"), 1);
        assert_eq!(kmers.count("ithere$$$$$$$"), 1);
        assert_eq!(kmers.num_windows(), 2);
    }

    #[test]
    fn test_zero_padding() {
        let config = IndexConfig::new(3).unwrap().padding_len(0);
        let mut extractor = KmerExtractor::new(config);
        assert_eq!(extractor.extract("", Sliding::Tiling).num_distinct(), 0);
        let kmers = extractor.extract("abcd", Sliding::Tiling);
        assert_eq!(kmers.count("abc"), 1);
        assert_eq!(kmers.num_distinct(), 1);
    }

    #[test]
    fn test_counts_saturate() {
        let mut count = u32::MAX - 1;
        bump(&mut count);
        assert_eq!(count, u32::MAX);
        bump(&mut count);
        assert_eq!(count, u32::MAX);

        assert_eq!(saturating_count(7), 7);
        assert_eq!(saturating_count(u32::MAX as usize), u32::MAX);
        assert_eq!(saturating_count(usize::MAX), u32::MAX);
    }

    #[test]
    fn test_buffer_reuse() {
        let mut extractor = extractor(3);
        let first = extractor.extract("long text comes first", Sliding::Tiling);
        let second = extractor.extract("ab", Sliding::Tiling);
        assert_eq!(second.normalized_len(), 2);
        assert_eq!(second.count("ab$"), 1);
        assert_ne!(first, second);
    }
}
