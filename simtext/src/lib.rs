//! Near-duplicate detection for short texts.
//!
//! Texts are normalized to lowercase letters and digits, cut into k-mers, and kept
//! in an in-memory inverted index. [`SimilarityIndex::lookup_similar`] reports the
//! indexed document a new text is most similar to, with a similarity in `[0, 100]`.
//!
//! ```
//! use simtext::{AddStatus, IndexConfig, SimilarityIndex};
//!
//! let index = SimilarityIndex::new(IndexConfig::new(13).unwrap()).unwrap();
//! let status = index
//!     .add_if_absent("fox1", "The quick brown fox jumps over the lazy dog then once again runs away")
//!     .unwrap();
//! assert_eq!(status, AddStatus::Added);
//!
//! let found = index
//!     .lookup_similar("The quick brown fox jumps over the lazy dog then once again walks away")
//!     .unwrap();
//! assert_eq!(found.id, "fox1");
//! assert!(found.similarity >= 60);
//! ```
#![deny(missing_docs)]

pub mod config;
pub mod errors;
pub mod guard;
pub mod kmer;
pub mod searcher;

mod index;
mod shingling;

pub use config::IndexConfig;
pub use errors::{Result, SimtextError};
pub use index::IndexStats;
pub use searcher::{AddStatus, SimilarMatch, SimilarityIndex};
