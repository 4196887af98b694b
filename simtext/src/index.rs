//! Inverted index from k-mers to documents, and the document catalog.
//!
//! Nothing here is synchronized; [`SimilarityIndex`](crate::SimilarityIndex) wraps
//! [`InvertedIndex`] in a lock.
use std::sync::Arc;

use hashbrown::HashMap;

use crate::kmer::{saturating_count, Kmers};

/// Position of a document in the catalog. Slot 0 is a sentinel that never matches.
pub(crate) type Slot = usize;

#[derive(Clone, Debug)]
struct DocRecord {
    id: Arc<str>,
    kmer_count: u32,
}

/// A document sharing at least one k-mer with a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub slot: Slot,
    pub id: Arc<str>,
    pub kmer_count: u32,
    pub overlap: u64,
}

/// Summary of the contents of an index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of live documents.
    pub document_count: usize,
    /// Number of distinct k-mers referenced by live documents.
    pub distinct_shingle_count: usize,
    /// Number of catalog slots, including the sentinel and dead ones.
    pub slot_count: usize,
    /// Number of slots left behind by removed documents.
    pub dead_slot_count: usize,
}

pub(crate) struct InvertedIndex {
    postings: HashMap<String, HashMap<Slot, u32>>,
    catalog: Vec<Option<DocRecord>>,
    ids: HashMap<Arc<str>, Slot>,
    num_dead: usize,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self {
            postings: HashMap::new(),
            catalog: vec![None],
            ids: HashMap::new(),
            num_dead: 0,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Appends a document. The caller guarantees `id` is not live.
    pub fn insert(&mut self, id: &str, kmers: Kmers) -> Slot {
        debug_assert!(!self.contains(id));
        let slot = self.catalog.len();
        let counts = kmers.into_counts();
        let kmer_count = saturating_count(counts.len());
        for (kmer, count) in counts {
            self.postings.entry(kmer).or_default().insert(slot, count);
        }
        let id: Arc<str> = Arc::from(id);
        self.catalog.push(Some(DocRecord {
            id: id.clone(),
            kmer_count,
        }));
        self.ids.insert(id, slot);
        slot
    }

    /// Detaches `id` from every bucket and tombstones its slot.
    pub fn remove(&mut self, id: &str) -> bool {
        let slot = match self.ids.remove(id) {
            Some(slot) => slot,
            None => return false,
        };
        self.postings.retain(|_, bucket| {
            bucket.remove(&slot);
            !bucket.is_empty()
        });
        self.catalog[slot] = None;
        self.num_dead += 1;
        true
    }

    /// Accumulates `min(query count, document count)` over all shared k-mers,
    /// returning candidates sorted by slot.
    pub fn candidates(&self, query: &Kmers) -> Vec<Candidate> {
        let mut overlaps: HashMap<Slot, u64> = HashMap::new();
        for (kmer, query_count) in query.iter() {
            if let Some(bucket) = self.postings.get(kmer) {
                for (&slot, &doc_count) in bucket {
                    *overlaps.entry(slot).or_insert(0) += u64::from(query_count.min(doc_count));
                }
            }
        }
        let mut candidates: Vec<_> = overlaps
            .into_iter()
            .filter_map(|(slot, overlap)| {
                self.catalog[slot].as_ref().map(|doc| Candidate {
                    slot,
                    id: doc.id.clone(),
                    kmer_count: doc.kmer_count,
                    overlap,
                })
            })
            .collect();
        candidates.sort_unstable_by_key(|c| c.slot);
        candidates
    }

    /// Gets the live identifiers in arbitrary order.
    pub fn ids(&self) -> Vec<Arc<str>> {
        self.ids.keys().cloned().collect()
    }

    /// Renumbers live documents densely, keeping their relative order, and
    /// returns the number of dead slots reclaimed.
    pub fn compact(&mut self) -> usize {
        if self.num_dead == 0 {
            return 0;
        }
        let mut remap = vec![0; self.catalog.len()];
        let mut catalog = Vec::with_capacity(self.catalog.len() - self.num_dead);
        catalog.push(None);
        for (old, doc) in self.catalog.drain(..).enumerate().skip(1) {
            if let Some(doc) = doc {
                let new = catalog.len();
                remap[old] = new;
                self.ids.insert(doc.id.clone(), new);
                catalog.push(Some(doc));
            }
        }
        for bucket in self.postings.values_mut() {
            *bucket = bucket
                .drain()
                .map(|(slot, count)| (remap[slot], count))
                .collect();
        }
        self.catalog = catalog;
        std::mem::replace(&mut self.num_dead, 0)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            document_count: self.ids.len(),
            distinct_shingle_count: self.postings.len(),
            slot_count: self.catalog.len(),
            dead_slot_count: self.num_dead,
        }
    }

    #[cfg(test)]
    fn slot_of(&self, id: &str) -> Option<Slot> {
        self.ids.get(id).copied()
    }

    #[cfg(test)]
    fn bucket(&self, kmer: &str) -> Option<&HashMap<Slot, u32>> {
        self.postings.get(kmer)
    }
}
