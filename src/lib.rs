//! An in-memory inverted index supporting boolean conjunctive (AND) search
//! over integer-identified documents and terms.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  varint.rs  │────▶│   block.rs   │────▶│   iter.rs   │
//! │ (group-     │     │ (block       │     │ (SliceIter, │
//! │  varint     │     │  builder,    │     │  BlockIter, │
//! │  codec)     │     │  compress)   │     │  Compressed │
//! │             │     │              │     │  Iter)      │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                                                  │
//!                                                  ▼
//!                                          ┌───────────────┐
//!                                          │ intersect.rs  │
//!                                          │ (pairwise AND)│
//!                                          └───────────────┘
//!                                                  │
//!                                                  ▼
//!                                          ┌───────────────┐
//!                                          │   index.rs    │
//!                                          │ (Index,       │
//!                                          │  CompressedIndex,
//!                                          │  query)       │
//!                                          └───────────────┘
//! ```
//!
//! Ingest appends document ids to an uncompressed per-term posting list
//! ([`Index::add_document`]). A one-shot [`compress`] pass re-encodes every
//! list into fixed-byte-budget, group-varint-delta blocks
//! ([`CompressedIndex`]), after which queries run against either
//! representation through the same [`PostingIterator`] contract.
//!
//! # Example
//!
//! ```
//! use postings_core::{compress, query, Index, TermId};
//! use std::collections::HashSet;
//!
//! let mut index = Index::new(HashSet::new());
//! index.add_document(&[TermId::from(1), TermId::from(2)]).unwrap();
//! index.add_document(&[TermId::from(1), TermId::from(3)]).unwrap();
//!
//! assert_eq!(query(&index, &[TermId::from(1)]).len(), 2);
//!
//! let compressed = compress(&index).unwrap();
//! assert_eq!(query(&compressed, &[TermId::from(3)]).len(), 1);
//! ```

mod block;
mod error;
mod index;
mod intersect;
mod iter;
mod types;
mod varint;

pub use block::CompressedBlock;
pub use error::PostingsError;
pub use index::{
    compress, compress_with_budget, query, AnyIter, CompressedIndex, Index, PostingsSource,
};
pub use intersect::intersect;
pub use iter::{BlockIter, CompressedIter, PostingIterator, SliceIter};
pub use types::{DocId, TermId, DEFAULT_BLOCK_BUDGET, MIN_BLOCK_BUDGET};

#[cfg(test)]
mod tests {
    //! End-to-end scenarios from `SPEC_FULL.md` §8, run against both the
    //! uncompressed and compressed index so the two representations are
    //! checked to agree on every query.

    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn t(id: u32) -> TermId {
        TermId::from(id)
    }

    fn three_doc_index() -> Index {
        let mut index = Index::new(HashSet::new());
        index.add_document(&[t(1), t(2), t(3)]).unwrap(); // doc 0
        index.add_document(&[t(1), t(2), t(4)]).unwrap(); // doc 1
        index.add_document(&[t(1), t(2), t(5)]).unwrap(); // doc 2
        index
    }

    // S1: compress -> iterate a single small posting list.
    #[test]
    fn scenario_s1_compress_then_iterate() {
        let ids = [100u32, 102, 110, 200, 500, 1000];
        let mut index = Index::new(HashSet::new());
        for &id in &ids {
            // Space out doc ids via dummy documents so add_document assigns
            // exactly the target id sequence to term 1.
            while index.doc_count() < id {
                index.add_document(&[]).unwrap();
            }
            index.add_document(&[t(1)]).unwrap();
        }
        let compressed = compress(&index).unwrap();
        let blocks = compressed.blocks(t(1));
        let got: Vec<u32> = CompressedIter::new(blocks).map(|d| d.get()).collect();
        assert_eq!(got, ids);
    }

    // S2: intersect with duplicates on both sides.
    #[test]
    fn scenario_s2_intersect_with_duplicates() {
        let a: Vec<DocId> = [1u32, 1, 2, 4, 6].into_iter().map(DocId::from).collect();
        let b: Vec<DocId> = [1u32, 1, 3, 3, 4, 6, 10]
            .into_iter()
            .map(DocId::from)
            .collect();
        let result = intersect(SliceIter::new(&a), SliceIter::new(&b));
        assert_eq!(result, vec![DocId::from(1), DocId::from(4), DocId::from(6)]);
    }

    // S3: query on a term common to every document.
    #[test]
    fn scenario_s3_query_common_term() {
        let index = three_doc_index();
        assert_eq!(
            query(&index, &[t(2)]),
            vec![DocId::from(0), DocId::from(1), DocId::from(2)]
        );
    }

    // S4: query on a term unique to one document.
    #[test]
    fn scenario_s4_query_unique_term() {
        let index = three_doc_index();
        assert_eq!(query(&index, &[t(3)]), vec![DocId::from(0)]);
    }

    // S5: conjunctive query across two terms.
    #[test]
    fn scenario_s5_query_conjunction() {
        let index = three_doc_index();
        assert_eq!(query(&index, &[t(1), t(4)]), vec![DocId::from(1)]);
    }

    // S6: random large strictly-increasing sequence, compressed vs uncompressed.
    #[test]
    fn scenario_s6_random_sequence_compressed_matches_uncompressed() {
        // Deterministic xorshift so the test is reproducible without an
        // external randomness dependency.
        let mut state: u64 = 0x9E3779B97F4A7C15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        let mut doc = 0u32;
        let ids: Vec<DocId> = (0..4096)
            .map(|_| {
                doc += 1 + (next() % 255) as u32;
                DocId::from(doc)
            })
            .collect();

        let blocks = block::compress_list(&ids, DEFAULT_BLOCK_BUDGET).unwrap();
        let compressed: Vec<DocId> = CompressedIter::new(&blocks).collect();
        assert_eq!(compressed, ids);

        let mut slice_it = SliceIter::new(&ids);
        let mut comp_it = CompressedIter::new(&blocks);
        loop {
            assert_eq!(
                PostingIterator::end(&slice_it),
                PostingIterator::end(&comp_it)
            );
            if PostingIterator::end(&slice_it) {
                break;
            }
            assert_eq!(PostingIterator::at(&slice_it), PostingIterator::at(&comp_it));
            PostingIterator::next(&mut slice_it);
            PostingIterator::next(&mut comp_it);
        }
    }

    #[test]
    fn query_is_empty_for_documents_whose_terms_differ() {
        let index = three_doc_index();
        assert_eq!(query(&index, &[t(1), t(2), t(3), t(4)]), Vec::<DocId>::new());
    }

    fn term_id_strategy() -> impl Strategy<Value = u32> {
        0u32..20
    }

    fn doc_strategy() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(term_id_strategy(), 0..6).prop_map(|mut v| {
            v.sort_unstable();
            v.dedup();
            v
        })
    }

    proptest! {
        // Invariant 5 (`SPEC_FULL.md` §8): query(T) equals the documents
        // whose term set is a superset of T, computed independently by a
        // brute-force oracle.
        #[test]
        fn query_matches_brute_force_oracle(
            docs in prop::collection::vec(doc_strategy(), 0..12),
            query_terms in prop::collection::vec(term_id_strategy(), 1..3),
        ) {
            let mut index = Index::new(HashSet::new());
            for terms in &docs {
                let term_ids: Vec<TermId> = terms.iter().copied().map(TermId::from).collect();
                index.add_document(&term_ids).unwrap();
            }

            let q: Vec<TermId> = query_terms.iter().copied().map(TermId::from).collect();
            let result = query(&index, &q);

            let expected: Vec<DocId> = docs
                .iter()
                .enumerate()
                .filter(|(_, terms)| query_terms.iter().all(|q| terms.contains(q)))
                .map(|(i, _)| DocId::from(i as u32))
                .collect();

            prop_assert_eq!(result, expected);
        }

        // Invariant 6: uncompressed and compressed iterators over the same
        // list agree at every step.
        #[test]
        fn compressed_and_uncompressed_iterators_agree(
            deltas in prop::collection::vec(1u32..300, 1..500),
        ) {
            let mut doc = 0u32;
            let ids: Vec<DocId> = deltas
                .into_iter()
                .map(|d| {
                    doc += d;
                    DocId::from(doc)
                })
                .collect();

            let blocks = block::compress_list(&ids, DEFAULT_BLOCK_BUDGET).unwrap();
            let compressed: Vec<DocId> = CompressedIter::new(&blocks).collect();
            prop_assert_eq!(compressed, ids);
        }

        // Invariant 3: after advance(target), either at end or at() >= target.
        #[test]
        fn advance_lands_at_or_past_target(
            deltas in prop::collection::vec(1u32..50, 1..200),
            target_offset in 0u32..5000,
        ) {
            let mut doc = 0u32;
            let ids: Vec<DocId> = deltas
                .into_iter()
                .map(|d| {
                    doc += d;
                    DocId::from(doc)
                })
                .collect();
            let target = DocId::from(target_offset);

            let mut slice_it = SliceIter::new(&ids);
            let slice_ok = PostingIterator::advance(&mut slice_it, target);
            if slice_ok {
                prop_assert!(PostingIterator::at(&slice_it) >= target);
            }

            let blocks = block::compress_list(&ids, DEFAULT_BLOCK_BUDGET).unwrap();
            let mut comp_it = CompressedIter::new(&blocks);
            let comp_ok = PostingIterator::advance(&mut comp_it, target);
            prop_assert_eq!(slice_ok, comp_ok);
            if comp_ok {
                prop_assert!(PostingIterator::at(&comp_it) >= target);
            }
        }

        // Invariant 4: intersection is commutative and duplicate-tolerant.
        #[test]
        fn intersect_is_commutative_and_exact(
            mut a in prop::collection::vec(0u32..200, 0..100),
            mut b in prop::collection::vec(0u32..200, 0..100),
        ) {
            a.sort_unstable();
            b.sort_unstable();
            let a_ids: Vec<DocId> = a.iter().copied().map(DocId::from).collect();
            let b_ids: Vec<DocId> = b.iter().copied().map(DocId::from).collect();

            let ab = intersect(SliceIter::new(&a_ids), SliceIter::new(&b_ids));
            let ba = intersect(SliceIter::new(&b_ids), SliceIter::new(&a_ids));
            prop_assert_eq!(&ab, &ba);

            let a_set: HashSet<u32> = a.iter().copied().collect();
            let b_set: HashSet<u32> = b.iter().copied().collect();
            let mut expected: Vec<u32> = a_set.intersection(&b_set).copied().collect();
            expected.sort_unstable();
            let got: Vec<u32> = ab.iter().map(|d| d.get()).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
