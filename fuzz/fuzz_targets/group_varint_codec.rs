#![no_main]

//! Fuzz target for the group-varint block codec.
//!
//! Drives arbitrary gap sequences and block budgets through
//! `compress_with_budget` and checks that iterating the compressed blocks
//! reproduces the original document id sequence exactly and never panics.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use postings_core::{compress_with_budget, CompressedIter, DocId, Index, TermId, MIN_BLOCK_BUDGET};
use std::collections::HashSet;

#[derive(Debug, Arbitrary)]
struct Input {
    gaps: Vec<u16>,
    budget: u16,
}

fuzz_target!(|input: Input| {
    if input.gaps.is_empty() {
        return;
    }

    let budget = MIN_BLOCK_BUDGET + input.budget as usize;

    let mut doc = 0u32;
    let ids: Vec<DocId> = input
        .gaps
        .iter()
        .map(|&gap| {
            doc = doc.saturating_add(1 + u32::from(gap));
            DocId::from(doc)
        })
        .collect();

    let mut index = Index::new(HashSet::new());
    for &id in &ids {
        while index.doc_count() < id.get() {
            index.add_document(&[]).unwrap();
        }
        index.add_document(&[TermId::from(1)]).unwrap();
    }

    let compressed = compress_with_budget(&index, budget).expect("valid budget must compress");
    let blocks = compressed.blocks(TermId::from(1));
    let roundtripped: Vec<DocId> = CompressedIter::new(blocks).collect();

    assert_eq!(roundtripped, ids, "compressed iteration must reproduce the original sequence");
});
