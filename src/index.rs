// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The term→posting-list mapping, document ingest, and the conjunctive query
//! executor built atop the iterator abstraction in [`crate::iter`].
//!
//! # References
//!
//! - `SPEC_FULL.md` §4.6 (ingest), §4.7 (query executor).
//! - `src/inverted.rs` (`harryzorus-sorex`): `HashMap<TermId, PostingList>`
//!   ingest shape this module generalizes from string terms to opaque
//!   `TermId`s and from scored postings to plain `DocId`s.

use std::collections::{HashMap, HashSet};

use crate::block::{compress_list, CompressedBlock};
use crate::error::PostingsError;
use crate::intersect::intersect;
use crate::iter::{CompressedIter, PostingIterator, SliceIter};
use crate::types::{DocId, TermId, DEFAULT_BLOCK_BUDGET};

/// A tagged sum of the two concrete iterator representations, so the query
/// executor can hold a heterogeneous list of postings iterators (some over
/// an uncompressed index, some over a compressed one, some over an
/// intersection's result buffer) without dynamic dispatch in the hot loop.
/// See `SPEC_FULL.md` §9, "Polymorphism".
pub enum AnyIter<'a> {
    Slice(SliceIter<'a>),
    Compressed(CompressedIter<'a>),
}

impl PostingIterator for AnyIter<'_> {
    fn at(&self) -> DocId {
        match self {
            AnyIter::Slice(it) => it.at(),
            AnyIter::Compressed(it) => it.at(),
        }
    }

    fn end(&self) -> bool {
        match self {
            AnyIter::Slice(it) => it.end(),
            AnyIter::Compressed(it) => it.end(),
        }
    }

    fn next(&mut self) -> bool {
        match self {
            AnyIter::Slice(it) => it.next(),
            AnyIter::Compressed(it) => it.next(),
        }
    }

    fn advance(&mut self, target: DocId) -> bool {
        match self {
            AnyIter::Slice(it) => it.advance(target),
            AnyIter::Compressed(it) => it.advance(target),
        }
    }
}

/// Anything the query executor can pull term postings from: the live
/// uncompressed [`Index`] or a frozen [`CompressedIndex`].
pub trait PostingsSource {
    /// Returns an iterator positioned at the first posting for `term`, plus
    /// the total posting count (0 iff the iterator is immediately at end).
    fn postings(&self, term: TermId) -> (AnyIter<'_>, usize);
}

/// The mutable, uncompressed inverted index. Ingest-only: queries run
/// directly against it via [`PostingsSource`], or after a one-shot
/// [`compress`] / [`compress_with_budget`] call against a [`CompressedIndex`]
/// snapshot instead.
#[derive(Debug, Default)]
pub struct Index {
    postings: HashMap<TermId, Vec<DocId>>,
    stop_words: HashSet<TermId>,
    next_doc_id: u32,
}

impl Index {
    /// Constructs an empty index that silently drops the given stop words at
    /// ingest (`SPEC_FULL.md` §4.6).
    pub fn new(stop_words: HashSet<TermId>) -> Self {
        Index {
            postings: HashMap::new(),
            stop_words,
            next_doc_id: 0,
        }
    }

    /// Number of documents ingested so far.
    pub fn doc_count(&self) -> u32 {
        self.next_doc_id
    }

    /// Assigns the next `DocId` and appends it to each non-stop term's
    /// posting list, deduplicating repeated terms within the same document.
    /// Returns [`PostingsError::DocIdOverflow`] once `u32::MAX` documents
    /// have already been assigned.
    pub fn add_document(&mut self, terms: &[TermId]) -> Result<DocId, PostingsError> {
        if self.next_doc_id == u32::MAX {
            return Err(PostingsError::DocIdOverflow);
        }
        let doc_id = DocId::from(self.next_doc_id);
        self.next_doc_id += 1;

        for &term in terms {
            if self.stop_words.contains(&term) {
                continue;
            }
            let list = self.postings.entry(term).or_default();
            if list.last() != Some(&doc_id) {
                list.push(doc_id);
            }
        }

        Ok(doc_id)
    }

    /// The uncompressed posting list for `term`, if any have been ingested.
    pub fn posting_list(&self, term: TermId) -> &[DocId] {
        self.postings.get(&term).map_or(&[], Vec::as_slice)
    }
}

impl PostingsSource for Index {
    fn postings(&self, term: TermId) -> (AnyIter<'_>, usize) {
        let list = self.posting_list(term);
        (AnyIter::Slice(SliceIter::new(list)), list.len())
    }
}

/// One term's compressed posting list plus its cached length, so
/// [`CompressedIndex::postings`] doesn't need to re-sum block counts on
/// every query.
struct CompressedEntry {
    blocks: Vec<CompressedBlock>,
    freq: usize,
}

/// A frozen, compressed snapshot of an [`Index`]. Built once via [`compress`]
/// or [`compress_with_budget`]; read-only thereafter (`SPEC_FULL.md` §3, §5).
#[derive(Default)]
pub struct CompressedIndex {
    postings: HashMap<TermId, CompressedEntry>,
    doc_count: u32,
}

impl CompressedIndex {
    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    /// The compressed blocks for `term`, if any have been ingested.
    pub fn blocks(&self, term: TermId) -> &[CompressedBlock] {
        self.postings
            .get(&term)
            .map_or(&[], |entry| entry.blocks.as_slice())
    }
}

impl PostingsSource for CompressedIndex {
    fn postings(&self, term: TermId) -> (AnyIter<'_>, usize) {
        match self.postings.get(&term) {
            Some(entry) => (
                AnyIter::Compressed(CompressedIter::new(&entry.blocks)),
                entry.freq,
            ),
            None => (AnyIter::Compressed(CompressedIter::new(&[])), 0),
        }
    }
}

/// Compresses `index` using the documented default block budget
/// ([`DEFAULT_BLOCK_BUDGET`]).
pub fn compress(index: &Index) -> Result<CompressedIndex, PostingsError> {
    compress_with_budget(index, DEFAULT_BLOCK_BUDGET)
}

/// Compresses `index` using a caller-chosen block byte budget. One-shot:
/// the uncompressed index is left untouched, so a caller may keep ingesting
/// into it and compress again later (`SPEC_FULL.md` §6, §10.2).
pub fn compress_with_budget(index: &Index, budget: usize) -> Result<CompressedIndex, PostingsError> {
    let mut postings = HashMap::with_capacity(index.postings.len());
    for (&term, docs) in &index.postings {
        let blocks = compress_list(docs, budget)?;
        postings.insert(
            term,
            CompressedEntry {
                freq: docs.len(),
                blocks,
            },
        );
    }
    Ok(CompressedIndex {
        postings,
        doc_count: index.next_doc_id,
    })
}

/// Runs a conjunctive (AND) query against any [`PostingsSource`], returning
/// the sorted, deduplicated list of matching `DocId`s (`SPEC_FULL.md` §4.7).
pub fn query<S: PostingsSource>(source: &S, terms: &[TermId]) -> Vec<DocId> {
    if terms.is_empty() {
        return Vec::new();
    }

    let mut pairs: Vec<(AnyIter<'_>, usize)> = Vec::with_capacity(terms.len());
    for &term in terms {
        let (iter, freq) = source.postings(term);
        if iter.end() {
            return Vec::new();
        }
        pairs.push((iter, freq));
    }

    // Rarest term first minimizes the work done by every subsequent
    // intersection round.
    pairs.sort_by_key(|(_, freq)| *freq);

    let mut pairs = pairs.into_iter();
    let (first_iter, first_freq) = pairs.next().expect("terms is non-empty");

    let mut buffer: Vec<DocId> = Vec::with_capacity(first_freq);
    let mut current = first_iter;
    let mut remaining = pairs.peekable();

    if remaining.peek().is_none() {
        while !current.end() {
            buffer.push(current.at());
            current.next();
        }
        return buffer;
    }

    for (next_iter, _) in remaining {
        buffer = intersect(current, next_iter);
        if buffer.is_empty() {
            return Vec::new();
        }
        current = AnyIter::Slice(SliceIter::new(&buffer));
    }

    buffer
}
