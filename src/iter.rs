// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Posting-list iterators: a uniform forward-plus-skip cursor over either an
//! uncompressed `DocId` slice or a sequence of compressed blocks.
//!
//! Both variants satisfy the same structural contract (`at`, `end`, `next`,
//! `advance`) so the intersection algorithm in [`crate::intersect`] can drive
//! either one, or one of each, without caring which. See `SPEC_FULL.md` §4.3,
//! §4.4, §4.5, §9.

use crate::block::CompressedBlock;
use crate::types::DocId;
use crate::varint::{decode_group1, decode_group4};

/// The cursor contract shared by every posting-list iterator variant.
///
/// `next()` and `advance()` past `end()` are no-ops returning `false` (never
/// a panic) so the tolerant loops in [`crate::intersect::intersect`] stay
/// correct when driven one call past the last valid position (`SPEC_FULL.md`
/// §9, "`next()` after `end()`").
pub trait PostingIterator {
    /// The `DocId` at the current position. Only meaningful when `!end()`.
    fn at(&self) -> DocId;
    /// True once the cursor has run off the end of the list.
    fn end(&self) -> bool;
    /// Moves to the next position. Returns `!end()` after moving.
    fn next(&mut self) -> bool;
    /// Seeks forward to the first position `>= target`. Returns `!end()`.
    fn advance(&mut self, target: DocId) -> bool;
}

/// Galloping-then-binary search for the leftmost index `i` in `0..len`
/// (starting the scan from `start`) such that `f(i) >= target`, or `len` if
/// none qualifies. Shared by the uncompressed iterator (over docs) and the
/// compressed-list iterator (over block `last_doc` anchors) — see
/// `SPEC_FULL.md` §4.3, §4.5, §9.
pub(crate) fn gallop_then_binary_by(
    len: usize,
    start: usize,
    target: DocId,
    f: impl Fn(usize) -> DocId,
) -> usize {
    if start >= len {
        return len;
    }
    let mut bound = 1usize;
    while start + bound < len && f(start + bound) < target {
        bound = bound.saturating_mul(2);
    }
    let mut lo = start + bound / 2;
    let mut hi = (start + bound).min(len);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if f(mid) < target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

fn gallop_then_binary(list: &[DocId], start: usize, target: DocId) -> usize {
    gallop_then_binary_by(list.len(), start, target, |i| list[i])
}

/// Iterator over an uncompressed posting list (a plain `DocId` slice).
#[derive(Debug, Clone)]
pub struct SliceIter<'a> {
    list: &'a [DocId],
    idx: usize,
}

impl<'a> SliceIter<'a> {
    pub fn new(list: &'a [DocId]) -> Self {
        SliceIter { list, idx: 0 }
    }
}

impl PostingIterator for SliceIter<'_> {
    #[inline]
    fn at(&self) -> DocId {
        debug_assert!(!self.end(), "at() called on an ended SliceIter");
        self.list[self.idx]
    }

    #[inline]
    fn end(&self) -> bool {
        self.idx >= self.list.len()
    }

    fn next(&mut self) -> bool {
        if self.end() {
            return false;
        }
        self.idx += 1;
        !self.end()
    }

    fn advance(&mut self, target: DocId) -> bool {
        if self.end() {
            return false;
        }
        self.idx = gallop_then_binary(self.list, self.idx, target);
        !self.end()
    }
}

impl Iterator for SliceIter<'_> {
    type Item = DocId;

    fn next(&mut self) -> Option<DocId> {
        if PostingIterator::end(self) {
            return None;
        }
        let v = PostingIterator::at(self);
        PostingIterator::next(self);
        Some(v)
    }
}

/// Iterator over a single compressed block, decoding its group-varint delta
/// stream lazily, four deltas at a time (one at a time for the residue).
///
/// `pos` is the 0-based index of the element currently at `doc`, ranging
/// over `0..block.count`.
#[derive(Debug, Clone)]
pub struct BlockIter<'a> {
    block: &'a CompressedBlock,
    group: [u32; 4],
    doc: u32,
    /// Index into `group` of the next delta to consume (0..4).
    current: u8,
    pos: u16,
    /// Byte offset into `block.bytes` of the next undecoded group.
    offs: usize,
}

impl<'a> BlockIter<'a> {
    pub fn new(block: &'a CompressedBlock) -> Self {
        let mut it = BlockIter {
            block,
            group: [0; 4],
            doc: block.first_doc.get(),
            current: 1,
            pos: 0,
            offs: 0,
        };
        if !block.is_empty() {
            it.offs = it.decode_group_at(0, 0);
        }
        it
    }

    /// Decodes the group starting at `block.bytes[offs]` into `self.group`,
    /// given `pos` elements have already been produced. Returns the new
    /// offset. Uses group-varint-4 when at least 4 deltas remain in the
    /// block from `pos` onward, otherwise decodes the residue one at a time
    /// with group-varint-1.
    fn decode_group_at(&mut self, offs: usize, pos: u16) -> usize {
        let remaining = self.block.len() - pos as usize;
        if remaining >= 4 {
            decode_group4(&self.block.bytes[offs..], &mut self.group)
        } else {
            let mut cursor = offs;
            for slot in self.group.iter_mut().take(remaining) {
                let (value, consumed) = decode_group1(&self.block.bytes[cursor..]);
                *slot = value;
                cursor += consumed;
            }
            cursor
        }
    }
}

impl PostingIterator for BlockIter<'_> {
    #[inline]
    fn at(&self) -> DocId {
        debug_assert!(!self.end(), "at() called on an ended BlockIter");
        DocId::from(self.doc)
    }

    #[inline]
    fn end(&self) -> bool {
        self.pos >= self.block.count
    }

    fn next(&mut self) -> bool {
        if self.end() {
            return false;
        }
        self.pos += 1;
        if self.end() {
            return false;
        }
        if self.current == 4 {
            self.offs = self.decode_group_at(self.offs, self.pos);
            self.current = 0;
        }
        self.doc += self.group[self.current as usize];
        self.current += 1;
        true
    }

    fn advance(&mut self, target: DocId) -> bool {
        while !self.end() && self.at() < target {
            self.next();
        }
        !self.end()
    }
}

impl Iterator for BlockIter<'_> {
    type Item = DocId;

    fn next(&mut self) -> Option<DocId> {
        if PostingIterator::end(self) {
            return None;
        }
        let v = PostingIterator::at(self);
        PostingIterator::next(self);
        Some(v)
    }
}

/// Iterator over a compressed posting list: composes a [`BlockIter`] with
/// block-level galloping skip over the blocks' `last_doc` anchors.
///
/// `inner` is `None` exactly when the iterator is exhausted; whenever it is
/// `Some`, it is positioned at a valid (non-`end`) element. This keeps
/// `end()`/`at()` trivial and avoids the borrow-juggling of rebuilding an
/// inner iterator mid-call (`SPEC_FULL.md` §9, "Ownership of block buffers").
pub struct CompressedIter<'a> {
    blocks: &'a [CompressedBlock],
    block_id: usize,
    inner: Option<BlockIter<'a>>,
}

impl<'a> CompressedIter<'a> {
    pub fn new(blocks: &'a [CompressedBlock]) -> Self {
        let inner = blocks.first().map(BlockIter::new);
        CompressedIter {
            blocks,
            block_id: 0,
            inner,
        }
    }
}

impl PostingIterator for CompressedIter<'_> {
    fn at(&self) -> DocId {
        self.inner
            .as_ref()
            .expect("at() called on an ended CompressedIter")
            .at()
    }

    fn end(&self) -> bool {
        self.inner.is_none()
    }

    fn next(&mut self) -> bool {
        let Some(inner) = self.inner.as_mut() else {
            return false;
        };
        if inner.next() {
            return true;
        }
        self.block_id += 1;
        match self.blocks.get(self.block_id) {
            Some(block) => {
                self.inner = Some(BlockIter::new(block));
                true
            }
            None => {
                self.inner = None;
                false
            }
        }
    }

    fn advance(&mut self, target: DocId) -> bool {
        let Some(inner) = self.inner.as_mut() else {
            return false;
        };
        if inner.at() >= target {
            return true;
        }

        // Fast path: the target can only be in the current block if the
        // block's last doc is already >= target; no need to touch the block
        // array at all.
        if self.blocks[self.block_id].last_doc >= target {
            let ok = inner.advance(target);
            debug_assert!(ok, "current block's last_doc >= target but advance failed");
            return ok;
        }

        // Target lies beyond the current block: gallop over later blocks'
        // last_doc anchors for the leftmost one that can contain it.
        let blocks = self.blocks;
        let found =
            gallop_then_binary_by(blocks.len(), self.block_id + 1, target, |i| blocks[i].last_doc);
        match blocks.get(found) {
            Some(block) => {
                self.block_id = found;
                let mut new_inner = BlockIter::new(block);
                let ok = new_inner.advance(target);
                debug_assert!(ok, "block selected by last_doc gallop must contain target");
                self.inner = Some(new_inner);
                true
            }
            None => {
                self.block_id = blocks.len();
                self.inner = None;
                false
            }
        }
    }
}

impl Iterator for CompressedIter<'_> {
    type Item = DocId;

    fn next(&mut self) -> Option<DocId> {
        if PostingIterator::end(self) {
            return None;
        }
        let v = PostingIterator::at(self);
        PostingIterator::next(self);
        Some(v)
    }
}
