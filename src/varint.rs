// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Group-variable-byte integer encoding for posting-list deltas.
//!
//! Group-varint packs four integers behind a single tag byte instead of
//! spending one continuation bit per byte the way a standard LEB128 varint
//! does: the tag's four 2-bit fields each record one integer's payload width
//! (1..4 bytes) minus one, so decoding four values costs one branch on the
//! tag plus four fixed-width reads, rather than up to four separate
//! continuation checks.
//!
//! # References
//!
//! - Dean, J. (2009): "Challenges in Building Large-Scale Information
//!   Retrieval Systems" (keynote notes on group-varint as used in Google's
//!   indexing pipeline).
//! - Scholer, Williams, Yiannis & Zobel (2002): "Compression of Inverted
//!   Indexes for Fast Query Evaluation", SIGIR.

/// Maximum bytes a single group-varint-4 unit can occupy: 1 tag byte plus
/// four 4-byte payloads.
pub const MAX_GROUP4_LEN: usize = 1 + 4 * 4;

/// Maximum bytes a single group-varint-1 unit can occupy: 1 tag byte plus
/// one 4-byte payload.
pub const MAX_GROUP1_LEN: usize = 1 + 4;

const fn byte_width(v: u32) -> u8 {
    if v <= 0xFF {
        1
    } else if v <= 0xFFFF {
        2
    } else if v <= 0xFF_FFFF {
        3
    } else {
        4
    }
}

const fn group4_bytes_used_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut tag = 0usize;
    while tag < 256 {
        let w0 = (tag & 0b11) as u8 + 1;
        let w1 = ((tag >> 2) & 0b11) as u8 + 1;
        let w2 = ((tag >> 4) & 0b11) as u8 + 1;
        let w3 = ((tag >> 6) & 0b11) as u8 + 1;
        table[tag] = w0 + w1 + w2 + w3;
        tag += 1;
    }
    table
}

/// `BYTES_USED[tag]` is the total payload length, in bytes, of a
/// group-varint-4 unit carrying that tag byte — including neither the tag
/// byte itself. Lets a cursor skip a whole group without re-deriving the
/// four field widths by hand.
pub static BYTES_USED: [u8; 256] = group4_bytes_used_table();

#[inline]
fn field_width(tag: u8, field: u8) -> u8 {
    ((tag >> (2 * field)) & 0b11) + 1
}

/// Encodes four deltas as a group-varint-4 unit, appending to `out`.
/// Returns the number of bytes written (including the tag byte).
pub fn encode_group4(deltas: [u32; 4], out: &mut Vec<u8>) -> usize {
    let widths = [
        byte_width(deltas[0]),
        byte_width(deltas[1]),
        byte_width(deltas[2]),
        byte_width(deltas[3]),
    ];
    let tag = (widths[0] - 1) | (widths[1] - 1) << 2 | (widths[2] - 1) << 4 | (widths[3] - 1) << 6;
    out.push(tag);
    let start_len = out.len();
    for (delta, width) in deltas.iter().zip(widths) {
        out.extend_from_slice(&delta.to_le_bytes()[..width as usize]);
    }
    1 + (out.len() - start_len)
}

/// Decodes a group-varint-4 unit from the front of `bytes` into `group`.
/// Returns the number of bytes consumed (including the tag byte).
///
/// Panics if `bytes` is too short for the tag it reads — callers decoding a
/// well-formed [`crate::block::CompressedBlock`] never hit this; it guards
/// against corrupted input rather than being a recoverable error case.
pub fn decode_group4(bytes: &[u8], group: &mut [u32; 4]) -> usize {
    let tag = bytes[0];
    let mut pos = 1usize;
    for (i, slot) in group.iter_mut().enumerate() {
        let width = field_width(tag, i as u8) as usize;
        let mut buf = [0u8; 4];
        buf[..width].copy_from_slice(&bytes[pos..pos + width]);
        *slot = u32::from_le_bytes(buf);
        pos += width;
    }
    pos
}

/// Encodes a single delta as a group-varint-1 unit, appending to `out`.
/// Returns the number of bytes written (including the tag byte).
pub fn encode_group1(delta: u32, out: &mut Vec<u8>) -> usize {
    let width = byte_width(delta);
    let tag = width - 1;
    out.push(tag);
    out.extend_from_slice(&delta.to_le_bytes()[..width as usize]);
    1 + width as usize
}

/// Decodes a single group-varint-1 unit from the front of `bytes`.
/// Returns `(value, bytes consumed)`.
pub fn decode_group1(bytes: &[u8]) -> (u32, usize) {
    let tag = bytes[0];
    let width = field_width(tag, 0) as usize;
    let mut buf = [0u8; 4];
    buf[..width].copy_from_slice(&bytes[1..1 + width]);
    (u32::from_le_bytes(buf), 1 + width)
}
