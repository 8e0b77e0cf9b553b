//! Frame Splitting
//!
//! Cuts a byte sequence into frames the device's input buffer can hold.
//! Splitting is plain left-to-right chunking with no field awareness; the
//! stage planner decides what goes into a splitter call. Concatenating the
//! produced frames (minus the optional path prefix on the first) always
//! reproduces the input exactly.

use crate::path::KeyPath;
use crate::transaction::types::SCHEDULE_PAIR_WIRE_LEN;

/// Device input buffer limit per frame
pub const MAX_FRAME_LEN: usize = 255;

/// Schedule entries per frame: pairs are never split mid-entry, and at most
/// 15 entries (240 bytes) ride in one frame.
pub const MAX_SCHEDULE_PAIRS_PER_FRAME: usize = 15;

/// Frame capacity for schedule-pair stages
pub const SCHEDULE_CHUNK_LEN: usize = MAX_SCHEDULE_PAIRS_PER_FRAME * SCHEDULE_PAIR_WIRE_LEN;

/// Split into frames of at most `max_len` bytes.
///
/// Always yields at least one frame; several call sites rely on an explicit
/// (empty) terminator frame even when there is nothing to send.
pub fn split(bytes: &[u8], max_len: usize) -> Vec<Vec<u8>> {
    if bytes.is_empty() {
        return vec![Vec::new()];
    }
    bytes.chunks(max_len).map(<[u8]>::to_vec).collect()
}

/// Split with the encoded path prepended to the first frame only.
///
/// The first frame's payload capacity is `max_len` *including* the path
/// prefix, so it carries fewer input bytes than the frames after it.
pub fn split_with_path_prefix(path: &KeyPath, bytes: &[u8], max_len: usize) -> Vec<Vec<u8>> {
    let mut first = path.encode();
    let head_capacity = max_len.saturating_sub(first.len());
    let head_len = head_capacity.min(bytes.len());
    first.extend_from_slice(&bytes[..head_len]);

    let mut frames = vec![first];
    frames.extend(split_remainder(&bytes[head_len..], max_len));
    frames
}

fn split_remainder(bytes: &[u8], max_len: usize) -> Vec<Vec<u8>> {
    // unlike `split`, no terminator frame: the prefix frame already exists
    bytes.chunks(max_len).map(<[u8]>::to_vec).collect()
}
