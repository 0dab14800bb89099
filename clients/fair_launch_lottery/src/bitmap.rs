//! Packed winner/loser bitmap, one bit per sequence number.
//!
//! Bits are packed big-endian within each byte: bit 7 of byte 0 is sequence
//! number 0. The final partial byte is zero-padded in its low-order bits.
//! This layout must match the on-chain record byte-for-byte.

use crate::constants::MAX_BITMAP_SLICE_BYTES;

/// Packs one decision per sequence number, ascending, MSB first.
pub fn encode(decisions: &[bool]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(decisions.len().div_ceil(8));
    let mut current = 0u8;
    let mut position_from_right = 7i8;
    for &chosen in decisions {
        if chosen {
            current |= 1 << position_from_right;
        }
        position_from_right -= 1;
        if position_from_right < 0 {
            bytes.push(current);
            current = 0;
            position_from_right = 7;
        }
    }
    if position_from_right != 7 {
        bytes.push(current);
    }
    bytes
}

/// Tests the bit for `seq` in a packed bit array. Out-of-range sequence
/// numbers read as false rather than panicking; the caller may be probing a
/// bitmap that has not been fully written yet.
pub fn bit_at(bits: &[u8], seq: u64) -> bool {
    let byte_index = (seq / 8) as usize;
    if byte_index >= bits.len() {
        return false;
    }
    let position_from_right = 7 - (seq % 8) as u32;
    bits[byte_index] & (1 << position_from_right) != 0
}

/// One size-bounded write-back payload: `offset` is the sequence number of
/// the first decision in `bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapSlice {
    pub offset: u64,
    pub bytes: Vec<u8>,
}

/// Cuts the full decision list into non-overlapping slices of at most
/// `MAX_BITMAP_SLICE_BYTES` bytes each. Offsets are byte-aligned (multiples
/// of 8) and strictly ascending; the driver must submit them in order so the
/// record store's running ones-count stays consistent.
pub fn slice_plan(decisions: &[bool]) -> Vec<BitmapSlice> {
    let entries_per_slice = MAX_BITMAP_SLICE_BYTES * 8;
    decisions
        .chunks(entries_per_slice)
        .enumerate()
        .map(|(i, chunk)| BitmapSlice {
            offset: (i * entries_per_slice) as u64,
            bytes: encode(chunk),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_bit_for_bit() {
        let patterns: &[Vec<bool>] = &[
            vec![],
            vec![true],
            vec![false],
            vec![true; 8],
            vec![false; 9],
            (0..64).map(|i| i % 3 == 0).collect(),
            (0..1021).map(|i| i % 7 == 2).collect(),
        ];
        for pattern in patterns {
            let bytes = encode(pattern);
            assert_eq!(bytes.len(), pattern.len().div_ceil(8));
            for (i, &expected) in pattern.iter().enumerate() {
                assert_eq!(bit_at(&bytes, i as u64), expected, "bit {i}");
            }
        }
    }

    #[test]
    fn winners_at_0_2_9_encode_to_known_bytes() {
        let mut decisions = vec![false; 10];
        decisions[0] = true;
        decisions[2] = true;
        decisions[9] = true;

        let bytes = encode(&decisions);
        assert_eq!(bytes, vec![0b1010_0000, 0b0100_0000]);
        assert!(bit_at(&bytes, 9));
        assert!(!bit_at(&bytes, 8));
    }

    #[test]
    fn partial_byte_is_zero_padded() {
        let bytes = encode(&[true, true, true]);
        assert_eq!(bytes, vec![0b1110_0000]);
    }

    #[test]
    fn out_of_range_bit_reads_false() {
        let bytes = encode(&[true; 8]);
        assert!(!bit_at(&bytes, 8));
        assert!(!bit_at(&bytes, u64::MAX));
    }

    #[test]
    fn slice_plan_is_ascending_and_non_overlapping() {
        let decisions: Vec<bool> = (0..(8 * MAX_BITMAP_SLICE_BYTES * 2 + 13))
            .map(|i| i % 2 == 0)
            .collect();
        let slices = slice_plan(&decisions);
        assert_eq!(slices.len(), 3);

        let mut covered = 0u64;
        for slice in &slices {
            assert_eq!(slice.offset, covered);
            assert_eq!(slice.offset % 8, 0);
            assert!(slice.bytes.len() <= MAX_BITMAP_SLICE_BYTES);
            covered += (slice.bytes.len() * 8) as u64;
        }
        assert_eq!(slices[2].bytes.len(), 2); // 13 trailing entries

        // reassembling the slices reproduces the straight encoding
        let mut reassembled = Vec::new();
        for slice in &slices {
            reassembled.extend_from_slice(&slice.bytes);
        }
        assert_eq!(reassembled, encode(&decisions));
    }
}
