//! Exhaustive error-correction contract of the codec.
//!
//! Every identifier must survive every possible single and double cell
//! misread. The double-error sweep covers all 1024 × C(36,2) corrupted
//! matrices; it is the slowest test in the workspace but it is the property
//! the whole tag design rests on.

use tagtrack_codec::{Codec, BIT_COUNT, TAG_COUNT};
use tagtrack_core::TagId;

#[test]
fn corrects_every_single_bit_error() {
    let codec = Codec::new();
    for id in 0..TAG_COUNT as TagId {
        let code = codec.encode(id);
        for bit in 0..BIT_COUNT {
            let corrupted = code.with_bit_flipped(bit);
            assert_eq!(
                codec.decode(corrupted),
                Some(id),
                "id {id} not recovered with bit {bit} flipped"
            );
        }
    }
}

#[test]
fn corrects_every_double_bit_error() {
    let codec = Codec::new();
    for id in 0..TAG_COUNT as TagId {
        let code = codec.encode(id);
        for first in 0..BIT_COUNT {
            let one_flip = code.with_bit_flipped(first);
            for second in first + 1..BIT_COUNT {
                let corrupted = one_flip.with_bit_flipped(second);
                assert_eq!(
                    codec.decode(corrupted),
                    Some(id),
                    "id {id} not recovered with bits {first} and {second} flipped"
                );
            }
        }
    }
}

#[test]
fn rejects_unrecoverable_matrices() {
    let codec = Codec::new();
    // A word at distance >= 3 from every codeword must be rejected. Spheres
    // of radius 2 around the 1024 codewords cover a vanishing fraction of
    // the 2^36 word space, so a short deterministic sweep finds one.
    let code = codec.encode(7);
    let mut rejected = false;
    'search: for a in 0..BIT_COUNT {
        for b in a + 1..BIT_COUNT {
            for c in b + 1..BIT_COUNT {
                let corrupted = code
                    .with_bit_flipped(a)
                    .with_bit_flipped(b)
                    .with_bit_flipped(c);
                if codec.decode(corrupted).is_none() {
                    rejected = true;
                    break 'search;
                }
            }
        }
    }
    assert!(rejected, "no triple-error matrix was rejected");
}
