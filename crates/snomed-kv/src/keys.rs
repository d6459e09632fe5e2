//! Key encoding helpers shared by the Component Store and Index Layer.

/// Delimiter separating a variable-length textual target from an appended
/// item id in the `refset+target→items` index key.
pub const TARGET_DELIMITER: u8 = b' ';

/// Encodes an id as an 8-byte big-endian key.
///
/// SCTIDs are modeled as `i64` but are always non-negative in practice; the
/// sign bit is flipped so that big-endian byte ordering of the encoded key
/// matches numeric ordering of the id, including for the (unused in
/// practice, but supported) negative range.
pub fn be_id(id: i64) -> [u8; 8] {
    let flipped = (id as u64) ^ (1u64 << 63);
    flipped.to_be_bytes()
}

/// Decodes an id previously encoded by [`be_id`].
pub fn decode_be_id(bytes: &[u8]) -> Option<i64> {
    let arr: [u8; 8] = bytes.get(0..8)?.try_into().ok()?;
    let flipped = u64::from_be_bytes(arr);
    Some((flipped ^ (1u64 << 63)) as i64)
}

/// Concatenates key fragments into a single compound key.
pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total);
    for p in parts {
        out.extend_from_slice(p);
    }
    out
}

/// Builds the `refsetId ‖ targetCode ‖ SPACE ‖ itemId` reverse-lookup key.
pub fn target_key(refset_id: i64, target_code: &str, item_id: &[u8]) -> Vec<u8> {
    concat(&[
        &be_id(refset_id),
        target_code.as_bytes(),
        &[TARGET_DELIMITER],
        item_id,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn be_id_preserves_ordering() {
        let ids = [0i64, 1, 138875005, 404684003, 900000000000207008];
        let mut encoded: Vec<[u8; 8]> = ids.iter().copied().map(be_id).collect();
        let mut sorted_ids = ids.to_vec();
        sorted_ids.sort();
        encoded.sort();
        let decoded: Vec<i64> = encoded.iter().map(|b| decode_be_id(b).unwrap()).collect();
        assert_eq!(decoded, sorted_ids);
    }

    #[test]
    fn round_trip() {
        assert_eq!(decode_be_id(&be_id(73211009)), Some(73211009));
        assert_eq!(decode_be_id(&be_id(0)), Some(0));
    }

    #[test]
    fn concat_joins_fragments() {
        let out = concat(&[b"ab", b"cd"]);
        assert_eq!(out, b"abcd");
    }
}
