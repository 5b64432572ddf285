//! Binary key layouts shared by the store implementations and the importer.
//!
//! Variable-length ids (unit hashes, addresses) are written with a
//! big-endian `u16` length prefix so that a composite key never has a
//! component that is a prefix of another. A unit id that ends a key is
//! written bare so it sorts by its bytes. Integers are big-endian so that
//! byte order matches numeric order.

use std::ops::Bound;

use dagview_types::{Address, CommissionKind, UnitHash};

use crate::LmdbError;

/// Append `bytes` with its length prefix.
pub(crate) fn push_prefixed(key: &mut Vec<u8>, bytes: &[u8]) {
    key.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    key.extend_from_slice(bytes);
}

/// `len(unit) ++ unit`: the prefix shared by every composite key that
/// starts with `unit`.
pub(crate) fn unit_prefix(unit: &UnitHash) -> Vec<u8> {
    let mut key = Vec::with_capacity(2 + unit.as_bytes().len());
    push_prefixed(&mut key, unit.as_bytes());
    key
}

/// `len(first) ++ first ++ len(second) ++ second`, e.g. parenthood keys.
pub(crate) fn unit_pair_key(first: &UnitHash, second: &UnitHash) -> Vec<u8> {
    let mut key = unit_prefix(first);
    push_prefixed(&mut key, second.as_bytes());
    key
}

/// `len(last_ball) ++ last_ball ++ mci_be ++ unit`.
///
/// The unit id is the last component and carries no length prefix, so keys
/// sharing a last ball and index sort by unit id.
pub(crate) fn last_ball_key(last_ball: &UnitHash, mci: u64, unit: &UnitHash) -> Vec<u8> {
    let mut key = unit_prefix(last_ball);
    key.extend_from_slice(&mci.to_be_bytes());
    key.extend_from_slice(unit.as_bytes());
    key
}

/// `len(src_unit) ++ src_unit ++ message_index_be ++ output_index_be`.
pub(crate) fn spend_key(src_unit: &UnitHash, message_index: u32, output_index: u32) -> Vec<u8> {
    let mut key = unit_prefix(src_unit);
    key.extend_from_slice(&message_index.to_be_bytes());
    key.extend_from_slice(&output_index.to_be_bytes());
    key
}

/// `kind_tag ++ len(address) ++ address`.
pub(crate) fn commission_prefix(kind: CommissionKind, address: &Address) -> Vec<u8> {
    let mut key = vec![kind.tag()];
    push_prefixed(&mut key, address.as_str().as_bytes());
    key
}

/// `kind_tag ++ len(address) ++ address ++ mci_be`.
pub(crate) fn commission_key(kind: CommissionKind, address: &Address, mci: u64) -> Vec<u8> {
    let mut key = commission_prefix(kind, address);
    key.extend_from_slice(&mci.to_be_bytes());
    key
}

/// `len(trigger) ++ trigger ++ len(aa_address) ++ aa_address`.
pub(crate) fn aa_response_key(trigger: &UnitHash, aa_address: &Address) -> Vec<u8> {
    let mut key = unit_prefix(trigger);
    push_prefixed(&mut key, aa_address.as_str().as_bytes());
    key
}

/// The smallest key greater than every key starting with `prefix`, or
/// `None` when no such key exists (the prefix is all `0xFF`).
pub(crate) fn increment_prefix(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.pop() {
        if last < u8::MAX {
            upper.push(last + 1);
            return Some(upper);
        }
    }
    None
}

/// Range bounds covering exactly the keys that start with `prefix`.
pub(crate) fn prefix_bounds<'a>(
    prefix: &'a [u8],
    upper: &'a Option<Vec<u8>>,
) -> (Bound<&'a [u8]>, Bound<&'a [u8]>) {
    let end = match upper {
        Some(upper) => Bound::Excluded(upper.as_slice()),
        None => Bound::Unbounded,
    };
    (Bound::Included(prefix), end)
}

/// Split a length-prefixed component off the front of `bytes`.
pub(crate) fn take_prefixed(bytes: &[u8]) -> Result<(&[u8], &[u8]), LmdbError> {
    if bytes.len() < 2 {
        return Err(LmdbError::Serialization("truncated key".into()));
    }
    let len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    let rest = &bytes[2..];
    if rest.len() < len {
        return Err(LmdbError::Serialization("truncated key component".into()));
    }
    Ok(rest.split_at(len))
}

/// The unit id stored as the second component of a pair key.
pub(crate) fn second_unit(key: &[u8]) -> Result<UnitHash, LmdbError> {
    let (_, rest) = take_prefixed(key)?;
    let (second, _) = take_prefixed(rest)?;
    unit_from_bytes(second)
}

/// The unit id stored as the trailing component of a last-ball key.
pub(crate) fn last_ball_stabilizer(key: &[u8]) -> Result<UnitHash, LmdbError> {
    let (_, rest) = take_prefixed(key)?;
    if rest.len() < 8 {
        return Err(LmdbError::Serialization("truncated last-ball key".into()));
    }
    unit_from_bytes(&rest[8..])
}

pub(crate) fn unit_from_bytes(bytes: &[u8]) -> Result<UnitHash, LmdbError> {
    let s = std::str::from_utf8(bytes).map_err(|e| LmdbError::Serialization(e.to_string()))?;
    Ok(UnitHash::new(s))
}
