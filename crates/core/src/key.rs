//! Key range helpers
//!
//! Prefix scans are expressed as half-open byte ranges. The canonical range
//! for a prefix `p` is `[p, strinc(p))`, where `strinc` strips trailing
//! `0xFF` bytes and increments the last remaining byte. Every key that starts
//! with `p` falls inside the range and no other key does.

use crate::error::{Error, Result};

/// Smallest key greater than every key starting with `prefix`
///
/// # Errors
///
/// Returns `InvalidOperation` if `prefix` is empty or all `0xFF`, since no
/// finite key bounds such a prefix.
///
/// # Examples
///
/// ```
/// use strata_core::key::strinc;
///
/// assert_eq!(strinc(b"ab").unwrap(), b"ac".to_vec());
/// assert_eq!(strinc(&[0x01, 0xFF, 0xFF]).unwrap(), vec![0x02]);
/// assert!(strinc(&[0xFF]).is_err());
/// ```
pub fn strinc(prefix: &[u8]) -> Result<Vec<u8>> {
    let mut out = prefix.to_vec();
    while let Some(&last) = out.last() {
        if last == 0xFF {
            out.pop();
        } else {
            // Safe: `last` is not 0xFF
            let idx = out.len() - 1;
            out[idx] = last + 1;
            return Ok(out);
        }
    }
    Err(Error::invalid_operation(
        "key prefix must contain a byte that is not 0xFF",
    ))
}

/// Canonical `[begin, end)` range holding exactly the keys that start with `prefix`
pub fn prefix_range(prefix: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let end = strinc(prefix)?;
    Ok((prefix.to_vec(), end))
}

/// `[begin, end)` holding exactly the keys whose tuple starts with the
/// complete encoded elements in `prefix`
///
/// After a complete element the next byte is an element tag or the end of
/// the key, never `0xFF`. Bounding the range by `prefix ++ [0xFF]` therefore
/// excludes longer strings and byte strings that continue with an escaped
/// `0x00` (`0x00 0xFF`), which [`prefix_range`] would include.
///
/// # Errors
///
/// Returns `InvalidOperation` if `prefix` is empty.
pub fn tuple_prefix_range(prefix: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    if prefix.is_empty() {
        return Err(Error::invalid_operation("tuple prefix must not be empty"));
    }
    let mut end = Vec::with_capacity(prefix.len() + 1);
    end.extend_from_slice(prefix);
    end.push(0xFF);
    Ok((prefix.to_vec(), end))
}
