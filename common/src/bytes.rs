//! Byte utilities for prefix scans.

use bytes::{Bytes, BytesMut};
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::ops::{Bound, RangeBounds};

/// Computes the lexicographic successor of a key prefix.
///
/// Returns the smallest byte sequence that is strictly greater than every key
/// starting with `data`, or `None` if no such sequence exists (the input is
/// empty or made only of `0xFF` bytes).
///
/// The rightmost byte below `0xFF` is incremented and every trailing `0xFF`
/// byte after it is dropped, so the result is a tight exclusive upper bound:
///
/// - `[0x61]` ("a") → `Some([0x62])` ("b")
/// - `[0x61, 0xFF]` → `Some([0x62])`
/// - `[0xFF]` → `None`
/// - `[]` → `None`
pub fn lex_increment(data: &[u8]) -> Option<Bytes> {
    let pos = data.iter().rposition(|&b| b < 0xFF)?;
    let mut result = BytesMut::from(&data[..=pos]);
    result[pos] += 1;
    Some(result.freeze())
}

/// A half-open range over keys, used by the backends' native range scans.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BytesRange {
    pub start: Bound<Bytes>,
    pub end: Bound<Bytes>,
}

impl BytesRange {
    /// Range covering exactly the keys that begin with `prefix`.
    ///
    /// An empty prefix covers every key; an all-`0xFF` prefix has no upper
    /// bound.
    pub fn prefix(prefix: Bytes) -> Self {
        if prefix.is_empty() {
            return Self::unbounded();
        }
        let end = match lex_increment(&prefix) {
            Some(end) => Excluded(end),
            None => Unbounded,
        };
        Self {
            start: Included(prefix),
            end,
        }
    }

    /// Range covering every key.
    pub fn unbounded() -> Self {
        Self {
            start: Unbounded,
            end: Unbounded,
        }
    }

    pub fn contains(&self, k: &[u8]) -> bool {
        let after_start = match &self.start {
            Included(s) => k >= s.as_ref(),
            Excluded(s) => k > s.as_ref(),
            Unbounded => true,
        };
        let before_end = match &self.end {
            Included(e) => k <= e.as_ref(),
            Excluded(e) => k < e.as_ref(),
            Unbounded => true,
        };
        after_start && before_end
    }
}

impl RangeBounds<Bytes> for BytesRange {
    fn start_bound(&self) -> Bound<&Bytes> {
        self.start.as_ref()
    }
    fn end_bound(&self) -> Bound<&Bytes> {
        self.end.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn should_successor_bound_every_prefixed_key(prefix: Vec<u8>, suffix: Vec<u8>) {
            prop_assume!(prefix.iter().any(|&b| b < 0xFF));

            let end = lex_increment(&prefix).unwrap();
            let mut key = prefix.clone();
            key.extend(&suffix);

            prop_assert!(key.as_slice() < end.as_ref());
            prop_assert!(prefix.as_slice() < end.as_ref());
        }

        #[test]
        fn should_prefix_range_match_starts_with(prefix: Vec<u8>, key: Vec<u8>) {
            let range = BytesRange::prefix(Bytes::from(prefix.clone()));

            prop_assert_eq!(range.contains(&key), key.starts_with(&prefix));
        }
    }

    #[test]
    fn should_increment_last_byte() {
        assert_eq!(lex_increment(b"user:").unwrap().as_ref(), b"user;");
        assert_eq!(lex_increment(&[0x00]).unwrap().as_ref(), &[0x01]);
        assert_eq!(lex_increment(&[0xFE]).unwrap().as_ref(), &[0xFF]);
    }

    #[test]
    fn should_carry_past_trailing_ff() {
        assert_eq!(lex_increment(&[0x61, 0xFF]).unwrap().as_ref(), &[0x62]);
        assert_eq!(
            lex_increment(&[0x00, 0xFF, 0xFF]).unwrap().as_ref(),
            &[0x01]
        );
    }

    #[test]
    fn should_return_none_when_no_successor_exists() {
        assert!(lex_increment(&[]).is_none());
        assert!(lex_increment(&[0xFF]).is_none());
        assert!(lex_increment(&[0xFF, 0xFF, 0xFF]).is_none());
    }

    #[test]
    fn should_build_prefix_range() {
        // given
        let range = BytesRange::prefix(Bytes::from("user:"));

        // then
        assert_eq!(range.start, Included(Bytes::from("user:")));
        assert_eq!(range.end, Excluded(Bytes::from("user;")));
        assert!(range.contains(b"user:1"));
        assert!(range.contains(b"user:\x00"));
        assert!(!range.contains(b"admin:1"));
        assert!(!range.contains(b"user"));
    }

    #[test]
    fn should_leave_all_ff_prefix_open_ended() {
        // given
        let range = BytesRange::prefix(Bytes::from_static(&[0xFF, 0xFF]));

        // then
        assert_eq!(range.end, Unbounded);
        assert!(range.contains(&[0xFF, 0xFF, 0xFF, 0xFF]));
        assert!(!range.contains(&[0xFF]));
    }

    #[test]
    fn should_treat_empty_prefix_as_unbounded() {
        // given
        let range = BytesRange::prefix(Bytes::new());

        // then
        assert_eq!(range, BytesRange::unbounded());
        assert!(range.contains(b""));
        assert!(range.contains(&[0xFF, 0xFF, 0xFF]));
    }
}
