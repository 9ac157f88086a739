//! Data types for KeyValue operations.

use bytes::Bytes;

use crate::error::{Error, Result};

/// Wire opcode of [`Operation::Set`].
pub const OP_SET: u8 = 0;

/// Wire opcode of [`Operation::Delete`].
pub const OP_DELETE: u8 = 1;

/// Longest key either engine can store.
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

/// Rejects keys the engines cannot store: empty, or longer than
/// [`MAX_KEY_LEN`].
pub fn validate_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(Error::MalformedInput("key must not be empty".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(Error::MalformedInput(format!(
            "key of {} bytes exceeds the {} byte limit",
            key.len(),
            MAX_KEY_LEN
        )));
    }
    Ok(())
}

/// Validates every key of a batch before any of it is written.
pub fn validate_operations(ops: &[Operation]) -> Result<()> {
    ops.iter().try_for_each(|op| validate_key(op.key()))
}

/// One write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Set { key: Bytes, value: Bytes },
    /// Deleting an absent key is not an error.
    Delete { key: Bytes },
}

impl Operation {
    pub fn set(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Operation::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Bytes>) -> Self {
        Operation::Delete { key: key.into() }
    }

    pub fn opcode(&self) -> u8 {
        match self {
            Operation::Set { .. } => OP_SET,
            Operation::Delete { .. } => OP_DELETE,
        }
    }

    pub fn key(&self) -> &Bytes {
        match self {
            Operation::Set { key, .. } | Operation::Delete { key } => key,
        }
    }
}

/// A key-value entry produced by a prefix scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueEntry {
    pub key: Bytes,
    pub value: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_keys_up_to_the_limit() {
        assert_eq!(validate_key(b"k"), Ok(()));
        assert_eq!(validate_key(&vec![0xAB; MAX_KEY_LEN]), Ok(()));
    }

    #[test]
    fn should_reject_empty_and_oversized_keys() {
        assert!(matches!(validate_key(b""), Err(Error::MalformedInput(_))));
        assert!(matches!(
            validate_key(&vec![b'k'; MAX_KEY_LEN + 1]),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn should_reject_batch_with_one_bad_key() {
        // given
        let ops = vec![
            Operation::set(&b"ok"[..], &b"v"[..]),
            Operation::delete(vec![b'k'; 70_000]),
        ];

        // when
        let result = validate_operations(&ops);

        // then
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }
}
