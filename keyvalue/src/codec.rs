//! Wire formats exchanged with C callers.
//!
//! Batch payloads (caller → store), integers little-endian:
//!
//! ```text
//! | opcode (u8) | key_len (u32) | key | value_len (u32) | value |   opcode 0 (set)
//! | opcode (u8) | key_len (u32) | key |                             opcode 1 (delete)
//! ```
//!
//! Scan results (store → caller), one record per entry in iteration order:
//!
//! ```text
//! | key_len (u32) | value_len (u32) | key | value |
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::model::{KeyValueEntry, OP_DELETE, OP_SET, Operation};

const LEN_SIZE: usize = 4;

fn encode_len(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        Error::MalformedInput(format!("{} of {} bytes exceeds u32 length prefix", what, len))
    })
}

fn read_u8(buf: &mut &[u8], what: &str) -> Result<u8> {
    let (&first, rest) = buf
        .split_first()
        .ok_or_else(|| Error::MalformedInput(format!("missing {}", what)))?;
    *buf = rest;
    Ok(first)
}

fn read_len(buf: &mut &[u8], what: &str) -> Result<usize> {
    if buf.len() < LEN_SIZE {
        return Err(Error::MalformedInput(format!(
            "truncated {} length: need {} bytes, have {}",
            what,
            LEN_SIZE,
            buf.len()
        )));
    }
    let len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    *buf = &buf[LEN_SIZE..];
    Ok(len)
}

fn read_bytes(buf: &mut &[u8], len: usize, what: &str) -> Result<Bytes> {
    if buf.len() < len {
        return Err(Error::MalformedInput(format!(
            "truncated {}: need {} bytes, have {}",
            what,
            len,
            buf.len()
        )));
    }
    let (head, rest) = buf.split_at(len);
    *buf = rest;
    Ok(Bytes::copy_from_slice(head))
}

/// Encodes a batch into the caller-side wire format.
pub fn encode_operations(ops: &[Operation]) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    for op in ops {
        let key = op.key();
        buf.put_u8(op.opcode());
        buf.put_u32_le(encode_len(key.len(), "key")?);
        buf.put_slice(key);
        if let Operation::Set { value, .. } = op {
            buf.put_u32_le(encode_len(value.len(), "value")?);
            buf.put_slice(value);
        }
    }
    Ok(buf.freeze())
}

/// Decodes a whole batch.
///
/// Fails on the first truncated record or unknown opcode; no prefix of the
/// batch is ever returned.
pub fn decode_operations(data: &[u8]) -> Result<Vec<Operation>> {
    let mut buf = data;
    let mut ops = Vec::new();
    while !buf.is_empty() {
        let opcode = read_u8(&mut buf, "opcode")?;
        if opcode != OP_SET && opcode != OP_DELETE {
            return Err(Error::UnknownOperation(opcode));
        }
        let key_len = read_len(&mut buf, "operation key")?;
        let key = read_bytes(&mut buf, key_len, "operation key")?;
        if opcode == OP_SET {
            let value_len = read_len(&mut buf, "operation value")?;
            let value = read_bytes(&mut buf, value_len, "operation value")?;
            ops.push(Operation::Set { key, value });
        } else {
            ops.push(Operation::Delete { key });
        }
    }
    Ok(ops)
}

/// Accumulates scan entries into one contiguous result buffer.
///
/// Growth is fallible so an oversized scan reports
/// [`Error::AllocationFailed`] instead of aborting the process.
#[derive(Debug, Default)]
pub struct ScanEncoder {
    buf: Vec<u8>,
}

impl ScanEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let key_len = encode_len(key.len(), "key")?;
        let value_len = encode_len(value.len(), "value")?;
        let needed = 2 * LEN_SIZE + key.len() + value.len();
        self.buf
            .try_reserve(needed)
            .map_err(|e| Error::AllocationFailed(format!("scan buffer: {}", e)))?;
        self.buf.extend_from_slice(&key_len.to_le_bytes());
        self.buf.extend_from_slice(&value_len.to_le_bytes());
        self.buf.extend_from_slice(key);
        self.buf.extend_from_slice(value);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Decodes a scan result buffer back into entries.
pub fn decode_entries(data: &[u8]) -> Result<Vec<KeyValueEntry>> {
    let mut buf = data;
    let mut entries = Vec::new();
    while !buf.is_empty() {
        let key_len = read_len(&mut buf, "entry key")?;
        let value_len = read_len(&mut buf, "entry value")?;
        let key = read_bytes(&mut buf, key_len, "entry key")?;
        let value = read_bytes(&mut buf, value_len, "entry value")?;
        entries.push(KeyValueEntry { key, value });
    }
    Ok(entries)
}
