//! Ordinary TON cells, enough to hash a wallet state-init.

use sha2::{Digest, Sha256};

/// Maximum data bits in a cell.
pub const MAX_BITS: usize = 1023;
/// Maximum references from a cell.
pub const MAX_REFS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CellError {
    #[error("cell data overflow: {0} bits exceed {MAX_BITS}")]
    BitOverflow(usize),
    #[error("cell reference overflow: more than {MAX_REFS} references")]
    RefOverflow,
}

/// A child cell as seen from its parent: representation hash plus depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub hash: [u8; 32],
    pub depth: u16,
}

/// An ordinary (non-exotic, level 0) cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<CellRef>,
}

impl Cell {
    /// Returns the number of data bits.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Returns the cell depth: 0 for leaves, else one more than the deepest child.
    pub fn depth(&self) -> u16 {
        self.refs
            .iter()
            .map(|r| r.depth + 1)
            .max()
            .unwrap_or(0)
    }

    /// Computes the representation hash.
    pub fn repr_hash(&self) -> [u8; 32] {
        let d1 = self.refs.len() as u8;
        let d2 = (self.bit_len / 8 + (self.bit_len + 7) / 8) as u8;

        let mut hasher = Sha256::new();
        hasher.update([d1, d2]);
        hasher.update(self.padded_data());
        for r in &self.refs {
            hasher.update(r.depth.to_be_bytes());
        }
        for r in &self.refs {
            hasher.update(r.hash);
        }
        hasher.finalize().into()
    }

    /// Returns this cell as a reference for a parent.
    pub fn to_ref(&self) -> CellRef {
        CellRef {
            hash: self.repr_hash(),
            depth: self.depth(),
        }
    }

    /// Data with the completion tag (a single 1 bit) appended to a partial last byte.
    fn padded_data(&self) -> Vec<u8> {
        let mut data = self.data.clone();
        let used = self.bit_len % 8;
        if used != 0 {
            if let Some(last) = data.last_mut() {
                *last |= 0x80 >> used;
            }
        }
        data
    }
}

/// Incremental builder for a [`Cell`].
#[derive(Debug, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<CellRef>,
}

impl CellBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, CellError> {
        self.ensure_capacity(1)?;
        self.push_bit(bit);
        Ok(self)
    }

    /// Stores the low `bits` bits of `value`, most significant first.
    pub fn store_uint(&mut self, value: u64, bits: usize) -> Result<&mut Self, CellError> {
        self.ensure_capacity(bits)?;
        for i in (0..bits).rev() {
            let bit = i < 64 && (value >> i) & 1 == 1;
            self.push_bit(bit);
        }
        Ok(self)
    }

    pub fn store_u32(&mut self, value: u32) -> Result<&mut Self, CellError> {
        self.store_uint(u64::from(value), 32)
    }

    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CellError> {
        self.ensure_capacity(bytes.len() * 8)?;
        for &byte in bytes {
            for i in (0..8).rev() {
                self.push_bit((byte >> i) & 1 == 1);
            }
        }
        Ok(self)
    }

    pub fn store_ref(&mut self, cell: CellRef) -> Result<&mut Self, CellError> {
        if self.refs.len() >= MAX_REFS {
            return Err(CellError::RefOverflow);
        }
        self.refs.push(cell);
        Ok(self)
    }

    pub fn build(&self) -> Cell {
        Cell {
            data: self.data.clone(),
            bit_len: self.bit_len,
            refs: self.refs.clone(),
        }
    }

    fn ensure_capacity(&self, bits: usize) -> Result<(), CellError> {
        let total = self.bit_len + bits;
        if total > MAX_BITS {
            return Err(CellError::BitOverflow(total));
        }
        Ok(())
    }

    #[inline]
    fn push_bit(&mut self, bit: bool) {
        let offset = self.bit_len % 8;
        if offset == 0 {
            self.data.push(0);
        }
        if bit {
            if let Some(last) = self.data.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.bit_len += 1;
    }
}
