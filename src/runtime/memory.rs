//! Write-once segmented memory.
//!
//! Every `new (...)`, `alloc()` and `call_contract` result gets its own segment. A cell is written at most once;
//! writing it again only checks the value.

use starkbench_core::Felt;
use starkbench_core::errors::{ASSERT_EQ_FAILED_MSG, UNKNOWN_MEMORY_VALUE_MSG};
use thiserror::Error;

/// Highest offset a segment may grow to.
pub const MAX_SEGMENT_LEN: usize = 1 << 24;

/// Pointer into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relocatable {
    pub segment: usize,
    pub offset: usize,
}

impl std::fmt::Display for Relocatable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.segment, self.offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("{msg} {0}", msg = UNKNOWN_MEMORY_VALUE_MSG)]
    UnknownValue(Relocatable),
    #[error("{msg}: memory cell {addr} holds {current}, cannot write {new}", msg = ASSERT_EQ_FAILED_MSG)]
    InconsistentWrite {
        addr: Relocatable,
        current: Felt,
        new: Felt,
    },
    #[error("Offset {0} is out of bounds")]
    OutOfBounds(Relocatable),
    #[error("Unknown segment {0}")]
    UnknownSegment(usize),
}

#[derive(Debug, Default)]
pub struct Memory {
    segments: Vec<Vec<Option<Felt>>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_segment(&mut self) -> Relocatable {
        self.segments.push(Vec::new());
        Relocatable {
            segment: self.segments.len() - 1,
            offset: 0,
        }
    }

    /// New segment holding `values` from offset 0.
    pub fn load_segment(&mut self, values: impl IntoIterator<Item = Felt>) -> Relocatable {
        self.segments.push(values.into_iter().map(Some).collect());
        Relocatable {
            segment: self.segments.len() - 1,
            offset: 0,
        }
    }

    pub fn get(&self, addr: Relocatable) -> Result<&Felt, MemoryError> {
        let segment = self
            .segments
            .get(addr.segment)
            .ok_or(MemoryError::UnknownSegment(addr.segment))?;
        segment
            .get(addr.offset)
            .and_then(Option::as_ref)
            .ok_or(MemoryError::UnknownValue(addr))
    }

    /// Write-once store; a second write must agree with the first.
    pub fn insert(&mut self, addr: Relocatable, value: Felt) -> Result<(), MemoryError> {
        if addr.offset >= MAX_SEGMENT_LEN {
            return Err(MemoryError::OutOfBounds(addr));
        }
        let segment = self
            .segments
            .get_mut(addr.segment)
            .ok_or(MemoryError::UnknownSegment(addr.segment))?;
        if segment.len() <= addr.offset {
            segment.resize(addr.offset + 1, None);
        }
        match &segment[addr.offset] {
            Some(current) if *current != value => Err(MemoryError::InconsistentWrite {
                addr,
                current: current.clone(),
                new: value,
            }),
            Some(_) => Ok(()),
            None => {
                segment[addr.offset] = Some(value);
                Ok(())
            }
        }
    }

    /// Read `len` consecutive cells starting at `addr`.
    pub fn get_range(&self, addr: Relocatable, len: usize) -> Result<Vec<Felt>, MemoryError> {
        if len > MAX_SEGMENT_LEN {
            return Err(MemoryError::OutOfBounds(Relocatable {
                segment: addr.segment,
                offset: addr.offset.saturating_add(len),
            }));
        }
        (0..len)
            .map(|i| {
                self.get(Relocatable {
                    segment: addr.segment,
                    offset: addr.offset + i,
                })
                .cloned()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_once_accepts_same_value() {
        let mut memory = Memory::new();
        let base = memory.add_segment();
        memory.insert(base, Felt::from(7u64)).unwrap();
        memory.insert(base, Felt::from(7u64)).unwrap();
        assert_eq!(memory.get(base).unwrap(), &Felt::from(7u64));
    }

    #[test]
    fn test_write_once_rejects_different_value() {
        let mut memory = Memory::new();
        let base = memory.add_segment();
        memory.insert(base, Felt::from(7u64)).unwrap();
        let err = memory.insert(base, Felt::from(8u64)).unwrap_err();
        assert!(matches!(err, MemoryError::InconsistentWrite { .. }));
        assert!(err.to_string().starts_with(ASSERT_EQ_FAILED_MSG));
    }

    #[test]
    fn test_unset_cell_is_unknown() {
        let mut memory = Memory::new();
        let base = memory.add_segment();
        memory
            .insert(
                Relocatable {
                    segment: base.segment,
                    offset: 2,
                },
                Felt::one(),
            )
            .unwrap();
        let err = memory.get(base).unwrap_err();
        assert_eq!(err, MemoryError::UnknownValue(base));
    }

    #[test]
    fn test_get_range_of_loaded_segment() {
        let mut memory = Memory::new();
        let base = memory.load_segment([Felt::from(1u64), Felt::from(2u64)]);
        assert_eq!(memory.get_range(base, 2).unwrap(), vec![Felt::from(1u64), Felt::from(2u64)]);
        assert!(memory.get_range(base, 3).is_err());
    }

    #[test]
    fn test_offset_limit() {
        let mut memory = Memory::new();
        let base = memory.add_segment();
        let far = Relocatable {
            segment: base.segment,
            offset: MAX_SEGMENT_LEN,
        };
        assert_eq!(memory.insert(far, Felt::one()), Err(MemoryError::OutOfBounds(far)));
    }
}
