// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Head layout of encoded tuples
//!
//! Static elements live inline in the head, consecutive booleans share bytes
//! (first boolean in the highest bit), and dynamic elements are a 2-byte
//! big-endian offset in the head pointing into the tail.

use crate::abi::type_spec::TypeSpec;
use crate::error::IrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementLocation {
    Static { offset: usize, length: usize },
    /// Absolute bit index, 0 being the most significant bit of byte 0
    Bool { bit: usize },
    /// Offset of the 2-byte head entry, and the head entry of the next dynamic
    /// element (whose target ends this element's tail)
    Dynamic { head: usize, next_head: Option<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleLayout {
    locations: Vec<ElementLocation>,
    head_length: usize,
}

impl TupleLayout {
    pub fn new(elements: &[TypeSpec]) -> Self {
        let mut locations = Vec::with_capacity(elements.len());
        let mut offset = 0;
        let mut i = 0;
        while i < elements.len() {
            match &elements[i] {
                TypeSpec::Bool => {
                    let run = elements[i..]
                        .iter()
                        .take_while(|e| **e == TypeSpec::Bool)
                        .count();
                    for k in 0..run {
                        locations.push(ElementLocation::Bool { bit: offset * 8 + k });
                    }
                    offset += run.div_ceil(8);
                    i += run;
                    continue;
                }
                elem if elem.is_dynamic() => {
                    locations.push(ElementLocation::Dynamic {
                        head: offset,
                        next_head: None,
                    });
                    offset += 2;
                }
                elem => {
                    // static types always have a length
                    let length = elem.byte_length_static().unwrap_or_default();
                    locations.push(ElementLocation::Static { offset, length });
                    offset += length;
                }
            }
            i += 1;
        }

        let heads: Vec<usize> = locations
            .iter()
            .filter_map(|l| match l {
                ElementLocation::Dynamic { head, .. } => Some(*head),
                _ => None,
            })
            .collect();
        for loc in locations.iter_mut() {
            if let ElementLocation::Dynamic { head, next_head } = loc {
                *next_head = heads.iter().copied().find(|h| *h > *head);
            }
        }

        Self {
            locations,
            head_length: offset,
        }
    }

    pub fn location(&self, index: usize) -> Option<ElementLocation> {
        self.locations.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn head_length(&self) -> usize {
        self.head_length
    }

    /// Total length when no element is dynamic
    pub fn static_length(&self) -> Option<usize> {
        let dynamic = self
            .locations
            .iter()
            .any(|l| matches!(l, ElementLocation::Dynamic { .. }));
        (!dynamic).then_some(self.head_length)
    }

    /// Encoded bytes of element `index` within an encoded tuple
    pub fn extract(&self, encoded: &[u8], index: usize) -> Result<Vec<u8>, IrError> {
        let location = self.location(index).ok_or_else(|| IrError::TupleIndexOutOfRange {
            spec: format!("tuple of {} elements", self.len()),
            index,
        })?;
        let slice = |start: usize, end: usize| {
            encoded
                .get(start..end)
                .map(<[u8]>::to_vec)
                .ok_or(IrError::EncodingTooShort {
                    needed: end,
                    got: encoded.len(),
                })
        };
        let read_u16 = |at: usize| slice(at, at + 2).map(|b| u16::from_be_bytes([b[0], b[1]]) as usize);

        match location {
            ElementLocation::Static { offset, length } => slice(offset, offset + length),
            ElementLocation::Bool { bit } => {
                let byte = slice(bit / 8, bit / 8 + 1)?[0];
                let set = byte & (0x80 >> (bit % 8)) != 0;
                Ok(vec![if set { 0x80 } else { 0x00 }])
            }
            ElementLocation::Dynamic { head, next_head } => {
                let start = read_u16(head)?;
                let end = match next_head {
                    Some(next) => read_u16(next)?,
                    None => encoded.len(),
                };
                if end < start {
                    return Err(IrError::EncodingTooShort {
                        needed: start,
                        got: end,
                    });
                }
                slice(start, end)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_packing() {
        let layout = TupleLayout::new(&[
            TypeSpec::Uint(8),
            TypeSpec::Bool,
            TypeSpec::Bool,
            TypeSpec::Uint(16),
        ]);
        assert_eq!(layout.location(0), Some(ElementLocation::Static { offset: 0, length: 1 }));
        assert_eq!(layout.location(1), Some(ElementLocation::Bool { bit: 8 }));
        assert_eq!(layout.location(2), Some(ElementLocation::Bool { bit: 9 }));
        assert_eq!(layout.location(3), Some(ElementLocation::Static { offset: 2, length: 2 }));
        assert_eq!(layout.static_length(), Some(4));

        let encoded = [0x07, 0b0100_0000, 0x01, 0x02];
        assert_eq!(layout.extract(&encoded, 1).unwrap(), vec![0x00]);
        assert_eq!(layout.extract(&encoded, 2).unwrap(), vec![0x80]);
        assert_eq!(layout.extract(&encoded, 3).unwrap(), vec![0x01, 0x02]);
    }

    #[test]
    fn test_dynamic_elements() {
        // (string, uint8, string) with "ab" and "c"
        let layout = TupleLayout::new(&[TypeSpec::String, TypeSpec::Uint(8), TypeSpec::String]);
        assert_eq!(layout.head_length(), 5);
        assert_eq!(
            layout.location(0),
            Some(ElementLocation::Dynamic { head: 0, next_head: Some(3) })
        );
        assert_eq!(layout.static_length(), None);

        let encoded = [
            0x00, 0x05, // offset of "ab"
            0x2a, // uint8
            0x00, 0x09, // offset of "c"
            0x00, 0x02, b'a', b'b', //
            0x00, 0x01, b'c',
        ];
        assert_eq!(layout.extract(&encoded, 0).unwrap(), vec![0x00, 0x02, b'a', b'b']);
        assert_eq!(layout.extract(&encoded, 1).unwrap(), vec![0x2a]);
        assert_eq!(layout.extract(&encoded, 2).unwrap(), vec![0x00, 0x01, b'c']);
        assert!(layout.extract(&encoded[..4], 2).is_err());
        assert!(layout.extract(&encoded, 3).is_err());
    }
}
