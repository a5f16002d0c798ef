//! The persisted compression artifact.
//!
//! A [`CompressedTree`] carries the final token sequence as UTF-8 wire text and
//! the rule dictionary as `R<id>` → expansion text. Rules live in a `BTreeMap`
//! so iteration, and therefore [`CompressedTree::to_bytes`], is deterministic.
//!
//! # Binary layout
//!
//! All integers are little-endian `u32` except the version byte.
//!
//! ```text
//! "TRPR" | version: u8 | rule_count
//!   rule_count × (name_len | name | expansion_len | expansion)
//! structure_len | structure
//! ```

use crate::error::{CompressionError, Result};
use crate::linearize::from_wire_text;
use crate::symbol::{parse_rule_name, Token};
use std::collections::BTreeMap;
use std::fmt;

const MAGIC: &[u8; 4] = b"TRPR";
const VERSION: u8 = 1;

/// Compressed form of one dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompressedTree {
    structure: Vec<u8>,
    rules: BTreeMap<String, String>,
}

impl CompressedTree {
    pub fn new(structure: Vec<u8>, rules: BTreeMap<String, String>) -> Self {
        Self { structure, rules }
    }

    /// The degenerate artifact of the sentinel tree.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.structure.is_empty() && self.rules.is_empty()
    }

    /// UTF-8 wire text of the compressed token sequence.
    pub fn structure(&self) -> &[u8] {
        &self.structure
    }

    pub fn rules(&self) -> &BTreeMap<String, String> {
        &self.rules
    }

    /// Parses the structure bytes into tokens.
    pub fn structure_tokens(&self) -> Result<Vec<Token>> {
        let text = std::str::from_utf8(&self.structure).map_err(|e| {
            CompressionError::malformed(e.valid_up_to(), "structure is not valid UTF-8")
        })?;
        from_wire_text(text)
    }

    /// Parses the rule dictionary into token expansions keyed by rule id.
    pub fn rule_tokens(&self) -> Result<BTreeMap<u32, Vec<Token>>> {
        let mut rules = BTreeMap::new();
        for (index, (name, expansion)) in self.rules.iter().enumerate() {
            let id = parse_rule_name(name).ok_or_else(|| {
                CompressionError::malformed(index, format!("invalid rule name {:?}", name))
            })?;
            // Canonical names map one-to-one onto ids
            rules.insert(id, from_wire_text(expansion)?);
        }
        Ok(rules)
    }

    /// Serializes into the binary wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(
            MAGIC.len() + 1 + 8 + self.structure.len() + self.rules.len() * 16,
        );
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        write_len(&mut out, self.rules.len())?;
        for (name, expansion) in &self.rules {
            write_bytes(&mut out, name.as_bytes())?;
            write_bytes(&mut out, expansion.as_bytes())?;
        }
        write_bytes(&mut out, &self.structure)?;
        Ok(out)
    }

    /// Parses the binary wire format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader { bytes, offset: 0 };

        if reader.take(MAGIC.len())? != MAGIC {
            return Err(CompressionError::malformed(0, "bad magic"));
        }
        let version = reader.take(1)?[0];
        if version != VERSION {
            return Err(CompressionError::malformed(
                4,
                format!("unsupported version {}", version),
            ));
        }

        let rule_count = reader.read_u32()? as usize;
        let mut rules = BTreeMap::new();
        for _ in 0..rule_count {
            let position = reader.offset;
            let name = reader.read_string()?;
            let expansion = reader.read_string()?;
            if rules.insert(name, expansion).is_some() {
                return Err(CompressionError::malformed(position, "duplicate rule name"));
            }
        }
        let structure = reader.read_bytes()?.to_vec();

        if reader.offset != bytes.len() {
            return Err(CompressionError::malformed(reader.offset, "trailing bytes"));
        }
        Ok(Self { structure, rules })
    }
}

impl fmt::Display for CompressedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompressedTree({} rules, {} structure bytes)",
            self.rules.len(),
            self.structure.len()
        )
    }
}

fn write_len(out: &mut Vec<u8>, len: usize) -> Result<()> {
    let len = u32::try_from(len).map_err(|_| {
        CompressionError::InvalidArgument(format!("length {} does not fit the wire format", len))
    })?;
    out.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    write_len(out, bytes.len())?;
    out.extend_from_slice(bytes);
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| CompressionError::malformed(self.offset, "unexpected end of input"))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let raw = self.take(4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    fn read_string(&mut self) -> Result<String> {
        let position = self.offset;
        let raw = self.read_bytes()?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| CompressionError::malformed(position, "string is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompressedTree {
        CompressedTree::new(
            b"root | R0 R0 ]".to_vec(),
            BTreeMap::from([("R0".to_owned(), "leaf | ]".to_owned())]),
        )
    }

    #[test]
    fn test_bytes_layout() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"TRPR");
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[5..9], &1u32.to_le_bytes());
        assert_eq!(&bytes[9..13], &2u32.to_le_bytes());
        assert_eq!(&bytes[13..15], b"R0");
        assert_eq!(CompressedTree::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_empty_roundtrip() {
        let empty = CompressedTree::empty();
        assert!(empty.is_empty());
        let bytes = empty.to_bytes().unwrap();
        assert_eq!(bytes.len(), 13);
        assert_eq!(CompressedTree::from_bytes(&bytes).unwrap(), empty);
    }

    #[test]
    fn test_truncated_bytes_rejected() {
        let bytes = sample().to_bytes().unwrap();
        for cut in 0..bytes.len() {
            let err = CompressedTree::from_bytes(&bytes[..cut]).unwrap_err();
            assert!(matches!(err, CompressionError::MalformedSequence { .. }));
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.push(0);
        assert!(CompressedTree::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_bad_magic_and_version() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(CompressedTree::from_bytes(&bytes).is_err());

        let mut bytes = sample().to_bytes().unwrap();
        bytes[4] = 9;
        assert!(CompressedTree::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_rule_tokens() {
        let rules = sample().rule_tokens().unwrap();
        assert_eq!(
            rules[&0],
            vec![Token::terminal("leaf"), Token::Separator, Token::End]
        );
    }

    #[test]
    fn test_invalid_rule_names() {
        let tree = CompressedTree::new(
            Vec::new(),
            BTreeMap::from([("X1".to_owned(), "a b".to_owned())]),
        );
        assert!(tree.rule_tokens().is_err());

        let tree = CompressedTree::new(
            Vec::new(),
            BTreeMap::from([
                ("R1".to_owned(), "a b".to_owned()),
                ("R01".to_owned(), "c d".to_owned()),
            ]),
        );
        assert!(tree.rule_tokens().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let compressed = sample();
        let json = serde_json::to_string(&compressed).unwrap();
        let restored: CompressedTree = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, compressed);
        assert_eq!(restored.rule_tokens().unwrap(), compressed.rule_tokens().unwrap());
    }

    #[test]
    fn test_non_canonical_rule_name_alone() {
        let tree = CompressedTree::new(
            b"R007".to_vec(),
            BTreeMap::from([("R007".to_owned(), "a b".to_owned())]),
        );
        assert!(matches!(
            tree.rule_tokens(),
            Err(CompressionError::MalformedSequence { .. })
        ));
        assert!(tree.structure_tokens().is_err());
    }

    #[test]
    fn test_invalid_utf8_structure() {
        let tree = CompressedTree::new(vec![0xff, 0xfe], BTreeMap::new());
        assert!(matches!(
            tree.structure_tokens(),
            Err(CompressionError::MalformedSequence { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            "CompressedTree(1 rules, 14 structure bytes)"
        );
    }
}
