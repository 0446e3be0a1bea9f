//! Double-array trie: compact lookup-only mapping from byte strings to a
//! `u32` payload (§3, §4.B).
//!
//! This is a reader for the on-disk double-array format only; the crate
//! never builds a trie at runtime, only loads one produced by the model
//! build pipeline.

use std::io::{Read, Write};

use crate::binary;
use crate::error::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    base: i32,
    check: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DataNode {
    tail_offset: u32,
    payload: u32,
}

/// Root node id per §4.B step 1.
const ROOT: usize = 2;

/// Compact `bytes -> u32` map stored as an alphabet permutation, a
/// `(base, check)` node array, a `(tail_offset, payload)` data-node array
/// and a suffix blob.
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleArrayTrie {
    alpha_map: [u32; 256],
    nodes: Vec<Node>,
    data_nodes: Vec<DataNode>,
    tail: Vec<u8>,
}

impl DoubleArrayTrie {
    pub fn from_parts(
        alpha_map: [u32; 256],
        nodes: Vec<Node>,
        data_nodes: Vec<DataNode>,
        tail: Vec<u8>,
    ) -> Self {
        Self {
            alpha_map,
            nodes,
            data_nodes,
            tail,
        }
    }

    /// Look up `key`, returning its `u32` payload if present (§4.B).
    pub fn get(&self, key: &[u8]) -> Option<u32> {
        let mut cur = ROOT;
        let mut i = 0usize;

        while i < key.len() {
            let a = self.alpha_map[key[i] as usize];
            if a == 0 {
                return None;
            }
            let node = self.nodes.get(cur)?;
            let next = node.base.checked_add(a as i32)?;
            if next < 0 {
                return None;
            }
            let next = next as usize;
            let next_node = self.nodes.get(next)?;
            if next_node.check != cur as i32 {
                return None;
            }
            cur = next;
            i += 1;

            if next_node.base < 0 {
                let d = (-next_node.base - 1) as usize;
                let data = self.data_nodes.get(d)?;
                return self.match_tail(data, &key[i..]).then_some(data.payload);
            }
        }

        None
    }

    fn match_tail(&self, data: &DataNode, remaining: &[u8]) -> bool {
        let start = data.tail_offset as usize;
        let end = self.tail[start..]
            .iter()
            .position(|&b| b == 0)
            .map(|rel| start + rel)
            .unwrap_or(self.tail.len());
        &self.tail[start..end] == remaining
    }

    /// Reinterpret a payload as a signed 32-bit integer, preserving the bit
    /// pattern (range-preserving reinterpretation per §4.B).
    pub fn payload_as_i32(payload: u32) -> i32 {
        payload as i32
    }

    pub fn write<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        for &a in self.alpha_map.iter() {
            binary::write_u32(w, a)?;
        }
        binary::write_u32(w, self.nodes.len() as u32)?;
        for n in &self.nodes {
            binary::write_i32(w, n.base)?;
            binary::write_i32(w, n.check)?;
        }
        binary::write_u32(w, self.data_nodes.len() as u32)?;
        for d in &self.data_nodes {
            binary::write_u32(w, d.tail_offset)?;
            binary::write_u32(w, d.payload)?;
        }
        binary::write_u32(w, self.tail.len() as u32)?;
        w.write_all(&self.tail)
    }

    /// Read a trie body (everything after the `0xABABABAB` signature).
    pub fn read<R: Read>(r: &mut R) -> Result<Self, CodecError> {
        let mut alpha_map = [0u32; 256];
        for slot in alpha_map.iter_mut() {
            *slot = binary::read_u32(r)?;
        }

        let node_count = binary::read_u32(r)? as usize;
        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            let base = binary::read_i32(r)?;
            let check = binary::read_i32(r)?;
            nodes.push(Node { base, check });
        }

        let data_count = binary::read_u32(r)? as usize;
        let mut data_nodes = Vec::with_capacity(data_count);
        for _ in 0..data_count {
            let tail_offset = binary::read_u32(r)?;
            let payload = binary::read_u32(r)?;
            data_nodes.push(DataNode { tail_offset, payload });
        }

        let tail_len = binary::read_u32(r)? as usize;
        let tail = binary::read_bytes(r, tail_len)?;

        Ok(Self {
            alpha_map,
            nodes,
            data_nodes,
            tail,
        })
    }

    /// Load a trie file, validating the `0xABABABAB` signature first.
    pub fn load<R: Read>(r: &mut R) -> Result<Self, CodecError> {
        binary::check_signature_forward(r, 0xABAB_ABAB)?;
        Self::read(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a tiny trie by hand encoding the single key `"ab"` -> `42`:
    /// root (id 2) consumes 'a' to reach node 3, which is a terminal whose
    /// tail blob holds the unconsumed suffix `"b"`.
    fn single_key_trie() -> DoubleArrayTrie {
        let mut alpha_map = [0u32; 256];
        alpha_map[b'a' as usize] = 1;
        alpha_map[b'b' as usize] = 2;

        // nodes[2] is root with base=1 so that base+1=3 is reached on 'a'.
        // nodes[3].check = 2 links it back to root; its base is negative,
        // marking it terminal with data_nodes[0].
        let mut nodes = vec![Node { base: 0, check: 0 }; 4];
        nodes[2] = Node { base: 1, check: 0 };
        nodes[3] = Node { base: -1, check: 2 };

        let data_nodes = vec![DataNode {
            tail_offset: 0,
            payload: 42,
        }];
        let tail = b"b\0".to_vec();

        DoubleArrayTrie::from_parts(alpha_map, nodes, data_nodes, tail)
    }

    #[test]
    fn looks_up_inserted_key() {
        let trie = single_key_trie();
        assert_eq!(trie.get(b"ab"), Some(42));
    }

    #[test]
    fn rejects_prefix_and_superstring() {
        let trie = single_key_trie();
        assert_eq!(trie.get(b"a"), None);
        assert_eq!(trie.get(b"abc"), None);
        assert_eq!(trie.get(b"ac"), None);
    }

    #[test]
    fn rejects_unmapped_byte() {
        let trie = single_key_trie();
        assert_eq!(trie.get(b"z"), None);
    }

    /// Three keys sharing the single-byte prefix `"a"`, diverging at the
    /// second byte (`b`/`c`/`d`), each with its own terminal and tail
    /// suffix. Exercises a branching node rather than a single linear chain.
    fn branching_trie() -> DoubleArrayTrie {
        let mut alpha_map = [0u32; 256];
        alpha_map[b'a' as usize] = 1;
        alpha_map[b'b' as usize] = 2;
        alpha_map[b'c' as usize] = 3;
        alpha_map[b'd' as usize] = 4;

        // root (id 2) --a--> node 3 (branch, base=1)
        // node 3 --b--> node 4 (base+2=3? use base=1 so 1+2=3 clashes with
        // node 3 itself; pick base=10 so children land at 12,13,14).
        let mut nodes = vec![Node { base: 0, check: 0 }; 15];
        nodes[2] = Node { base: 2, check: 0 }; // root -a-> 2+1=3
        nodes[3] = Node { base: 10, check: 2 }; // "a" lands here, branches on b/c/d
        nodes[12] = Node { base: -1, check: 3 }; // "ab" terminal (10+2)
        nodes[13] = Node { base: -2, check: 3 }; // "ac" terminal (10+3)
        nodes[14] = Node { base: -3, check: 3 }; // "ad" terminal (10+4)

        let data_nodes = vec![
            DataNode { tail_offset: 0, payload: 100 }, // "ab" -> tail ""
            DataNode { tail_offset: 1, payload: 200 }, // "ac" -> tail ""
            DataNode { tail_offset: 2, payload: 300 }, // "ad" -> tail ""
        ];
        let tail = vec![0u8, 0u8, 0u8];

        DoubleArrayTrie::from_parts(alpha_map, nodes, data_nodes, tail)
    }

    #[test]
    fn branching_trie_resolves_each_sibling_independently() {
        let trie = branching_trie();
        assert_eq!(trie.get(b"ab"), Some(100));
        assert_eq!(trie.get(b"ac"), Some(200));
        assert_eq!(trie.get(b"ad"), Some(300));
        assert_eq!(trie.get(b"a"), None);
        assert_eq!(trie.get(b"ae"), None);
        assert_eq!(trie.get(b"abc"), None);
    }

    #[test]
    fn payload_reinterprets_bit_pattern_as_i32() {
        assert_eq!(DoubleArrayTrie::payload_as_i32(u32::MAX), -1);
        assert_eq!(DoubleArrayTrie::payload_as_i32(42), 42);
    }

    #[test]
    fn binary_round_trip() {
        let trie = single_key_trie();
        let mut buf = Vec::new();
        trie.write(&mut buf).unwrap();
        let mut cur = std::io::Cursor::new(buf);
        let loaded = DoubleArrayTrie::read(&mut cur).unwrap();
        assert_eq!(loaded.get(b"ab"), Some(42));
    }

    #[test]
    fn load_validates_signature() {
        let trie = single_key_trie();
        let mut buf = Vec::new();
        binary::write_u32(&mut buf, 0xABAB_ABAB).unwrap();
        trie.write(&mut buf).unwrap();
        let mut cur = std::io::Cursor::new(buf);
        assert!(DoubleArrayTrie::load(&mut cur).is_ok());
    }
}
