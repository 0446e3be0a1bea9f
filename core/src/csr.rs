//! Compressed Sparse Row matrix and the postal-code context graph.
//!
//! Both share the same on-disk row-pointer/indices layout; the matrix adds a
//! `values: Vec<f64>` column and the graph omits it (an unweighted adjacency).

use std::io::{Read, Write};

use crate::binary;
use crate::error::CodecError;

/// Sparse `f64` matrix in compressed-sparse-row form.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    m: usize,
    n: usize,
    indptr: Vec<u32>,
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Build from raw parts, validating CSR invariants (§3: `indptr`
    /// non-decreasing, `indptr[0] == 0`, `indptr[m] == nnz`, strictly
    /// increasing column indices within each row).
    pub fn from_parts(
        m: usize,
        n: usize,
        indptr: Vec<u32>,
        indices: Vec<u32>,
        values: Vec<f64>,
    ) -> Result<Self, CodecError> {
        validate_csr(m, n, &indptr, &indices)?;
        if values.len() != indices.len() {
            return Err(CodecError::CorruptModel(format!(
                "CSR values length {} != indices length {}",
                values.len(),
                indices.len()
            )));
        }
        Ok(Self {
            m,
            n,
            indptr,
            indices,
            values,
        })
    }

    pub fn rows(&self) -> usize {
        self.m
    }

    pub fn cols(&self) -> usize {
        self.n
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Iterate `(column, value)` pairs of row `i` in increasing column order.
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (u32, f64)> + '_ {
        let start = self.indptr[i] as usize;
        let end = self.indptr[i + 1] as usize;
        self.indices[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }

    /// Dense matrix-vector product `A * vector`.
    pub fn multiply(&self, vector: &[f64]) -> Vec<f64> {
        assert_eq!(vector.len(), self.n);
        (0..self.m)
            .map(|i| {
                self.row_iter(i)
                    .map(|(col, val)| val * vector[col as usize])
                    .sum()
            })
            .collect()
    }

    pub fn write<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        binary::write_u32(w, self.m as u32)?;
        binary::write_u32(w, self.n as u32)?;
        binary::write_u64(w, self.indptr.len() as u64)?;
        binary::write_u32_array(w, &self.indptr)?;
        binary::write_u64(w, self.indices.len() as u64)?;
        binary::write_u32_array(w, &self.indices)?;
        binary::write_u64(w, self.values.len() as u64)?;
        binary::write_f64_array(w, &self.values)
    }

    pub fn read<R: Read>(r: &mut R) -> Result<Self, CodecError> {
        let m = binary::read_u32(r)? as usize;
        let n = binary::read_u32(r)? as usize;
        let indptr_len = binary::read_u64(r)? as usize;
        let indptr = binary::read_u32_array(r, indptr_len)?;
        let indices_len = binary::read_u64(r)? as usize;
        let indices = binary::read_u32_array(r, indices_len)?;
        let data_len = binary::read_u64(r)? as usize;
        let values = binary::read_f64_array(r, data_len)?;
        Self::from_parts(m, n, indptr, indices, values)
    }
}

/// Directed CSR adjacency: postal code -> administrative-region nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    n: usize,
    indptr: Vec<u32>,
    indices: Vec<u32>,
}

impl Graph {
    pub fn from_parts(n: usize, indptr: Vec<u32>, indices: Vec<u32>) -> Result<Self, CodecError> {
        // The graph's row count equals its node count: it is a square
        // adjacency over the same node set (§3: "postal code -> administrative
        // -region nodes").
        validate_csr(n, n, &indptr, &indices)?;
        Ok(Self { n, indptr, indices })
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    pub fn has_edge(&self, u: u32, v: u32) -> bool {
        let u = u as usize;
        if u >= self.n {
            return false;
        }
        let start = self.indptr[u] as usize;
        let end = self.indptr[u + 1] as usize;
        self.indices[start..end].binary_search(&v).is_ok()
    }

    pub fn neighbors(&self, u: u32) -> &[u32] {
        let u = u as usize;
        if u >= self.n {
            return &[];
        }
        let start = self.indptr[u] as usize;
        let end = self.indptr[u + 1] as usize;
        &self.indices[start..end]
    }

    pub fn write<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        binary::write_u32(w, 0)?; // type: 0 = directed
        binary::write_u32(w, self.n as u32)?;
        binary::write_u32(w, self.n as u32)?;
        binary::write_u64(w, self.indptr.len() as u64)?;
        binary::write_u32_array(w, &self.indptr)?;
        binary::write_u64(w, self.indices.len() as u64)?;
        binary::write_u32_array(w, &self.indices)
    }

    pub fn read<R: Read>(r: &mut R) -> Result<Self, CodecError> {
        let ty = binary::read_u32(r)?;
        if ty != 0 {
            return Err(CodecError::CorruptModel(format!(
                "unsupported graph type {ty}"
            )));
        }
        let m = binary::read_u32(r)? as usize;
        let n = binary::read_u32(r)? as usize;
        if m != n {
            return Err(CodecError::CorruptModel(format!(
                "graph is not square: {m}x{n}"
            )));
        }
        let indptr_len = binary::read_u64(r)? as usize;
        let indptr = binary::read_u32_array(r, indptr_len)?;
        let indices_len = binary::read_u64(r)? as usize;
        let indices = binary::read_u32_array(r, indices_len)?;
        Self::from_parts(n, indptr, indices)
    }
}

fn validate_csr(m: usize, _n: usize, indptr: &[u32], indices: &[u32]) -> Result<(), CodecError> {
    if indptr.len() != m + 1 {
        return Err(CodecError::CorruptModel(format!(
            "indptr length {} does not match m+1 = {}",
            indptr.len(),
            m + 1
        )));
    }
    if indptr[0] != 0 {
        return Err(CodecError::CorruptModel("indptr[0] must be 0".into()));
    }
    if *indptr.last().unwrap() as usize != indices.len() {
        return Err(CodecError::CorruptModel(
            "indptr[m] must equal nnz".into(),
        ));
    }
    for w in indptr.windows(2) {
        if w[1] < w[0] {
            return Err(CodecError::CorruptModel("indptr must be non-decreasing".into()));
        }
    }
    for i in 0..m {
        let start = indptr[i] as usize;
        let end = indptr[i + 1] as usize;
        for w in indices[start..end].windows(2) {
            if w[1] <= w[0] {
                return Err(CodecError::CorruptModel(format!(
                    "row {i} column indices are not strictly increasing"
                )));
            }
        }
    }
    Ok(())
}
