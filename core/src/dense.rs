//! Row-major dense `f64` matrix used for CRF transition weights and Viterbi
//! scratch (`state`, `alpha`).

use crate::binary;
use crate::error::CodecError;
use std::io::{Read, Write};

#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.rows && j < self.cols);
        i * self.cols + j
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.idx(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        let idx = self.idx(i, j);
        self.data[idx] = v;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Element-wise exponential, in place.
    pub fn exp_inplace(&mut self) {
        for v in self.data.iter_mut() {
            *v = v.exp();
        }
    }

    /// Add `other` into `self`, element-wise. Panics on shape mismatch.
    pub fn add_inplace(&mut self, other: &DenseMatrix) {
        assert_eq!(self.rows, other.rows);
        assert_eq!(self.cols, other.cols);
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
    }

    /// Zero every element without changing shape.
    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Dense matrix-vector product.
    pub fn multiply(&self, vector: &[f64]) -> Vec<f64> {
        assert_eq!(vector.len(), self.cols);
        (0..self.rows)
            .map(|i| {
                self.row(i)
                    .iter()
                    .zip(vector.iter())
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect()
    }

    /// Resize in place, preserving the top-left `min(rows,rows')` x
    /// `min(cols,cols')` overlap. New cells are zero-initialized.
    pub fn resize(&mut self, new_rows: usize, new_cols: usize) {
        let mut new_data = vec![0.0; new_rows * new_cols];
        let copy_rows = self.rows.min(new_rows);
        let copy_cols = self.cols.min(new_cols);
        for i in 0..copy_rows {
            new_data[i * new_cols..i * new_cols + copy_cols]
                .copy_from_slice(&self.data[i * self.cols..i * self.cols + copy_cols]);
        }
        self.rows = new_rows;
        self.cols = new_cols;
        self.data = new_data;
    }

    /// Serialize as `u32 rows, u32 cols, rows*cols x f64`, as used by the
    /// CRF file's `L x L` transition block.
    pub fn write<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        binary::write_u32(w, self.rows as u32)?;
        binary::write_u32(w, self.cols as u32)?;
        binary::write_f64_array(w, &self.data)
    }

    pub fn read<R: Read>(r: &mut R) -> Result<Self, CodecError> {
        let rows = binary::read_u32(r)? as usize;
        let cols = binary::read_u32(r)? as usize;
        let data = binary::read_f64_array(r, rows * cols)?;
        Ok(Self { rows, cols, data })
    }
}

/// Row-major dense `u32` matrix, used for the Viterbi backpointer table
/// (§3: `backptr: dense<u32>[T×L]`). Unlike [`DenseMatrix`] this is never
/// persisted, so it carries only the subset of the API `CrfContext` needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrixU32 {
    rows: usize,
    cols: usize,
    data: Vec<u32>,
}

impl DenseMatrixU32 {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.rows && j < self.cols);
        i * self.cols + j
    }

    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.data[self.idx(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, v: u32) {
        let idx = self.idx(i, j);
        self.data[idx] = v;
    }

    /// Resize in place, preserving the top-left overlap. New cells are
    /// zero-initialized.
    pub fn resize(&mut self, new_rows: usize, new_cols: usize) {
        let mut new_data = vec![0u32; new_rows * new_cols];
        let copy_rows = self.rows.min(new_rows);
        let copy_cols = self.cols.min(new_cols);
        for i in 0..copy_rows {
            new_data[i * new_cols..i * new_cols + copy_cols]
                .copy_from_slice(&self.data[i * self.cols..i * self.cols + copy_cols]);
        }
        self.rows = new_rows;
        self.cols = new_cols;
        self.data = new_data;
    }

    /// Zero every element without changing shape.
    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|v| *v = 0);
    }
}
