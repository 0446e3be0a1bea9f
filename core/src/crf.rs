//! Linear-chain CRF model and per-call inference context with Viterbi
//! decoding (§3, §4.K).

use crate::csr::CsrMatrix;
use crate::dat::DoubleArrayTrie;
use crate::dense::{DenseMatrix, DenseMatrixU32};

/// `{ labels, state_features, state_trans_features, weights,
/// state_trans_weights, transitions }` (§3).
pub struct CrfModel {
    pub labels: Vec<String>,
    pub state_features: DoubleArrayTrie,
    pub state_trans_features: DoubleArrayTrie,
    pub weights: CsrMatrix,
    pub state_trans_weights: CsrMatrix,
    pub transitions: DenseMatrix,
}

impl CrfModel {
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// Look up a state-feature string's weight row, if the feature is known.
    pub fn state_feature_weights(&self, feature: &str) -> Option<Vec<f64>> {
        let id = self.state_features.get(feature.as_bytes())? as usize;
        if id >= self.weights.rows() {
            return None;
        }
        let mut row = vec![0.0; self.weights.cols()];
        for (col, val) in self.weights.row_iter(id) {
            row[col as usize] = val;
        }
        Some(row)
    }

    /// Look up a state-transition feature string's `[L*L]` weight row,
    /// reshaped to `[L][L]`.
    pub fn state_trans_feature_weights(&self, feature: &str) -> Option<Vec<f64>> {
        let id = self.state_trans_features.get(feature.as_bytes())? as usize;
        if id >= self.state_trans_weights.rows() {
            return None;
        }
        let mut row = vec![0.0; self.state_trans_weights.cols()];
        for (col, val) in self.state_trans_weights.row_iter(id) {
            row[col as usize] = val;
        }
        Some(row)
    }
}

/// Per-call scratch: `{ T, L, state, alpha, backptr }`, reused and resized
/// across calls (§3, §4.K).
pub struct CrfContext {
    t: usize,
    l: usize,
    pub state: DenseMatrix,
    pub alpha: DenseMatrix,
    pub backptr: DenseMatrixU32,
}

impl CrfContext {
    /// Create an empty context for a model with `num_labels` labels.
    pub fn new(num_labels: usize) -> Self {
        Self {
            t: 0,
            l: num_labels,
            state: DenseMatrix::zeros(0, num_labels),
            alpha: DenseMatrix::zeros(0, num_labels),
            backptr: DenseMatrixU32::zeros(0, num_labels),
        }
    }

    pub fn num_labels(&self) -> usize {
        self.l
    }

    pub fn window_len(&self) -> usize {
        self.t
    }

    /// Resize to `t` time steps, preserving `L` (§4.K).
    pub fn resize(&mut self, t: usize) {
        self.t = t;
        self.state.resize(t, self.l);
        self.alpha.resize(t, self.l);
        self.backptr.resize(t, self.l);
    }

    /// Zero all three arrays (§4.K).
    pub fn reset(&mut self) {
        self.state.clear();
        self.alpha.clear();
        self.backptr.clear();
    }

    /// Allocate/zero for a new call of length `t` in one step (§4.L step 2:
    /// `crf.prepare(T)` => reset + resize).
    pub fn prepare(&mut self, t: usize) {
        self.reset();
        self.resize(t);
    }
}

/// Viterbi decode result: the best label-id sequence and its score (§4.K).
pub struct Decoded {
    pub labels: Vec<u32>,
    pub score: f64,
}

/// Run Viterbi decoding over `ctx.state`/`transitions`, writing `alpha` and
/// `backptr` into `ctx` and returning the best label sequence. Tie-breaks in
/// the arg-max pick the smallest label index (deterministic).
pub fn viterbi(ctx: &mut CrfContext, transitions: &DenseMatrix) -> Decoded {
    viterbi_with_overlays(ctx, transitions, &[])
}

/// Like [`viterbi`], but per-step transition overlays (§4.J: state-transition
/// features contribute a transient `[L×L]` overlay added to `transitions`
/// before decoding that step) are added to the base `transitions` when
/// scoring the edge into step `time`. `overlays[time]` (if present) is the
/// overlay used for the transition arriving at `time`; `overlays[0]` is
/// never consulted since there is no incoming edge at the first step.
pub fn viterbi_with_overlays(
    ctx: &mut CrfContext,
    transitions: &DenseMatrix,
    overlays: &[Option<DenseMatrix>],
) -> Decoded {
    let t = ctx.window_len();
    let l = ctx.num_labels();

    if t == 0 {
        return Decoded {
            labels: Vec::new(),
            score: 0.0,
        };
    }

    for label in 0..l {
        let v = ctx.state.get(0, label);
        ctx.alpha.set(0, label, v);
    }

    for time in 1..t {
        let overlay = overlays.get(time).and_then(|o| o.as_ref());
        for next_label in 0..l {
            let mut best_score = f64::NEG_INFINITY;
            let mut best_prev = 0u32;
            for prev_label in 0..l {
                let mut trans = transitions.get(prev_label, next_label);
                if let Some(overlay) = overlay {
                    trans += overlay.get(prev_label, next_label);
                }
                let candidate = ctx.alpha.get(time - 1, prev_label) + trans;
                if candidate > best_score {
                    best_score = candidate;
                    best_prev = prev_label as u32;
                }
            }
            ctx.alpha
                .set(time, next_label, best_score + ctx.state.get(time, next_label));
            ctx.backptr.set(time, next_label, best_prev);
        }
    }

    let mut best_label = 0usize;
    let mut best_score = f64::NEG_INFINITY;
    for label in 0..l {
        let v = ctx.alpha.get(t - 1, label);
        if v > best_score {
            best_score = v;
            best_label = label;
        }
    }

    let mut labels = vec![0u32; t];
    labels[t - 1] = best_label as u32;
    for time in (0..t - 1).rev() {
        let next_label = labels[time + 1] as usize;
        labels[time] = ctx.backptr.get(time + 1, next_label);
    }

    Decoded {
        labels,
        score: best_score,
    }
}
