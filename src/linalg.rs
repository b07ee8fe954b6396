//! Fixed-shape dense matrices, just enough for a three-layer perceptron.

use std::ops::{Index, IndexMut};

use rand::Rng;

/// Row-major `R x C` matrix of `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<const R: usize, const C: usize> {
    rows: [[f64; C]; R],
}

impl<const R: usize, const C: usize> Matrix<R, C> {
    pub const ROWS: usize = R;
    pub const COLS: usize = C;

    pub fn zeros() -> Self {
        Self { rows: [[0.0; C]; R] }
    }

    pub fn from_rows(rows: [[f64; C]; R]) -> Self {
        Self { rows }
    }

    /// Elements drawn from `U[-epsilon, epsilon)`.
    pub fn uniform(rng: &mut impl Rng, epsilon: f64) -> Self {
        let mut m = Self::zeros();
        m.for_each_mut(|v| *v = symmetric_noise(rng, epsilon));
        m
    }

    pub fn rows(&self) -> &[[f64; C]; R] {
        &self.rows
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [f64; C] {
        &mut self.rows[r]
    }

    pub fn mul_vec(&self, v: &[f64; C]) -> [f64; R] {
        let mut out = [0.0; R];
        for (o, row) in out.iter_mut().zip(&self.rows) {
            *o = row.iter().zip(v).map(|(w, x)| w * x).sum();
        }
        out
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut f64)) {
        for row in &mut self.rows {
            for v in row.iter_mut() {
                f(v);
            }
        }
    }

    /// Add independent `U[-epsilon, epsilon)` noise to every element.
    pub fn perturb(&mut self, rng: &mut impl Rng, epsilon: f64) {
        self.for_each_mut(|v| *v += symmetric_noise(rng, epsilon));
    }

    pub fn sum_of_squares(&self) -> f64 {
        self.rows.iter().flatten().map(|v| v * v).sum()
    }
}

impl<const R: usize, const C: usize> Default for Matrix<R, C> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<const R: usize, const C: usize> Index<(usize, usize)> for Matrix<R, C> {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        &self.rows[r][c]
    }
}

impl<const R: usize, const C: usize> IndexMut<(usize, usize)> for Matrix<R, C> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        &mut self.rows[r][c]
    }
}

/// `rand * 2eps - eps`, so a zero epsilon yields exactly zero.
fn symmetric_noise(rng: &mut impl Rng, epsilon: f64) -> f64 {
    rng.r#gen::<f64>() * 2.0 * epsilon - epsilon
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn sigmoid_all<const N: usize>(v: [f64; N]) -> [f64; N] {
    v.map(sigmoid)
}

/// Prepend the constant bias input.
pub fn with_bias<const N: usize, const M: usize>(v: &[f64; N]) -> [f64; M] {
    const { assert!(M == N + 1) };
    let mut out = [1.0; M];
    out[1..].copy_from_slice(v);
    out
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate().skip(1) {
        if x > v[best] {
            best = i;
        }
    }
    best
}
