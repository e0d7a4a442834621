//! Cyclic Jacobi eigen-decomposition for real symmetric matrices.
//!
//! Each rotation zeroes one off-diagonal pair `(p, q)`; sweeping over all
//! pairs drives the off-diagonal mass to zero quadratically. For the small
//! Laplacians in this workspace a few sweeps reach machine precision, and
//! the accumulated rotations form an orthonormal eigenbasis even when
//! eigenvalues repeat (the complete graph has `N - 1` equal ones).

use crate::Matrix;

/// Upper bound on full sweeps before giving up on further refinement.
const MAX_SWEEPS: usize = 64;

/// Off-diagonal Frobenius mass below which the matrix counts as diagonal.
const OFF_DIAGONAL_EPSILON: f64 = 1e-24;

/// Eigenvalues in ascending order with matching unit eigenvectors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymmetricEigen {
    /// Ascending eigenvalues.
    pub eigenvalues: Vec<f64>,
    /// Column `i` is the eigenvector for `eigenvalues[i]`.
    pub eigenvectors: Matrix,
}

impl SymmetricEigen {
    /// Eigenvector `i` as an owned vector.
    pub fn vector(&self, i: usize) -> Vec<f64> {
        self.eigenvectors.column(i)
    }
}

/// Decompose a symmetric matrix.
///
/// Only the symmetric part of `m` is meaningful; callers validate symmetry.
/// Eigenvectors are sign-normalised so that their component sum is
/// non-negative (ties broken by the first significant component), which makes
/// the all-ones direction of a Laplacian come out as `+1/√N`.
pub fn symmetric_eigen(m: &Matrix) -> SymmetricEigen {
    debug_assert!(m.is_square());
    let n = m.rows();
    let mut a = m.clone();
    let mut v = Matrix::identity(n);

    for _ in 0..MAX_SWEEPS {
        if off_diagonal_mass(&a) < OFF_DIAGONAL_EPSILON {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                rotate(&mut a, &mut v, p, q);
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[(i, i)].total_cmp(&a[(j, j)]));

    let eigenvalues = order.iter().map(|&i| a[(i, i)]).collect();
    let mut eigenvectors = Matrix::zeros(n, n);
    for (col, &src) in order.iter().enumerate() {
        let sign = orientation(&v.column(src));
        for row in 0..n {
            eigenvectors[(row, col)] = sign * v[(row, src)];
        }
    }

    SymmetricEigen {
        eigenvalues,
        eigenvectors,
    }
}

fn off_diagonal_mass(a: &Matrix) -> f64 {
    let n = a.rows();
    let mut sum = 0.0;
    for p in 0..n {
        for q in (p + 1)..n {
            sum += a[(p, q)] * a[(p, q)];
        }
    }
    sum
}

/// Apply one Jacobi rotation `A ← Jᵀ A J`, `V ← V J` zeroing `a[p][q]`.
fn rotate(a: &mut Matrix, v: &mut Matrix, p: usize, q: usize) {
    let apq = a[(p, q)];
    if apq.abs() < f64::MIN_POSITIVE {
        return;
    }
    let theta = (a[(q, q)] - a[(p, p)]) / (2.0 * apq);
    // Smaller root of t² + 2θt − 1 = 0 keeps the rotation angle ≤ π/4.
    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;
    let n = a.rows();

    for k in 0..n {
        let akp = a[(k, p)];
        let akq = a[(k, q)];
        a[(k, p)] = c * akp - s * akq;
        a[(k, q)] = s * akp + c * akq;
    }
    for k in 0..n {
        let apk = a[(p, k)];
        let aqk = a[(q, k)];
        a[(p, k)] = c * apk - s * aqk;
        a[(q, k)] = s * apk + c * aqk;
    }
    for k in 0..n {
        let vkp = v[(k, p)];
        let vkq = v[(k, q)];
        v[(k, p)] = c * vkp - s * vkq;
        v[(k, q)] = s * vkp + c * vkq;
    }
}

fn orientation(vector: &[f64]) -> f64 {
    const SIGNIFICANT: f64 = 1e-9;
    let sum: f64 = vector.iter().sum();
    if sum.abs() > SIGNIFICANT {
        return sum.signum();
    }
    vector
        .iter()
        .find(|x| x.abs() > SIGNIFICANT)
        .map(|x| x.signum())
        .unwrap_or(1.0)
}
