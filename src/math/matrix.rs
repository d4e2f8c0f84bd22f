use serde::{Serialize, Deserialize};

/// Dense row-major `f64` matrix.
///
/// Used both for classifier weights (deserialized from model JSON) and for
/// the single-channel planes the wavelet transform works on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |r| r.len()),
            data
        }
    }

    /// True when `data` agrees with `rows`/`cols` (deserialized matrices are
    /// not trusted).
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|r| r.len() == self.cols)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix::from_data(
            self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect()
        )
    }

    /// Top-left `rows × cols` block; dimensions larger than the matrix are
    /// clamped.
    pub fn truncate(&self, rows: usize, cols: usize) -> Matrix {
        let rows = rows.min(self.rows);
        let cols = cols.min(self.cols);
        Matrix {
            rows,
            cols,
            data: self.data[..rows].iter().map(|r| r[..cols].to_vec()).collect(),
        }
    }

    /// Row vector times matrix: `v (1 × rows) · self (rows × cols)`.
    pub fn left_mul(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(v.len(), self.rows, "vector length must match matrix rows");
        let mut out = vec![0.0; self.cols];
        for (x, row) in v.iter().zip(self.data.iter()) {
            if *x == 0.0 {
                continue;
            }
            for (o, w) in out.iter_mut().zip(row.iter()) {
                *o += x * w;
            }
        }
        out
    }

    /// Matrix times column vector: `self (rows × cols) · v (cols × 1)`.
    pub fn right_mul(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(v.len(), self.cols, "vector length must match matrix cols");
        self.data
            .iter()
            .map(|row| row.iter().zip(v.iter()).map(|(w, x)| w * x).sum())
            .collect()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn products_agree_with_hand_computation() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(m.left_mul(&[1.0, -1.0]), vec![-3.0, -3.0, -3.0]);
        assert_eq!(m.right_mul(&[1.0, 0.0, 2.0]), vec![7.0, 16.0]);
    }

    #[test]
    fn transpose_and_truncate() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        let t = m.transpose();
        assert_eq!(t.data, vec![vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]]);
        assert_eq!(m.truncate(2, 5).data, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn inconsistent_shapes_are_detected() {
        let m = Matrix { rows: 2, cols: 2, data: vec![vec![1.0, 2.0], vec![3.0]] };
        assert!(!m.is_consistent());
        assert!(Matrix::zeros(3, 4).is_consistent());
    }
}
