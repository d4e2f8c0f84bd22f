//! Discrete wavelet transforms with half-sample symmetric extension.
//!
//! Decomposition produces `⌊(N + F − 1) / 2⌋` coefficients per band for a
//! signal of length `N` and filter length `F`; reconstruction yields
//! `2N − F + 2` samples, so odd-sized inputs come back one sample larger.
//! 2D transforms are separable: columns first, then rows.

use crate::error::{ClassifierError, Result};
use crate::math::matrix::Matrix;
use crate::wavelet::family::Wavelet;

/// Maps any integer index onto `0..n` by mirroring at the signal edges,
/// repeating the edge sample (`x[-1] = x[0]`, `x[n] = x[n-1]`).
fn reflect(k: i64, n: usize) -> usize {
    let n = n as i64;
    let period = 2 * n;
    let mut k = k.rem_euclid(period);
    if k >= n {
        k = period - 1 - k;
    }
    k as usize
}

/// Single-level 1D decomposition into (approximation, detail).
pub fn dwt(x: &[f64], w: &Wavelet) -> (Vec<f64>, Vec<f64>) {
    let n = x.len();
    let f = w.filter_len();
    let out_len = (n + f - 1) / 2;
    let mut approx = Vec::with_capacity(out_len);
    let mut detail = Vec::with_capacity(out_len);

    for o in 0..out_len {
        let i = (2 * o + 1) as i64;
        let (mut a, mut d) = (0.0, 0.0);
        for j in 0..f {
            let v = x[reflect(i - j as i64, n)];
            a += w.dec_lo[j] * v;
            d += w.dec_hi[j] * v;
        }
        approx.push(a);
        detail.push(d);
    }
    (approx, detail)
}

/// Single-level 1D reconstruction from equal-length bands.
pub fn idwt(approx: &[f64], detail: &[f64], w: &Wavelet) -> Result<Vec<f64>> {
    let n = approx.len();
    let f = w.filter_len();
    if detail.len() != n {
        return Err(ClassifierError::FeatureExtraction(format!(
            "band length mismatch: {} vs {}",
            n,
            detail.len()
        )));
    }
    let half = f / 2;
    if n < half {
        return Err(ClassifierError::FeatureExtraction(format!(
            "{} coefficients are too few for the {}-tap '{}' filter",
            n, f, w.name
        )));
    }

    let mut out = vec![0.0; 2 * n + 2 - f];
    for (o, i) in (half - 1..n).enumerate() {
        let (mut even, mut odd) = (0.0, 0.0);
        for j in 0..half {
            even += w.rec_lo[2 * j] * approx[i - j] + w.rec_hi[2 * j] * detail[i - j];
            odd += w.rec_lo[2 * j + 1] * approx[i - j] + w.rec_hi[2 * j + 1] * detail[i - j];
        }
        out[2 * o] += even;
        out[2 * o + 1] += odd;
    }
    Ok(out)
}

/// Horizontal, vertical and diagonal detail bands of one level.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailBands {
    pub horizontal: Matrix,
    pub vertical: Matrix,
    pub diagonal: Matrix,
}

impl DetailBands {
    fn shape(&self) -> (usize, usize) {
        (self.horizontal.rows, self.horizontal.cols)
    }
}

/// Multi-level decomposition; `details` runs from the coarsest level to the
/// finest.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    pub approx: Matrix,
    pub details: Vec<DetailBands>,
}

fn split_rows(m: &Matrix, w: &Wavelet) -> (Matrix, Matrix) {
    let (lo, hi): (Vec<_>, Vec<_>) = m.data.iter().map(|row| dwt(row, w)).unzip();
    (Matrix::from_data(lo), Matrix::from_data(hi))
}

fn merge_rows(lo: &Matrix, hi: &Matrix, w: &Wavelet) -> Result<Matrix> {
    let rows = lo
        .data
        .iter()
        .zip(hi.data.iter())
        .map(|(a, d)| idwt(a, d, w))
        .collect::<Result<Vec<_>>>()?;
    Ok(Matrix::from_data(rows))
}

/// Single-level 2D decomposition into an approximation and three detail bands.
pub fn dwt2(x: &Matrix, w: &Wavelet) -> (Matrix, DetailBands) {
    let (lo_t, hi_t) = split_rows(&x.transpose(), w);
    let (lo, hi) = (lo_t.transpose(), hi_t.transpose());
    let (ll, lh) = split_rows(&lo, w);
    let (hl, hh) = split_rows(&hi, w);
    (ll, DetailBands { horizontal: hl, vertical: lh, diagonal: hh })
}

/// Single-level 2D reconstruction.
pub fn idwt2(approx: &Matrix, details: &DetailBands, w: &Wavelet) -> Result<Matrix> {
    if (approx.rows, approx.cols) != details.shape() {
        return Err(ClassifierError::FeatureExtraction(format!(
            "approximation {}x{} does not match detail {}x{}",
            approx.rows,
            approx.cols,
            details.horizontal.rows,
            details.horizontal.cols
        )));
    }
    let lo = merge_rows(approx, &details.vertical, w)?;
    let hi = merge_rows(&details.horizontal, &details.diagonal, w)?;
    let merged = merge_rows(&lo.transpose(), &hi.transpose(), w)?;
    Ok(merged.transpose())
}

/// `level`-deep 2D decomposition of `x`.
pub fn wavedec2(x: &Matrix, w: &Wavelet, level: usize) -> Result<Coefficients> {
    if x.rows == 0 || x.cols == 0 {
        return Err(ClassifierError::FeatureExtraction("cannot transform an empty plane".into()));
    }
    let mut approx = x.clone();
    let mut details = Vec::with_capacity(level);
    for _ in 0..level {
        let (a, d) = dwt2(&approx, w);
        approx = a;
        details.push(d);
    }
    details.reverse();
    Ok(Coefficients { approx, details })
}

/// Inverse of [`wavedec2`].  Before each level the running approximation is
/// trimmed to the detail shape, which undoes the one-sample growth odd sizes
/// pick up during reconstruction.
pub fn waverec2(coeffs: &Coefficients, w: &Wavelet) -> Result<Matrix> {
    let mut approx = coeffs.approx.clone();
    for bands in &coeffs.details {
        let (rows, cols) = bands.shape();
        approx = approx.truncate(rows, cols);
        approx = idwt2(&approx, bands, w)?;
    }
    Ok(approx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haar() -> Wavelet {
        Wavelet::from_name("haar").unwrap()
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-9, "{} vs {}", x, y);
        }
    }

    #[test]
    fn reflect_repeats_edge_samples() {
        assert_eq!(reflect(-1, 4), 0);
        assert_eq!(reflect(-2, 4), 1);
        assert_eq!(reflect(4, 4), 3);
        assert_eq!(reflect(5, 4), 2);
        assert_eq!(reflect(3, 1), 0);
    }

    #[test]
    fn haar_dwt_of_pairs() {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let (a, d) = dwt(&[1.0, 3.0, 5.0, 5.0], &haar());
        assert_close(&a, &[4.0 * s, 10.0 * s]);
        assert_close(&d, &[-2.0 * s, 0.0]);
    }

    #[test]
    fn odd_length_rounds_up_and_reconstructs_with_extra_sample() {
        let x = [2.0, 4.0, 6.0];
        let (a, d) = dwt(&x, &haar());
        assert_eq!(a.len(), 2);
        let y = idwt(&a, &d, &haar()).unwrap();
        assert_close(&y, &[2.0, 4.0, 6.0, 6.0]);
    }

    #[test]
    fn daubechies_round_trip_is_perfect_in_the_interior() {
        for name in ["db2", "db3", "db4"] {
            let w = Wavelet::from_name(name).unwrap();
            let x: Vec<f64> = (0..16).map(|i| ((i * 7) % 5) as f64 - 1.5).collect();
            let (a, d) = dwt(&x, &w);
            let y = idwt(&a, &d, &w).unwrap();
            assert_eq!(y.len(), x.len(), "{}", name);
            assert_close(&y, &x);
        }
    }

    #[test]
    fn multilevel_haar_round_trip() {
        let x = Matrix::from_data(
            (0..12).map(|r| (0..10).map(|c| ((r * 3 + c * 5) % 11) as f64).collect()).collect(),
        );
        let coeffs = wavedec2(&x, &haar(), 3).unwrap();
        assert_eq!(coeffs.details.len(), 3);
        assert_eq!((coeffs.approx.rows, coeffs.approx.cols), (2, 2));
        let y = waverec2(&coeffs, &haar()).unwrap();
        assert_eq!((y.rows, y.cols), (12, 10));
        for (ra, rb) in x.data.iter().zip(y.data.iter()) {
            assert_close(ra, rb);
        }
    }

    #[test]
    fn mismatched_bands_are_rejected() {
        let details = DetailBands {
            horizontal: Matrix::zeros(2, 2),
            vertical: Matrix::zeros(2, 2),
            diagonal: Matrix::zeros(2, 2),
        };
        assert!(idwt2(&Matrix::zeros(3, 2), &details, &haar()).is_err());
    }
}
