use crate::error::{ClassifierError, Result};

// Daubechies scaling (reconstruction low-pass) filters, db1..db4.
const DB1: [f64; 2] = [0.7071067811865476, 0.7071067811865476];
const DB2: [f64; 4] = [
    0.48296291314469025,
    0.836516303737469,
    0.22414386804185735,
    -0.12940952255092145,
];
const DB3: [f64; 6] = [
    0.3326705529509569,
    0.8068915093133388,
    0.4598775021193313,
    -0.13501102001039084,
    -0.08544127388224149,
    0.035226291882100656,
];
const DB4: [f64; 8] = [
    0.23037781330885523,
    0.7148465705525415,
    0.6308807679295904,
    -0.02798376941698385,
    -0.18703481171888114,
    0.030841381835986965,
    0.032883011666982945,
    -0.010597401784997278,
];

/// Orthogonal wavelet filter bank.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavelet {
    pub name: String,
    pub dec_lo: Vec<f64>,
    pub dec_hi: Vec<f64>,
    pub rec_lo: Vec<f64>,
    pub rec_hi: Vec<f64>,
}

impl Wavelet {
    /// Looks up a wavelet by name.  `haar` is an alias of `db1`.
    pub fn from_name(name: &str) -> Result<Wavelet> {
        let scaling: &[f64] = match name.to_ascii_lowercase().as_str() {
            "haar" | "db1" => &DB1,
            "db2" => &DB2,
            "db3" => &DB3,
            "db4" => &DB4,
            other => {
                return Err(ClassifierError::FeatureExtraction(format!(
                    "unsupported wavelet '{}' (expected haar, db1, db2, db3 or db4)",
                    other
                )))
            }
        };
        Ok(Wavelet::from_scaling_filter(name, scaling))
    }

    /// Builds the quadrature-mirror filter bank from a scaling filter.
    fn from_scaling_filter(name: &str, rec_lo: &[f64]) -> Wavelet {
        let dec_lo: Vec<f64> = rec_lo.iter().rev().copied().collect();
        let rec_hi: Vec<f64> = dec_lo
            .iter()
            .enumerate()
            .map(|(k, &v)| if k % 2 == 0 { v } else { -v })
            .collect();
        let dec_hi: Vec<f64> = rec_hi.iter().rev().copied().collect();
        Wavelet {
            name: name.to_owned(),
            dec_lo,
            dec_hi,
            rec_lo: rec_lo.to_vec(),
            rec_hi,
        }
    }

    pub fn filter_len(&self) -> usize {
        self.rec_lo.len()
    }
}
