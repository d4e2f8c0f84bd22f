pub mod dwt;
pub mod family;
pub mod w2d;

pub use dwt::{dwt2, idwt2, wavedec2, waverec2, Coefficients, DetailBands};
pub use family::Wavelet;
pub use w2d::{wavelet_detail, wavelet_detail_rgb, WaveletConfig};
