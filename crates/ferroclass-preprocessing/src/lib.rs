pub mod binarize;
pub mod encoder;
pub mod scaler;

pub use binarize::*;
pub use encoder::*;
pub use scaler::*;
