pub mod classification;
pub mod regression;
pub mod report;

pub use classification::*;
pub use regression::*;
pub use report::*;
