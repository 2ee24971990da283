pub mod decomposition;

pub use decomposition::*;
