pub mod generators;

pub use generators::*;
