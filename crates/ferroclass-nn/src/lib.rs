pub mod activation;
pub mod layers;
pub mod mlp;

pub use activation::*;
pub use layers::*;
pub use mlp::*;
