use ferroclass_core::{Float, MlError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sigmoid inputs are clipped to this magnitude before exponentiating.
const SIGMOID_CLIP: f64 = 500.0;

/// Hidden-layer activation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    ReLU,
    Sigmoid,
    Tanh,
}

impl Activation {
    #[inline]
    pub fn apply<T: Float>(&self, z: T) -> T {
        match self {
            Activation::ReLU => z.max(T::ZERO),
            Activation::Sigmoid => {
                let clip = T::from_f64(SIGMOID_CLIP);
                T::ONE / (T::ONE + (-z.clamp_to(-clip, clip)).exp())
            }
            Activation::Tanh => z.tanh(),
        }
    }

    /// Derivative with respect to the pre-activation `z`.
    #[inline]
    pub fn derivative<T: Float>(&self, z: T) -> T {
        match self {
            Activation::ReLU => {
                if z > T::ZERO {
                    T::ONE
                } else {
                    T::ZERO
                }
            }
            Activation::Sigmoid => {
                let s = self.apply(z);
                s * (T::ONE - s)
            }
            Activation::Tanh => {
                let t = z.tanh();
                T::ONE - t * t
            }
        }
    }
}

impl FromStr for Activation {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relu" => Ok(Activation::ReLU),
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            _ => Err(MlError::UnsupportedActivation(s.to_string())),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Activation::ReLU => "relu",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
        })
    }
}
