use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntSimError {
    #[error("unsupported technology node: {0} nm")]
    UnsupportedNode(u32),

    #[error("temperature {0} K is outside the leakage table range (300-400 K)")]
    TemperatureOutOfRange(f64),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(
        "target frequency {target:.3e} Hz unreachable with the given logic depth, voltage and threshold (best {best:.3e} Hz)"
    )]
    FrequencyUnreachable { target: f64, best: f64 },

    #[error("{what} did not converge within {iterations} iterations")]
    NoConvergence {
        what: &'static str,
        iterations: usize,
    },

    #[error("{what} left the finite range after {iterations} iterations")]
    NonFinite {
        what: &'static str,
        iterations: usize,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error serializing/deserializing JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("error rendering template: {0}")]
    Template(#[from] tera::Error),
}

impl IntSimError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IntSimError>;
