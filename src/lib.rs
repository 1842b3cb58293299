pub use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use tera::Tera;

pub mod chip;
pub mod cli;
pub mod config;
pub mod error;
pub mod params;
pub mod paths;
pub mod plan;
pub mod power;
pub mod report;
pub mod sizing;
pub mod solve;
pub mod synth;
pub mod tech;
pub mod tiers;
pub mod wld;

pub use error::IntSimError;
pub use params::{DesignParams, TechParams};
pub use synth::{Convergence, Synthesis, UnitEnergy};
pub use tech::TechNode;

lazy_static! {
    pub static ref TEMPLATES: Tera =
        match Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/*")) {
            Ok(mut t) => {
                t.register_filter("sci", report::sci);
                t
            }
            Err(e) => panic!("Error parsing templates: {e}"),
        };
}

/// Sets up the technology for `node` and runs interconnect synthesis.
pub fn estimate(node: TechNode, design: DesignParams) -> error::Result<Synthesis> {
    let params = TechParams::setup(node, design)?;
    Synthesis::run(&params)
}

#[cfg(test)]
mod tests;
