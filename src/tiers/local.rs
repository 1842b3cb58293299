use serde::{Deserialize, Serialize};

use super::{Context, Tier};
use crate::chip::ChipState;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoRepeaterOutcome {
    /// Every wire bucket has a tier.
    Complete,
    /// The tier ceiling was reached with wires left over.
    TierCeiling,
}

/// Assigns the minimum pitch tier.
///
/// The tier keeps pitch `2F` and takes the longest run of short wires that
/// fits in capacity and meets the delay budget at that pitch.
pub fn local_interconnect(ctx: &Context, mut chip: ChipState) -> Result<ChipState> {
    let pitch = ctx.params.min_pitch();
    let tier = match ctx.longest_fit(0, pitch, true, &chip.prev_bands)? {
        Some(tier) => tier,
        None => Tier {
            pitch,
            max_length: 0,
            efficiency: ctx.params.design.router_efficiency
                - ctx.via_blockage(1, pitch, &chip.prev_bands),
        },
    };
    log::debug!(
        "local tier routes buckets 1..={} at pitch {:.3e} m",
        tier.max_length,
        tier.pitch
    );
    chip.tiers = vec![tier];
    Ok(chip)
}

/// Stacks unrepeated tiers on top of the local tier until every bucket is routed.
///
/// Each tier starts at the previous tier's pitch and widens as needed for
/// its longest wire to meet the delay budget.
pub fn no_repeaters(ctx: &Context, mut chip: ChipState) -> Result<(ChipState, NoRepeaterOutcome)> {
    let lmax = ctx.lmax();
    let max_tier = ctx.params.design.max_tier;
    let mut last = chip.tiers.last().map(|tier| tier.max_length).unwrap_or(0);
    let mut floor = chip
        .tiers
        .last()
        .map(|tier| tier.pitch)
        .unwrap_or_else(|| ctx.params.min_pitch());

    while last < lmax {
        if chip.tiers.len() >= max_tier {
            log::warn!(
                "tier ceiling of {max_tier} reached with buckets {}..={lmax} unrouted",
                last + 1
            );
            return Ok((chip, NoRepeaterOutcome::TierCeiling));
        }

        let tier = match ctx.longest_fit(last, floor, false, &chip.prev_bands)? {
            Some(tier) => tier,
            None => {
                // Not even the next bucket fits; carry the last length over.
                let pitch = ctx.delay_pitch(last + 1, floor)?;
                Tier {
                    pitch,
                    max_length: last,
                    efficiency: ctx.params.design.router_efficiency
                        - ctx.via_blockage(last + 1, pitch, &chip.prev_bands),
                }
            }
        };

        last = tier.max_length;
        floor = tier.pitch;
        chip.tiers.push(tier);
    }

    log::debug!("{} tiers route all wires without repeaters", chip.tiers.len());
    Ok((chip, NoRepeaterOutcome::Complete))
}
