//! Stochastic wire-length distribution.
//!
//! Lengths are measured in gate pitches over the support `[1, 2 sqrt(N)]`
//! where `N` is the number of gate sockets on the die. The density follows
//! Rent's rule and is split into two regions at `sqrt(N)`; both are
//! integrated in closed form.

use serde::{Deserialize, Serialize};

use crate::error::{IntSimError, Result};

/// Antiderivative of the region I shape `1/2 (l^3/3 - 2 sqrt(N) l^2 + 2 N l) l^(q-4)`,
/// without the leading factor of one half.
fn region_one(l: f64, n: f64, q: f64) -> f64 {
    let sn = n.sqrt();
    l.powf(q) / (3.0 * q) - 2.0 * sn * l.powf(q - 1.0) / (q - 1.0)
        + 2.0 * n * l.powf(q - 2.0) / (q - 2.0)
}

/// Antiderivative of the region II shape `1/6 (2 sqrt(N) - l)^3 l^(q-4)`,
/// without the leading factor of one sixth.
fn region_two(l: f64, n: f64, q: f64) -> f64 {
    let sn = n.sqrt();
    8.0 * n * sn * l.powf(q - 3.0) / (q - 3.0) - 12.0 * n * l.powf(q - 2.0) / (q - 2.0)
        + 6.0 * sn * l.powf(q - 1.0) / (q - 1.0)
        - l.powf(q) / q
}

/// Integral of the unnormalized density times `l^(q - 2p)` over `[a, b]`.
pub fn shape_integral(a: f64, b: f64, n: f64, q: f64) -> f64 {
    let sn = n.sqrt();
    let mut total = 0.0;

    let (lo, hi) = (a, b.min(sn));
    if hi > lo {
        total += 0.5 * (region_one(hi, n, q) - region_one(lo, n, q));
    }
    let (lo, hi) = (a.max(sn), b);
    if hi > lo {
        total += (region_two(hi, n, q) - region_two(lo, n, q)) / 6.0;
    }
    total
}

/// Mean point-to-point wire length in gate pitches for `nsockets` sites.
pub fn average_length(nsockets: f64, rent_p: f64) -> f64 {
    let top = 2.0 * nsockets.sqrt();
    shape_integral(1.0, top, nsockets, 2.0 * rent_p + 1.0)
        / shape_integral(1.0, top, nsockets, 2.0 * rent_p)
}

/// Cumulative wire counts and lengths per length bucket.
///
/// Bucket `l` holds wires with lengths in `[l, l + 1)`. Index 0 of each
/// array is the empty prefix, so `count_between(lo, hi)` is a plain
/// difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireLengthDistribution {
    nsockets: f64,
    lmax: usize,
    cum_count: Vec<f64>,
    cum_length: Vec<f64>,
}

impl WireLengthDistribution {
    pub fn generate(ngates: f64, nsockets: f64, rent_k: f64, rent_p: f64, fanout: f64) -> Result<Self> {
        if !(nsockets.is_finite() && nsockets >= 1.0) {
            return Err(IntSimError::invalid(
                "nsockets",
                format!("need at least one gate socket, got {nsockets}"),
            ));
        }
        let top = 2.0 * nsockets.sqrt();
        let lmax = top.floor() as usize;
        if lmax < 1 {
            return Err(IntSimError::invalid("nsockets", "die holds no wires"));
        }

        let q_count = 2.0 * rent_p;
        let q_length = 2.0 * rent_p + 1.0;
        let total = fanout / (fanout + 1.0) * rent_k * ngates * (1.0 - ngates.powf(rent_p - 1.0));
        let norm = total / shape_integral(1.0, top, nsockets, q_count);

        let mut cum_count = vec![0.0; lmax + 1];
        let mut cum_length = vec![0.0; lmax + 1];
        for l in 1..=lmax {
            let hi = ((l + 1) as f64).min(top);
            cum_count[l] = norm * shape_integral(1.0, hi, nsockets, q_count);
            cum_length[l] = norm * shape_integral(1.0, hi, nsockets, q_length);
        }

        log::debug!(
            "wire-length distribution: {nsockets:.3e} sockets, lmax = {lmax}, {total:.3e} wires"
        );

        Ok(Self {
            nsockets,
            lmax,
            cum_count,
            cum_length,
        })
    }

    #[inline]
    pub fn lmax(&self) -> usize {
        self.lmax
    }

    #[inline]
    pub fn nsockets(&self) -> f64 {
        self.nsockets
    }

    /// Number of wires in buckets `lo..=hi`; zero for an empty range.
    pub fn count_between(&self, lo: usize, hi: usize) -> f64 {
        between(&self.cum_count, lo, hi)
    }

    /// Total point-to-point length of buckets `lo..=hi` in gate pitches.
    pub fn length_between(&self, lo: usize, hi: usize) -> f64 {
        between(&self.cum_length, lo, hi)
    }

    pub fn total_count(&self) -> f64 {
        self.cum_count[self.lmax]
    }

    pub fn total_length(&self) -> f64 {
        self.cum_length[self.lmax]
    }

    pub fn cum_count(&self) -> &[f64] {
        &self.cum_count
    }

    pub fn cum_length(&self) -> &[f64] {
        &self.cum_length
    }
}

fn between(arr: &[f64], lo: usize, hi: usize) -> f64 {
    if hi < lo || hi == 0 {
        return 0.0;
    }
    arr[hi] - arr[lo.max(1) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> WireLengthDistribution {
        WireLengthDistribution::generate(1e6, 1.2e6, 4.0, 0.6, 4.0).unwrap()
    }

    #[test]
    fn test_cumulative_arrays_non_decreasing() {
        let wld = sample();
        assert_eq!(wld.cum_count().len(), wld.lmax() + 1);
        assert_eq!(wld.cum_count()[0], 0.0);
        for pair in wld.cum_count().windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        for pair in wld.cum_length().windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        let floor = 1e-9 * wld.total_count();
        for (count, length) in wld.cum_count().windows(2).zip(wld.cum_length().windows(2)) {
            if count[1] - count[0] > floor {
                assert!(length[1] > length[0]);
            }
        }
    }

    #[test]
    fn test_total_count_matches_rent() {
        let (ngates, k, p, fo) = (1e6, 4.0, 0.6, 4.0);
        let wld = WireLengthDistribution::generate(ngates, 1.2e6, k, p, fo).unwrap();
        let expected = fo / (fo + 1.0) * k * ngates * (1.0 - f64::powf(ngates, p - 1.0));
        assert_relative_eq!(wld.total_count(), expected, max_relative = 1e-6);
    }

    #[test]
    fn test_lmax() {
        let wld = sample();
        assert_eq!(wld.lmax(), (2.0 * 1.2e6f64.sqrt()).floor() as usize);
    }

    #[test]
    fn test_between_splits() {
        let wld = sample();
        let lmax = wld.lmax();
        let whole = wld.count_between(1, lmax);
        let split = wld.count_between(1, 10) + wld.count_between(11, lmax);
        assert_relative_eq!(whole, split, max_relative = 1e-12);
        assert_eq!(wld.count_between(5, 4), 0.0);
        assert!(wld.length_between(1, 1) > 0.0);
    }

    #[test]
    fn test_short_wires_dominate() {
        let wld = sample();
        assert!(wld.count_between(1, 1) > wld.count_between(100, 100));
        let avg = wld.total_length() / wld.total_count();
        assert!(avg > 1.0 && avg < wld.lmax() as f64);
        assert_relative_eq!(avg, average_length(1.2e6, 0.6), max_relative = 1e-9);
    }

    #[test]
    fn test_rejects_tiny_die() {
        assert!(WireLengthDistribution::generate(10.0, 0.5, 4.0, 0.6, 4.0).is_err());
        assert!(WireLengthDistribution::generate(10.0, f64::NAN, 4.0, 0.6, 4.0).is_err());
    }
}
