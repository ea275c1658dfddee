// Density profiles ("fuzzy sets"): normalized histograms of a sample

use crate::core::constants::*;
use crate::core::error::{ProfilerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which view of a signal a profile summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    #[default]
    Raw,
    Normalized,
    Gradient,
    NormalizedGradient,
}

impl ProfileKind {
    pub fn from_flags(normalized: bool, gradient: bool) -> Self {
        match (normalized, gradient) {
            (false, false) => ProfileKind::Raw,
            (true, false) => ProfileKind::Normalized,
            (false, true) => ProfileKind::Gradient,
            (true, true) => ProfileKind::NormalizedGradient,
        }
    }

    pub fn flags(&self) -> (bool, bool) {
        match self {
            ProfileKind::Raw => (false, false),
            ProfileKind::Normalized => (true, false),
            ProfileKind::Gradient => (false, true),
            ProfileKind::NormalizedGradient => (true, true),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileKind::Raw => "raw",
            ProfileKind::Normalized => "normalized",
            ProfileKind::Gradient => "gradient",
            ProfileKind::NormalizedGradient => "normalized_gradient",
        };
        f.write_str(name)
    }
}

/// Number of bins for a sample spanning `range`: the square root of the
/// range rounded up to a multiple of ten, never fewer than fifty.
///
/// Ranges needing more than [`MAX_BINS`] bins, or an infinite range, fail
/// with [`ProfilerError::BinGridTooLarge`].
pub fn bin_count(range: f64) -> Result<usize> {
    let too_large = || ProfilerError::BinGridTooLarge { range, max: MAX_BINS };

    let steps = (range.sqrt() / BIN_STEP as f64).ceil();
    if !steps.is_finite() || steps > (MAX_BINS / BIN_STEP) as f64 {
        return Err(too_large());
    }
    let stepped = (steps as usize).checked_mul(BIN_STEP).ok_or_else(too_large)?;
    Ok(stepped.max(MIN_BINS))
}

/// Equal-width histogram normalized so that the area under it is one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityProfile {
    kind: ProfileKind,
    bin_edges: Vec<f64>,
    density: Vec<f64>,
}

impl DensityProfile {
    /// Bins span `[min, max]`, the last bin closed on the right. A sample
    /// with zero range gets the minimum bin count over
    /// `[value - 0.5, value + 0.5]`.
    ///
    /// Fails when the grid is too large or when `f64` cannot separate its
    /// edges, as with a narrow spread around a huge value.
    pub fn build(sample: &[f64], kind: ProfileKind) -> Result<Self> {
        if sample.is_empty() {
            return Err(ProfilerError::EmptySample);
        }
        if let Some(pos) = sample.iter().position(|v| !v.is_finite()) {
            return Err(ProfilerError::NonFiniteSample(pos));
        }

        let (min, max) = sample
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let range = max - min;
        let bins = bin_count(range)?;

        let (lo, hi) = if range == 0.0 {
            (min - DEGENERATE_HALF_WIDTH, max + DEGENERATE_HALF_WIDTH)
        } else {
            (min, max)
        };

        let mut bin_edges: Vec<f64> = (0..=bins)
            .map(|i| lo + (hi - lo) * i as f64 / bins as f64)
            .collect();
        bin_edges[bins] = hi;
        if bin_edges.windows(2).any(|edge| edge[1] <= edge[0]) {
            return Err(ProfilerError::BinGridCollapsed { lo, hi });
        }

        let scale = bins as f64 / (hi - lo);
        let mut counts = vec![0usize; bins];
        for &v in sample {
            let mut idx = (((v - lo) * scale) as usize).min(bins - 1);
            // rounding can land one bin off the edges
            if idx > 0 && v < bin_edges[idx] {
                idx -= 1;
            } else if idx + 1 < bins && v >= bin_edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        let total = sample.len() as f64;
        let density = counts
            .iter()
            .zip(bin_edges.windows(2))
            .map(|(&count, edge)| count as f64 / (total * (edge[1] - edge[0])))
            .collect();

        Ok(Self {
            kind,
            bin_edges,
            density,
        })
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn bin_edges(&self) -> &[f64] {
        &self.bin_edges
    }

    pub fn density(&self) -> &[f64] {
        &self.density
    }

    pub fn bin_count(&self) -> usize {
        self.density.len()
    }

    /// Area under the step function; one up to rounding.
    pub fn integral(&self) -> f64 {
        self.density
            .iter()
            .zip(self.bin_edges.windows(2))
            .map(|(d, edge)| d * (edge[1] - edge[0]))
            .sum()
    }

    /// Density at `x`; zero outside the profile's support.
    pub fn value_at(&self, x: f64) -> f64 {
        let first = self.bin_edges[0];
        let last = self.bin_edges[self.bin_edges.len() - 1];
        if x < first || x > last {
            return 0.0;
        }
        let idx = self.bin_edges.partition_point(|e| *e <= x).saturating_sub(1);
        self.density[idx.min(self.density.len() - 1)]
    }

    /// `(edge, density)` pairs for drawing a step plot. The first density
    /// value is repeated at the leading edge.
    pub fn to_step_sequence(&self) -> Vec<(f64, f64)> {
        let lead = self.density.first().copied().unwrap_or(0.0);
        self.bin_edges
            .iter()
            .copied()
            .zip(std::iter::once(lead).chain(self.density.iter().copied()))
            .collect()
    }

    /// Overlap distance `1 - ∫ min(f, g) dx`.
    ///
    /// Symmetric, in `[0, 1]`: zero for identical profiles, one for disjoint
    /// supports. Only profiles of the same kind can be compared.
    pub fn compare(&self, other: &DensityProfile) -> Result<f64> {
        if self.kind != other.kind {
            return Err(ProfilerError::TypeMismatch {
                left: self.kind.to_string(),
                right: other.kind.to_string(),
            });
        }

        let mut grid: Vec<f64> = self
            .bin_edges
            .iter()
            .chain(other.bin_edges.iter())
            .copied()
            .collect();
        grid.sort_by(|a, b| a.total_cmp(b));
        grid.dedup();

        let overlap: f64 = grid
            .windows(2)
            .map(|w| {
                let mid = 0.5 * (w[0] + w[1]);
                self.value_at(mid).min(other.value_at(mid)) * (w[1] - w[0])
            })
            .sum();

        Ok((1.0 - overlap).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn spanning(range: f64) -> Vec<f64> {
        (0..=200).map(|i| range * i as f64 / 200.0).collect()
    }

    #[test]
    fn test_bin_count_formula() {
        assert_eq!(bin_count(0.0).unwrap(), 50);
        assert_eq!(bin_count(99.0).unwrap(), 50);
        assert_eq!(bin_count(2600.0).unwrap(), 60);
        assert_eq!(bin_count(10_000.0).unwrap(), 100);
        assert_eq!(bin_count(250_000.0).unwrap(), 500);
        assert_eq!(bin_count(1e10).unwrap(), MAX_BINS);
    }

    #[test]
    fn test_bin_count_rejects_huge_ranges() {
        for range in [1e10 + 1e6, 1e24, f64::INFINITY] {
            assert!(matches!(
                bin_count(range),
                Err(ProfilerError::BinGridTooLarge { max: MAX_BINS, .. })
            ));
        }
    }

    #[test]
    fn test_overflowing_range_fails() {
        // both ends finite, but max - min is not
        assert!(matches!(
            DensityProfile::build(&[-1e308, 1e308], ProfileKind::Raw),
            Err(ProfilerError::BinGridTooLarge { .. })
        ));
    }

    #[test]
    fn test_unresolvable_edges_fail() {
        // edges 0.04 apart cannot be told apart next to 1e16
        let sample = [1e16, 1e16 + 2.0, 1e16 + 2.0, 1e16];
        assert!(matches!(
            DensityProfile::build(&sample, ProfileKind::Raw),
            Err(ProfilerError::BinGridCollapsed { .. })
        ));

        // same for the unit window around a single huge value
        assert!(matches!(
            DensityProfile::build(&[1e300, 1e300], ProfileKind::Raw),
            Err(ProfilerError::BinGridCollapsed { .. })
        ));
    }

    #[test]
    fn test_profile_uses_formula_bins() {
        for range in [1.0, 2600.0, 40_000.0] {
            let profile = DensityProfile::build(&spanning(range), ProfileKind::Raw).unwrap();
            assert_eq!(profile.bin_count(), bin_count(range).unwrap());
            assert_eq!(profile.bin_edges().len(), profile.bin_count() + 1);
        }
    }

    #[test]
    fn test_density_integrates_to_one() {
        let sample: Vec<f64> = (0..1000).map(|i| ((i as f64) * 0.37).sin() * 250.0).collect();
        let profile = DensityProfile::build(&sample, ProfileKind::Raw).unwrap();
        assert_abs_diff_eq!(profile.integral(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_uniform_counts() {
        let sample: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let profile = DensityProfile::build(&sample, ProfileKind::Raw).unwrap();

        assert_eq!(profile.bin_count(), 50);
        let width = 99.0 / 50.0;
        for d in profile.density() {
            assert_abs_diff_eq!(*d, 2.0 / (100.0 * width), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_range_uses_unit_window() {
        let profile = DensityProfile::build(&[4.0, 4.0, 4.0], ProfileKind::Raw).unwrap();

        assert_eq!(profile.bin_count(), MIN_BINS);
        assert_abs_diff_eq!(profile.bin_edges()[0], 3.5);
        assert_abs_diff_eq!(profile.bin_edges()[MIN_BINS], 4.5);
        assert_abs_diff_eq!(profile.integral(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_and_non_finite_samples_fail() {
        assert!(matches!(
            DensityProfile::build(&[], ProfileKind::Raw),
            Err(ProfilerError::EmptySample)
        ));
        assert!(matches!(
            DensityProfile::build(&[1.0, f64::NAN], ProfileKind::Raw),
            Err(ProfilerError::NonFiniteSample(1))
        ));
    }

    #[test]
    fn test_step_sequence_repeats_first_bin() {
        let profile = DensityProfile::build(&spanning(10.0), ProfileKind::Raw).unwrap();
        let steps = profile.to_step_sequence();

        assert_eq!(steps.len(), profile.bin_count() + 1);
        assert_eq!(steps[0].1, steps[1].1);
        assert_eq!(steps[0].1, profile.density()[0]);
        assert_eq!(steps.last().unwrap().0, 10.0);
    }

    #[test]
    fn test_compare_identical_and_disjoint() {
        let a = DensityProfile::build(&spanning(10.0), ProfileKind::Raw).unwrap();
        let far: Vec<f64> = spanning(10.0).iter().map(|v| v + 100.0).collect();
        let b = DensityProfile::build(&far, ProfileKind::Raw).unwrap();

        assert_abs_diff_eq!(a.compare(&a).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.compare(&b).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_compare_is_symmetric() {
        let a = DensityProfile::build(&spanning(10.0), ProfileKind::Normalized).unwrap();
        let shifted: Vec<f64> = (0..300).map(|i| 4.0 + (i as f64) * 0.03).collect();
        let b = DensityProfile::build(&shifted, ProfileKind::Normalized).unwrap();

        let ab = a.compare(&b).unwrap();
        let ba = b.compare(&a).unwrap();
        assert_eq!(ab, ba);
        assert!(ab > 0.0 && ab < 1.0);
    }

    #[test]
    fn test_compare_rejects_other_kinds() {
        let a = DensityProfile::build(&spanning(10.0), ProfileKind::Raw).unwrap();
        let b = DensityProfile::build(&spanning(10.0), ProfileKind::Gradient).unwrap();
        assert!(matches!(a.compare(&b), Err(ProfilerError::TypeMismatch { .. })));
    }

    #[test]
    fn test_kind_flags_round_trip() {
        for kind in [
            ProfileKind::Raw,
            ProfileKind::Normalized,
            ProfileKind::Gradient,
            ProfileKind::NormalizedGradient,
        ] {
            let (normalized, gradient) = kind.flags();
            assert_eq!(ProfileKind::from_flags(normalized, gradient), kind);
        }
    }
}
