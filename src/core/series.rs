// A cleaned signal with its normalized and derivative companions

use crate::core::density::{DensityProfile, ProfileKind};
use crate::core::error::{ProfilerError, Result};

/// Time and value axes of one signal slice, plus derived views.
///
/// Positions where either axis is missing (or NaN) are dropped from both
/// before anything is derived, so the axes stay aligned.
#[derive(Debug, Clone)]
pub struct SignalSeries {
    time: Vec<f64>,
    raw: Vec<f64>,
    range: f64,
    normalized: Vec<f64>,
    gradient: Vec<f64>,
    normalized_gradient: Vec<f64>,
    profiles: [DensityProfile; 4],
}

/// One of the four views returned by [`SignalSeries::select_view`].
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    pub time: &'a [f64],
    pub values: &'a [f64],
    pub profile: &'a DensityProfile,
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Z-score with population variance. A constant signal is only centred.
fn standardize(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let std = var.sqrt();
    let scale = if std > 0.0 { std } else { 1.0 };

    values.iter().map(|v| (v - mean) / scale).collect()
}

fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

impl SignalSeries {
    pub fn build(time: &[Option<f64>], raw_values: &[Option<f64>]) -> Result<Self> {
        if time.len() != raw_values.len() {
            return Err(ProfilerError::LengthMismatch {
                time: time.len(),
                values: raw_values.len(),
            });
        }

        let (time, raw): (Vec<f64>, Vec<f64>) = time
            .iter()
            .zip(raw_values)
            .filter_map(|(t, v)| Some((present(*t)?, present(*v)?)))
            .unzip();

        if raw.is_empty() {
            return Err(ProfilerError::EmptyAfterCleaning);
        }

        let (min, max) = raw
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        let normalized = standardize(&raw);
        let gradient = difference(&raw);
        let normalized_gradient = difference(&normalized);

        let profiles = [
            DensityProfile::build(&raw, ProfileKind::Raw)?,
            DensityProfile::build(&normalized, ProfileKind::Normalized)?,
            DensityProfile::build(&gradient, ProfileKind::Gradient)?,
            DensityProfile::build(&normalized_gradient, ProfileKind::NormalizedGradient)?,
        ];

        Ok(Self {
            time,
            raw,
            range: max - min,
            normalized,
            gradient,
            normalized_gradient,
            profiles,
        })
    }

    /// Same as [`SignalSeries::build`] for plain slices, NaN meaning missing.
    pub fn from_values(time: &[f64], raw_values: &[f64]) -> Result<Self> {
        let time: Vec<Option<f64>> = time.iter().copied().map(Some).collect();
        let raw: Vec<Option<f64>> = raw_values.iter().copied().map(Some).collect();
        Self::build(&time, &raw)
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn normalized(&self) -> &[f64] {
        &self.normalized
    }

    pub fn gradient(&self) -> &[f64] {
        &self.gradient
    }

    pub fn normalized_gradient(&self) -> &[f64] {
        &self.normalized_gradient
    }

    pub fn profile(&self, kind: ProfileKind) -> &DensityProfile {
        match kind {
            ProfileKind::Raw => &self.profiles[0],
            ProfileKind::Normalized => &self.profiles[1],
            ProfileKind::Gradient => &self.profiles[2],
            ProfileKind::NormalizedGradient => &self.profiles[3],
        }
    }

    /// Gradient views pair each difference with the later timestamp.
    pub fn select_view(&self, normalized: bool, gradient: bool) -> SeriesView<'_> {
        let kind = ProfileKind::from_flags(normalized, gradient);
        let (time, values) = match kind {
            ProfileKind::Raw => (&self.time[..], &self.raw[..]),
            ProfileKind::Normalized => (&self.time[..], &self.normalized[..]),
            ProfileKind::Gradient => (&self.time[1..], &self.gradient[..]),
            ProfileKind::NormalizedGradient => (&self.time[1..], &self.normalized_gradient[..]),
        };

        SeriesView {
            time,
            values,
            profile: self.profile(kind),
        }
    }
}
