#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance used to rank stored embeddings against a query; smaller is closer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Straight-line (L2) distance
    #[serde(alias = "l2")]
    #[value(alias = "l2")]
    Euclidean,
    /// One minus cosine similarity
    #[default]
    Cosine,
}

impl DistanceMetric {
    /// Distance between two vectors of equal length.
    ///
    /// Cosine distance involving a zero vector is undefined and returns NaN,
    /// which never satisfies a distance threshold.
    #[inline]
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            Self::Euclidean => euclidean_distance(a, b),
            Self::Cosine => cosine_distance(a, b),
        }
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Cosine => "cosine",
        }
    }
}

impl fmt::Display for DistanceMetric {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[inline]
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let denominator = magnitude(a) * magnitude(b);

    if denominator == 0.0 {
        return f32::NAN;
    }

    dot / denominator
}

#[inline]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}
