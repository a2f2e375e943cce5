//! Alignment-based minutiae matching.
//!
//! Every same-kind pair of minutiae is tried as an anchor: the candidate set
//! is rotated and translated so the anchors coincide, and corresponding
//! minutiae are counted within a distance and angle tolerance. The best
//! count over all anchors, scaled by the size of the smaller set, is the
//! score (0 to 100).
//!
//! Scoring is quadratic in both set sizes per anchor pair, so presented
//! templates are bounded by [`MatcherConfig::max_candidate_minutiae`] before
//! any scoring happens.

use crate::error::BiometricError;
use crate::template::{FingerprintTemplate, Minutia};
use rootcause::Report;
use serde::{Deserialize, Serialize};

/// Highest possible score.
pub const MAX_SCORE: f64 = 100.0;

/// Matcher tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum score accepted as the same finger.
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,

    /// Maximum distance in pixels between corresponding minutiae.
    #[serde(default = "default_distance_tolerance")]
    pub distance_tolerance: f64,

    /// Maximum ridge direction difference in degrees.
    #[serde(default = "default_angle_tolerance_degrees")]
    pub angle_tolerance_degrees: f64,

    /// Largest presented template accepted for scoring.
    #[serde(default = "default_max_candidate_minutiae")]
    pub max_candidate_minutiae: usize,
}

fn default_acceptance_threshold() -> f64 {
    40.0
}

fn default_distance_tolerance() -> f64 {
    12.0
}

fn default_angle_tolerance_degrees() -> f64 {
    20.0
}

fn default_max_candidate_minutiae() -> usize {
    80
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: default_acceptance_threshold(),
            distance_tolerance: default_distance_tolerance(),
            angle_tolerance_degrees: default_angle_tolerance_degrees(),
            max_candidate_minutiae: default_max_candidate_minutiae(),
        }
    }
}

/// Similarity between two templates, 0 to [`MAX_SCORE`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchScore(f64);

impl MatchScore {
    /// Score of two templates with nothing in common.
    pub const ZERO: Self = Self(0.0);

    /// Returns the raw score.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for MatchScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Scores candidate templates against stored ones.
#[derive(Debug, Clone, Default)]
pub struct MinutiaeMatcher {
    config: MatcherConfig,
}

impl MinutiaeMatcher {
    /// Creates a matcher with the given tuning.
    #[must_use]
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Returns the matcher tuning.
    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Checks that a presented template is small enough to score.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBiometricData` if `candidate` carries more than
    /// `max_candidate_minutiae` minutiae.
    pub fn admit(&self, candidate: &FingerprintTemplate) -> Result<(), Report<BiometricError>> {
        let count = candidate.minutiae().len();
        if count > self.config.max_candidate_minutiae {
            return Err(BiometricError::invalid(format!(
                "{count} minutiae exceeds the matching limit of {}",
                self.config.max_candidate_minutiae
            ))
            .into());
        }
        Ok(())
    }

    /// Scores `candidate` against `stored`.
    ///
    /// Not guaranteed symmetric. Degenerate (empty) templates score zero.
    /// Callers scoring untrusted templates should [`admit`](Self::admit)
    /// them first.
    #[must_use]
    pub fn score(
        &self,
        candidate: &FingerprintTemplate,
        stored: &FingerprintTemplate,
    ) -> MatchScore {
        let candidate = candidate.minutiae();
        let stored = stored.minutiae();
        let smaller = candidate.len().min(stored.len());
        if smaller == 0 {
            return MatchScore::ZERO;
        }

        let mut best = 0;
        'anchors: for anchor_c in candidate {
            for anchor_s in stored {
                if anchor_c.kind != anchor_s.kind {
                    continue;
                }
                let pairs = self.count_pairs(candidate, stored, anchor_c, anchor_s);
                if pairs > best {
                    best = pairs;
                    if best == smaller {
                        break 'anchors;
                    }
                }
            }
        }

        MatchScore(MAX_SCORE * best as f64 / smaller as f64)
    }

    /// Returns true if `score` meets the acceptance threshold.
    #[must_use]
    pub fn is_match(&self, score: MatchScore) -> bool {
        score.value() >= self.config.acceptance_threshold
    }

    /// Counts one-to-one correspondences after aligning `anchor_c` onto `anchor_s`.
    fn count_pairs(
        &self,
        candidate: &[Minutia],
        stored: &[Minutia],
        anchor_c: &Minutia,
        anchor_s: &Minutia,
    ) -> usize {
        let rotation = f64::from(anchor_s.angle) - f64::from(anchor_c.angle);
        let (sin, cos) = rotation.to_radians().sin_cos();
        let mut used = vec![false; stored.len()];
        let mut pairs = 0;

        for m in candidate {
            let dx = f64::from(m.x) - f64::from(anchor_c.x);
            let dy = f64::from(m.y) - f64::from(anchor_c.y);
            let x = dx * cos - dy * sin + f64::from(anchor_s.x);
            let y = dx * sin + dy * cos + f64::from(anchor_s.y);
            let angle = f64::from(m.angle) + rotation;

            let mut nearest: Option<(usize, f64)> = None;
            for (j, s) in stored.iter().enumerate() {
                if used[j] {
                    continue;
                }
                let distance = (x - f64::from(s.x)).hypot(y - f64::from(s.y));
                if distance > self.config.distance_tolerance {
                    continue;
                }
                if angular_distance(angle, f64::from(s.angle)) > self.config.angle_tolerance_degrees
                {
                    continue;
                }
                if nearest.is_none_or(|(_, d)| distance < d) {
                    nearest = Some((j, distance));
                }
            }

            if let Some((j, _)) = nearest {
                used[j] = true;
                pairs += 1;
            }
        }

        pairs
    }
}

/// Smallest absolute difference between two directions, in degrees.
fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::MinutiaKind;

    fn reference() -> FingerprintTemplate {
        FingerprintTemplate::new(
            500,
            500,
            vec![
                Minutia::new(200, 150, 10, MinutiaKind::RidgeEnding),
                Minutia::new(260, 170, 80, MinutiaKind::Bifurcation),
                Minutia::new(230, 230, 140, MinutiaKind::RidgeEnding),
                Minutia::new(170, 260, 200, MinutiaKind::Bifurcation),
                Minutia::new(140, 190, 260, MinutiaKind::RidgeEnding),
                Minutia::new(280, 260, 320, MinutiaKind::Other),
                Minutia::new(210, 300, 30, MinutiaKind::RidgeEnding),
                Minutia::new(120, 140, 100, MinutiaKind::Bifurcation),
            ],
        )
        .expect("valid")
    }

    /// Rotates `template` by `degrees` around (250, 250), then shifts it.
    fn transformed(
        template: &FingerprintTemplate,
        degrees: f64,
        shift: (f64, f64),
    ) -> FingerprintTemplate {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let minutiae = template
            .minutiae()
            .iter()
            .map(|m| {
                let dx = f64::from(m.x) - 250.0;
                let dy = f64::from(m.y) - 250.0;
                let x = dx * cos - dy * sin + 250.0 + shift.0;
                let y = dx * sin + dy * cos + 250.0 + shift.1;
                let angle = (f64::from(m.angle) + degrees).rem_euclid(360.0);
                Minutia::new(x.round() as u16, y.round() as u16, angle.round() as u16, m.kind)
            })
            .collect();
        FingerprintTemplate::new(500, 500, minutiae).expect("valid")
    }

    fn unrelated() -> FingerprintTemplate {
        FingerprintTemplate::new(
            500,
            500,
            vec![
                Minutia::new(20, 20, 0, MinutiaKind::RidgeEnding),
                Minutia::new(480, 30, 90, MinutiaKind::RidgeEnding),
                Minutia::new(30, 470, 180, MinutiaKind::Bifurcation),
                Minutia::new(470, 470, 270, MinutiaKind::Bifurcation),
                Minutia::new(250, 40, 44, MinutiaKind::Other),
            ],
        )
        .expect("valid")
    }

    #[test]
    fn self_match_is_maximal() {
        let matcher = MinutiaeMatcher::default();
        let t = reference();
        assert_eq!(matcher.score(&t, &t).value(), MAX_SCORE);
        assert!(matcher.is_match(matcher.score(&t, &t)));
    }

    #[test]
    fn rotated_and_shifted_copy_matches() {
        let matcher = MinutiaeMatcher::default();
        let t = reference();
        let moved = transformed(&t, 30.0, (15.0, -10.0));
        let score = matcher.score(&moved, &t);
        assert!(score.value() >= 75.0, "score was {score}");
        assert!(matcher.is_match(score));
    }

    #[test]
    fn unrelated_template_does_not_match() {
        let matcher = MinutiaeMatcher::default();
        let score = matcher.score(&unrelated(), &reference());
        assert!(!matcher.is_match(score), "score was {score}");
    }

    #[test]
    fn empty_templates_score_zero() {
        let matcher = MinutiaeMatcher::default();
        let empty = FingerprintTemplate::new(500, 500, Vec::new()).expect("valid");
        assert_eq!(matcher.score(&empty, &reference()), MatchScore::ZERO);
        assert_eq!(matcher.score(&reference(), &empty), MatchScore::ZERO);
        assert_eq!(matcher.score(&empty, &empty), MatchScore::ZERO);
    }

    #[test]
    fn self_similarity_bounds_partial_overlap() {
        let matcher = MinutiaeMatcher::default();
        let t = reference();

        // Keep half the reference minutiae and add unrelated ones in their place.
        let mut mixed: Vec<Minutia> = t.minutiae()[..4].to_vec();
        mixed.extend_from_slice(unrelated().minutiae());
        let partial = FingerprintTemplate::new(500, 500, mixed).expect("valid");

        let self_score = matcher.score(&t, &t);
        let partial_score = matcher.score(&t, &partial);
        assert!(self_score >= partial_score);
        assert!(partial_score.value() < MAX_SCORE);
    }

    #[test]
    fn score_grows_with_corresponding_minutiae() {
        let matcher = MinutiaeMatcher::default();
        let t = reference();
        let noise = unrelated();

        let with_shared = |shared: usize| {
            let mut minutiae: Vec<Minutia> = t.minutiae()[..shared].to_vec();
            minutiae.extend_from_slice(&noise.minutiae()[..(8 - shared).min(5)]);
            FingerprintTemplate::new(500, 500, minutiae).expect("valid")
        };

        let low = matcher.score(&with_shared(3), &t);
        let high = matcher.score(&with_shared(6), &t);
        assert!(high > low, "{high} <= {low}");
    }

    #[test]
    fn threshold_is_configurable() {
        let strict = MinutiaeMatcher::new(MatcherConfig {
            acceptance_threshold: 101.0,
            ..MatcherConfig::default()
        });
        let t = reference();
        assert!(!strict.is_match(strict.score(&t, &t)));
    }

    #[test]
    fn angular_distance_wraps() {
        assert_eq!(angular_distance(350.0, 10.0), 20.0);
        assert_eq!(angular_distance(10.0, 350.0), 20.0);
        assert_eq!(angular_distance(-30.0, 30.0), 60.0);
        assert_eq!(angular_distance(90.0, 90.0), 0.0);
    }

    #[test]
    fn config_defaults_from_empty_document() {
        let config: MatcherConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config, MatcherConfig::default());
        assert_eq!(config.acceptance_threshold, 40.0);
        assert_eq!(config.max_candidate_minutiae, 80);
    }

    #[test]
    fn admit_bounds_candidate_size() {
        let matcher = MinutiaeMatcher::new(MatcherConfig {
            max_candidate_minutiae: 8,
            ..MatcherConfig::default()
        });
        assert!(matcher.admit(&reference()).is_ok());

        let mut oversized: Vec<Minutia> = reference().minutiae().to_vec();
        oversized.push(Minutia::new(10, 10, 0, MinutiaKind::Other));
        let oversized = FingerprintTemplate::new(500, 500, oversized).expect("valid");
        let err = matcher.admit(&oversized).expect_err("too many minutiae");
        assert!(matches!(
            err.current_context(),
            crate::BiometricError::InvalidBiometricData { .. }
        ));
    }

    #[test]
    fn default_limit_rejects_full_record() {
        let minutiae = (0..crate::template::MAX_MINUTIAE as u16)
            .map(|i| Minutia::new(i % 250, i / 250, 0, MinutiaKind::RidgeEnding))
            .collect();
        let full = FingerprintTemplate::new(500, 500, minutiae).expect("valid");
        assert!(MinutiaeMatcher::default().admit(&full).is_err());
    }
}
