//! Capability declarations and keyword scoring.
//!
//! A responder declares what it is good at as a list of [`Capability`]
//! groups. [`score`] turns a message into a confidence in `[0, 1]` by
//! counting keyword hits per group.

use serde::{Deserialize, Serialize};

/// Confidence threshold a capability carries unless told otherwise.
pub const DEFAULT_CAPABILITY_THRESHOLD: f32 = 0.7;

/// Weight of a single keyword hit inside one capability group.
const KEYWORD_WEIGHT: f32 = 0.3;

/// A named skill area with keyword triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f32,
}

fn default_threshold() -> f32 {
    DEFAULT_CAPABILITY_THRESHOLD
}

impl Capability {
    pub fn new<I, S>(name: impl Into<String>, description: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            confidence_threshold: DEFAULT_CAPABILITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Number of this capability's keywords found in an already
    /// lower-cased message.
    fn matches(&self, lower_message: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| lower_message.contains(keyword.to_lowercase().as_str()))
            .count()
    }
}

/// Score how well `capabilities` cover `message`.
///
/// Each capability with at least one keyword hit contributes
/// `min(hits * 0.3, 1.0)`; contributions are summed and the total is
/// clamped to `[0, 1]`. No hits anywhere yields exactly `0.0`.
pub fn score(message: &str, capabilities: &[Capability]) -> f32 {
    let lower = message.to_lowercase();

    let total: f32 = capabilities
        .iter()
        .map(|capability| capability.matches(&lower))
        .filter(|&hits| hits > 0)
        .map(|hits| (hits as f32 * KEYWORD_WEIGHT).min(1.0))
        .sum();

    total.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coding() -> Vec<Capability> {
        vec![Capability::new(
            "programming",
            "Code help",
            ["bug", "function", "debug"],
        )]
    }

    #[test]
    fn no_overlap_scores_zero() {
        assert_eq!(score("hi", &coding()), 0.0);
        assert_eq!(score("", &coding()), 0.0);
        assert_eq!(score("anything", &[]), 0.0);
    }

    #[test]
    fn each_hit_is_worth_point_three() {
        let s = score("there is a bug", &coding());
        assert!((s - 0.3).abs() < 1e-6);

        let s = score("fix this null pointer bug in my function", &coding());
        assert!((s - 0.6).abs() < 1e-6);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let caps = vec![Capability::new("x", "x", ["Debug"])];
        assert!(score("please DEBUG this", &caps) > 0.0);
    }

    #[test]
    fn single_group_caps_at_one() {
        let caps = vec![Capability::new("x", "x", ["a", "b", "c", "d", "e"])];
        assert_eq!(score("a b c d e", &caps), 1.0);
    }

    #[test]
    fn groups_sum_and_clamp() {
        let caps = vec![
            Capability::new("one", "one", ["alpha", "beta"]),
            Capability::new("two", "two", ["gamma", "delta"]),
        ];
        // 0.6 + 0.6 clamps to 1.0 even though neither group alone reaches it
        assert_eq!(score("alpha beta gamma delta", &caps), 1.0);

        let s = score("alpha gamma", &caps);
        assert!((s - 0.6).abs() < 1e-6);
    }

    #[test]
    fn keywords_match_as_substrings() {
        let caps = vec![Capability::new("x", "x", ["api"])];
        assert!(score("rapid prototyping", &caps) > 0.0);
    }

    #[test]
    fn score_always_in_unit_interval() {
        let caps = vec![
            Capability::new("a", "a", ["a", "e", "i", "o", "u"]),
            Capability::new("b", "b", ["t", "n", "s", "r"]),
            Capability::new("c", "c", ["th", "he", "in"]),
        ];
        for msg in ["", "the quick brown fox", "aeiou tnsr thin", "zzz"] {
            let s = score(msg, &caps);
            assert!((0.0..=1.0).contains(&s), "{msg} scored {s}");
        }
    }

    #[test]
    fn default_threshold_applies() {
        let cap = Capability::new("x", "x", ["y"]);
        assert!((cap.confidence_threshold - 0.7).abs() < f32::EPSILON);
        let cap = cap.with_threshold(0.9);
        assert!((cap.confidence_threshold - 0.9).abs() < f32::EPSILON);
    }
}
