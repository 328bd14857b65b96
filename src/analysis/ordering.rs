//! Display ordering for broadcast technique labels.
//!
//! Reports and charts list techniques in the same order on every run so two
//! runs can be compared side by side. The order puts one designated baseline
//! at an extreme, sorts the parametrized family by its embedded integer and
//! leaves anything unrecognized in between.

use std::sync::LazyLock;

use regex::Regex;

/// Baseline technique label used when the caller does not override it
pub const DEFAULT_BASELINE: &str = "BasicPublish";

/// Match a parametrized family label, e.g. "WavePublish-15"
static PARAM_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-(\d+)$").expect("Invalid technique label regex"));

/// Where the baseline technique sits relative to everything else.
///
/// Both placements are in active use: the duplicate-rate comparison leads
/// with the baseline, the delay sweep trails with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselinePlacement {
    First,
    Last,
}

/// Total order over technique labels.
///
/// Pure and deterministic: the same label set sorts identically regardless
/// of input order or prior calls.
#[derive(Debug, Clone)]
pub struct TechniqueOrder {
    baseline: String,
    placement: BaselinePlacement,
}

impl TechniqueOrder {
    pub fn new(baseline: impl Into<String>, placement: BaselinePlacement) -> Self {
        Self {
            baseline: baseline.into(),
            placement,
        }
    }

    /// Sort rank for one label. Lower ranks sort earlier. Unrecognized
    /// labels land after the parametrized family but before a trailing
    /// baseline.
    fn rank(&self, label: &str) -> (u8, u64) {
        if label == self.baseline {
            return match self.placement {
                BaselinePlacement::First => (0, 0),
                BaselinePlacement::Last => (3, 0),
            };
        }
        if let Some(param) = family_parameter(label) {
            return (1, param);
        }
        (2, 0)
    }

    /// Order labels in place. The sort is stable, so labels with equal rank
    /// keep the order the caller handed in.
    pub fn sort(&self, labels: &mut [String]) {
        labels.sort_by(|a, b| self.rank(a).cmp(&self.rank(b)));
    }
}

/// Embedded integer parameter of a family label ("WavePublish-20" -> 20).
/// The comparison is numeric, never lexical.
pub fn family_parameter(label: &str) -> Option<u64> {
    let caps = PARAM_LABEL.captures(label)?;
    caps.get(2)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_family_parameter() {
        assert_eq!(family_parameter("WavePublish-5"), Some(5));
        assert_eq!(family_parameter("WavePublish-100"), Some(100));
        assert_eq!(family_parameter("BasicPublish"), None);
        assert_eq!(family_parameter("WavePublish-"), None);
    }

    #[test]
    fn test_parameter_sorts_numerically() {
        let order = TechniqueOrder::new(DEFAULT_BASELINE, BaselinePlacement::First);
        let mut set = labels(&["WavePublish-10", "WavePublish-2"]);
        order.sort(&mut set);
        // 2 before 10 even though "10" < "2" lexically
        assert_eq!(set, labels(&["WavePublish-2", "WavePublish-10"]));
    }

    #[test]
    fn test_baseline_first() {
        let order = TechniqueOrder::new(DEFAULT_BASELINE, BaselinePlacement::First);
        let mut set = labels(&["WavePublish-15", "BasicPublish", "WavePublish-5"]);
        order.sort(&mut set);
        assert_eq!(
            set,
            labels(&["BasicPublish", "WavePublish-5", "WavePublish-15"])
        );
    }

    #[test]
    fn test_baseline_last_trails_unrecognized() {
        let order = TechniqueOrder::new(DEFAULT_BASELINE, BaselinePlacement::Last);
        let mut set = labels(&["BasicPublish", "Mystery", "WavePublish-20", "WavePublish-5"]);
        order.sort(&mut set);
        assert_eq!(
            set,
            labels(&["WavePublish-5", "WavePublish-20", "Mystery", "BasicPublish"])
        );
    }

    #[test]
    fn test_unrecognized_labels_keep_input_order() {
        let order = TechniqueOrder::new(DEFAULT_BASELINE, BaselinePlacement::First);
        let mut set = labels(&["Zeta", "Alpha", "WavePublish-5"]);
        order.sort(&mut set);
        assert_eq!(set, labels(&["WavePublish-5", "Zeta", "Alpha"]));
    }

    #[test]
    fn test_ordering_is_deterministic() {
        let order = TechniqueOrder::new(DEFAULT_BASELINE, BaselinePlacement::Last);
        let mut a = labels(&["WavePublish-5", "BasicPublish", "WavePublish-50"]);
        let mut b = a.clone();
        order.sort(&mut a);
        order.sort(&mut b);
        assert_eq!(a, b);
        // Re-sorting sorted output is a no-op
        let sorted = a.clone();
        order.sort(&mut a);
        assert_eq!(a, sorted);
    }

    #[test]
    fn test_custom_baseline_label() {
        let order = TechniqueOrder::new("FloodPublish", BaselinePlacement::First);
        let mut set = labels(&["WavePublish-5", "FloodPublish", "BasicPublish"]);
        order.sort(&mut set);
        // "BasicPublish" is not the baseline here and matches no family
        // pattern, so it trails the recognized labels
        assert_eq!(
            set,
            labels(&["FloodPublish", "WavePublish-5", "BasicPublish"])
        );
    }
}
