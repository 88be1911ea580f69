use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One labeled value range, open below and closed above: `(lower, upper]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
    pub label: String,
}

impl Band {
    pub fn new(lower: f64, upper: f64, label: impl Into<String>) -> Self {
        Band {
            lower,
            upper,
            label: label.into(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value > self.lower && value <= self.upper
    }
}

/// Ordered, contiguous bands used to bucket a continuous column.
///
/// Each band starts where the previous one ends, so the table covers
/// `(first.lower, last.upper]` without gaps. A value outside that range has
/// no label; callers exclude such rows.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    bands: Vec<Band>,
}

impl BandTable {
    pub fn new(bands: Vec<Band>) -> Result<Self, AnalysisError> {
        if bands.is_empty() {
            return Err(AnalysisError::EmptyBands);
        }
        for band in &bands {
            if band.lower >= band.upper {
                return Err(AnalysisError::InvertedBand(band.label.clone()));
            }
        }
        for pair in bands.windows(2) {
            let (earlier, later) = (pair[0].label.clone(), pair[1].label.clone());
            if pair[1].lower < pair[0].upper {
                return Err(AnalysisError::UnorderedBands { earlier, later });
            }
            if pair[1].lower > pair[0].upper {
                return Err(AnalysisError::BandGap { earlier, later });
            }
        }
        Ok(BandTable { bands })
    }

    /// Stress levels on a 1–10 scale.
    ///
    /// | Range     | Label          |
    /// |-----------|----------------|
    /// | (0, 3]    | `Low (1–3)`    |
    /// | (3, 6]    | `Medium (4–6)` |
    /// | (6, 10]   | `High (7–10)`  |
    pub fn stress_levels() -> Self {
        BandTable {
            bands: default_stress_bands(),
        }
    }

    /// Label of the band containing `value`, if any.
    pub fn bucket(&self, value: f64) -> Option<&str> {
        self.bands
            .iter()
            .find(|b| b.contains(value))
            .map(|b| b.label.as_str())
    }

    pub fn band(&self, label: &str) -> Option<&Band> {
        self.bands.iter().find(|b| b.label == label)
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn labels(&self) -> Vec<String> {
        self.bands.iter().map(|b| b.label.clone()).collect()
    }
}

pub fn default_stress_bands() -> Vec<Band> {
    vec![
        Band::new(0.0, 3.0, "Low (1–3)"),
        Band::new(3.0, 6.0, "Medium (4–6)"),
        Band::new(6.0, 10.0, "High (7–10)"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_band_boundaries() {
        let bands = BandTable::stress_levels();
        assert_eq!(bands.bucket(1.0), Some("Low (1–3)"));
        assert_eq!(bands.bucket(3.0), Some("Low (1–3)"));
        assert_eq!(bands.bucket(4.0), Some("Medium (4–6)"));
        assert_eq!(bands.bucket(6.0), Some("Medium (4–6)"));
        assert_eq!(bands.bucket(7.0), Some("High (7–10)"));
        assert_eq!(bands.bucket(10.0), Some("High (7–10)"));
    }

    #[test]
    fn test_values_outside_every_band_have_no_label() {
        let bands = BandTable::stress_levels();
        assert_eq!(bands.bucket(0.0), None);
        assert_eq!(bands.bucket(11.0), None);
        assert_eq!(bands.bucket(f64::NAN), None);
    }

    #[test]
    fn test_values_between_whole_levels_are_bucketed() {
        let bands = BandTable::stress_levels();
        assert_eq!(bands.bucket(0.5), Some("Low (1–3)"));
        assert_eq!(bands.bucket(3.5), Some("Medium (4–6)"));
        assert_eq!(bands.bucket(6.5), Some("High (7–10)"));
    }

    #[test]
    fn test_bucket_is_deterministic() {
        let bands = BandTable::stress_levels();
        for v in 1..=10 {
            let first = bands.bucket(v as f64);
            for _ in 0..3 {
                assert_eq!(bands.bucket(v as f64), first);
            }
        }
    }

    #[test]
    fn test_new_validates_bands() {
        assert_eq!(BandTable::new(vec![]), Err(AnalysisError::EmptyBands));
        assert_eq!(
            BandTable::new(vec![Band::new(5.0, 1.0, "bad")]),
            Err(AnalysisError::InvertedBand("bad".into()))
        );
        assert_eq!(
            BandTable::new(vec![Band::new(2.0, 2.0, "empty")]),
            Err(AnalysisError::InvertedBand("empty".into()))
        );
        assert!(matches!(
            BandTable::new(vec![Band::new(1.0, 5.0, "a"), Band::new(4.0, 9.0, "b")]),
            Err(AnalysisError::UnorderedBands { .. })
        ));
        assert_eq!(
            BandTable::new(vec![Band::new(1.0, 2.0, "a"), Band::new(5.0, 9.0, "b")]),
            Err(AnalysisError::BandGap {
                earlier: "a".into(),
                later: "b".into()
            })
        );
        assert!(BandTable::new(vec![Band::new(1.0, 5.0, "a"), Band::new(5.0, 9.0, "b")]).is_ok());
        assert!(BandTable::new(default_stress_bands()).is_ok());
    }

    #[test]
    fn test_band_lookup() {
        let bands = BandTable::stress_levels();
        assert_eq!(bands.band("High (7–10)").map(|b| b.lower), Some(6.0));
        assert_eq!(bands.labels().len(), 3);
    }
}
