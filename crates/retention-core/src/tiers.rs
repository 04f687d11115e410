// Tier tables: ordered threshold -> points lookups shared by every factor.
//
// A table is evaluated best-threshold-first and the first matching tier wins.
// For higher-is-better tables a value matches when it is >= the threshold;
// for lower-is-better tables (e.g. batting-order slot) when it is <= it.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Direction in which a table's thresholds improve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierOrder {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

/// A single tier: values at or past `threshold` earn `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub threshold: f64,
    pub points: f64,
    pub label: String,
}

/// Ordered tier table. Tiers are stored best-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    #[serde(default)]
    pub order: TierOrder,
    pub tiers: Vec<Tier>,
}

impl TierTable {
    /// Build a higher-is-better table from `(threshold, points, label)` rows,
    /// highest threshold first.
    pub fn higher_is_better(rows: &[(f64, f64, &str)]) -> Self {
        Self::from_rows(TierOrder::HigherIsBetter, rows)
    }

    /// Build a lower-is-better table from `(threshold, points, label)` rows,
    /// lowest threshold first.
    pub fn lower_is_better(rows: &[(f64, f64, &str)]) -> Self {
        Self::from_rows(TierOrder::LowerIsBetter, rows)
    }

    fn from_rows(order: TierOrder, rows: &[(f64, f64, &str)]) -> Self {
        TierTable {
            order,
            tiers: rows
                .iter()
                .map(|&(threshold, points, label)| Tier {
                    threshold,
                    points,
                    label: label.to_string(),
                })
                .collect(),
        }
    }

    /// Return the first tier the value reaches, or `None` when it reaches no
    /// tier (or is not a finite number).
    pub fn lookup(&self, value: f64) -> Option<&Tier> {
        if !value.is_finite() {
            return None;
        }
        self.tiers.iter().find(|tier| match self.order {
            TierOrder::HigherIsBetter => value >= tier.threshold,
            TierOrder::LowerIsBetter => value <= tier.threshold,
        })
    }

    /// Points for `value`; zero when no tier matches.
    pub fn points(&self, value: f64) -> f64 {
        self.lookup(value).map_or(0.0, |tier| tier.points)
    }

    /// The worst tier in the table (last entry).
    pub fn floor(&self) -> Option<&Tier> {
        self.tiers.last()
    }

    /// Check that the table is non-empty, finite, and strictly monotonic in
    /// its direction. `name` identifies the table in the error.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::EmptyTierTable {
                table: name.to_string(),
            });
        }
        for (index, tier) in self.tiers.iter().enumerate() {
            if !tier.threshold.is_finite() || !tier.points.is_finite() {
                return Err(ConfigError::ValidationError {
                    field: format!("{name}[{index}]"),
                    message: "threshold and points must be finite".into(),
                });
            }
        }
        for (index, pair) in self.tiers.windows(2).enumerate() {
            let ordered = match self.order {
                TierOrder::HigherIsBetter => pair[0].threshold > pair[1].threshold,
                TierOrder::LowerIsBetter => pair[0].threshold < pair[1].threshold,
            };
            if !ordered {
                return Err(ConfigError::TierTableNotMonotonic {
                    table: name.to_string(),
                    index: index + 1,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn grades() -> TierTable {
        TierTable::higher_is_better(&[
            (90.0, 14.0, "elite"),
            (60.0, 8.0, "good"),
            (0.0, 0.0, "terrible"),
        ])
    }

    #[test]
    fn higher_is_better_first_match_wins() {
        let table = grades();
        assert_eq!(table.lookup(95.0).unwrap().label, "elite");
        assert_eq!(table.lookup(90.0).unwrap().label, "elite");
        assert_eq!(table.lookup(89.99).unwrap().label, "good");
        assert_eq!(table.lookup(0.0).unwrap().label, "terrible");
    }

    #[test]
    fn below_every_threshold_is_no_match() {
        let table = grades();
        assert!(table.lookup(-1.0).is_none());
        assert_eq!(table.points(-1.0), 0.0);
    }

    #[test]
    fn non_finite_value_never_matches() {
        let table = grades();
        assert!(table.lookup(f64::NAN).is_none());
        assert!(table.lookup(f64::INFINITY).is_none());
    }

    #[test]
    fn lower_is_better_matches_at_or_below() {
        let table = TierTable::lower_is_better(&[
            (3.0, 10.0, "top three"),
            (5.0, 8.0, "four-five"),
            (9.0, 4.0, "bottom"),
        ]);
        assert_eq!(table.points(1.0), 10.0);
        assert_eq!(table.points(3.0), 10.0);
        assert_eq!(table.points(4.2), 8.0);
        assert_eq!(table.points(8.9), 4.0);
        assert_eq!(table.points(9.5), 0.0);
    }

    #[test]
    fn floor_is_last_tier() {
        let table = grades();
        assert_eq!(table.floor().unwrap().label, "terrible");
    }

    #[test]
    fn validate_accepts_ordered_table() {
        assert!(grades().validate("offense").is_ok());
    }

    #[test]
    fn validate_rejects_unordered_table() {
        let table = TierTable::higher_is_better(&[
            (60.0, 8.0, "good"),
            (90.0, 14.0, "elite"),
        ]);
        let err = table.validate("offense").unwrap_err();
        assert_eq!(
            err,
            ConfigError::TierTableNotMonotonic {
                table: "offense".into(),
                index: 1
            }
        );
    }

    #[test]
    fn validate_rejects_duplicate_thresholds() {
        let table = TierTable::lower_is_better(&[(3.0, 10.0, "a"), (3.0, 8.0, "b")]);
        assert!(table.validate("slot").is_err());
    }

    #[test]
    fn validate_rejects_empty_table() {
        let table = TierTable {
            order: TierOrder::HigherIsBetter,
            tiers: Vec::new(),
        };
        assert!(matches!(
            table.validate("empty"),
            Err(ConfigError::EmptyTierTable { .. })
        ));
    }

    #[test]
    fn table_parses_from_toml() {
        let text = r#"
order = "lower_is_better"

[[tiers]]
threshold = 3.0
points = 10.0
label = "top three"

[[tiers]]
threshold = 5.0
points = 8.0
label = "four-five"
"#;
        let table: TierTable = toml::from_str(text).unwrap();
        assert_eq!(table.order, TierOrder::LowerIsBetter);
        assert_eq!(table.tiers.len(), 2);
        assert_eq!(table.points(4.0), 8.0);
    }
}
