use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tabled::{Table, Tabled};
use tracing::info;

use crate::errors::Result;
use crate::io::containers::FeatureRecord;
use crate::utils::sorting::argsort_by;

/// Largest differences at which two features are considered the same.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchThresholds {
    pub rt: f64,
    pub mz: f64,
    pub im: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            rt: 5.0,
            mz: 0.1,
            im: 0.031,
        }
    }
}

impl MatchThresholds {
    fn matches_rt_mz(&self, a: &FeatureRecord, b: &FeatureRecord) -> bool {
        (a.rt - b.rt).abs() < self.rt && (a.mz - b.mz).abs() < self.mz
    }

    pub fn matches(&self, a: &FeatureRecord, b: &FeatureRecord) -> bool {
        self.matches_rt_mz(a, b) && (a.im - b.im).abs() < self.im
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub num_common: usize,
    pub no_match: usize,
    pub one_match: usize,
    pub multiple_matches: usize,
    /// References with no match that some feature matched on RT and
    /// m/z alone. Also counted in `no_match`.
    pub missed: usize,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Statistic")]
    name: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

impl ComparisonSummary {
    fn rows(&self) -> Vec<SummaryRow> {
        vec![
            SummaryRow {
                name: "Common features",
                count: self.num_common,
            },
            SummaryRow {
                name: "No matches",
                count: self.no_match,
            },
            SummaryRow {
                name: "One match",
                count: self.one_match,
            },
            SummaryRow {
                name: "Multiple matches",
                count: self.multiple_matches,
            },
            SummaryRow {
                name: "Missed",
                count: self.missed,
            },
        ]
    }

    pub fn to_table(&self) -> String {
        Table::new(self.rows()).to_string()
    }

    /// Plain `name: count` lines, as written to the summary report.
    pub fn report(&self) -> String {
        self.rows()
            .iter()
            .map(|x| format!("{}: {}\n", x.name, x.count))
            .collect()
    }
}

/// A reference feature matched by more than one found feature.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipleMatch {
    pub reference: FeatureRecord,
    pub matches: Vec<FeatureRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comparison {
    pub summary: ComparisonSummary,
    pub multiple: Vec<MultipleMatch>,
}

impl Comparison {
    pub fn multiple_report(&self) -> String {
        let mut out = String::new();
        for entry in self.multiple.iter() {
            for record in std::iter::once(&entry.reference).chain(entry.matches.iter()) {
                out.push_str(&format!(
                    "{:.6}, {:.6}, {:.6}\n",
                    record.rt, record.mz, record.im
                ));
            }
            out.push_str(&"=".repeat(50));
            out.push('\n');
        }
        out
    }

    /// Writes `{group}-summary.txt` and `{group}-multiple.txt`.
    pub fn write_reports(&self, group: &str) -> Result<(PathBuf, PathBuf)> {
        let summary_path = PathBuf::from(format!("{}-summary.txt", group));
        let multiple_path = PathBuf::from(format!("{}-multiple.txt", group));
        std::fs::write(&summary_path, self.summary.report())?;
        std::fs::write(&multiple_path, self.multiple_report())?;
        info!(
            "Wrote {} and {}",
            summary_path.display(),
            multiple_path.display()
        );
        Ok((summary_path, multiple_path))
    }
}

/// Counts how many found features every reference feature maps to.
///
/// References are visited in ascending ion mobility. Every pair is
/// checked, there is no index.
pub fn compare_features(
    found: &[FeatureRecord],
    reference: &[FeatureRecord],
    thresholds: &MatchThresholds,
) -> Comparison {
    let mut out = Comparison::default();

    for i in argsort_by(reference, |x| x.im) {
        let reference = reference[i];
        let mut similar = Vec::new();
        let mut attempted = false;
        for feature in found {
            if thresholds.matches(feature, &reference) {
                similar.push(*feature);
            } else if thresholds.matches_rt_mz(feature, &reference) {
                attempted = true;
            }
        }

        match similar.len() {
            0 => {
                out.summary.no_match += 1;
                if attempted {
                    out.summary.missed += 1;
                }
            }
            1 => {
                out.summary.num_common += 1;
                out.summary.one_match += 1;
            }
            _ => {
                out.summary.num_common += 1;
                out.summary.multiple_matches += 1;
                out.multiple.push(MultipleMatch {
                    reference,
                    matches: similar,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(rt: f64, mz: f64, im: f64) -> FeatureRecord {
        FeatureRecord { rt, mz, im }
    }

    #[test]
    fn test_match_categories() {
        let found = vec![
            rec(100.0, 500.0, 1.00),
            rec(101.0, 500.05, 1.01),
            rec(200.0, 600.0, 0.90),
            rec(300.0, 700.0, 1.30),
        ];
        let reference = vec![
            // Two matches.
            rec(100.5, 500.02, 1.005),
            // One match.
            rec(199.0, 600.01, 0.91),
            // RT and m/z agree but mobility does not.
            rec(300.0, 700.0, 0.80),
            // Nothing close.
            rec(50.0, 400.0, 1.0),
        ];
        let out = compare_features(&found, &reference, &MatchThresholds::default());
        assert_eq!(
            out.summary,
            ComparisonSummary {
                num_common: 2,
                no_match: 2,
                one_match: 1,
                multiple_matches: 1,
                missed: 1,
            }
        );
        assert_eq!(out.multiple.len(), 1);
        assert_eq!(out.multiple[0].matches.len(), 2);
        assert_eq!(out.multiple[0].reference, reference[0]);
    }

    #[test]
    fn test_reports() {
        let found = vec![rec(1.0, 2.0, 3.0), rec(1.1, 2.01, 3.001)];
        let reference = vec![rec(1.0, 2.0, 3.0)];
        let out = compare_features(&found, &reference, &MatchThresholds::default());

        let report = out.summary.report();
        assert!(report.starts_with("Common features: 1\n"));
        assert!(report.contains("Multiple matches: 1\n"));
        assert!(out.summary.to_table().contains("Missed"));

        let multiple = out.multiple_report();
        let lines: Vec<&str> = multiple.lines().collect();
        assert_eq!(lines[0], "1.000000, 2.000000, 3.000000");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "=".repeat(50));

        let dir = tempfile::tempdir().unwrap();
        let group = dir.path().join("bench");
        let (summary_path, multiple_path) =
            out.write_reports(&group.display().to_string()).unwrap();
        assert!(summary_path.ends_with("bench-summary.txt"));
        assert_eq!(std::fs::read_to_string(multiple_path).unwrap(), multiple);
    }

    #[test]
    fn test_empty_inputs() {
        let out = compare_features(&[], &[rec(1.0, 2.0, 3.0)], &MatchThresholds::default());
        assert_eq!(out.summary.no_match, 1);
        assert_eq!(out.summary.missed, 0);

        let out = compare_features(&[rec(1.0, 2.0, 3.0)], &[], &MatchThresholds::default());
        assert_eq!(out.summary, ComparisonSummary::default());
    }
}
