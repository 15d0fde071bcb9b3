use crate::catalog::RiskTier;
use crate::scanner::{FolderStatus, ScanResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOURLY_RATE: f64 = 50.0;

/// Fallback when a dead result somehow carries no matched record. The
/// scanner's classification rules make that unreachable, but a report
/// should never depend on it.
const FALLBACK_MIGRATION_HOURS: f64 = 2.0;

/// Aggregate cost of every dead product found in one scan. Purely computed
/// from the scan results, no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxReport {
    pub account_age: String,
    pub total_folders: usize,
    pub dead: Vec<ScanResult>,
    pub alive: Vec<ScanResult>,
    pub unknown: Vec<ScanResult>,
    pub total_migration_hours: f64,
    pub hourly_rate: f64,
    pub opportunity_cost: f64,
    pub products_lost: usize,
    pub data_at_risk_percent: u32,
}

pub struct TaxCalculator {
    hourly_rate: f64,
}

impl TaxCalculator {
    pub fn new(hourly_rate: f64) -> Self {
        Self { hourly_rate }
    }

    pub fn calculate(&self, results: &[ScanResult]) -> TaxReport {
        let dead: Vec<ScanResult> = bucket(results, FolderStatus::Dead);
        let alive: Vec<ScanResult> = bucket(results, FolderStatus::Alive);
        let unknown: Vec<ScanResult> = bucket(results, FolderStatus::Unknown);

        let total_migration_hours: f64 = dead
            .iter()
            .map(|r| {
                r.product
                    .as_ref()
                    .map_or(FALLBACK_MIGRATION_HOURS, |p| p.avg_migration_hours)
            })
            .sum();

        let high_risk = dead
            .iter()
            .filter(|r| {
                r.product
                    .as_ref()
                    .is_some_and(|p| p.data_loss_risk == RiskTier::High)
            })
            .count();
        let data_at_risk_percent = if dead.is_empty() {
            0
        } else {
            (high_risk as f64 / dead.len() as f64 * 100.0).round() as u32
        };

        let oldest_data = results.iter().filter_map(|r| r.oldest_file).min();
        let account_age = oldest_data
            .map(|t| format!("Since {}", t.format("%B %Y")))
            .unwrap_or_else(|| "Unknown".to_string());

        TaxReport {
            account_age,
            total_folders: results.len(),
            products_lost: dead.len(),
            total_migration_hours,
            hourly_rate: self.hourly_rate,
            opportunity_cost: total_migration_hours * self.hourly_rate,
            data_at_risk_percent,
            dead,
            alive,
            unknown,
        }
    }
}

fn bucket(results: &[ScanResult], status: FolderStatus) -> Vec<ScanResult> {
    results
        .iter()
        .filter(|r| r.status == status)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    fn result(folder: &str, status: FolderStatus, product_slug: Option<&str>) -> ScanResult {
        let product = product_slug.map(|slug| {
            Catalog::builtin()
                .by_slug(slug)
                .expect("test slug exists")
                .clone()
        });
        ScanResult {
            folder: folder.to_string(),
            path: PathBuf::from(folder),
            status,
            product,
            file_count: 1,
            size_bytes: 1024,
            oldest_file: None,
            newest_file: None,
        }
    }

    #[test]
    fn no_dead_results_yields_zero_tax() {
        let results = vec![
            result("Gmail", FolderStatus::Alive, None),
            result("Mystery", FolderStatus::Unknown, None),
        ];
        let report = TaxCalculator::new(DEFAULT_HOURLY_RATE).calculate(&results);

        assert_eq!(report.total_migration_hours, 0.0);
        assert_eq!(report.opportunity_cost, 0.0);
        assert_eq!(report.data_at_risk_percent, 0);
        assert_eq!(report.products_lost, 0);
        assert_eq!(report.total_folders, 2);
    }

    #[test]
    fn migration_hours_come_from_matched_records() {
        let results = vec![
            result("Google Reader", FolderStatus::Dead, Some("google-reader")),
            result("Google Play Music", FolderStatus::Dead, Some("google-play-music")),
        ];
        let report = TaxCalculator::new(100.0).calculate(&results);

        // Reader: 3h low risk, Play Music: 6h medium risk.
        assert_eq!(report.total_migration_hours, 9.0);
        assert_eq!(report.opportunity_cost, 900.0);
        assert_eq!(report.data_at_risk_percent, 0);
        assert_eq!(report.products_lost, 2);
    }

    #[test]
    fn dead_result_without_record_uses_fallback_hours() {
        let results = vec![result("Orphan", FolderStatus::Dead, None)];
        let report = TaxCalculator::new(50.0).calculate(&results);
        assert_eq!(report.total_migration_hours, FALLBACK_MIGRATION_HOURS);
    }

    #[test]
    fn risk_percent_counts_high_risk_share() {
        let results = vec![
            result("Google+ Stream", FolderStatus::Dead, Some("google-plus")),
            result("Stadia", FolderStatus::Dead, Some("stadia")),
            result("Reader", FolderStatus::Dead, Some("google-reader")),
        ];
        let report = TaxCalculator::new(50.0).calculate(&results);
        // Two of three dead products are high risk.
        assert_eq!(report.data_at_risk_percent, 67);
    }

    #[test]
    fn account_age_from_earliest_file() {
        let mut old = result("Reader", FolderStatus::Dead, Some("google-reader"));
        old.oldest_file = Some(Utc.with_ymd_and_hms(2012, 1, 15, 0, 0, 0).unwrap());
        let mut newer = result("Gmail", FolderStatus::Alive, None);
        newer.oldest_file = Some(Utc.with_ymd_and_hms(2018, 6, 1, 0, 0, 0).unwrap());

        let report = TaxCalculator::new(50.0).calculate(&[old, newer]);
        assert_eq!(report.account_age, "Since January 2012");
    }

    #[test]
    fn account_age_unknown_without_files() {
        let report = TaxCalculator::new(50.0).calculate(&[result("Empty", FolderStatus::Unknown, None)]);
        assert_eq!(report.account_age, "Unknown");
    }
}
