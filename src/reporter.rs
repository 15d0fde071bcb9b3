use crate::catalog::{ProductRecord, RiskTier};
use crate::correlation::DeathEvent;
use crate::extractor::Extraction;
use crate::places;
use crate::tax::TaxReport;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;

const BOX_WIDTH: usize = 64;

/// Renders scan results, journeys, and timelines as text. All render
/// methods are pure string builders so output is testable without
/// capturing stdout.
pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    /// The boxed "invoice" view of a tax report.
    pub fn render_tax_report(&self, report: &TaxReport) -> String {
        let mut lines: Vec<String> = Vec::new();
        let rule = "═".repeat(BOX_WIDTH);

        lines.push(String::new());
        lines.push(format!("╔{rule}╗"));
        lines.push(boxed(&center("💀 TAKEOUT TAX INVOICE 💀")));
        lines.push(format!("╠{rule}╣"));
        lines.push(boxed(&format!("  Account:          {}", report.account_age)));
        lines.push(boxed(&format!(
            "  Products Scanned: {}",
            report.total_folders
        )));
        lines.push(boxed(&format!("  Hourly Rate:      ${}", report.hourly_rate)));
        lines.push(format!("╠{rule}╣"));

        if report.dead.is_empty() {
            lines.push(boxed(""));
            lines.push(boxed("  No dead products found in this export."));
            lines.push(boxed("  Try exporting ALL data from takeout.google.com"));
            lines.push(boxed(""));
        } else {
            lines.push(boxed("  DEAD PRODUCTS FOUND:"));
            lines.push(boxed(""));
            for dead in &report.dead {
                let name = dead
                    .product
                    .as_ref()
                    .map(|p| p.name.as_str())
                    .unwrap_or(&dead.folder);
                let died = dead
                    .product
                    .as_ref()
                    .and_then(|p| p.date_close)
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "?".to_string());
                let hours = dead.product.as_ref().map_or(0.0, |p| p.avg_migration_hours);
                let risk = dead
                    .product
                    .as_ref()
                    .map_or("?", |p| risk_label(p.data_loss_risk));

                lines.push(boxed(&format!("  ❌ {name:<25} Died: {died}")));
                lines.push(boxed(&format!(
                    "     {} files, {}",
                    dead.file_count,
                    format_size(dead.size_bytes)
                )));
                lines.push(boxed(&format!("     Migration: {hours}h | Risk: {risk}")));
                if let Some(alternatives) = dead
                    .product
                    .as_ref()
                    .filter(|p| !p.alternatives.is_empty())
                    .map(|p| p.alternatives.join(", "))
                {
                    lines.push(boxed(&format!("     Try: {alternatives}")));
                }
                lines.push(boxed(""));
            }
        }

        lines.push(format!("╠{rule}╣"));
        lines.push(boxed("  YOUR TAKEOUT TAX:"));
        lines.push(boxed(""));
        lines.push(boxed(&format!(
            "  ⏱️  Migration Hours:     {}",
            report.total_migration_hours
        )));
        lines.push(boxed(&format!(
            "  💰 Opportunity Cost:    ${}",
            report.opportunity_cost
        )));
        lines.push(boxed(&format!(
            "  📉 Products Lost:       {}",
            report.products_lost
        )));
        lines.push(boxed(&format!(
            "  ⚠️  High Risk Data:      {}%",
            report.data_at_risk_percent
        )));
        lines.push(boxed(""));
        lines.push(format!("╚{rule}╝"));

        if report.products_lost > 0 {
            let times = if report.products_lost == 1 { "time" } else { "times" };
            lines.push(String::new());
            lines.push(format!(
                "You've been \"Googled\" {} {times}.",
                report.products_lost
            ));
        }
        if !report.alive.is_empty() {
            let alive: Vec<&str> = report.alive.iter().map(|r| r.folder.as_str()).collect();
            lines.push(String::new());
            lines.push(format!("Still alive: {}", alive.join(", ")));
        }
        lines.push(String::new());

        lines.join("\n")
    }

    /// Numbered shutdown narratives with summary stats.
    pub fn render_journey(&self, events: &[DeathEvent], window_days: i64) -> String {
        if events.is_empty() {
            return "No product deaths found in your location history.\n".to_string();
        }

        let mut lines: Vec<String> = Vec::new();
        for (index, event) in events.iter().enumerate() {
            let close = event
                .product
                .date_close
                .map(|d| d.to_string())
                .unwrap_or_else(|| "?".to_string());
            lines.push(format!("[{}] {close} - {}", index + 1, event.product.name));
            lines.push(format!("    📍 {}", event.narrative));
            if let Some(location) = &event.location {
                lines.push(format!(
                    "    📌 Coordinates: {:.4}, {:.4}",
                    location.latitude, location.longitude
                ));
            }
            lines.push(String::new());
        }

        let nearby = events.iter().filter(|e| e.was_nearby).count();
        lines.push("📊 Summary:".to_string());
        lines.push(format!(
            "   Products that died during your travels: {}",
            events.len()
        ));
        lines.push(format!(
            "   Shutdowns within {window_days} days of a recorded location: {nearby}"
        ));

        if let Some((place, count)) = busiest_place(events) {
            lines.push(format!(
                "   Most products died while you were in one place: {count} in {place}"
            ));
        }
        lines.push(String::new());

        lines.join("\n")
    }

    /// One chronological view: account creation, places visited, product
    /// deaths, and the present day. Places without timestamps get dates
    /// estimated by spreading them evenly across the account's lifetime.
    pub fn render_timeline(&self, extraction: &Extraction, products: &[ProductRecord]) -> String {
        let now = Utc::now();
        let entries = build_timeline_entries(extraction, products, now);

        let mut lines: Vec<String> = Vec::new();
        let rule = "═".repeat(BOX_WIDTH);
        lines.push(String::new());
        lines.push(rule.clone());
        lines.push(center("🪦 YOUR GOOGLE JOURNEY TIMELINE 🪦"));
        lines.push(rule.clone());
        lines.push(String::new());

        let mut death_buffer: Vec<&TimelineEntry> = Vec::new();
        for entry in &entries {
            match entry.kind {
                EntryKind::Death => death_buffer.push(entry),
                EntryKind::Location => {
                    for death in death_buffer.drain(..) {
                        lines.push("│".to_string());
                        lines.push(format!(
                            "├── {} {:<30} {}",
                            death.emoji, death.name, death.date_label
                        ));
                    }
                    lines.push("│".to_string());
                    lines.push(format!("{} {}", entry.emoji, entry.name));
                    if entry.date_label != "Now" {
                        lines.push(format!("   {}", entry.date_label));
                    }
                }
            }
        }

        lines.push(String::new());
        lines.push(rule);

        let deaths = entries.iter().filter(|e| e.kind == EntryKind::Death).count();
        let places = entries
            .iter()
            .filter(|e| {
                e.kind == EntryKind::Location
                    && e.name != "Google Account Created"
                    && e.name != "Present Day"
            })
            .count();
        lines.push(String::new());
        lines.push(format!("📊 {places} places visited | {deaths} products died"));
        lines.push(String::new());

        lines.join("\n")
    }

    /// Machine-readable report, same shape the text invoice summarizes.
    pub fn export_json(&self, report: &TaxReport) -> crate::Result<String> {
        let dead_products: Vec<DeadProductJson> = report
            .dead
            .iter()
            .map(|r| DeadProductJson {
                name: r
                    .product
                    .as_ref()
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| r.folder.clone()),
                died_on: r.product.as_ref().and_then(|p| p.date_close),
                files: r.file_count,
                size_bytes: r.size_bytes,
                migration_hours: r.product.as_ref().map(|p| p.avg_migration_hours),
                data_loss_risk: r.product.as_ref().map(|p| p.data_loss_risk),
                alternatives: r
                    .product
                    .as_ref()
                    .map(|p| p.alternatives.clone())
                    .unwrap_or_default(),
            })
            .collect();

        let output = JsonReport {
            account_age: report.account_age.clone(),
            products_scanned: report.total_folders,
            hourly_rate: report.hourly_rate,
            dead_products,
            alive_products: report.alive.iter().map(|r| r.folder.clone()).collect(),
            tax: TaxSummaryJson {
                migration_hours: report.total_migration_hours,
                opportunity_cost: report.opportunity_cost,
                products_lost: report.products_lost,
                data_at_risk_percent: report.data_at_risk_percent,
            },
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport {
    account_age: String,
    products_scanned: usize,
    hourly_rate: f64,
    dead_products: Vec<DeadProductJson>,
    alive_products: Vec<String>,
    tax: TaxSummaryJson,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeadProductJson {
    name: String,
    died_on: Option<NaiveDate>,
    files: u64,
    size_bytes: u64,
    migration_hours: Option<f64>,
    data_loss_risk: Option<RiskTier>,
    alternatives: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxSummaryJson {
    migration_hours: f64,
    opportunity_cost: f64,
    products_lost: usize,
    data_at_risk_percent: u32,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum EntryKind {
    Location,
    Death,
}

#[derive(Debug)]
struct TimelineEntry {
    kind: EntryKind,
    date: DateTime<Utc>,
    date_label: String,
    name: String,
    emoji: String,
}

fn build_timeline_entries(
    extraction: &Extraction,
    products: &[ProductRecord],
    now: DateTime<Utc>,
) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = Vec::new();

    if let Some(created) = extraction.account_created {
        entries.push(TimelineEntry {
            kind: EntryKind::Location,
            date: created,
            date_label: created.format("%b %Y").to_string(),
            name: "Google Account Created".to_string(),
            emoji: "🎂".to_string(),
        });
    }

    // Deduplicate places by display name, keeping first appearance.
    let mut seen: HashSet<String> = HashSet::new();
    let unique: Vec<_> = extraction
        .points
        .iter()
        .filter(|p| seen.insert(p.derived_name()))
        .collect();

    // Undated places get spread evenly between account creation and now.
    let spread_start = extraction
        .account_created
        .unwrap_or_else(|| date_time(2013, 1, 1));
    let span_seconds = (now - spread_start).num_seconds().max(0);
    let count = unique.len() as i64;

    for (index, point) in unique.iter().enumerate() {
        let estimated = point.timestamp.unwrap_or_else(|| {
            let offset = span_seconds * (index as i64 + 1) / (count + 1);
            spread_start + chrono::Duration::seconds(offset)
        });
        let date_label = if point.timestamp.is_some() {
            estimated.format("%b %Y").to_string()
        } else {
            format!("~{}", estimated.year())
        };
        entries.push(TimelineEntry {
            kind: EntryKind::Location,
            date: estimated,
            date_label,
            name: point.derived_name(),
            emoji: places::identify(point.latitude, point.longitude)
                .emoji
                .to_string(),
        });
    }

    let account_start = extraction
        .account_created
        .unwrap_or_else(|| date_time(2010, 1, 1));
    for product in products {
        let Some(close) = product.date_close else {
            continue;
        };
        let close_time = date_time(close.year(), close.month(), close.day());
        if close_time < account_start {
            continue;
        }
        entries.push(TimelineEntry {
            kind: EntryKind::Death,
            date: close_time,
            date_label: close_time.format("%b %Y").to_string(),
            name: product.name.clone(),
            emoji: "💀".to_string(),
        });
    }

    entries.push(TimelineEntry {
        kind: EntryKind::Location,
        date: now,
        date_label: "Now".to_string(),
        name: "Present Day".to_string(),
        emoji: "📍".to_string(),
    });

    entries.sort_by_key(|e| e.date);
    entries
}

fn busiest_place(events: &[DeathEvent]) -> Option<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for event in events {
        let Some(name) = event.location.as_ref().and_then(|l| l.place_name.clone()) else {
            continue;
        };
        match counts.iter_mut().find(|(place, _)| *place == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }
    counts.into_iter().max_by_key(|(_, count)| *count)
}

fn boxed(content: &str) -> String {
    format!("║{}║", pad_chars(content, BOX_WIDTH))
}

fn center(content: &str) -> String {
    let chars = content.chars().count();
    let left = BOX_WIDTH.saturating_sub(chars) / 2;
    format!("{}{content}", " ".repeat(left))
}

/// Pad by character count, the same arithmetic the box borders use.
fn pad_chars(content: &str, width: usize) -> String {
    let chars = content.chars().count();
    if chars >= width {
        content.to_string()
    } else {
        format!("{content}{}", " ".repeat(width - chars))
    }
}

fn risk_label(risk: RiskTier) -> &'static str {
    match risk {
        RiskTier::Low => "LOW",
        RiskTier::Medium => "MEDIUM",
        RiskTier::High => "HIGH",
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}

fn date_time(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::scanner::{FolderStatus, ScanResult};
    use crate::tax::TaxCalculator;
    use std::path::PathBuf;

    fn dead_reader_result() -> ScanResult {
        let product = Catalog::builtin()
            .by_slug("google-reader")
            .expect("catalog has reader")
            .clone();
        ScanResult {
            folder: "Google Reader".to_string(),
            path: PathBuf::from("Google Reader"),
            status: FolderStatus::Dead,
            product: Some(product),
            file_count: 10,
            size_bytes: 2048,
            oldest_file: None,
            newest_file: None,
        }
    }

    #[test]
    fn tax_report_renders_dead_products_and_totals() {
        let report = TaxCalculator::new(50.0).calculate(&[dead_reader_result()]);
        let rendered = Reporter::new().render_tax_report(&report);

        assert!(rendered.contains("TAKEOUT TAX INVOICE"));
        assert!(rendered.contains("Google Reader"));
        assert!(rendered.contains("Died: 2013-07-01"));
        assert!(rendered.contains("Migration: 3h | Risk: LOW"));
        assert!(rendered.contains("Try: Feedly, Inoreader, NewsBlur"));
    }

    #[test]
    fn empty_journey_has_friendly_message() {
        let rendered = Reporter::new().render_journey(&[], 3);
        assert!(rendered.contains("No product deaths found"));
    }

    #[test]
    fn json_export_is_valid_and_carries_totals() {
        let report = TaxCalculator::new(50.0).calculate(&[dead_reader_result()]);
        let json = Reporter::new().export_json(&report).expect("export succeeds");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(value["tax"]["migrationHours"], 3.0);
        assert_eq!(value["deadProducts"][0]["name"], "Google Reader");
        assert_eq!(value["deadProducts"][0]["dataLossRisk"], "low");
    }

    #[test]
    fn format_size_scales_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn timeline_places_deaths_between_locations() {
        let extraction = Extraction {
            points: vec![],
            account_created: Some(date_time(2012, 1, 1)),
        };
        let products = Catalog::builtin().products().to_vec();
        let rendered = Reporter::new().render_timeline(&extraction, &products);

        assert!(rendered.contains("Google Account Created"));
        assert!(rendered.contains("Present Day"));
        assert!(rendered.contains("💀 Google Reader"));
        // Wave died in April 2012, after this account's creation.
        assert!(rendered.contains("Google Wave"));
    }
}
