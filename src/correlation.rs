use crate::catalog::ProductRecord;
use crate::extractor::LocationPoint;
use crate::places;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_DAYS: i64 = 3;

/// One product shutdown correlated against the user's location history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathEvent {
    pub product: ProductRecord,
    /// Where the user most likely was around the shutdown, when the history
    /// covers that period. Carries a backfilled `place_name` if the engine
    /// had to derive one.
    pub location: Option<LocationPoint>,
    pub narrative: String,
    pub was_nearby: bool,
    /// Whole days between the matched location and the shutdown date.
    /// Always >= 0; exactly 0 only for a same-day match.
    pub proximity_days: i64,
}

/// Finds where the user was when a product died.
///
/// The heart of it is a density heuristic: within a +/- `window_days`
/// interval around the shutdown, points are grouped on a ~1.1 km rounded
/// coordinate grid and the busiest cell wins. A place the user kept coming
/// back to that week beats a single stray ping, which is what "where were
/// you" should mean. This is an approximation, not trajectory
/// reconstruction.
pub struct CorrelationEngine {
    window_days: i64,
}

impl CorrelationEngine {
    pub fn new(window_days: i64) -> Self {
        Self { window_days }
    }

    /// Correlate one product's shutdown with the location history.
    ///
    /// Returns `None` for a product that has no close date; a product that
    /// never died can never produce a death event. Deterministic: identical
    /// inputs always yield the identical event, narrative included.
    pub fn correlate(
        &self,
        product: &ProductRecord,
        locations: &[LocationPoint],
    ) -> Option<DeathEvent> {
        let close_date = product.date_close?;
        let start = close_date - Duration::days(self.window_days);
        let end = close_date + Duration::days(self.window_days);

        let Some((point, point_date)) = most_likely_location(locations, start, end) else {
            return Some(DeathEvent {
                product: product.clone(),
                location: None,
                narrative: format!(
                    "{} was killed on {}, but no location data is available for that period.",
                    product.name, close_date
                ),
                was_nearby: false,
                proximity_days: 0,
            });
        };

        let mut matched = point.clone();
        let place_name = match matched.place_name.clone() {
            Some(name) => name,
            None => {
                // Cache the derived name on the matched copy; the original
                // point stays untouched.
                let derived = places::identify(matched.latitude, matched.longitude).name;
                matched.place_name = Some(derived.clone());
                derived
            }
        };

        let proximity_days = (point_date - close_date).num_days().abs();
        let narrative = if proximity_days == 0 {
            format!(
                "You were in {place_name} the exact day {} was killed ({close_date}).",
                product.name
            )
        } else {
            format!(
                "You were in {place_name} when {} was killed on {close_date} ({proximity_days} days apart).",
                product.name
            )
        };

        Some(DeathEvent {
            product: product.clone(),
            location: Some(matched),
            narrative,
            was_nearby: proximity_days <= self.window_days,
            proximity_days,
        })
    }

    /// Correlate every dead product and keep the events the history could
    /// place, sorted ascending by shutdown date. Total and deterministic:
    /// the same inputs always produce the same ordered output.
    pub fn build_timeline(
        &self,
        products: &[ProductRecord],
        locations: &[LocationPoint],
    ) -> Vec<DeathEvent> {
        let mut events: Vec<DeathEvent> = products
            .iter()
            .filter_map(|p| self.correlate(p, locations))
            .filter(|e| e.location.is_some())
            .collect();
        events.sort_by_key(|e| e.product.date_close);
        events
    }
}

impl Default for CorrelationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS)
    }
}

/// Pick the most representative point inside the closed day interval
/// `[start, end]`.
///
/// Points are grouped by their rounded-coordinate grid cell. The group with
/// the most members wins; on a tie the group encountered first in filtered
/// order wins, and the group's first point is the representative. Only
/// timestamped points participate.
fn most_likely_location(
    locations: &[LocationPoint],
    start: NaiveDate,
    end: NaiveDate,
) -> Option<(&LocationPoint, NaiveDate)> {
    let candidates: Vec<(&LocationPoint, NaiveDate)> = locations
        .iter()
        .filter_map(|p| p.timestamp.map(|ts| (p, ts.date_naive())))
        .filter(|(_, day)| (start..=end).contains(day))
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let mut clusters: Vec<((i64, i64), Vec<usize>)> = Vec::new();
    for (index, (point, _)) in candidates.iter().enumerate() {
        let key = grid_key(point.latitude, point.longitude);
        match clusters.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(index),
            None => clusters.push((key, vec![index])),
        }
    }

    // Strict comparison keeps the first-encountered group on ties.
    let mut winner = &clusters[0].1;
    for (_, members) in &clusters[1..] {
        if members.len() > winner.len() {
            winner = members;
        }
    }

    candidates.get(winner[0]).copied()
}

/// ~1.1 km grid: two decimal places of latitude/longitude.
fn grid_key(latitude: f64, longitude: f64) -> (i64, i64) {
    (
        (latitude * 100.0).round() as i64,
        (longitude * 100.0).round() as i64,
    )
}
