use crate::places;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A single normalized location sample, regardless of which export file it
/// came from. Immutable once produced; the correlation engine only ever
/// backfills `place_name` as a derived-value cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub place_name: Option<String>,
    pub address: Option<String>,
    pub accuracy: Option<f64>,
}

impl LocationPoint {
    /// The name this point resolves to for display and deduplication:
    /// the explicit place name when present, the bounding-box label otherwise.
    pub fn derived_name(&self) -> String {
        self.place_name
            .clone()
            .unwrap_or_else(|| places::identify(self.latitude, self.longitude).name)
    }
}

/// Everything the extractor pulled out of one Takeout export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Sorted ascending by timestamp; untimestamped points follow all
    /// timestamped ones in their original relative order.
    pub points: Vec<LocationPoint>,
    /// Account creation time from Timeline settings, when present. Used by
    /// callers to bound which product deaths are in scope.
    pub account_created: Option<DateTime<Utc>>,
}

pub struct TakeoutExtractor;

impl TakeoutExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Merge every location sub-source found under `root`. Each source is
    /// optional and individually fault-tolerant: a missing folder contributes
    /// nothing and a malformed file is skipped, never fatal.
    pub fn extract(&self, root: &Path) -> Extraction {
        let mut points = self.parse_semantic_history(root);
        points.extend(self.parse_labelled_places(root));

        let commute = self.parse_commute_routes(root, &points);
        points.extend(commute);

        sort_by_time(&mut points);

        Extraction {
            points,
            account_created: self.parse_account_settings(root),
        }
    }

    /// Semantic visit history: `Location History/Semantic Location History/*.json`.
    /// The only timestamped source. Coordinates arrive as E7 fixed-point integers.
    pub fn parse_semantic_history(&self, root: &Path) -> Vec<LocationPoint> {
        let history_dir = root
            .join("Location History")
            .join("Semantic Location History");

        let mut points = Vec::new();
        let Ok(entries) = fs::read_dir(&history_dir) else {
            return points;
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(file) = read_json::<SemanticHistoryFile>(&path) else {
                continue;
            };

            for object in file.timeline_objects {
                let Some(visit) = object.place_visit else {
                    continue;
                };
                let Some(location) = visit.location else {
                    continue;
                };
                let (Some(lat_e7), Some(lng_e7)) = (location.latitude_e7, location.longitude_e7)
                else {
                    continue;
                };
                let latitude = lat_e7 as f64 / 1e7;
                let longitude = lng_e7 as f64 / 1e7;
                if !in_wgs84_range(latitude, longitude) {
                    continue;
                }

                let place_name = location.name.clone().or_else(|| {
                    location
                        .address
                        .as_deref()
                        .and_then(|a| a.split(',').next())
                        .map(|s| s.trim().to_string())
                });
                let timestamp = visit
                    .duration
                    .and_then(|d| d.start_timestamp)
                    .and_then(|ts| parse_timestamp(&ts));

                points.push(LocationPoint {
                    latitude,
                    longitude,
                    timestamp,
                    place_name,
                    address: location.address,
                    accuracy: None,
                });
            }
        }

        sort_by_time(&mut points);
        points
    }

    /// Labelled places: `Maps/My labelled places/Labelled places.json` (GeoJSON).
    /// Named points without timestamps. A (0, 0) coordinate pair is the
    /// export's placeholder for "no location recorded" and is dropped.
    pub fn parse_labelled_places(&self, root: &Path) -> Vec<LocationPoint> {
        let path = root
            .join("Maps")
            .join("My labelled places")
            .join("Labelled places.json");

        let mut points = Vec::new();
        let Some(file) = read_json::<LabelledPlacesFile>(&path) else {
            return points;
        };

        for feature in file.features {
            let Some(geometry) = feature.geometry else {
                continue;
            };
            // GeoJSON order: [longitude, latitude, ...optional altitude].
            let (Some(&longitude), Some(&latitude)) =
                (geometry.coordinates.first(), geometry.coordinates.get(1))
            else {
                continue;
            };
            if latitude == 0.0 && longitude == 0.0 {
                continue;
            }
            if !in_wgs84_range(latitude, longitude) {
                continue;
            }

            let properties = feature.properties.unwrap_or_default();
            points.push(LocationPoint {
                latitude,
                longitude,
                timestamp: None,
                place_name: properties.name,
                address: properties.address,
                accuracy: None,
            });
        }
        points
    }

    /// Commute routes: `Maps/Commute routes/Commute routes.json`. Bare
    /// coordinates, no names, no timestamps. A point whose derived location
    /// identity already appears among `existing` (or earlier in the same
    /// file) is suppressed.
    pub fn parse_commute_routes(
        &self,
        root: &Path,
        existing: &[LocationPoint],
    ) -> Vec<LocationPoint> {
        let path = root
            .join("Maps")
            .join("Commute routes")
            .join("Commute routes.json");

        let mut points = Vec::new();
        let Some(file) = read_json::<CommuteRoutesFile>(&path) else {
            return points;
        };

        let mut seen: HashSet<String> = existing.iter().map(|p| p.derived_name()).collect();

        for trip in file.trips {
            for visit in trip.place_visit {
                let Some(lat_lng) = visit.place.and_then(|p| p.lat_lng) else {
                    continue;
                };
                if !in_wgs84_range(lat_lng.latitude, lat_lng.longitude) {
                    continue;
                }
                let identity = places::identify(lat_lng.latitude, lat_lng.longitude).name;
                if !seen.insert(identity) {
                    continue;
                }
                points.push(LocationPoint {
                    latitude: lat_lng.latitude,
                    longitude: lat_lng.longitude,
                    timestamp: None,
                    place_name: None,
                    address: None,
                    accuracy: None,
                });
            }
        }
        points
    }

    /// Account settings: `Timeline/Settings.json`, for the account creation time.
    pub fn parse_account_settings(&self, root: &Path) -> Option<DateTime<Utc>> {
        let path = root.join("Timeline").join("Settings.json");
        read_json::<TimelineSettingsFile>(&path)
            .and_then(|s| s.created_time)
            .and_then(|ts| parse_timestamp(&ts))
    }
}

impl Default for TakeoutExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable sort ascending by timestamp; untimestamped points keep their
/// relative order after all timestamped ones.
fn sort_by_time(points: &mut [LocationPoint]) {
    points.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn in_wgs84_range(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Read and deserialize a JSON file, treating every failure (missing,
/// unreadable, malformed) as an empty contribution.
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

// ── Takeout JSON schemas (only the fields we consume) ────────────────────────

#[derive(Deserialize)]
struct SemanticHistoryFile {
    #[serde(default, rename = "timelineObjects")]
    timeline_objects: Vec<TimelineObject>,
}

#[derive(Deserialize)]
struct TimelineObject {
    #[serde(rename = "placeVisit")]
    place_visit: Option<PlaceVisit>,
}

#[derive(Deserialize)]
struct PlaceVisit {
    location: Option<VisitLocation>,
    duration: Option<VisitDuration>,
}

#[derive(Deserialize)]
struct VisitLocation {
    #[serde(rename = "latitudeE7")]
    latitude_e7: Option<i64>,
    #[serde(rename = "longitudeE7")]
    longitude_e7: Option<i64>,
    name: Option<String>,
    address: Option<String>,
}

#[derive(Deserialize)]
struct VisitDuration {
    #[serde(rename = "startTimestamp")]
    start_timestamp: Option<String>,
}

#[derive(Deserialize)]
struct LabelledPlacesFile {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    properties: Option<FeatureProperties>,
}

#[derive(Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Default, Deserialize)]
struct FeatureProperties {
    name: Option<String>,
    address: Option<String>,
}

#[derive(Deserialize)]
struct CommuteRoutesFile {
    #[serde(default)]
    trips: Vec<Trip>,
}

#[derive(Deserialize)]
struct Trip {
    #[serde(default)]
    place_visit: Vec<CommuteVisit>,
}

#[derive(Deserialize)]
struct CommuteVisit {
    place: Option<CommutePlace>,
}

#[derive(Deserialize)]
struct CommutePlace {
    lat_lng: Option<LatLng>,
}

#[derive(Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct TimelineSettingsFile {
    #[serde(rename = "createdTime")]
    created_time: Option<String>,
}
