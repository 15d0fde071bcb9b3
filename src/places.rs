/// Coarse coordinate-to-place identification.
///
/// A handful of fixed bounding boxes, not real geocoding. Good enough to
/// label a narrative when the export carries no place name of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub emoji: &'static str,
}

pub fn identify(lat: f64, lng: f64) -> Place {
    let known: Option<(&str, &str)> = if (15.0..17.0).contains(&lat) && (107.0..109.0).contains(&lng) {
        Some(("Da Nang, Vietnam", "🇻🇳"))
    } else if (1.2..1.5).contains(&lat) && (103.6..104.0).contains(&lng) {
        Some(("Singapore", "🇸🇬"))
    } else if (12.5..13.5).contains(&lat) && (77.0..78.0).contains(&lng) {
        Some(("Bangalore, India", "🇮🇳"))
    } else if (22.0..23.0).contains(&lat) && (75.0..76.5).contains(&lng) {
        Some(("Indore, India", "🇮🇳"))
    } else if (15.0..16.0).contains(&lat) && (73.0..74.5).contains(&lng) {
        Some(("Goa, India", "🇮🇳"))
    } else if (8.0..12.0).contains(&lat) && (75.0..77.0).contains(&lng) {
        Some(("Kerala, India", "🇮🇳"))
    } else if (10.0..11.5).contains(&lat) && (78.0..80.0).contains(&lng) {
        Some(("Tamil Nadu, India", "🇮🇳"))
    } else if (28.0..29.0).contains(&lat) && (76.5..77.5).contains(&lng) {
        Some(("Delhi NCR, India", "🇮🇳"))
    } else {
        None
    };

    match known {
        Some((name, emoji)) => Place {
            name: name.to_string(),
            emoji,
        },
        None => Place {
            name: format!("Location ({lat:.2}, {lng:.2})"),
            emoji: "📍",
        },
    }
}
