use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Service,
    App,
    Hardware,
}

/// One discontinued (or discontinued-adjacent) product. `date_close` of
/// `None` means the product is still running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub slug: String,
    pub date_open: NaiveDate,
    pub date_close: Option<NaiveDate>,
    pub description: String,
    pub kind: ProductKind,
    /// Folder name this product uses inside a Takeout export, when one exists.
    pub takeout_folder: Option<String>,
    pub takeout_available: bool,
    pub avg_migration_hours: f64,
    pub data_loss_risk: RiskTier,
    pub alternatives: Vec<String>,
}

impl ProductRecord {
    pub fn is_dead(&self) -> bool {
        self.date_close.is_some()
    }

    /// Days between launch and shutdown, or `None` while still alive.
    pub fn lifespan_days(&self) -> Option<i64> {
        self.date_close.map(|close| (close - self.date_open).num_days())
    }
}

/// The product graveyard plus the list of products known to still be running.
///
/// Plain immutable data, built once and passed explicitly into the scanner
/// and the correlation engine.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<ProductRecord>,
    alive_products: Vec<String>,
}

impl Catalog {
    pub fn new(products: Vec<ProductRecord>, alive_products: Vec<String>) -> Self {
        Self {
            products,
            alive_products,
        }
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn by_slug(&self, slug: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// Match a Takeout folder name against the catalog, case-insensitively,
    /// on either the product's Takeout folder name or its display name.
    /// When a name matches several records, a record with a close date wins.
    pub fn match_folder(&self, folder: &str) -> Option<&ProductRecord> {
        let matches = |p: &&ProductRecord| {
            p.takeout_folder
                .as_deref()
                .is_some_and(|f| f.eq_ignore_ascii_case(folder))
                || p.name.eq_ignore_ascii_case(folder)
        };
        self.products
            .iter()
            .find(|p| matches(p) && p.is_dead())
            .or_else(|| self.products.iter().find(matches))
    }

    /// Whether a folder name contains the name of a known still-alive product.
    pub fn is_alive_product(&self, folder: &str) -> bool {
        let folder = folder.to_lowercase();
        self.alive_products
            .iter()
            .any(|p| folder.contains(&p.to_lowercase()))
    }

    pub fn killed_in_year(&self, year: i32) -> Vec<&ProductRecord> {
        use chrono::Datelike;
        self.products
            .iter()
            .filter(|p| p.date_close.is_some_and(|d| d.year() == year))
            .collect()
    }

    /// The built-in graveyard: curated from killedbygoogle.com plus manual
    /// migration-cost estimates.
    pub fn builtin() -> Self {
        Self::new(builtin_products(), builtin_alive_products())
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid catalog date")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_alive_products() -> Vec<String> {
    strings(&[
        "Gmail", "Mail", "Drive", "Photos", "YouTube", "Maps", "Chrome", "Calendar", "Contacts",
        "Keep", "Tasks", "Fit", "Home", "Timeline", "Voice", "Blogger", "Groups", "Meet", "Chat",
        "Docs", "Sheets", "Slides", "Forms", "Sites", "Classroom",
    ])
}

fn builtin_products() -> Vec<ProductRecord> {
    vec![
        ProductRecord {
            name: "Google Reader".into(),
            slug: "google-reader".into(),
            date_open: ymd(2005, 10, 7),
            date_close: Some(ymd(2013, 7, 1)),
            description: "RSS feed aggregator".into(),
            kind: ProductKind::Service,
            takeout_folder: Some("Reader".into()),
            takeout_available: true,
            avg_migration_hours: 3.0,
            data_loss_risk: RiskTier::Low,
            alternatives: strings(&["Feedly", "Inoreader", "NewsBlur"]),
        },
        ProductRecord {
            name: "Google+".into(),
            slug: "google-plus".into(),
            date_open: ymd(2011, 6, 28),
            date_close: Some(ymd(2019, 4, 2)),
            description: "Social network with circles".into(),
            kind: ProductKind::Service,
            takeout_folder: Some("Google+ Stream".into()),
            takeout_available: true,
            avg_migration_hours: 4.0,
            data_loss_risk: RiskTier::High,
            alternatives: strings(&["Facebook", "Twitter"]),
        },
        ProductRecord {
            name: "Inbox by Gmail".into(),
            slug: "inbox-by-gmail".into(),
            date_open: ymd(2014, 10, 22),
            date_close: Some(ymd(2019, 4, 2)),
            description: "Smart email with bundles, snooze, and reminders".into(),
            kind: ProductKind::App,
            takeout_folder: Some("Inbox".into()),
            takeout_available: true,
            avg_migration_hours: 2.0,
            data_loss_risk: RiskTier::Low,
            alternatives: strings(&["Gmail", "Spark", "Superhuman"]),
        },
        ProductRecord {
            name: "Google Play Music".into(),
            slug: "google-play-music".into(),
            date_open: ymd(2011, 5, 10),
            date_close: Some(ymd(2020, 12, 4)),
            description: "Music streaming plus personal library uploads".into(),
            kind: ProductKind::Service,
            takeout_folder: Some("Google Play Music".into()),
            takeout_available: true,
            avg_migration_hours: 6.0,
            data_loss_risk: RiskTier::Medium,
            alternatives: strings(&["YouTube Music", "Spotify", "Apple Music"]),
        },
        ProductRecord {
            name: "Google Hangouts".into(),
            slug: "hangouts".into(),
            date_open: ymd(2013, 5, 15),
            date_close: Some(ymd(2022, 11, 1)),
            description: "Messaging and video calls".into(),
            kind: ProductKind::Service,
            takeout_folder: Some("Hangouts".into()),
            takeout_available: true,
            avg_migration_hours: 3.0,
            data_loss_risk: RiskTier::Medium,
            alternatives: strings(&["Google Chat", "Google Meet", "WhatsApp", "Signal"]),
        },
        ProductRecord {
            name: "Google Podcasts".into(),
            slug: "google-podcasts".into(),
            date_open: ymd(2018, 6, 18),
            date_close: Some(ymd(2024, 6, 23)),
            description: "Podcast subscriptions and listening progress".into(),
            kind: ProductKind::App,
            takeout_folder: Some("Google Podcasts".into()),
            takeout_available: true,
            avg_migration_hours: 1.0,
            data_loss_risk: RiskTier::Low,
            alternatives: strings(&["YouTube Music", "Pocket Casts", "Overcast"]),
        },
        ProductRecord {
            name: "Google Stadia".into(),
            slug: "stadia".into(),
            date_open: ymd(2019, 11, 19),
            date_close: Some(ymd(2023, 1, 18)),
            // Migration estimate is zero because purchases were refunded;
            // game saves are still gone, hence the high risk tier.
            description: "Cloud gaming platform".into(),
            kind: ProductKind::Service,
            takeout_folder: Some("Stadia".into()),
            takeout_available: true,
            avg_migration_hours: 0.0,
            data_loss_risk: RiskTier::High,
            alternatives: strings(&["Xbox Cloud Gaming", "GeForce NOW"]),
        },
        ProductRecord {
            name: "Google Notes on Search".into(),
            slug: "notes-on-search".into(),
            date_open: ymd(2023, 11, 1),
            date_close: Some(ymd(2024, 7, 31)),
            description: "Notes attached to search results (Labs experiment)".into(),
            kind: ProductKind::Service,
            takeout_folder: Some("Notes".into()),
            takeout_available: true,
            avg_migration_hours: 0.5,
            data_loss_risk: RiskTier::High,
            alternatives: strings(&[]),
        },
        ProductRecord {
            name: "Google Allo".into(),
            slug: "google-allo".into(),
            date_open: ymd(2016, 9, 21),
            date_close: Some(ymd(2019, 3, 13)),
            description: "Messaging app with Google Assistant built in".into(),
            kind: ProductKind::App,
            takeout_folder: Some("Google Allo".into()),
            takeout_available: true,
            avg_migration_hours: 2.0,
            data_loss_risk: RiskTier::High,
            alternatives: strings(&["Messages", "WhatsApp", "Signal"]),
        },
        ProductRecord {
            name: "Google Talk".into(),
            slug: "google-talk".into(),
            date_open: ymd(2005, 8, 24),
            date_close: Some(ymd(2017, 6, 26)),
            description: "XMPP-based chat".into(),
            kind: ProductKind::Service,
            takeout_folder: Some("Google Talk".into()),
            takeout_available: false,
            avg_migration_hours: 1.0,
            data_loss_risk: RiskTier::Medium,
            alternatives: strings(&["Signal"]),
        },
        ProductRecord {
            name: "Google Wave".into(),
            slug: "google-wave".into(),
            date_open: ymd(2009, 5, 27),
            date_close: Some(ymd(2012, 4, 30)),
            description: "Real-time collaborative documents".into(),
            kind: ProductKind::Service,
            takeout_folder: Some("Wave".into()),
            takeout_available: true,
            avg_migration_hours: 2.0,
            data_loss_risk: RiskTier::High,
            alternatives: strings(&["Google Docs", "Notion", "Slack"]),
        },
        ProductRecord {
            name: "Google Bookmarks".into(),
            slug: "google-bookmarks".into(),
            date_open: ymd(2005, 10, 10),
            date_close: Some(ymd(2021, 9, 30)),
            description: "Web bookmark syncing service".into(),
            kind: ProductKind::Service,
            takeout_folder: Some("Bookmarks".into()),
            takeout_available: true,
            avg_migration_hours: 1.0,
            data_loss_risk: RiskTier::Low,
            alternatives: strings(&["Chrome bookmarks", "Raindrop.io", "Pinboard"]),
        },
        ProductRecord {
            name: "Google Code".into(),
            slug: "google-code".into(),
            date_open: ymd(2006, 7, 27),
            date_close: Some(ymd(2016, 1, 25)),
            description: "Open-source project hosting".into(),
            kind: ProductKind::Service,
            takeout_folder: None,
            takeout_available: false,
            avg_migration_hours: 4.0,
            data_loss_risk: RiskTier::Medium,
            alternatives: strings(&["GitHub", "GitLab", "Bitbucket"]),
        },
        ProductRecord {
            name: "Picasa".into(),
            slug: "picasa".into(),
            date_open: ymd(2004, 7, 15),
            date_close: Some(ymd(2016, 5, 1)),
            description: "Photo organizing and editing".into(),
            kind: ProductKind::App,
            takeout_folder: Some("Picasa".into()),
            takeout_available: true,
            avg_migration_hours: 3.0,
            data_loss_risk: RiskTier::Low,
            alternatives: strings(&["Google Photos", "Adobe Lightroom"]),
        },
        ProductRecord {
            name: "Chromecast Audio".into(),
            slug: "chromecast-audio".into(),
            date_open: ymd(2015, 9, 29),
            date_close: Some(ymd(2019, 1, 11)),
            description: "Audio-only Chromecast".into(),
            kind: ProductKind::Hardware,
            takeout_folder: None,
            takeout_available: false,
            avg_migration_hours: 2.0,
            data_loss_risk: RiskTier::Low,
            alternatives: strings(&["Chromecast", "Sonos", "AirPlay"]),
        },
        ProductRecord {
            name: "Google Glass (Consumer)".into(),
            slug: "google-glass".into(),
            date_open: ymd(2013, 4, 15),
            date_close: Some(ymd(2015, 1, 19)),
            description: "Smart glasses".into(),
            kind: ProductKind::Hardware,
            takeout_folder: None,
            takeout_available: false,
            avg_migration_hours: 0.0,
            data_loss_risk: RiskTier::Low,
            alternatives: strings(&["Meta Ray-Ban"]),
        },
        ProductRecord {
            name: "Nest Secure".into(),
            slug: "nest-secure".into(),
            date_open: ymd(2017, 9, 20),
            date_close: Some(ymd(2024, 4, 8)),
            description: "Home security system".into(),
            kind: ProductKind::Hardware,
            takeout_folder: None,
            takeout_available: false,
            avg_migration_hours: 8.0,
            data_loss_risk: RiskTier::High,
            alternatives: strings(&["Ring", "SimpliSafe", "ADT"]),
        },
        ProductRecord {
            name: "YouTube Gaming".into(),
            slug: "youtube-gaming".into(),
            date_open: ymd(2015, 8, 26),
            date_close: Some(ymd(2019, 5, 30)),
            description: "Gaming-focused video platform".into(),
            kind: ProductKind::Service,
            takeout_folder: None,
            takeout_available: false,
            avg_migration_hours: 1.0,
            data_loss_risk: RiskTier::Low,
            alternatives: strings(&["YouTube", "Twitch"]),
        },
        ProductRecord {
            name: "Google Trips".into(),
            slug: "google-trips".into(),
            date_open: ymd(2016, 9, 19),
            date_close: Some(ymd(2019, 8, 5)),
            description: "Travel planning and itineraries".into(),
            kind: ProductKind::App,
            takeout_folder: Some("Trips".into()),
            takeout_available: true,
            avg_migration_hours: 1.0,
            data_loss_risk: RiskTier::Medium,
            alternatives: strings(&["Google Maps", "TripIt", "Wanderlog"]),
        },
        ProductRecord {
            name: "Google Domains".into(),
            slug: "google-domains".into(),
            date_open: ymd(2015, 1, 13),
            date_close: Some(ymd(2023, 9, 7)),
            description: "Domain registrar".into(),
            kind: ProductKind::Service,
            takeout_folder: None,
            takeout_available: false,
            avg_migration_hours: 2.0,
            data_loss_risk: RiskTier::Low,
            alternatives: strings(&["Squarespace Domains", "Cloudflare", "Namecheap"]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn slugs_are_unique() {
        let catalog = Catalog::builtin();
        let slugs: HashSet<_> = catalog.products().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs.len(), catalog.products().len());
    }

    #[test]
    fn match_folder_by_takeout_folder_name_is_case_insensitive() {
        let catalog = Catalog::builtin();
        let product = catalog.match_folder("reader").expect("Reader should match");
        assert_eq!(product.slug, "google-reader");
    }

    #[test]
    fn match_folder_by_display_name() {
        let catalog = Catalog::builtin();
        let product = catalog
            .match_folder("Google Reader")
            .expect("display name should match");
        assert_eq!(product.slug, "google-reader");
    }

    #[test]
    fn unmatched_folder_returns_none() {
        let catalog = Catalog::builtin();
        assert!(catalog.match_folder("Android Device Configuration").is_none());
    }

    #[test]
    fn alive_products_match_on_substring() {
        let catalog = Catalog::builtin();
        assert!(catalog.is_alive_product("Gmail"));
        assert!(catalog.is_alive_product("YouTube and YouTube Music"));
        assert!(!catalog.is_alive_product("Stadia"));
    }

    #[test]
    fn killed_in_year_filters_by_close_year() {
        let catalog = Catalog::builtin();
        let killed_2019 = catalog.killed_in_year(2019);
        assert!(killed_2019.iter().any(|p| p.slug == "google-plus"));
        assert!(killed_2019.iter().all(|p| {
            use chrono::Datelike;
            p.date_close.map(|d| d.year()) == Some(2019)
        }));
    }

    #[test]
    fn lifespan_is_positive_for_dead_products() {
        let catalog = Catalog::builtin();
        for product in catalog.products() {
            if let Some(days) = product.lifespan_days() {
                assert!(days > 0, "{} has a non-positive lifespan", product.name);
            }
        }
    }
}
