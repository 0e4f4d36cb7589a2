//! Icon identifiers for subscriptions and expense categories.
//!
//! Labels are matched against a fixed set of known services and categories. Anything that is not
//! recognized maps to a default icon.

use serde::{Deserialize, Serialize};

/// A well-known subscription service.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Netflix,
    Spotify,
    Amazon,
    Disney,
    YouTube,
    Apple,
    Microsoft,
    ICloud,
}

impl Service {
    pub const ALL: [Service; 8] = [
        Service::Netflix,
        Service::Spotify,
        Service::Amazon,
        Service::Disney,
        Service::YouTube,
        Service::Apple,
        Service::Microsoft,
        Service::ICloud,
    ];

    /// The icon shown for subscriptions that are not a known service.
    pub const DEFAULT_ICON: &'static str = "credit-card";

    /// Recognizes a service from a subscription name, e.g. "Netflix Premium" -> `Netflix`.
    /// Matching is case-insensitive. The first service in `ALL` whose keywords appear wins.
    pub fn detect(name: &str) -> Option<Service> {
        let lower = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|service| service.keywords().iter().any(|k| lower.contains(k)))
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Service::Netflix => "netflix",
            Service::Spotify => "spotify",
            Service::Amazon => "amazon",
            Service::Disney => "movie-star",
            Service::YouTube => "youtube",
            Service::Apple => "apple",
            Service::Microsoft => "microsoft",
            Service::ICloud => "cloud",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Service::Netflix => &["netflix"],
            Service::Spotify => &["spotify"],
            Service::Amazon => &["amazon"],
            Service::Disney => &["disney"],
            Service::YouTube => &["youtube"],
            Service::Apple => &["apple"],
            Service::Microsoft => &["microsoft", "office"],
            Service::ICloud => &["icloud", "cloud"],
        }
    }
}

/// The icon for a subscription name.
pub fn service_icon(name: &str) -> &'static str {
    Service::detect(name)
        .map(|s| s.icon())
        .unwrap_or(Service::DEFAULT_ICON)
}

/// The fixed set of expense categories offered by the app.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Wohnen,
    Versicherung,
    Kommunikation,
    #[serde(rename = "Mobilität")]
    Mobilitaet,
    Gesundheit,
    Bildung,
    Sonstiges,
}

serde_plain::derive_display_from_serialize!(ExpenseCategory);
serde_plain::derive_fromstr_from_deserialize!(ExpenseCategory);

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Wohnen,
        ExpenseCategory::Versicherung,
        ExpenseCategory::Kommunikation,
        ExpenseCategory::Mobilitaet,
        ExpenseCategory::Gesundheit,
        ExpenseCategory::Bildung,
        ExpenseCategory::Sonstiges,
    ];

    pub const DEFAULT_ICON: &'static str = "wallet";

    pub fn icon(&self) -> &'static str {
        match self {
            ExpenseCategory::Wohnen => "home",
            ExpenseCategory::Versicherung => "shield-check",
            ExpenseCategory::Kommunikation => "phone",
            ExpenseCategory::Mobilitaet => "car",
            ExpenseCategory::Gesundheit => "heart-pulse",
            ExpenseCategory::Bildung => "school",
            ExpenseCategory::Sonstiges => Self::DEFAULT_ICON,
        }
    }
}

/// The icon for an expense category label. Unknown labels get the default icon.
pub fn category_icon(label: &str) -> &'static str {
    label
        .parse::<ExpenseCategory>()
        .map(|c| c.icon())
        .unwrap_or(ExpenseCategory::DEFAULT_ICON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_icons() {
        assert_eq!(service_icon("Netflix"), "netflix");
        assert_eq!(service_icon("Disney+ Premium"), "movie-star");
        assert_eq!(service_icon("Office 365"), "microsoft");
        assert_eq!(service_icon("iCloud+ 2TB"), "cloud");
        assert_eq!(service_icon("Apple Music"), "apple");
        assert_eq!(service_icon("Fitnessstudio"), "credit-card");
        assert_eq!(service_icon(""), "credit-card");
    }

    #[test]
    fn test_category_icons() {
        assert_eq!(category_icon("Wohnen"), "home");
        assert_eq!(category_icon("Mobilität"), "car");
        assert_eq!(category_icon("Sonstiges"), "wallet");
        assert_eq!(category_icon("Urlaub"), "wallet");
    }

    #[test]
    fn test_category_round_trip() {
        for category in ExpenseCategory::ALL {
            let label = category.to_string();
            assert_eq!(label.parse::<ExpenseCategory>().unwrap(), category);
        }
        assert_eq!(ExpenseCategory::Mobilitaet.to_string(), "Mobilität");
    }
}
