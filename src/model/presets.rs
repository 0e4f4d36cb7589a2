//! Well-known services with their usual plans, offered when adding a subscription and used to seed
//! an empty on-device store.

use crate::model::{BillingCycle, Cents, NewSubscription};

/// A plan of a `ServicePreset`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Plan {
    pub name: &'static str,
    pub amount_cents: Cents,
    pub billing_cycle: BillingCycle,
}

/// A known service and its plans.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ServicePreset {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub plans: &'static [Plan],
}

impl ServicePreset {
    /// The payload for a subscription to `plan`, starting on `start_date`.
    pub fn subscription(&self, plan: &Plan, start_date: &str) -> NewSubscription {
        NewSubscription {
            name: plan.name.to_string(),
            category: self.category.to_string(),
            amount_cents: plan.amount_cents,
            billing_cycle: plan.billing_cycle,
            start_date: start_date.to_string(),
            notes: None,
            cancel_url: None,
        }
    }
}

const fn monthly(name: &'static str, cents: i64) -> Plan {
    Plan {
        name,
        amount_cents: Cents::new(cents),
        billing_cycle: BillingCycle::Monthly,
    }
}

const fn yearly(name: &'static str, cents: i64) -> Plan {
    Plan {
        name,
        amount_cents: Cents::new(cents),
        billing_cycle: BillingCycle::Yearly,
    }
}

pub const SERVICE_PRESETS: &[ServicePreset] = &[
    ServicePreset {
        id: "spotify",
        name: "Spotify",
        category: "Musik",
        icon: "spotify",
        color: "#1DB954",
        plans: &[
            monthly("Spotify Individual", 1099),
            monthly("Spotify Duo", 1499),
            monthly("Spotify Family", 1799),
            monthly("Spotify Student", 599),
        ],
    },
    ServicePreset {
        id: "netflix",
        name: "Netflix",
        category: "Streaming",
        icon: "netflix",
        color: "#E50914",
        plans: &[
            monthly("Netflix Basis", 799),
            monthly("Netflix Standard", 1299),
            monthly("Netflix Premium", 1799),
        ],
    },
    ServicePreset {
        id: "amazon-prime",
        name: "Amazon Prime",
        category: "Shopping",
        icon: "amazon",
        color: "#FF9900",
        plans: &[
            monthly("Amazon Prime", 999),
            yearly("Amazon Prime", 8990),
        ],
    },
    ServicePreset {
        id: "disney-plus",
        name: "Disney+",
        category: "Streaming",
        icon: "movie-star",
        color: "#113CCF",
        plans: &[
            monthly("Disney+ Standard", 899),
            monthly("Disney+ Premium", 1199),
        ],
    },
    ServicePreset {
        id: "youtube-premium",
        name: "YouTube Premium",
        category: "Streaming",
        icon: "youtube",
        color: "#FF0000",
        plans: &[
            monthly("YouTube Premium", 1199),
            monthly("YouTube Premium Family", 1799),
        ],
    },
    ServicePreset {
        id: "apple-music",
        name: "Apple Music",
        category: "Musik",
        icon: "apple",
        color: "#FC3C44",
        plans: &[
            monthly("Apple Music Individual", 1099),
            monthly("Apple Music Family", 1699),
            monthly("Apple Music Student", 599),
        ],
    },
    ServicePreset {
        id: "office-365",
        name: "Microsoft 365",
        category: "Software",
        icon: "microsoft",
        color: "#00A4EF",
        plans: &[
            monthly("Microsoft 365 Personal", 700),
            monthly("Microsoft 365 Family", 1000),
            yearly("Microsoft 365 Personal", 6900),
            yearly("Microsoft 365 Family", 9900),
        ],
    },
    ServicePreset {
        id: "icloud",
        name: "iCloud+",
        category: "Cloud",
        icon: "cloud",
        color: "#3693F3",
        plans: &[
            monthly("iCloud+ 50GB", 99),
            monthly("iCloud+ 200GB", 299),
            monthly("iCloud+ 2TB", 999),
        ],
    },
    ServicePreset {
        id: "gym",
        name: "Fitnessstudio",
        category: "Fitness",
        icon: "dumbbell",
        color: "#FF6B6B",
        plans: &[
            monthly("Fitnessstudio Basis", 1999),
            monthly("Fitnessstudio Premium", 3999),
        ],
    },
    ServicePreset {
        id: "mobile",
        name: "Mobilfunk",
        category: "Kommunikation",
        icon: "cellphone",
        color: "#9B59B6",
        plans: &[
            monthly("Mobilfunk Basis", 999),
            monthly("Mobilfunk Comfort", 1999),
            monthly("Mobilfunk Premium", 3999),
        ],
    },
];

pub const SUBSCRIPTION_CATEGORIES: &[&str] = &[
    "Streaming",
    "Musik",
    "Software",
    "Cloud",
    "Gaming",
    "News",
    "Fitness",
    "Shopping",
    "Kommunikation",
    "Sonstiges",
];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Wohnen",
    "Versicherung",
    "Kommunikation",
    "Mobilität",
    "Gesundheit",
    "Bildung",
    "Sonstiges",
];

/// Looks up a preset by its id, e.g. `amazon-prime`.
pub fn preset(id: &str) -> Option<&'static ServicePreset> {
    SERVICE_PRESETS.iter().find(|p| p.id == id)
}

/// One subscription per preset, using the first plan, all starting on `start_date`.
pub fn seed_subscriptions(start_date: &str) -> Vec<NewSubscription> {
    SERVICE_PRESETS
        .iter()
        .filter_map(|p| p.plans.first().map(|plan| p.subscription(plan, start_date)))
        .collect()
}
