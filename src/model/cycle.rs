use serde::{Deserialize, Serialize};

/// How often a subscription or expense is charged.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

serde_plain::derive_display_from_serialize!(BillingCycle);
serde_plain::derive_fromstr_from_deserialize!(BillingCycle);

impl BillingCycle {
    /// The German label shown next to an amount, e.g. "monatlich".
    pub fn label(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monatlich",
            BillingCycle::Yearly => "jährlich",
        }
    }

    /// The short German suffix shown after an amount, e.g. "/Monat".
    pub fn short_label(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "/Monat",
            BillingCycle::Yearly => "/Jahr",
        }
    }

    /// The number of months between two charges.
    pub fn months(&self) -> u32 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Yearly => 12,
        }
    }
}

#[test]
fn billing_cycle_wire_format() {
    assert_eq!(BillingCycle::Monthly.to_string(), "MONTHLY");
    assert_eq!("YEARLY".parse::<BillingCycle>().unwrap(), BillingCycle::Yearly);
    assert!("yearly".parse::<BillingCycle>().is_err());
    assert_eq!(
        serde_json::to_string(&BillingCycle::Yearly).unwrap(),
        "\"YEARLY\""
    );
}

#[test]
fn billing_cycle_labels() {
    assert_eq!(BillingCycle::Monthly.label(), "monatlich");
    assert_eq!(BillingCycle::Yearly.short_label(), "/Jahr");
    assert_eq!(BillingCycle::Yearly.months(), 12);
}
