//! Rack product families.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Top-level rack product category; each family owns its own axis set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RackFamily {
    LightDuty,
    HeavyDuty,
    Pallet,
    PalletSteelDeck,
    HighRack,
    Stainless,
}

impl RackFamily {
    /// Canonical presentation order.
    pub const ALL: [RackFamily; 6] = [
        RackFamily::LightDuty,
        RackFamily::HeavyDuty,
        RackFamily::Pallet,
        RackFamily::PalletSteelDeck,
        RackFamily::HighRack,
        RackFamily::Stainless,
    ];

    /// Stable machine token (also the serialized form).
    pub fn slug(self) -> &'static str {
        match self {
            RackFamily::LightDuty => "light-duty",
            RackFamily::HeavyDuty => "heavy-duty",
            RackFamily::Pallet => "pallet",
            RackFamily::PalletSteelDeck => "pallet-steel-deck",
            RackFamily::HighRack => "high-rack",
            RackFamily::Stainless => "stainless",
        }
    }

    /// Human-facing label; also used as the specification of family-scoped
    /// hardware such as safety pins.
    pub fn label(self) -> &'static str {
        match self {
            RackFamily::LightDuty => "Light-duty",
            RackFamily::HeavyDuty => "Heavy-duty",
            RackFamily::Pallet => "Pallet",
            RackFamily::PalletSteelDeck => "Pallet steel-deck",
            RackFamily::HighRack => "High-rack",
            RackFamily::Stainless => "Stainless",
        }
    }

    /// Families configured through size → height → level → form type.
    pub fn has_form_type_axis(self) -> bool {
        matches!(
            self,
            RackFamily::LightDuty
                | RackFamily::HeavyDuty
                | RackFamily::Pallet
                | RackFamily::PalletSteelDeck
        )
    }

    /// Pallet and its steel-deck variant share parts and merge in aggregates.
    pub fn is_pallet(self) -> bool {
        matches!(self, RackFamily::Pallet | RackFamily::PalletSteelDeck)
    }
}

impl core::fmt::Display for RackFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for RackFamily {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RackFamily::ALL
            .into_iter()
            .find(|f| f.slug().eq_ignore_ascii_case(wanted) || f.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::invalid_id(format!("RackFamily: unknown family '{s}'")))
    }
}
