//! Part names, synonyms and part-kind classification.

use core::fmt::Display;

use rackquote_core::RackFamily;

/// Legacy part that must never appear in a BOM.
pub const EXCLUDED_PART: &str = "Base Bolt";

pub const HORIZONTAL_BRACE: &str = "Horizontal Brace";
pub const DIAGONAL_BRACE: &str = "Diagonal Brace";
pub const ANCHOR_BOLT: &str = "Anchor Bolt";
pub const BRACING_BOLT: &str = "Bracing Bolt";
pub const BRACING_RUBBER: &str = "Bracing Rubber";
pub const PALLET_SAFETY_PIN_SPEC: &str = "Safety Pin";

/// Alternate spellings of the same physical part: (variant, canonical).
const SYNONYMS: [(&str, &str); 7] = [
    ("Diagonal Bracing", DIAGONAL_BRACE),
    ("Horizontal Bracing", HORIZONTAL_BRACE),
    ("Bracing Bushing", BRACING_RUBBER),
    ("Rubber Bushing", BRACING_RUBBER),
    ("Upright", "Post"),
    ("Safety Lock Pin", "Safety Pin"),
    ("Deck Panel", "Shelf"),
];

/// Canonical spelling of `name` (synonyms replaced, whitespace collapsed).
pub fn canonical_name(name: &str) -> String {
    let mut out = name.split_whitespace().collect::<Vec<_>>().join(" ");
    for (variant, canonical) in SYNONYMS {
        if out.contains(variant) {
            out = out.replace(variant, canonical);
        }
    }
    out
}

pub fn is_excluded(name: &str) -> bool {
    canonical_name(name).eq_ignore_ascii_case(EXCLUDED_PART)
}

/// Physical role of a part, read from its (canonical) name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PartKind {
    Post,
    LoadBeam,
    TieBeam,
    CrossBar,
    Shelf,
    TopPad,
    BottomPad,
    SafetySeat,
    SafetyPin,
    HorizontalBrace,
    DiagonalBrace,
    AnchorBolt,
    BracingBolt,
    BracingRubber,
    SteelPlate,
    Other,
}

const KIND_NEEDLES: [(&str, PartKind); 17] = [
    ("anchor bolt", PartKind::AnchorBolt),
    ("bracing bolt", PartKind::BracingBolt),
    ("bracing rubber", PartKind::BracingRubber),
    ("horizontal brace", PartKind::HorizontalBrace),
    ("diagonal brace", PartKind::DiagonalBrace),
    ("load beam", PartKind::LoadBeam),
    ("tie beam", PartKind::TieBeam),
    ("cross bar", PartKind::CrossBar),
    ("top pad", PartKind::TopPad),
    ("bottom pad", PartKind::BottomPad),
    ("safety seat", PartKind::SafetySeat),
    ("safety pin", PartKind::SafetyPin),
    ("steel plate", PartKind::SteelPlate),
    ("post", PartKind::Post),
    ("shelf", PartKind::Shelf),
    ("deck", PartKind::Shelf),
    ("panel", PartKind::Shelf),
];

impl PartKind {
    pub fn classify(name: &str) -> Self {
        let lowered = canonical_name(name).to_lowercase();
        KIND_NEEDLES
            .iter()
            .find(|(needle, _)| lowered.contains(needle))
            .map(|(_, kind)| *kind)
            .unwrap_or(PartKind::Other)
    }

    /// Hardware whose specification is always blank.
    pub fn is_unspecified_hardware(self) -> bool {
        matches!(
            self,
            PartKind::AnchorBolt | PartKind::BracingBolt | PartKind::BracingRubber
        )
    }

    pub fn is_bracing(self) -> bool {
        matches!(
            self,
            PartKind::HorizontalBrace
                | PartKind::DiagonalBrace
                | PartKind::AnchorBolt
                | PartKind::BracingBolt
                | PartKind::BracingRubber
        )
    }
}

/// Token between the first pair of parentheses (`Post(H4500)` → `H4500`).
pub fn paren_token(name: &str) -> Option<&str> {
    let open = name.find('(')?;
    let close = name[open + 1..].find(')')? + open + 1;
    Some(name[open + 1..close].trim()).filter(|t| !t.is_empty())
}

pub fn post(height: impl Display) -> String {
    format!("Post({height})")
}

pub fn load_beam(width: impl Display) -> String {
    format!("Load Beam({width})")
}

pub fn tie_beam(depth: impl Display) -> String {
    format!("Tie Beam({depth})")
}

pub fn shelf(width: impl Display) -> String {
    format!("Shelf({width})")
}

pub fn cross_bar(width: impl Display) -> String {
    format!("Cross Bar({width})")
}

pub fn top_pad(depth: impl Display) -> String {
    format!("Top Pad({depth})")
}

pub fn bottom_pad(depth: impl Display) -> String {
    format!("Bottom Pad({depth})")
}

/// Pallet families share one safety pin; other families name their own.
pub fn safety_pin(family: RackFamily) -> String {
    if family.is_pallet() {
        "Safety Pin(pallet)".to_string()
    } else {
        format!("Safety Pin({})", family.label())
    }
}

pub fn safety_seat(family: RackFamily) -> String {
    format!("Safety Seat({})", family.label())
}

/// Whether a safety pin/seat name already names the pallet variant.
pub fn names_pallet_variant(name: &str) -> bool {
    name.to_lowercase().contains("pallet")
}
