//! Fixed per-family option tables that extend what the catalog data offers.

use rackquote_core::RackFamily;

/// Axis values offered in addition to catalog keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtraOptions {
    pub sizes: &'static [&'static str],
    pub heights: &'static [&'static str],
    pub levels: &'static [&'static str],
}

pub fn extra_options(family: RackFamily) -> ExtraOptions {
    match family {
        RackFamily::Pallet => ExtraOptions {
            heights: &["H4500", "H5000", "H5500", "H6000"],
            ..ExtraOptions::default()
        },
        RackFamily::PalletSteelDeck => ExtraOptions {
            heights: &[
                "1500", "2000", "2500", "3000", "3500", "4000", "H4500", "H5000", "H5500", "H6000",
            ],
            sizes: &["2080x800", "2080x1000"],
            ..ExtraOptions::default()
        },
        RackFamily::HighRack => ExtraOptions {
            sizes: &["45x150"],
            levels: &["L5", "L6"],
            ..ExtraOptions::default()
        },
        RackFamily::Stainless => ExtraOptions {
            levels: &["L5", "L6"],
            heights: &["210"],
            ..ExtraOptions::default()
        },
        RackFamily::LightDuty => ExtraOptions {
            heights: &[SHORT_POST_HEIGHT],
            ..ExtraOptions::default()
        },
        RackFamily::HeavyDuty => ExtraOptions::default(),
    }
}

/// Default level range when the catalog has no level keys.
pub const FULL_LEVELS: [&str; 6] = ["L1", "L2", "L3", "L4", "L5", "L6"];

/// Levels every stainless configuration offers.
pub const COMMON_LEVELS: [&str; 5] = ["L2", "L3", "L4", "L5", "L6"];

/// High-rack heights are fixed (centimetres).
pub const HIGH_RACK_HEIGHTS: [&str; 3] = ["150", "200", "250"];

/// Light-duty short-post variant; priced and scoped through the H900 branch.
pub const SHORT_POST_HEIGHT: &str = "H750";
pub const SHORT_POST_CATALOG_HEIGHT: &str = "H900";

/// Narrow high-rack size withdrawn for the reinforced weight classes.
pub const NARROW_HIGH_RACK_SIZE: &str = "45x150";
pub const NARROW_SIZE_HIDDEN_FOR: [&str; 3] = ["450kg", "550kg", "700kg"];

/// Size always offered for the heaviest high-rack classes.
pub const HEAVY_EXTRA_SIZE: &str = "80x200";

/// Weight classes (display and raw data token) whose sizes are aliased.
pub const HEAVY_WEIGHT_CLASSES: [&str; 2] = ["550kg", "700kg"];

/// Heavy high-rack sizes: (catalog token, displayed token).
///
/// The heavy frames are catalogued by their outer dimension but sold by the
/// usable depth; both directions must stay lossless.
pub const HEAVY_SIZE_ALIASES: [(&str, &str); 2] = [("80x146", "80x108"), ("80x206", "80x150")];

pub fn is_heavy_weight_class(weight_token: &str) -> bool {
    let trimmed = weight_token.trim();
    HEAVY_WEIGHT_CLASSES.iter().any(|w| trimmed.ends_with(w))
}

/// Displayed size for a catalogued heavy size; other sizes pass through.
pub fn view_size_from_data(data_size: &str) -> &str {
    HEAVY_SIZE_ALIASES
        .iter()
        .find(|(data, _)| *data == data_size)
        .map(|(_, view)| *view)
        .unwrap_or(data_size)
}

/// Catalogued size for a displayed heavy size; other sizes pass through.
pub fn data_size_from_view(view_size: &str) -> &str {
    HEAVY_SIZE_ALIASES
        .iter()
        .find(|(_, view)| *view == view_size)
        .map(|(data, _)| *data)
        .unwrap_or(view_size)
}
