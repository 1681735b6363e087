//! Specification completion for BOM lines.
//!
//! Lines leave the deriver with a canonical specification so that the same
//! physical part always derives the same [`PartId`](rackquote_core::PartId).
//! Completion only fills blanks; running it twice changes nothing.

use rackquote_catalog::axis::parse_size;
use rackquote_core::RackFamily;
use rackquote_core::amount::first_integer;

use crate::line::BomLine;
use crate::naming::{PALLET_SAFETY_PIN_SPEC, PartKind, names_pallet_variant, paren_token};

fn with_weight(base: String, weight: Option<&str>) -> String {
    match weight {
        Some(w) if !base.contains(w) => format!("{base} {w}"),
        _ => base,
    }
}

pub fn height_spec(height: &str, weight: Option<&str>) -> String {
    with_weight(format!("Height {height}"), weight)
}

pub fn size_spec(size: &str, weight: Option<&str>) -> String {
    with_weight(format!("Size {size}"), weight)
}

/// Bare numeric token used by beams (`2080`, `60 550kg`).
pub fn numeric_spec(value: impl core::fmt::Display, weight: Option<&str>) -> String {
    with_weight(value.to_string(), weight)
}

pub fn depth_spec(depth: impl core::fmt::Display) -> String {
    format!("D{depth}")
}

pub fn width_spec(width: impl core::fmt::Display) -> String {
    format!("W{width}")
}

fn depth_of(line: &BomLine) -> Option<u64> {
    line.size
        .as_deref()
        .and_then(parse_size)
        .map(|s| s.depth)
        .or_else(|| first_integer(&line.name))
}

fn blank_spec(line: &BomLine, kind: PartKind, weight: Option<&str>) -> String {
    let family = line.family;
    match kind {
        PartKind::SafetySeat | PartKind::SafetyPin
            if family != RackFamily::HighRack && !names_pallet_variant(&line.name) =>
        {
            family.label().to_string()
        }
        PartKind::SafetyPin if names_pallet_variant(&line.name) => PALLET_SAFETY_PIN_SPEC.to_string(),
        PartKind::HorizontalBrace | PartKind::DiagonalBrace => {
            depth_of(line).map(|d| d.to_string()).unwrap_or_default()
        }
        PartKind::Post => match paren_token(&line.name) {
            Some(height) => height_spec(height, weight),
            None => String::new(),
        },
        PartKind::LoadBeam | PartKind::TieBeam => match first_integer(&line.name) {
            Some(n) => numeric_spec(n, weight),
            None => String::new(),
        },
        PartKind::TopPad | PartKind::BottomPad => {
            depth_of(line).map(depth_spec).unwrap_or_default()
        }
        PartKind::CrossBar => line
            .size
            .as_deref()
            .and_then(parse_size)
            .map(|s| width_spec(s.width))
            .unwrap_or_default(),
        _ => match line.size.as_deref() {
            Some(size) => size_spec(size, weight),
            None => String::new(),
        },
    }
}

/// Fill in a blank specification from the part name and derivation context.
///
/// `weight` is the high-rack weight class (`550kg`); it is appended to an
/// already-populated high-rack specification that lacks it. Custom lines are
/// left untouched.
pub fn complete_specification(line: &mut BomLine, weight: Option<&str>) {
    if line.is_custom() {
        return;
    }
    let kind = PartKind::classify(&line.name);
    if kind.is_unspecified_hardware() {
        line.specification.clear();
        return;
    }
    let weight = weight.filter(|_| line.family == RackFamily::HighRack);
    let current = line.specification.trim().to_string();
    line.specification = if current.is_empty() {
        blank_spec(line, kind, weight)
    } else {
        with_weight(current, weight)
    };
}
