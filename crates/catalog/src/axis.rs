//! Configuration axes and token parsing.
//!
//! Axis values stay as the catalog's own string tokens (`2080x1000`, `H4500`,
//! `L4`, `standalone`, `550kg`); these helpers extract the numbers the formulas
//! need.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use rackquote_core::ValueObject;
use rackquote_core::amount::first_integer;

use crate::collate::collate;

/// One configurable dimension, in cascade order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    WeightClass,
    Size,
    Height,
    Level,
    FormType,
}

impl Axis {
    /// Cascade order: a change invalidates only axes after it.
    pub const ORDER: [Axis; 5] = [
        Axis::WeightClass,
        Axis::Size,
        Axis::Height,
        Axis::Level,
        Axis::FormType,
    ];

    pub fn downstream(self) -> impl Iterator<Item = Axis> {
        Axis::ORDER.into_iter().filter(move |a| *a > self)
    }
}

/// Standalone racks carry their own four posts; connected racks share two.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    Standalone,
    Connected,
}

impl FormType {
    pub const ALL: [FormType; 2] = [FormType::Standalone, FormType::Connected];

    pub fn token(self) -> &'static str {
        match self {
            FormType::Standalone => "standalone",
            FormType::Connected => "connected",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        FormType::ALL
            .into_iter()
            .find(|f| f.token().eq_ignore_ascii_case(token.trim()))
    }

    /// Missing or unknown tokens count as standalone.
    pub fn from_selection(selection: &Selection) -> Self {
        selection
            .form_type
            .as_deref()
            .and_then(FormType::from_token)
            .unwrap_or(FormType::Standalone)
    }

    pub fn is_connected(self) -> bool {
        self == FormType::Connected
    }
}

/// A (possibly partial) set of axis values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_type: Option<String>,
}

impl ValueObject for Selection {}

impl Selection {
    pub fn get(&self, axis: Axis) -> Option<&str> {
        let slot = match axis {
            Axis::WeightClass => &self.weight_class,
            Axis::Size => &self.size,
            Axis::Height => &self.height,
            Axis::Level => &self.level,
            Axis::FormType => &self.form_type,
        };
        slot.as_deref().filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, axis: Axis, value: Option<String>) {
        let value = value.filter(|v| !v.trim().is_empty());
        match axis {
            Axis::WeightClass => self.weight_class = value,
            Axis::Size => self.size = value,
            Axis::Height => self.height = value,
            Axis::Level => self.level = value,
            Axis::FormType => self.form_type = value,
        }
    }

    pub fn with(mut self, axis: Axis, value: &str) -> Self {
        self.set(axis, Some(value.to_string()));
        self
    }

    /// True when every listed axis carries a value.
    pub fn has_all(&self, axes: &[Axis]) -> bool {
        axes.iter().all(|a| self.get(*a).is_some())
    }

    pub fn level_count(&self) -> Option<u64> {
        self.get(Axis::Level).and_then(first_integer)
    }

    pub fn height_mm(&self) -> u64 {
        self.get(Axis::Height).map(parse_height_mm).unwrap_or(0)
    }

    pub fn parsed_size(&self) -> Option<Size> {
        self.get(Axis::Size).and_then(parse_size)
    }

    /// Weight-class suffix (`550kg`) carried by high-rack specifications.
    pub fn weight_suffix(&self) -> Option<String> {
        self.get(Axis::WeightClass).and_then(weight_only)
    }
}

/// Width × depth parsed from a size token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Size {
    pub width: u64,
    pub depth: u64,
}

static SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)W?(\d+)xD?(\d+)").expect("valid size pattern"));

static WEIGHT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2,4}kg)").expect("valid weight pattern"));

/// Parse `2080x1000`, `W1380xD800`, `80 X 108`.
pub fn parse_size(token: &str) -> Option<Size> {
    let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
    let caps = SIZE_PATTERN.captures(&compact)?;
    Some(Size {
        width: caps[1].parse().ok()?,
        depth: caps[2].parse().ok()?,
    })
}

/// Every digit in the height token, read as millimetres (`H4500` → 4500).
pub fn parse_height_mm(token: &str) -> u64 {
    let digits: String = token.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Leading number of a size token (`2080x1000` → `2080`), else the token itself.
pub fn front_number(token: &str) -> String {
    first_integer(token)
        .map(|n| n.to_string())
        .unwrap_or_else(|| token.trim().to_string())
}

/// Extract the bare weight class (`550kg`) from a weight/color token.
pub fn weight_only(token: &str) -> Option<String> {
    WEIGHT_PATTERN.captures(token).map(|c| c[1].to_string())
}

/// Raw data weight tokens map to the labels customers see.
pub fn display_weight_label(token: &str) -> String {
    token
        .replace("200kg", "270kg")
        .replace("350kg", "450kg")
        .replace("700kg", "550kg")
}

/// Deduplicate and order size tokens by (width, depth), then collated text.
pub fn sort_sizes(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = values.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    out.sort_by(|a, b| match (parse_size(a), parse_size(b)) {
        (Some(x), Some(y)) if x != y => x.cmp(&y),
        _ => collate(a, b),
    });
    out
}

/// Deduplicate and order tokens by their first integer; tokens without one go last.
pub fn sort_numeric(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = values.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    out.sort_by(|a, b| {
        let key = |s: &str| first_integer(s).unwrap_or(u64::MAX);
        match key(a).cmp(&key(b)) {
            Ordering::Equal => collate(a, b),
            other => other,
        }
    });
    out
}
