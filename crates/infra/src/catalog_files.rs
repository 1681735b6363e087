//! Catalog documents on disk.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use rackquote_catalog::Catalog;

pub const PRICE_TABLE_FILE: &str = "prices.json";
pub const BOM_TEMPLATES_FILE: &str = "bom_templates.json";
/// Optional; a catalog without accessories is valid.
pub const ACCESSORIES_FILE: &str = "accessories.json";

pub fn load_catalog(dir: &Path) -> anyhow::Result<Catalog> {
    let prices = read_required(dir, PRICE_TABLE_FILE)?;
    let templates = read_required(dir, BOM_TEMPLATES_FILE)?;
    let accessories = match fs::read_to_string(dir.join(ACCESSORIES_FILE)) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "no accessories document; continuing without extras");
            "{}".to_string()
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading {}", dir.join(ACCESSORIES_FILE).display()));
        }
    };

    let catalog = Catalog::from_json(&prices, &templates, &accessories)
        .with_context(|| format!("parsing catalog in {}", dir.display()))?;
    info!(dir = %dir.display(), "catalog loaded");
    Ok(catalog)
}

fn read_required(dir: &Path, name: &str) -> anyhow::Result<String> {
    let path = dir.join(name);
    fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
}
