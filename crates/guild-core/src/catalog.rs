//! Built-in shipbuilding catalog and YAML loading.

use crate::{Catalog, CatalogError, Ingredient, ResourceName, Target, Tier};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

impl Catalog {
    /// The guild's ship materials: two tiers over seven base resources.
    pub fn shipbuilding() -> Self {
        let base = ["목재+", "상급목재", "통나무", "점토", "강철괴", "상급생가죽", "물이든병"];
        Catalog {
            base_resources: base.iter().map(|s| ResourceName::from(*s)).collect(),
            tiers: vec![
                Tier {
                    name: "1차 재료".to_string(),
                    targets: vec![
                        direct("목재+", 1000),
                        direct("상급목재", 1000),
                        derived("타르", 200, &[("통나무", 50), ("점토", 25)]),
                    ],
                },
                Tier {
                    name: "2차 재료".to_string(),
                    targets: vec![
                        direct("강철괴", 1500),
                        direct("목재+", 2000),
                        derived("아교", 250, &[("상급생가죽", 30), ("물이든병", 10)]),
                    ],
                },
            ],
        }
    }
}

fn direct(resource: &str, need: u64) -> Target {
    Target::Direct {
        resource: resource.into(),
        need,
    }
}

fn derived(label: &str, need: u64, recipe: &[(&str, u64)]) -> Target {
    Target::Derived {
        label: label.to_string(),
        need,
        recipe: recipe
            .iter()
            .map(|(r, per_unit)| Ingredient {
                resource: (*r).into(),
                per_unit: *per_unit,
            })
            .collect(),
    }
}

/// Parse and validate a YAML catalog.
pub fn parse_catalog(text: &str) -> Result<Catalog, CatalogError> {
    let catalog: Catalog = serde_yaml::from_str(text)?;
    catalog.validate()?;
    debug!(
        resources = catalog.base_resources.len(),
        tiers = catalog.tiers.len(),
        "catalog parsed"
    );
    Ok(catalog)
}

/// Read a YAML catalog from disk.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let catalog = parse_catalog(&text)?;
    info!(path = %path.display(), "loaded catalog");
    Ok(catalog)
}
