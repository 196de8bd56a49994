#![deny(warnings)]

//! Core domain models and invariants for the guild shipbuilding tracker.
//!
//! This crate defines the serializable types shared by the ledger and the
//! progress calculator: resource and member identifiers, target materials
//! (direct or recipe-derived) and the catalog that groups them into tiers,
//! together with validation helpers that guard the catalog invariants.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

pub mod catalog;

pub use catalog::{load_catalog, parse_catalog};

/// Name of a base resource, e.g. "통나무" or "강철괴".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(pub String);

impl ResourceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for ResourceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Guild member identifier (the in-game nickname). Never blank.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Trims surrounding whitespace; returns `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MemberId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Held quantity per base resource for a single member.
pub type Holdings = BTreeMap<ResourceName, u64>;

/// One line of a recipe: units of `resource` consumed per unit of output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub resource: ResourceName,
    /// Units required per crafted unit (> 0).
    pub per_unit: u64,
}

/// A material the guild is collecting toward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// A base resource collected as-is.
    Direct { resource: ResourceName, need: u64 },
    /// A crafted material whose availability follows from its recipe.
    Derived {
        label: String,
        need: u64,
        recipe: Vec<Ingredient>,
    },
}

impl Target {
    /// Display label: the resource name for direct targets.
    pub fn label(&self) -> &str {
        match self {
            Target::Direct { resource, .. } => resource.as_str(),
            Target::Derived { label, .. } => label,
        }
    }

    /// Required quantity of the target itself.
    pub fn need(&self) -> u64 {
        match self {
            Target::Direct { need, .. } | Target::Derived { need, .. } => *need,
        }
    }

    /// Recipe ingredients; empty for direct targets.
    pub fn recipe(&self) -> &[Ingredient] {
        match self {
            Target::Direct { .. } => &[],
            Target::Derived { recipe, .. } => recipe,
        }
    }
}

/// A named group of targets, e.g. primary or secondary materials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub targets: Vec<Target>,
}

/// The fixed set of reportable base resources and the tiered goals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Base resources in form/table display order.
    pub base_resources: Vec<ResourceName>,
    pub tiers: Vec<Tier>,
}

impl Catalog {
    pub fn is_base_resource(&self, name: &str) -> bool {
        self.base_resources.iter().any(|r| r.as_str() == name)
    }

    /// All targets across tiers, in tier order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.tiers.iter().flat_map(|t| t.targets.iter())
    }

    /// Check the catalog invariants. See [`validate_catalog`].
    pub fn validate(&self) -> Result<(), CatalogError> {
        validate_catalog(self)
    }
}

/// Validation and loading errors for catalogs.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// A catalog needs at least one reportable resource.
    #[error("catalog declares no base resources")]
    NoBaseResources,
    /// Resource names, labels and tier names must not be blank.
    #[error("blank name in catalog")]
    BlankName,
    /// Base resource listed more than once.
    #[error("duplicate base resource: {0}")]
    DuplicateResource(String),
    /// A target or ingredient refers to a resource that cannot be reported.
    #[error("target {target} refers to unknown resource {resource}")]
    UnknownResource { target: String, resource: String },
    /// Derived targets need at least one ingredient.
    #[error("derived target {0} has an empty recipe")]
    EmptyRecipe(String),
    /// Per-unit requirement must be > 0.
    #[error("ingredient {resource} of {target} has zero units per output")]
    ZeroPerUnit { target: String, resource: String },
    /// Same ingredient listed twice in one recipe.
    #[error("ingredient {resource} listed twice in recipe of {target}")]
    DuplicateIngredient { target: String, resource: String },
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid catalog file: {0}")]
    Parse(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(e: serde_yaml::Error) -> Self {
        CatalogError::Parse(e.to_string())
    }
}

/// Validate a single target against the set of base resources.
pub fn validate_target(
    target: &Target,
    base: &BTreeSet<&str>,
) -> Result<(), CatalogError> {
    match target {
        Target::Direct { resource, .. } => {
            if !base.contains(resource.as_str()) {
                return Err(CatalogError::UnknownResource {
                    target: resource.0.clone(),
                    resource: resource.0.clone(),
                });
            }
        }
        Target::Derived { label, recipe, .. } => {
            if label.trim().is_empty() {
                return Err(CatalogError::BlankName);
            }
            if recipe.is_empty() {
                return Err(CatalogError::EmptyRecipe(label.clone()));
            }
            let mut seen: BTreeSet<&str> = BTreeSet::new();
            for ing in recipe {
                if !base.contains(ing.resource.as_str()) {
                    return Err(CatalogError::UnknownResource {
                        target: label.clone(),
                        resource: ing.resource.0.clone(),
                    });
                }
                if ing.per_unit == 0 {
                    return Err(CatalogError::ZeroPerUnit {
                        target: label.clone(),
                        resource: ing.resource.0.clone(),
                    });
                }
                if !seen.insert(ing.resource.as_str()) {
                    return Err(CatalogError::DuplicateIngredient {
                        target: label.clone(),
                        resource: ing.resource.0.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Validate the catalog, including cross-references from targets to resources.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), CatalogError> {
    if catalog.base_resources.is_empty() {
        return Err(CatalogError::NoBaseResources);
    }
    let mut base: BTreeSet<&str> = BTreeSet::new();
    for r in &catalog.base_resources {
        if r.as_str().trim().is_empty() {
            return Err(CatalogError::BlankName);
        }
        if !base.insert(r.as_str()) {
            return Err(CatalogError::DuplicateResource(r.0.clone()));
        }
    }
    for tier in &catalog.tiers {
        if tier.name.trim().is_empty() {
            return Err(CatalogError::BlankName);
        }
        for target in &tier.targets {
            validate_target(target, &base)?;
        }
    }
    Ok(())
}
