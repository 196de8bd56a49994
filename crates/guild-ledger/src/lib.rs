#![deny(warnings)]

//! Member ledger: each member's latest self-reported resource holdings.
//!
//! Storage sits behind the [`LedgerStore`] trait so the ledger can be passed
//! explicitly and swapped in tests. [`MemberLedger`] owns the input rules:
//! whole-entry replacement, unknown resources rejected, negative quantities
//! clamped to zero and blank identifiers ignored.

use guild_core::{Catalog, Holdings, MemberId, ResourceName};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors produced when a submission cannot be stored.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    /// The submission names a resource outside the catalog.
    #[error("unknown resource: {0}")]
    UnknownResource(String),
}

/// Result of a save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First submission for this member.
    Inserted,
    /// Previous submission replaced wholesale.
    Replaced,
    /// Blank identifier; nothing stored.
    Ignored,
}

/// Backing storage for member entries.
pub trait LedgerStore {
    /// Store `holdings` for `id`, returning the previous entry if any.
    fn put(&mut self, id: MemberId, holdings: Holdings) -> Option<Holdings>;
    fn get(&self, id: &str) -> Option<&Holdings>;
    /// All entries in identifier order.
    fn all(&self) -> &BTreeMap<MemberId, Holdings>;

    fn len(&self) -> usize {
        self.all().len()
    }

    fn is_empty(&self) -> bool {
        self.all().is_empty()
    }
}

/// Process-local store; the default for a single running instance.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    entries: BTreeMap<MemberId, Holdings>,
}

impl LedgerStore for InMemoryStore {
    fn put(&mut self, id: MemberId, holdings: Holdings) -> Option<Holdings> {
        self.entries.insert(id, holdings)
    }

    fn get(&self, id: &str) -> Option<&Holdings> {
        self.entries.get(id)
    }

    fn all(&self) -> &BTreeMap<MemberId, Holdings> {
        &self.entries
    }
}

/// Validating front of a [`LedgerStore`].
#[derive(Clone, Debug)]
pub struct MemberLedger<S = InMemoryStore> {
    base_resources: Vec<ResourceName>,
    store: S,
}

impl MemberLedger<InMemoryStore> {
    /// Empty in-memory ledger accepting the catalog's base resources.
    pub fn new(catalog: &Catalog) -> Self {
        Self::with_store(catalog, InMemoryStore::default())
    }
}

impl<S: LedgerStore> MemberLedger<S> {
    pub fn with_store(catalog: &Catalog, store: S) -> Self {
        Self {
            base_resources: catalog.base_resources.clone(),
            store,
        }
    }

    /// Insert or fully replace the entry for `id`.
    ///
    /// Every base resource is stored; ones missing from `quantities` become 0.
    /// A repeated resource keeps its last value. Negative values are clamped
    /// to 0. Any unknown resource rejects the whole submission and leaves the
    /// previous entry untouched.
    pub fn upsert<I, K>(&mut self, id: &str, quantities: I) -> Result<UpsertOutcome, LedgerError>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<str>,
    {
        let Some(member) = MemberId::parse(id) else {
            debug!("ignoring submission with blank member id");
            return Ok(UpsertOutcome::Ignored);
        };

        let mut holdings: Holdings = self
            .base_resources
            .iter()
            .map(|r| (r.clone(), 0))
            .collect();
        for (name, qty) in quantities {
            let name = name.as_ref();
            let Some(slot) = holdings.get_mut(name) else {
                return Err(LedgerError::UnknownResource(name.to_string()));
            };
            if qty < 0 {
                warn!(member = %member, resource = name, qty, "negative quantity clamped to 0");
            }
            *slot = u64::try_from(qty).unwrap_or(0);
        }

        let outcome = match self.store.put(member.clone(), holdings) {
            Some(_) => UpsertOutcome::Replaced,
            None => UpsertOutcome::Inserted,
        };
        info!(member = %member, ?outcome, "saved member holdings");
        Ok(outcome)
    }

    /// The member's last submission, if any.
    pub fn get(&self, id: &str) -> Option<&Holdings> {
        self.store.get(id.trim())
    }

    /// Form values for `id`: every base resource, 0 where nothing was saved.
    pub fn prefill(&self, id: &str) -> Holdings {
        let prev = self.get(id);
        self.base_resources
            .iter()
            .map(|r| {
                let qty = prev.and_then(|h| h.get(r)).copied().unwrap_or(0);
                (r.clone(), qty)
            })
            .collect()
    }

    pub fn all(&self) -> &BTreeMap<MemberId, Holdings> {
        self.store.all()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn base_resources(&self) -> &[ResourceName] {
        &self.base_resources
    }
}
