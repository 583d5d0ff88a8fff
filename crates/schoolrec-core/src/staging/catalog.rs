//! Pools of assignable candidates behind the form dropdowns.
//!
//! Class scheduling picks from a static list (subjects for a level, rooms);
//! enrollment picks from a shrinking pool of class-subject slots where a
//! staged slot is hidden until it is unstaged again.

use crate::models::{CandidateEntry, Record, SchoolRoom, SchoolSubject};
use crate::utils::contains_ignore_case;

use super::row::Choice;

/// Something a dropdown can offer.
pub trait CatalogItem: Clone {
    fn catalog_id(&self) -> &str;
    fn catalog_label(&self) -> String;

    fn to_choice(&self) -> Choice {
        Choice::new(self.catalog_id(), self.catalog_label())
    }
}

impl CatalogItem for CandidateEntry {
    fn catalog_id(&self) -> &str {
        &self.id
    }

    fn catalog_label(&self) -> String {
        self.label.clone()
    }
}

impl CatalogItem for SchoolSubject {
    fn catalog_id(&self) -> &str {
        self.id()
    }

    fn catalog_label(&self) -> String {
        self.name().to_string()
    }
}

impl CatalogItem for SchoolRoom {
    fn catalog_id(&self) -> &str {
        self.id()
    }

    fn catalog_label(&self) -> String {
        self.name().to_string()
    }
}

pub trait SelectionCatalog {
    type Item: CatalogItem;

    /// Candidates currently offered, in fetch order.
    fn candidates(&self) -> Vec<&Self::Item>;

    /// Look up an offered candidate by id.
    fn find(&self, id: &str) -> Option<&Self::Item> {
        self.candidates().into_iter().find(|c| c.catalog_id() == id)
    }

    /// Hide a candidate because it was staged. Returns whether anything changed.
    fn consume(&mut self, id: &str) -> bool;

    /// Offer a previously consumed candidate again.
    fn restore(&mut self, id: &str) -> bool;

    /// Swap in freshly fetched candidates; ids in `staged` stay hidden.
    fn replace(&mut self, items: Vec<Self::Item>, staged: &[&str]);

    /// Candidates whose label contains `term`, ignoring case.
    fn search(&self, term: &str) -> Vec<&Self::Item> {
        self.candidates()
            .into_iter()
            .filter(|c| contains_ignore_case(&c.catalog_label(), term))
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.candidates().is_empty()
    }
}

/// Candidates fixed for the session; staging never changes them.
#[derive(Debug, Clone)]
pub struct StaticCatalog<T> {
    items: Vec<T>,
}

impl<T> StaticCatalog<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> Default for StaticCatalog<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: CatalogItem> SelectionCatalog for StaticCatalog<T> {
    type Item = T;

    fn candidates(&self) -> Vec<&T> {
        self.items.iter().collect()
    }

    fn consume(&mut self, _id: &str) -> bool {
        false
    }

    fn restore(&mut self, _id: &str) -> bool {
        false
    }

    fn replace(&mut self, items: Vec<T>, _staged: &[&str]) {
        self.items = items;
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    item: T,
    taken: bool,
}

/// Candidates that disappear once staged and come back when unstaged.
#[derive(Debug, Clone)]
pub struct ShrinkingCatalog<T> {
    slots: Vec<Slot<T>>,
}

impl<T> ShrinkingCatalog<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            slots: items.into_iter().map(|item| Slot { item, taken: false }).collect(),
        }
    }

    /// Number of candidates currently hidden by staging
    pub fn taken_count(&self) -> usize {
        self.slots.iter().filter(|s| s.taken).count()
    }
}

impl<T> Default for ShrinkingCatalog<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: CatalogItem> ShrinkingCatalog<T> {
    fn set_taken(&mut self, id: &str, taken: bool) -> bool {
        match self
            .slots
            .iter_mut()
            .find(|s| s.item.catalog_id() == id && s.taken != taken)
        {
            Some(slot) => {
                slot.taken = taken;
                true
            }
            None => false,
        }
    }
}

impl<T: CatalogItem> SelectionCatalog for ShrinkingCatalog<T> {
    type Item = T;

    fn candidates(&self) -> Vec<&T> {
        self.slots.iter().filter(|s| !s.taken).map(|s| &s.item).collect()
    }

    fn consume(&mut self, id: &str) -> bool {
        self.set_taken(id, true)
    }

    fn restore(&mut self, id: &str) -> bool {
        self.set_taken(id, false)
    }

    fn replace(&mut self, items: Vec<T>, staged: &[&str]) {
        self.slots = items
            .into_iter()
            .map(|item| {
                let taken = staged.contains(&item.catalog_id());
                Slot { item, taken }
            })
            .collect();
    }
}
