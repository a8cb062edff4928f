//! Component Catalog
//!
//! Read-only view over reusable field groups. Listings are ordered by
//! `(category, displayName)` and paginated in memory.

use crate::db::SchemaRegistry;
use crate::models::{ComponentRef, Paginated};
use crate::services::error::GatewayError;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct ComponentService {
    registry: Arc<dyn SchemaRegistry>,
}

impl ComponentService {
    pub fn new(registry: Arc<dyn SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// One page of components, optionally limited to a category
    ///
    /// `total` and `pageCount` describe the filtered set. Pages past the end
    /// are empty, never an error.
    pub fn list(&self, page: u32, page_size: u32, category: Option<&str>) -> Paginated<ComponentRef> {
        let components: Vec<ComponentRef> = self
            .sorted()
            .into_iter()
            .filter(|component| category.map_or(true, |category| component.category == category))
            .collect();

        Paginated::from_items(components, page, page_size)
    }

    /// All components of one category, sorted
    pub fn by_category(&self, category: &str) -> Vec<ComponentRef> {
        self.sorted()
            .into_iter()
            .filter(|component| component.category == category)
            .collect()
    }

    /// Distinct non-empty categories in ascending order
    pub fn categories(&self) -> Vec<String> {
        self.registry
            .components()
            .into_iter()
            .filter(|component| !component.category.is_empty())
            .map(|component| component.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn get(&self, uid: &str) -> Option<ComponentRef> {
        self.registry.component(uid).map(ComponentRef::from)
    }

    pub fn is_valid(&self, uid: &str) -> bool {
        self.registry.component(uid).is_some()
    }

    /// Fail with a not-found error unless `uid` names a registered component
    pub fn ensure_valid(&self, uid: &str) -> Result<(), GatewayError> {
        if self.is_valid(uid) {
            Ok(())
        } else {
            Err(GatewayError::component_not_found(uid))
        }
    }

    fn sorted(&self) -> Vec<ComponentRef> {
        let mut components: Vec<ComponentRef> = self
            .registry
            .components()
            .into_iter()
            .map(ComponentRef::from)
            .collect();

        components.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        components
    }
}

#[cfg(test)]
#[path = "component_service_test.rs"]
mod component_service_test;
