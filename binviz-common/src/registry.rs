use std::sync::Arc;

use indexmap::IndexMap;

use crate::attribute::{Attribute, AttributeId};
use crate::error::BinvizCommonError;

/// Session scoped store of calculated attributes.
///
/// Holds at most one instance per attribute identity. Entries are only
/// added, never replaced, until [`AttributeRegistry::reset`] is called.
#[derive(Debug, Default, Clone)]
pub struct AttributeRegistry {
    calculated: IndexMap<AttributeId, Arc<Attribute>>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registered instance for the attribute's identity, inserting
    /// the attribute first if the identity is unknown.
    pub fn register(&mut self, attribute: Attribute) -> Result<Arc<Attribute>, BinvizCommonError> {
        if !attribute.is_calculated() {
            return Err(BinvizCommonError::NotCalculated(
                attribute.display_name().to_string(),
            ));
        }
        let id = attribute.id();
        if let Some(existing) = self.calculated.get(&id) {
            tracing::debug!("calculated attribute {id:?} already registered");
            return Ok(existing.clone());
        }
        let attribute = Arc::new(attribute);
        self.calculated.insert(id, attribute.clone());
        Ok(attribute)
    }

    pub fn get(&self, id: &AttributeId) -> Option<&Arc<Attribute>> {
        self.calculated.get(id)
    }

    /// Calculated attributes in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Attribute>> {
        self.calculated.values()
    }

    pub fn len(&self) -> usize {
        self.calculated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculated.is_empty()
    }

    /// Drops every entry. Only called when the session ends.
    pub fn reset(&mut self) {
        self.calculated.clear();
    }
}
