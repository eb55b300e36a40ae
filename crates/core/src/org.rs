//! Organizations and organization-name resolution

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Entity, StrandError, StrandResult};
use crate::id::Id;
use crate::traits::OrganizationNames;

/// Multi-tenant ownership boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization id
    pub id: Id,
    /// Current name
    pub name: String,
}

/// In-memory organization directory
///
/// Renames take effect immediately for every later `name_of` call.
#[derive(Debug, Default)]
pub struct OrgDirectory {
    names: DashMap<Id, String>,
}

impl OrgDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list of organizations
    pub fn from_orgs<I: IntoIterator<Item = Organization>>(orgs: I) -> Self {
        let dir = Self::new();
        for org in orgs {
            dir.put(org);
        }
        dir
    }

    /// Insert or rename an organization
    pub fn put(&self, org: Organization) {
        self.names.insert(org.id, org.name);
    }

    /// Remove an organization, returning it if present
    pub fn remove(&self, id: Id) -> Option<Organization> {
        self.names.remove(&id).map(|(id, name)| Organization { id, name })
    }
}

impl OrganizationNames for OrgDirectory {
    fn name_of(&self, org_id: Id) -> StrandResult<String> {
        self.names
            .get(&org_id)
            .map(|name| name.value().clone())
            .ok_or_else(|| StrandError::not_found(Entity::Organization, org_id))
    }
}
