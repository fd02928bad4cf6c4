//! Host API interaction module
//!
//! This module provides everything needed to talk to the tabletop host's
//! compendium API: the capability traits the importer runs against, and
//! their HTTP implementation over the host's REST surface.
//!
//! # Module Structure
//!
//! - [`client`] - Host client holding the base URL, token, and URL builders
//! - [`http`] - HTTP utilities for REST API calls
//! - [`registry`] - Remote implementations of the capability traits
//!
//! # Example
//!
//! ```ignore
//! use crate::host::client::HostClient;
//! use crate::host::registry::RemoteRegistry;
//! use crate::host::CompendiumRegistry;
//!
//! async fn example() -> crate::error::Result<()> {
//!     let client = HostClient::new("http://localhost:30000", None)?;
//!     let registry = RemoteRegistry::new(client);
//!     let packs = registry.packs().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod registry;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::pack::PackRef;

/// One row of a compendium index: the identifier of an existing entry.
///
/// Identifiers are opaque; they are never inspected beyond being passed
/// back to the delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: String,
}

impl IndexEntry {
    /// Parse an index row from the host's JSON shape (`{"_id": "..."}`).
    /// Rows without an `_id` string have nothing to delete by.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value.get("_id").and_then(|v| v.as_str())?;
        Some(Self { id: id.to_string() })
    }
}

/// Capability set of a resolved compendium pack
#[async_trait]
pub trait CompendiumHandle: Send + Sync {
    /// Qualified name of the pack this handle targets
    fn collection(&self) -> &str;

    /// Enumerate identifiers of the entries currently in the pack.
    /// Order is the host's own enumeration order.
    async fn get_index(&self) -> Result<Vec<IndexEntry>>;

    /// Delete one entry by identifier
    async fn delete_entry(&self, id: &str) -> Result<()>;

    /// Create one entry from a record, handed to the host verbatim
    async fn create_entry(&self, record: &Value) -> Result<()>;
}

/// Lookup surface of the host's compendium registry
#[async_trait]
pub trait CompendiumRegistry: Send + Sync {
    /// Snapshot of the qualified names the registry currently holds
    async fn packs(&self) -> Result<Vec<String>>;

    /// Resolve a pack by exact qualified-name match
    async fn lookup(&self, pack: &PackRef) -> Result<Option<Box<dyn CompendiumHandle>>>;
}
