//! Remote compendium registry
//!
//! Implementations of the capability traits over the host's REST API.
//! Lookup mirrors the host's own registry semantics: the pack list is
//! enumerated and matched by exact qualified name.

use async_trait::async_trait;
use serde_json::Value;

use super::client::HostClient;
use super::{CompendiumHandle, CompendiumRegistry, IndexEntry};
use crate::error::Result;
use crate::pack::PackRef;

/// Registry backed by the host's pack API
#[derive(Clone)]
pub struct RemoteRegistry {
    client: HostClient,
}

impl RemoteRegistry {
    pub fn new(client: HostClient) -> Self {
        Self { client }
    }

    /// Fetch the raw pack list (`{"packs": [{"collection": ...}, ...]}`)
    async fn fetch_pack_list(&self) -> Result<Vec<String>> {
        let response = self.client.get(&self.client.packs_url()).await?;

        let packs = response
            .get("packs")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|p| p.get("collection").and_then(|v| v.as_str()))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(packs)
    }
}

#[async_trait]
impl CompendiumRegistry for RemoteRegistry {
    async fn packs(&self) -> Result<Vec<String>> {
        self.fetch_pack_list().await
    }

    async fn lookup(&self, pack: &PackRef) -> Result<Option<Box<dyn CompendiumHandle>>> {
        let qualified = pack.qualified();
        let packs = self.fetch_pack_list().await?;

        if !packs.iter().any(|p| p == &qualified) {
            return Ok(None);
        }

        Ok(Some(Box::new(RemoteHandle {
            client: self.client.clone(),
            pack: pack.clone(),
            qualified,
        })))
    }
}

/// Handle to one pack on the host
pub struct RemoteHandle {
    client: HostClient,
    pack: PackRef,
    qualified: String,
}

#[async_trait]
impl CompendiumHandle for RemoteHandle {
    fn collection(&self) -> &str {
        &self.qualified
    }

    async fn get_index(&self) -> Result<Vec<IndexEntry>> {
        let response = self.client.get(&self.client.index_url(&self.pack)).await?;

        let rows = response
            .get("index")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut index = Vec::with_capacity(rows.len());
        for row in &rows {
            match IndexEntry::from_value(row) {
                Some(entry) => index.push(entry),
                None => tracing::warn!(
                    "skipping index row without an '_id' in pack {}: {}",
                    self.qualified,
                    row
                ),
            }
        }

        Ok(index)
    }

    async fn delete_entry(&self, id: &str) -> Result<()> {
        self.client
            .delete(&self.client.entry_url(&self.pack, id))
            .await?;
        Ok(())
    }

    async fn create_entry(&self, record: &Value) -> Result<()> {
        self.client
            .post(&self.client.entries_url(&self.pack), Some(record))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn registry_for(server: &MockServer) -> RemoteRegistry {
        RemoteRegistry::new(HostClient::new(&server.uri(), None).unwrap())
    }

    async fn mount_pack_list(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/packs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "packs": [
                    {"collection": "world.new-compendium", "label": "New Compendium"},
                    {"collection": "module.tables", "label": "Roll Tables"}
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn packs_returns_the_registry_snapshot() {
        let server = MockServer::start().await;
        mount_pack_list(&server).await;

        let packs = registry_for(&server).packs().await.unwrap();
        assert_eq!(packs, ["world.new-compendium", "module.tables"]);
    }

    #[tokio::test]
    async fn lookup_matches_the_qualified_name_exactly() {
        let server = MockServer::start().await;
        mount_pack_list(&server).await;
        let registry = registry_for(&server);

        let handle = registry
            .lookup(&"world.new-compendium".parse().unwrap())
            .await
            .unwrap()
            .expect("pack is listed");
        assert_eq!(handle.collection(), "world.new-compendium");

        // a prefix of a listed name is not a match
        let missing = registry.lookup(&"world.new".parse().unwrap()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn lookup_propagates_registry_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/packs"))
            .respond_with(ResponseTemplate::new(500).set_body_string("registry down"))
            .mount(&server)
            .await;

        let err = registry_for(&server)
            .lookup(&"world.new-compendium".parse().unwrap())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ImportError::HostApi { status: 500, .. }));
    }

    #[tokio::test]
    async fn index_skips_rows_without_an_id() {
        let server = MockServer::start().await;
        mount_pack_list(&server).await;

        Mock::given(method("GET"))
            .and(path("/api/packs/world.new-compendium/index"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "index": [
                    {"_id": "a", "name": "Old Table 1"},
                    {"name": "orphan row"},
                    {"_id": "b"}
                ]
            })))
            .mount(&server)
            .await;

        let handle = registry_for(&server)
            .lookup(&"world.new-compendium".parse().unwrap())
            .await
            .unwrap()
            .unwrap();

        let index = handle.get_index().await.unwrap();
        let ids: Vec<&str> = index.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn delete_and_create_target_the_entry_endpoints() {
        let server = MockServer::start().await;
        mount_pack_list(&server).await;
        let record = json!({"name": "T1", "results": []});

        Mock::given(method("DELETE"))
            .and(path("/api/packs/world.new-compendium/entries/a"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/packs/world.new-compendium/entries"))
            .and(body_json(&record))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "c1"})))
            .expect(1)
            .mount(&server)
            .await;

        let handle = registry_for(&server)
            .lookup(&"world.new-compendium".parse().unwrap())
            .await
            .unwrap()
            .unwrap();

        handle.delete_entry("a").await.unwrap();
        handle.create_entry(&record).await.unwrap();
    }
}
