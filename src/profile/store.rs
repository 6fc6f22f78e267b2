use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info};

use super::ConnectionProfile;
use crate::{
    application::{BrokerClient, ClientResolver, ConnectionProvider},
    broker::{BrokerHub, LocalClient},
    BridgeError, BridgeResult,
};

/// Хранилище профилей поверх набора встроенных брокеров.
///
/// Реализует оба коллаборатора моста: [`ConnectionProvider`] для реестра
/// подписок и [`ClientResolver`] для пути публикации. Клиенты публикации
/// кешируются по имени сервера отдельно от реестра подписок.
pub struct ProfileStore {
    profiles: HashMap<String, ConnectionProfile>,
    hub: Arc<BrokerHub>,
    publish_clients: DashMap<String, Arc<dyn BrokerClient>>,
}

impl ProfileStore {
    pub fn new(
        profiles: impl IntoIterator<Item = ConnectionProfile>,
        hub: Arc<BrokerHub>,
    ) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect::<HashMap<_, _>>();
        info!(count = profiles.len(), "connection profiles loaded");
        Self {
            profiles,
            hub,
            publish_clients: DashMap::new(),
        }
    }

    pub fn hub(&self) -> &Arc<BrokerHub> {
        &self.hub
    }

    /// Имена всех известных серверов (отсортированы).
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }

    fn connect(
        &self,
        profile: &ConnectionProfile,
    ) -> BridgeResult<LocalClient> {
        if profile.namespace.trim().is_empty() {
            return Err(BridgeError::connection_failed(
                &profile.name,
                "profile has an empty broker namespace",
            ));
        }
        let broker = self.hub.get_or_create(&profile.namespace);
        debug!(server = %profile.name, namespace = %profile.namespace, "broker client opened");
        Ok(LocalClient::new(profile.namespace.clone(), broker))
    }
}

#[async_trait]
impl ConnectionProvider for ProfileStore {
    fn profile(
        &self,
        server: &str,
    ) -> BridgeResult<ConnectionProfile> {
        self.profiles
            .get(server)
            .cloned()
            .ok_or_else(|| BridgeError::profile_not_found(server))
    }

    async fn open_client(
        &self,
        profile: &ConnectionProfile,
    ) -> BridgeResult<Arc<dyn BrokerClient>> {
        let client = self.connect(profile)?;
        Ok(Arc::new(client))
    }
}

#[async_trait]
impl ClientResolver for ProfileStore {
    async fn client(
        &self,
        server: &str,
    ) -> BridgeResult<Arc<dyn BrokerClient>> {
        if let Some(client) = self.publish_clients.get(server) {
            return Ok(client.value().clone());
        }
        let profile = self.profile(server)?;
        let client: Arc<dyn BrokerClient> = Arc::new(self.connect(&profile)?);
        Ok(self
            .publish_clients
            .entry(server.to_string())
            .or_insert(client)
            .clone())
    }
}
