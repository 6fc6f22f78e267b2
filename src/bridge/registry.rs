use std::{
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use super::SubscriptionHandle;
use crate::{application::ConnectionProvider, BridgeResult};

/// Реестр подписок: имя сервера → [`SubscriptionHandle`].
///
/// Все изменения карты сериализуются одним мьютексом. Соединение с
/// брокером создаётся при первом `resolve` под этим же мьютексом, поэтому
/// конкурентный первый доступ к одному серверу не создаёт дублей.
pub struct Registry {
    provider: Arc<dyn ConnectionProvider>,
    items: Mutex<HashMap<String, SubscriptionHandle>>,
}

/// Эксклюзивный доступ к карте реестра.
pub struct RegistryGuard<'a> {
    provider: &'a dyn ConnectionProvider,
    items: MutexGuard<'a, HashMap<String, SubscriptionHandle>>,
}

impl Registry {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            provider,
            items: Mutex::new(HashMap::new()),
        }
    }

    /// Захватывает реестр на время составной операции.
    pub async fn lock(&self) -> RegistryGuard<'_> {
        RegistryGuard {
            provider: self.provider.as_ref(),
            items: self.items.lock().await,
        }
    }

    /// Снимок зарегистрированных серверов.
    pub async fn servers(&self) -> Vec<String> {
        let mut servers: Vec<String> = self.items.lock().await.keys().cloned().collect();
        servers.sort();
        servers
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

impl RegistryGuard<'_> {
    /// Возвращает handle сервера, при промахе создавая соединение.
    ///
    /// # Ошибки
    /// - `ProfileNotFound`, если профиля нет
    /// - `ConnectionFailed`, если соединение не открылось
    pub async fn resolve(
        &mut self,
        server: &str,
    ) -> BridgeResult<&mut SubscriptionHandle> {
        match self.items.entry(server.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let profile = self.provider.profile(server)?;
                let client = self.provider.open_client(&profile).await?;
                info!(server, namespace = %profile.namespace, "broker connection created");
                Ok(entry.insert(SubscriptionHandle::new(server, client)))
            }
        }
    }

    pub fn get_mut(
        &mut self,
        server: &str,
    ) -> Option<&mut SubscriptionHandle> {
        self.items.get_mut(server)
    }

    /// Удаляет запись. Подписка и стоп-сигнал к этому моменту уже закрыты.
    pub fn remove(
        &mut self,
        server: &str,
    ) -> Option<SubscriptionHandle> {
        self.items.remove(server)
    }

    pub fn handles(&self) -> impl Iterator<Item = &SubscriptionHandle> {
        self.items.values()
    }
}
