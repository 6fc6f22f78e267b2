use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::LocalBroker;

/// Набор именованных встроенных брокеров.
///
/// Профили, указывающие на один и тот же namespace, работают с одним и тем
/// же брокером, поэтому публикация через один профиль видна подписке
/// через другой.
pub struct BrokerHub {
    brokers: DashMap<String, Arc<LocalBroker>>,
    default_capacity: usize,
}

impl BrokerHub {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            brokers: DashMap::new(),
            default_capacity,
        }
    }

    /// Возвращает брокер namespace, создавая его при первом обращении.
    pub fn get_or_create(
        &self,
        namespace: &str,
    ) -> Arc<LocalBroker> {
        self.brokers
            .entry(namespace.to_string())
            .or_insert_with(|| {
                debug!(namespace, capacity = self.default_capacity, "creating broker");
                Arc::new(LocalBroker::new(self.default_capacity))
            })
            .clone()
    }

    pub fn get(
        &self,
        namespace: &str,
    ) -> Option<Arc<LocalBroker>> {
        self.brokers.get(namespace).map(|b| b.value().clone())
    }

    /// Список namespace, для которых уже создан брокер.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.brokers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_namespace_shares_broker() {
        let hub = BrokerHub::new(8);
        let a = hub.get_or_create("default");
        let b = hub.get_or_create("default");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_different_namespaces_are_isolated() {
        let hub = BrokerHub::new(8);
        let a = hub.get_or_create("one");
        let b = hub.get_or_create("two");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(hub.namespaces(), vec!["one".to_string(), "two".to_string()]);
        assert!(hub.get("three").is_none());
    }
}
