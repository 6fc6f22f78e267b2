use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Корневой токен отмены процесса.
///
/// Стоп-сигналы всех подписок порождаются от текущего корня, так что его
/// отмена кооперативно останавливает все циклы накопления. Явная
/// остановка подписок при этом всё равно нужна: только она закрывает
/// подписки у брокера.
pub struct Lifecycle {
    root: RwLock<CancellationToken>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(CancellationToken::new()),
        }
    }

    /// Привязывает новый корень к `parent`.
    pub fn start(
        &self,
        parent: &CancellationToken,
    ) {
        *self.root.write() = parent.child_token();
        info!("bridge lifecycle started");
    }

    pub fn root(&self) -> CancellationToken {
        self.root.read().clone()
    }

    pub fn cancel(&self) {
        self.root.read().cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.root.read().is_cancelled()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_cancellation_reaches_root() {
        let parent = CancellationToken::new();
        let lifecycle = Lifecycle::new();
        lifecycle.start(&parent);
        let child = lifecycle.root().child_token();

        parent.cancel();
        assert!(lifecycle.is_cancelled());
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_restart_installs_fresh_root() {
        let lifecycle = Lifecycle::new();
        lifecycle.cancel();
        assert!(lifecycle.is_cancelled());

        lifecycle.start(&CancellationToken::new());
        assert!(!lifecycle.is_cancelled());
    }

    #[test]
    fn test_cancel_does_not_touch_parent() {
        let parent = CancellationToken::new();
        let lifecycle = Lifecycle::new();
        lifecycle.start(&parent);
        lifecycle.cancel();
        assert!(!parent.is_cancelled());
    }
}
