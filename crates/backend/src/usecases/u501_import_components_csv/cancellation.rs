use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Общий флаг остановки, исполнитель проверяет его перед каждой строкой
#[derive(Debug, Clone, Default)]
pub struct ImportCancellation {
    flag: Arc<AtomicBool>,
}

impl ImportCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Выставить флаг по истечении `timeout`. Вызывать внутри рантайма tokio.
    pub fn cancel_after(&self, timeout: Duration) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if !this.is_cancelled() {
                tracing::warn!("Import deadline of {:?} reached, cancelling", timeout);
                this.cancel();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let token = ImportCancellation::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_after_deadline() {
        let token = ImportCancellation::new();
        token.cancel_after(Duration::from_millis(5)).await.unwrap();
        assert!(token.is_cancelled());
    }
}
