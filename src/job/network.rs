use std::{sync::Arc, time::Duration};

use tokio::{net::TcpStream, sync::watch, task::JoinHandle, time::timeout};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Publishes whether the network is reachable.
#[derive(Debug)]
pub struct NetworkMonitor {
    tx: watch::Sender<bool>,
}

impl NetworkMonitor {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            let changed = *current != online;
            *current = online;
            changed
        });
        if changed {
            tracing::info!(online, "network state changed");
        }
    }

    /// Periodically try a TCP connection to `addr` and publish the result.
    pub fn spawn_probe(self: Arc<Self>, addr: String, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let online = probe(&addr).await;
                tracing::trace!(%addr, online, "network probe");
                self.set_online(online);
                tokio::time::sleep(interval).await;
            }
        })
    }
}

async fn probe(addr: &str) -> bool {
    matches!(timeout(PROBE_TIMEOUT, TcpStream::connect(addr)).await, Ok(Ok(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn subscribers_see_state_changes() {
        let monitor = NetworkMonitor::new(false);
        let mut rx = monitor.subscribe();
        assert!(!*rx.borrow_and_update());

        monitor.set_online(true);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());

        monitor.set_online(true);
        assert!(!rx.has_changed().unwrap());
        assert!(monitor.is_online());
    }

    #[tokio::test]
    async fn probe_reports_reachable_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        assert!(probe(&addr).await);

        drop(listener);
        assert!(!probe(&addr).await);
    }

    #[tokio::test]
    async fn spawned_probe_marks_online() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let monitor = Arc::new(NetworkMonitor::new(false));
        let mut rx = monitor.subscribe();

        let handle = monitor.clone().spawn_probe(addr, Duration::from_secs(60));
        timeout(Duration::from_secs(5), rx.wait_for(|online| *online))
            .await
            .unwrap()
            .unwrap();
        handle.abort();
    }
}
