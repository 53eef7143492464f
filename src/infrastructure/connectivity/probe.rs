use super::network_status::NetworkStatusMonitor;
use crate::application::ports::connectivity::{ConnectivityEvent, ConnectivityMonitor};
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn probe(&self) -> bool;
}

/// Any HTTP response counts as reachable; only transport failures do not.
pub struct HttpReachabilityProbe {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpReachabilityProbe {
    pub fn new(url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ReachabilityProbe for HttpReachabilityProbe {
    async fn probe(&self) -> bool {
        let mut request = self.client.head(&self.url);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        match request.send().await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(
                    target: "offline::connectivity",
                    url = %self.url,
                    error = %err,
                    "reachability probe failed"
                );
                false
            }
        }
    }
}

/// Connectivity monitor backed by a periodic probe. Push observations can be
/// fed through [`ProbingConnectivityMonitor::report`] as well; the probe loop
/// is the backstop for platforms that never push.
pub struct ProbingConnectivityMonitor {
    status: NetworkStatusMonitor,
    probe: Arc<dyn ReachabilityProbe>,
    interval: Duration,
}

impl ProbingConnectivityMonitor {
    /// Probes once so the initial state reflects the network at startup.
    pub async fn start(probe: Arc<dyn ReachabilityProbe>, interval: Duration) -> Arc<Self> {
        let initially_reachable = probe.probe().await;
        tracing::info!(
            target: "offline::connectivity",
            reachable = initially_reachable,
            interval_secs = interval.as_secs(),
            "connectivity monitor started"
        );
        Arc::new(Self {
            status: NetworkStatusMonitor::new(initially_reachable),
            probe,
            interval,
        })
    }

    pub fn report(&self, reachable: bool) -> Option<ConnectivityEvent> {
        self.status.report(reachable)
    }

    pub async fn probe_now(&self) -> bool {
        let reachable = self.probe.probe().await;
        self.status.report(reachable);
        reachable
    }

    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + monitor.interval;
            let mut ticker = tokio::time::interval_at(start, monitor.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        monitor.probe_now().await;
                    }
                }
            }
            tracing::debug!(target: "offline::connectivity", "probe loop stopped");
        })
    }
}

impl ConnectivityMonitor for ProbingConnectivityMonitor {
    fn is_reachable(&self) -> bool {
        self.status.is_reachable()
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.status.subscribe()
    }
}
