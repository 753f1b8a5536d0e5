use async_trait::async_trait;

/// Device online/offline signal. Drives the opportunistic background refresh
/// of cached reference content.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}
