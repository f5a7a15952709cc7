use std::time::Duration;
use tracing::info;

use crate::api::{CareApi, HealthStatus};
use crate::error::ApiError;

pub const RESTORED_MESSAGE: &str = "Connection restored";
pub const LOST_MESSAGE: &str = "Connection lost. Please check your internet connection.";
pub const LOST_TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Any HTTP answer, even an unhealthy one, means the backend is reachable
pub fn is_reachable(result: &Result<HealthStatus, ApiError>) -> bool {
    !matches!(result, Err(ApiError::Network(_)))
}

pub async fn probe<A: CareApi + ?Sized>(api: &A) -> bool {
    is_reachable(&api.health().await)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityChange {
    Restored,
    Lost,
}

impl ConnectivityChange {
    pub fn message(&self) -> &'static str {
        match self {
            ConnectivityChange::Restored => RESTORED_MESSAGE,
            ConnectivityChange::Lost => LOST_MESSAGE,
        }
    }

    pub fn toast_duration(&self) -> Option<Duration> {
        match self {
            ConnectivityChange::Restored => None,
            ConnectivityChange::Lost => Some(LOST_TOAST_DURATION),
        }
    }
}

/// Tracks reachability across probes and reports only transitions
#[derive(Debug, Clone, Default)]
pub struct ConnectivityMonitor {
    online: Option<bool>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_online(&self) -> Option<bool> {
        self.online
    }

    /// Record a probe. The first observation only sets the baseline.
    pub fn observe(&mut self, online: bool) -> Option<ConnectivityChange> {
        let previous = self.online.replace(online)?;
        match (previous, online) {
            (false, true) => {
                info!("Backend reachable again");
                Some(ConnectivityChange::Restored)
            }
            (true, false) => {
                info!("Backend unreachable");
                Some(ConnectivityChange::Lost)
            }
            _ => None,
        }
    }
}
