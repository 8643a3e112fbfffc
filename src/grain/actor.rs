use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

use super::{ForecastKey, ForecastProvider};
use crate::{CulexError, Result, models::WeatherForecast, source::ForecastSource};

const DEFAULT_MAILBOX_CAPACITY: usize = 64;
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

enum ProviderMessage {
    GetForecast {
        reply: oneshot::Sender<Result<Vec<WeatherForecast>>>,
    },
    Shutdown,
}

/// Runtime settings of a provider activation.
#[derive(Debug, Clone, Copy)]
pub struct ProviderOptions {
    /// Calls queued before callers start waiting for a free slot
    pub mailbox_capacity: usize,
    /// Upper bound for one forwarded call, queueing included
    pub call_timeout: Duration,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Cloneable reference to a running provider actor.
///
/// The actor task owns its [`ForecastSource`] and serves one message at a
/// time, so every reply is the output of exactly one `forecasts()` call.
/// Dropping a pending `get_forecast` future drops the reply channel; the
/// actor notices when it tries to answer and moves on.
#[derive(Debug, Clone)]
pub struct ProviderHandle {
    key: ForecastKey,
    sender: mpsc::Sender<ProviderMessage>,
    call_timeout: Duration,
}

impl std::fmt::Debug for ProviderMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderMessage::GetForecast { .. } => write!(f, "GetForecast"),
            ProviderMessage::Shutdown => write!(f, "Shutdown"),
        }
    }
}

impl ProviderHandle {
    /// Start a provider actor on the current tokio runtime.
    pub fn spawn(key: ForecastKey, source: impl ForecastSource, options: ProviderOptions) -> Self {
        let (sender, mailbox) = mpsc::channel(options.mailbox_capacity.max(1));
        tokio::spawn(run(key, source, mailbox));
        Self {
            key,
            sender,
            call_timeout: options.call_timeout,
        }
    }

    /// True once the actor has stopped and no longer accepts calls.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Ask the actor to stop. Calls queued behind the request fail with a
    /// forwarding error.
    pub async fn shutdown(&self) {
        if self.sender.send(ProviderMessage::Shutdown).await.is_err() {
            debug!(key = %self.key, "Provider already stopped");
        }
    }

    async fn forward(&self) -> Result<Vec<WeatherForecast>> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(ProviderMessage::GetForecast { reply })
            .await
            .map_err(|_| CulexError::forwarding(format!("provider {} is unreachable", self.key)))?;

        response.await.map_err(|_| {
            CulexError::forwarding(format!("provider {} dropped the request", self.key))
        })?
    }
}

#[async_trait]
impl ForecastProvider for ProviderHandle {
    #[instrument(name = "get_forecast", level = "debug", skip(self), fields(key = %self.key))]
    async fn get_forecast(&self) -> Result<Vec<WeatherForecast>> {
        tokio::time::timeout(self.call_timeout, self.forward())
            .await
            .map_err(|_| {
                CulexError::forwarding(format!(
                    "provider {} timed out after {}ms",
                    self.key,
                    self.call_timeout.as_millis()
                ))
            })?
    }
}

async fn run<S: ForecastSource>(
    key: ForecastKey,
    mut source: S,
    mut mailbox: mpsc::Receiver<ProviderMessage>,
) {
    info!(%key, "Forecast provider activated");

    while let Some(message) = mailbox.recv().await {
        debug!(%key, ?message, "Provider message received");
        match message {
            ProviderMessage::GetForecast { reply } => {
                let result = source.forecasts();
                if reply.send(result).is_err() {
                    debug!(%key, "Caller went away before the reply");
                }
            }
            ProviderMessage::Shutdown => break,
        }
    }

    info!(%key, "Forecast provider deactivated");
}
