use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::info;

use super::{ForecastKey, ForecastProvider, ProviderHandle, ProviderOptions};
use crate::{Result, models::WeatherForecast, source::ForecastSource};

type SourceFactory = Box<dyn Fn(ForecastKey) -> Box<dyn ForecastSource> + Send + Sync>;

/// Resolves provider references by key.
///
/// The first lookup of a key activates an actor; later lookups return a
/// handle to that same activation. An activation that has stopped is
/// replaced on the next lookup.
pub struct GrainDirectory {
    options: ProviderOptions,
    factory: SourceFactory,
    activations: Mutex<HashMap<ForecastKey, ProviderHandle>>,
}

impl GrainDirectory {
    pub fn new<F>(options: ProviderOptions, factory: F) -> Self
    where
        F: Fn(ForecastKey) -> Box<dyn ForecastSource> + Send + Sync + 'static,
    {
        Self {
            options,
            factory: Box::new(factory),
            activations: Mutex::new(HashMap::new()),
        }
    }

    /// Get the provider for `key`, activating it if needed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn get_grain(&self, key: ForecastKey) -> ProviderHandle {
        let mut activations = self
            .activations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = activations.get(&key).filter(|handle| !handle.is_closed()) {
            return handle.clone();
        }

        info!(%key, "Activating forecast provider");
        let handle = ProviderHandle::spawn(key, (self.factory)(key), self.options);
        activations.insert(key, handle.clone());
        handle
    }

    #[must_use]
    pub fn activation_count(&self) -> usize {
        self.activations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Stop every activation and forget it.
    pub async fn shutdown(&self) {
        let handles: Vec<ProviderHandle> = self
            .activations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, handle)| handle)
            .collect();

        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// A provider reference that is resolved through the directory on every
/// call, so a stopped activation is replaced before the next request.
#[derive(Debug, Clone)]
pub struct GrainReference {
    directory: Arc<GrainDirectory>,
    key: ForecastKey,
}

impl GrainReference {
    #[must_use]
    pub fn new(directory: Arc<GrainDirectory>, key: ForecastKey) -> Self {
        Self { directory, key }
    }
}

#[async_trait]
impl ForecastProvider for GrainReference {
    async fn get_forecast(&self) -> Result<Vec<WeatherForecast>> {
        self.directory.get_grain(self.key).get_forecast().await
    }
}

impl std::fmt::Debug for GrainDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrainDirectory")
            .field("options", &self.options)
            .field("activations", &self.activation_count())
            .finish()
    }
}
