use std::sync::Arc;

use engine_logging::{engine_error, engine_info, timed_async};
use fabric_core::ModelEntry;

use crate::host::{self, HostCall};
use crate::secrets::{DEFAULT_MODEL, DEFAULT_VENDOR};

/// Vendor and default-model selection, read from and saved to the host.
///
/// Failures are logged and leave the cached values untouched.
pub struct ModelSettings {
    host: Arc<dyn HostCall>,
    vendors: Vec<String>,
    models: Vec<ModelEntry>,
    current_vendor: String,
    default_model: Option<String>,
}

impl ModelSettings {
    pub fn new(host: Arc<dyn HostCall>) -> Self {
        Self {
            host,
            vendors: Vec::new(),
            models: Vec::new(),
            current_vendor: String::new(),
            default_model: None,
        }
    }

    pub fn vendors(&self) -> &[String] {
        &self.vendors
    }

    pub fn models(&self) -> &[ModelEntry] {
        &self.models
    }

    /// Models offered by `vendor`, in listing order.
    pub fn models_of<'a>(&'a self, vendor: &'a str) -> impl Iterator<Item = &'a ModelEntry> + 'a {
        self.models.iter().filter(move |entry| entry.provider == vendor)
    }

    pub fn current_vendor(&self) -> &str {
        &self.current_vendor
    }

    pub fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref()
    }

    /// Refreshes the vendor list; a failed lookup leaves it empty.
    pub async fn load_vendors(&mut self) {
        timed_async("load_vendors", async {
            self.vendors = host::get_vendors(self.host.as_ref())
                .await
                .unwrap_or_else(|err| {
                    engine_error!("Failed to load vendors: {}", err);
                    Vec::new()
                });
        })
        .await
    }

    /// Refreshes the model list; a failed lookup leaves it empty.
    pub async fn load_models(&mut self) {
        timed_async("load_models", async {
            self.models = host::get_models(self.host.as_ref())
                .await
                .unwrap_or_else(|err| {
                    engine_error!("Failed to load models: {}", err);
                    Vec::new()
                });
        })
        .await
    }

    pub async fn load_default_model(&mut self) {
        timed_async("load_default_model", async {
            match host::get_secret(self.host.as_ref(), DEFAULT_MODEL).await {
                Ok(model) => {
                    engine_info!("default model {}", model);
                    self.default_model = Some(model);
                }
                Err(err) => engine_error!("Failed to load default model: {}", err),
            }
        })
        .await
    }

    pub async fn load_default_vendor(&mut self) {
        timed_async("load_default_vendor", async {
            match host::get_secret(self.host.as_ref(), DEFAULT_VENDOR).await {
                Ok(vendor) => self.current_vendor = vendor,
                Err(err) => engine_error!("Failed to load default vendor: {}", err),
            }
        })
        .await
    }

    pub async fn save_default_model(&mut self, model: &str) {
        timed_async("save_default_model", async {
            match host::update_secret(self.host.as_ref(), DEFAULT_MODEL, model).await {
                Ok(()) => self.default_model = Some(model.to_string()),
                Err(err) => engine_error!("Failed to save default model: {}", err),
            }
        })
        .await
    }

    /// Saves `vendor` unless it is already the current one.
    pub async fn save_default_vendor(&mut self, vendor: &str) {
        if vendor == self.current_vendor {
            return;
        }
        timed_async("save_default_vendor", async {
            match host::update_secret(self.host.as_ref(), DEFAULT_VENDOR, vendor).await {
                Ok(()) => self.current_vendor = vendor.to_string(),
                Err(err) => engine_error!("Failed to save default vendor: {}", err),
            }
        })
        .await
    }

    pub async fn reset_defaults(&mut self) {
        timed_async("reset_defaults", async {
            let backend = self.host.as_ref();
            let reset = async {
                host::update_secret(backend, DEFAULT_MODEL, "").await?;
                host::update_secret(backend, DEFAULT_VENDOR, "").await
            };
            match reset.await {
                Ok(()) => {
                    self.current_vendor.clear();
                    self.default_model = None;
                }
                Err(err) => engine_error!("Failed to reset defaults: {}", err),
            }
        })
        .await
    }
}
