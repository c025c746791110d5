//! Everything the runtime needs from the outside world, built once from
//! [`Config`].

#![allow(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::api::http::{ApiClient, ReqwestTransport, Transport};
use crate::api::services::Services;
use crate::core::config::Config;
use crate::core::errors::Result;
use crate::logger::activity::{ActivityEvent, ActivityLoggerHandle, spawn_logger};
use crate::logger::jsonl::JsonlConfig;
use crate::store::credentials::CredentialStore;
use crate::store::preferences::{self, LoadOutcome, UserPreferences};
use crate::store::secure::{FileSecureStore, SecureStore};
use crate::store::theme::ThemeState;

pub struct ClientContext {
    pub config: Config,
    pub credentials: Arc<CredentialStore>,
    pub services: Services,
    pub logger: ActivityLoggerHandle,
    logger_join: Option<JoinHandle<()>>,
    pub preferences: UserPreferences,
    pub preferences_path: PathBuf,
    pub theme: Arc<ThemeState>,
}

impl ClientContext {
    /// Production wiring: reqwest transport and file-backed credentials.
    pub fn from_config(config: Config) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config.api)?);
        let secure: Arc<dyn SecureStore> =
            Arc::new(FileSecureStore::new(config.paths.credentials_file.clone()));
        Self::with_parts(config, transport, secure)
    }

    /// Wire the context around a caller-supplied transport and secure store.
    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        secure: Arc<dyn SecureStore>,
    ) -> Result<Self> {
        let credentials = Arc::new(CredentialStore::new(secure));
        let services = Services::new(ApiClient::new(transport, Arc::clone(&credentials)));

        let (logger, logger_join) = if config.logging.enabled {
            let (handle, join) = spawn_logger(JsonlConfig::from_config(&config))?;
            (handle, Some(join))
        } else {
            (ActivityLoggerHandle::disabled(), None)
        };

        let preferences_path = config.paths.preferences_file.clone();
        let outcome = preferences::load(&preferences_path);
        if let LoadOutcome::Corrupt { details, .. } | LoadOutcome::IoError { details, .. } =
            &outcome
        {
            logger.send(ActivityEvent::ActionFailed {
                action: "load_preferences".to_string(),
                message: details.clone(),
            });
        }
        let preferences = outcome.into_prefs();
        let theme = Arc::new(ThemeState::new(preferences.theme));

        Ok(Self {
            config,
            credentials,
            services,
            logger,
            logger_join,
            preferences,
            preferences_path,
            theme,
        })
    }

    /// Persist the current preferences. Failures are logged, not returned.
    pub fn save_preferences(&self) -> bool {
        match preferences::save(&self.preferences, &self.preferences_path) {
            Ok(_) => true,
            Err(err) => {
                self.logger.send(ActivityEvent::ActionFailed {
                    action: "save_preferences".to_string(),
                    message: err.to_string(),
                });
                false
            }
        }
    }

    /// Flush the activity log and wait for the logger thread.
    pub fn shutdown(&mut self, reason: &str) {
        self.logger.send(ActivityEvent::SessionStopped {
            reason: reason.to_string(),
        });
        self.logger.shutdown();
        if let Some(join) = self.logger_join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for ClientContext {
    fn drop(&mut self) {
        if self.logger_join.is_some() {
            self.shutdown("dropped");
        }
    }
}
