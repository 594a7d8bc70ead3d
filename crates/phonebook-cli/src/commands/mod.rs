pub mod records;

use crate::LoginArgs;
use anyhow::{Context, Result, anyhow};
use phonebook_application::PhonebookApp;
use phonebook_infrastructure::ConfigService;
use phonebook_interaction::HttpPhonebookApi;
use std::path::Path;
use std::sync::Arc;

/// Loads the config, builds the client and signs in.
pub async fn connect(config_path: Option<&Path>, login: &LoginArgs) -> Result<PhonebookApp> {
    let service = match config_path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = service.load().context("Failed to load configuration")?;
    tracing::debug!("[CLI] Using {}", config.base_url);

    let email = login
        .email
        .as_deref()
        .ok_or_else(|| anyhow!("--email (or PHONEBOOK_EMAIL) is required"))?;
    let password = login
        .password
        .as_deref()
        .ok_or_else(|| anyhow!("--password (or PHONEBOOK_PASSWORD) is required"))?;

    let api = Arc::new(HttpPhonebookApi::from_config(&config));
    let app = PhonebookApp::new(api, &config);
    app.session_manager().login(email, password).await?;

    Ok(app)
}
