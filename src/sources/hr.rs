//! HR report provider.

use crate::config::HrConfig;
use crate::error::{Error, Result};
use crate::recognition::{EmployeeRecord, parse_report};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    credentials: Credentials<'a>,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    company: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Where the employee report comes from.
#[derive(Debug, Clone)]
pub enum HrSource {
    /// Token login followed by a saved-report download
    Remote { client: Client, config: HrConfig },
    /// A report exported to disk
    File(PathBuf),
}

impl HrSource {
    pub fn from_config(config: &HrConfig, client: &Client) -> Self {
        match &config.report_file {
            Some(path) => Self::File(path.clone()),
            None => Self::Remote {
                client: client.clone(),
                config: config.clone(),
            },
        }
    }

    /// Raw report text.
    pub async fn fetch_report(&self) -> Result<String> {
        match self {
            Self::File(path) => {
                debug!(path = %path.display(), "reading HR report from file");
                Ok(tokio::fs::read_to_string(path).await?)
            },
            Self::Remote { client, config } => {
                let token = login(client, config).await?;
                let response = client
                    .get(&config.report_url)
                    .header("Content-Type", "application/json")
                    .header("Authentication", format!("bearer {}", token))
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.text().await?)
            },
        }
    }

    /// Fetch and parse the report.
    pub async fn fetch_records(&self) -> Result<Vec<EmployeeRecord>> {
        let text = self.fetch_report().await?;
        let records = parse_report(&text)?;
        info!(records = records.len(), "HR report loaded");
        Ok(records)
    }
}

async fn login(client: &Client, config: &HrConfig) -> Result<String> {
    let body = LoginRequest {
        credentials: Credentials {
            username: &config.username,
            company: &config.company,
            password: &config.password,
        },
    };

    let response = client
        .post(&config.login_url)
        .header("api-key", config.api_key.as_str())
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(Error::Auth(format!("{}: {}", status, detail.trim())));
    }

    let login: LoginResponse = response
        .json()
        .await
        .map_err(|e| Error::Auth(format!("unreadable login response: {}", e)))?;
    debug!("HR login succeeded");
    Ok(login.token)
}
