use crate::config::HostSettings;
use crate::toolkit::ToolkitError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Mutex;
use std::time::Duration;

/// Carries a serialized call document to the host and returns its reply
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, xml_in: &str) -> Result<String, ToolkitError>;

    /// Drop any open connection; the next call reconnects
    fn disconnect(&self) {}
}

/// XMLSERVICE REST transport (`xmlcgi.pgm`)
///
/// The HTTP client is created on first use and kept until `disconnect`.
pub struct HttpTransport {
    endpoint: String,
    database: String,
    user: String,
    password: String,
    ipc: String,
    ctl: String,
    output_size: u64,
    timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl HttpTransport {
    pub fn from_settings(settings: &HostSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            database: settings.database.clone(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            ipc: settings.ipc.clone(),
            ctl: settings.ctl.clone(),
            output_size: settings.output_size,
            timeout: Duration::from_secs(settings.timeout_secs),
            client: Mutex::new(None),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Return the open client, creating it if none exists
    fn connect(&self) -> Result<Client, ToolkitError> {
        let mut guard = self
            .client
            .lock()
            .map_err(|_| ToolkitError::Connection("connection handle poisoned".into()))?;

        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ToolkitError::Connection(e.to_string()))?;

        tracing::info!("Opened connection to {}", self.endpoint);
        *guard = Some(client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, xml_in: &str) -> Result<String, ToolkitError> {
        let client = self.connect()?;
        let output_size = self.output_size.to_string();

        let form = [
            ("db2", self.database.as_str()),
            ("uid", self.user.as_str()),
            ("pwd", self.password.as_str()),
            ("ipc", self.ipc.as_str()),
            ("ctl", self.ctl.as_str()),
            ("xmlin", xml_in),
            ("xmlout", output_size.as_str()),
        ];

        let response = client.post(&self.endpoint).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(ToolkitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }

    fn disconnect(&self) {
        if let Ok(mut guard) = self.client.lock() {
            if guard.take().is_some() {
                tracing::info!("Closed connection to {}", self.endpoint);
            }
        }
    }
}
