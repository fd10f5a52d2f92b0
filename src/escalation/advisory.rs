//! Advisory consultation over an Ollama-compatible `/api/generate` endpoint.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::settings::AdvisorySettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceSource {
    Service,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advice {
    pub text: String,
    pub source: AdviceSource,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct AdvisoryClient {
    client: Client,
    url: String,
    model: String,
    fallback: String,
}

impl AdvisoryClient {
    pub fn new(settings: &AdvisorySettings) -> Result<Self> {
        // The timeout covers connect, send and body read.
        let client = Client::builder()
            .timeout(settings.timeout())
            .no_proxy()
            .build()
            .context("failed to build advisory HTTP client")?;

        Ok(Self {
            client,
            url: format!("{}/api/generate", settings.endpoint.trim_end_matches('/')),
            model: settings.model.clone(),
            fallback: settings.fallback_message.clone(),
        })
    }

    /// Never fails: any transport, status or parse error yields the fallback.
    pub async fn consult(&self, prompt: &str) -> Advice {
        match self.request(prompt).await {
            Ok(text) => {
                log::info!("Advisory response: {text}");
                Advice {
                    text,
                    source: AdviceSource::Service,
                }
            }
            Err(err) => {
                log::warn!("Advisory service unavailable ({err:#}); using fallback");
                Advice {
                    text: self.fallback.clone(),
                    source: AdviceSource::Fallback,
                }
            }
        }
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "model": self.model,
            "prompt": format!("As a doctor, advise: {prompt}"),
            "stream": false,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| anyhow!("advisory request failed: {err}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("advisory service returned {status}");
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| anyhow!("invalid advisory response: {err}"))?;

        let text = body.response.trim();
        if text.is_empty() {
            bail!("advisory response was empty");
        }
        Ok(text.to_string())
    }
}
