use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::util::is_local_endpoint_url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let api_url = std::env::var("DATAKI_API_URL")
            .unwrap_or_else(|_| "https://api.dataki.ai/v1/chat".to_string());
        let api_key = std::env::var("DATAKI_API_KEY").ok().and_then(|v| {
            if v.trim().is_empty() {
                None
            } else {
                Some(v)
            }
        });
        let model =
            std::env::var("DATAKI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        Ok(Self {
            api_key,
            model,
            api_url,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            bail!(
                "Invalid DATAKI_API_URL '{}': expected http:// or https:// URL",
                self.api_url
            );
        }

        if self.model.trim().is_empty() {
            bail!("DATAKI_MODEL must not be empty");
        }

        if !self.is_local_endpoint() && self.api_key.is_none() {
            bail!(
                "DATAKI_API_KEY must be set for non-local endpoints (url: '{}')",
                self.api_url
            );
        }

        Ok(())
    }

    fn is_local_endpoint(&self) -> bool {
        is_local_endpoint_url(&self.api_url)
    }
}
