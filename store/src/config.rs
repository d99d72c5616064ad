use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Storage bucket holding internal testing screenshots.
pub const TESTING_IMAGES_BUCKET: &str = "testing-images";

const URL_VARS: [&str; 2] = ["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];
const ANON_KEY_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"];

const PLACEHOLDER_URL: &str = "https://placeholder.supabase.co";
const PLACEHOLDER_KEY: &str = "placeholder-key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout: Duration,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: PLACEHOLDER_URL.to_string(),
            anon_key: PLACEHOLDER_KEY.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SupabaseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the endpoint and anon key from the environment (and `.env`),
    /// keeping the placeholders for anything unset.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Some(url) = first_env(&URL_VARS) {
            config.url = url;
        }
        if let Some(key) = first_env(&ANON_KEY_VARS) {
            config.anon_key = key;
        }
        config
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_anon_key(mut self, anon_key: impl Into<String>) -> Self {
        self.anon_key = anon_key.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.url == PLACEHOLDER_URL || self.anon_key == PLACEHOLDER_KEY
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Supabase URL cannot be empty".to_string());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("Supabase URL must start with http:// or https://".to_string());
        }

        if self.anon_key.trim().is_empty() {
            return Err("Anon key cannot be empty".to_string());
        }

        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}
