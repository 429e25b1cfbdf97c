use anyhow::{Context, Result};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

use crate::types::Config;

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config() -> Result<Config> {
    load_config_with_env(&SystemEnvironment)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    let defaults = Config::default();

    let namespace = env
        .get_var("KUBE_NAMESPACE")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let response_timeout = match env.get_var("RESPONSE_TIMEOUT_SECS") {
        Some(raw) => {
            let secs: u64 = raw.trim().parse().context("Invalid RESPONSE_TIMEOUT_SECS")?;
            // a zero deadline would expire every list call before it returns
            if secs == 0 {
                warn!("RESPONSE_TIMEOUT_SECS=0, using {:?}", defaults.response_timeout);
                defaults.response_timeout
            } else {
                Duration::from_secs(secs)
            }
        }
        None => defaults.response_timeout,
    };

    let collection_interval = env
        .get_var("COLLECTION_INTERVAL_SECS")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(defaults.collection_interval);

    let resource_include = env.get_var("RESOURCE_INCLUDE").map(|v| parse_list(&v)).unwrap_or_default();
    let resource_exclude = env.get_var("RESOURCE_EXCLUDE").map(|v| parse_list(&v)).unwrap_or_default();
    let selector_include = env.get_var("SELECTOR_INCLUDE").map(|v| parse_list(&v)).unwrap_or_default();
    // unset keeps the reject-all default; an empty value clears it
    let selector_exclude = env
        .get_var("SELECTOR_EXCLUDE")
        .map(|v| parse_list(&v))
        .unwrap_or(defaults.selector_exclude);

    Ok(Config {
        namespace,
        response_timeout,
        collection_interval,
        resource_include,
        resource_exclude,
        selector_include,
        selector_exclude,
    })
}
