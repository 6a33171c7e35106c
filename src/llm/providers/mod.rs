//! Chat-completion provider implementations.
//!
//! `build(config, api_key)` is the factory, called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod openai_compatible;

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::llm::{ChatCompletion, ProviderError};

/// Construct the configured provider.
///
/// Returns `Ok(None)` for `provider = "none"`: chat is then disabled and
/// `POST /chat` reports the client as not initialised. `api_key` is sourced
/// from `LLM_API_KEY` env (never TOML) and is `None` for keyless models.
pub fn build(
    config: &LlmConfig,
    api_key: Option<String>,
) -> Result<Option<Arc<dyn ChatCompletion>>, ProviderError> {
    match config.provider.as_str() {
        "none" | "disabled" => Ok(None),
        "dummy" => Ok(Some(Arc::new(dummy::DummyProvider))),
        "openai" | "openai-compatible" | "azure" => {
            let oai = &config.openai;
            let p = openai_compatible::OpenAiCompatibleProvider::new(
                oai.api_base_url.clone(),
                oai.temperature,
                oai.connect_timeout_seconds,
                api_key,
                oai.api_key_header.clone(),
            )?;
            Ok(Some(Arc::new(p)))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenAiConfig;

    fn llm(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.into(),
            openai: OpenAiConfig {
                api_base_url: "http://localhost:0/v1/chat/completions".into(),
                model: "test-model".into(),
                temperature: 0.0,
                connect_timeout_seconds: 1,
                api_key_header: None,
            },
        }
    }

    #[test]
    fn none_disables_chat() {
        assert!(build(&llm("none"), None).unwrap().is_none());
    }

    #[test]
    fn dummy_and_openai_build() {
        assert_eq!(build(&llm("dummy"), None).unwrap().unwrap().name(), "dummy");
        let p = build(&llm("openai"), Some("k".into())).unwrap().unwrap();
        assert_eq!(p.name(), "openai");
    }

    #[test]
    fn unknown_provider_errors() {
        let err = build(&llm("mystery"), None).err().unwrap();
        assert!(err.to_string().contains("mystery"));
    }
}
