use crate::error::ProviderError;
use crate::upcycle::config::ProviderConfig;
use crate::upcycle::prompt::GenerateOptions;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use std::env;
use std::time::Duration;

const OPENAI_RESPONSES_URL: &str = "https://api.openai.com/v1/responses";
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const HUGGINGFACE_BASE_URL: &str = "https://api-inference.huggingface.co/models";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";
const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
const OPENAI_BASE_URL: &str = "https://api.openai.com";
const OPENROUTER_REFERER: &str = "http://localhost:3000";
const OPENROUTER_TITLE: &str = "Waste Upcycle";

/// One generative-text backend. Implementations issue a single HTTP call and
/// return the raw text payload; they never retry.
pub trait SuggestionProvider {
    fn label(&self) -> &'static str;
    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, ProviderError>;
}

pub struct GeminiProvider {
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

pub struct OpenAiProvider {
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

pub struct AnthropicProvider {
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

pub struct OpenAiCompatProvider {
    pub label: &'static str,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub extra_headers: Vec<(&'static str, String)>,
    pub timeout_secs: u64,
}

pub struct HuggingFaceProvider {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Anthropic,
    OpenAiCompatible,
    OpenRouter,
    HuggingFace,
}

impl ProviderKind {
    pub fn label(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAiCompatible => "openai-compatible",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::HuggingFace => "huggingface",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteModelConfig {
    pub kind: ProviderKind,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

pub fn is_disabled_name(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "local" | "off" | "none" | "disabled"
    )
}

pub fn parse_provider_alias(raw: &str) -> Option<ProviderKind> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "gemini" | "google" => Some(ProviderKind::Gemini),
        "openai" => Some(ProviderKind::OpenAi),
        "anthropic" | "claude" => Some(ProviderKind::Anthropic),
        "openai-compatible" | "compatible" | "deepseek" => Some(ProviderKind::OpenAiCompatible),
        "openrouter" => Some(ProviderKind::OpenRouter),
        "huggingface" | "hf" => Some(ProviderKind::HuggingFace),
        _ => None,
    }
}

pub fn parse_prefixed_model(raw: &str) -> (Option<ProviderKind>, String) {
    let trimmed = raw.trim();
    if let Some((prefix, model)) = trimmed.split_once(':')
        && let Some(kind) = parse_provider_alias(prefix)
    {
        return (Some(kind), model.trim().to_string());
    }
    (None, trimmed.to_string())
}

pub fn infer_provider_from_model(model: &str) -> Option<ProviderKind> {
    let lower = model.trim().to_ascii_lowercase();
    if lower.starts_with("deepseek-") {
        return Some(ProviderKind::OpenAiCompatible);
    }
    if lower.starts_with("claude-") {
        return Some(ProviderKind::Anthropic);
    }
    if lower.starts_with("gemini-") {
        return Some(ProviderKind::Gemini);
    }
    if lower.starts_with("gpt-")
        || lower.starts_with("o1")
        || lower.starts_with("o3")
        || lower.starts_with("o4")
    {
        return Some(ProviderKind::OpenAi);
    }
    // OpenRouter model slugs are `vendor/model`.
    if lower.contains('/') {
        return Some(ProviderKind::OpenRouter);
    }
    None
}

pub fn default_model_for_provider(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Gemini => "gemini-2.5-flash-lite",
        ProviderKind::OpenAi => "gpt-4.1-mini",
        ProviderKind::Anthropic => "claude-3-5-haiku-latest",
        ProviderKind::OpenAiCompatible => "deepseek-chat",
        ProviderKind::OpenRouter => "anthropic/claude-3.5-sonnet",
        ProviderKind::HuggingFace => "mistralai/Mistral-7B-Instruct-v0.3",
    }
}

fn first_available_provider<F>(lookup: &F) -> Option<ProviderKind>
where
    F: Fn(&str) -> Option<String>,
{
    if lookup("AI_API_KEY").is_some() {
        return Some(ProviderKind::OpenAiCompatible);
    }
    if lookup("OPENAI_API_KEY").is_some() {
        return Some(ProviderKind::OpenAi);
    }
    if lookup("ANTHROPIC_API_KEY").is_some() {
        return Some(ProviderKind::Anthropic);
    }
    if lookup("GEMINI_API_KEY").is_some() {
        return Some(ProviderKind::Gemini);
    }
    if lookup("OPENROUTER_API_KEY").is_some() {
        return Some(ProviderKind::OpenRouter);
    }
    if lookup("HUGGINGFACE_API_KEY").is_some() || lookup("HF_TOKEN").is_some() {
        return Some(ProviderKind::HuggingFace);
    }
    None
}

fn resolve_api_key<F>(kind: ProviderKind, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match kind {
        ProviderKind::Gemini => lookup("GEMINI_API_KEY").or_else(|| lookup("AI_API_KEY")),
        ProviderKind::OpenAi => lookup("OPENAI_API_KEY").or_else(|| lookup("AI_API_KEY")),
        ProviderKind::Anthropic => lookup("ANTHROPIC_API_KEY").or_else(|| lookup("AI_API_KEY")),
        ProviderKind::OpenAiCompatible => lookup("AI_API_KEY")
            .or_else(|| lookup("DEEPSEEK_API_KEY"))
            .or_else(|| lookup("OPENAI_API_KEY")),
        ProviderKind::OpenRouter => lookup("OPENROUTER_API_KEY").or_else(|| lookup("AI_API_KEY")),
        ProviderKind::HuggingFace => lookup("HUGGINGFACE_API_KEY").or_else(|| lookup("HF_TOKEN")),
    }
}

fn resolve_base_url(kind: ProviderKind, configured: Option<&str>, model: &str) -> Option<String> {
    if let Some(base) = configured.map(str::trim).filter(|b| !b.is_empty()) {
        return Some(base.to_string());
    }
    match kind {
        ProviderKind::OpenRouter => Some(OPENROUTER_BASE_URL.to_string()),
        ProviderKind::OpenAiCompatible => {
            if model.trim().to_ascii_lowercase().starts_with("deepseek-") {
                Some(DEEPSEEK_BASE_URL.to_string())
            } else {
                Some(OPENAI_BASE_URL.to_string())
            }
        }
        _ => None,
    }
}

/// Pick the backend for this process. `None` means the provider path is
/// disabled and every run goes straight to the local fallback.
pub fn resolve_remote_config_with<F>(cfg: &ProviderConfig, lookup: F) -> Option<RemoteModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if is_disabled_name(&cfg.name) {
        return None;
    }

    let explicit = parse_provider_alias(&cfg.name);
    let (prefixed, mut model) = cfg
        .model
        .as_deref()
        .map(parse_prefixed_model)
        .unwrap_or((None, String::new()));

    let kind = explicit
        .or(prefixed)
        .or_else(|| infer_provider_from_model(&model))
        .or_else(|| first_available_provider(&lookup))?;

    if model.trim().is_empty() {
        model = default_model_for_provider(kind).to_string();
    }

    let api_key = resolve_api_key(kind, &lookup);
    // Only HuggingFace serves anonymous requests; it still has to be named.
    let anonymous_ok = kind == ProviderKind::HuggingFace && explicit.is_some();
    if api_key.is_none() && !anonymous_ok {
        return None;
    }

    let base_url = resolve_base_url(kind, cfg.base_url.as_deref(), &model);
    Some(RemoteModelConfig {
        kind,
        model,
        api_key,
        base_url,
        timeout_secs: cfg.timeout_secs,
    })
}

fn env_non_empty(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

pub fn resolve_remote_config(cfg: &ProviderConfig) -> Option<RemoteModelConfig> {
    resolve_remote_config_with(cfg, env_non_empty)
}

pub fn build_provider(remote: &RemoteModelConfig) -> Box<dyn SuggestionProvider> {
    let api_key = remote.api_key.clone().unwrap_or_default();
    let model = remote.model.clone();
    let timeout_secs = remote.timeout_secs;
    match remote.kind {
        ProviderKind::Gemini => Box::new(GeminiProvider {
            api_key,
            model,
            timeout_secs,
        }),
        ProviderKind::OpenAi => Box::new(OpenAiProvider {
            api_key,
            model,
            timeout_secs,
        }),
        ProviderKind::Anthropic => Box::new(AnthropicProvider {
            api_key,
            model,
            timeout_secs,
        }),
        ProviderKind::OpenAiCompatible => Box::new(OpenAiCompatProvider {
            label: ProviderKind::OpenAiCompatible.label(),
            api_key,
            model,
            base_url: remote
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            extra_headers: Vec::new(),
            timeout_secs,
        }),
        ProviderKind::OpenRouter => Box::new(OpenAiCompatProvider {
            label: ProviderKind::OpenRouter.label(),
            api_key,
            model,
            base_url: remote
                .base_url
                .clone()
                .unwrap_or_else(|| OPENROUTER_BASE_URL.to_string()),
            extra_headers: vec![
                ("HTTP-Referer", OPENROUTER_REFERER.to_string()),
                ("X-Title", OPENROUTER_TITLE.to_string()),
            ],
            timeout_secs,
        }),
        ProviderKind::HuggingFace => Box::new(HuggingFaceProvider {
            api_key: remote.api_key.clone(),
            model,
            timeout_secs,
        }),
    }
}

fn http_client(provider: &'static str, timeout_secs: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|source| ProviderError::Http { provider, source })
}

fn send_json(
    provider: &'static str,
    timeout_secs: u64,
    request: RequestBuilder,
) -> Result<Value, ProviderError> {
    let response = request.send().map_err(|source| {
        if source.is_timeout() {
            ProviderError::Timeout {
                provider,
                secs: timeout_secs,
            }
        } else {
            ProviderError::Http { provider, source }
        }
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
        });
    }
    let body = response.text().map_err(|source| {
        if source.is_timeout() {
            ProviderError::Timeout {
                provider,
                secs: timeout_secs,
            }
        } else {
            ProviderError::Http { provider, source }
        }
    })?;
    serde_json::from_str(&body).map_err(|err| ProviderError::InvalidBody {
        provider,
        reason: err.to_string(),
    })
}

fn join_chunks(chunks: Vec<String>) -> Option<String> {
    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n"))
    }
}

pub fn extract_gemini_text(json: &Value) -> Option<String> {
    let parts = json
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(|v| v.get("content"))
        .and_then(|v| v.get("parts"))
        .and_then(Value::as_array)?;
    let chunks = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    join_chunks(chunks)
}

pub fn extract_openai_text(json: &Value) -> Option<String> {
    if let Some(text) = json.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let mut chunks = Vec::new();
    let output = json.get("output").and_then(Value::as_array)?;
    for item in output {
        let Some(content) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in content {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                chunks.push(text.to_string());
            }
        }
    }
    join_chunks(chunks)
}

pub fn extract_anthropic_text(json: &Value) -> Option<String> {
    let content = json.get("content").and_then(Value::as_array)?;
    let chunks = content
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    join_chunks(chunks)
}

pub fn extract_openai_compatible_text(json: &Value) -> Option<String> {
    let choices = json.get("choices").and_then(Value::as_array)?;
    let first = choices.first()?;
    let content = first.get("message")?.get("content")?;
    match content {
        Value::String(s) => Some(s.to_string()),
        Value::Array(parts) => {
            let chunks = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            join_chunks(chunks)
        }
        _ => None,
    }
}

pub fn extract_huggingface_text(json: &Value) -> Option<String> {
    let entry = match json {
        Value::Array(items) => items.first()?,
        other => other,
    };
    entry
        .get("generated_text")
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl SuggestionProvider for GeminiProvider {
    fn label(&self) -> &'static str {
        ProviderKind::Gemini.label()
    }

    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, ProviderError> {
        let label = self.label();
        let url = format!(
            "{GEMINI_BASE_URL}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let payload = serde_json::json!({
            "contents": [
                {
                    "parts": [
                        {"text": prompt}
                    ]
                }
            ],
            "generationConfig": {
                "temperature": options.temperature,
                "maxOutputTokens": options.max_tokens
            }
        });

        let client = http_client(label, self.timeout_secs)?;
        let json = send_json(label, self.timeout_secs, client.post(&url).json(&payload))?;
        extract_gemini_text(&json).ok_or(ProviderError::MissingText { provider: label })
    }
}

impl SuggestionProvider for OpenAiProvider {
    fn label(&self) -> &'static str {
        ProviderKind::OpenAi.label()
    }

    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, ProviderError> {
        let label = self.label();
        let payload = serde_json::json!({
            "model": self.model,
            "input": prompt,
            "temperature": options.temperature,
            "max_output_tokens": options.max_tokens
        });

        let client = http_client(label, self.timeout_secs)?;
        let request = client
            .post(OPENAI_RESPONSES_URL)
            .bearer_auth(&self.api_key)
            .json(&payload);
        let json = send_json(label, self.timeout_secs, request)?;
        extract_openai_text(&json).ok_or(ProviderError::MissingText { provider: label })
    }
}

impl SuggestionProvider for AnthropicProvider {
    fn label(&self) -> &'static str {
        ProviderKind::Anthropic.label()
    }

    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, ProviderError> {
        let label = self.label();
        let payload = serde_json::json!({
            "model": self.model,
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let client = http_client(label, self.timeout_secs)?;
        let request = client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload);
        let json = send_json(label, self.timeout_secs, request)?;
        extract_anthropic_text(&json).ok_or(ProviderError::MissingText { provider: label })
    }
}

impl SuggestionProvider for OpenAiCompatProvider {
    fn label(&self) -> &'static str {
        self.label
    }

    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, ProviderError> {
        let label = self.label();
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/v1/chat/completions");
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": options.temperature,
            "max_tokens": options.max_tokens
        });

        let client = http_client(label, self.timeout_secs)?;
        let mut request = client.post(&url).bearer_auth(&self.api_key).json(&payload);
        for (name, value) in &self.extra_headers {
            request = request.header(*name, value);
        }
        let json = send_json(label, self.timeout_secs, request)?;
        extract_openai_compatible_text(&json).ok_or(ProviderError::MissingText { provider: label })
    }
}

impl SuggestionProvider for HuggingFaceProvider {
    fn label(&self) -> &'static str {
        ProviderKind::HuggingFace.label()
    }

    fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, ProviderError> {
        let label = self.label();
        let url = format!("{HUGGINGFACE_BASE_URL}/{}", self.model);
        let payload = serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": options.max_tokens,
                "temperature": options.temperature,
                "return_full_text": false
            }
        });

        let client = http_client(label, self.timeout_secs)?;
        let mut request = client.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let json = send_json(label, self.timeout_secs, request)?;
        extract_huggingface_text(&json).ok_or(ProviderError::MissingText { provider: label })
    }
}
