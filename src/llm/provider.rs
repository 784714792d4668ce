use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Closed set of supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    OpenAi,
    Claude,
    Groq,
}

/// Request/response layout spoken by a provider's HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `choices[0].message.content`, bearer auth.
    ChatCompletions,
    /// `content[0].text`, `x-api-key` auth.
    AnthropicMessages,
}

impl ProviderName {
    pub const ALL: [ProviderName; 3] = [ProviderName::OpenAi, ProviderName::Claude, ProviderName::Groq];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::OpenAi => "openai",
            ProviderName::Claude => "claude",
            ProviderName::Groq => "groq",
        }
    }

    pub fn wire_format(&self) -> WireFormat {
        match self {
            ProviderName::OpenAi | ProviderName::Groq => WireFormat::ChatCompletions,
            ProviderName::Claude => WireFormat::AnthropicMessages,
        }
    }

    /// Prefix of the environment variables holding this provider's settings.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ProviderName::OpenAi => "OPENAI",
            ProviderName::Claude => "ANTHROPIC",
            ProviderName::Groq => "GROQ",
        }
    }

    pub fn default_api_url(&self) -> &'static str {
        match self {
            ProviderName::OpenAi => "https://api.openai.com/v1/chat/completions",
            ProviderName::Claude => "https://api.anthropic.com/v1/messages",
            ProviderName::Groq => "https://api.groq.com/openai/v1/chat/completions",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderName::OpenAi => "gpt-3.5-turbo",
            ProviderName::Claude => "claude-3-opus-20240229",
            ProviderName::Groq => "gemma2-9b-it",
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            ProviderName::OpenAi => 1000,
            ProviderName::Claude => 1024,
            ProviderName::Groq => 800,
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LLM provider '{}' is not supported", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for ProviderName {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ProviderName::ALL
            .into_iter()
            .find(|provider| provider.as_str() == normalized)
            .ok_or(UnknownProvider(normalized))
    }
}
