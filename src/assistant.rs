//! Assistant client: one stateless request/response round trip against a
//! hosted text-generation endpoint. Fails soft — the public surface always
//! returns text, never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::core::config::AssistantConfig;
use crate::core::errors::BridgeError;

/// Returned when no API credential is configured.
pub const UNAVAILABLE_MESSAGE: &str = "I'm sorry, my connection to the AI brain is currently \
     unavailable. Please check your API key configuration.";

/// Returned when the endpoint call fails for any reason.
pub const ERROR_MESSAGE: &str = "I encountered an error while thinking. Please try again later.";

/// Returned when the endpoint answers with no usable text.
pub const EMPTY_RESPONSE_MESSAGE: &str = "I couldn't process that request right now.";

/// Greeting seeding every new transcript.
pub const GREETING: &str = "Hi! I'm the VoltBridge assistant. Ask me anything about bridging \
     assets between Base and Solana.";

const SYSTEM_INSTRUCTION: &str = "You are an expert crypto bridge assistant for a DApp \
connecting Base (L2) and Solana.\n\
Your goal is to help users understand how to bridge assets, explain fees, gas costs, and \
transaction times.\n\n\
Key Info:\n\
- Base: Ethereum L2, low fees, uses ETH for gas.\n\
- Solana: High throughput, uses SOL for gas.\n\
- Bridge Process: Requires 2 transactions (Source approval + Destination claim) or 1 \
transaction via relayer.\n\
- Typical time: 2-15 minutes depending on finality.\n\
- Fees: Network gas + Liquidity Provider fee (~0.05%).\n\n\
Keep answers concise, helpful, and friendly. Do not give financial advice.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of the conversation. Append-only, in-memory only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered transcript, seeded with a greeting. Not transmitted to the
/// endpoint — every call is independent of prior turns.
#[derive(Debug, Clone, Default)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        let mut transcript = Self { messages: Vec::new() };
        transcript.push(ChatRole::Model, GREETING);
        transcript
    }

    pub fn push(&mut self, role: ChatRole, text: &str) {
        self.messages.push(ChatMessage { role, text: text.to_string(), timestamp: Utc::now() });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub struct AssistantClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl AssistantClient {
    pub fn new(config: &AssistantConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Sends one utterance and returns the response text. Missing credential
    /// or any failure degrades to a fixed message instead of an error.
    pub async fn ask(&self, utterance: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return UNAVAILABLE_MESSAGE.to_string();
        };

        match self.generate(api_key, utterance).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Assistant call failed: {}", e);
                ERROR_MESSAGE.to_string()
            }
        }
    }

    async fn generate(&self, api_key: &str, utterance: &str) -> Result<String, BridgeError> {
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: SYSTEM_INSTRUCTION.to_string() }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: utterance.to_string() }],
            }],
        };

        let url = format!("{}/models/{}:generateContent?key={}", self.api_url, self.model, api_key);
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BridgeError::AssistantUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::AssistantUnavailable(format!(
                "endpoint returned {}: {}",
                status, body
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::AssistantUnavailable(format!("malformed response: {}", e)))?;

        let text = payload
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts.unwrap_or_default())
            .filter_map(|part| part.text.map(|t| t.trim().to_string()))
            .find(|t| !t.is_empty());

        Ok(text.unwrap_or_else(|| EMPTY_RESPONSE_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_soft_fails() {
        let client = AssistantClient::new(&AssistantConfig::default());
        assert_eq!(client.ask("how long does a bridge take?").await, UNAVAILABLE_MESSAGE);
        assert_eq!(client.ask("").await, UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn test_transcript_seeded_with_greeting() {
        let mut transcript = ChatTranscript::new();
        assert_eq!(transcript.messages().len(), 1);
        assert_eq!(transcript.messages()[0].role, ChatRole::Model);
        assert_eq!(transcript.messages()[0].text, GREETING);

        transcript.push(ChatRole::User, "what are the fees?");
        assert_eq!(transcript.messages().len(), 2);
        assert_eq!(transcript.messages()[1].role, ChatRole::User);
    }
}
