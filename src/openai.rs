use crate::adventure::{DisabledNarrator, GenerationError, NarrativeGenerator, NarrativePrompt};
use crate::config::Config;
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    size: String,
    n: u32,
    /// gpt-image models always answer in base64 and reject this field
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

/// OpenAI chat completions and image generation behind [`NarrativeGenerator`].
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    chat_url: String,
    image_url: String,
    image_model: String,
    image_size: String,
    retry: RetryConfig,
}

impl OpenAiClient {
    pub fn new(config: &Config, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: config.openai_model.clone(),
            chat_url: config.openai_api_url.clone(),
            image_url: config.openai_image_api_url.clone(),
            image_model: config.openai_image_model.clone(),
            image_size: config.adventure_image_size.clone(),
            retry: RetryConfig::generation(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, GenerationError>
    where
        B: Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))
    }

    fn chat_request(&self, prompt: &NarrativePrompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: Some(prompt.system.clone()),
                },
                Message {
                    role: "user".to_string(),
                    content: Some(prompt.user.clone()),
                },
            ],
            max_tokens: 1000,
            temperature: 0.8,
        }
    }

    fn image_request(&self, prompt: &str) -> ImageRequest {
        let response_format = if self.image_model.starts_with("gpt-image") {
            None
        } else {
            Some("b64_json")
        };
        ImageRequest {
            model: self.image_model.clone(),
            prompt: prompt.to_string(),
            size: self.image_size.clone(),
            n: 1,
            response_format,
        }
    }
}

#[async_trait]
impl NarrativeGenerator for OpenAiClient {
    async fn generate_narrative(&self, prompt: &NarrativePrompt) -> Result<String, GenerationError> {
        let request = self.chat_request(prompt);
        let (client, request) = (self, &request);

        let response: ChatResponse = with_retry_if(
            &self.retry,
            "OpenAI chat",
            move || client.post_json(&client.chat_url, request),
            GenerationError::is_retryable,
        )
        .await?;

        // An empty answer is not an error; callers substitute their own text.
        let story = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        debug!("OpenAI returned {} chars of narrative", story.len());
        Ok(story)
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let request = self.image_request(prompt);
        let (client, request) = (self, &request);

        let response: ImageResponse = with_retry_if(
            &self.retry,
            "OpenAI image",
            move || client.post_json(&client.image_url, request),
            GenerationError::is_retryable,
        )
        .await?;

        let encoded = response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.b64_json)
            .ok_or_else(|| GenerationError::InvalidResponse("no image data".to_string()))?;

        STANDARD
            .decode(encoded.trim())
            .map_err(|e| GenerationError::InvalidResponse(format!("invalid base64 image: {}", e)))
    }
}

/// The narrative generator for this deployment: OpenAI when a key is
/// configured, otherwise one that always fails.
pub fn narrator_from_config(config: &Config) -> Arc<dyn NarrativeGenerator> {
    match &config.openai_api_key {
        Some(key) => {
            info!("Adventure narration via OpenAI model {}", config.openai_model);
            Arc::new(OpenAiClient::new(config, key))
        }
        None => {
            info!("OPENAI_API_KEY not set, adventure will serve fallback text");
            Arc::new(DisabledNarrator)
        }
    }
}
