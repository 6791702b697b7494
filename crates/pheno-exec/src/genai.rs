use std::sync::OnceLock;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pheno_core::config::AssistantConfig;
use pheno_core::ChatMessage;
use regex::Regex;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::contracts::AssistantReply;
use crate::contracts::Content;
use crate::contracts::GenerateContentRequest;
use crate::contracts::GenerateContentResponse;
use crate::contracts::Part;
use crate::contracts::Tool;

pub const CAPTION_EMPTY: &str = "Just vibing. 🌿";
pub const CAPTION_FAILED: &str = "Focusing on the good times. ✨";
pub const ASSISTANT_EMPTY: &str = "I'm having trouble retrieving that info right now.";
pub const ASSISTANT_FAILED: &str = "I'm taking a quick break. Ask me again in a sec! 🍃";
pub const STRAIN_EMPTY: &str = "Could not generate description.";
pub const STRAIN_FAILED: &str = "The spirits are cloudy today. Try again later.";

const BUDBOT_INSTRUCTION: &str = "You are 'BudBot', the expert AI cannabis sommelier on Phenogram. Your goal is to provide deep, accurate, and vibe-checked analysis of cannabis strains. When asked about a strain, you MUST provide: \n\n1. 🌿 **Effects**: Mental and physical sensation.\n2. 👅 **Flavor & Aroma**: Terpene profile.\n3. 🏥 **Medical Benefits**: Potential relief uses.\n4. 🧬 **Lineage**: Genetics/Parents.\n\nUse emojis. Keep it structured. Disclaimer: This is for informational purposes only, not medical advice.";

const CAPTION_PROMPT: &str = "Write a short, engaging social media caption for this image. If it looks like a plant or cannabis, mention positive vibes, relaxation, or creativity. Keep it under 20 words. Add hashtags.";

#[derive(Debug, Error)]
pub enum GenerativeError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("image is not a base64 data URL")]
    InvalidImage,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Text generation the session leans on. Implementations never fail outward:
/// service errors collapse into fixed fallback strings.
#[async_trait]
pub trait GenerativeText: Send + Sync {
    async fn ask_assistant(&self, history: &[ChatMessage], message: &str) -> AssistantReply;
    async fn caption_for_image(&self, data_url: &str) -> String;
    async fn describe_strain(&self, strain: &str) -> String;
}

/// An image split out of a `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

fn data_url_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^data:(?P<mime>[\w.+-]+/[\w.+-]+);base64,(?P<data>[A-Za-z0-9+/=\s]+)$")
                .ok()
        })
        .as_ref()
}

pub fn parse_data_url(url: &str) -> Result<InlineImage, GenerativeError> {
    let captures = data_url_pattern()
        .and_then(|pattern| pattern.captures(url.trim()))
        .ok_or(GenerativeError::InvalidImage)?;
    let data: String = captures["data"]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    STANDARD
        .decode(&data)
        .map_err(|_| GenerativeError::InvalidImage)?;
    Ok(InlineImage {
        mime_type: captures["mime"].to_string(),
        data,
    })
}

pub struct GeminiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AssistantConfig) -> Result<Self, GenerativeError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerativeError> {
        let api_key = self.api_key.as_deref().ok_or(GenerativeError::MissingApiKey)?;
        debug!(model = %self.model, turns = request.contents.len(), "generateContent");
        let response = self
            .http
            .post(format!("{}/models/{}:generateContent", self.endpoint, self.model))
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }

    async fn chat(
        &self,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<GenerateContentResponse, GenerativeError> {
        let mut contents: Vec<Content> = history.iter().map(Content::from_transcript).collect();
        contents.push(Content::user_text(message));
        self.generate(&GenerateContentRequest {
            contents,
            system_instruction: Some(Content::instruction(BUDBOT_INSTRUCTION)),
            tools: vec![Tool::google_search()],
        })
        .await
    }

    async fn caption(&self, data_url: &str) -> Result<GenerateContentResponse, GenerativeError> {
        let image = parse_data_url(data_url)?;
        self.generate(&GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::inline(image.mime_type, image.data),
                    Part::text(CAPTION_PROMPT),
                ],
            }],
            system_instruction: None,
            tools: Vec::new(),
        })
        .await
    }
}

#[async_trait]
impl GenerativeText for GeminiClient {
    async fn ask_assistant(&self, history: &[ChatMessage], message: &str) -> AssistantReply {
        match self.chat(history, message).await {
            Ok(response) => AssistantReply {
                text: response
                    .text()
                    .unwrap_or_else(|| ASSISTANT_EMPTY.to_string()),
                citations: response.citations(),
            },
            Err(err) => {
                warn!("assistant request failed: {err}");
                AssistantReply {
                    text: ASSISTANT_FAILED.to_string(),
                    citations: Vec::new(),
                }
            }
        }
    }

    async fn caption_for_image(&self, data_url: &str) -> String {
        match self.caption(data_url).await {
            Ok(response) => response.text().unwrap_or_else(|| CAPTION_EMPTY.to_string()),
            Err(err) => {
                warn!("caption generation failed: {err}");
                CAPTION_FAILED.to_string()
            }
        }
    }

    async fn describe_strain(&self, strain: &str) -> String {
        let prompt = format!(
            "Provide a fun, creative, and short description (max 50 words) for a cannabis strain named \"{strain}\". Include typical effects and flavor profile if known, otherwise be creative but realistic. Use emojis."
        );
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            tools: Vec::new(),
        };
        match self.generate(&request).await {
            Ok(response) => response.text().unwrap_or_else(|| STRAIN_EMPTY.to_string()),
            Err(err) => {
                warn!("strain description failed: {err}");
                STRAIN_FAILED.to_string()
            }
        }
    }
}
