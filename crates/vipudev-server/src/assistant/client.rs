//! HTTP client for the hosted assistant provider. One request per call,
//! failures surface to the route layer as-is.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

impl WireMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<WireMessage>,
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

pub struct AssistantClient {
    base_url: String,
    api_key: String,
    chat_model: String,
    image_model: String,
    http_client: reqwest::Client,
}

impl AssistantClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        chat_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            chat_model: chat_model.into(),
            image_model: image_model.into(),
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(600))
                .build()
                .unwrap_or_default(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn images_url(&self) -> String {
        format!("{}/images/generations", self.base_url.trim_end_matches('/'))
    }

    /// Non-streaming chat completion; returns the first choice's content.
    pub async fn chat_completion(
        &self,
        messages: Vec<WireMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        debug!("Requesting chat completion ({} messages)", messages.len());
        let request = ChatCompletionRequest {
            model: self.chat_model.clone(),
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Assistant backend request failed: {}", e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Assistant backend returned {}: {}",
                status,
                body
            ));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse assistant response: {}", e))?;
        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(content)
    }

    /// Generate a single 1024x1024 image and return its URL.
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        debug!("Requesting image generation");
        let request = ImageGenerationRequest {
            model: self.image_model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: "1024x1024".to_string(),
        };

        let response = self
            .http_client
            .post(self.images_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Image backend request failed: {}", e))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Image backend returned {}: {}",
                status,
                body
            ));
        }

        let generated: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse image response: {}", e))?;
        generated
            .data
            .first()
            .and_then(|d| d.url.clone())
            .ok_or_else(|| anyhow::anyhow!("Image backend returned no URL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: String) -> AssistantClient {
        AssistantClient::new(base_url, "test-key", "gpt-4o-mini", "dall-e-3")
    }

    #[tokio::test]
    async fn chat_completion_returns_first_choice_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"hello there"}}]}"#,
            )
            .create_async()
            .await;

        let reply = client(server.url())
            .chat_completion(vec![WireMessage::new("user", "hi")], 0.1, 100)
            .await
            .unwrap();

        assert_eq!(reply, "hello there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn chat_completion_surfaces_backend_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let err = client(server.url())
            .chat_completion(vec![WireMessage::new("user", "hi")], 0.1, 100)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn generate_image_returns_first_url() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/images/generations")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"url":"https://img.example/1.png"}]}"#)
            .create_async()
            .await;

        let url = client(server.url()).generate_image("a cat").await.unwrap();
        assert_eq!(url, "https://img.example/1.png");
    }
}
