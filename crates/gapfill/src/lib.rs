mod error;
mod types;

pub use error::Error;
pub use types::{GenerateRequest, GenerateResponse, GenerationConfig};

use types::ApiErrorBody;

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Client for rebuilding the unread remainder of a script after the speaker
/// skipped ahead. The rewrite weaves the essential content of the skipped
/// spans into what is still to be read, so the prompter can keep scrolling a
/// script that matches what the speaker will actually say.
pub struct GapFillClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GapFillClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: Some(api_key.into()),
            base_url: GEMINI_URL.to_string(),
        }
    }

    /// Read the key from `GEMINI_API_KEY`. An absent key is not an error
    /// until a request is attempted, so the rest of the app runs without it.
    pub fn from_env() -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            base_url: GEMINI_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask the model for a rewritten script: `full_script` is the original
    /// text, `spoken_text` what the transcript heard so far, `skipped` the
    /// raw spans the alignment jumped over. Returns the rewritten script.
    pub async fn regenerate(
        &self,
        full_script: &str,
        spoken_text: &str,
        skipped: &[String],
    ) -> Result<String, Error> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(Error::MissingApiKey);
        };

        let prompt = build_prompt(full_script, spoken_text, skipped);
        let request = GenerateRequest::user(
            prompt,
            Some(GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 2000,
            }),
        );

        let url = format!("{}?key={}", self.base_url, key);
        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), %message, "gapfill_request_failed");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .first_text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| Error::MalformedResponse("no generated text in response".into()))
    }
}

fn build_prompt(full_script: &str, spoken_text: &str, skipped: &[String]) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are assisting a live teleprompter. The speaker is reading the \
         script below but has skipped over some parts.\n\n",
    );
    prompt.push_str("Full script:\n");
    prompt.push_str(full_script);
    prompt.push_str("\n\nWhat the speaker has said so far:\n");
    prompt.push_str(spoken_text);
    if !skipped.is_empty() {
        prompt.push_str("\n\nSkipped passages:\n");
        for span in skipped {
            prompt.push_str("- ");
            prompt.push_str(span);
            prompt.push('\n');
        }
    }
    prompt.push_str(
        "\nRewrite the remaining, unread portion of the script so that the \
         essential content of the skipped passages is woven back in. Keep \
         the original tone and language. Return only the rewritten script \
         text, with no commentary.",
    );
    prompt
}
