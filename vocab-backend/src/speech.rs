use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("GOOGLE_CLOUD_API_KEY not set")]
    MissingKey,
    #[error("Speech recognition failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
struct RecognitionConfig {
    encoding: String,
    #[serde(rename = "sampleRateHertz")]
    sample_rate_hertz: u32,
    #[serde(rename = "languageCode")]
    language_code: String,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Deserialize)]
struct RecognitionAlternative {
    transcript: String,
}

/// Grades a pronunciation attempt by transcribing the recorded audio and
/// comparing it to the expected word.
pub struct SpeechMatcher {
    client: reqwest::Client,
}

impl SpeechMatcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Transcribes PCM 16-bit, 16 kHz WAV audio and checks it against the
    /// expected word. A recording the recognizer can't make anything of is a
    /// mismatch, not an error.
    pub async fn matches(&self, expected: &str, audio: &[u8]) -> Result<bool, SpeechError> {
        let api_key =
            std::env::var("GOOGLE_CLOUD_API_KEY").map_err(|_| SpeechError::MissingKey)?;

        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16".to_string(),
                sample_rate_hertz: 16_000,
                language_code: "en-US".to_string(),
            },
            audio: RecognitionAudio {
                content: base64::engine::general_purpose::STANDARD.encode(audio),
            },
        };

        let url = format!("https://speech.googleapis.com/v1/speech:recognize?key={api_key}");
        let response: RecognizeResponse = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        let transcript = response
            .results
            .first()
            .and_then(|result| result.alternatives.first())
            .map(|alternative| alternative.transcript.as_str())
            .unwrap_or("");
        if transcript.is_empty() {
            return Ok(false);
        }

        Ok(normalize(expected) == normalize(transcript))
    }
}

impl Default for SpeechMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ignores_case_and_whitespace() {
        assert_eq!(normalize("  Ubiquitous "), normalize("ubiquitous"));
        assert_eq!(normalize("HELLO"), "hello");
    }

    #[test]
    fn test_normalize_distinguishes_different_words() {
        assert_ne!(normalize("ephemeral"), normalize("ethereal"));
    }
}
