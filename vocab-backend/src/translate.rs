#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("GOOGLE_TRANSLATE_API_KEY not set")]
    MissingKey,
    #[error("Translation failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Translation returned empty result")]
    Empty,
}

pub struct Translator {
    client: reqwest::Client,
}

impl Translator {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Translates a single word via the Google Translate v2 API. Source
    /// language is auto-detected.
    pub async fn translate(
        &self,
        word: &str,
        target_language: &str,
    ) -> Result<String, TranslateError> {
        let api_key =
            std::env::var("GOOGLE_TRANSLATE_API_KEY").map_err(|_| TranslateError::MissingKey)?;

        let url = format!("https://translation.googleapis.com/language/translate/v2?key={api_key}");
        let value: serde_json::Value = self
            .client
            .post(&url)
            .form(&[("q", word), ("target", target_language), ("format", "text")])
            .send()
            .await?
            .json()
            .await?;

        let translated = value["data"]["translations"][0]["translatedText"]
            .as_str()
            .unwrap_or("")
            .to_string();
        if translated.is_empty() {
            return Err(TranslateError::Empty);
        }
        Ok(translated)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}
