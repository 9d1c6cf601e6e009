use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tysm::chat_completions::ChatClient;

use word_engine::{MAX_DIFFICULTY, MIN_DIFFICULTY};

/// What the model produces for a single vocabulary word.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Enrichment {
    pub definition: String,
    pub sentence: String,
    pub mnemonic: String,
    pub difficulty: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WordOfTheDay {
    pub word: String,
    pub definition: String,
    pub sentence: String,
    pub mnemonic: String,
    pub difficulty: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("Failed to process word: {0}")]
    Request(String),
    #[error("Invalid difficulty value: {0}")]
    Difficulty(u8),
}

/// Wraps the chat-completions client that turns a bare word into a
/// definition, example sentence, mnemonic, and difficulty rating.
pub struct WordEnricher {
    client: ChatClient,
}

impl WordEnricher {
    /// Reads `OPENAI_API_KEY` from the environment; `main` checks the key is
    /// present before constructing this.
    pub fn from_env() -> Self {
        Self {
            client: ChatClient::from_env("gpt-4o").unwrap(),
        }
    }

    pub async fn enrich(&self, word: &str, language: &str) -> Result<Enrichment, EnrichError> {
        let enrichment: Enrichment = self
            .client
            .chat_with_system_prompt(
                format!(
                    "You are a vocabulary learning assistant. The user is studying {language}. \
                     For the given word, provide: a clear, concise definition of the word in \
                     {language}; a natural example sentence using the word in context; a helpful \
                     memory aid or trick to remember the word; and a difficulty from 1 to 5 \
                     based on word complexity. Respond with JSON."
                ),
                format!("word: `{word}`"),
            )
            .await
            .map_err(|e| EnrichError::Request(format!("{e:?}")))?;

        // The model occasionally wanders outside the rating scale.
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&enrichment.difficulty) {
            return Err(EnrichError::Difficulty(enrichment.difficulty));
        }
        Ok(enrichment)
    }

    pub async fn word_of_the_day(&self, date: NaiveDate) -> Result<WordOfTheDay, EnrichError> {
        let word: WordOfTheDay = self
            .client
            .chat_with_system_prompt(
                "You are a vocabulary learning assistant. Pick one interesting, \
                 moderately uncommon English word as the word of the day. Provide the word, a \
                 clear concise definition, a natural example sentence, a helpful mnemonic, and \
                 a difficulty from 1 to 5 based on word complexity. Respond with JSON."
                    .to_string(),
                format!("word of the day for {date}"),
            )
            .await
            .map_err(|e| EnrichError::Request(format!("{e:?}")))?;

        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&word.difficulty) {
            return Err(EnrichError::Difficulty(word.difficulty));
        }
        Ok(word)
    }
}
