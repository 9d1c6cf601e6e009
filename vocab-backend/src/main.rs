use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use word_engine::{EngineError, WordTracker};

mod db;
mod enrich;
mod speech;
mod translate;
mod word_of_day;

use db::{Db, DbError, Stat, Stats, User};
use enrich::{Enrichment, WordEnricher, WordOfTheDay};
use speech::SpeechMatcher;
use translate::Translator;
use word_of_day::WordOfDayCache;

#[derive(Clone)]
struct AppState {
    tracker: Arc<WordTracker>,
    db: Arc<Db>,
    enricher: Arc<WordEnricher>,
    translator: Arc<Translator>,
    speech: Arc<SpeechMatcher>,
    word_of_day: Arc<WordOfDayCache>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn error_response(message: impl Into<String>, status: StatusCode) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn engine_error(e: EngineError) -> ApiError {
    error_response(e.to_string(), StatusCode::BAD_REQUEST)
}

fn db_error(e: DbError) -> ApiError {
    match e {
        DbError::EmailTaken => error_response(e.to_string(), StatusCode::BAD_REQUEST),
        DbError::Sqlite(_) => {
            log::error!("database error: {e}");
            error_response("Server error", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let name = request.name.trim();
    let email = request.email.trim();
    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(error_response(
            "Missing required fields: name, email, password",
            StatusCode::BAD_REQUEST,
        ));
    }
    let user = state
        .db
        .create_user(name, email, &request.password)
        .map_err(db_error)?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<User>, ApiError> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(error_response(
            "Missing required fields: email, password",
            StatusCode::BAD_REQUEST,
        ));
    }
    match state
        .db
        .authenticate(email, &request.password)
        .map_err(db_error)?
    {
        Some(user) => Ok(Json(user)),
        None => Err(error_response(
            "Invalid credentials",
            StatusCode::UNAUTHORIZED,
        )),
    }
}

#[derive(Deserialize)]
struct ProcessWordRequest {
    word: String,
    language: String,
    user_id: Option<i64>,
}

/// Enrich a word through the language model and track it for review.
async fn process_word(
    State(state): State<AppState>,
    Json(request): Json<ProcessWordRequest>,
) -> Result<Json<Enrichment>, ApiError> {
    if request.word.is_empty() || request.language.is_empty() {
        return Err(error_response(
            "Word and language must not be empty",
            StatusCode::BAD_REQUEST,
        ));
    }

    let enrichment = state
        .enricher
        .enrich(&request.word, &request.language)
        .await
        .map_err(|e| {
            log::error!("enrichment failed for {:?}: {e}", request.word);
            error_response(e.to_string(), StatusCode::BAD_REQUEST)
        })?;

    state
        .tracker
        .learn_word(
            &request.word,
            &request.language,
            &enrichment.definition,
            enrichment.difficulty,
        )
        .map_err(engine_error)?;

    if let Some(user_id) = request.user_id {
        state
            .db
            .upsert_user_word(user_id, &request.word, &request.language, enrichment.difficulty)
            .map_err(db_error)?;
        state
            .db
            .increment_stat(user_id, Stat::WordsLearned, 1)
            .map_err(db_error)?;
    }

    Ok(Json(enrichment))
}

#[derive(Deserialize)]
struct TranslateRequest {
    word: String,
    target_language: String,
    user_id: Option<i64>,
}

#[derive(Serialize)]
struct TranslateResponse {
    translation: String,
}

/// Translate a word, then track it like any other learned word so it shows
/// up in reviews and the difficulty listing.
async fn translate_word(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    if request.word.is_empty() || request.target_language.is_empty() {
        return Err(error_response(
            "Word and target language must not be empty",
            StatusCode::BAD_REQUEST,
        ));
    }

    let translation = state
        .translator
        .translate(&request.word, &request.target_language)
        .await
        .map_err(|e| {
            log::error!("translation failed for {:?}: {e}", request.word);
            error_response(e.to_string(), StatusCode::BAD_REQUEST)
        })?;

    let definition = format!("Translated to {}: {translation}", request.target_language);
    state
        .tracker
        .learn_word(&request.word, &request.target_language, &definition, 1)
        .map_err(engine_error)?;

    if let Some(user_id) = request.user_id {
        state
            .db
            .upsert_user_word(user_id, &request.word, &request.target_language, 1)
            .map_err(db_error)?;
        state
            .db
            .increment_stat(user_id, Stat::Translations, 1)
            .map_err(db_error)?;
    }

    Ok(Json(TranslateResponse { translation }))
}

#[derive(Serialize)]
struct PronunciationResponse {
    correct: bool,
}

fn is_wav(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// Grade a recorded pronunciation. Expects a multipart form with a `word`
/// text field and an `audio` WAV file (PCM 16-bit, 16 kHz).
async fn check_pronunciation(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PronunciationResponse>, ApiError> {
    let mut word: Option<String> = None;
    let mut user_id: Option<i64> = None;
    let mut audio: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(format!("Invalid form data: {e}"), StatusCode::BAD_REQUEST)
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "word" => {
                word = Some(field.text().await.map_err(|e| {
                    error_response(format!("Invalid form data: {e}"), StatusCode::BAD_REQUEST)
                })?);
            }
            "user_id" => {
                user_id = field
                    .text()
                    .await
                    .ok()
                    .and_then(|text| text.parse().ok());
            }
            "audio" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    error_response(format!("Invalid form data: {e}"), StatusCode::BAD_REQUEST)
                })?;
                audio = Some((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let word = word.ok_or_else(|| {
        error_response("Missing word parameter", StatusCode::BAD_REQUEST)
    })?;
    let (filename, audio) = audio.ok_or_else(|| {
        error_response("No audio file provided", StatusCode::BAD_REQUEST)
    })?;
    if filename.is_empty() {
        return Err(error_response(
            "No selected audio file",
            StatusCode::BAD_REQUEST,
        ));
    }
    if !is_wav(&filename) {
        return Err(error_response(
            "Invalid file type. Only WAV files are allowed",
            StatusCode::BAD_REQUEST,
        ));
    }

    let correct = state.speech.matches(&word, &audio).await.map_err(|e| {
        log::error!("speech recognition failed for {word:?}: {e}");
        error_response(e.to_string(), StatusCode::BAD_REQUEST)
    })?;

    // Track the word so review and difficulty queries reflect usage.
    state
        .tracker
        .register_if_new(&word, "en", "Pronunciation practice", 1)
        .map_err(engine_error)?;

    if correct {
        if let Some(user_id) = user_id {
            state
                .db
                .increment_stat(user_id, Stat::PronunciationsCorrect, 1)
                .map_err(db_error)?;
        }
    }

    Ok(Json(PronunciationResponse { correct }))
}

#[derive(Serialize)]
struct WordsResponse {
    words: Vec<String>,
}

#[derive(Deserialize)]
struct ReviewQuery {
    user_id: Option<i64>,
}

/// Words currently due for review. Falls back to every tracked word when
/// nothing is due, so the list is never empty for a new user.
async fn review_words(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<WordsResponse>, ApiError> {
    let mut words = state.tracker.due_words(Utc::now());
    if words.is_empty() {
        words = state.tracker.all_words();
    }

    if let Some(user_id) = query.user_id {
        state
            .db
            .increment_stat(user_id, Stat::ReviewsCompleted, 1)
            .map_err(db_error)?;
    }

    Ok(Json(WordsResponse { words }))
}

async fn words_by_difficulty(
    State(state): State<AppState>,
    Path(difficulty): Path<u8>,
) -> Result<Json<WordsResponse>, ApiError> {
    let words = state
        .tracker
        .words_at_difficulty(difficulty)
        .map_err(engine_error)?;
    Ok(Json(WordsResponse { words }))
}

async fn word_of_the_day(
    State(state): State<AppState>,
) -> Result<Json<WordOfTheDay>, ApiError> {
    let today = Utc::now().date_naive();
    if let Some(word) = state.word_of_day.get(today) {
        return Ok(Json(word));
    }

    let word = state.enricher.word_of_the_day(today).await.map_err(|e| {
        log::error!("word of the day generation failed: {e}");
        error_response(e.to_string(), StatusCode::BAD_REQUEST)
    })?;
    state.word_of_day.put(today, word.clone());
    Ok(Json(word))
}

async fn progress_stats(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.db.get_stats(user_id).map_err(db_error)?))
}

#[derive(Deserialize)]
struct ConfidenceRequest {
    user_id: i64,
    word: String,
    delta: f64,
}

#[derive(Serialize)]
struct ConfidenceResponse {
    confidence: f64,
}

/// Record a review outcome: nudge the user's confidence in the word and
/// adjust the word's next review interval.
async fn update_confidence(
    State(state): State<AppState>,
    Json(request): Json<ConfidenceRequest>,
) -> Result<Json<ConfidenceResponse>, ApiError> {
    let confidence = state
        .db
        .update_confidence(request.user_id, &request.word, request.delta)
        .map_err(db_error)?;
    state
        .tracker
        .review_outcome(&request.word, request.delta > 0.0);
    Ok(Json(ConfidenceResponse { confidence }))
}

#[derive(Serialize)]
struct ReviewItemsResponse {
    under_review: Vec<String>,
    completed: Vec<String>,
}

async fn review_items(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<ReviewItemsResponse>, ApiError> {
    let (under_review, completed) = state.db.get_review_items(user_id).map_err(db_error)?;
    Ok(Json(ReviewItemsResponse {
        under_review,
        completed,
    }))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Fail at startup rather than on the first request.
    if std::env::var("OPENAI_API_KEY").is_err() {
        panic!("OPENAI_API_KEY not found in environment variables");
    }

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "users.db".to_string());
    let db = Db::open(&database_path).expect("failed to open database");

    let state = AppState {
        tracker: Arc::new(WordTracker::new()),
        db: Arc::new(db),
        enricher: Arc::new(WordEnricher::from_env()),
        translator: Arc::new(Translator::new()),
        speech: Arc::new(SpeechMatcher::new()),
        word_of_day: Arc::new(WordOfDayCache::new()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(|| async { "Vocabulary backend is running" }))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/process_word", post(process_word))
        .route("/translate", post(translate_word))
        .route("/check_pronunciation", post(check_pronunciation))
        .route("/review_words", get(review_words))
        .route("/words_by_difficulty/{difficulty}", get(words_by_difficulty))
        .route("/word_of_the_day", get(word_of_the_day))
        .route("/progress/stats/{user_id}", get(progress_stats))
        .route("/progress/confidence", post(update_confidence))
        .route("/progress/review_items/{user_id}", get(review_items))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .unwrap();
    log::info!("Listening on port {port}");
    axum::serve(listener, app).await.unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wav_accepts_only_wav_files() {
        assert!(is_wav("recording.wav"));
        assert!(is_wav("RECORDING.WAV"));
        assert!(!is_wav("recording.mp3"));
        assert!(!is_wav("recording"));
        assert!(!is_wav("wav"));
    }
}
