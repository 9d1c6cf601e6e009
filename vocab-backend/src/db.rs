use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Email already registered")]
    EmailTaken,
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    #[serde(rename = "wordsLearned")]
    pub words_learned: i64,
    pub translations: i64,
    pub pronunciations: i64,
    #[serde(rename = "reviewsCompleted")]
    pub reviews_completed: i64,
}

/// Aggregate counters kept per user. The enum keeps column names out of
/// caller hands; only these four can be incremented.
#[derive(Debug, Clone, Copy)]
pub enum Stat {
    WordsLearned,
    Translations,
    PronunciationsCorrect,
    ReviewsCompleted,
}

impl Stat {
    fn column(self) -> &'static str {
        match self {
            Stat::WordsLearned => "words_learned",
            Stat::Translations => "translations",
            Stat::PronunciationsCorrect => "pronunciations_correct",
            Stat::ReviewsCompleted => "reviews_completed",
        }
    }
}

/// Words with confidence at or above this are considered learned.
const COMPLETED_THRESHOLD: f64 = 0.8;

/// Accounts plus per-user progress, in SQLite. One connection behind a
/// mutex; every call is a single short statement or two.
pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS user_stats (
                user_id INTEGER PRIMARY KEY,
                words_learned INTEGER NOT NULL DEFAULT 0,
                translations INTEGER NOT NULL DEFAULT 0,
                pronunciations_correct INTEGER NOT NULL DEFAULT 0,
                reviews_completed INTEGER NOT NULL DEFAULT 0,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS user_words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                word TEXT NOT NULL,
                language TEXT NOT NULL DEFAULT 'en',
                difficulty INTEGER NOT NULL DEFAULT 1,
                confidence REAL NOT NULL DEFAULT 0.0,
                last_review_at DATETIME,
                status TEXT NOT NULL DEFAULT 'under_review',
                UNIQUE(user_id, word)
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn create_user(&self, name: &str, email: &str, password: &str) -> Result<User, DbError> {
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO users (name, email, password_hash) VALUES (?1, ?2, ?3)",
            params![
                name.trim(),
                email.trim().to_lowercase(),
                hash_password(password)
            ],
        );
        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(DbError::EmailTaken);
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        Ok(User {
            id,
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
        })
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, DbError> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(i64, String, String, String)> = conn
            .query_row(
                "SELECT id, name, email, password_hash FROM users WHERE email = ?1",
                params![email.trim().to_lowercase()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.and_then(|(id, name, email, stored)| {
            if verify_password(&stored, password) {
                Some(User { id, name, email })
            } else {
                None
            }
        }))
    }

    pub fn increment_stat(&self, user_id: i64, stat: Stat, amount: i64) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO user_stats (user_id) VALUES (?1)",
            params![user_id],
        )?;
        // The column name comes from the Stat enum, never from input.
        conn.execute(
            &format!(
                "UPDATE user_stats SET {column} = {column} + ?1, updated_at = CURRENT_TIMESTAMP
                 WHERE user_id = ?2",
                column = stat.column()
            ),
            params![amount, user_id],
        )?;
        Ok(())
    }

    pub fn get_stats(&self, user_id: i64) -> Result<Stats, DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO user_stats (user_id) VALUES (?1)",
            params![user_id],
        )?;
        let stats = conn.query_row(
            "SELECT words_learned, translations, pronunciations_correct, reviews_completed
             FROM user_stats WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(Stats {
                    words_learned: row.get(0)?,
                    translations: row.get(1)?,
                    pronunciations: row.get(2)?,
                    reviews_completed: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }

    /// Registers or refreshes a word for a user. Confidence and status
    /// survive re-learning; only language and difficulty are updated.
    pub fn upsert_user_word(
        &self,
        user_id: i64,
        word: &str,
        language: &str,
        difficulty: u8,
    ) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user_words (user_id, word, language, difficulty)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, word) DO UPDATE SET
                 language = excluded.language,
                 difficulty = excluded.difficulty",
            params![user_id, word, language, difficulty],
        )?;
        Ok(())
    }

    /// Nudges confidence by `delta`, clamped to [0, 1], and flips the word to
    /// `completed` once it crosses the threshold. Returns the new value.
    pub fn update_confidence(
        &self,
        user_id: i64,
        word: &str,
        delta: f64,
    ) -> Result<f64, DbError> {
        let conn = self.conn.lock().unwrap();
        let current: f64 = conn
            .query_row(
                "SELECT confidence FROM user_words WHERE user_id = ?1 AND word = ?2",
                params![user_id, word],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0.0);

        let new_value = (current + delta).clamp(0.0, 1.0);
        let status = if new_value >= COMPLETED_THRESHOLD {
            "completed"
        } else {
            "under_review"
        };
        conn.execute(
            "UPDATE user_words
             SET confidence = ?1, status = ?2, last_review_at = CURRENT_TIMESTAMP
             WHERE user_id = ?3 AND word = ?4",
            params![new_value, status, user_id, word],
        )?;
        Ok(new_value)
    }

    /// Splits a user's words into (still under review, completed).
    pub fn get_review_items(&self, user_id: i64) -> Result<(Vec<String>, Vec<String>), DbError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT word FROM user_words
             WHERE user_id = ?1 AND confidence < ?2
             ORDER BY confidence ASC",
        )?;
        let under_review = stmt
            .query_map(params![user_id, COMPLETED_THRESHOLD], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT word FROM user_words
             WHERE user_id = ?1 AND confidence >= ?2
             ORDER BY last_review_at DESC",
        )?;
        let completed = stmt
            .query_map(params![user_id, COMPLETED_THRESHOLD], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok((under_review, completed))
    }
}

fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{salt}${}", digest(&salt, password))
}

fn verify_password(stored: &str, password: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, hash)) => digest(salt, password) == hash,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}
