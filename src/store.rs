//! SQLite-backed storage for translation records and the TTS audio cache.
//!
//! The store owns every persisted `TranslationRecord`. The connection sits
//! behind an `Arc<Mutex<_>>`; each method takes the lock for the duration of
//! one statement, so no lock is ever held across a remote inference call.
//! Concurrent writers may insert duplicate rows for the same (src, dst,
//! text) tuple; that is tolerated, later lookups converge on the newest
//! eligible row.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// A persisted translation, including the human-review flags that gate its
/// reuse as cache.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRecord {
    pub id: i64,
    pub src_text: String,
    pub dst_text: String,
    pub src_lang_code: String,
    pub dst_lang_code: String,
    pub model_name: Option<String>,
    pub model_version: Option<String>,
    pub correct: Option<bool>,
    pub validated: Option<bool>,
    pub feedback: Option<bool>,
    pub suggestion: Option<String>,
    pub user: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields of a fresh, unreviewed translation row. Review flags start unset;
/// only the separate review workflow mutates them.
#[derive(Debug, Clone)]
pub struct NewTranslationRecord<'a> {
    pub src_text: &'a str,
    pub dst_text: &'a str,
    pub src_lang_code: &'a str,
    pub dst_lang_code: &'a str,
    pub model_name: Option<&'a str>,
    pub model_version: Option<&'a str>,
    pub user: Option<&'a str>,
}

/// A cached TTS rendering: base64 of the little-endian f32 waveform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsCacheEntry {
    pub audio_b64: String,
    pub model_name: String,
    pub model_version: String,
}

#[derive(Clone)]
pub struct TranslationStore {
    conn: Arc<Mutex<Connection>>,
}

impl TranslationStore {
    /// Open (or create) the database and ensure the schema exists.
    pub fn new(database_path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(database_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS translation_pairs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                src_text TEXT NOT NULL,
                dst_text TEXT NOT NULL,
                src_lang_code TEXT NOT NULL,
                dst_lang_code TEXT NOT NULL,
                model_name TEXT,
                model_version TEXT,
                correct INTEGER,
                validated INTEGER,
                feedback INTEGER,
                suggestion TEXT,
                user TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_pairs_cache
             ON translation_pairs (src_lang_code, created_at DESC)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tts_cache (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                lang_code TEXT NOT NULL,
                audio_b64 TEXT NOT NULL,
                model_name TEXT NOT NULL,
                model_version TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a fresh translation row and return it as stored.
    pub fn insert(
        &self,
        record: NewTranslationRecord<'_>,
    ) -> Result<TranslationRecord, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO translation_pairs
                (src_text, dst_text, src_lang_code, dst_lang_code,
                 model_name, model_version, user, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                record.src_text,
                record.dst_text,
                record.src_lang_code,
                record.dst_lang_code,
                record.model_name,
                record.model_version,
                record.user,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Ok(TranslationRecord {
            id,
            src_text: record.src_text.to_string(),
            dst_text: record.dst_text.to_string(),
            src_lang_code: record.src_lang_code.to_string(),
            dst_lang_code: record.dst_lang_code.to_string(),
            model_name: record.model_name.map(str::to_string),
            model_version: record.model_version.map(str::to_string),
            correct: None,
            validated: None,
            feedback: None,
            suggestion: None,
            user: record.user.map(str::to_string),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Candidate rows for cache resolution: human-validated rows whose
    /// source language is one of the requested pair and whose source or
    /// destination text matches case-insensitively, newest first.
    ///
    /// This is the coarse store-level filter; the resolver applies its own
    /// membership check on top. The two layers are intentionally kept
    /// separate.
    pub fn cache_candidates(
        &self,
        src_lang_code: &str,
        dst_lang_code: &str,
        text: &str,
    ) -> Result<Vec<TranslationRecord>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, src_text, dst_text, src_lang_code, dst_lang_code,
                    model_name, model_version, correct, validated, feedback,
                    suggestion, user, created_at, updated_at
             FROM translation_pairs
             WHERE correct = 1
               AND validated = 1
               AND src_lang_code IN (?1, ?2)
               AND (lower(src_text) = lower(?3) OR lower(dst_text) = lower(?3))
             ORDER BY created_at DESC, id DESC",
        )?;

        let records = stmt
            .query_map(params![src_lang_code, dst_lang_code, text], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Fetch one row by id.
    pub fn get(&self, id: i64) -> Result<Option<TranslationRecord>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, src_text, dst_text, src_lang_code, dst_lang_code,
                    model_name, model_version, correct, validated, feedback,
                    suggestion, user, created_at, updated_at
             FROM translation_pairs WHERE id = ?1",
            params![id],
            row_to_record,
        )
        .optional()
    }

    /// Set the human-review flags on a row. Used by the review workflow,
    /// never by the translation path.
    pub fn set_review(
        &self,
        id: i64,
        correct: Option<bool>,
        validated: Option<bool>,
    ) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE translation_pairs
             SET correct = ?1, validated = ?2, updated_at = ?3
             WHERE id = ?4",
            params![correct, validated, now, id],
        )?;
        Ok(())
    }

    /// Number of persisted translation rows.
    pub fn pair_count(&self) -> Result<usize, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM translation_pairs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Newest cached TTS rendering for (text, lang), matched on lowercase
    /// text like the translation cache.
    pub fn get_tts(
        &self,
        text: &str,
        lang_code: &str,
    ) -> Result<Option<TtsCacheEntry>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT audio_b64, model_name, model_version
             FROM tts_cache
             WHERE lower(text) = lower(?1) AND lang_code = ?2
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
            params![text, lang_code],
            |row| {
                Ok(TtsCacheEntry {
                    audio_b64: row.get(0)?,
                    model_name: row.get(1)?,
                    model_version: row.get(2)?,
                })
            },
        )
        .optional()
    }

    /// Store a TTS rendering for later reuse.
    pub fn put_tts(
        &self,
        text: &str,
        lang_code: &str,
        audio_b64: &str,
        model_name: &str,
        model_version: &str,
    ) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO tts_cache (text, lang_code, audio_b64, model_name, model_version, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![text, lang_code, audio_b64, model_name, model_version, now],
        )?;
        Ok(())
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<TranslationRecord, rusqlite::Error> {
    Ok(TranslationRecord {
        id: row.get(0)?,
        src_text: row.get(1)?,
        dst_text: row.get(2)?,
        src_lang_code: row.get(3)?,
        dst_lang_code: row.get(4)?,
        model_name: row.get(5)?,
        model_version: row.get(6)?,
        correct: row.get(7)?,
        validated: row.get(8)?,
        feedback: row.get(9)?,
        suggestion: row.get(10)?,
        user: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}
