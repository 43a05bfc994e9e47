//! Seed dictionary import
//!
//! The seed file is a JSON list of records shaped like
//! `{"model": "Word", "fields": {"ru_word": "кот", "en_word": "cat", "user_id": 1}}`
//! or `{"model": "User", "fields": {"username": 1}}`. Word pairs are added to the
//! dictionary of the designated seed user, which is what "all words" studies.

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::postgres::PgPool;
use tracing::{info, warn};

use crate::db::{self, InsertOutcome, Language};
use crate::errors::error_logging;
use crate::validation::validate_word;

/// One record of the seed file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "model", content = "fields")]
pub enum SeedRecord {
    User {
        username: i64,
    },
    Word {
        ru_word: String,
        en_word: String,
        /// Who originally contributed the pair; informational only
        #[serde(default)]
        user_id: Option<i64>,
    },
}

/// Totals reported after an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub users: usize,
    pub added: usize,
    pub duplicates: usize,
    pub failed: usize,
}

/// Parse the seed file into records
///
/// The outer list must be valid JSON; each record is decoded on its own so a
/// single malformed entry does not discard the rest.
pub fn parse_seed_records(content: &str) -> Result<Vec<Result<SeedRecord, serde_json::Error>>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(content).context("Seed file is not a JSON list")?;

    Ok(values.into_iter().map(serde_json::from_value).collect())
}

/// Import a seed dictionary, logging the outcome of every record
///
/// Never fails: unreadable files and bad records are logged and skipped.
pub async fn import_seed_dictionary(pool: &PgPool, path: &str, user_external_id: i64) -> ImportReport {
    let mut report = ImportReport::default();

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            error_logging::log_internal_error(&e, "seed", "read_seed_file", None);
            return report;
        }
    };

    let records = match parse_seed_records(&content) {
        Ok(records) => records,
        Err(e) => {
            error_logging::log_internal_error(&e, "seed", "parse_seed_file", None);
            return report;
        }
    };

    info!(path = %path, records = records.len(), "Importing seed dictionary");

    for (index, record) in records.into_iter().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed seed record");
                report.failed += 1;
                continue;
            }
        };

        match record {
            SeedRecord::User { username } => match db::get_or_create_user(pool, username).await {
                Ok(Some(_)) => report.users += 1,
                Ok(None) => {
                    warn!(index, username, "Seed user could not be created");
                    report.failed += 1;
                }
                Err(e) => {
                    error_logging::log_database_error(&e, "seed_user", Some(username), None);
                    report.failed += 1;
                }
            },
            SeedRecord::Word {
                ru_word,
                en_word,
                user_id,
            } => {
                let pair = validate_word(&ru_word, Language::Russian)
                    .and_then(|ru| validate_word(&en_word, Language::English).map(|en| (ru, en)));
                let (ru, en) = match pair {
                    Ok(pair) => pair,
                    Err(key) => {
                        error_logging::log_validation_error(
                            &key,
                            "seed_word",
                            user_id,
                            "word_pair",
                            Some(&format!("{} - {}", ru_word, en_word)),
                        );
                        report.failed += 1;
                        continue;
                    }
                };

                match db::add_word_pair(pool, user_external_id, &ru, &en).await {
                    Ok(InsertOutcome::Created(_)) => report.added += 1,
                    Ok(InsertOutcome::AlreadyExists) => report.duplicates += 1,
                    Ok(InsertOutcome::Rejected) => {
                        warn!(index, ru = %ru, en = %en, "Seed pair rejected by the database");
                        report.failed += 1;
                    }
                    Err(e) => {
                        error_logging::log_database_error(
                            &e,
                            "seed_word",
                            Some(user_external_id),
                            Some(&[
                                ("ru", &ru as &dyn std::fmt::Display),
                                ("en", &en as &dyn std::fmt::Display),
                            ]),
                        );
                        report.failed += 1;
                    }
                }
            }
        }
    }

    info!(
        users = report.users,
        added = report.added,
        duplicates = report.duplicates,
        failed = report.failed,
        "Seed dictionary import finished"
    );
    report
}
