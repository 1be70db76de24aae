//! Note export bundles, optionally sealed under a password

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CryptoError, Result};
use crate::password_cipher::PasswordCipher;

/// Bundle format written by this version
pub const EXPORT_FORMAT: &str = "1.0";

/// A single exported note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedNote {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Creation time, milliseconds since the Unix epoch
    pub created: i64,
    /// Last modification time, milliseconds since the Unix epoch
    pub last_modified: i64,
}

/// Export file contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    /// Application version that produced the bundle
    pub version: String,
    pub export_format: String,
    pub exported: DateTime<Utc>,
    pub notes: Vec<ExportedNote>,
}

impl ExportBundle {
    /// Bundle `notes`, stamped with the current time
    pub fn new(notes: Vec<ExportedNote>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            export_format: EXPORT_FORMAT.to_string(),
            exported: Utc::now(),
            notes,
        }
    }

    /// Suggested file name, e.g. `ghostpad_export_2026-10-18.json`
    pub fn file_name(&self) -> String {
        format!("ghostpad_export_{}.json", self.exported.format("%Y-%m-%d"))
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON, rejecting unknown bundle formats
    pub fn from_json(json: &str) -> Result<Self> {
        let bundle: Self = serde_json::from_str(json)?;

        if bundle.export_format != EXPORT_FORMAT {
            return Err(CryptoError::MalformedInput(format!(
                "Unsupported export format: {}",
                bundle.export_format
            )));
        }
        Ok(bundle)
    }

    /// Encrypt the JSON form into a password envelope
    pub fn seal(&self, password: &str, cipher: &PasswordCipher) -> Result<String> {
        let envelope = cipher.encrypt(&self.to_json()?, password)?;
        info!("Sealed export of {} notes", self.notes.len());
        Ok(envelope)
    }

    /// Decrypt and parse a sealed bundle
    pub fn unseal(envelope: &str, password: &str, cipher: &PasswordCipher) -> Result<Self> {
        Self::from_json(&cipher.decrypt(envelope, password)?)
    }
}
