// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk import of credentials from CSV exports.
//!
//! The header row names the columns. The configured location, username and
//! password columns are required; every other column becomes a metadata tag
//! keyed by its header, empty cells included. Header names must be unique.
//! Rows whose location already exists are skipped.

use std::io::Read;

use lockbox_config::ImportConfig;
use lockbox_core::{Credential, LockboxError};
use tracing::{info, warn};

use crate::vault::Vault;

struct ColumnMap {
    location: usize,
    username: usize,
    password: usize,
    meta: Vec<(usize, String)>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord, columns: &ImportConfig) -> Result<Self, LockboxError> {
        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = headers.iter().find(|h| !seen.insert(*h)) {
            return Err(LockboxError::Import(format!(
                "duplicate column `{duplicate}` in CSV header"
            )));
        }

        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| LockboxError::Import(format!("missing column `{name}` in CSV header")))
        };

        let location = position(&columns.location_column)?;
        let username = position(&columns.username_column)?;
        let password = position(&columns.password_column)?;
        let meta = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| ![location, username, password].contains(i))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        Ok(Self {
            location,
            username,
            password,
            meta,
        })
    }

    fn credential(&self, record: &csv::StringRecord) -> (String, Credential) {
        let field = |i: usize| record.get(i).unwrap_or_default();
        let mut credential = Credential::new(field(self.username), field(self.password));
        for (i, key) in &self.meta {
            credential.meta.insert(key.clone(), field(*i).to_string());
        }
        (field(self.location).to_string(), credential)
    }
}

impl Vault {
    /// Import every row of a CSV export, returning how many were added.
    ///
    /// Rows whose location is already present are logged and skipped. Any
    /// other error aborts the import; rows imported before it remain.
    pub fn import_csv<R: Read>(&self, reader: R, columns: &ImportConfig) -> Result<usize, LockboxError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|e| LockboxError::Import(format!("failed to read CSV header: {e}")))?
            .clone();
        let map = ColumnMap::from_headers(&headers, columns)?;

        let mut imported = 0;
        for record in csv_reader.records() {
            let record = record.map_err(|e| LockboxError::Import(format!("malformed CSV row: {e}")))?;
            let (location, credential) = map.credential(&record);
            match self.add(&location, credential) {
                Ok(()) => imported += 1,
                Err(LockboxError::AlreadyExists(location)) => {
                    warn!(location = %location, "skipping CSV row: location already exists");
                }
                Err(e) => return Err(e),
            }
        }

        info!(imported, "CSV import finished");
        Ok(imported)
    }
}
