use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::columns::{ColumnPrefs, INDEX_COLUMN};
use crate::domain::RowedError;
use crate::store::RecordStore;

/// Server response for `POST /save`.
#[derive(Debug, PartialEq, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum SaveOutcome {
    Saved,
    /// The server answered but did not accept the data. Carries the
    /// message to surface to the user.
    Rejected(String),
}

/// Thin wrapper around the two HTTP endpoints. Round trips are blocking,
/// single shot, without retries, matching the single actor event loop.
pub struct Gateway {
    client: Client,
    server: String,
}

impl Gateway {
    pub fn new(server: impl Into<String>) -> Self {
        Gateway {
            client: Client::new(),
            server: server.into(),
        }
    }

    /// `GET {server}/data` -> ordered record array.
    pub fn fetch_records(&self) -> Result<RecordStore, RowedError> {
        let url = format!("{}/data", self.server);
        debug!("Fetching records from {}", url);
        let value: Value = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .json()?;
        let rows = rows_from_json(value)?;
        info!("Fetched {} records from {}", rows.len(), url);
        Ok(RecordStore::from_rows(rows))
    }

    /// The application stays usable without a reachable server.
    pub fn fallback_store(&self) -> RecordStore {
        warn!("Using built-in fallback dataset");
        RecordStore::from_rows(fallback_rows())
    }

    /// `POST {server}/save` with the full ordered record array. The store
    /// is serialized with the ordinal column rewritten to the current
    /// 1-based store position and the remaining fields in preference order.
    pub fn save_records(
        &self,
        store: &RecordStore,
        prefs: &ColumnPrefs,
    ) -> Result<SaveOutcome, RowedError> {
        let url = format!("{}/save", self.server);
        let payload = store_to_json(store, prefs);
        debug!("Saving {} records to {}", store.len(), url);
        // The server reports errors in the body, status codes stay relevant
        // only when no body can be decoded.
        let response: SaveResponse = self.client.post(&url).json(&payload).send()?.json()?;
        Ok(save_outcome(response))
    }
}

pub fn save_outcome(response: SaveResponse) -> SaveOutcome {
    if response.status == "success" {
        SaveOutcome::Saved
    } else {
        SaveOutcome::Rejected(
            response
                .message
                .unwrap_or_else(|| format!("server answered with status {:?}", response.status)),
        )
    }
}

/// Turns the `/data` JSON array into field rows. Values are stringified,
/// the ordinal field is dropped (it is recomputed at render time).
pub fn rows_from_json(value: Value) -> Result<Vec<Vec<(String, String)>>, RowedError> {
    let Value::Array(items) = value else {
        return Err(RowedError::LoadingFailed(
            "expected a JSON array of records".to_string(),
        ));
    };
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(fields) = item else {
            return Err(RowedError::LoadingFailed(
                "expected every record to be a JSON object".to_string(),
            ));
        };
        rows.push(
            fields
                .into_iter()
                .filter(|(name, _)| name != INDEX_COLUMN)
                .map(|(name, value)| (name, stringify(&value)))
                .collect(),
        );
    }
    Ok(rows)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Serializes the store for `/save`: per record the ordinal first, then the
/// fields in column preference order, then any field the preferences do
/// not know about (nothing gets lost on a round trip).
pub fn store_to_json(store: &RecordStore, prefs: &ColumnPrefs) -> Value {
    let preferred: Vec<&str> = prefs
        .columns()
        .iter()
        .map(|c| c.name.as_str())
        .filter(|n| *n != INDEX_COLUMN)
        .collect();

    let records: Vec<Value> = store
        .records()
        .iter()
        .enumerate()
        .map(|(pos, record)| {
            let mut fields = Map::new();
            fields.insert(INDEX_COLUMN.to_string(), json!(pos + 1));
            for name in &preferred {
                if let Some(value) = record.get(name) {
                    fields.insert(name.to_string(), Value::String(value.to_string()));
                }
            }
            for (name, value) in record.fields() {
                if !fields.contains_key(name) {
                    fields.insert(name.clone(), Value::String(value.clone()));
                }
            }
            Value::Object(fields)
        })
        .collect();
    Value::Array(records)
}

/// Small built-in dataset so the editor degrades to a visible, usable
/// state when `/data` is unreachable.
pub fn fallback_rows() -> Vec<Vec<(String, String)>> {
    let rows = [
        ("Ada Lovelace", "ada@example.com", "London", "Analyst"),
        ("Grace Hopper", "grace@example.com", "Arlington", "Rear Admiral"),
        ("Alan Turing", "alan@example.com", "Wilmslow", "Logician"),
    ];
    rows.iter()
        .map(|(name, email, city, position)| {
            vec![
                ("Name".to_string(), name.to_string()),
                ("Email".to_string(), email.to_string()),
                ("City".to_string(), city.to_string()),
                ("Position".to_string(), position.to_string()),
            ]
        })
        .collect()
}
