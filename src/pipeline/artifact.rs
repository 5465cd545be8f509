//! Artifact naming, staging and decoding.
//!
//! Every stage writes its output to a local staging file first and then
//! uploads that file to the blob store. Keys are `<key folder>/<stem>_<ts>.json`
//! and are never reused, so artifacts are effectively immutable.

use crate::app::ports::BlobStorePort;
use crate::constants::ARTIFACT_TIMESTAMP_FORMAT;
use crate::error::{PipelineError, Result};
use crate::types::Record;
use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a stage stages its output locally and where it lands in the store.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactLayout {
    pub local_folder: &'static str,
    pub key_folder: &'static str,
}

impl ArtifactLayout {
    pub fn key_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.key_folder, file_name)
    }

    pub fn staging_path(&self, staging_dir: &Path, file_name: &str) -> PathBuf {
        staging_dir.join(self.local_folder).join(file_name)
    }
}

/// `<stem>_<YYYYmmddHHMMSS>.json` using local time.
pub fn timestamped_file_name(stem: &str) -> String {
    format!("{}_{}.json", stem, Local::now().format(ARTIFACT_TIMESTAMP_FORMAT))
}

/// Stage `bytes` locally and upload them. Returns the blob key.
pub async fn write_bytes(
    store: &dyn BlobStorePort,
    staging_dir: &Path,
    layout: ArtifactLayout,
    file_name: &str,
    bytes: &[u8],
) -> Result<String> {
    let local_path = layout.staging_path(staging_dir, file_name);
    if let Some(parent) = local_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&local_path, bytes).await?;
    debug!("Staged {} bytes at {}", bytes.len(), local_path.display());

    let key = layout.key_for(file_name);
    store.put(&local_path, &key).await?;
    info!("Uploaded artifact {}", key);
    Ok(key)
}

/// Serialize `payload` as indented JSON, stage and upload it.
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn BlobStorePort,
    staging_dir: &Path,
    layout: ArtifactLayout,
    file_name: &str,
    payload: &T,
) -> Result<String> {
    let bytes = serde_json::to_vec_pretty(payload)?;
    write_bytes(store, staging_dir, layout, file_name, &bytes).await
}

/// Fetch and parse an artifact.
pub async fn read_json(store: &dyn BlobStorePort, key: &str) -> Result<Value> {
    let text = store.get(key).await?;
    let value = serde_json::from_str(&text)?;
    Ok(value)
}

/// Records held by an artifact: either a bare list or an object with a
/// `records` list. An object without `records` holds no records.
pub fn artifact_records(key: &str, artifact: Value) -> Result<Vec<Value>> {
    match artifact {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(items)) => Ok(items),
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(_) => Err(PipelineError::Artifact {
                key: key.to_string(),
                message: "`records` is not a list".to_string(),
            }),
        },
        _ => Err(PipelineError::Artifact {
            key: key.to_string(),
            message: "expected a JSON list or an object with `records`".to_string(),
        }),
    }
}

/// Keep only object entries; anything else cannot carry record fields.
pub fn into_record_objects(key: &str, values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match value {
            Value::Object(map) => Some(map),
            _ => {
                warn!("Skipping non-object entry {} in artifact {}", i, key);
                None
            }
        })
        .collect()
}
