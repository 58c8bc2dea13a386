//! Append-only CSV audit log: `timestamp,status,caption,detail`.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::error::AuditError;

const HEADER: &str = "timestamp,status,caption,detail\r\n";

#[derive(Debug)]
pub struct ComplianceLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ComplianceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row, creating the file (with header) and its parent directory
    /// on first use.
    pub async fn append(&self, status: &str, caption: &str, detail: &str) -> Result<(), AuditError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let row = format_row(&[&timestamp, status, caption, detail]);
        let io_err = |source| AuditError::Io {
            path: self.path.clone(),
            source,
        };

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;

        let is_new = file.metadata().await.map_err(io_err)?.len() == 0;
        let mut buffer = String::with_capacity(HEADER.len() + row.len());
        if is_new {
            buffer.push_str(HEADER);
        }
        buffer.push_str(&row);

        file.write_all(buffer.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }
}

/// RFC 4180: fields containing a comma, quote or line break are quoted and
/// embedded quotes doubled.
pub(crate) fn format_row(fields: &[&str]) -> String {
    let mut row = fields
        .iter()
        .map(|field| {
            if field.contains([',', '"', '\n', '\r']) {
                format!("\"{}\"", field.replace('"', "\"\""))
            } else {
                (*field).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    row.push_str("\r\n");
    row
}
