//! Saving, opening and describing machines.
//!
//! Saves are all-or-nothing: the artifact is written to a temporary file
//! next to the destination, synced, then renamed over it. A failed save
//! leaves whatever was at the destination before.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::{Machine, MachineParams};
use crate::error::MachineError;
use crate::model::InferenceModel;
use crate::serialization::{decode_artifact, encode_artifact};

/// Model family reported by [`Machine::describe`].
pub const FAMILY_NAME: &str = "Random Forest Classifier";

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour repr:12 padding:space]:[minute]:[second] [period]"
);

impl Machine {
    /// Write the machine to `path`, replacing any existing file.
    ///
    /// # Errors
    /// [`MachineError::Io`] if the temporary file cannot be created, written
    /// or renamed into place.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MachineError> {
        let path = path.as_ref();
        let bytes = encode_artifact(&self.extract_params())
            .map_err(|e| MachineError::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix(".forest-machine")
            .tempfile_in(dir)
            .map_err(|e| MachineError::io(path, e))?;
        temp.write_all(&bytes)
            .map_err(|e| MachineError::io(path, e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| MachineError::io(path, e))?;
        // The temporary file is removed when the persist error is dropped.
        temp.persist(path)
            .map_err(|e| MachineError::io(path, e.error))?;

        info!(path = %path.display(), bytes = bytes.len(), "saved machine");
        Ok(())
    }

    /// Load a machine saved with [`Machine::save`].
    ///
    /// # Errors
    /// - [`MachineError::Io`] if the file cannot be read
    /// - [`MachineError::CorruptArtifact`] if the header, checksum, payload
    ///   or model structure is invalid
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MachineError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| MachineError::io(path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "read artifact");

        let params: MachineParams = decode_artifact(&bytes)?;
        let machine = Machine::from_params(params)?;
        info!(
            path = %path.display(),
            trees = machine.n_trees(),
            classes = machine.classes().len(),
            "opened machine"
        );
        Ok(machine)
    }

    /// `"Base Model: <family>\nTimestamp: <now>"`, using local time when the
    /// offset is known and UTC otherwise.
    pub fn describe(&self) -> String {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| {
            warn!("local time offset unavailable, describing in UTC");
            OffsetDateTime::now_utc()
        });
        self.describe_at(now)
    }

    /// [`Machine::describe`] for a fixed point in time.
    pub fn describe_at(&self, now: OffsetDateTime) -> String {
        let timestamp = now
            .format(TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| now.to_string());
        format!("Base Model: {}\nTimestamp: {}", FAMILY_NAME, timestamp)
    }
}
