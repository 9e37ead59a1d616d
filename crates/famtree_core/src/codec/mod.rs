//! Versioned tree file persistence.
//!
//! # Responsibility
//! - Load tree files of every known schema version into a graph plus
//!   view-state.
//! - Save graphs in the current schema version.
//!
//! # Invariants
//! - Loading parses into temporaries; a graph is only returned when the
//!   whole document is valid.
//! - Files newer than the current version are rejected unless
//!   `CodecOptions::ignore_version` is set.
//! - `save_file` never leaves a half-written target file behind.

use crate::config::CodecOptions;
use crate::graph::FamilyGraph;
use crate::model::view::ViewState;
use log::{error, info};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

mod date_token;
mod document;
pub mod version;

use document::TreeDocument;
pub use version::{current_version, SchemaVersion, CANVAS_STATE_SINCE, RELATIONS_SINCE};

pub type CodecResult<T> = Result<T, CodecError>;

/// Tree file load/save failures.
#[derive(Debug)]
pub enum CodecError {
    /// The document is malformed or references unknown members.
    CorruptFile(String),
    UnsupportedVersion {
        file_version: SchemaVersion,
        latest_supported: SchemaVersion,
    },
    Io(std::io::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CorruptFile(reason) => write!(f, "corrupt tree file: {reason}"),
            Self::UnsupportedVersion {
                file_version,
                latest_supported,
            } => write!(
                f,
                "tree file version {file_version} is newer than supported {latest_supported}"
            ),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::CorruptFile(_) | Self::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTree {
    pub graph: FamilyGraph,
    pub view: ViewState,
    /// Schema version the file was written with.
    pub version: SchemaVersion,
}

/// Reads and writes tree files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeCodec {
    options: CodecOptions,
}

impl TreeCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Decodes a tree document.
    ///
    /// # Errors
    /// - `UnsupportedVersion` when the document is newer than this build and
    ///   `ignore_version` is off.
    /// - `CorruptFile` for malformed JSON, missing sections, bad date tokens,
    ///   bad image data, non-numeric ids and dangling member references.
    pub fn load(&self, bytes: &[u8]) -> CodecResult<LoadedTree> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|err| CodecError::CorruptFile(format!("invalid JSON: {err}")))?;
        let version = stored_version(&value)?;

        let latest = current_version();
        if version > latest && !self.options.ignore_version {
            return Err(CodecError::UnsupportedVersion {
                file_version: version,
                latest_supported: latest,
            });
        }

        let document = TreeDocument::deserialize(&value)
            .map_err(|err| CodecError::CorruptFile(err.to_string()))?;
        let (graph, view) = document.decode(version)?;
        Ok(LoadedTree {
            graph,
            view,
            version,
        })
    }

    /// Encodes a graph and its view-state in the current schema version.
    pub fn save(&self, graph: &FamilyGraph, view: &ViewState) -> CodecResult<Vec<u8>> {
        let document = TreeDocument::encode(graph, view);
        serde_json::to_vec_pretty(&document)
            .map_err(|err| CodecError::Io(std::io::Error::other(err)))
    }

    /// Reads and decodes a tree file.
    ///
    /// # Side effects
    /// - Emits `tree_load` logging events with duration and status.
    pub fn load_file(&self, path: impl AsRef<Path>) -> CodecResult<LoadedTree> {
        let started_at = Instant::now();
        info!("event=tree_load module=codec status=start");

        let result = std::fs::read(path.as_ref())
            .map_err(CodecError::from)
            .and_then(|bytes| self.load(&bytes));
        match &result {
            Ok(loaded) => info!(
                "event=tree_load module=codec status=ok duration_ms={} version={} members={} unions={}",
                started_at.elapsed().as_millis(),
                loaded.version,
                loaded.graph.member_count(),
                loaded.graph.union_count()
            ),
            Err(err) => error!(
                "event=tree_load module=codec status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                error_code(err),
                err
            ),
        }
        result
    }

    /// Encodes a tree and writes it to `path`.
    ///
    /// The document goes to a sibling temp file first and is then renamed
    /// over the target.
    ///
    /// # Side effects
    /// - Emits `tree_save` logging events with duration and status.
    pub fn save_file(
        &self,
        path: impl AsRef<Path>,
        graph: &FamilyGraph,
        view: &ViewState,
    ) -> CodecResult<()> {
        let started_at = Instant::now();
        info!("event=tree_save module=codec status=start");

        let result = self
            .save(graph, view)
            .and_then(|bytes| write_replacing(path.as_ref(), &bytes));
        match &result {
            Ok(()) => info!(
                "event=tree_save module=codec status=ok duration_ms={} members={} unions={}",
                started_at.elapsed().as_millis(),
                graph.member_count(),
                graph.union_count()
            ),
            Err(err) => error!(
                "event=tree_save module=codec status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                error_code(err),
                err
            ),
        }
        result
    }
}

/// Reads the packed version; a missing key means version 0.
fn stored_version(value: &serde_json::Value) -> CodecResult<SchemaVersion> {
    let Some(raw) = value.get("version") else {
        return Ok(SchemaVersion::from_raw(0));
    };
    let raw = raw
        .as_i64()
        .ok_or_else(|| CodecError::CorruptFile(format!("version is not an integer: {raw}")))?;
    // In-development builds set bit 31, which older writers stored as a
    // negative 32-bit integer.
    let packed = u32::try_from(raw)
        .or_else(|_| i32::try_from(raw).map(|signed| signed as u32))
        .map_err(|_| CodecError::CorruptFile(format!("version {raw} is out of range")))?;
    Ok(SchemaVersion::from_raw(packed))
}

fn write_replacing(path: &Path, bytes: &[u8]) -> CodecResult<()> {
    let temp_path = temp_sibling(path);
    if let Err(err) = std::fs::write(&temp_path, bytes) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(err.into());
    }
    if let Err(err) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn error_code(err: &CodecError) -> &'static str {
    match err {
        CodecError::CorruptFile(_) => "corrupt_file",
        CodecError::UnsupportedVersion { .. } => "unsupported_version",
        CodecError::Io(_) => "io_failed",
    }
}
