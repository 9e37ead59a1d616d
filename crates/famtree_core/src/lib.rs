//! Core domain logic for famtree.
//! This crate is the single source of truth for genealogical invariants.

pub mod codec;
pub mod config;
pub mod graph;
pub mod logging;
pub mod model;
pub mod service;

pub use codec::{CodecError, CodecResult, LoadedTree, SchemaVersion, TreeCodec};
pub use config::{CodecOptions, ConfigError, CoreConfig, HistoryConfig};
pub use graph::explorer::ConnectivityExplorer;
pub use graph::{FamilyGraph, GraphError, GraphResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::date::{DateError, PartialDate, Period};
pub use model::member::{Gender, Member, MemberData, MemberId};
pub use model::union::{Union, UnionData, UnionId};
pub use model::view::{CardSize, CardState, ViewState};
pub use service::history::{HistoryError, HistoryManager, Snapshot};
pub use service::tree_service::{FamilyTreeService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns the tree file schema version written by this build.
pub fn schema_version() -> SchemaVersion {
    codec::current_version()
}
