//! Memory access visualizer (`memvis`)
//!
//! Parses Multi2Sim memory traces into timed accesses and queries
//! which accesses were in flight during a window of cycles.

// Modules
pub mod config;
pub mod data;
pub mod histogram;
pub mod ingest;
pub mod record;
pub mod session;
pub mod store;
pub mod trace;

// Exports
pub use self::{
	config::Config,
	histogram::Histogram,
	ingest::{AccessSink, Ingester, ParseSummary},
	record::{AccessId, AccessKind, AccessRecord, KindFilter},
	session::Session,
	store::{AccessStore, Bounds, Window},
	trace::{TraceLine, TraceReader},
};
