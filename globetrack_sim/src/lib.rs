//! GlobeTrack Replay Harness
//!
//! Runs the loader and animator against a controlled environment:
//! - **Time**: a virtual clock that jumps forward whenever the animator sleeps
//! - **Sources**: in-memory documents and scripted fetch failures
//!
//! A full animation over a long track replays in milliseconds, with every
//! timer the animator armed recorded for inspection.
//!
//! # Usage
//!
//! ```ignore
//! use globetrack_sim::{replay, MemorySource};
//!
//! let source = MemorySource::new("laps", csv_text);
//! let result = replay(&source, &ViewerConfig::default()).await?;
//! result.to_export("laps", GeometryKind::EllipsoidChord).write_to_file("laps.json")?;
//! ```

mod context;
mod source;
mod exporter;
mod replay;

pub use context::SimContext;
pub use source::{open_source, FailingSource, MemorySource, OpenError};
pub use exporter::{TimelineExport, TimelineFrame};
pub use replay::{replay, ReplayResult};
