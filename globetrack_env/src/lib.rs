//! GlobeTrack Environment Abstraction Layer
//!
//! This crate isolates everything the track pipeline needs from the outside
//! world so the same loader and animator run in **Production** (tokio) and in
//! **Simulation** (virtual clock):
//! - Time (`now()`, `sleep()`)
//! - Task spawning (`spawn()`)
//! - Text sources (`TextSource::fetch_text()`)
//!
//! # Example
//!
//! ```ignore
//! use globetrack_env::{TrackContext, TextSource, TokioContext, FileSource};
//!
//! async fn replay<Ctx: TrackContext, Src: TextSource>(ctx: &Ctx, src: &Src) {
//!     let text = src.fetch_text().await?;
//!     ctx.sleep(Duration::from_millis(250)).await;
//! }
//! ```

mod context;
mod source;
mod types;
mod error;
mod tokio_impl;

pub use context::TrackContext;
pub use source::{FileSource, TextSource};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use types::SourceId;
pub use error::EnvError;
pub use tokio_impl::TokioContext;
