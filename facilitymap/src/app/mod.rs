//! Application bootstrap.
//!
//! Turns a loaded [`ConfigFile`](crate::config::ConfigFile) into a running
//! session: the Overpass transport, the location source, the coordinator
//! and the session actor are all wired here, in one testable place, rather
//! than in each CLI command.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     FacilityMapApp                       │
//! │                                                          │
//! │  ReqwestTransport ──► FacilityFetcher ──┐                │
//! │                                         ├─► Coordinator  │
//! │  LocationSource ───► LocationDetector ──┘       │        │
//! │                                                 ▼        │
//! │  SessionHandle ◄──────────────────────── MapSession      │
//! │  RenderEvent receiver ◄───────────────── (actor task)    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use facilitymap::app::{AppConfig, FacilityMapApp};
//!
//! let config = AppConfig::from_config_file(&ConfigFile::load()?)?;
//! let mut app = FacilityMapApp::start(config, LocationSource::disabled())?;
//!
//! while let Some(event) = app.next_event().await {
//!     println!("{:?}", event);
//! }
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::{scan, FacilityMapApp};
pub use config::AppConfig;
pub use error::AppError;
