//! `speedcontrol` - Vehicle speed measurement recording
//!
//! This library stores speed measurements in one flat file per calendar day
//! and answers two questions about a day: which vehicles were at or above a
//! given speed, and which measurements were the slowest and fastest.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{Record, RecordView, ValidationError};
pub use service::{AvailabilityWindow, SpeedControl};
pub use store::{FileStore, MemoryStore, RecordStore, SpeedExtremes};
