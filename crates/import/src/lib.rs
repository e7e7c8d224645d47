//! Body-composition import from Withings.
//!
//! An import attempt asks the authorization intermediary for a consent URL,
//! shows it on a [`ConsentSurface`], waits for the first decisive signal,
//! exchanges a code for a token if needed, fetches recent measure groups and
//! maps the newest one into an [`ImportedMeasurement`].

#![warn(missing_docs)]

pub mod error;
pub mod token;
pub mod state;
pub mod withings;
pub mod consent;
pub mod client;
pub mod importer;

pub use error::{CancelReason, ImportError, Result};
pub use token::ImportToken;
pub use state::{ImportEvent, ImportState};
pub use withings::{
    latest_measurement, ImportedMeasurement, Measure, MeasureGroup, MeasureKind, MeasureTable,
};
pub use consent::{ConsentOutcome, ConsentSender, ConsentSignal, ConsentSurface, ConsentWait};
pub use client::{AuthorizationService, HttpIntermediary, IntermediaryConfig, MeasurementSource};
pub use importer::{ImportSettings, Importer};
