//! Service layer for the monitor.
//!
//! This module contains the business logic for:
//! - Outage extraction from raw markup (`OutageExtractor`)
//! - Structured status parsing (`StatusParser`)
//! - Entity rendering (`build_entities`)

mod entities;
mod extract;
mod status;

pub use entities::{EntityContext, EntityView, build_entities};
pub use extract::{Extraction, OutageExtractor, service_type};
pub use status::{StatusParser, classify_header, parse_status};
