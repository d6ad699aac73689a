//! AdminWeb E2E Verification Core
//!
//! This crate holds the decision logic behind the admin console E2E suite:
//! - A transition oracle that judges whether a UI action opened the
//!   expected route, page or dialog
//! - A fixture lifecycle that seeds records through the side-channel API,
//!   confirms them in the UI and removes them afterwards
//! - Primary key resolution from a business key when cleanup needs it
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Test case (UI driver)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TransitionOracle                                           │
//! │    ├── capture_baseline() -> IndicatorSnapshot              │
//! │    ├── await_transition(baseline, expectation)              │
//! │    └── perform(expectation, action)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FixtureManager                                             │
//! │    ├── seed(count, template) -> FixtureSet                  │
//! │    ├── verify_visible / confirm_absent / rekey              │
//! │    ├── teardown(set) -> TeardownReport                      │
//! │    └── bracket(count, template, body)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Seams: IndicatorSource, ListView, RecordWriteApi           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod expectation;
pub mod fixture;
pub mod flows;
pub mod indicator;
pub mod keys;
pub mod lifecycle;
pub mod list;
pub mod logging;
pub mod oracle;
pub mod records;

pub use config::HarnessConfig;
pub use error::{E2eError, E2eResult};
pub use expectation::{HeadingMatcher, OutcomePattern, TransitionExpectation};
pub use fixture::{DictionaryItemTemplate, Fixture, FixtureSet, FixtureState, RecordTemplate};
pub use indicator::{IndicatorSnapshot, IndicatorSource, StaleRead};
pub use keys::{BusinessKeyIndex, KeyGenerator, Resolution};
pub use lifecycle::{FixtureManager, SharedFixtureSet, TeardownReport};
pub use list::{ListRow, ListView};
pub use oracle::{Signal, TransitionOracle, TransitionOutcome};
pub use records::{HttpRecordApi, RecordWriteApi};
