//! # ee_core - Low-Voltage Electrical Design Calculations
//!
//! `ee_core` provides the calculations behind a low-voltage design toolbox:
//! conduit fill, voltage drop, short-circuit estimates, power factor
//! correction, power-quality diagnostics, and PV sizing with payback. All
//! inputs and outputs are JSON-serializable so callers can drive it from a
//! CLI, a web form, or a scripting layer.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions of (input, library snapshot)
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Every Violation**: Invalid input is reported field by field, all at once
//! - **Explained**: Each result carries its derivation steps and warnings
//!
//! ## Quick Start
//!
//! ```rust
//! use ee_core::calculations::ModuleKind;
//! use ee_core::library::LibrarySnapshot;
//! use ee_core::presets::example_input;
//!
//! let library = LibrarySnapshot::default();
//! let response = example_input(ModuleKind::ShortCircuit).evaluate(&library);
//!
//! assert!(response.is_success());
//! let json = serde_json::to_string_pretty(&response).unwrap();
//! assert!(json.contains("derivation_steps"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The six calculation modules and the dispatch envelope
//! - [`library`] - Property tables, raceway catalogs, and the snapshot store
//! - [`validation`] - Lenient field parsing and batch validation
//! - [`selection`] - First-adequate-size catalog search
//! - [`scenario`] - Named scenarios, comparisons, recent and favorites lists
//! - [`presets`] - Worked example inputs
//! - [`config`] - Config file loading
//! - [`logging`] - Tracing setup
//! - [`units`] - Unit conventions and number formatting
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod config;
pub mod errors;
pub mod library;
pub mod logging;
pub mod presets;
pub mod scenario;
pub mod selection;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalcResponse, CalculationInput, ModuleKind, Report};
pub use config::Config;
pub use errors::{CalcError, CalcResult};
pub use library::{LibrarySnapshot, LibraryStore};
pub use scenario::{Scenario, ScenarioBook};
