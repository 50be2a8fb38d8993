//! Minimal embeddable test harness.
//!
//! Test units are registered under string names, constructed on demand,
//! optionally parameterized by a setup closure, then executed as a batch
//! with bitmask error reporting, verbosity-gated logging, rank-aware
//! output suppression for multi-process runs, and ANSI color formatting.
//!
//! # Pieces
//!
//! - [`Registry`] / [`Registrar`] — name-keyed table of zero-argument
//!   constructors, populated from an explicit initialization routine.
//! - [`TestCase`] — one runnable unit returning an [`ErrCode`] bitmask.
//! - [`ErrorRegistry`] — the fixed universe of composable failure bits,
//!   with four runtime-allocatable user slots.
//! - [`Testbed`] — the controller: owns constructed tests, sequences the
//!   batch, decodes and attributes every report, prints the summary.
//!
//! # Example
//!
//! ```no_run
//! use testbed::{ErrCode, Registry, RunContext, Testbed, TestbedConfig, TestCase};
//!
//! #[derive(Default)]
//! struct Doubling {
//!     input: i64,
//! }
//!
//! impl TestCase for Doubling {
//!     fn name(&self) -> &str {
//!         "doubling"
//!     }
//!
//!     fn run(&mut self, ctx: &mut RunContext<'_>) -> ErrCode {
//!         let err = if self.input * 2 == self.input + self.input {
//!             ErrCode::PASSED
//!         } else {
//!             ErrCode::WRONG_RESULT
//!         };
//!         ctx.report_err(err);
//!         err
//!     }
//!
//!     fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
//!         self
//!     }
//! }
//!
//! fn register_all(registry: &mut Registry) {
//!     registry.register::<Doubling>("doubling");
//! }
//!
//! let mut registry = Registry::new();
//! register_all(&mut registry);
//!
//! let mut bed = Testbed::new(&registry, TestbedConfig::default());
//! bed.setup_tests();
//! bed.add("doubling");
//! bed.add_with("doubling", |t: &mut Doubling| t.input = 21);
//! let failed = bed.run_tests();
//! assert_eq!(failed, 0);
//! ```

pub mod config;
pub mod controller;
pub mod entity;
pub mod errcode;
pub mod output;
pub mod palette;
pub mod registry;

/// Highest meaningful verbosity level; setters clamp to this.
pub const MAX_VERBOSITY: u8 = 4;

/// Equality tolerance at normal precision, i.e. rounding error scale.
pub const PRECISION: f64 = 1e-10;
/// Equality tolerance at good numerical precision, e.g. integration over
/// hundreds of points.
pub const NUM_PRECISION: f64 = 1e-6;
/// Equality tolerance at low precision, i.e. different approximations to
/// one expression.
pub const LOW_PRECISION: f64 = 5e-3;

pub use config::{ColorConfig, ConfigError, ConfigResult, RankInfo, TestbedConfig, DEFAULT_LOG_PATH};
pub use controller::Testbed;
pub use entity::{RunContext, TestCase};
pub use errcode::{ErrCode, ErrorRegistry, ERR_POOL_BITS};
pub use output::ALL_RANKS;
pub use palette::{color_escape, Palette, Role};
pub use registry::{Registrar, Registry};
