//! The unit of test work and the reporting handle passed into it.
//!
//! A [`TestCase`] is one runnable test: a display name plus a `run` body
//! returning a bitmask [`ErrCode`]. Concrete cases are constructed by the
//! registry, optionally mutated by a setup closure, and owned by the
//! controller until the batch is torn down.
//!
//! `run` receives a [`RunContext`] borrowed from the controller for the
//! duration of the call. It stands in for a back-reference to the
//! controller: everything a test body may do there (report an error,
//! report gated info) goes through it, already attributed to the running
//! test.

use crate::errcode::{ErrCode, ErrorRegistry};
use crate::output::OutputSink;
use crate::palette::{Palette, Role};
use std::any::Any;

/// One runnable unit of test logic.
///
/// Implementors also need `as_any_mut` so a setup closure registered for
/// the concrete type can be applied after type-erased construction:
///
/// ```
/// use testbed::{ErrCode, RunContext, TestCase};
///
/// #[derive(Default)]
/// struct Sample {
///     threshold: f64,
/// }
///
/// impl TestCase for Sample {
///     fn name(&self) -> &str {
///         "sample"
///     }
///
///     fn run(&mut self, ctx: &mut RunContext<'_>) -> ErrCode {
///         ctx.report_info("checking threshold", 2);
///         let err = if self.threshold < 0.0 {
///             ErrCode::WRONG_RESULT
///         } else {
///             ErrCode::PASSED
///         };
///         ctx.report_err(err);
///         err
///     }
///
///     fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
///         self
///     }
/// }
/// ```
pub trait TestCase: Any {
    /// Display name reported in the log.
    fn name(&self) -> &str;

    /// Execute the test, reporting through `ctx`, and return the combined
    /// failure bits. [`ErrCode::PASSED`] means success.
    fn run(&mut self, ctx: &mut RunContext<'_>) -> ErrCode;

    /// Mutable view for the checked setup downcast. Implementations
    /// return `self`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Reporting handle for the currently running test.
///
/// Borrows the controller's sink, error names, palette and verbosity for
/// the duration of one `run` call; every line it writes is attributed to
/// that test.
pub struct RunContext<'a> {
    sink: &'a mut OutputSink,
    errors: &'a ErrorRegistry,
    palette: &'a Palette,
    verbosity: u8,
    test_name: &'a str,
}

impl<'a> RunContext<'a> {
    pub(crate) fn new(
        sink: &'a mut OutputSink,
        errors: &'a ErrorRegistry,
        palette: &'a Palette,
        verbosity: u8,
        test_name: &'a str,
    ) -> Self {
        Self {
            sink,
            errors,
            palette,
            verbosity,
            test_name,
        }
    }

    /// Name of the test this context reports for.
    pub fn test_name(&self) -> &str {
        self.test_name
    }

    /// Current verbosity threshold.
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Decode `code` and write it to both sinks, styled with the pass or
    /// fail role. Errors are always recorded regardless of verbosity.
    pub fn report_err(&mut self, code: ErrCode) {
        let line = error_line(self.errors, code, self.test_name);
        let role = if code.is_passed() { Role::Pass } else { Role::Fail };
        let styled = self.palette.paint(role, &line);
        self.sink.both(&line, &styled);
    }

    /// Write `text` to both sinks iff `verb` is within the verbosity
    /// threshold. Suppressed lines are dropped, never buffered.
    pub fn report_info(&mut self, text: &str, verb: u8) {
        if verb > self.verbosity {
            return;
        }
        let styled = self.palette.paint(Role::Info, text);
        self.sink.both(text, &styled);
    }
}

/// Render the log line for `code` attributed to `test_name`.
pub(crate) fn error_line(errors: &ErrorRegistry, code: ErrCode, test_name: &str) -> String {
    if code.is_passed() {
        format!("Passed test {test_name}")
    } else {
        format!("{} on test {}", errors.decode(code), test_name)
    }
}
