//! The batch controller: owns the constructed tests, drives sequential
//! execution, and aggregates results.
//!
//! A [`Testbed`] is single-use: build it against a registry and a
//! configuration, open the log with [`setup_tests`](Testbed::setup_tests),
//! populate it with `add`/`add_with`, run the batch once, and let it drop
//! (or call [`cleanup_tests`](Testbed::cleanup_tests) explicitly). Tests
//! execute strictly in insertion order on the calling thread; a test that
//! never returns blocks the batch, and nothing is ever retried.

use crate::config::TestbedConfig;
use crate::entity::{error_line, RunContext, TestCase};
use crate::errcode::{ErrCode, ErrorRegistry};
use crate::output::OutputSink;
use crate::palette::{Palette, Role};
use crate::registry::Registry;
use crate::MAX_VERBOSITY;
use std::any::TypeId;
use std::path::PathBuf;

/// Sequences test execution and aggregates reporting for one batch.
pub struct Testbed<'r> {
    registry: &'r Registry,
    entities: Vec<Box<dyn TestCase>>,
    errors: ErrorRegistry,
    sink: OutputSink,
    palette: Palette,
    verbosity: u8,
    log_path: PathBuf,
    current: Option<usize>,
    cleaned: bool,
}

impl<'r> Testbed<'r> {
    /// Create a controller over `registry`, configured by `config`. The
    /// terminal-capability probe for colors happens here, once.
    pub fn new(registry: &'r Registry, config: TestbedConfig) -> Self {
        let palette = Palette::detect(&config.colors, config.color);
        let sink = OutputSink::new(config.rank, config.rank_to_write);
        Self {
            registry,
            entities: Vec::new(),
            errors: ErrorRegistry::new(),
            sink,
            palette,
            verbosity: config.verbosity.min(MAX_VERBOSITY),
            log_path: config.log_path,
            current: None,
            cleaned: false,
        }
    }

    /// Replace the default error registry, carrying over any user codes
    /// allocated before construction.
    pub fn with_errors(mut self, errors: ErrorRegistry) -> Self {
        self.errors = errors;
        self
    }

    /// Open the log file. On failure the batch degrades to console-only
    /// output and proceeds; an informational message records the
    /// degradation.
    pub fn setup_tests(&mut self) {
        if !self.sink.open(&self.log_path) {
            self.report_info(&format!("Error opening {}", self.log_path.display()), 0);
        }
    }

    /// Construct the test registered under `name` and append it to the
    /// batch. An unknown name emits one informational message and appends
    /// nothing.
    pub fn add(&mut self, name: &str) {
        match self.registry.create(name) {
            Some(entity) => self.entities.push(entity),
            None => self.report_info(&format!("Test {name} not found"), 0),
        }
    }

    /// As [`add`](Self::add), but apply `setup` to the freshly constructed
    /// entity before appending it.
    ///
    /// The registry entry's recorded type is checked against `T` first; a
    /// mismatch is a caller contract violation, reported as an error, and
    /// the entity is not appended. `setup` may capture any parameters it
    /// needs; repeated calls for one name each produce an independent
    /// entity with its own setup.
    pub fn add_with<T, F>(&mut self, name: &str, setup: F)
    where
        T: TestCase + 'static,
        F: FnOnce(&mut T),
    {
        let type_id = match self.registry.type_of(name) {
            Some(id) => id,
            None => {
                self.report_info(&format!("Test {name} not found"), 0);
                return;
            }
        };
        if type_id != TypeId::of::<T>() {
            self.write_role_line(
                Role::Fail,
                &format!("Setup for test {name} does not match its registered type"),
            );
            return;
        }
        let mut entity = match self.registry.create(name) {
            Some(entity) => entity,
            None => return,
        };
        match entity.as_any_mut().downcast_mut::<T>() {
            Some(concrete) => setup(concrete),
            None => {
                self.write_role_line(
                    Role::Fail,
                    &format!("Setup for test {name} does not match its registered type"),
                );
                return;
            }
        }
        self.entities.push(entity);
    }

    /// Run every added test in insertion order and report the batch
    /// outcome. Returns how many tests failed (returned a nonzero code);
    /// which kinds occurred is visible only in the interleaved log.
    pub fn run_tests(&mut self) -> usize {
        let total = self.entities.len();
        let mut failed = 0usize;

        for idx in 0..self.entities.len() {
            self.current = Some(idx);
            let name = self.entities[idx].name().to_string();
            let mut ctx = RunContext::new(
                &mut self.sink,
                &self.errors,
                &self.palette,
                self.verbosity,
                &name,
            );
            let code = self.entities[idx].run(&mut ctx);
            if code.is_failure() {
                failed += 1;
            }
        }

        let (banner, role) = if failed > 0 {
            (format!("{failed} failed tests \u{2717}"), Role::Fail)
        } else {
            ("All tests passed \u{2713}".to_string(), Role::Pass)
        };
        let styled = self.palette.paint_bold(role, &banner);
        self.sink.both(&banner, &styled);

        let summary = format!("Ran {total} tests, {failed} failed");
        let styled = self.palette.bold(&summary);
        self.sink.both(&summary, &styled);

        failed
    }

    /// Decode `code` and write it to both sinks, attributed to `test_id`
    /// or, when `None`, to the most recently running test.
    pub fn report_err(&mut self, code: ErrCode, test_id: Option<usize>) {
        let idx = test_id.or(self.current);
        let name = idx
            .and_then(|i| self.entities.get(i))
            .map(|e| e.name().to_string())
            .unwrap_or_else(|| "(no test)".to_string());
        let line = error_line(&self.errors, code, &name);
        let role = if code.is_passed() { Role::Pass } else { Role::Fail };
        let styled = self.palette.paint(role, &line);
        self.sink.both(&line, &styled);
    }

    /// Write `text` to both sinks iff `verb` is within the current
    /// verbosity threshold; otherwise drop it entirely.
    pub fn report_info(&mut self, text: &str, verb: u8) {
        if verb > self.verbosity {
            return;
        }
        let styled = self.palette.paint(Role::Info, text);
        self.sink.both(text, &styled);
    }

    /// List all registered test names on the console.
    pub fn print_available(&self) {
        self.sink.console_line("Available tests:");
        for name in self.registry.list_names() {
            self.sink.console_line(&format!("  {name}"));
        }
    }

    /// Set the verbosity threshold, clamped to `0..=MAX_VERBOSITY`.
    pub fn set_verbosity(&mut self, verb: u8) {
        self.verbosity = verb.min(MAX_VERBOSITY);
    }

    /// Reassign the color character for one output role.
    pub fn set_colour(&mut self, role: Role, ch: char) {
        self.palette.set_colour(role, ch);
    }

    /// Escape sequence for `ch`, or `""` when the construction-time probe
    /// found no color support.
    pub fn get_color_escape(&self, ch: char) -> &'static str {
        self.palette.escape(ch)
    }

    /// Display names of all defined error bits.
    pub fn errors(&self) -> &ErrorRegistry {
        &self.errors
    }

    /// Number of tests currently in the batch.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the batch holds no tests.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Index of the most recently running test, if any.
    pub fn current_test(&self) -> Option<usize> {
        self.current
    }

    /// Log the closing message, flush and release the log file, and drop
    /// all entities. Runs at most once; also invoked from `Drop`.
    pub fn cleanup_tests(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;
        if self.sink.has_file() {
            let text = format!("Testing complete and logged in {}", self.log_path.display());
            self.report_info(&text, 0);
            self.sink.close();
        } else {
            self.report_info("No logfile generated", 0);
        }
        self.entities.clear();
        self.current = None;
    }

    fn write_role_line(&mut self, role: Role, text: &str) {
        let styled = self.palette.paint(role, text);
        self.sink.both(text, &styled);
    }
}

impl Drop for Testbed<'_> {
    fn drop(&mut self) {
        self.cleanup_tests();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::any::Any;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Passing;

    impl TestCase for Passing {
        fn name(&self) -> &str {
            "passing"
        }
        fn run(&mut self, ctx: &mut RunContext<'_>) -> ErrCode {
            ctx.report_err(ErrCode::PASSED);
            ErrCode::PASSED
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct Failing;

    impl TestCase for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn run(&mut self, ctx: &mut RunContext<'_>) -> ErrCode {
            let err = ErrCode::WRONG_RESULT | ErrCode::ASSERT_FAIL;
            ctx.report_err(err);
            err
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct Parameterized {
        limit: i64,
        label: String,
    }

    impl TestCase for Parameterized {
        fn name(&self) -> &str {
            "parameterized"
        }
        fn run(&mut self, ctx: &mut RunContext<'_>) -> ErrCode {
            ctx.report_info(&format!("limit is {} ({})", self.limit, self.label), 1);
            if self.limit > 0 {
                ErrCode::PASSED
            } else {
                ErrCode::WRONG_RESULT
            }
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register::<Passing>("passing");
        registry.register::<Failing>("failing");
        registry.register::<Parameterized>("parameterized");
        registry
    }

    fn config_in(dir: &Path) -> TestbedConfig {
        TestbedConfig::default()
            .with_log_path(dir.join("tests.log"))
            .with_color(false)
    }

    fn log_contents(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("tests.log")).unwrap()
    }

    #[test]
    fn failing_count_matches_nonzero_codes() {
        let registry = registry();
        let dir = TempDir::new().unwrap();
        let mut bed = Testbed::new(&registry, config_in(dir.path()));
        bed.setup_tests();
        bed.add("passing");
        bed.add("failing");
        bed.add("passing");

        let failed = bed.run_tests();
        assert_eq!(failed, 1);
        bed.cleanup_tests();

        let log = log_contents(&dir);
        assert!(log.contains("Passed test passing"));
        assert!(log.contains(
            "Error Assignment or assertion failed, Wrong result, (code 5) on test failing"
        ));
        assert!(log.contains("1 failed tests \u{2717}"));
        assert!(log.contains("Ran 3 tests, 1 failed"));
    }

    #[test]
    fn all_passed_banner_iff_no_failures() {
        let registry = registry();
        let dir = TempDir::new().unwrap();
        let mut bed = Testbed::new(&registry, config_in(dir.path()));
        bed.setup_tests();
        bed.add("passing");

        assert_eq!(bed.run_tests(), 0);
        bed.cleanup_tests();

        let log = log_contents(&dir);
        assert!(log.contains("All tests passed \u{2713}"));
        assert!(!log.contains("failed tests"));
    }

    #[test]
    fn unknown_name_emits_one_message_and_no_entity() {
        let registry = registry();
        let dir = TempDir::new().unwrap();
        let mut bed = Testbed::new(&registry, config_in(dir.path()));
        bed.setup_tests();
        bed.add("nosuch");

        assert!(bed.is_empty());
        bed.cleanup_tests();

        let log = log_contents(&dir);
        assert_eq!(log.matches("Test nosuch not found").count(), 1);
    }

    #[test]
    fn setup_closure_configures_the_entity() {
        let registry = registry();
        let dir = TempDir::new().unwrap();
        let mut bed = Testbed::new(&registry, config_in(dir.path()));
        bed.setup_tests();

        // Two independent entities of one type, differently parameterized.
        bed.add_with("parameterized", |t: &mut Parameterized| {
            t.limit = 5;
            t.label = "first".to_string();
        });
        bed.add_with("parameterized", |t: &mut Parameterized| {
            t.limit = 9;
            t.label = "second".to_string();
        });

        assert_eq!(bed.len(), 2);
        assert_eq!(bed.run_tests(), 0);
        bed.cleanup_tests();

        let log = log_contents(&dir);
        assert!(log.contains("limit is 5 (first)"));
        assert!(log.contains("limit is 9 (second)"));
    }

    #[test]
    fn mismatched_setup_type_is_rejected_loudly() {
        let registry = registry();
        let dir = TempDir::new().unwrap();
        let mut bed = Testbed::new(&registry, config_in(dir.path()));
        bed.setup_tests();

        bed.add_with("passing", |t: &mut Parameterized| {
            t.limit = 1;
        });

        assert!(bed.is_empty());
        bed.cleanup_tests();

        let log = log_contents(&dir);
        assert!(log.contains("Setup for test passing does not match its registered type"));
    }

    #[test]
    fn info_is_gated_by_verbosity() {
        let registry = registry();
        let dir = TempDir::new().unwrap();
        let mut bed = Testbed::new(&registry, config_in(dir.path()));
        bed.setup_tests();

        bed.report_info("always", 0);
        bed.report_info("hidden", 3);
        bed.set_verbosity(3);
        bed.report_info("now visible", 3);
        bed.cleanup_tests();

        let log = log_contents(&dir);
        assert!(log.contains("always"));
        assert!(!log.contains("hidden"));
        assert!(log.contains("now visible"));
    }

    #[test]
    fn color_escape_is_gated_by_the_probe() {
        let registry = registry();
        let dir = TempDir::new().unwrap();

        let plain = Testbed::new(&registry, config_in(dir.path()));
        assert_eq!(plain.get_color_escape('r'), "");

        let forced = Testbed::new(&registry, config_in(dir.path()).with_color(true));
        assert_eq!(forced.get_color_escape('r'), "\x1b[31m");
        assert_eq!(forced.get_color_escape('z'), "");
    }

    #[test]
    fn verbosity_is_clamped_to_maximum() {
        let registry = registry();
        let dir = TempDir::new().unwrap();
        let mut bed = Testbed::new(&registry, config_in(dir.path()));
        bed.setup_tests();

        bed.set_verbosity(200);
        bed.report_info("deep detail", MAX_VERBOSITY);
        bed.cleanup_tests();

        assert!(log_contents(&dir).contains("deep detail"));
    }

    #[test]
    fn report_err_defaults_to_last_run_test() {
        let registry = registry();
        let dir = TempDir::new().unwrap();
        let mut bed = Testbed::new(&registry, config_in(dir.path()));
        bed.setup_tests();
        bed.add("passing");
        bed.add("failing");
        bed.run_tests();
        assert_eq!(bed.current_test(), Some(1));

        // After the run, unattributed reports go to the last-set index.
        bed.report_err(ErrCode::NULL_RESULT, None);
        // An explicit index wins.
        bed.report_err(ErrCode::NULL_RESULT, Some(0));
        bed.cleanup_tests();

        let log = log_contents(&dir);
        assert!(log.contains("Error Invalid null result, (code 2) on test failing"));
        assert!(log.contains("Error Invalid null result, (code 2) on test passing"));
    }

    #[test]
    fn user_error_codes_decode_in_reports() {
        let registry = registry();
        let dir = TempDir::new().unwrap();

        let mut errors = ErrorRegistry::new();
        let mine = errors.add_err("My error!");

        let mut bed = Testbed::new(&registry, config_in(dir.path())).with_errors(errors);
        bed.setup_tests();
        bed.add("passing");
        bed.run_tests();
        bed.report_err(mine | ErrCode::WRONG_RESULT, Some(0));
        bed.cleanup_tests();

        let log = log_contents(&dir);
        assert!(log.contains("Error My error!, Wrong result, (code 33) on test passing"));
    }

    #[test]
    fn unopened_log_degrades_to_console_only() {
        let registry = registry();
        let config = TestbedConfig::default()
            .with_log_path("/nonexistent-dir/tests.log")
            .with_color(false);
        let mut bed = Testbed::new(&registry, config);
        bed.setup_tests();

        // The batch still runs; nothing panics with no file attached.
        bed.add("passing");
        assert_eq!(bed.run_tests(), 0);
        bed.cleanup_tests();
    }

    #[test]
    fn cleanup_runs_once_and_closes_the_log() {
        let registry = registry();
        let dir = TempDir::new().unwrap();
        let mut bed = Testbed::new(&registry, config_in(dir.path()));
        bed.setup_tests();
        bed.cleanup_tests();
        bed.cleanup_tests();

        let log = log_contents(&dir);
        assert_eq!(log.matches("Testing complete and logged in").count(), 1);
    }

    #[test]
    fn suppressed_rank_writes_nothing() {
        let registry = registry();
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path()).with_rank(
            crate::config::RankInfo { rank: 1, n_procs: 2 },
            0,
        );
        let mut bed = Testbed::new(&registry, config);
        bed.setup_tests();
        bed.add("failing");
        assert_eq!(bed.run_tests(), 1);
        bed.cleanup_tests();

        assert_eq!(log_contents(&dir), "");
    }
}
