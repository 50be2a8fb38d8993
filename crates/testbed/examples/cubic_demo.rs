//! Demo batch: registers a handful of test types, parameterizes some of
//! them through setup closures, and runs them with logging to
//! `testing.log`.
//!
//! Run with `cargo run --example cubic_demo`.

use colored::Colorize;
use std::any::Any;
use std::f64::consts::PI;
use testbed::{
    ErrCode, ErrorRegistry, Registrar, Registry, Role, RunContext, TestCase, Testbed,
    TestbedConfig, PRECISION,
};

/// Real roots of `x^3 + a x^2 + b x + c = 0` (trigonometric Cardano).
fn cubic_solve(a: f64, b: f64, c: f64) -> Vec<f64> {
    let q = (a * a - 3.0 * b) / 9.0;
    let r = (2.0 * a.powi(3) - 9.0 * a * b + 27.0 * c) / 54.0;
    let r2 = r * r;
    let q3 = q.powi(3);

    if r2 < q3 {
        let theta = (r / q3.sqrt()).acos();
        let m = -2.0 * q.sqrt();
        vec![
            m * (theta / 3.0).cos() - a / 3.0,
            m * ((theta + 2.0 * PI) / 3.0).cos() - a / 3.0,
            m * ((theta - 2.0 * PI) / 3.0).cos() - a / 3.0,
        ]
    } else {
        let sgn = if r != 0.0 { r.signum() } else { 0.0 };
        let big_a = -sgn * (r.abs() + (r2 - q3).sqrt()).cbrt();
        let big_b = if big_a != 0.0 { q / big_a } else { 0.0 };
        vec![big_a + big_b - a / 3.0]
    }
}

#[derive(Default)]
struct Sample;

impl TestCase for Sample {
    fn name(&self) -> &str {
        "sample test"
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> ErrCode {
        let mut err = ErrCode::PASSED;
        ctx.report_info("Checking cubic roots", 1);

        let roots = cubic_solve(-17.0, 92.0, -150.0);
        if roots.len() != 1 || (roots[0] - 3.0).abs() > PRECISION {
            err |= ErrCode::WRONG_RESULT;
        }

        let roots = cubic_solve(-20.5, 100.0, -112.76);
        for root in roots {
            let tot = root.powi(3) - 20.5 * root * root + 100.0 * root - 112.76;
            if tot.abs() > PRECISION {
                err |= ErrCode::WRONG_RESULT;
                ctx.report_info(
                    &format!("Cubic root does not solve polynomial, mismatch {tot:e} for root {root:e}"),
                    2,
                );
            }
        }

        if err.is_passed() {
            ctx.report_info("Cubic roots OK", 1);
        }
        ctx.report_err(err);
        err
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
struct Second {
    number: i64,
}

impl TestCase for Second {
    fn name(&self) -> &str {
        "second"
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> ErrCode {
        ctx.report_info(&format!("Number is {}", self.number), 1);
        ctx.report_err(ErrCode::PASSED);
        ErrCode::PASSED
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Exercises every reporting path: combined predefined and user bits,
/// always-on info, and verbosity-gated detail.
#[derive(Default)]
struct Fails {
    extra: ErrCode,
    second_code: ErrCode,
}

impl TestCase for Fails {
    fn name(&self) -> &str {
        "fails"
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> ErrCode {
        let err = ErrCode::WRONG_RESULT | self.extra;
        ctx.report_info("This is always reported", 0);
        if err.is_failure() {
            ctx.report_info("This conditionally reported", 2);
        }
        ctx.report_err(err);
        ctx.report_err(self.second_code);
        err
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Default)]
struct Setup {
    isset: bool,
}

impl TestCase for Setup {
    fn name(&self) -> &str {
        "setup"
    }

    fn run(&mut self, ctx: &mut RunContext<'_>) -> ErrCode {
        ctx.report_info(&format!("Isset is {}", self.isset), 1);
        ctx.report_err(ErrCode::PASSED);
        ErrCode::PASSED
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn register_all(registry: &mut Registry) {
    Registrar::<Sample>::new(registry, "sample");
    Registrar::<Second>::new(registry, "second");
    Registrar::<Fails>::new(registry, "fails");
    Registrar::<Setup>::new(registry, "setup");
}

fn main() {
    let mut registry = Registry::new();
    register_all(&mut registry);

    let mut errors = ErrorRegistry::new();
    let my_err = errors.add_err("My error!");
    let my_err2 = errors.add_err("Different error");

    let config = TestbedConfig::default().with_log_path("testing.log");
    let mut bed = Testbed::new(&registry, config).with_errors(errors);
    bed.set_colour(Role::Fail, 'm');
    bed.setup_tests();

    bed.add("sample");
    bed.add_with("fails", move |t: &mut Fails| {
        t.extra = my_err;
        t.second_code = my_err2;
    });

    // The same test with and without its setup step.
    bed.add("setup");
    bed.add_with("setup", |t: &mut Setup| t.isset = true);

    // Several versions of one test under different parameters.
    bed.add_with("second", |t: &mut Second| t.number = 1);
    bed.add_with("second", |t: &mut Second| t.number = 5);

    bed.print_available();

    println!("{}", "Running tests".bold());
    let failed = bed.run_tests();
    println!("Batch finished with {failed} failing tests");
}
