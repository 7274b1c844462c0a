//! Self-test suite: checks the harness against a local shell.
//!
//! Each case gets a fresh switch from the suite's setup function and the
//! switch is always closed afterwards, even when the case failed. Results are
//! reported in the familiar `... ok` / `FAIL` / `ERROR` style.

use std::io::Write;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::error::Result;
use crate::switch::{DEFAULT_PING_TARGET, SwitchBuilder, SwitchControl};
use crate::transport::{ProcessTransport, Transport};

/// Fixture name printed next to every case.
const FIXTURE: &str = "TestSelfTest";

/// Address that must never answer: not a routable unicast host.
pub const UNREACHABLE_TARGET: &str = "255.255.255.0";

const SEPARATOR_HEAVY: &str =
    "======================================================================";
const SEPARATOR_LIGHT: &str =
    "----------------------------------------------------------------------";

/// The built-in self-test cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTestCase {
    /// Echo round-trip over the channel.
    LocalChannel,
    /// A well-known public address answers ping.
    PingGoogle,
    /// A non-unicast address never answers ping.
    PingFail,
}

impl SelfTestCase {
    /// All cases, in run order.
    pub const ALL: [SelfTestCase; 3] = [
        SelfTestCase::LocalChannel,
        SelfTestCase::PingGoogle,
        SelfTestCase::PingFail,
    ];

    /// Case name as printed in reports.
    pub fn name(&self) -> &'static str {
        match self {
            SelfTestCase::LocalChannel => "test_local_channel",
            SelfTestCase::PingGoogle => "test_ping_google",
            SelfTestCase::PingFail => "test_ping_fail",
        }
    }

    /// Run the case body. `Ok(Err(_))` is an assertion failure.
    async fn run<T: Transport>(
        &self,
        switch: &mut SwitchControl<T>,
    ) -> Result<std::result::Result<(), String>> {
        Ok(match self {
            SelfTestCase::LocalChannel => check(
                switch.test_channel().await?,
                "echo round-trip did not complete",
            ),
            SelfTestCase::PingGoogle => check(
                switch.ping(DEFAULT_PING_TARGET).await?,
                &format!("{} is not reachable", DEFAULT_PING_TARGET),
            ),
            SelfTestCase::PingFail => check(
                !switch.ping(UNREACHABLE_TARGET).await?,
                &format!("{} unexpectedly answered ping", UNREACHABLE_TARGET),
            ),
        })
    }
}

fn check(condition: bool, message: &str) -> std::result::Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

/// How a single case ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    /// The case passed.
    Pass,
    /// An assertion did not hold.
    Fail(String),
    /// Setup or a harness operation returned an error.
    Error(String),
}

/// Result of one case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    /// Which case ran.
    pub case: SelfTestCase,
    /// How it ended.
    pub outcome: CaseOutcome,
    /// Time spent including setup and teardown.
    pub elapsed: Duration,
}

/// Results of a whole suite run.
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    /// Per-case results, in run order.
    pub results: Vec<CaseResult>,
    /// Total wall time.
    pub elapsed: Duration,
}

impl SuiteReport {
    /// Number of cases run.
    pub fn tests_run(&self) -> usize {
        self.results.len()
    }

    /// Number of failed assertions.
    pub fn failures(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Fail(_)))
    }

    /// Number of errored cases.
    pub fn errors(&self) -> usize {
        self.count(|o| matches!(o, CaseOutcome::Error(_)))
    }

    /// Whether every case passed.
    pub fn was_successful(&self) -> bool {
        self.failures() == 0 && self.errors() == 0
    }

    fn count(&self, pred: impl Fn(&CaseOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

type Setup<T> = Box<dyn Fn() -> Result<SwitchControl<T>> + Send + Sync>;

/// An ordered list of self-test cases with a fixture factory.
pub struct SelfTestSuite<T: Transport = ProcessTransport> {
    cases: Vec<SelfTestCase>,
    setup: Setup<T>,
}

impl SelfTestSuite<ProcessTransport> {
    /// All built-in cases against a local shell run as `user`.
    pub fn standard(user: impl Into<String>) -> Self {
        let user = user.into();
        Self::with_setup(SelfTestCase::ALL.to_vec(), move || {
            SwitchBuilder::new().user(user.clone()).spawn()
        })
    }
}

impl<T: Transport> SelfTestSuite<T> {
    /// Suite with a custom fixture factory.
    pub fn with_setup<F>(cases: Vec<SelfTestCase>, setup: F) -> Self
    where
        F: Fn() -> Result<SwitchControl<T>> + Send + Sync + 'static,
    {
        Self {
            cases,
            setup: Box::new(setup),
        }
    }

    /// Suite with no cases.
    pub fn empty<F>(setup: F) -> Self
    where
        F: Fn() -> Result<SwitchControl<T>> + Send + Sync + 'static,
    {
        Self::with_setup(Vec::new(), setup)
    }

    /// The cases this suite runs.
    pub fn cases(&self) -> &[SelfTestCase] {
        &self.cases
    }

    /// Run every case, writing progress and a summary to `out`.
    pub async fn run(&self, out: &mut dyn Write) -> SuiteReport {
        let start = Instant::now();
        let mut results = Vec::with_capacity(self.cases.len());

        for case in &self.cases {
            let _ = write!(out, "{} ({}) ... ", case.name(), FIXTURE);
            let _ = out.flush();

            let result = self.run_case(*case).await;
            let verdict = match &result.outcome {
                CaseOutcome::Pass => "ok",
                CaseOutcome::Fail(_) => "FAIL",
                CaseOutcome::Error(_) => "ERROR",
            };
            let _ = writeln!(out, "{}", verdict);
            results.push(result);
        }

        let report = SuiteReport {
            results,
            elapsed: start.elapsed(),
        };
        write_summary(out, &report);
        report
    }

    async fn run_case(&self, case: SelfTestCase) -> CaseResult {
        let start = Instant::now();
        debug!("setting up {}", case.name());

        let outcome = match (self.setup)() {
            Err(e) => CaseOutcome::Error(e.to_string()),
            Ok(mut switch) => {
                let outcome = match case.run(&mut switch).await {
                    Ok(Ok(())) => CaseOutcome::Pass,
                    Ok(Err(message)) => CaseOutcome::Fail(message),
                    Err(e) => CaseOutcome::Error(e.to_string()),
                };
                if let Err(e) = switch.close() {
                    warn!("{}: teardown failed: {}", case.name(), e);
                }
                outcome
            }
        };

        CaseResult {
            case,
            outcome,
            elapsed: start.elapsed(),
        }
    }
}

fn write_summary(out: &mut dyn Write, report: &SuiteReport) {
    for result in &report.results {
        let (kind, message) = match &result.outcome {
            CaseOutcome::Pass => continue,
            CaseOutcome::Fail(m) => ("FAIL", m),
            CaseOutcome::Error(m) => ("ERROR", m),
        };
        let _ = writeln!(out, "{}", SEPARATOR_HEAVY);
        let _ = writeln!(out, "{}: {} ({})", kind, result.case.name(), FIXTURE);
        let _ = writeln!(out, "{}", SEPARATOR_LIGHT);
        let _ = writeln!(out, "{}", message);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}", SEPARATOR_LIGHT);
    let plural = if report.tests_run() == 1 { "" } else { "s" };
    let _ = writeln!(
        out,
        "Ran {} test{} in {:.3}s",
        report.tests_run(),
        plural,
        report.elapsed.as_secs_f64()
    );
    let _ = writeln!(out);

    if report.was_successful() {
        let _ = writeln!(out, "OK");
    } else {
        let mut parts = Vec::new();
        if report.failures() > 0 {
            parts.push(format!("failures={}", report.failures()));
        }
        if report.errors() > 0 {
            parts.push(format!("errors={}", report.errors()));
        }
        let _ = writeln!(out, "FAILED ({})", parts.join(", "));
    }
}
