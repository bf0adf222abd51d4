//! Output formatting

use console::{style, Term};
use navprobe::{GraphValidation, IssueSeverity, ModelState, RunOutcome, RunReport};
use std::fmt::Write as _;

/// Writes styled lines to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Print a line as-is, even in quiet mode
    pub fn raw(&self, text: &str) {
        let _ = self.term.write_line(text.trim_end_matches('\n'));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        let _ = self.term.write_line(&styled);
    }

    /// Print a run: trace, coverage, then the verdict line
    pub fn run_report<S: ModelState>(&self, report: &RunReport<S>) {
        if !self.quiet {
            self.header(&format!("Run {}", report.run_id));
            self.raw(&render_trace(report));
            self.raw(&report.coverage.summary());
        }
        let verdict = render_outcome(report);
        if report.is_success() {
            self.success(&verdict);
        } else {
            self.failure(&verdict);
        }
    }

    /// Print graph validation issues, most severe first
    pub fn graph_issues<S: ModelState>(&self, validation: &GraphValidation<S>) {
        let mut issues: Vec<_> = validation.issues.iter().collect();
        issues.sort_by_key(|i| std::cmp::Reverse(i.severity()));
        for issue in issues {
            match issue.severity() {
                IssueSeverity::Error => self.failure(&issue.to_string()),
                IssueSeverity::Warning => self.warning(&issue.to_string()),
                IssueSeverity::Info => {
                    if !self.quiet {
                        self.raw(&format!("INFO {issue}"));
                    }
                }
            }
        }
        if validation.is_valid {
            self.success("graph is valid");
        }
    }
}

/// Numbered step listing
#[must_use]
pub fn render_trace<S: ModelState>(report: &RunReport<S>) -> String {
    let mut out = String::new();
    for step in &report.trace {
        let _ = writeln!(out, "{:>4}. {step}", step.index);
    }
    if let RunOutcome::Failed(failure) = &report.outcome {
        let _ = writeln!(
            out,
            "{:>4}. {} --{}--> (failed)",
            report.steps_taken() + 1,
            failure.state,
            failure.action
        );
    }
    out
}

/// One-line verdict
#[must_use]
pub fn render_outcome<S: ModelState>(report: &RunReport<S>) -> String {
    format!(
        "{}/{} steps, {} ({})",
        report.steps_taken(),
        report.budget,
        report.outcome,
        report.coverage.transitions
    )
}
