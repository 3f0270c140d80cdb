use brian::{RunReport, StatementResult, Termination};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const RED: &str = "\x1b[31m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(path: &str, report: &RunReport, color: bool, trace: bool) {
    let palette = ansi::Palette::new(color);
    println!("{}", palette.bold(palette.paint(format!("Program: {path}"), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Statements ━━━", ansi::GRAY));
    if report.results.is_empty() {
        println!("{}", palette.dim("  No statements"));
    }
    for result in &report.results {
        print_statement(result, &palette);
        if trace {
            print_steps(report, result.index(), &palette);
        }
    }

    if !report.warnings.is_empty() || !report.errors.is_empty() {
        println!("\n{}", palette.paint("━━━ Diagnostics ━━━", ansi::GRAY));
        for warning in &report.warnings {
            println!("  {} {}", palette.paint("warning:", ansi::YELLOW), warning);
        }
        for err in &report.errors {
            println!("  {} {}", palette.paint("error:", ansi::RED), err);
        }
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Parse: {}  │  Rewrite: {}",
        palette.paint(format!("{:?}", report.metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", report.metrics.parse), ansi::CYAN),
        palette.dim(format!("{:?}", report.metrics.rewrite)),
    );
    println!();
}

fn print_statement(result: &StatementResult, palette: &ansi::Palette) {
    match result {
        StatementResult::Rule { index, rule } => {
            println!(
                "  {} {} {} {}",
                palette.paint(format!("[{index}]"), ansi::GRAY),
                palette.paint("rule ", ansi::BLUE),
                palette.bold(format!("{} -> {}", rule.head, rule.body)),
                palette.dim(format!("(#{})", rule.id)),
            );
        }
        StatementResult::Query { index, original, outcome } => {
            let status = match outcome.termination {
                Termination::Normal => palette.dim(format!("{} steps", outcome.metrics.steps.len())),
                Termination::StepLimit { limit } => {
                    palette.paint(format!("stopped: step limit {limit} reached"), ansi::YELLOW)
                }
                Termination::Cycle { step } => palette.paint(format!("stopped: cycle at step {step}"), ansi::YELLOW),
            };
            println!(
                "  {} {} {} {} {}  {}",
                palette.paint(format!("[{index}]"), ansi::GRAY),
                palette.paint("query", ansi::BLUE),
                original,
                palette.dim("⟶"),
                palette.bold(palette.paint(outcome.term.to_string(), ansi::GREEN)),
                status,
            );
        }
    }
}

fn print_steps(report: &RunReport, index: usize, palette: &ansi::Palette) {
    for step in report.steps_for(index) {
        println!(
            "      {} {} {} {}",
            palette.paint(format!("step {}:", step.step), ansi::YELLOW),
            palette.paint(&step.rule_label, ansi::CYAN),
            palette.dim(format!("sites: {}", step.sites)),
            palette.dim(format!("{:?}", step.duration)),
        );
    }
}
