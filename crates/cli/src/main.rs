//! KPI Calc command line.

mod display;
mod shell;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use kpical_core::{kpi_hint, Hint, Metrics, Record, SplitMetrics};
use kpical_engine::{
    ClassicFormula, FieldOf, Formula, RevisedFormula, Rounding, Session, SplitFormula,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "kpical", version)]
#[command(about = "KPI ratio calculator with threshold back-solving", long_about = None)]
struct Cli {
    /// Formula version the numbers were calibrated against
    #[arg(long, global = true, value_enum, default_value = "v1")]
    formula: FormulaVersion,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the KPI ratio from the given inputs
    Kpi {
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Back-solve one field so the ratio lands on the threshold
    Solve {
        /// Field to recompute
        field: String,
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// List the record's fields and which of them are solve targets
    Fields,
    /// Interactive editing session with solve and undo
    Shell {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

/// The four shipped formula versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormulaVersion {
    /// Product form, exact solves
    V1,
    /// Product form, solved values rounded up
    V2,
    /// Split form with the percent-scaled watched share
    V3,
    /// Product form with the version-4 expense solve
    V4,
}

impl FormulaVersion {
    fn as_str(&self) -> &'static str {
        match self {
            FormulaVersion::V1 => "v1",
            FormulaVersion::V2 => "v2",
            FormulaVersion::V3 => "v3",
            FormulaVersion::V4 => "v4",
        }
    }
}

#[derive(Args, Clone)]
struct InputArgs {
    /// Production cost
    #[arg(long, default_value_t = 0.0)]
    cost: f64,

    /// Amount already spent
    #[arg(long, default_value_t = 0.0)]
    expenses: f64,

    /// Number of workers on the job
    #[arg(long, default_value_t = 0)]
    workers: u32,

    /// Average number of views
    #[arg(long, default_value_t = 0.0)]
    avg_views: f64,

    /// Average viewing duration in minutes (product form)
    #[arg(long)]
    avg_duration: Option<f64>,

    /// Viewing window in minutes (split form only)
    #[arg(long)]
    duration: Option<f64>,

    /// Watched share of the window in percent (split form only)
    #[arg(long)]
    avg_duration_pct: Option<f64>,
}

impl InputArgs {
    fn product(&self) -> Result<Metrics> {
        if self.duration.is_some() || self.avg_duration_pct.is_some() {
            bail!("--duration and --avg-duration-pct apply to the split form only (--formula v3)");
        }
        Ok(Metrics {
            cost: self.cost,
            expenses: self.expenses,
            workers: self.workers,
            avg_views: self.avg_views,
            avg_duration: self.avg_duration.unwrap_or(0.0),
        })
    }

    fn split(&self) -> Result<SplitMetrics> {
        if self.avg_duration.is_some() {
            bail!("the split form takes --duration and --avg-duration-pct, not --avg-duration");
        }
        let (Some(duration), Some(avg_duration_pct)) = (self.duration, self.avg_duration_pct)
        else {
            bail!("the split form needs --duration and --avg-duration-pct");
        };
        Ok(SplitMetrics {
            cost: self.cost,
            expenses: self.expenses,
            workers: self.workers,
            duration,
            avg_views: self.avg_views,
            avg_duration_pct,
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let version = cli.formula;

    match cli.command {
        Commands::Kpi { inputs } => match version {
            FormulaVersion::V1 => run_kpi(version, ClassicFormula::new(), inputs.product()?, cli.json),
            FormulaVersion::V2 => run_kpi(
                version,
                ClassicFormula::new().with_rounding(Rounding::Up),
                inputs.product()?,
                cli.json,
            ),
            FormulaVersion::V3 => run_kpi(version, SplitFormula::new(), inputs.split()?, cli.json),
            FormulaVersion::V4 => run_kpi(version, RevisedFormula::new(), inputs.product()?, cli.json),
        },
        Commands::Solve { field, inputs } => match version {
            FormulaVersion::V1 => {
                run_solve(version, ClassicFormula::new(), inputs.product()?, &field, cli.json)
            }
            FormulaVersion::V2 => run_solve(
                version,
                ClassicFormula::new().with_rounding(Rounding::Up),
                inputs.product()?,
                &field,
                cli.json,
            ),
            FormulaVersion::V3 => {
                run_solve(version, SplitFormula::new(), inputs.split()?, &field, cli.json)
            }
            FormulaVersion::V4 => {
                run_solve(version, RevisedFormula::new(), inputs.product()?, &field, cli.json)
            }
        },
        Commands::Fields => match version {
            FormulaVersion::V1 => run_fields(ClassicFormula::new(), cli.json),
            FormulaVersion::V2 => run_fields(ClassicFormula::new().with_rounding(Rounding::Up), cli.json),
            FormulaVersion::V3 => run_fields(SplitFormula::new(), cli.json),
            FormulaVersion::V4 => run_fields(RevisedFormula::new(), cli.json),
        },
        Commands::Shell { inputs } => match version {
            FormulaVersion::V1 => {
                Ok(shell::run(Session::new(ClassicFormula::new(), inputs.product()?))?)
            }
            FormulaVersion::V2 => Ok(shell::run(Session::new(
                ClassicFormula::new().with_rounding(Rounding::Up),
                inputs.product()?,
            ))?),
            FormulaVersion::V3 => {
                Ok(shell::run(Session::new(SplitFormula::new(), inputs.split()?))?)
            }
            FormulaVersion::V4 => {
                Ok(shell::run(Session::new(RevisedFormula::new(), inputs.product()?))?)
            }
        },
    }
}

#[derive(Serialize)]
struct KpiReport {
    formula: &'static str,
    kpi: f64,
    threshold: f64,
    hint: Hint,
}

#[derive(Serialize)]
struct SolveReport<M> {
    formula: &'static str,
    field: String,
    previous: f64,
    solved: f64,
    kpi: f64,
    threshold: f64,
    hint: Hint,
    metrics: M,
}

#[derive(Serialize)]
struct FieldReport {
    field: String,
    solvable: bool,
}

fn run_kpi<F: Formula>(version: FormulaVersion, formula: F, metrics: F::Metrics, json: bool) -> Result<()> {
    let kpi = formula.kpi(&metrics);
    let hint = kpi_hint(kpi, formula.threshold());
    if json {
        let report = KpiReport {
            formula: version.as_str(),
            kpi,
            threshold: formula.threshold(),
            hint,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!(
        "KPI: {} [{}] (threshold {})",
        display::format_ratio(kpi),
        verdict(hint),
        display::format_ratio(formula.threshold()),
    );
    Ok(())
}

fn run_solve<F>(
    version: FormulaVersion,
    formula: F,
    metrics: F::Metrics,
    field: &str,
    json: bool,
) -> Result<()>
where
    F: Formula,
    F::Metrics: Serialize,
{
    let field: FieldOf<F> = field.parse()?;
    let previous = metrics.get(field);
    let Some(solved) = formula.solve(&metrics, field) else {
        bail!("{} cannot be back-solved under formula {}", field, version.as_str());
    };
    let kpi = formula.kpi(&solved);
    let hint = kpi_hint(kpi, formula.threshold());
    if json {
        let report = SolveReport {
            formula: version.as_str(),
            field: field.to_string(),
            previous,
            solved: solved.get(field),
            kpi,
            threshold: formula.threshold(),
            hint,
            metrics: solved,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!(
        "{}: {} (was {})",
        field,
        display::format_value(solved.get(field)),
        display::format_value(previous),
    );
    println!(
        "KPI: {} [{}] (threshold {})",
        display::format_ratio(kpi),
        verdict(hint),
        display::format_ratio(formula.threshold()),
    );
    Ok(())
}

fn run_fields<F: Formula>(formula: F, json: bool) -> Result<()> {
    let reports: Vec<FieldReport> = <F::Metrics as Record>::FIELDS
        .iter()
        .map(|&field| FieldReport {
            field: field.to_string(),
            solvable: formula.targets().contains(&field),
        })
        .collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }
    for report in reports {
        let marker = if report.solvable { "  (solvable)" } else { "" };
        println!("{}{}", report.field, marker);
    }
    Ok(())
}

fn verdict(hint: Hint) -> &'static str {
    if hint.is_alert() {
        "over threshold"
    } else {
        "ok"
    }
}
