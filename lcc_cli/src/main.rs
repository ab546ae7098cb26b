//! # Bridge LCC CLI
//!
//! Evaluates a project file, or the built-in demo, and prints a summary
//! followed by the JSON report.
//!
//! ```text
//! lcc_cli project.json --wpi-year 2023
//! lcc_cli --demo --debug-breakdown
//! RUST_LOG=debug lcc_cli --demo --compact
//! ```

use std::path::PathBuf;

use clap::Parser;

use lcc_core::lifecycle::LifeCycleStage;
use lcc_core::reference::WpiSeries;
use lcc_core::voc::ModelRegistry;
use lcc_core::{CalcError, CalcResult, EvaluationOptions, PriceIndexTable, Project, ProjectReport, ReferenceTables};

#[derive(Debug, Parser)]
#[command(name = "lcc_cli", version, about = "Bridge life-cycle cost and road-user cost calculator")]
struct Args {
    /// Project JSON file to evaluate
    #[arg(required_unless_present = "demo")]
    input: Option<PathBuf>,

    /// Evaluate the built-in demo project instead of a file
    #[arg(long, conflicts_with = "input")]
    demo: bool,

    /// Year of the wholesale price index applied to road-user costs
    #[arg(long, default_value_t = 2024)]
    wpi_year: u16,

    /// Include the per-class congestion breakdown in the report
    #[arg(long)]
    debug_breakdown: bool,

    /// Print the report as single-line JSON
    #[arg(long)]
    compact: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let project = match load_project(&args) {
        Ok(project) => project,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    match run(&project, &args) {
        Ok(()) => log::info!("finished."),
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            std::process::exit(1);
        }
    }
}

fn load_project(args: &Args) -> Result<Project, String> {
    match &args.input {
        Some(path) if !args.demo => {
            let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            Project::from_json(&text).map_err(|e| format!("{}: {e}", path.display()))
        }
        _ => Ok(Project::demo()),
    }
}

fn run(project: &Project, args: &Args) -> CalcResult<()> {
    let tables = ReferenceTables::standard()?;
    let wpi = PriceIndexTable::from_series(WpiSeries::standard()?, args.wpi_year)?;
    let options = EvaluationOptions {
        debug_breakdown: args.debug_breakdown,
    };
    let report = project.evaluate_with(tables, &wpi, &ModelRegistry::standard(), options)?;

    print_summary(project, &report);

    let json = if args.compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    }
    .map_err(CalcError::from)?;
    println!();
    println!("JSON Output:");
    println!("{}", json);
    Ok(())
}

fn print_summary(project: &Project, report: &ProjectReport) {
    let meta = &project.meta;
    let summary = &report.road_user.summary;
    let life_cycle = &report.life_cycle;

    println!("═══════════════════════════════════════");
    println!("  BRIDGE LIFE-CYCLE COST");
    println!("═══════════════════════════════════════");
    println!();
    println!("Project:  {} ({})", meta.job_id, meta.client);
    println!("Engineer: {}", meta.engineer);
    println!("Prices:   {}, WPI {}", report.reference_vintage, report.wpi_year);
    println!();
    println!("Road-user cost ({}, V/C {:.4}):", summary.lane_type.code(), summary.volume_capacity_ratio);
    println!("  Distance: {:>14.2} IT {:>14.2} ET {}", summary.distance_total.it, summary.distance_total.et, summary.unit);
    println!("  Time:     {:>14.2} IT {:>14.2} ET {}", summary.time_total.it, summary.time_total.et, summary.unit);
    println!("  Total:    {:>14.2} IT {:>14.2} ET {}", summary.total.it, summary.total.et, summary.unit);
    println!();
    println!("Life-cycle cost (present worth):");
    for stage in LifeCycleStage::ALL {
        println!("  {:<18} {:>20}", stage.display_name(), life_cycle.stage_totals.get(stage).to_string());
        for item in life_cycle.line_items.iter().filter(|item| item.stage == stage) {
            println!("    {:<52} {:>20}", item.name, item.discounted_amount.to_string());
        }
    }
    println!();
    println!("  Economic:      {}", life_cycle.economic_total);
    println!("  Environmental: {}", life_cycle.environmental_total);
    println!("═══════════════════════════════════════");
    println!("  TOTAL: {}", life_cycle.total);
    println!("═══════════════════════════════════════");

    if !life_cycle.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &life_cycle.warnings {
            println!("  [WARN] {}", warning);
        }
    }
}
