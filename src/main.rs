//! Physio Sim - Entry point
//!
//! Circadian PK/PD simulation of neurotransmitters, hormones and metabolic
//! markers.
//!
//! CLI Usage:
//!   cargo run                              # Demo day with default interventions
//!   cargo run -- --days 2 --step 10        # Longer demo, coarser grid
//!   cargo run -- --request run.json --csv  # Run a request file, export CSV
//!   cargo run -- --validate                # Check the intervention library

use std::path::PathBuf;

use anyhow::{Context, Result};
use physio_sim::{
    compute,
    conditions::ConditionRegistry,
    config::SimulationParameters,
    export::{export_response_json, CsvExporter},
    validate_library, ComputeRequest, InterventionLibrary, RequestBuilder, TimeGrid,
};

struct CliOptions {
    request: Option<PathBuf>,
    params: Option<PathBuf>,
    days: f64,
    step_min: f64,
    conditions: Vec<(String, f64)>,
    validate: bool,
    csv: bool,
    json: bool,
}

fn parse_args() -> CliOptions {
    let args: Vec<String> = std::env::args().collect();
    let mut opts = CliOptions {
        request: None,
        params: None,
        days: 1.0,
        step_min: 5.0,
        conditions: Vec::new(),
        validate: false,
        csv: false,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--request" | "-r" => {
                i += 1;
                if i < args.len() {
                    opts.request = Some(PathBuf::from(&args[i]));
                }
            }
            "--params" | "-p" => {
                i += 1;
                if i < args.len() {
                    opts.params = Some(PathBuf::from(&args[i]));
                }
            }
            "--days" | "-d" => {
                i += 1;
                if i < args.len() {
                    opts.days = args[i].parse().unwrap_or(1.0);
                }
            }
            "--step" | "-s" => {
                i += 1;
                if i < args.len() {
                    opts.step_min = args[i].parse().unwrap_or(5.0);
                }
            }
            "--condition" | "-c" => {
                i += 1;
                if i < args.len() {
                    // name[:severity]
                    let mut parts = args[i].splitn(2, ':');
                    let name = parts.next().unwrap_or_default().to_string();
                    let severity = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0.5);
                    opts.conditions.push((name, severity));
                }
            }
            "--validate" => opts.validate = true,
            "--csv" => opts.csv = true,
            "--json" => opts.json = true,
            "--help" | "-h" => {
                println!("Physio Sim - circadian PK/PD simulator");
                println!();
                println!("Usage: physio-sim [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --request, -r FILE     Run a JSON compute request");
                println!("  --params, -p FILE      Simulation parameters (default: data/parameters/simulation.json)");
                println!("  --days, -d N           Demo length in days (default: 1)");
                println!("  --step, -s MIN         Demo grid step in minutes (default: 5)");
                println!("  --condition, -c NAME[:SEVERITY]  Apply a condition to the demo");
                println!("  --validate             Validate the built-in intervention library");
                println!("  --csv                  Export the response as CSV");
                println!("  --json                 Export the response as JSON");
                println!("  --help, -h             Show this help");
                println!();
                println!("{}", ConditionRegistry::help());
                std::process::exit(0);
            }
            other => log::warn!("Ignoring unknown argument '{}'", other),
        }
        i += 1;
    }
    opts
}

/// Coffee, meals, a walk and nightly sleep on every day
fn demo_request(library: &InterventionLibrary, opts: &CliOptions, params: &SimulationParameters) -> ComputeRequest {
    let days = opts.days.max(1.0).ceil() as usize;
    let mut builder = RequestBuilder::new(library, TimeGrid::days(opts.days.max(0.0), opts.step_min))
        .integrator(params.integrator)
        .homeostasis(params.homeostasis.clone())
        .daily("coffee", "caffeine", 450.0, 0.0, days)
        .daily("breakfast", "meal", 480.0, 30.0, days)
        .daily("lunch", "meal", 750.0, 30.0, days)
        .daily("walk", "exercise", 1020.0, 45.0, days)
        .daily("dinner", "meal", 1140.0, 30.0, days)
        .daily("night", "sleep", 1380.0, 480.0, days);
    for (name, severity) in &opts.conditions {
        builder = builder.condition(name, *severity);
    }
    builder.build()
}

fn load_request(path: &PathBuf, library: &InterventionLibrary) -> Result<ComputeRequest> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut request: ComputeRequest =
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    let unresolved = request.resolve_interventions(library);
    if unresolved > 0 {
        log::warn!("{} intervention instances could not be resolved", unresolved);
    }
    Ok(request)
}

fn run_validation(library: &InterventionLibrary) -> bool {
    println!("=== Intervention Library Validation ===\n");
    let issues = validate_library(library);
    for issue in &issues {
        println!("  ✗ {}", issue);
    }
    if issues.is_empty() {
        println!("  ✓ {} interventions, no issues", library.definitions().len());
    } else {
        println!("\n{} issues found", issues.len());
    }
    issues.is_empty()
}

fn main() -> Result<()> {
    env_logger::init();

    let opts = parse_args();
    let library = InterventionLibrary::builtin();

    if opts.validate {
        if !run_validation(&library) {
            std::process::exit(1);
        }
        return Ok(());
    }

    let params = match &opts.params {
        Some(path) => SimulationParameters::load_or_default(path),
        None => SimulationParameters::load(),
    };

    let request = match &opts.request {
        Some(path) => load_request(path, &library)?,
        None => demo_request(&library, &opts, &params),
    };

    println!("=== Physio Sim ===\n");
    println!(
        "Grid points: {}, interventions: {}, method: {:?}",
        request.grid.len(),
        request.interventions.len(),
        request.integrator.method
    );

    let response = compute(&request);
    response.print_summary();

    for spec in &request.conditions {
        if let Some(model) = ConditionRegistry::create(&spec.name, spec.severity) {
            model.diagnostics(&response).print_summary();
        }
    }

    if opts.csv {
        let path = CsvExporter::new(&params.export).export(&response)?;
        println!("\nCSV written to {}", path.display());
    }
    if opts.json {
        let path = export_response_json(&response, &params.export)?;
        println!("JSON written to {}", path.display());
    }

    Ok(())
}
