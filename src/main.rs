//! cellpack-mcp: battery pack sizing for cylindrical cells
//!
//! Runs the sizer once from the command line (`size`) or serves it to AI
//! assistants over MCP on stdio (`serve`, the default).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use cellpack_mcp::config::{self, Config};
use cellpack_mcp::mcp::server::{McpServer, ServerSettings};
use cellpack_mcp::pack::{report, CapacityUnit, LayoutPreference, PackInputs, PackSizer};
use cellpack_mcp::schematic;

/// Battery pack sizing for cylindrical cells.
///
/// Works out how many cells to wire in series and in parallel to reach a
/// target voltage and usable capacity.
#[derive(Parser, Debug)]
#[command(name = "cellpack-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(long, global = true, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Size a pack once and print the result
    Size(SizeArgs),

    /// Run the MCP server on stdio
    Serve,
}

#[derive(clap::Args, Debug)]
struct SizeArgs {
    /// Usable capacity the pack must deliver
    #[arg(long)]
    capacity: f64,

    /// Unit of --capacity: mAh or Ah [default: from config]
    #[arg(long, value_parser = parse_capacity_unit)]
    capacity_unit: Option<CapacityUnit>,

    /// Minimum pack voltage (V)
    #[arg(long)]
    voltage: f64,

    /// Rated capacity of one cell (mAh)
    #[arg(long)]
    cell_capacity: f64,

    /// Nominal voltage of one cell (V)
    #[arg(long)]
    cell_voltage: f64,

    /// System losses in percent [default: from config]
    #[arg(long)]
    loss: Option<f64>,

    /// Delivered share of the rated cell capacity in percent [default: from config]
    #[arg(long)]
    variation: Option<f64>,

    /// Search for the best layout: balanced, more-series or more-parallel
    #[arg(long, value_parser = parse_preference)]
    preference: Option<LayoutPreference>,

    /// Print an ASCII schematic of the layout
    #[arg(long)]
    schematic: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn parse_capacity_unit(s: &str) -> Result<CapacityUnit, String> {
    CapacityUnit::from_str_loose(s).ok_or_else(|| format!("unknown unit '{s}' (expected mAh or Ah)"))
}

fn parse_preference(s: &str) -> Result<LayoutPreference, String> {
    LayoutPreference::from_str_loose(s).ok_or_else(|| {
        format!("unknown preference '{s}' (expected balanced, more-series or more-parallel)")
    })
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for cellpack-mcp.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    match args.command {
        Some(Command::Size(size_args)) => run_size(&cfg, &size_args),
        Some(Command::Serve) | None => run_serve(&cfg),
    }
}

/// Sizes one pack and prints the result to stdout.
fn run_size(cfg: &Config, args: &SizeArgs) -> ExitCode {
    let inputs = PackInputs {
        target_capacity: args.capacity,
        capacity_unit: args
            .capacity_unit
            .unwrap_or(cfg.defaults.capacity_unit),
        target_voltage_v: args.voltage,
        cell_capacity_mah: args.cell_capacity,
        cell_nominal_voltage_v: args.cell_voltage,
        loss_percent: args.loss.unwrap_or(cfg.defaults.loss_percent),
        variation_percent: args.variation.unwrap_or(cfg.defaults.variation_percent),
    };

    let req = match inputs.to_requirement() {
        Ok(req) => req,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let sizer = PackSizer::with_bounds(cfg.search.bounds());
    let outcome = match args.preference {
        None => sizer.size_direct(&req).map(Some),
        Some(preference) => sizer.size_by_preference(&req, preference),
    };

    let sizing = match outcome {
        Ok(Some(sizing)) => sizing,
        Ok(None) => {
            let bounds = sizer.bounds();
            eprintln!(
                "No layout up to {}S{}P meets both the voltage and capacity targets",
                bounds.max_series, bounds.max_parallel
            );
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!(error = %e, "Pack sizing failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let render = args.schematic.then(|| {
        schematic::render_ascii(
            sizing.series_count,
            sizing.parallel_count,
            &cfg.schematic.options(),
        )
    });

    if args.json {
        let mut value = serde_json::json!({
            "layout": sizing.layout(),
            "requirement": req,
            "sizing": sizing,
        });
        if let Some(preference) = args.preference {
            value["preference"] = serde_json::json!(preference.to_string());
        }
        if let Some(render) = &render {
            value["schematic"] = serde_json::json!(render);
        }
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", report::summary(&req, &sizing));
        if let Some(render) = &render {
            println!();
            println!("{render}");
        }
    }

    ExitCode::SUCCESS
}

/// Runs the MCP server until stdin closes or a shutdown signal arrives.
fn run_serve(cfg: &Config) -> ExitCode {
    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "cellpack-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting cellpack-mcp server"
    );

    let settings = ServerSettings::from_config(cfg);
    info!(
        max_series = settings.sizer.bounds().max_series,
        max_parallel = settings.sizer.bounds().max_parallel,
        "Search bounds configured"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        let mut server = McpServer::new(settings);
        info!("MCP server ready, waiting for client connection...");
        server.run().await
    });

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
