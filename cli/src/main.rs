//! trail CLI — driving adapter for the trail routing engine.
//!
//! Subcommands:
//! - `check <config>` — validate that a router config loads
//! - `change <config> <path> [--arg v]...` — dispatch `route/change`
//! - `set <config> <template> [--data k=v]... [--arg v]...` — dispatch `route/set`
//! - `expand <template> [--data k=v]...` — print the synthesized path
//! - `info` — print registered handler type URLs
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `trail=warn`).

use std::path::Path;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use trail::{
    HandlerRegistry, HandlerRegistryBuilder, Operation, Outcome, RouteData, RouteValue, Router,
    RouterConfig,
};

#[derive(Parser)]
#[command(name = "trail")]
#[command(about = "Match paths against route configs and dispatch to handlers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate that a config loads (handlers resolve, patterns compile)
    Check {
        /// Router config (.yaml, .yml or .json)
        config: String,
    },
    /// Dispatch `route/change` for a concrete path
    Change {
        /// Router config (.yaml, .yml or .json)
        config: String,
        /// Path to match
        path: String,
        #[command(flatten)]
        dispatch: DispatchArgs,
    },
    /// Dispatch `route/set`: expand a template, then match it
    Set {
        /// Router config (.yaml, .yml or .json)
        config: String,
        /// Route template
        template: String,
        /// Template value, repeatable
        #[arg(long = "data", value_name = "KEY=VALUE")]
        data: Vec<String>,
        #[command(flatten)]
        dispatch: DispatchArgs,
    },
    /// Print the path a template expands to
    Expand {
        /// Route template
        template: String,
        /// Template value, repeatable
        #[arg(long = "data", value_name = "KEY=VALUE")]
        data: Vec<String>,
    },
    /// Print registered handler type URLs
    Info,
}

#[derive(Args)]
struct DispatchArgs {
    /// Extra handler argument, repeatable
    #[arg(long = "arg", value_name = "VALUE")]
    args: Vec<String>,
    /// Print every evaluated route
    #[arg(long)]
    trace: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trail=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { config } => cmd_check(&config),
        Commands::Change {
            config,
            path,
            dispatch,
        } => cmd_dispatch(&config, Operation::change(path), &dispatch),
        Commands::Set {
            config,
            template,
            data,
            dispatch,
        } => parse_data(&data)
            .and_then(|data| cmd_dispatch(&config, Operation::set(template, data), &dispatch)),
        Commands::Expand { template, data } => cmd_expand(&template, &data),
        Commands::Info => {
            cmd_info();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(config_path: &str) -> Result<(), String> {
    let router = load_router(config_path)?;
    println!("Config valid ({} routes)", router.len());
    Ok(())
}

fn cmd_dispatch(config_path: &str, op: Operation, args: &DispatchArgs) -> Result<(), String> {
    let router = load_router(config_path)?;
    let op = op.with_args(args.args.iter().map(|a| RouteValue::coerce(a)));

    if args.trace {
        let trace = router
            .dispatch_with_trace(&op)
            .map_err(|e| format!("dispatch failed: {e}"))?;
        eprintln!("{trace}");
        println!("{}", render_outcome(&trace.outcome));
    } else {
        let outcome = router
            .dispatch(&op)
            .map_err(|e| format!("dispatch failed: {e}"))?;
        debug!(outcome = %render_outcome(&outcome), "dispatch finished");
        println!("{}", render_outcome(&outcome));
    }
    Ok(())
}

fn cmd_expand(template: &str, data: &[String]) -> Result<(), String> {
    let data = parse_data(data)?;
    let path = trail::synthesize(template, &data).map_err(|e| e.to_string())?;
    println!("{path}");
    Ok(())
}

fn cmd_info() {
    println!("Registered handlers:");
    for url in build_registry().type_urls() {
        println!("  {url}");
    }
}

fn render_outcome(outcome: &Outcome<String>) -> String {
    match outcome {
        Outcome::Handled(value) => value.clone(),
        Outcome::NoMatch => "(no match)".to_owned(),
        Outcome::Rejected => "(rejected)".to_owned(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry() -> HandlerRegistry<String> {
    trail_test::register(HandlerRegistryBuilder::new()).build()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_router(path: &str) -> Result<Router<String>, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;
    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = parse_config(&content, is_json)?;
    debug!(path, routes = config.routes.len(), "loading router config");
    build_registry()
        .load_router(config)
        .map_err(|e| format!("config invalid: {e}"))
}

fn parse_config(content: &str, is_json: bool) -> Result<RouterConfig, String> {
    debug!(format = if is_json { "json" } else { "yaml" }, "parsing router config");
    if is_json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_data(pairs: &[String]) -> Result<RouteData, String> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("invalid data pair \"{pair}\", expected key=value"))?;
            Ok((key.to_owned(), RouteValue::coerce(value)))
        })
        .collect()
}
