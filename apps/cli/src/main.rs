//! Command line front end for unit-aware filter expressions
//!
//! Usage:
//!   mensura resolve "(distance / duration) > (80 km / 1 h)" --field distance=km --field duration=h
//!   mensura convert 98.6 degF degC
//!   mensura equivalent N "kg*m/s^2"
//!   mensura normalize "2 kPa"

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mensura_filter::{parse, parse_with_validator, walk_post_order, Expr, UnitContext, UnitResolver};
use mensura_units::{AlgebraicFactor, DimensionalAnalyzer, Quantity, RegistryConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[clap(name = "mensura")]
#[clap(about = "Dimensional analysis and unit checking for filter expressions")]
struct Args {
    /// Registry JSON file (defaults to the built-in SI registry)
    #[clap(short, long, global = true)]
    registry: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the measurement unit of every node of an expression
    Resolve {
        expression: String,

        /// Field unit binding, e.g. `distance=km`
        #[clap(short, long = "field", value_parser = parse_field_binding)]
        fields: Vec<(String, AlgebraicFactor)>,

        /// Reject literal units that the registry does not know
        #[clap(long)]
        strict_units: bool,

        /// Print the node units as JSON
        #[clap(long)]
        json: bool,
    },

    /// Convert a value between two units factors
    Convert {
        #[clap(allow_hyphen_values = true)]
        value: f64,
        from: String,
        to: String,
    },

    /// Check whether two units factors share the same dimensions
    Equivalent { first: String, second: String },

    /// Express a quantity over fundamental units, e.g. "2 kPa"
    Normalize { quantity: String },

    /// Show the physical dimension of a units factor
    Dimension { unit: String },

    /// Print the active registry as JSON
    Registry,
}

#[derive(Serialize)]
struct NodeUnit {
    id: u32,
    node: String,
    unit: String,
}

fn parse_field_binding(s: &str) -> std::result::Result<(String, AlgebraicFactor), String> {
    let (name, unit) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=UNIT, got '{}'", s))?;
    let unit = unit.trim().parse::<AlgebraicFactor>().map_err(|e| e.to_string())?;
    Ok((name.trim().to_string(), unit))
}

fn parse_factor(s: &str) -> Result<AlgebraicFactor> {
    s.parse()
        .with_context(|| format!("Invalid units factor '{}'", s))
}

fn load_registry(path: Option<&Path>) -> Result<RegistryConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read registry {}", path.display()))?;
            RegistryConfig::from_json_str(&json)
                .with_context(|| format!("Failed to parse registry {}", path.display()))
        }
        None => Ok(RegistryConfig::si().clone()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let config = load_registry(args.registry.as_deref())?;
    let analyzer = DimensionalAnalyzer::from_config(&config).context("Failed to build registry")?;
    info!(
        fundamental = analyzer.fundamental_dimensions().count(),
        composed = analyzer.composed_dimensions().count(),
        "registry loaded"
    );

    match args.command {
        Command::Resolve {
            expression,
            fields,
            strict_units,
            json,
        } => resolve(&analyzer, &expression, fields, strict_units, json),
        Command::Convert { value, from, to } => {
            let from = parse_factor(&from)?;
            let to = parse_factor(&to)?;
            let converted = analyzer.convert(value, &from, &to)?;
            let params = analyzer.conversion_parameters(&from, &to)?;
            debug!(%params, "conversion parameters");
            println!("{} {} = {} {}", value, from, converted, to);
            println!("parameters: {}", params);
            Ok(())
        }
        Command::Equivalent { first, second } => {
            let first = parse_factor(&first)?;
            let second = parse_factor(&second)?;
            let equivalent = analyzer.are_unit_factors_dimensionally_equivalent(&first, &second)?;
            for unit in [&first, &second] {
                let dimensions = analyzer.fundamental_dimensional_factor_from_units_factor(unit)?;
                println!("{:<16} {}", unit.to_string(), dimensions);
            }
            println!("{}", equivalent);
            if !equivalent {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Normalize { quantity } => {
            let quantity: Quantity = quantity
                .parse()
                .with_context(|| format!("Invalid quantity '{}'", quantity))?;
            println!("{}", quantity.normalize(&analyzer)?);
            Ok(())
        }
        Command::Dimension { unit } => {
            let unit = parse_factor(&unit)?;
            let dimensions = analyzer.fundamental_dimensional_factor_from_units_factor(&unit)?;
            let base = analyzer.fundamental_units_factor(&unit)?;
            println!("{}", dimensions);
            println!("fundamental units: {}", base);
            Ok(())
        }
        Command::Registry => {
            println!("{}", config.to_json_string()?);
            Ok(())
        }
    }
}

fn resolve(
    analyzer: &DimensionalAnalyzer,
    expression: &str,
    fields: Vec<(String, AlgebraicFactor)>,
    strict_units: bool,
    json: bool,
) -> Result<()> {
    let expr = if strict_units {
        parse_with_validator(expression, analyzer)?
    } else {
        parse(expression)?
    };

    let mut ctx = UnitContext::new();
    for (name, unit) in fields {
        ctx.set_field(name, unit);
    }

    let units = UnitResolver::new(&ctx).resolve(&expr)?;

    let mut rows = Vec::with_capacity(units.len());
    walk_post_order(&expr, &mut |node: &Expr| {
        rows.push(NodeUnit {
            id: node.id.0,
            node: node.label(),
            unit: units.get(&node.id).map(ToString::to_string).unwrap_or_default(),
        });
        Ok(())
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in &rows {
        println!("#{:<4} {:<24} {}", row.id, row.node, row.unit);
    }
    Ok(())
}
