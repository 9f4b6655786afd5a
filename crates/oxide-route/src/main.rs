//! oxide-route CLI
//!
//! Command-line tool for checking route manifests and probing URIs
//! against them.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use oxide_route::{RouteDescriptor, RouteManifest, Verb};

/// Route compilation and parameter binding tools.
#[derive(Parser)]
#[command(name = "oxide-route")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every route in a manifest and list them.
    Check {
        /// Path to the JSON route manifest.
        manifest: PathBuf,
    },

    /// Find the first route matching a URI and bind its parameters.
    Probe {
        /// Path to the JSON route manifest.
        manifest: PathBuf,

        /// Request URI to test.
        uri: String,

        /// Only consider routes serving this verb.
        #[arg(short = 'X', long, value_parser = parse_verb)]
        verb: Option<Verb>,
    },
}

fn parse_verb(s: &str) -> Result<Verb, String> {
    Verb::from_str(s).ok_or_else(|| format!("unknown verb '{s}'"))
}

fn load(path: &Path) -> anyhow::Result<Vec<RouteDescriptor>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    let routes = RouteManifest::from_json(&json)?.compile()?;
    Ok(routes)
}

/// Returns the first route serving `verb` (any verb when `None`) that
/// matches `uri`. A miss is an error so scripts see a non-zero exit.
fn find_route<'a>(
    routes: &'a [RouteDescriptor],
    uri: &str,
    verb: Option<Verb>,
) -> anyhow::Result<&'a RouteDescriptor> {
    routes
        .iter()
        .filter(|route| verb.is_none_or(|v| route.verb() == v))
        .find(|route| route.is_match(uri))
        .ok_or_else(|| anyhow::anyhow!("No route matches {uri}"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Check { manifest } => {
            let routes = load(&manifest)?;

            println!("\nRoutes:");
            println!("{:-<60}", "");
            for route in &routes {
                let body = route
                    .body_parameter()
                    .map(|p| format!(" <- {}: {}", p.name, p.ty))
                    .unwrap_or_default();
                println!(
                    " {:<7} {} ({}){body}",
                    route.verb(),
                    route.uri_template(),
                    route.handler()
                );
            }
            println!();
        }

        Commands::Probe {
            manifest,
            uri,
            verb,
        } => {
            let routes = load(&manifest)?;

            let route = find_route(&routes, &uri, verb).inspect_err(|e| println!("{e}"))?;

            println!("{} {} -> {}", route.verb(), route.uri_template(), route.handler());
            match route.extract_parameters(&uri) {
                Ok(values) => {
                    for (param, value) in route.path_parameters().iter().zip(&values) {
                        println!("  {}: {} = {value:?}", param.name, param.ty);
                    }
                }
                Err(e) => println!("  binding failed: {e}"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "routes": [
            { "handler": "users.show", "template": "/users/{id}", "verb": "GET",
              "parameters": [{ "name": "id", "type": "int" }] },
            { "handler": "users.delete", "template": "/users/{id}", "verb": "DELETE",
              "parameters": [{ "name": "id", "type": "int" }] }
        ]
    }"#;

    fn routes() -> Vec<RouteDescriptor> {
        RouteManifest::from_json(MANIFEST).unwrap().compile().unwrap()
    }

    #[test]
    fn test_find_route_filters_by_verb() {
        let routes = routes();
        assert_eq!(find_route(&routes, "/users/1", None).unwrap().handler(), "users.show");
        assert_eq!(
            find_route(&routes, "/users/1", Some(Verb::Delete)).unwrap().handler(),
            "users.delete"
        );
    }

    #[test]
    fn test_find_route_miss_is_an_error() {
        let routes = routes();
        let err = find_route(&routes, "/orders/1", None).unwrap_err();
        assert_eq!(err.to_string(), "No route matches /orders/1");
        assert!(find_route(&routes, "/users/1", Some(Verb::Post)).is_err());
        assert!(find_route(&routes, "http://host?to=/users/5", None).is_err());
    }
}
