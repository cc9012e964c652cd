//! gqlprobe - explain why a GraphQL endpoint fails from a browser
//!
//! Probes the endpoint the way a browser-hosted client would (CORS
//! preflight, a trivial query, then introspection; or a single WebSocket
//! connect for `ws://`/`wss://`) and prints what went wrong.
//!
//! The process always exits 0: findings are output, not failures.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::Level;

use gqlprobe_core::{render_json, render_text, Doctor, DoctorConfig, Endpoint, ReportLine};
use gqlprobe_transport::{ReqwestTransport, TungsteniteConnector};

#[derive(Parser, Debug)]
#[command(name = "gqlprobe")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Diagnose unreachable or misconfigured GraphQL endpoints",
    long_about = None
)]
struct Cli {
    /// GraphQL endpoint URL (http, https, ws or wss)
    #[arg(long)]
    endpoint: String,

    /// Origin the browser client would send (falls back to GQLPROBE_ORIGIN,
    /// then https://studio.apollographql.com)
    #[arg(long)]
    origin: Option<String>,

    /// Per-probe time limit in seconds (falls back to GQLPROBE_TIMEOUT_SECS,
    /// then 30)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Report output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines on stderr
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    gqlprobe_core::init_tracing(cli.json_logs, level);

    if let Err(e) = run(cli).await {
        println!("{}", ReportLine::Warning(format!("{e:#}")));
    }
}

/// Environment settings, then command-line flags on top.
fn load_config(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> gqlprobe_core::Result<DoctorConfig> {
    let mut config = DoctorConfig::from_lookup(lookup)?;
    if let Some(origin) = &cli.origin {
        config = config.with_origin(origin);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs))?;
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config =
        load_config(&cli, |name| std::env::var(name).ok()).context("Invalid configuration")?;

    let endpoint = match Endpoint::parse(&cli.endpoint) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            println!("{}", ReportLine::Warning(e.to_string()));
            return Ok(());
        }
    };

    let http = ReqwestTransport::new(&config).context("Failed to set up HTTP transport")?;
    let doctor = Doctor::new(Arc::new(http), Arc::new(TungsteniteConnector::new()), config);
    let origin = doctor.config().origin.as_str();

    let report = doctor.run(&endpoint, origin).await;

    let output = render(&report, &endpoint, origin, cli.format)?;
    print!("{output}");
    Ok(())
}

fn render(
    report: &gqlprobe_core::Report,
    endpoint: &Endpoint,
    origin: &str,
    format: Format,
) -> Result<String> {
    match format {
        Format::Text => Ok(render_text(report)),
        Format::Json => {
            let mut json =
                render_json(report, endpoint, origin).context("Failed to render report")?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlprobe_core::config::{DEFAULT_PROBE_TIMEOUT_SECS, ORIGIN_ENV, TIMEOUT_ENV};
    use gqlprobe_core::{Diagnosis, Report, DEFAULT_ORIGIN};

    #[test]
    fn test_endpoint_is_required() {
        assert!(Cli::try_parse_from(["gqlprobe"]).is_err());
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gqlprobe", "--endpoint", "https://example.com/graphql"])
            .unwrap();
        assert_eq!(cli.endpoint, "https://example.com/graphql");
        assert_eq!(cli.origin, None);
        assert_eq!(cli.timeout_secs, None);
        assert_eq!(cli.format, Format::Text);
        assert!(!cli.verbose);
        assert!(!cli.json_logs);

        let config = load_config(&cli, no_env).unwrap();
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert_eq!(
            config.probe_timeout,
            Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_environment_applies_without_flags() {
        let cli = Cli::try_parse_from(["gqlprobe", "--endpoint", "https://example.com/graphql"])
            .unwrap();
        let config = load_config(&cli, |name| match name {
            ORIGIN_ENV => Some("http://localhost:8080".to_string()),
            TIMEOUT_ENV => Some("12".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.origin, "http://localhost:8080");
        assert_eq!(config.probe_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::try_parse_from([
            "gqlprobe",
            "--endpoint",
            "https://example.com/graphql",
            "--origin",
            "http://localhost:3000",
            "--timeout-secs",
            "3",
        ])
        .unwrap();
        let config = load_config(&cli, |name| match name {
            ORIGIN_ENV => Some("http://localhost:8080".to_string()),
            TIMEOUT_ENV => Some("12".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.origin, "http://localhost:3000");
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_bad_environment_timeout_is_reported() {
        let cli = Cli::try_parse_from(["gqlprobe", "--endpoint", "https://example.com/graphql"])
            .unwrap();
        let result = load_config(&cli, |name| {
            (name == TIMEOUT_ENV).then(|| "forever".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "gqlprobe",
            "--endpoint",
            "wss://example.com/graphql",
            "--origin",
            "http://localhost:3000",
            "--timeout-secs",
            "5",
            "--format",
            "json",
            "-v",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(cli.origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(cli.timeout_secs, Some(5));
        assert_eq!(cli.format, Format::Json);
        assert!(cli.verbose);
        assert!(cli.json_logs);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Cli::try_parse_from([
            "gqlprobe",
            "--endpoint",
            "https://example.com/graphql",
            "--timeout-secs",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_json_is_line_terminated() {
        let endpoint = Endpoint::parse("https://example.com/graphql").unwrap();
        let report = Report::from(vec![Diagnosis::auth("401")]);

        let output = render(&report, &endpoint, DEFAULT_ORIGIN, Format::Json).unwrap();
        assert!(output.ends_with('\n'));
        assert!(output.contains("\"has_problem\""));
    }

    #[test]
    fn test_render_text_empty_report() {
        let endpoint = Endpoint::parse("https://example.com/graphql").unwrap();
        let output = render(&Report::default(), &endpoint, DEFAULT_ORIGIN, Format::Text).unwrap();
        assert_eq!(output.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_not_an_error() {
        let cli = Cli::try_parse_from(["gqlprobe", "--endpoint", "   "]).unwrap();
        assert!(run(cli).await.is_ok());
    }
}
