mod telemetry;

use std::net::SocketAddr;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ctxlog_context::Context;
use ctxlog_core::{Level, LoggerConfig, Metadata, PartialConfig};
use serde_json::{Value, json};

use crate::telemetry::{init_cli_tracing, init_serve_tracing};

#[derive(Parser, Debug)]
#[command(name = "ctxlog")]
#[command(about = "Context-aware structured logging")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Emit one log record to stdout")]
    Emit {
        message: String,
        #[arg(long, default_value = "info")]
        level: Level,
        #[arg(
            long = "field",
            help = "Record field as key=value (value parsed as JSON if possible)"
        )]
        fields: Vec<String>,
        #[arg(long = "context", help = "Ambient context entry as key=value")]
        context: Vec<String>,
        #[arg(long, help = "Human-readable output instead of JSON")]
        pretty: bool,
    },
    #[command(about = "Print the effective logger configuration")]
    Config,
    #[command(about = "Serve the logger admin API with request-id context")]
    Serve {
        #[arg(long, default_value = "127.0.0.1:7070")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Emit {
            message,
            level,
            fields,
            context,
            pretty,
        } => {
            init_cli_tracing();
            let mut partial = PartialConfig::load().context("load logger configuration")?;
            if pretty {
                partial = partial.merge(PartialConfig::new().with_pretty_print(true));
            }
            ctxlog_logger::configure_logger(partial, true);

            let metadata = parse_pairs(&fields).context("parse --field")?;
            let ctx = Context::from(parse_pairs(&context).context("parse --context")?);
            ctxlog_logger::run_sync(ctx, || {
                ctxlog_logger::log(level, &message, Some(&metadata));
            });
            Ok(())
        }
        Commands::Config => {
            init_cli_tracing();
            let loaded = PartialConfig::load().context("load logger configuration")?;
            let effective = LoggerConfig::default().merged(&loaded);
            println!("{}", serde_json::to_string_pretty(&effective)?);
            Ok(())
        }
        Commands::Serve { addr } => run_server(&addr).await,
    }
}

async fn run_server(addr: &str) -> anyhow::Result<()> {
    let loaded = PartialConfig::load().context("load logger configuration")?;
    let cfg = ctxlog_logger::configure_logger(loaded, true);
    init_serve_tracing();

    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid listen address: {addr}"))?;
    let router = ctxlog_http::router(ctxlog_logger::shared());

    ctxlog_logger::info_with(
        "ctxlog serve",
        json!({
            "addr": addr.to_string(),
            "logLevel": cfg.level,
            "prettyPrint": cfg.pretty_print,
        }),
    );

    ctxlog_http::serve(addr, router, shutdown_signal())
        .await
        .context("serve http")?;
    ctxlog_logger::info("ctxlog stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; serving until killed");
        std::future::pending::<()>().await;
    }
}

fn parse_pairs(pairs: &[String]) -> anyhow::Result<Metadata> {
    let mut out = Metadata::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("expected key=value, got {pair:?}"))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("empty key in {pair:?}");
        }
        out.insert_value(key, parse_value(raw));
    }
    Ok(out)
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_values_and_falls_back_to_strings() {
        let pairs = vec![
            "userId=7".to_string(),
            "ok=true".to_string(),
            "route=/v1/orders".to_string(),
            "tags=[\"a\",\"b\"]".to_string(),
            "eq=a=b".to_string(),
        ];
        let metadata = parse_pairs(&pairs).unwrap();
        assert_eq!(metadata.get("userId"), Some(&json!(7)));
        assert_eq!(metadata.get("ok"), Some(&json!(true)));
        assert_eq!(metadata.get("route"), Some(&json!("/v1/orders")));
        assert_eq!(metadata.get("tags"), Some(&json!(["a", "b"])));
        assert_eq!(metadata.get("eq"), Some(&json!("a=b")));
    }

    #[test]
    fn rejects_pairs_without_key() {
        assert!(parse_pairs(&["novalue".to_string()]).is_err());
        assert!(parse_pairs(&["=x".to_string()]).is_err());
    }

    #[test]
    fn cli_parses_repeated_flags() {
        let cli = Cli::try_parse_from([
            "ctxlog", "emit", "hello", "--level", "warn", "--field", "a=1", "--field", "b=2",
            "--context", "requestId=r1",
        ])
        .unwrap();
        match cli.command {
            Commands::Emit {
                level,
                fields,
                context,
                pretty,
                ..
            } => {
                assert_eq!(level, Level::Warn);
                assert_eq!(fields.len(), 2);
                assert_eq!(context, vec!["requestId=r1".to_string()]);
                assert!(!pretty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["ctxlog", "emit", "hello", "--level", "verbose"]).is_err());
    }
}
