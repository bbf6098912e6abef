//! `panelcall`: issue one control-panel call from the command line.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse the call**: generation, module, function and arguments.
//! 2. **Wire observability**: `tracing-subscriber` (text or JSON on stderr)
//!    and, when configured, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: read [`HttpGatewayConfig`] from the
//!    `PANEL_*` environment variables and bind an [`HttpGateway`] to the
//!    [`Api`] facade.
//! 4. **Report**: print the payload as JSON on stdout, or the unified error
//!    on stderr with a non-zero exit code. The facade is always closed, and
//!    a failed close is reported after the call outcome, never instead of it.

mod telemetry;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use panel_api::{Api, Args, GatewayError, ProtocolGeneration};
use panel_http::{HttpGateway, HttpGatewayConfig};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::telemetry::Telemetry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Generation {
    Uapi,
    Api2,
    Api1,
}

impl From<Generation> for ProtocolGeneration {
    fn from(value: Generation) -> Self {
        match value {
            Generation::Uapi => Self::Uapi,
            Generation::Api2 => Self::Api2,
            Generation::Api1 => Self::Api1,
        }
    }
}

/// Call a control-panel function and print its result.
///
/// Connection settings come from PANEL_URL, PANEL_USER, PANEL_TOKEN,
/// PANEL_TIMEOUT_SECS and PANEL_INSECURE.
#[derive(Debug, Parser)]
#[command(name = "panelcall", version)]
struct Cli {
    /// Protocol generation serving the function.
    #[arg(short, long, value_enum, default_value_t = Generation::Uapi)]
    generation: Generation,

    /// Emit logs as JSON lines.
    #[arg(long, env = "PANEL_JSON_LOGS")]
    json_logs: bool,

    /// Module name, e.g. Email.
    module: String,

    /// Function name, e.g. list_pops.
    function: String,

    /// Arguments. `key=value` for uapi/api2; passed through positionally for api1.
    args: Vec<String>,
}

/// Builds named arguments from `key=value` strings. A bare `key` gets an empty value.
fn named_args(raw: &[String]) -> Args {
    raw.iter()
        .map(|arg| match arg.split_once('=') {
            Some((key, value)) => (key.to_owned(), value.to_owned()),
            None => (arg.clone(), String::new()),
        })
        .collect()
}

async fn call(api: &Api, cli: &Cli) -> Result<Value, GatewayError> {
    match cli.generation {
        Generation::Uapi => {
            let response = api
                .uapi_with_messages::<Value>(&cli.module, &cli.function, &named_args(&cli.args))
                .await?;
            if let Some(messages) = &response.messages {
                info!(messages = messages.as_str(), "server messages");
            }
            Ok(response.data)
        }
        Generation::Api2 => {
            api.api2(&cli.module, &cli.function, &named_args(&cli.args))
                .await
        }
        Generation::Api1 => api.api1(&cli.module, &cli.function, &cli.args).await,
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = HttpGatewayConfig::from_env().context("reading PANEL_* configuration")?;
    let gateway = HttpGateway::new(config).context("building HTTP gateway")?;
    let api = Api::new(gateway);

    let generation = ProtocolGeneration::from(cli.generation);
    info!(%generation, module = %cli.module, function = %cli.function, "calling");

    let outcome = call(&api, &cli)
        .await
        .with_context(|| format!("{generation} {}::{}", cli.module, cli.function));
    let closed = api.close().await;

    settle(outcome, closed, &mut std::io::stdout().lock())
}

/// Reports the call outcome, then any failure to close the gateway.
///
/// A successful payload is written to `out` even when closing fails. When
/// both fail, the call error is returned and the close error is logged.
fn settle(
    outcome: anyhow::Result<Value>,
    closed: Result<(), GatewayError>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match (outcome, closed) {
        (Ok(payload), closed) => {
            serde_json::to_writer_pretty(&mut *out, &payload)?;
            writeln!(out)?;
            closed.context("closing gateway")
        }
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "closing gateway failed after the call failed");
            Err(err)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match Telemetry::init(cli.json_logs) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(cli).await;
    let code = match &result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "call failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}
