use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use line_sheets_relay::api::{ApiServer, ApiState};
use line_sheets_relay::line::LineClient;
use line_sheets_relay::sheets::{LogStore, SheetsStore};
use line_sheets_relay::voice::WhisperTranscriber;
use line_sheets_relay::{Config, Dispatcher};

/// Relay - LINE webhook relay with Google Sheets logging
#[derive(Parser)]
#[command(name = "relay", version, about)]
struct Cli {
    /// Port to listen on (overrides the configured port)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write the header row to the log sheet if it is empty
    InitSheet,
    /// Validate configuration and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity; RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => "info,line_sheets_relay=info",
        1 => "info,line_sheets_relay=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.api_server.port = port;
    }

    let store = Arc::new(SheetsStore::new(
        config.sheets.service_account.clone(),
        config.sheets.spreadsheet_id.clone(),
    ));

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::InitSheet => {
                store.ensure_header().await;
                Ok(())
            }
            Command::CheckConfig => {
                check_config(&config);
                Ok(())
            }
        };
    }

    tracing::info!(
        port = config.api_server.port,
        transcription = config.transcription_enabled(),
        spreadsheet_id = %config.sheets.spreadsheet_id,
        "starting LINE relay"
    );

    store.ensure_header().await;

    let line = Arc::new(LineClient::new(config.line.channel_access_token.clone()));
    let mut dispatcher = Dispatcher::new(line.clone(), line, store).with_settings(&config.relay);

    if let Some(transcription) = &config.transcription {
        let transcriber = WhisperTranscriber::from_config(transcription)?;
        tracing::info!(
            model = %transcription.model,
            language = %transcription.language,
            "voice transcription enabled"
        );
        dispatcher = dispatcher.with_transcriber(
            Arc::new(transcriber),
            config.line.channel_access_token.clone(),
        );
    } else {
        tracing::warn!("OPENAI_API_KEY not set, voice transcription disabled");
    }

    let state = ApiState::new(Arc::new(dispatcher), config.line.channel_secret.clone());
    ApiServer::new(state, config.api_server.port).run().await?;

    Ok(())
}

/// Print a summary of the loaded configuration without secrets
fn check_config(config: &Config) {
    println!("Configuration OK");
    println!("  port:              {}", config.api_server.port);
    println!("  spreadsheet:       {}", config.sheets.spreadsheet_id);
    println!(
        "  service account:   {}",
        config.sheets.service_account.client_email
    );
    println!(
        "  access token:      {} chars",
        config.line.channel_access_token.expose_secret().len()
    );
    match &config.transcription {
        Some(t) => println!("  transcription:     {} ({})", t.model, t.language),
        None => println!("  transcription:     disabled"),
    }
    println!("  dedup capacity:    {}", config.relay.dedup_capacity);
    println!("  utc offset:        {}", config.relay.utc_offset);
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_has_no_flag_conflicts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn port_flag_does_not_read_environment() {
        let cmd = Cli::command();
        let port = cmd
            .get_arguments()
            .find(|arg| arg.get_id().as_str() == "port")
            .expect("port flag must exist");

        // PORT is parsed and validated by Config
        assert!(port.get_env().is_none());
    }

    #[test]
    fn port_flag_overrides_when_given() {
        let cli = Cli::try_parse_from(["relay", "--port", "8080"]).unwrap();
        assert_eq!(cli.port, Some(8080));

        let cli = Cli::try_parse_from(["relay", "check-config"]).unwrap();
        assert_eq!(cli.port, None);
        assert!(matches!(cli.command, Some(Command::CheckConfig)));
    }
}
