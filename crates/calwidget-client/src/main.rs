//! calwidget CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use calwidget_client::cli::{Cli, Command, ConfigAction};
use calwidget_client::config::CalendarConfig;
use calwidget_client::error::{ClientError, ClientResult};
use calwidget_client::{CalendarWidget, ConfigValidator};
use calwidget_core::{TracingConfig, TracingOutputFormat, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = match (cli.debug, cli.log_format) {
        (false, Some(TracingOutputFormat::Json)) => TracingConfig::structured(),
        (true, format) => TracingConfig::cli_debug().with_format(format.unwrap_or_default()),
        (false, format) => TracingConfig::cli().with_format(format.unwrap_or_default()),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = match cli.config {
        Some(ref path) => CalendarConfig::load_from(path)?,
        None => CalendarConfig::load()?,
    };
    debug!(source = %config.calendar_source, format = %config.output_format, "loaded configuration");

    match cli.resolved_command() {
        Command::Render { json } => render(CalendarWidget::new(&cli.name, config), json).await,
        Command::Validate => validate(CalendarWidget::new(&cli.name, config)).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => {
                let dumped = toml::to_string_pretty(&config)
                    .map_err(|e| ClientError::Encode(e.to_string()))?;
                print!("{}", dumped);
                Ok(())
            }
            ConfigAction::Path => {
                println!("{}", CalendarConfig::default_path().display());
                Ok(())
            }
        },
    }
}

async fn render(widget: CalendarWidget, json: bool) -> ClientResult<()> {
    let documents = widget.build_content().await?;

    if json {
        let encoded = serde_json::to_string_pretty(&documents)
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        println!("{}", encoded);
    } else {
        for document in &documents {
            println!("<!-- {} -->", document.name);
            println!("{}", document.data);
        }
    }
    Ok(())
}

async fn validate(widget: CalendarWidget) -> ClientResult<()> {
    let report = ConfigValidator::new(&widget).validate().await;
    if report.is_valid() {
        println!("Configuration is valid.");
        return Ok(());
    }

    for message in report.full_messages() {
        println!("- {}", message);
    }
    Err(ClientError::Invalid(report.len()))
}
