use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use llm_flyer_rust::logging::{self, LogMode};

#[derive(Parser, Debug)]
#[command(
    name = "llm-flyer-rust",
    version,
    about = "Turn a short listing into a rendered flyer"
)]
struct Cli {
    /// Template id (see --list-templates)
    #[arg(short = 't', long = "template", default_value = "real-estate-1")]
    template: String,

    /// Print the template catalog and exit
    #[arg(long = "list-templates")]
    list_templates: bool,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Output format: png, pdf, svg or json (default from settings)
    #[arg(short = 'f', long = "format")]
    format: Option<String>,

    /// Model name or provider:model (e.g. openai:gpt-4o-mini)
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// API key (overrides environment variables)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Use stdin as flyer copy without calling a model
    #[arg(long = "no-enhance")]
    no_enhance: bool,

    /// Template catalog TOML (overrides [catalog] path)
    #[arg(long = "catalog")]
    catalog: Option<String>,

    /// Additional settings file to merge last
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Print the model used for enhancement
    #[arg(long = "with-using-model")]
    with_using_model: bool,

    /// Print token usage for enhancement
    #[arg(long = "with-using-tokens")]
    with_using_tokens: bool,

    /// Log pipeline steps to stderr
    #[arg(long = "verbose")]
    verbose: bool,

    /// Run the HTTP service instead of a one-shot render
    #[arg(long = "server")]
    server: bool,

    /// Address for --server (default from settings)
    #[arg(long = "addr")]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.server {
        logging::init(LogMode::Server {
            verbose: cli.verbose,
        })?;
        return serve(cli).await;
    }
    logging::init(LogMode::Cli {
        verbose: cli.verbose,
    })?;

    let input = if cli.list_templates || io::stdin().is_terminal() {
        None
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .with_context(|| "stdin must be UTF-8 text")?;
        Some(buffer)
    };

    let output = llm_flyer_rust::run(
        llm_flyer_rust::Config {
            template: cli.template,
            model: cli.model,
            key: cli.key,
            format: cli.format,
            enhance: !cli.no_enhance,
            settings_path: cli.read_settings,
            catalog_path: cli.catalog,
            list_templates: cli.list_templates,
            with_using_model: cli.with_using_model,
            with_using_tokens: cli.with_using_tokens,
        },
        input,
    )
    .await?;

    for note in &output.notes {
        eprintln!("{}", note);
    }
    if let Some(path) = cli.output.as_deref() {
        std::fs::write(path, &output.bytes)
            .with_context(|| format!("failed to write output: {}", path))?;
        eprintln!("wrote {}", path);
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(&output.bytes)?;
    if output.is_text() {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

async fn serve(cli: Cli) -> Result<()> {
    let mut settings =
        llm_flyer_rust::settings::load_settings(cli.read_settings.as_deref().map(Path::new))?;
    if let Some(path) = cli.catalog.as_deref() {
        settings.catalog_path = Some(path.into());
    }
    let addr = cli.addr.unwrap_or_else(|| settings.server_addr.clone());
    let state =
        llm_flyer_rust::build_server_state(settings, cli.model.as_deref(), cli.key.as_deref())?;
    llm_flyer_rust::server::run_server(state, addr).await
}
