use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

mod cli;

use test_file_opener::contexts::DEFAULT_MAX_AUTH_RETRIES;
use test_file_opener::registries::{OpenAiConfig, DEFAULT_API_BASE, DEFAULT_MODEL};

#[derive(Parser)]
#[command(name = "test-file-opener")]
#[command(about = "Open the test file for a source file, or generate one", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Enable verbose debug output")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Open or generate the test file for a source file")]
    Open {
        #[arg(help = "The implementation file")]
        file: PathBuf,

        #[arg(long, default_value = ".", help = "Workspace root to search for test files")]
        root: PathBuf,

        #[arg(long, help = "Only report when no test file exists, never offer generation")]
        no_generate: bool,

        #[arg(long, env = "TEST_FILE_OPENER_SETTINGS", help = "Settings file holding the API key")]
        settings: Option<PathBuf>,

        #[arg(long, env = "TEST_FILE_OPENER_MODEL", default_value = DEFAULT_MODEL)]
        model: String,

        #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_API_BASE)]
        api_base: String,

        #[arg(long, default_value_t = 120, help = "HTTP timeout in seconds")]
        timeout: u64,

        #[arg(
            long,
            default_value_t = DEFAULT_MAX_AUTH_RETRIES,
            help = "How many replacement API keys to try after rejections"
        )]
        max_auth_retries: u32,

        #[arg(long, env = "VISUAL", help = "Editor command; prints the path when unset")]
        editor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = cli::Config {
        verbose: cli.verbose,
    };
    cli::init_logging(&config);
    info!("test-file-opener {} started", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Open {
            file,
            root,
            no_generate,
            settings,
            model,
            api_base,
            timeout,
            max_auth_retries,
            editor,
        } => {
            let request = cli::OpenRequest {
                file,
                root,
                generate: !no_generate,
                settings_path: settings,
                openai: OpenAiConfig {
                    api_base,
                    model,
                    timeout_secs: timeout,
                },
                max_auth_retries,
                editor: editor.or_else(|| std::env::var("EDITOR").ok()),
            };

            let outcome = cli::open_test_file(request).await?;
            if outcome.is_failure() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
