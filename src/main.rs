use anyhow::Result;
use clap::{Parser, Subcommand};
use git_glance::config::{self, AIProvider, Config};
use git_glance::theme::Theme;
use git_glance::{Action, Dispatcher, GitManager, HttpCompletionClient, Presenter};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "git-glance", version, about = "Your AI-assisted git companion")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Model to use instead of the configured one
    #[arg(long, global = true)]
    model: Option<String>,

    /// AI provider: gemini, anthropic or openai
    #[arg(long, global = true)]
    provider: Option<AIProvider>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Suggest a one-line commit message for the staged changes
    Commit,
    /// Review the changes since the last commit
    Review,
    /// Ask a question about the repository's history
    Chat {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Explain the conflicts of an in-progress merge
    MergeHelp,
    /// Show the config file location, creating a default one if missing
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenv::dotenv().ok();
    init_tracing(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            let presenter = Presenter::new(Theme::select(cli.no_color, None));
            eprintln!("{}", presenter.error(&format!("{:#}", e)));
            return ExitCode::FAILURE;
        }
    };

    let presenter = Presenter::new(Theme::select(cli.no_color, Some(&config.display)));

    let action = match cli.command {
        None => Action::Dashboard,
        Some(Command::Commit) => Action::Commit,
        Some(Command::Review) => Action::Review,
        Some(Command::Chat { question }) => Action::Chat(question.join(" ")),
        Some(Command::MergeHelp) => Action::MergeHelp,
        Some(Command::Config) => {
            return match show_config() {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{}", presenter.error(&format!("{:#}", e)));
                    ExitCode::FAILURE
                }
            };
        }
    };

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{}", presenter.error(&e.to_string()));
            return ExitCode::FAILURE;
        }
    };
    let repo = GitManager::new(cwd);
    let client = HttpCompletionClient::new(&config.ai);

    match Dispatcher::new(&repo, &client, &presenter).run(&action).await {
        Ok(outcome) => {
            println!("{}", presenter.render(&outcome));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{}", presenter.error(&e.user_message()));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = config::get_config_path().ok();
    let mut config = Config::resolve(path.as_deref())?;

    if let Some(provider) = cli.provider {
        config.ai.provider = provider;
    }
    if let Some(model) = &cli.model {
        config.ai.model = Some(model.clone());
    }
    Ok(config)
}

fn show_config() -> Result<()> {
    let config_path = config::get_config_path()?;

    if config_path.exists() {
        println!("Config file: {}", config_path.display());
    } else {
        Config::create_default(&config_path)?;
        println!("Created default config file at {}", config_path.display());
        println!("Add your API key there or set GEMINI_API_KEY in the environment.");
    }
    Ok(())
}
