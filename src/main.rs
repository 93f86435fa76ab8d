//! apply-copilot: resume-grounded cover letters and application answers

use apply_copilot::cli::{parse_chat_input, ChatInput, Cli, Commands, ConfigAction};
use apply_copilot::input::InputManager;
use apply_copilot::output::formatter::ConsoleFormatter;
use apply_copilot::processing::document::ResumeVariant;
use apply_copilot::processing::index::EmbeddingIndex;
use apply_copilot::session::{CoverLetterRequest, Session};
use apply_copilot::{ApplyCopilotError, Config, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let formatter = ConsoleFormatter::default();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("{}", formatter.error(&e));
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config, &formatter).await {
        error!("Command failed: {}", e);
        eprintln!("{}", formatter.error(&e));
        process::exit(1);
    }
}

async fn run_command(
    command: Commands,
    config: Config,
    config_path: Option<PathBuf>,
    formatter: &ConsoleFormatter,
) -> Result<()> {
    match command {
        Commands::Index { variant, rebuild } => {
            let mut session = Session::from_config(config)?;
            let status = with_spinner(
                &format!("Indexing {} resume...", variant),
                session.index(variant, rebuild),
            )
            .await?;
            println!("{}", formatter.index_status(&status));
        }

        Commands::CoverLetter {
            variant,
            company,
            title,
            description,
            description_file,
            format,
            print,
        } => {
            let description = match (description, description_file) {
                (Some(text), _) => text,
                (None, Some(path)) => InputManager::new().extract_text(&path).await?,
                (None, None) => String::new(),
            };
            let request = CoverLetterRequest {
                company,
                job_title: title,
                description,
                format,
            };
            request.validate()?;

            let mut session = Session::from_config(config)?;
            index_for_command(&mut session, variant, formatter).await?;

            let artifact = match with_spinner(
                "Generating cover letter...",
                session.generate_cover_letter(&request),
            )
            .await
            {
                Ok(artifact) => artifact,
                Err(e) => {
                    if let Some(text) = e.unsaved_text() {
                        println!("{}", formatter.header("Unsaved Cover Letter"));
                        println!("{}", text);
                    }
                    return Err(e);
                }
            };
            println!("{}", formatter.saved(&artifact));
            if print {
                println!("{}", formatter.header("Cover Letter"));
                println!("{}", artifact.text);
            }
        }

        Commands::Chat {
            variant,
            position,
            description,
        } => {
            let mut session = Session::from_config(config)?;
            index_for_command(&mut session, variant, formatter).await?;
            if let Some(position) = position {
                session.set_job_context(&position, description.as_deref().unwrap_or_default());
            }
            run_chat(&mut session, formatter).await?;
        }

        Commands::Search { variant, query } => {
            let mut session = Session::from_config(config)?;
            index_for_command(&mut session, variant, formatter).await?;
            let results = session.search(&query).await?;
            println!("{}", formatter.header(&format!("Top {} chunks for \"{}\"", results.len(), query)));
            print!("{}", formatter.chunks(&results));
        }

        Commands::Variants => {
            println!("{}", formatter.header("Resume variants"));
            let entries: Vec<_> = ResumeVariant::ALL
                .iter()
                .map(|&variant| {
                    (
                        variant,
                        config.resume_path(variant),
                        EmbeddingIndex::exists_at(&config.vector_store_path(variant)),
                    )
                })
                .collect();
            let borrowed: Vec<_> = entries
                .iter()
                .map(|(variant, path, indexed)| (*variant, path.as_path(), *indexed))
                .collect();
            print!("{}", formatter.variants(&borrowed));
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration ({})\n", path.display());
                    let rendered = toml::to_string_pretty(&config).map_err(|e| {
                        ApplyCopilotError::Configuration(format!("Failed to serialize config: {}", e))
                    })?;
                    println!("{}", rendered);
                }

                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    Config::default().save_to(&path)?;
                    println!("{}", formatter.success("Configuration reset successfully!"));
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
        }
    }

    Ok(())
}

async fn index_for_command(
    session: &mut Session,
    variant: ResumeVariant,
    formatter: &ConsoleFormatter,
) -> Result<()> {
    let status = with_spinner(
        &format!("Loading {} resume...", variant),
        session.index(variant, false),
    )
    .await?;
    println!("{}", formatter.index_status(&status));
    Ok(())
}

/// Reads questions from stdin until `/quit` or end of input. Failed answers
/// are reported and the loop continues.
async fn run_chat(session: &mut Session, formatter: &ConsoleFormatter) -> Result<()> {
    println!("{}", formatter.header("Application Q&A"));
    println!("{}", formatter.job_context(session.job_context()));
    print_chat_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n❓ ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_chat_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::Help => print_chat_help(),
            ChatInput::History => print!("{}", formatter.history(session.history())),
            ChatInput::Clear => {
                session.clear_history();
                println!("{}", formatter.success("Conversation cleared"));
            }
            ChatInput::Job { position, description } => {
                session.set_job_context(&position, &description);
                println!("{}", formatter.job_context(session.job_context()));
            }
            ChatInput::Question(question) => {
                match with_spinner("Thinking...", session.ask(&question)).await {
                    Ok(answer) => println!("\n{}", answer.text),
                    Err(e) => {
                        error!("Failed to answer question: {}", e);
                        println!("{}", formatter.error(&e));
                    }
                }
            }
        }
    }

    info!("Chat session ended after {} messages", session.history().len());
    Ok(())
}

fn print_chat_help() {
    println!("Type an employer question, or:");
    println!("  /job Title at Company | description   set the job context (empty clears it)");
    println!("  /history                              show the conversation");
    println!("  /clear                                clear the conversation");
    println!("  /quit                                 leave");
}

async fn with_spinner<T>(message: &str, task: impl Future<Output = Result<T>>) -> Result<T> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = task.await;
    spinner.finish_and_clear();
    result
}
