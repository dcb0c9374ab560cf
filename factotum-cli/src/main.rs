use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use clap::Parser;

use factotum_agent::{GeminiModel, Session, TurnOutcome};
use factotum_core::config::{AgentConfig, resolve_model_name};
use factotum_memory::SemanticMemory;
use factotum_tools::standard_registry;

#[derive(Parser, Debug)]
#[command(name = "factotum", version)]
#[command(about = "Factotum - a personal assistant that can touch your machine")]
struct Cli {
    /// Model choice (2.5-flash or 2.5-pro); overrides GEMINI_MODEL
    #[arg(long)]
    model: Option<String>,

    /// Enable long-term memory recall for this session
    #[arg(long)]
    memory: bool,
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();

    let cli = Cli::parse();

    let mut config = AgentConfig::from_env();
    if let Some(choice) = cli.model {
        config.model = resolve_model_name(&choice).to_string();
    }
    if cli.memory {
        config.memory.enabled = true;
    }

    let Some(api_key) = config.api_key.clone() else {
        eprintln!("GEMINI_API_KEY not set.");
        eprintln!("Export it or add it to your environment:");
        eprintln!("  GEMINI_API_KEY=your_api_key_here");
        std::process::exit(1);
    };

    let memory = Arc::new(Mutex::new(SemanticMemory::open(
        config.memory.path.clone(),
        config.memory.embedding_dim,
        config.memory.similarity_threshold,
    )));

    let registry = match standard_registry(&config, memory.clone()) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(error = %e, "Failed to assemble tool registry");
            std::process::exit(1);
        }
    };

    let model = GeminiModel::new(api_key, config.model.clone(), config.generation.clone());
    let mut session = Session::new(model, registry, memory, config);

    // Ctrl-C trips the cancellation flag; the loop notices at its next
    // iteration and returns control without corrupting the conversation.
    let cancel = session.cancel_flag();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        tracing::warn!(error = %e, "Failed to install interrupt handler");
    }

    println!("Factotum - Your Personal AI Assistant");
    let stdin = io::stdin();

    loop {
        print!("\nYou: ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                // EOF behaves like quit.
                println!("\nFactotum shutting down safely. Goodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input");
                break;
            }
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "bye") {
            println!("\nFactotum shutting down safely. Goodbye!");
            break;
        }

        session.cancel_flag().reset();
        println!("\nFactotum processing...");

        let result = session.process(input, &mut |text| {
            println!("\nFactotum: {text}");
        });

        match result {
            Ok(TurnOutcome::Completed) => {}
            Ok(TurnOutcome::LimitReached) => {
                println!("\nFactotum reached its operation limit for this request.");
            }
            Ok(TurnOutcome::Cancelled) => {
                println!("\nInterrupted. Ready for your next request.");
            }
            Err(e) => {
                // Contained per turn: report and return to the prompt.
                tracing::error!(error = %e, "Model call failed");
                println!("\nFactotum error: {e}");
            }
        }
    }
}
