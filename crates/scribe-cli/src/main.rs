use anyhow::Result;
use clap::{Parser, Subcommand};
use scribe_core::{LlmProvider, OptionCategory, Service, Snapshot};
use scribe_services::Services;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Scribe - settings inspection and sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and print the settings snapshot
    Show {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// List selectable chat and transcription models
    Models,

    /// Show endpoint reachability per service
    Health,

    /// Set a configuration key, re-validate endpoints and save
    SetConfig {
        /// Configuration key (e.g. OLLAMA_BASE_URL)
        key: String,

        /// New value; parsed as JSON when possible
        value: String,
    },

    /// Reset every setting to the backend defaults
    RestoreDefaults,

    /// Clear the retrieval database for a new embedding model
    ClearDatabase {
        /// Embedding model to rebuild with (defaults to the configured one)
        #[arg(short, long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let services = Services::from_env()?;

    match cli.command {
        Commands::Show { output } => cmd_show(&services, &output).await?,
        Commands::Models => cmd_models(&services).await?,
        Commands::Health => cmd_health(&services).await?,
        Commands::SetConfig { key, value } => cmd_set_config(&services, &key, &value).await?,
        Commands::RestoreDefaults => cmd_restore_defaults(&services).await?,
        Commands::ClearDatabase { model } => cmd_clear_database(&services, model).await?,
    }

    Ok(())
}

async fn cmd_show(services: &Services, output: &str) -> Result<()> {
    let snapshot = services.settings.load().await?;

    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let profile = &snapshot.profile;
    println!();
    println!("Profile:");
    println!("{:-<40}", "");
    println!("  Name:             {}", profile.name);
    println!("  Specialty:        {}", profile.specialty);
    println!(
        "  Default template: {}",
        profile.default_template.as_deref().unwrap_or("-")
    );
    println!("  Default letter:   {}", default_letter_name(&snapshot));
    for (i, chat) in profile.quick_chats.iter().enumerate() {
        println!("  Quick chat {}:     {}", i + 1, chat.title);
    }

    println!();
    println!("Providers:");
    println!("{:-<40}", "");
    let provider = match snapshot.config.active_provider() {
        LlmProvider::Ollama => "Ollama",
        LlmProvider::OpenAi => "OpenAI",
    };
    println!("  Active:           {}", provider);
    for service in Service::all() {
        let endpoint = snapshot.config.endpoint(*service);
        println!(
            "  {:<17} {}",
            format!("{}:", service),
            endpoint.as_deref().unwrap_or("(not configured)")
        );
    }
    println!(
        "  Embedding model:  {}",
        snapshot.config.embedding_model().as_deref().unwrap_or("-")
    );

    println!();
    println!("Configuration:");
    println!("{:-<40}", "");
    for (key, value) in snapshot.config.entries() {
        println!("  {:<28} {}", key, display_config_value(key, value));
    }

    println!();
    println!("Model Options:");
    println!("{:-<40}", "");
    println!("  {:<16} {:<10} {}", "Category", "num_ctx", "temperature");
    for category in OptionCategory::all() {
        let options = snapshot.options.category(*category);
        println!(
            "  {:<16} {:<10} {}",
            category.label(),
            options.num_ctx.map_or("-".to_string(), |n| n.to_string()),
            options.temperature.map_or("-".to_string(), |t| t.to_string())
        );
    }

    println!();
    println!("Prompts:");
    println!("{:-<40}", "");
    for name in snapshot.prompts.iter().flat_map(|p| p.keys()) {
        println!("  {}", name);
    }

    println!();
    println!("Templates:");
    println!("{:-<40}", "");
    for template in snapshot.templates.values() {
        println!("  {:<20} {}", template.template_key, template.template_name);
    }
    println!();

    Ok(())
}

/// Credentials are masked; strings print without quotes
fn display_config_value(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) if key.contains("KEY") && !s.is_empty() => "********".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn default_letter_name(snapshot: &Snapshot) -> &str {
    snapshot
        .letter_templates
        .iter()
        .find(|t| t.is_default)
        .map(|t| t.name.as_str())
        .unwrap_or("-")
}

async fn cmd_models(services: &Services) -> Result<()> {
    let snapshot = services.settings.load().await?;
    let catalog = services.settings.model_catalog();

    println!();
    println!("Chat Models:");
    println!("{:-<65}", "");
    println!("  {:<4} {}", "#", "ID");
    println!("{:-<65}", "");
    for (i, model) in catalog.iter().enumerate() {
        println!("  {:<4} {}", i + 1, model);
    }

    println!();
    println!("Transcription Models:");
    println!("{:-<65}", "");
    if snapshot.transcription_models.is_empty() {
        println!("  (none)");
    }
    for model in &snapshot.transcription_models {
        println!("  {}", model);
    }
    println!();

    Ok(())
}

async fn cmd_health(services: &Services) -> Result<()> {
    let snapshot = services.settings.load().await?;
    print_health(&snapshot);
    Ok(())
}

fn print_health(snapshot: &Snapshot) {
    println!("Endpoint Health:");
    println!("{:-<40}", "");
    for service in Service::all() {
        let status = match snapshot.endpoint_health.get(*service) {
            Some(true) => "reachable",
            Some(false) => "unreachable",
            None => "unknown",
        };
        println!("  {:<10} {}", service, status);
    }
}

async fn cmd_set_config(services: &Services, key: &str, raw: &str) -> Result<()> {
    let value = parse_value(raw);
    debug!(key, %value, "Setting configuration value");

    services.settings.load().await?;
    services.settings.set_config_field(key, value)?;

    for (service, healthy) in services.settings.sync_endpoint_health().await {
        let status = if healthy { "reachable" } else { "unreachable" };
        println!("  {} is {}", service, status);
    }

    services.settings.save().await?;
    println!("Saved {}", key);

    Ok(())
}

/// JSON literals keep their type; anything else is stored as a string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

async fn cmd_restore_defaults(services: &Services) -> Result<()> {
    services.settings.restore_defaults().await?;
    println!("Settings restored to defaults");
    print_health(&services.settings.snapshot());
    Ok(())
}

async fn cmd_clear_database(services: &Services, model: Option<String>) -> Result<()> {
    // The clear request carries the current configuration
    let snapshot = services.settings.load().await?;
    let model = match model.or_else(|| snapshot.config.embedding_model()) {
        Some(model) => model,
        None => anyhow::bail!("No embedding model configured; pass --model"),
    };

    services.settings.clear_database(&model).await?;
    println!("Retrieval database cleared; embeddings will use {}", model);
    Ok(())
}
