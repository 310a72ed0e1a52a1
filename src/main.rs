use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use eagraph::database::get_database_url;
use eagraph::database::seed_data::seed_metamodel;
use eagraph::services::CloneOutcome;
use eagraph::{AppContext, EngineConfig};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true, default_value = "eagraph.toml")]
    config: String,
    /// SQLite file to use instead of the configured url
    #[clap(short, long, global = true)]
    database: Option<String>,
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the schema
    Migrate,
    /// Insert the default domains and types
    SeedMetamodel,
    /// List domains, element types and relationship types
    Metamodel,
    /// Copy a model under a new name
    Clone {
        #[clap(short, long)]
        model: String,
        #[clap(short, long)]
        name: String,
    },
    /// Create the next version of a model
    Version {
        #[clap(short, long)]
        model: String,
        #[clap(long)]
        label: String,
    },
    /// Stamp out a new model from a template model
    Instantiate {
        #[clap(short, long)]
        template: String,
        #[clap(short, long)]
        name: String,
    },
    DeleteElement {
        #[clap(short, long)]
        element: String,
        #[clap(long)]
        cascade: bool,
    },
    DeleteModel {
        #[clap(short, long)]
        model: String,
        #[clap(long)]
        cascade: bool,
    },
    /// Print a model's lineage, oldest first
    History {
        #[clap(short, long)]
        model: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let mut config = EngineConfig::load(&args.config)?;
    if let Some(path) = args.database.as_deref() {
        config.database_url = get_database_url(Some(path));
    }
    info!("Using database {}", config.database_url);
    let ctx = AppContext::from_config(&config).await?;

    match args.command {
        Commands::Migrate => {
            info!("Schema is up to date");
        }
        Commands::SeedMetamodel => {
            seed_metamodel(ctx.db()).await?;
        }
        Commands::Metamodel => {
            let metamodel = ctx.metamodel_service();
            for domain in metamodel.list_domains().await? {
                println!("domain\t{}\t{}", domain.id, domain.name);
            }
            for element_type in metamodel.list_element_types().await? {
                println!(
                    "element\t{}\t{}\t{}",
                    element_type.id, element_type.domain_id, element_type.name
                );
            }
            for relationship_type in metamodel.list_relationship_types().await? {
                let direction = if relationship_type.directional {
                    "directed"
                } else {
                    "undirected"
                };
                println!(
                    "relationship\t{}\t{}\t{}",
                    relationship_type.id, relationship_type.name, direction
                );
            }
        }
        Commands::Clone { model, name } => {
            report_clone(ctx.clone_model(&model, &name).await?);
        }
        Commands::Version { model, label } => {
            report_clone(ctx.create_version(&model, &label).await?);
        }
        Commands::Instantiate { template, name } => {
            report_clone(ctx.instantiate_template(&template, &name).await?);
        }
        Commands::DeleteElement { element, cascade } => {
            let report = ctx.delete_element(&element, cascade).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::DeleteModel { model, cascade } => {
            let report = ctx.delete_model(&model, cascade).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::History { model } => {
            for entry in ctx.history(&model).await? {
                println!("{}\t{}\t{}\t{}", entry.id, entry.version, entry.status, entry.name);
            }
        }
    }

    Ok(())
}

fn report_clone(outcome: CloneOutcome) {
    println!("{}", outcome.summary());
    for warning in &outcome.warnings {
        eprintln!("warning[{}]: {}", warning.code(), warning);
    }
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}
