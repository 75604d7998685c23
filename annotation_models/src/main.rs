//! `annotation-models` command line tool

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use annotation_models::config::{self, Config, DatabaseConfig};
use annotation_models::utils::logging;
use annotation_models::{ModelCatalog, ModelSet, SchemaSource};

#[derive(Parser)]
#[command(name = "annotation-models", version, about = "Synthesize annotation table models")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the known annotation types
    Types,
    /// Show the model of one annotation type
    Show {
        #[arg(long)]
        dataset: String,
        #[arg(long = "type")]
        annotation_type: String,
        /// Print the model as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print CREATE TABLE statements for datasets
    Ddl {
        #[command(flatten)]
        selection: Selection,
    },
    /// Create the tables of datasets in the database
    Create {
        #[command(flatten)]
        selection: Selection,
        /// Database URL, overriding the configuration
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(clap::Args)]
struct Selection {
    /// Datasets to synthesize; defaults to the configured ones
    #[arg(long = "dataset")]
    datasets: Vec<String>,
    /// Also synthesize root entity and contact tables
    #[arg(long)]
    include_root_entity: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => Config::default(),
    };
    logging::init_logging(&config.logging)?;

    if let Command::Create { url: Some(url), .. } = &cli.command {
        let database = config.database.get_or_insert_with(|| DatabaseConfig {
            url: url.clone(),
            pool_size: None,
            timeout_seconds: None,
        });
        database.url = url.clone();
    }

    let catalog = ModelCatalog::new(config)?;

    match cli.command {
        Command::Types => {
            for annotation_type in catalog.schemas().get_types() {
                println!("{}", annotation_type);
            }
        }
        Command::Show {
            dataset,
            annotation_type,
            json,
        } => {
            let model = catalog.synthesize(&dataset, &annotation_type)?;
            if json {
                println!("{}", serde_json::to_string_pretty(model.as_ref())?);
            } else {
                println!("{} ({})", model.name, model.table_name());
                for column in model.columns() {
                    let mut notes = Vec::new();
                    if model.table.is_indexed(&column.name) {
                        notes.push("indexed".to_string());
                    }
                    if let Some(fk) = model.table.foreign_key_on(&column.name) {
                        notes.push(format!("-> {}.{}", fk.ref_table, fk.ref_columns.join(",")));
                    }
                    println!(
                        "  {:<32} {:<20} {}",
                        column.name,
                        column.column_type.sql_type(),
                        notes.join(" ")
                    );
                }
            }
        }
        Command::Ddl { selection } => {
            let model_set = synthesize_selection(&catalog, &selection)?;
            for statement in catalog.generate_ddl(&model_set) {
                println!("{};\n", statement);
            }
        }
        Command::Create { selection, .. } => {
            let model_set = synthesize_selection(&catalog, &selection)?;
            catalog.create_tables(&model_set).await?;
            let tables: usize = model_set.values().map(|models| models.len()).sum();
            println!("Created {} tables", tables);
        }
    }

    Ok(())
}

fn synthesize_selection(catalog: &ModelCatalog, selection: &Selection) -> anyhow::Result<ModelSet> {
    let configured = &catalog.config().models;
    let datasets = if selection.datasets.is_empty() {
        configured.datasets.clone()
    } else {
        selection.datasets.clone()
    };
    if datasets.is_empty() {
        bail!("no datasets given; pass --dataset or configure [models] datasets");
    }

    let include_root_entity = selection.include_root_entity || configured.include_root_entity;
    Ok(catalog
        .synthesizer()
        .synthesize_all(&datasets, include_root_entity)?)
}
