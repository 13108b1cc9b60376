//! ChromoSeek query CLI - Main entry point

use anyhow::Context;
use chromoseek_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use chromoseek_common::{FeatureType, Region};
use chromoseek_query::features::{
    genes::{self, FeaturesByGeneQuery},
    overlaps::{self, FindOverlapsQuery},
    shared::{PageParams, DEFAULT_PAGE_SIZE},
    statistics::{self, DensityQuery},
    FeatureState,
};
use chromoseek_query::QueryError;
use chromoseek_store::{ElasticClient, StoreConfig};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

/// Exit status for a lookup that matched nothing
const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "chromoseek", version, about = "Query genomic features by interval")]
struct Cli {
    /// Search service endpoint
    #[arg(long, env = "ELASTICSEARCH_HOST", global = true)]
    store_url: Option<String>,

    /// Feature collection name
    #[arg(long, env = "CHROMOSEEK_INDEX", global = true)]
    index: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Features intersecting any of the given regions
    Overlaps {
        /// Region as chrom:start-end (inclusive), repeatable
        #[arg(short, long = "region", value_name = "REGION")]
        regions: Vec<Region>,

        /// Restrict to these feature types, repeatable
        #[arg(short = 't', long = "feature-type", value_name = "TYPE")]
        feature_types: Vec<String>,

        #[arg(long, default_value_t = 0)]
        skip: u64,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u64,
    },

    /// Features of one type within a named gene
    Gene {
        gene_name: String,

        #[arg(short = 't', long = "feature-type", value_name = "TYPE")]
        feature_type: String,
    },

    /// Per-chromosome counts for one feature type
    Density { feature_type: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("chromoseek")
        .build();
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);
    let _guard = init_logging(&log_config).ok();

    match execute_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<QueryError>() {
                Some(err) if err.is_not_found() => ExitCode::from(EXIT_NOT_FOUND),
                _ => ExitCode::FAILURE,
            }
        },
    }
}

async fn execute_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = StoreConfig::from_env().context("Failed to load store configuration")?;
    if let Some(url) = cli.store_url {
        config.url = url;
    }
    if let Some(index) = cli.index {
        config.index = index;
    }
    config.validate()?;

    let client = ElasticClient::new(&config)?;
    let state = FeatureState::new(Arc::new(client), config.index);

    match cli.command {
        Command::Overlaps {
            regions,
            feature_types,
            skip,
            limit,
        } => {
            let query = FindOverlapsQuery::new(regions)
                .with_feature_types(feature_types.into_iter().map(FeatureType::from).collect())
                .with_page(PageParams::new(Some(skip), Some(limit)));
            print_json(&overlaps::handle(&state, query).await?)
        },
        Command::Gene {
            gene_name,
            feature_type,
        } => {
            let query = FeaturesByGeneQuery::new(gene_name, feature_type);
            print_json(&genes::handle(&state, query).await?)
        },
        Command::Density { feature_type } => {
            let query = DensityQuery::new(feature_type);
            print_json(&statistics::handle(&state, query).await?)
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
