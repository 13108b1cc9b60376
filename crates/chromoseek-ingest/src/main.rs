//! ChromoSeek Ingest - annotation indexing tool

use anyhow::{bail, Context, Result};
use chromoseek_common::logging::{init_logging, LogConfig, LogLevel};
use chromoseek_common::FeatureType;
use chromoseek_ingest::{
    provision_index, AnnotationFormat, DocumentStream, IngestConfig, IngestOrchestrator,
};
use chromoseek_store::{ElasticClient, MemoryStore, SearchStore, StoreConfig};
use clap::{Parser, Subcommand};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "chromoseek-ingest")]
#[command(author, version, about = "Index genomic annotation files")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Search service endpoint
    #[arg(long, env = "ELASTICSEARCH_HOST", global = true)]
    store_url: Option<String>,

    /// Feature collection name
    #[arg(long, env = "CHROMOSEEK_INDEX", global = true)]
    index: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Provision the index and load every discovered file
    Run {
        /// Directory holding .gtf and .bed files
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Documents per bulk request
        #[arg(long)]
        batch_size: Option<usize>,

        /// Files loaded at the same time
        #[arg(long)]
        concurrency: Option<usize>,

        /// Parse and load into an in-memory store instead of the search service
        #[arg(long)]
        dry_run: bool,
    },

    /// Create the index if it does not exist
    Provision,

    /// Print the documents of one file as JSON lines
    Parse {
        file: PathBuf,

        /// Input format (inferred from the extension when omitted)
        #[arg(long)]
        format: Option<AnnotationFormat>,

        /// Feature type for BED records (defaults to the file name label)
        #[arg(short = 't', long)]
        feature_type: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("chromoseek-ingest")
        .filter_directives("reqwest=warn,hyper=warn")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    let mut store_config = StoreConfig::from_env()?;
    if let Some(url) = cli.store_url {
        store_config.url = url;
    }
    if let Some(index) = cli.index {
        store_config.index = index;
    }

    match cli.command {
        Command::Run {
            data_dir,
            batch_size,
            concurrency,
            dry_run,
        } => {
            let mut config = IngestConfig::from_env()?;
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(size) = batch_size {
                config.batch_size = size;
            }
            if let Some(width) = concurrency {
                config.concurrency = width;
            }
            config.validate()?;

            let store: Arc<dyn SearchStore> = if dry_run {
                info!("Dry run: loading into an in-memory store");
                Arc::new(MemoryStore::new())
            } else {
                Arc::new(ElasticClient::new(&store_config)?)
            };

            let summary = IngestOrchestrator::new(store, store_config.index, config)
                .run()
                .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);

            if !summary.is_success() {
                bail!(
                    "{} of {} files failed to index",
                    summary.failures.len(),
                    summary.files.len() + summary.failures.len()
                );
            }
        },

        Command::Provision => {
            let client = ElasticClient::new(&store_config)?;
            let created = provision_index(&client, &store_config.index).await?;
            println!(
                "Index '{}' {}",
                store_config.index,
                if created { "created" } else { "already exists" }
            );
        },

        Command::Parse {
            file,
            format,
            feature_type,
        } => {
            let format = match format {
                Some(format) => format,
                None => AnnotationFormat::from_path(&file).with_context(|| {
                    format!("Cannot infer format of {}, pass --format", file.display())
                })?,
            };

            let mut stream = DocumentStream::open(&file, format, feature_type.map(FeatureType::from))?;
            let mut out = BufWriter::new(std::io::stdout().lock());
            let mut count = 0usize;
            for document in stream.by_ref() {
                serde_json::to_writer(&mut out, &document?)?;
                out.write_all(b"\n")?;
                count += 1;
            }
            out.flush()?;

            info!(
                documents = count,
                excluded = stream.excluded(),
                malformed = stream.malformed(),
                "Parsed {}",
                file.display()
            );
        },
    }

    Ok(())
}
