#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use acrobench::batch::{run_batch, BatchOptions, TracingProgressSink};
use acrobench::catalog::AcronymCatalog;
use acrobench::dataset::Dataset;
use acrobench::dispatch::Dispatcher;
use acrobench::report::{BatchReport, QueryReport};
use acrobench::{
    BackendSelection, ChatBackendAdapter, DispatchRequest, Query, StderrCallSink,
};

#[derive(Parser)]
#[command(name = "acrobench", version, about = "Multi-backend acronym expansion harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct BackendFlags {
    /// Disable the Qwen base model
    #[arg(long)]
    no_qwen_base: bool,
    /// Disable the Qwen LoRA adapter
    #[arg(long)]
    no_qwen_lora: bool,
    /// Disable the hosted GPT baseline
    #[arg(long)]
    no_openai_gpt: bool,
    /// Enable the TinyLlama LoRA adapter (off by default)
    #[arg(long)]
    tinyllama_lora: bool,
}

impl BackendFlags {
    fn selection(&self) -> BackendSelection {
        BackendSelection {
            use_qwen_base: !self.no_qwen_base,
            use_qwen_lora: !self.no_qwen_lora,
            use_openai_gpt: !self.no_openai_gpt,
            use_tinyllama_lora: self.tinyllama_lora,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Expand acronyms in a single query across the enabled backends
    Run {
        /// Query text
        query: String,
        /// Acronym dictionary JSON ({"ACRONYM": ["expansion", ...]})
        #[arg(long)]
        dictionary: PathBuf,
        #[command(flatten)]
        backends: BackendFlags,
        /// Write the report JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run a sampled batch from an evaluation corpus
    Batch {
        /// Corpus JSON file (array of {query, candidate_acronyms} rows)
        #[arg(long)]
        dataset: PathBuf,
        /// Number of queries to sample; omit to run the whole corpus
        #[arg(long)]
        sample: Option<usize>,
        /// Maximum in-flight backend calls across the batch
        #[arg(long, default_value_t = 20)]
        concurrency: usize,
        /// Abort-free wall-clock budget in seconds; late calls time out
        #[arg(long)]
        deadline_secs: Option<u64>,
        #[command(flatten)]
        backends: BackendFlags,
        /// Output report JSON path
        #[arg(long)]
        out: PathBuf,
    },
}

fn write_json(out: Option<&PathBuf>, value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(rendered.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            query,
            dictionary,
            backends,
            out,
        } => {
            let catalog = AcronymCatalog::load(dictionary)?;
            let adapter = ChatBackendAdapter::with_sink(
                acrobench::BackendEndpoints::from_env()?,
                Arc::new(StderrCallSink),
            )?;

            let enabled = backends.selection().enabled();
            let query: Query = catalog.query(query);
            let request = DispatchRequest::new(query, enabled.clone());

            let dispatcher = Dispatcher::new(Arc::new(adapter), enabled.len().max(1));
            let outcomes = dispatcher.dispatch(&request).await;
            let report = QueryReport::new(&request.query, &outcomes);
            write_json(out.as_ref(), &report)?;
        }
        Commands::Batch {
            dataset,
            sample,
            concurrency,
            deadline_secs,
            backends,
            out,
        } => {
            let dataset = Dataset::load(dataset)?;
            let queries = match sample {
                Some(n) => dataset.sample(n),
                None => dataset.all(),
            };

            let adapter = ChatBackendAdapter::with_sink(
                acrobench::BackendEndpoints::from_env()?,
                Arc::new(StderrCallSink),
            )?;

            let options = BatchOptions {
                limiter_capacity: concurrency,
                deadline: deadline_secs.map(Duration::from_secs),
            };
            let enabled = backends.selection().enabled();

            let result = run_batch(
                Arc::new(adapter),
                queries,
                &enabled,
                &options,
                &TracingProgressSink,
            )
            .await;

            let report = BatchReport::new(&result);
            write_json(Some(&out), &report)?;
            println!("processed {} queries", report.total_samples);
        }
    }

    Ok(())
}
