use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use slalom_results::{
    collect_documents, run_batch, BatchOptions, DebugConfig, DocumentProcessor, FamilyRegistry,
    ParsingConfig, SUPPORTED_FORMATS,
};

#[derive(Parser)]
#[command(name = "slalom-results")]
#[command(about = "Turn ski slalom result sheets into per-competitor tables with time and score")]
struct Args {
    /// PDF file, or directory searched recursively for PDF files
    #[arg(short, long)]
    input: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output format: csv or json (overrides the config file)
    #[arg(short = 'f', long)]
    output_format: Option<String>,

    /// Write tables here instead of next to each source document
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Document family id, or "auto" to classify each document (overrides the config file)
    #[arg(long)]
    family: Option<String>,

    /// Show available document families and config options, then exit
    #[arg(long)]
    show_configs: bool,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Skip cache and force fresh text extraction
    #[arg(long)]
    skip_cache: bool,

    /// Directory for the extracted-text cache
    #[arg(long, default_value = "cache")]
    cache_dir: String,

    /// Also pick up .txt files (already extracted text) when walking a directory
    #[arg(long)]
    include_text: bool,

    /// Write a JSON summary of the batch to this path
    #[arg(long)]
    summary: Option<String>,

    /// Print lines that look like results (contain one of these patterns) but
    /// were rejected by the result grammar
    #[arg(long = "debug-lines", num_args = 1..)]
    debug_lines: Vec<String>,

    /// Verbose diagnostics (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    println!("⛷️  Slalom Result Sheet Extractor");

    // Load config using the fallback pattern, then apply CLI overrides
    let mut config = ParsingConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default config");
    }
    if let Some(family) = &args.family {
        config.family = family.clone();
    }
    if let Some(format) = &args.output_format {
        config.output.format = format.clone();
    }
    if let Err(e) = config.output.validate() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if args.show_configs {
        show_help(&config)?;
        return Ok(());
    }

    let Some(input) = args.input.as_deref() else {
        eprintln!("❌ No input given. Use --input <file or directory>, or --help.");
        std::process::exit(2);
    };

    let input = Path::new(input);
    if !input.exists() {
        eprintln!("❌ Input not found at: {}", input.display());
        std::process::exit(1);
    }

    let cache_dir = (!args.skip_cache).then_some(args.cache_dir.as_str());
    let mut processor = DocumentProcessor::new_cli(&config, cache_dir)?;
    if !args.debug_lines.is_empty() {
        processor.set_debug_config(DebugConfig::new(true, args.debug_lines.clone()));
    }

    let documents = collect_documents(input, args.include_text)?;
    if input.is_file() && !processor.supports_file_type(input) {
        eprintln!("❌ Unsupported file type: {}", input.display());
        std::process::exit(1);
    }
    if documents.is_empty() {
        eprintln!("⚠️  No documents found in {}", input.display());
        std::process::exit(1);
    }
    println!("📄 {} document(s) to process", documents.len());

    let options = BatchOptions {
        output_dir: args.output_dir.as_ref().map(PathBuf::from),
        output: config.output.clone(),
        profile: args.profile,
        skip_cache: args.skip_cache,
    };
    let summary = run_batch(&processor, &documents, &options)?;
    summary.print();

    if let Some(summary_path) = &args.summary {
        summary.save_to_json(Path::new(summary_path))?;
        println!("💾 Batch summary saved to: {}", summary_path);
    }

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn show_help(config: &ParsingConfig) -> Result<()> {
    let registry = FamilyRegistry::from_config(config)?;

    println!("\n📋 Document Families:");
    for family in registry.families() {
        let marker = if family.id == config.family { " (selected)" } else { "" };
        println!(
            "  {:<20} tag {:<5} venues {:?}{}",
            family.id, family.age_group_tag, family.venues, marker
        );
    }
    if config.is_auto_family() {
        println!("  auto                 classify each document (selected)");
    }

    println!("\n📋 Available Configuration Options:");
    println!("  --config <path>         Load custom config file (families, output settings)");
    println!("  --input <path>          PDF file or directory to process");
    println!("  --output-dir <path>     Output directory (default: next to each PDF)");
    println!(
        "  --output-format <fmt>   Output format: {} (default csv)",
        SUPPORTED_FORMATS.join(" or ")
    );
    println!("  --family <id|auto>      Document family to parse with");
    println!("  --include-text          Also process .txt files when walking a directory");
    println!("  --summary <path>        Write a JSON batch summary");
    println!("  --debug-lines <pat>...  Show lines matching a pattern that the grammar rejected");

    println!("\n📄 Output:");
    println!(
        "  one {} file per document, delimiter '{}', named <Lieu>_<AAAA-MM-JJ>_Slalom<N>[_F|_M]",
        config.output.format, config.output.delimiter
    );

    println!("\n📝 Usage Examples:");
    println!("  slalom-results -i \"courses/Sl-Stoneham/298137 Race Results.pdf\"");
    println!("  slalom-results -i courses -o tables --summary tables/summary.json");
    println!("  slalom-results -i courses -c families.yaml --family auto");
    Ok(())
}
