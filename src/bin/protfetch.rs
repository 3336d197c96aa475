use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use protfetch::alphafold::AlphafoldHttpClient;
use protfetch::cleaver::FilterOptions;
use protfetch::config::ConfigLoader;
use protfetch::domain::{FileType, Identifier, SourceDb};
use protfetch::error::ProtfetchError;
use protfetch::fetcher::Fetcher;
use protfetch::output::{FetchItemResult, FetchResult, HumanOutput, JsonOutput, OutputMode};
use protfetch::rcsb::RcsbHttpClient;
use protfetch::uniprot::UniprotHttpClient;

#[derive(Parser)]
#[command(name = "protfetch")]
#[command(about = "Download protein structures for UniProt accessions from the PDB or AlphaFold DB")]
#[command(version)]
struct Cli {
    /// UniProt accessions of the structures to collect
    #[arg(required = true)]
    uniprot_id: Vec<String>,

    /// File type to download
    #[arg(long = "filetype", value_enum)]
    filetype: Option<FileType>,

    /// Database tried first
    #[arg(long = "main_db", value_enum)]
    main_db: Option<SourceDb>,

    /// Directory the structure files are saved to (default ~/.cache/pdb)
    #[arg(long = "save_directory")]
    save_directory: Option<String>,

    /// Defaults file (default ./protfetch.json when present)
    #[arg(long)]
    config: Option<String>,

    /// Print a JSON summary instead of one line per structure
    #[arg(long)]
    json: bool,

    /// Strip signal peptide residues from the saved structure
    #[arg(long)]
    remove_signal: bool,

    /// Strip hydrogen atoms from the saved structure
    #[arg(long)]
    remove_hydrogens: bool,

    /// Strip water molecules from the saved structure
    #[arg(long)]
    remove_water: bool,

    /// Strip HETATM records from the saved structure
    #[arg(long)]
    remove_hetatm: bool,
}

impl Cli {
    fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            signal_peptides: self.remove_signal,
            hydrogens: self.remove_hydrogens,
            water: self.remove_water,
            hetatoms: self.remove_hetatm,
        }
    }
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<ProtfetchError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ProtfetchError) -> u8 {
    match error {
        ProtfetchError::NotFoundInAnySource(_) | ProtfetchError::MissingCacheEntry(_) => 2,
        ProtfetchError::RcsbHttp(_)
        | ProtfetchError::RcsbStatus { .. }
        | ProtfetchError::AlphafoldHttp(_)
        | ProtfetchError::AlphafoldStatus { .. }
        | ProtfetchError::UniprotHttp(_)
        | ProtfetchError::UniprotStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let main_db = cli.main_db.unwrap_or(config.main_db);
    let filetype = cli.filetype.unwrap_or(config.filetype);
    let save_directory = cli
        .save_directory
        .clone()
        .map(Utf8PathBuf::from)
        .or(config.save_directory);

    let mut fetcher = Fetcher::new(
        main_db,
        save_directory,
        RcsbHttpClient::new()?,
        AlphafoldHttpClient::with_version(config.alphafold_version)?,
        UniprotHttpClient::new()?,
    )?;

    let options = cli.filter_options();
    let mut items = Vec::new();
    for raw in &cli.uniprot_id {
        let id: Identifier = raw.parse()?;
        let fetched = fetcher.get_file(&id, filetype, true, main_db)?;
        let cleaned = if options.any() {
            Some(fetcher.remove(&id, options, None)?)
        } else {
            None
        };

        let item = FetchItemResult {
            id: id.to_string(),
            source: fetched.source,
            filetype: fetched.filetype,
            path: fetched.path.map(|path| path.to_string()),
            cleaned,
        };
        if matches!(output_mode, OutputMode::Human) {
            HumanOutput::print_item(&item);
        }
        items.push(item);
    }

    if matches!(output_mode, OutputMode::Json) {
        let result = FetchResult {
            items,
            searches: fetcher.search_records(),
        };
        JsonOutput::print_fetch(&result).into_diagnostic()?;
    }
    Ok(())
}
