use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone, clap::Parser)]
#[clap(name = "docmerge", author, version, about)]
pub struct CliArguments {
    #[clap(subcommand)]
    pub command: Commands,

    /// Log at debug level unless RUST_LOG says otherwise
    #[clap(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum Commands {
    /// Generates one document per row
    Generate(GenerateArgs),
    /// Writes a settings file with the default document kinds
    InitConfig(InitConfigArgs),
    /// Lists the sheets of a workbook
    Sheets(SheetsArgs),
}

#[derive(Debug, Clone, clap::Parser)]
pub struct GenerateArgs {
    /// Document kind from the settings file, e.g. `comunicado`
    #[clap(long)]
    pub kind: String,

    /// Row file (.xlsx, .xls, .csv or .tsv)
    #[clap(long, value_name = "FILE")]
    pub rows: PathBuf,

    /// Sheet to read instead of the first one
    #[clap(long)]
    pub sheet: Option<String>,

    /// Settings file; template paths in it are relative to its directory
    #[clap(long, env = "DOCMERGE_CONFIG", default_value = "docmerge.json")]
    pub config: PathBuf,

    /// Directory the generated folders are created under
    #[clap(long, env = "DOCMERGE_OUTPUT_ROOT")]
    pub output: Option<PathBuf>,

    /// Date used for the date placeholders (YYYY-MM-DD), today by default
    #[clap(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Write the link report here (.json for JSON, CSV otherwise)
    #[clap(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Publish documents to the drive folder
    #[clap(long, env = "UPLOAD_TO_EXTERNAL")]
    pub upload: bool,

    /// Local (synced) drive folder documents are published to
    #[clap(long, env = "EXTERNAL_ONEDRIVE_PATH")]
    pub drive_root: Option<PathBuf>,

    /// Publish a PDF copy next to every document
    #[clap(long)]
    pub pdf: bool,

    /// Only process this many rows
    #[clap(long)]
    pub limit: Option<usize>,

    /// Substitute without writing anything and print what each row would get
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, clap::Parser)]
pub struct InitConfigArgs {
    /// Where to write the settings file
    #[clap(value_name = "PATH", default_value = "docmerge.json")]
    pub path: PathBuf,

    /// Replace an existing file
    #[clap(long)]
    pub force: bool,
}

#[derive(Debug, Clone, clap::Parser)]
pub struct SheetsArgs {
    /// Workbook to inspect
    #[clap(value_name = "FILE")]
    pub workbook: PathBuf,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
