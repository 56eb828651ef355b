mod source;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use ufonaut_core::auth::{ApiKeyAuth, AuthDescriptor, BasicAuth, BearerAuth};
use ufonaut_core::normalize::letters_numbers_with_dash;
use ufonaut_core::scripts::{load_scripts_catalog, PRE_REQUEST_DIR, TEST_DIR};
use ufonaut_core::template::load_template;
use ufonaut_core::{
    process, report, CollectionOptions, Converter, OrderList, ReportFormat, SetsConfig,
};

use source::SourceArgs;

#[derive(Parser)]
#[command(name = "ufonaut")]
#[command(about = "Convert OpenAPI v3 documents into parameterized Postman collections")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OpenAPI document into a Postman collection
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        /// Output collection file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Order config JSON file (`{"order": [{"method", "path"}]}`)
        #[arg(short = 'd', long)]
        order: Option<PathBuf>,

        /// Catalog holding `test` and `pre-request` script directories
        #[arg(short, long)]
        scripts: Option<PathBuf>,

        /// Pre-request script template, only usable along with --scripts
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Collection name
        #[arg(short, long)]
        name: Option<String>,

        /// Collection auth type; only affects endpoints that already use some authentication
        #[arg(long, value_enum)]
        auth_type: Option<AuthTypeArg>,

        /// Collection basic auth username
        #[arg(long)]
        auth_username: Option<String>,

        /// Collection basic auth password
        #[arg(long)]
        auth_password: Option<String>,

        /// Collection api key name
        #[arg(long, default_value = "X-API-KEY")]
        auth_key: String,

        /// Collection api key value
        #[arg(long)]
        auth_value: Option<String>,

        /// Collection api key location
        #[arg(long, value_enum, default_value_t = ApiKeyLocationArg::Header)]
        auth_location: ApiKeyLocationArg,

        /// Collection bearer token
        #[arg(long)]
        auth_token: Option<String>,

        /// Apply the collection auth to every endpoint
        #[arg(long)]
        forced_auth: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Create one collection per entry of a sets config
    Sets {
        #[command(flatten)]
        source: SourceArgs,

        /// Sets config JSON file
        #[arg(short, long)]
        config: PathBuf,

        /// Directory receiving `<set name>.json` files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// List the endpoints of the converted collection
    Endpoints {
        #[command(flatten)]
        source: SourceArgs,

        /// Also print the normalized name used for script files
        #[arg(short, long)]
        normalized: bool,

        /// Listing format
        #[arg(long, value_enum, default_value_t = ReportArg::Plain)]
        format: ReportArg,

        /// Output file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum AuthTypeArg {
    Basic,
    Apikey,
    Bearer,
}

impl AuthTypeArg {
    fn as_str(self) -> &'static str {
        match self {
            AuthTypeArg::Basic => "basic",
            AuthTypeArg::Apikey => "apikey",
            AuthTypeArg::Bearer => "bearer",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum ApiKeyLocationArg {
    Header,
    Query,
}

impl ApiKeyLocationArg {
    fn as_str(self) -> &'static str {
        match self {
            ApiKeyLocationArg::Header => "header",
            ApiKeyLocationArg::Query => "query",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum ReportArg {
    Plain,
    Md,
    Csv,
}

impl From<ReportArg> for ReportFormat {
    fn from(val: ReportArg) -> Self {
        match val {
            ReportArg::Plain => ReportFormat::Plain,
            ReportArg::Md => ReportFormat::Md,
            ReportArg::Csv => ReportFormat::Csv,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            source,
            output,
            order,
            scripts,
            template,
            name,
            auth_type,
            auth_username,
            auth_password,
            auth_key,
            auth_value,
            auth_location,
            auth_token,
            forced_auth,
            format,
        } => {
            let mut options = CollectionOptions {
                collection_name: name,
                ..CollectionOptions::default()
            };

            if let Some(path) = order {
                let content = read_config(&path)?;
                let order_list: OrderList = serde_json::from_str(&content).with_context(|| {
                    format!("Failed to parse order config file {}", path.display())
                })?;
                options.order = Some(order_list);
            }

            if scripts.is_none() && template.is_some() {
                bail!("Pre request script template is only usable along with scripts");
            }
            if let Some(dir) = scripts {
                if !dir.join(TEST_DIR).is_dir() && !dir.join(PRE_REQUEST_DIR).is_dir() {
                    bail!(
                        "{} not found or there are no [test] and [pre-request] catalogs, or you do not have access to it",
                        dir.display()
                    );
                }
                options.scripts = Some(load_scripts_catalog(&dir)?);
                if let Some(path) = template {
                    options.pre_request_template = Some(load_template(&path)?);
                }
            }

            options.auth = auth_type.map(|auth_type| AuthDescriptor {
                auth_type: Some(auth_type.as_str().to_string()),
                forced: forced_auth,
                basic: Some(BasicAuth {
                    username: auth_username,
                    password: auth_password,
                }),
                apikey: Some(ApiKeyAuth {
                    key: Some(auth_key),
                    value: auth_value,
                    location: Some(auth_location.as_str().to_string()),
                }),
                bearer: Some(BearerAuth { token: auth_token }),
            });

            let document = source::load(&source)?;
            let mut collection = Converter::new(document)
                .convert()
                .map_err(|e| anyhow::Error::from(e).context("Conversion failed"))?;
            process(&mut collection, &options)
                .map_err(|e| anyhow::Error::from(e).context("Failed to post-process collection"))?;

            write_json(&collection, output.as_ref(), format)?;
        }
        Commands::Sets {
            source,
            config,
            output,
            format,
        } => {
            let content = read_config(&config)?;
            let value: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse sets config {}", config.display()))?;
            let sets_config = SetsConfig::from_value(&value)?;

            let document = source::load(&source)?;
            let sets = Converter::new(document)
                .create_sets(Some(&sets_config))
                .map_err(|e| anyhow::Error::from(e).context("Failed to create sets"))?;

            fs::create_dir_all(&output).with_context(|| {
                format!("Failed to create output directory: {}", output.display())
            })?;
            for (index, set) in sets.iter().enumerate() {
                let path = output.join(set_file_name(&set.name, index));
                write_json(&set.collection, Some(&path), format)?;
            }
            eprintln!("Sets created: {}", sets.len());
        }
        Commands::Endpoints {
            source,
            normalized,
            format,
            output,
        } => {
            let document = source::load(&source)?;
            let collection = Converter::new(document)
                .convert()
                .map_err(|e| anyhow::Error::from(e).context("Conversion failed"))?;
            let listing = report::render(&collection.list_endpoints(), format.into(), normalized);

            let mut writer = open_output(output.as_ref())?;
            writer
                .write_all(listing.as_bytes())
                .context("Failed to write endpoint listing")?;
            writer.flush().context("Failed to write endpoint listing")?;
        }
    }

    Ok(())
}

fn read_config(path: &Path) -> Result<String> {
    if !path.is_file() {
        bail!(
            "{} not found or you do not have access to the file",
            path.display()
        );
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// `<slug>.json`, falling back to the set position when the name has no usable characters.
fn set_file_name(name: &str, index: usize) -> String {
    let slug = letters_numbers_with_dash(name);
    if slug.is_empty() {
        format!("set-{}.json", index + 1)
    } else {
        format!("{slug}.json")
    }
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            let file = File::create(p)
                .with_context(|| format!("Failed to create output file: {}", p.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer = open_output(path)?;

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
