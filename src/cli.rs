//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_store::CsvFundamentalStore;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::registry_csv::load_registry;
use crate::domain::config_validation::{StoreBackend, store_backend, validate_config};
use crate::domain::error::FundamentalsError;
use crate::domain::multi_period::PeriodValues;
use crate::domain::period::Period;
use crate::domain::registry::{FieldDescriptor, FieldRegistry};
use crate::domain::resolver::FieldResolver;
use crate::domain::security::{PointInTime, SecurityIdentifier, parse_point_in_time};
use crate::domain::value::{DynamicValue, FieldType, FieldValue};
use crate::logging::{self, LogSettings};
use crate::ports::config_port::ConfigPort;
use crate::ports::fundamental_port::FundamentalStore;

#[derive(Parser, Debug)]
#[command(name = "fundfields", about = "Query fundamental data fields by path and period")]
pub struct Cli {
    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve one field, optionally for a single period
    Get {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        security: String,
        /// Field key or DataId
        #[arg(short, long)]
        field: String,
        /// Period tag or name, e.g. 1Y or ThreeYears
        #[arg(short, long)]
        period: Option<String>,
        /// YYYY-MM-DD or YYYY-MM-DD HH:MM:SS
        #[arg(short, long)]
        time: String,
    },
    /// Resolve every period of a multi-period field
    Periods {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        security: String,
        #[arg(short, long)]
        field: String,
        #[arg(short, long)]
        time: String,
    },
    /// List the field registry
    Fields {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List securities held by the configured store
    Securities {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file and its registry
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Copy a CSV fundamentals directory into the configured SQLite store
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        from: PathBuf,
    },
}

impl Command {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Get { config, .. }
            | Command::Periods { config, .. }
            | Command::Securities { config }
            | Command::Validate { config }
            | Command::Import { config, .. } => Some(config.as_path()),
            Command::Fields { config } => config.as_deref(),
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match cli.command.config_path() {
        Some(path) => match load_config(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
        None => FileConfigAdapter::empty(),
    };

    logging::init(LogSettings::from_config(&config, cli.verbose));

    let result = match cli.command {
        Command::Get {
            security,
            field,
            period,
            time,
            ..
        } => run_get(&config, &security, &field, period.as_deref(), &time),
        Command::Periods {
            security,
            field,
            time,
            ..
        } => run_periods(&config, &security, &field, &time),
        Command::Fields { .. } => run_fields(&config),
        Command::Securities { .. } => run_securities(&config),
        Command::Validate { .. } => run_validate(&config),
        Command::Import { from, .. } => run_import(&config, &from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, FundamentalsError> {
    FileConfigAdapter::from_file(path).map_err(|e| FundamentalsError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Registry from `[registry] path`, or the built-in catalogue.
pub fn load_field_registry(config: &dyn ConfigPort) -> Result<FieldRegistry, FundamentalsError> {
    match config.get_string("registry", "path") {
        Some(path) if !path.trim().is_empty() => load_registry(path.trim()),
        _ => Ok(FieldRegistry::builtin()),
    }
}

/// Open the store selected by `[store] backend`.
pub fn open_store(config: &dyn ConfigPort) -> Result<Box<dyn FundamentalStore>, FundamentalsError> {
    let backend = validate_config(config)?;
    tracing::info!(backend = backend.name(), "opening fundamental store");
    match backend {
        StoreBackend::Csv => Ok(Box::new(CsvFundamentalStore::from_config(config)?)),
        StoreBackend::Sqlite => open_sqlite(config),
        StoreBackend::Postgres => open_postgres(config),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &dyn ConfigPort) -> Result<Box<dyn FundamentalStore>, FundamentalsError> {
    use crate::adapters::sqlite_store::SqliteFundamentalStore;
    Ok(Box::new(SqliteFundamentalStore::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_config: &dyn ConfigPort) -> Result<Box<dyn FundamentalStore>, FundamentalsError> {
    Err(feature_missing("sqlite"))
}

#[cfg(feature = "postgres")]
fn open_postgres(config: &dyn ConfigPort) -> Result<Box<dyn FundamentalStore>, FundamentalsError> {
    use crate::adapters::postgres_store::PostgresFundamentalStore;
    Ok(Box::new(PostgresFundamentalStore::from_config(config)?))
}

#[cfg(not(feature = "postgres"))]
fn open_postgres(_config: &dyn ConfigPort) -> Result<Box<dyn FundamentalStore>, FundamentalsError> {
    Err(feature_missing("postgres"))
}

#[cfg(any(not(feature = "sqlite"), not(feature = "postgres")))]
fn feature_missing(backend: &str) -> FundamentalsError {
    FundamentalsError::ConfigInvalid {
        section: "store".into(),
        key: "backend".into(),
        reason: format!("{} feature is not enabled in this build", backend),
    }
}

pub fn parse_time(input: &str) -> Result<PointInTime, FundamentalsError> {
    parse_point_in_time(input).ok_or_else(|| FundamentalsError::ConfigInvalid {
        section: "cli".into(),
        key: "time".into(),
        reason: format!("'{}' is not YYYY-MM-DD or YYYY-MM-DD HH:MM:SS", input),
    })
}

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub security: String,
    pub field: String,
    pub data_id: String,
    pub period: Option<Period>,
    pub value: DynamicValue,
}

#[derive(Debug, Serialize)]
pub struct PeriodsReport<T: Serialize> {
    pub security: String,
    pub field: String,
    pub data_id: String,
    pub default_period: Period,
    pub value: Option<T>,
    pub has_value: bool,
    pub periods: PeriodValues<T>,
}

/// Resolve one field through any store. Shared by the CLI and tests.
pub fn resolve_field(
    store: &dyn FundamentalStore,
    registry: &FieldRegistry,
    security: &str,
    field: &str,
    period: Option<&str>,
    time: PointInTime,
) -> Result<FieldReport, FundamentalsError> {
    let security = SecurityIdentifier::new(security)?;
    let descriptor = registry.require(field)?;
    let period = period.map(str::parse::<Period>).transpose()?;
    let resolver = FieldResolver::new(store);
    let value = resolver.resolve_dynamic(time, &security, descriptor, period)?;

    Ok(FieldReport {
        security: security.to_string(),
        field: descriptor.key.to_string(),
        data_id: descriptor.serialization_key(),
        period: period.or(descriptor.default_period),
        value,
    })
}

fn periods_report<T: FieldValue + Serialize>(
    resolver: FieldResolver<'_>,
    security: &SecurityIdentifier,
    descriptor: &FieldDescriptor,
    time: PointInTime,
) -> Result<serde_json::Value, FundamentalsError> {
    let field = resolver.multi_period::<T>(time, security, descriptor)?;
    let value = field.value()?;
    let report = PeriodsReport {
        security: security.to_string(),
        field: descriptor.key.to_string(),
        data_id: descriptor.serialization_key(),
        default_period: field.default_period(),
        value: if value.is_no_value() { None } else { Some(value) },
        has_value: field.has_value()?,
        periods: field.period_values()?,
    };
    to_json_value(&report)
}

/// Resolve every period of a multi-period field to JSON.
pub fn resolve_periods(
    store: &dyn FundamentalStore,
    registry: &FieldRegistry,
    security: &str,
    field: &str,
    time: PointInTime,
) -> Result<serde_json::Value, FundamentalsError> {
    let security = SecurityIdentifier::new(security)?;
    let descriptor = registry.require(field)?;
    let resolver = FieldResolver::new(store);

    match descriptor.value_type {
        FieldType::Double => periods_report::<f64>(resolver, &security, descriptor, time),
        FieldType::Integer => periods_report::<i64>(resolver, &security, descriptor, time),
        FieldType::Date => {
            periods_report::<chrono::NaiveDate>(resolver, &security, descriptor, time)
        }
        FieldType::Text => periods_report::<String>(resolver, &security, descriptor, time),
    }
}

fn to_json_value<T: Serialize>(value: &T) -> Result<serde_json::Value, FundamentalsError> {
    serde_json::to_value(value).map_err(|e| std::io::Error::other(e).into())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), FundamentalsError> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    println!("{}", text);
    Ok(())
}

fn run_get(
    config: &dyn ConfigPort,
    security: &str,
    field: &str,
    period: Option<&str>,
    time: &str,
) -> Result<(), FundamentalsError> {
    let time = parse_time(time)?;
    let registry = load_field_registry(config)?;
    let store = open_store(config)?;
    let report = resolve_field(store.as_ref(), &registry, security, field, period, time)?;
    print_json(&report)
}

fn run_periods(
    config: &dyn ConfigPort,
    security: &str,
    field: &str,
    time: &str,
) -> Result<(), FundamentalsError> {
    let time = parse_time(time)?;
    let registry = load_field_registry(config)?;
    let store = open_store(config)?;
    let report = resolve_periods(store.as_ref(), &registry, security, field, time)?;
    print_json(&report)
}

fn run_fields(config: &dyn ConfigPort) -> Result<(), FundamentalsError> {
    let registry = load_field_registry(config)?;
    for d in registry.iter() {
        let periods: Vec<_> = d.periods.iter().map(|p| p.tag()).collect();
        println!(
            "{:>8}  {:<8} {:<60} {}",
            d.data_id,
            d.value_type.to_string(),
            d.key.to_string(),
            periods.join("|")
        );
    }
    eprintln!("{} fields", registry.len());
    Ok(())
}

fn run_securities(config: &dyn ConfigPort) -> Result<(), FundamentalsError> {
    let store = open_store(config)?;
    let securities = store.list_securities()?;
    if securities.is_empty() {
        eprintln!("No securities found");
    } else {
        for s in &securities {
            println!("{}", s);
        }
        eprintln!("{} securities found", securities.len());
    }
    Ok(())
}

fn run_validate(config: &dyn ConfigPort) -> Result<(), FundamentalsError> {
    let backend = validate_config(config)?;
    let registry = load_field_registry(config)?;
    eprintln!("Store backend: {}", backend.name());
    eprintln!("Field registry: {} fields", registry.len());
    eprintln!("Configuration is valid.");
    Ok(())
}

fn run_import(config: &dyn ConfigPort, from: &Path) -> Result<(), FundamentalsError> {
    let total = import_csv_dir(config, from)?;
    eprintln!("Imported {} records from {}", total, from.display());
    Ok(())
}

/// Copy every security in the CSV directory `from` into the SQLite store
/// named by `config`. Returns the number of records written.
pub fn import_csv_dir(config: &dyn ConfigPort, from: &Path) -> Result<usize, FundamentalsError> {
    if store_backend(config)? != StoreBackend::Sqlite {
        return Err(FundamentalsError::ConfigInvalid {
            section: "store".into(),
            key: "backend".into(),
            reason: "import requires backend = sqlite".into(),
        });
    }
    validate_config(config)?;
    import_into_sqlite(config, &CsvFundamentalStore::new(from.to_path_buf()))
}

#[cfg(feature = "sqlite")]
fn import_into_sqlite(
    config: &dyn ConfigPort,
    source: &CsvFundamentalStore,
) -> Result<usize, FundamentalsError> {
    use crate::adapters::sqlite_store::SqliteFundamentalStore;

    let target = SqliteFundamentalStore::from_config(config)?;
    target.initialize_schema()?;

    let mut total = 0;
    for security in source.list_securities()? {
        let records = source.read_records(&security)?;
        total += target.insert_records(&records)?;
        tracing::info!(%security, records = records.len(), "imported");
    }
    Ok(total)
}

#[cfg(not(feature = "sqlite"))]
fn import_into_sqlite(
    _config: &dyn ConfigPort,
    _source: &CsvFundamentalStore,
) -> Result<usize, FundamentalsError> {
    Err(feature_missing("sqlite"))
}
