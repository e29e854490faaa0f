use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use xsd2_core::{
    generate, Capitalizer, GenerationRequest, SchemaIr, TransformOptions, TransformReport,
};

#[derive(Parser)]
#[command(name = "xsd2")]
#[command(about = "Reshape the type model generated from XML Schemas before it is emitted")]
#[command(version)]
struct Cli {
    /// IR files produced by the schema importer
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory (defaults to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// IR files of imported schemas, matched by XML identity (see --exclude-imports-by-name)
    #[arg(long = "import")]
    imports: Vec<PathBuf>,

    /// JSON options file; command-line flags are applied on top
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the rename/exclusion report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Wrap optional scalar members in nullable types
    #[arg(long)]
    nullable: bool,

    /// Use lists instead of arrays for repeated members
    #[arg(long)]
    lists: bool,

    /// Record element declaration order
    #[arg(long)]
    order: bool,

    /// Add a text member to mixed-content types
    #[arg(long)]
    mixed: bool,

    /// Exclude imported types that no local type references
    #[arg(long, visible_alias = "ei")]
    exclude_imports: bool,

    /// Exclude imported types by XML name and namespace
    #[arg(long, visible_alias = "ein")]
    exclude_imports_by_name: bool,

    /// Remove annotations of this kind (repeatable)
    #[arg(long = "remove-attribute", visible_alias = "ra")]
    remove_attributes: Vec<String>,

    /// Remove debugger-step-through markers
    #[arg(long)]
    strip_debug_attributes: bool,

    /// Remove markers a portable class library cannot reference
    #[arg(long)]
    pcl: bool,

    /// Capitalize the first character of member names
    #[arg(long, visible_alias = "cp")]
    capitalize_properties: bool,

    /// Capitalize the first character of type names
    #[arg(long, visible_alias = "ct")]
    capitalize_types: bool,

    /// Capitalize the first character of enum values
    #[arg(long, visible_alias = "ce")]
    capitalize_enum_values: bool,

    /// Capitalize the first character of every identifier
    #[arg(long, visible_alias = "ca")]
    capitalize_all: bool,

    /// Capitalizer used by --cp: none, first, word or word:N (default first)
    #[arg(long, value_name = "CAPITALIZER")]
    property_capitalizer: Option<Capitalizer>,

    /// Capitalizer used by --ct: none, first, word or word:N (default first)
    #[arg(long, value_name = "CAPITALIZER")]
    type_capitalizer: Option<Capitalizer>,

    /// Capitalizer used by --ce: none, first, word or word:N (default first)
    #[arg(long, value_name = "CAPITALIZER")]
    enum_capitalizer: Option<Capitalizer>,

    /// Namespace of the generated code
    #[arg(short, long, visible_alias = "ns")]
    namespace: Option<String>,

    /// Combine all inputs into this single output file
    #[arg(long, value_name = "FILE")]
    combine: Option<PathBuf>,

    /// Highest numeric suffix tried when disambiguating names (0 disables)
    #[arg(long)]
    disambiguation_limit: Option<u32>,

    /// Nullable, lists, mixed, exclude imports, capitalize all, strip debug markers
    #[arg(long)]
    all: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
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

    let options = build_options(&cli)?;
    let imports = cli
        .imports
        .iter()
        .map(|path| read_ir(path))
        .collect::<Result<Vec<_>>>()?;

    if let Some(dir) = &cli.output {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let report = if options.combine_outputs {
        run_combined(&cli, imports, &options)?
    } else {
        run_each(&cli, &imports, &options)?
    };

    for diagnostic in &report.diagnostics {
        eprintln!("Warning: {}: {}", diagnostic.subject, diagnostic.message);
    }
    if let Some(path) = &cli.report {
        write_json(&report, Some(path), cli.format)?;
    }

    Ok(())
}

/// Options from `--config`, with flags applied on top.
fn build_options(cli: &Cli) -> Result<TransformOptions> {
    let mut options: TransformOptions = match &cli.config {
        Some(path) => read_json(path, "options")?,
        None => TransformOptions::default(),
    };

    options.nullable_types |= cli.nullable || cli.all;
    options.use_lists |= cli.lists || cli.all;
    options.preserve_order |= cli.order;
    options.mixed_content |= cli.mixed || cli.all;
    options.exclude_imported_types |= cli.exclude_imports || cli.all;
    options.exclude_imported_types_by_xml_identity |= cli.exclude_imports_by_name;

    if cli.strip_debug_attributes || cli.all {
        options = options.with_debug_attributes_stripped();
    }
    if cli.pcl {
        options = options.with_portable_target();
    }
    options
        .attributes_to_strip
        .extend(cli.remove_attributes.iter().cloned());

    // The capitalizer options only pick what --cp/--ct/--ce apply.
    let capitalize_all = cli.capitalize_all || cli.all;
    let chosen = |choice: Option<Capitalizer>| choice.unwrap_or(Capitalizer::FirstCharacter);
    if cli.capitalize_properties || capitalize_all {
        options.property_capitalizer = chosen(cli.property_capitalizer);
    }
    if cli.capitalize_types || capitalize_all {
        options.type_capitalizer = chosen(cli.type_capitalizer);
    }
    if cli.capitalize_enum_values || capitalize_all {
        options.enum_capitalizer = chosen(cli.enum_capitalizer);
    }

    if let Some(namespace) = &cli.namespace {
        options.output_namespace = namespace.clone();
    }
    if let Some(limit) = cli.disambiguation_limit {
        options.disambiguation_limit = limit;
    }
    options.combine_outputs |= cli.combine.is_some();

    options
        .validate()
        .map_err(|e| anyhow::Error::from(e).context("Invalid options"))?;
    Ok(options)
}

/// One generation per input: a failing input does not stop the others.
fn run_each(
    cli: &Cli,
    imports: &[SchemaIr],
    options: &TransformOptions,
) -> Result<TransformReport> {
    let mut report = TransformReport::new();
    let mut failed = 0usize;

    for path in &cli.inputs {
        let outcome = read_ir(path).and_then(|input| {
            let request = GenerationRequest {
                inputs: vec![input],
                imports: imports.to_vec(),
            };
            generate(request, options)
                .map_err(|e| anyhow::Error::from(e).context("Transformation failed"))
        });

        match outcome {
            Ok(output) => {
                let target = cli.output.as_ref().map(|dir| output_path(dir, path));
                for unit in &output.units {
                    write_json(unit, target.as_ref(), cli.format)?;
                }
                report.extend(output.report);
            }
            Err(e) => {
                eprintln!("Error: {}: {e:#}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} inputs failed", cli.inputs.len());
    }
    Ok(report)
}

/// All inputs into one combined unit.
fn run_combined(
    cli: &Cli,
    imports: Vec<SchemaIr>,
    options: &TransformOptions,
) -> Result<TransformReport> {
    let inputs = cli
        .inputs
        .iter()
        .map(|path| read_ir(path))
        .collect::<Result<Vec<_>>>()?;
    let output = generate(GenerationRequest { inputs, imports }, options)
        .map_err(|e| anyhow::Error::from(e).context("Transformation failed"))?;

    let target = cli.combine.as_ref().map(|file| match &cli.output {
        Some(dir) if file.is_relative() => dir.join(file),
        _ => file.clone(),
    });
    for unit in &output.units {
        write_json(unit, target.as_ref(), cli.format)?;
    }
    Ok(output.report)
}

fn output_path(dir: &Path, input: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => dir.join(name),
        None => dir.join("output.json"),
    }
}

fn read_ir(path: &Path) -> Result<SchemaIr> {
    let mut schema: SchemaIr = read_json(path, "IR")?;
    if schema.source.is_empty() {
        schema.source = path.display().to_string();
    }
    Ok(schema)
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {what} file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {what} from: {}", path.display()))
}

fn write_json<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Pretty => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
