//! `schemafield`: build a form from a field document, bind it to model data
//! and report whether every visible field validates.

mod logging;

use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::{Map, Value};
use tracing::{debug, info};

use schemafield::{
    DocumentFormat, Form, FormOutcome, Model, ModelStore, OutputDestination, OutputOptions,
    PopoutStack, emit, parse_document_str,
};

#[derive(Debug, Parser)]
#[command(
    name = "schemafield",
    version,
    about = "Validate model data against declarative form fields"
)]
struct Cli {
    /// Field document: file path, inline payload, or "-" for stdin
    #[arg(short = 'F', long = "fields", value_name = "SPEC")]
    fields: String,

    /// Model data: file path, inline payload, or "-" for stdin
    #[arg(short = 'd', long = "data", value_name = "SPEC")]
    data: Option<String>,

    /// Override one model attribute; VALUE is parsed as JSON, else taken as text
    #[arg(long = "set", value_name = "KEY=VALUE", action = ArgAction::Append)]
    sets: Vec<String>,

    /// Report destinations ("-" writes to stdout). Accepts multiple values per flag use.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,

    /// Edit the form in the terminal before validating
    #[cfg(feature = "tui")]
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Title shown at the top of the interactive form
    #[cfg(feature = "tui")]
    #[arg(long = "title", value_name = "TEXT")]
    title: Option<String>,

    /// Default log level; SCHEMAFIELD_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let mut diagnostics = DiagnosticCollector::default();
    if cli.fields == "-" && cli.data.as_deref() == Some("-") {
        diagnostics.push_input(
            "fields/data",
            "cannot read fields and data from stdin simultaneously; provide inline content or files",
        );
    }
    let both_stdin = cli.fields == "-" && cli.data.as_deref() == Some("-");

    let fields = load_optional_value(Some(&cli.fields), "fields", both_stdin, &mut diagnostics);
    let data = load_optional_value(cli.data.as_deref(), "data", both_stdin, &mut diagnostics);
    let overrides = parse_overrides(&cli.sets, &mut diagnostics);

    let (output_settings, output_paths) = build_output_options(&cli, &mut diagnostics);
    ensure_output_paths_available(&output_paths, cli.force, &mut diagnostics);

    diagnostics.into_result()?;

    let fields = fields.ok_or_else(|| eyre!("no field document was loaded"))?;
    let model = Rc::new(match data {
        Some(Value::Object(values)) => ModelStore::from_value(&Value::Object(values)),
        Some(other) => return Err(eyre!("model data must be an object, got {other}")),
        None => ModelStore::new(),
    });
    if !overrides.is_empty() {
        model.set_many(overrides);
    }

    let popouts = Rc::new(PopoutStack::new());
    let shared: Rc<dyn Model> = model.clone();
    let form = Form::from_document("schemafield", shared, popouts.clone(), &fields)
        .map_err(|err| eyre!("{err:#}"))?;
    info!(fields = form.len(), "form built");

    let outcome = match run_form(&cli, form, popouts)? {
        Some(outcome) => outcome,
        None => {
            eprintln!("cancelled; nothing was written");
            return Ok(ExitCode::from(2));
        }
    };

    emit(&outcome, &output_settings).map_err(|err| eyre!("{err:#}"))?;
    debug!(valid = outcome.is_valid(), issues = outcome.issues().len(), "report written");

    Ok(if outcome.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Validate the form, interactively when asked. `None` means the user quit.
#[cfg(feature = "tui")]
fn run_form(cli: &Cli, form: Form, popouts: Rc<PopoutStack>) -> Result<Option<FormOutcome>> {
    use schemafield::{FormSession, SessionOutcome};

    if !cli.interactive {
        return Ok(Some(validate_once(form)));
    }
    let mut session = FormSession::new(form, popouts);
    if let Some(title) = cli.title.as_ref() {
        session = session.with_title(title.clone());
    }
    match session.run().map_err(|err| eyre!("{err:#}"))? {
        SessionOutcome::Submitted(values) => Ok(Some(FormOutcome::Valid { values })),
        SessionOutcome::Cancelled => Ok(None),
    }
}

#[cfg(not(feature = "tui"))]
fn run_form(_cli: &Cli, form: Form, _popouts: Rc<PopoutStack>) -> Result<Option<FormOutcome>> {
    Ok(Some(validate_once(form)))
}

fn validate_once(form: Form) -> FormOutcome {
    form.render_all();
    let outcome = form.validate();
    form.destroy();
    outcome
}

fn load_optional_value(
    spec: Option<&str>,
    label: &str,
    skip: bool,
    diagnostics: &mut DiagnosticCollector,
) -> Option<Value> {
    if skip {
        return None;
    }
    let raw = spec?;
    let format = if raw == "-" {
        DocumentFormat::default()
    } else {
        match probe_format_from_extension(Path::new(raw)) {
            ExtensionFormat::Known(format) => format,
            ExtensionFormat::UnsupportedFeature {
                format_name,
                feature_flag,
            } => {
                diagnostics.push_input(
                    label,
                    format!(
                        "{label} '{raw}' requires {format_name} support, but this build lacks the '{feature_flag}' feature"
                    ),
                );
                return None;
            }
            ExtensionFormat::Unknown => DocumentFormat::default(),
        }
    };
    match load_value(raw, format, label) {
        Ok(value) => Some(value),
        Err(err) => {
            diagnostics.push_input(label, format!("{err:#}"));
            None
        }
    }
}

fn load_value(spec: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    if spec == "-" {
        let contents = read_from_source(&InputSource::Stdin)?;
        return parse_contents(&contents, format, label);
    }

    let path = PathBuf::from(spec);
    match read_from_source(&InputSource::File(path.clone())) {
        Ok(contents) => parse_contents(&contents, format, label),
        Err(err) => {
            if is_not_found(&err) {
                let inline_label = format!("inline {label}");
                return parse_contents(spec, format, &inline_label);
            }
            Err(err.wrap_err(format!("failed to load {label} from {}", path.display())))
        }
    }
}

fn read_from_source(source: &InputSource) -> Result<String> {
    match source {
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .wrap_err("failed to read from stdin")?;
            Ok(buffer)
        }
        InputSource::File(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read file {}", path.display())),
    }
}

fn is_not_found(err: &Report) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|io_err| io_err.kind() == io::ErrorKind::NotFound)
}

fn parse_contents(contents: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    match parse_document_str(contents, format) {
        Ok(value) => Ok(value),
        Err(primary) => {
            for candidate in available_formats() {
                if candidate == format {
                    continue;
                }
                if let Ok(value) = parse_document_str(contents, candidate) {
                    return Ok(value);
                }
            }
            Err(Report::msg(format!(
                "failed to parse {label}: tried {} (first error: {primary:#})",
                format_list()
            )))
        }
    }
}

fn available_formats() -> Vec<DocumentFormat> {
    ["json", "yaml", "toml"]
        .into_iter()
        .filter_map(|name| name.parse().ok())
        .collect()
}

fn format_list() -> String {
    let items: Vec<String> = available_formats()
        .into_iter()
        .map(|fmt| fmt.to_string())
        .collect();
    items.join(", ")
}

/// `key=value` pairs; the value is JSON when it parses, otherwise a string.
fn parse_overrides(raw: &[String], diagnostics: &mut DiagnosticCollector) -> Map<String, Value> {
    let mut overrides = Map::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            diagnostics.push_input("set", format!("'{pair}' is not KEY=VALUE"));
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            diagnostics.push_input("set", format!("'{pair}' has an empty key"));
            continue;
        }
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        overrides.insert(key.to_string(), value);
    }
    overrides
}

#[derive(Default)]
struct DiagnosticCollector {
    messages: Vec<String>,
}

impl DiagnosticCollector {
    fn push_input(&mut self, label: &str, message: impl Into<String>) {
        self.messages
            .push(format!("input ({label}): {}", message.into()));
    }

    fn push_output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn len(&self) -> usize {
        self.messages.len()
    }

    fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("encountered input/output issues:\n");
        for (idx, msg) in self.messages.iter().enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

fn build_output_options(cli: &Cli, diagnostics: &mut DiagnosticCollector) -> (OutputOptions, Vec<PathBuf>) {
    let mut destinations = Vec::new();
    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            diagnostics.push_output("output destination cannot be empty");
            continue;
        }
        if raw == "-" {
            destinations.push(OutputDestination::Stdout);
        } else {
            destinations.push(OutputDestination::file(raw));
        }
    }
    if destinations.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let file_paths: Vec<PathBuf> = destinations
        .iter()
        .filter_map(|dest| match dest {
            OutputDestination::File(path) => Some(path.clone()),
            OutputDestination::Stdout => None,
        })
        .collect();

    let start = diagnostics.len();
    let format = infer_format_from_files(&file_paths, diagnostics).unwrap_or_default();
    if diagnostics.len() > start {
        return (OutputOptions::default(), file_paths);
    }

    let options = OutputOptions::new(format)
        .with_pretty(!cli.no_pretty)
        .with_destinations(destinations);
    (options, file_paths)
}

fn infer_format_from_files(
    file_paths: &[PathBuf],
    diagnostics: &mut DiagnosticCollector,
) -> Option<DocumentFormat> {
    let mut detected: Option<DocumentFormat> = None;
    for path in file_paths {
        match probe_format_from_extension(path) {
            ExtensionFormat::Known(format) => {
                if let Some(existing) = detected {
                    if existing != format {
                        diagnostics.push_output(format!(
                            "output file {} uses {format} but other destinations use {existing}; align extensions",
                            path.display()
                        ));
                    }
                } else {
                    detected = Some(format);
                }
            }
            ExtensionFormat::UnsupportedFeature {
                format_name,
                feature_flag,
            } => diagnostics.push_output(format!(
                "output file {} requires {format_name} support, but this build was compiled without the '{feature_flag}' feature",
                path.display()
            )),
            ExtensionFormat::Unknown => diagnostics.push_output(format!(
                "cannot infer format from output file {}; use .json/.yaml/.toml",
                path.display()
            )),
        }
    }
    detected
}

fn probe_format_from_extension(path: &Path) -> ExtensionFormat {
    let Some(ext) = path.extension() else {
        return ExtensionFormat::Unknown;
    };
    let normalized = ext.to_string_lossy().to_ascii_lowercase();
    match normalized.as_str() {
        "json" => ExtensionFormat::Known(DocumentFormat::Json),
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => ExtensionFormat::Known(DocumentFormat::Yaml),
        #[cfg(not(feature = "yaml"))]
        "yaml" | "yml" => ExtensionFormat::UnsupportedFeature {
            format_name: "yaml",
            feature_flag: "yaml",
        },
        #[cfg(feature = "toml")]
        "toml" => ExtensionFormat::Known(DocumentFormat::Toml),
        #[cfg(not(feature = "toml"))]
        "toml" => ExtensionFormat::UnsupportedFeature {
            format_name: "toml",
            feature_flag: "toml",
        },
        _ => ExtensionFormat::Unknown,
    }
}

#[derive(Debug)]
enum ExtensionFormat {
    Known(DocumentFormat),
    #[allow(dead_code)]
    UnsupportedFeature {
        format_name: &'static str,
        feature_flag: &'static str,
    },
    Unknown,
}

fn ensure_output_paths_available(
    paths: &[PathBuf],
    force: bool,
    diagnostics: &mut DiagnosticCollector,
) {
    if force {
        return;
    }
    for path in paths {
        if path.exists() {
            diagnostics.push_output(format!(
                "file {} already exists (pass --force to overwrite)",
                path.display()
            ));
        }
    }
}
