use mindport_core::{IdGenerator, ImportConfig, Importer, ParseResult};
use mindport_render::{ConvertOptions, convert_with};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MINDPORT_LOG";

#[derive(Debug)]
enum CliError {
    Help,
    Usage(&'static str),
    Io(std::io::Error),
    Config(mindport_core::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Help => write!(f, "{}", usage()),
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Config(err) => write!(f, "config error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<mindport_core::Error> for CliError {
    fn from(value: mindport_core::Error) -> Self {
        Self::Config(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Parse,
    Validate,
    Convert,
    Preview,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    config: Option<String>,
    deterministic_ids: bool,
    out: Option<String>,
}

fn usage() -> &'static str {
    "mindport-cli\n\
\n\
USAGE:\n\
  mindport-cli [parse] [OPTIONS] [<path>|-]\n\
  mindport-cli validate [OPTIONS] [<path>|-]\n\
  mindport-cli convert [OPTIONS] [<path>|-]\n\
  mindport-cli preview [OPTIONS] [<path>|-]\n\
\n\
OPTIONS:\n\
  --pretty               pretty-print the JSON output\n\
  --config <path>        YAML (.yaml/.yml) or JSON config merged over the defaults\n\
  --deterministic-ids    generate sequential ids (node_1, conn_2, ...)\n\
  --out <path>           write the JSON output to a file instead of stdout\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - The exit status is 2 when the document could not be imported (no <map>, no <node>,\n\
    or an unclosed root node); warnings alone never change the exit status.\n\
  - Set MINDPORT_LOG (e.g. MINDPORT_LOG=debug) to see diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Help),
            "parse" => args.command = Command::Parse,
            "validate" => args.command = Command::Validate,
            "convert" => args.command = Command::Convert,
            "preview" => args.command = Command::Preview,
            "--pretty" => args.pretty = true,
            "--deterministic-ids" => args.deterministic_ids = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn load_config(path: Option<&str>) -> Result<ImportConfig, CliError> {
    let Some(path) = path else {
        return Ok(ImportConfig::default());
    };
    let text = std::fs::read_to_string(path)?;
    let is_yaml = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let config = if is_yaml {
        ImportConfig::from_yaml_str(&text)?
    } else {
        ImportConfig::from_json_str(&text)?
    };
    tracing::debug!(path, yaml = is_yaml, "loaded config");
    Ok(config)
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs one command. Returns whether the parse hit a fatal error.
fn run(args: Args) -> Result<bool, CliError> {
    let config = load_config(args.config.as_deref())?;
    let text = read_input(args.input.as_deref())?;
    let importer = Importer::new().with_config(config);
    let mut ids = if args.deterministic_ids {
        IdGenerator::sequential()
    } else {
        IdGenerator::new()
    };

    let parsed: ParseResult = importer.parse_with_ids(&text, &mut ids);
    let fatal = parsed.has_fatal_error();
    for err in &parsed.errors {
        tracing::warn!(kind = ?err.kind, "{}", err.message);
    }

    let out = args.out.as_deref();
    match args.command {
        Command::Parse => write_json(&parsed, args.pretty, out)?,
        Command::Validate => write_json(&importer.validate(parsed), args.pretty, out)?,
        Command::Convert => {
            let validated = importer.validate(parsed);
            let options = ConvertOptions::from_config(importer.config());
            let converted = convert_with(&validated, &options, &mut ids);
            write_json(&converted, args.pretty, out)?;
        }
        Command::Preview => {
            let validated = importer.validate(parsed);
            write_json(&importer.preview(&validated), args.pretty, out)?;
        }
    }
    Ok(fatal)
}

fn main() {
    init_logging();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Help) => {
            print!("{}", usage());
            return;
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(false) => {}
        Ok(true) => std::process::exit(2),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
