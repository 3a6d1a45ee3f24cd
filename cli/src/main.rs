use std::fs;
use std::path::{Path, PathBuf};

use argspec_core::{
    DEFAULT_LINE_WIDTH, Formatter, Outcome, Parsed, Spec, TextFormatter, ValidatedConfig, validate,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argspec")]
#[command(about = "Validate declarative argument specifications and try them out")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Log verbosity (-v debug, -vv trace); RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one or more specification files.
    Validate(ValidateArgs),
    /// Render the help page of a specification.
    Help(HelpArgs),
    /// Parse tokens against a specification and print the result.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Specification files (.json, .yaml or .yml).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Specification file (.json, .yaml or .yml).
    spec: PathBuf,
    /// Group path to render the page for (names or abbreviations).
    groups: Vec<String>,
    /// Line width of the rendered page.
    #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
    width: usize,
    /// Prefer reduced descriptions.
    #[arg(long)]
    reduced: bool,
    /// Program name shown in the usage line.
    #[arg(long)]
    program: Option<String>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Specification file (.json, .yaml or .yml).
    spec: PathBuf,
    /// Output format of the parse result.
    #[arg(long, value_enum, default_value = "json")]
    format: CliOutputFormat,
    /// Line width of help text.
    #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
    width: usize,
    /// Invocation path the program name is derived from.
    #[arg(long)]
    program: Option<String>,
    /// Tokens to parse, after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

/// Subcommand failure with its exit status.
struct Failure {
    message: String,
    hint: String,
    code: i32,
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self {
            message,
            hint: String::new(),
            code: 1,
        }
    }
}

/// Parse result as printed by `argspec parse`.
#[derive(Debug, Serialize)]
struct ParseReport<'a> {
    group_names: Vec<&'a str>,
    #[serde(flatten)]
    parsed: &'a Parsed,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args).map_err(Failure::from),
        Command::Help(args) => run_help(args).map_err(Failure::from),
        Command::Parse(args) => run_parse(args),
    };

    if let Err(failure) = result {
        eprintln!("error: {}", failure.message);
        if !failure.hint.is_empty() {
            eprintln!("{}", failure.hint);
        }
        std::process::exit(failure.code);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    for path in &args.inputs {
        let spec = load_spec(path)?;
        let config = validate(&spec).map_err(|err| format!("{}: {err}", path.display()))?;

        let groups = config.nodes().filter(|(_, node)| node.group.is_some()).count();
        let endpoints: usize = config.nodes().map(|(_, node)| node.endpoints.len()).sum();
        println!(
            "Validated '{}': {groups} group(s), {} option(s), {endpoints} endpoint(s).",
            path.display(),
            config.options.len(),
        );
    }
    println!(
        "Validated {} specification file(s).",
        args.inputs.len()
    );
    Ok(())
}

fn run_help(args: HelpArgs) -> Result<(), String> {
    let spec = load_spec(&args.spec)?;
    let config = validate(&spec).map_err(|err| err.to_string())?;
    let node = config
        .find_path(&args.groups)
        .ok_or_else(|| format!("Unknown group path [{}]", args.groups.join(" ")))?;

    let program = args.program.unwrap_or_else(|| spec.program.clone());
    let text = TextFormatter.render_help(&config, &program, node, args.reduced, args.width);
    println!("{text}");
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), Failure> {
    let spec = load_spec(&args.spec)?;
    let config = validate(&spec).map_err(|err| err.to_string())?;

    let mut parser = argspec_core::Parser::new(&config).with_width(args.width);
    if let Some(path) = &args.program {
        parser = parser.with_program_path(path);
    }
    debug!(tokens = args.tokens.len(), program = parser.program(), "Parsing tokens");

    match parser.parse(&args.tokens) {
        Ok(Outcome::Print(print)) => {
            println!("{}", print.text);
            Ok(())
        }
        Ok(Outcome::Parsed(parsed)) => {
            let report = ParseReport {
                group_names: group_names(&config, &parsed),
                parsed: &parsed,
            };
            let raw = match args.format {
                CliOutputFormat::Json => serde_json::to_string_pretty(&report)
                    .map_err(|err| format!("Failed to serialize parse result: {err}"))?,
                CliOutputFormat::Yaml => serde_yaml::to_string(&report)
                    .map_err(|err| format!("Failed to serialize parse result: {err}"))?,
            };
            println!("{}", raw.trim_end());
            Ok(())
        }
        Err(err) => Err(Failure {
            message: err.to_string(),
            hint: parser.help_hint(),
            code: 2,
        }),
    }
}

fn load_spec(path: &Path) -> Result<Spec, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let spec = if yaml {
        Spec::from_yaml(&raw)
    } else {
        Spec::from_json(&raw)
    };
    spec.map_err(|err| format!("Failed to load '{}': {err}", path.display()))
}

/// Names of the selected groups, resolved from their ids.
fn group_names<'a>(config: &ValidatedConfig<'a>, parsed: &Parsed) -> Vec<&'a str> {
    let mut names = Vec::new();
    let mut node = config.root();
    for id in parsed.group_path() {
        let child = node
            .children
            .iter()
            .map(|&child| config.node(child))
            .find(|child| child.group.is_some_and(|group| group.id == *id));
        let Some(child) = child else { break };
        names.extend(child.name());
        node = child;
    }
    names
}
