// Command-line interface for legix
//
// This binary reads legislation markup, validates it and writes the normalized JSON document.
//
// Usage:
//  legix <input> [--output <file>]            - Convert markup to JSON (default)
//  legix convert <input> [--output <file>]    - Same as above (explicit)
//  legix validate <input>                     - Report violations, exit 1 when there are any
//  legix format <input> [--output <file>]     - Rewrite a valid document in canonical layout
//  legix inspect <path> [<transform>]         - Execute a transform (defaults to "raw-treeviz")
//  legix --list-transforms                    - List available transforms
//
// Diagnostics go to stderr, except for `validate`, whose output they are. Logging goes to
// stderr as well: -v, -vv and -vvv raise it from warnings to info, debug and trace. RUST_LOG
// takes precedence when set.
//
// Extra Parameters:
//
// Settings can be overridden per run with --extra-<parameter-name> [value]; boolean ones may
// omit the value. See apply_config_overrides for the recognised names.
// Example:
//  legix law.xml --extra-line-numbers false --extra-errors list

use legix_cli::transforms;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use legix_config::{DiagnosticsFormat, LegixConfig, Loader};
use legix_core::markup::WriterOptions;
use legix_core::{LegixError, Record, Report, TransformOptions};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "validate", "format", "inspect", "help"];

/// Splits `--extra-<key> [value]` (or `--extras-<key> [value]`) pairs out of `args`.
///
/// A key not followed by a value is a boolean flag set to "true".
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut args = args.iter().peekable();

    while let Some(arg) = args.next() {
        let Some(key) = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"))
        else {
            cleaned_args.push(arg.clone());
            continue;
        };
        let value = match args.peek() {
            Some(next) if !next.starts_with('-') => args.next().cloned(),
            _ => None,
        };
        extra_params.insert(key.to_string(), value.unwrap_or_else(|| "true".to_string()));
    }

    (cleaned_args, extra_params)
}

fn input_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .help("Path to the legislation XML file")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .help("Output file path (defaults to stdout)")
        .value_hint(ValueHint::FilePath)
}

fn build_cli() -> Command {
    Command::new("legix")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for validating and converting legislation parameter files")
        .long_about(
            "legix reads legislation XML (NODE / CODE / BAREME documents), validates it and\n\
            writes the normalized JSON document.\n\n\
            Commands:\n  \
            - convert:  XML to JSON (default command)\n  \
            - validate: report every violation in a document\n  \
            - format:   rewrite a valid document in canonical layout\n  \
            - inspect:  view intermediate stages (raw tree, records, errors)\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to override a setting for one run.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            legix law.xml                             # Convert, JSON on stdout\n  \
            legix law.xml -o law.json                 # Convert to a file\n  \
            legix validate law.xml --extra-errors list\n  \
            legix inspect law.xml errors-json",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a legix.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log more (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert legislation XML to JSON (default command)")
                .arg(input_arg("input"))
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a legislation XML file")
                .long_about(
                    "Validate a legislation XML file and print its violations.\n\n\
                    Exits with status 1 when the document has any violation.\n\
                    Violations are printed as a nested JSON tree, or one per line\n\
                    with --extra-errors list.",
                )
                .arg(input_arg("input")),
        )
        .subcommand(
            Command::new("format")
                .about("Format a legislation XML file")
                .long_about(
                    "Validate a legislation XML file and write it back in canonical layout:\n\
                    children grouped by kind, values sorted by descending start date.\n\n\
                    Only valid documents can be formatted.",
                )
                .arg(input_arg("input"))
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect intermediate stages of the pipeline")
                .arg(input_arg("path"))
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'raw-treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    // A bare path means `convert`.
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_tracing(matches.get_count("verbose"));

    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return;
    }

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);
    for key in extra_params.keys() {
        tracing::warn!(parameter = %key, "ignoring unknown --extra parameter");
    }

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let (input, output) = input_and_output(sub_matches);
            handle_convert_command(input, output, &config);
        }
        Some(("validate", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            handle_validate_command(input, &config);
        }
        Some(("format", sub_matches)) => {
            let (input, output) = input_and_output(sub_matches);
            handle_format_command(input, output, &config);
        }
        Some(("inspect", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            handle_inspect_command(path, transform, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn input_and_output(matches: &ArgMatches) -> (&str, Option<&str>) {
    let input = matches
        .get_one::<String>("input")
        .expect("input is required");
    let output = matches.get_one::<String>("output").map(|s| s.as_str());
    (input, output)
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handle the convert command
fn handle_convert_command(input: &str, output: Option<&str>, config: &LegixConfig) {
    let record = read_record(input);
    let legislation = legix_core::validate(&record).unwrap_or_else(|report| {
        eprint!("{}", render_report(&report, &record, config));
        std::process::exit(1);
    });

    let options = TransformOptions::from(&config.output);
    let document = legix_core::transform(&legislation, &options).unwrap_or_else(|e| fail(&e));
    let json = if config.output.pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .unwrap_or_else(|e| fail(&LegixError::from(e)));

    tracing::info!(input, elements = legislation.root.element_count(), "converted");
    write_output(output, &(json + "\n"));
}

/// Handle the validate command
fn handle_validate_command(input: &str, config: &LegixConfig) {
    let record = read_record(input);
    match legix_core::validate(&record) {
        Ok(legislation) => {
            println!(
                "{input}: valid ({} elements)",
                legislation.root.element_count()
            );
        }
        Err(report) => {
            print!("{}", render_report(&report, &record, config));
            std::process::exit(1);
        }
    }
}

/// Handle the format command
fn handle_format_command(input: &str, output: Option<&str>, config: &LegixConfig) {
    let record = read_record(input);
    let legislation = legix_core::validate(&record).unwrap_or_else(|report| {
        eprint!("{}", render_report(&report, &record, config));
        std::process::exit(1);
    });
    let markup = legix_core::to_markup(&legislation, &WriterOptions::from(&config.format));
    write_output(output, &markup);
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, transform: &str, config: &LegixConfig) {
    let source = legix_core::read_path(Path::new(path)).unwrap_or_else(|e| fail(&e));
    let params = build_inspect_params(config);
    let output = transforms::execute_transform(&source, transform, &params).unwrap_or_else(|e| {
        eprintln!("Execution error: {e}");
        std::process::exit(1);
    });
    print!("{output}");
}

/// Handle the list-transforms command
fn handle_list_transforms_command() {
    println!("Available transforms:\n");
    println!("  raw-treeviz    - Element tree with source line ranges");
    println!("  raw-json       - Flattened records, as validation sees them");
    println!("  errors-json    - Violations as a nested tree");
    println!("  errors-list    - Violations, one per line");
    println!("  document-json  - The normalized document");
    println!("  markup         - The validated document written back as XML");
}

fn read_record(input: &str) -> Record {
    let source = legix_core::read_path(Path::new(input)).unwrap_or_else(|e| fail(&e));
    legix_core::parse_record(&source).unwrap_or_else(|e| fail(&e))
}

fn fail(error: &LegixError) -> ! {
    eprintln!("Error: {error}");
    std::process::exit(1);
}

fn write_output(output: Option<&str>, text: &str) {
    match output {
        Some(path) => fs::write(path, text).unwrap_or_else(|e| {
            eprintln!("Error writing file '{path}': {e}");
            std::process::exit(1);
        }),
        None => print!("{text}"),
    }
}

/// Renders violations the way the configuration asks for.
fn render_report(report: &Report, record: &Record, config: &LegixConfig) -> String {
    let diagnostics = &config.diagnostics;
    let rendered = match diagnostics.format {
        DiagnosticsFormat::List => {
            let mut text = report.to_list();
            if diagnostics.include_document {
                text.push('\n');
                text.push_str(&serde_json::to_string_pretty(record).unwrap_or_default());
                text.push('\n');
            }
            return text;
        }
        DiagnosticsFormat::Tree if diagnostics.include_document => serde_json::to_string_pretty(
            &serde_json::json!({"errors": report.to_tree(), "document": record}),
        ),
        DiagnosticsFormat::Tree => serde_json::to_string_pretty(&report.to_tree()),
    };
    rendered.unwrap_or_default() + "\n"
}

fn load_cli_config(explicit_path: Option<&str>) -> LegixConfig {
    let loader = Loader::new().with_optional_file("legix.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(config: &mut LegixConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("pretty") {
        config.output.pretty = parse_bool_arg("pretty", &raw);
    }
    if let Some(raw) = extra_params.remove("line-numbers") {
        config.output.include_line_numbers = parse_bool_arg("line-numbers", &raw);
    }
    if let Some(raw) = extra_params.remove("context") {
        // A bare `--extra-context` flag clears the context.
        config.output.context = if raw == "true" { String::new() } else { raw };
    }
    if let Some(raw) = extra_params.remove("errors") {
        config.diagnostics.format = match raw.as_str() {
            "tree" => DiagnosticsFormat::Tree,
            "list" => DiagnosticsFormat::List,
            other => {
                eprintln!("Invalid value '{other}' for --extra-errors (expected tree or list)");
                std::process::exit(1);
            }
        };
    }
    if let Some(raw) = extra_params.remove("with-document") {
        config.diagnostics.include_document = parse_bool_arg("with-document", &raw);
    }
    if let Some(raw) = extra_params.remove("show-linum") {
        config.inspect.show_line_numbers = parse_bool_arg("show-linum", &raw);
    }
}

fn build_inspect_params(config: &LegixConfig) -> HashMap<String, String> {
    let mut params = HashMap::new();
    params.insert(
        "show-linum".to_string(),
        config.inspect.show_line_numbers.to_string(),
    );
    params.insert(
        "line-numbers".to_string(),
        config.output.include_line_numbers.to_string(),
    );
    params.insert("context".to_string(), config.output.context.clone());
    params
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn test_parse_extra_args_empty() {
        let input = args(&["legix", "validate", "law.xml"]);
        let (cleaned, extra) = parse_extra_args(&input);
        assert_eq!(cleaned, input);
        assert!(extra.is_empty());
    }

    #[test]
    fn test_parse_extra_args_values_and_flags() {
        let input = args(&[
            "legix",
            "law.xml",
            "--extra-errors",
            "list",
            "-o",
            "out.json",
            "--extra-with-document",
            "--extras-pretty",
            "false",
        ]);
        let (cleaned, extra) = parse_extra_args(&input);
        assert_eq!(cleaned, args(&["legix", "law.xml", "-o", "out.json"]));
        assert_eq!(extra.len(), 3);
        assert_eq!(extra.get("errors"), Some(&"list".to_string()));
        assert_eq!(extra.get("with-document"), Some(&"true".to_string()));
        assert_eq!(extra.get("pretty"), Some(&"false".to_string()));
    }

    #[test]
    fn test_parse_extra_args_flag_at_end() {
        let (cleaned, extra) = parse_extra_args(&args(&["legix", "law.xml", "--extra-pretty"]));
        assert_eq!(cleaned, args(&["legix", "law.xml"]));
        assert_eq!(extra.get("pretty"), Some(&"true".to_string()));
    }

    #[test]
    fn apply_config_overrides_updates_known_flags() {
        let mut config = load_cli_config(None);
        let mut extras = HashMap::new();
        extras.insert("errors".to_string(), "list".to_string());
        extras.insert("line-numbers".to_string(), "no".to_string());
        extras.insert("context".to_string(), "true".to_string());
        extras.insert("unknown".to_string(), "1".to_string());

        apply_config_overrides(&mut config, &mut extras);

        assert_eq!(config.diagnostics.format, DiagnosticsFormat::List);
        assert!(!config.output.include_line_numbers);
        assert_eq!(config.output.context, "");
        assert_eq!(extras.len(), 1);
    }

    #[test]
    fn inspect_params_follow_config() {
        let mut config = load_cli_config(None);
        config.inspect.show_line_numbers = false;
        let params = build_inspect_params(&config);
        assert_eq!(params.get("show-linum"), Some(&"false".to_string()));
        assert_eq!(params.get("line-numbers"), Some(&"true".to_string()));
    }

    #[test]
    fn report_renders_as_list_with_document() {
        let mut config = load_cli_config(None);
        config.diagnostics.format = DiagnosticsFormat::List;
        config.diagnostics.include_document = true;
        let mut report = Report::new();
        report.schema(legix_core::FieldPath::root().key("code"), "Missing value");
        let mut record = Record::new();
        record.set_text("deb", "2015-01-01");

        let rendered = render_report(&report, &record, &config);
        assert!(rendered.starts_with("code: Missing value\n\n{"));
        assert!(rendered.contains("\"deb\": \"2015-01-01\""));
    }
}
