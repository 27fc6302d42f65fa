use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &[
    "raw-treeviz",
    "raw-json",
    "errors-json",
    "errors-list",
    "document-json",
    "markup",
];

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

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("legix")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for validating and converting legislation parameter files")
        .arg_required_else_help(true)
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
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .arg(input_arg("input"))
                .arg(output_arg()),
        )
        .subcommand(Command::new("validate").arg(input_arg("input")))
        .subcommand(
            Command::new("format")
                .arg(input_arg("input"))
                .arg(output_arg()),
        )
        .subcommand(
            Command::new("inspect").arg(input_arg("path")).arg(
                Arg::new("transform")
                    .help("Transform to apply. Defaults to 'raw-treeviz'")
                    .value_parser(clap::builder::PossibleValuesParser::new(
                        AVAILABLE_TRANSFORMS,
                    ))
                    .index(2)
                    .value_hint(ValueHint::Other),
            ),
        );

    generate_to(Bash, &mut cmd, "legix", &outdir)?;
    generate_to(Zsh, &mut cmd, "legix", &outdir)?;
    generate_to(Fish, &mut cmd, "legix", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
