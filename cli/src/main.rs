mod commands;

use std::path::PathBuf;

use clap::{value_parser, Arg, Command};
use log::error;
use stack_templator::StackTemplate;

use commands::{handle_generate, handle_list, handle_validate, OutputFormat};

fn template_command(template: StackTemplate) -> Command {
    Command::new(template.name())
        .about(template.description())
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Serialization of the template")
                .value_parser(["json", "yaml"])
                .default_value("json"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("File to write the template to instead of stdout")
                .value_parser(value_parser!(PathBuf)),
        )
}

fn cli() -> Command {
    let command = Command::new("templator")
        .version(clap::crate_version!())
        .about("Generates the CloudFormation templates of the game server stacks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List the templates that can be generated"))
        .subcommand(
            Command::new("validate")
                .about("Check that every reference in a rendered template resolves")
                .arg(
                    Arg::new("file")
                        .help("Rendered template, e.g. base-infrastructure.json")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        );

    StackTemplate::ALL
        .into_iter()
        .fold(command, |command, template| {
            command.subcommand(template_command(template))
        })
}

fn main() {
    if let Err(e) = stack_utils::setup_logging() {
        eprintln!("Failed to set up logging: {}", e);
    }

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("list", _)) => handle_list(),
        Some(("validate", run_matches)) => {
            let file = run_matches
                .get_one::<PathBuf>("file")
                .expect("file is a required argument");
            handle_validate(file);
        }
        Some((name, run_matches)) => {
            let template = match name.parse::<StackTemplate>() {
                Ok(template) => template,
                Err(e) => {
                    error!("{}", e);
                    std::process::exit(1);
                }
            };
            let format = match run_matches.get_one::<String>("format").map(String::as_str) {
                Some("yaml") => OutputFormat::Yaml,
                _ => OutputFormat::Json,
            };
            let output = run_matches.get_one::<PathBuf>("output");
            handle_generate(template, format, output.map(PathBuf::as_path));
        }
        None => {
            error!("No command given");
            std::process::exit(1);
        }
    }
}
