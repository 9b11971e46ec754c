use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    ArgMatches, Command,
};
use colored::Colorize;
use plantree::{api, config::Settings};
use std::path::{Path, PathBuf};

// The CLI layer should only parse inputs and forward them to library code.
fn main() {
    let matches = Command::new(crate_name!())
        .about(crate_description!())
        .author(crate_authors!())
        .version(crate_version!())
        .arg(
            Arg::new("diagrams")
                .help(".sm file(s) containing directory structure diagrams")
                .value_parser(value_parser!(PathBuf))
                .num_args(1..)
                .required(true),
        )
        .arg(
            Arg::new("output")
                .help("Base directory where the structure is created (default: current directory)")
                .short('o')
                .long("output")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print every operation, including skipped paths")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Only show what would be created without creating anything")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .help("Truncate existing files (default: skip existing files)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("confirm")
                .long("confirm")
                .help("Preview the structure and ask before writing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML file with default settings")
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches();

    let is_verbose = matches.get_flag("verbose");

    let default_filter = if is_verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let settings = match load_settings(&matches) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("{:?}", miette::Report::new(error));
            std::process::exit(1);
        }
    };

    let diagrams: Vec<&PathBuf> = matches
        .get_many::<PathBuf>("diagrams")
        .expect("diagrams required")
        .collect();

    let succeeded = diagrams
        .iter()
        .filter(|diagram| handle_diagram(diagram, &settings))
        .count();

    println!("\n{}", "=".repeat(60));
    println!(
        "Processed {}/{} file(s) successfully",
        succeeded,
        diagrams.len()
    );

    if succeeded < diagrams.len() {
        std::process::exit(1);
    }
}

fn load_settings(matches: &ArgMatches) -> Result<Settings, plantree::config::ConfigError> {
    let mut settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    if let Some(output) = matches.get_one::<PathBuf>("output") {
        settings.output = Some(output.clone());
    }

    settings.verbose |= matches.get_flag("verbose");
    settings.dry_run |= matches.get_flag("dry-run");
    settings.overwrite |= matches.get_flag("overwrite");
    settings.confirm |= matches.get_flag("confirm");

    log::debug!("settings: {:?}", settings);

    Ok(settings)
}

fn handle_diagram(diagram: &Path, settings: &Settings) -> bool {
    println!("\n{}", "=".repeat(60));
    println!("Processing: {}", diagram.display().to_string().bold());
    println!("{}", "=".repeat(60));

    match api::plant(diagram, settings) {
        Ok(outcome) => outcome.is_success(),
        Err(error) => {
            eprintln!("{:?}", miette::Report::new(error));
            false
        }
    }
}
