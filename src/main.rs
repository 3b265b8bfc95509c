use clap::{Arg, ArgAction, Command};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use edify::analysis::Analyzer;
use edify::loading;
use edify::problem::{concise_warning, full_warning, Diagnostic};

fn main() -> ExitCode {
    const VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("edify")
        .version(VERSION)
        .propagate_version(true)
        .about("A consistency checker for specification pseudocode.")
        .disable_help_subcommand(true)
        .subcommand(
            Command::new("check")
                .about("Check the algorithms in the given document against its declared signatures")
                .arg(
                    Arg::new("concise")
                        .long("concise")
                        .action(ArgAction::SetTrue)
                        .help("Report each finding on a single line, without source context."),
                )
                .arg(
                    Arg::new("filename")
                        .required(true)
                        .help("The document whose algorithms you want to check."),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("check", submatches)) => {
            let concise = submatches.get_flag("concise");
            let Some(filename) = submatches.get_one::<String>("filename") else {
                return ExitCode::FAILURE;
            };
            check(Path::new(filename), concise)
        }
        _ => {
            println!("usage: edify [COMMAND] ...");
            println!("Try '--help' for more information.");
            ExitCode::FAILURE
        }
    }
}

fn check(filename: &Path, concise: bool) -> ExitCode {
    let source = match loading::load(filename) {
        Ok(source) => source,
        Err(failure) => {
            eprintln!("error: {}: {}", filename.display(), failure);
            return ExitCode::FAILURE;
        }
    };

    let outlined = loading::outline(&source);
    debug!("outlined {}", filename.display());

    let mut found: Vec<Diagnostic> = outlined.problems;
    let mut analyzer = Analyzer::new(&outlined.biblio);
    for algorithm in &outlined.algorithms {
        analyzer.check_algorithm(algorithm, &mut found);
    }
    analyzer.finish(&mut found);

    for diagnostic in &found {
        if concise {
            println!("{}", concise_warning(diagnostic, filename, &source));
        } else {
            println!("{}", full_warning(diagnostic, filename, &source));
            println!();
        }
    }

    if found.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
