use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

mod compare;
mod config;

use config::ExperimentConfig;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("FERROCLASS_LOG", "info"))
        .init();

    let matches = Command::new("ferroclass")
        .version(clap::crate_version!())
        .about("Train and compare classical classifiers with cross-validation")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("compare")
                .about("Cross-validate every configured model on the synthetic energy dataset")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a JSON experiment configuration. Defaults are used when omitted.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("samples")
                        .short('n')
                        .long("samples")
                        .help("Number of samples to generate. Overrides the configuration file.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("features")
                        .short('f')
                        .long("features")
                        .help("Number of features (at least 3). Overrides the configuration file.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("folds")
                        .short('k')
                        .long("folds")
                        .help("Number of cross-validation folds. Overrides the configuration file.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .short('s')
                        .long("seed")
                        .help("Seed for data generation and fold shuffling.")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .help("Evaluate folds in parallel.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("compare", sub_m)) => handle_compare(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_compare(matches: &ArgMatches) -> Result<()> {
    let config = ExperimentConfig::from_arguments(matches)?;
    log::info!(
        "Comparing {} models with {}-fold cross-validation",
        config.models.len(),
        config.cross_validation.n_folds
    );
    match compare::run_comparison(&config) {
        Ok(summaries) => {
            compare::print_ranking(&summaries);
            Ok(())
        }
        Err(e) => {
            log::error!("Comparison failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
