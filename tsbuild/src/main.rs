#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

mod args;
mod options;

use std::env;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use log::{debug, error, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::args::*;
use crate::options::*;

fn configure_logging(args: &TsBuildArgs) {
    if let Some(logging_config) = &args.logging_config {
        match log4rs::init_file(logging_config, Default::default()) {
            Ok(_) => return,
            Err(e) => println!(
                "ERROR: failed to configure logging using {} with {:?}. Continuing with console logging.",
                logging_config, e
            ),
        }
    }

    // if there's no config, prepare one using stdout
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .build();
    match Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
    {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                println!(
                    "ERROR: failed to configure logging for stdout with {:?}. Continuing without logging.",
                    e
                );
            }
        }
        Err(e) => {
            println!("ERROR: failed to prepare default logging configuration with {:?}. Continuing without logging", e);
        }
    }
}

/// Point of entry for tsbuild application.
fn main() -> ExitCode {
    // with no parameters, display help rather than acting on defaults
    if 1 == env::args_os().len() {
        let mut a = TsBuildArgs::command();
        if let Err(_e) = a.print_help() {
            println!("Error printing help. Try again with -h parameter.")
        }
        return ExitCode::SUCCESS;
    }
    let args = TsBuildArgs::parse();
    configure_logging(&args);
    debug!("tsbuild start");

    let r = options(&args);

    debug!("tsbuild end");
    match r {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            error!("tsbuild failed");
            ExitCode::FAILURE
        }
    }
}
