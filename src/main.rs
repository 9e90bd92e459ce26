#![allow(clippy::uninlined_format_args)]

mod args;
mod commands;
mod constants;
mod error;
mod fs;
mod hashing;
mod http;
mod object;
mod pack;
mod pkt;
mod utils;

use clap::Parser;
use colored::Colorize;

pub use constants::*;
pub use error::{Error, Result};

fn main() {
    env_logger::init();
    let args = args::Args::parse();

    match commands::execute_command(&args.command) {
        Ok(message) => {
            if !message.is_empty() {
                println!("{}", message)
            }
        }
        Err(error) => {
            eprintln!("{} {:#}", "error:".red().bold(), error);
            std::process::exit(1);
        }
    }
}
