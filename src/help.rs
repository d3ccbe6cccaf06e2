use std::ffi::OsStr;

use current_platform::CURRENT_PLATFORM;
use strum::VariantArray;

use crate::{args::Arg, filter::Filter, script::Command};

pub fn maybe_print_help_and_exit(bin_name: &str) {
    match std::env::args_os().nth(1) {
        None => print_help_and_exit(bin_name),
        Some(arg) => {
            let arg = arg.as_os_str();
            if arg == OsStr::new("--help") || arg == OsStr::new("-help") {
                print_help_and_exit(bin_name)
            }
            if arg == OsStr::new("--version") || arg == OsStr::new("-version") {
                println!("{}", version_string());
                std::process::exit(0);
            }
        }
    }
}

fn print_help_and_exit(bin_name: &str) -> ! {
    print_help(bin_name);
    std::process::exit(0);
}

fn print_help(bin_name: &str) {
    println!("Version: {}", version_string());
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
    println!("Usage: {bin_name} [options ...] input [options ...] output.png");
    println!();
    println!("Options:");
    for arg in Arg::VARIANTS {
        let name: &'static str = arg.into();
        println!("  -{name:19} {}", arg.help_text());
    }
    println!();
    println!("Script commands (one per line, # starts a comment):");
    for command in Command::VARIANTS {
        let name: &'static str = command.into();
        println!("  {name:7} {}", command.help_text());
    }
    println!();
    let filters: Vec<&'static str> = Filter::VARIANTS.iter().map(|f| f.into()).collect();
    println!("Filters: {}", filters.join(", "));
    println!();
    println!("Set RUST_LOG=debug to trace the session.");
}

fn version_string() -> String {
    let cpu = CURRENT_PLATFORM.split('-').next().unwrap_or("unknown");
    format!("cropkit {} {cpu}", env!("CARGO_PKG_VERSION"))
}
