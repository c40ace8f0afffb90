/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use z80asm::file_reader::AsmFileReader;
use z80asm::printer::PrintOptions;

#[derive(Parser)]
#[clap(version, author = "Connor Nolan")]
struct Opts {
    /// Source files to assemble; each is assembled and listed independently.
    #[clap(required = true)]
    input: Vec<PathBuf>,

    /// Write the flat binary image here. Only valid with a single input.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Render label/constant references as their resolved values.
    #[clap(long)]
    replace_names: bool,

    /// Render string/char literals as their byte values instead of quoted text.
    #[clap(long)]
    interpret_literals: bool,

    /// Suppress the listing; print only diagnostics.
    #[clap(short, long)]
    quiet: bool,

    /// Raise log verbosity. Repeatable (-v, -vv, -vvv).
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn verbosity_filter(level: u8) -> log::LevelFilter {
    match level {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn main() -> ExitCode {
    let opts = Opts::parse();

    env_logger::Builder::new().filter_level(verbosity_filter(opts.verbose)).parse_default_env().init();

    if opts.output.is_some() && opts.input.len() > 1 {
        eprintln!("error: --output is only valid with a single input file");
        return ExitCode::FAILURE;
    }

    let reader = AsmFileReader;
    let print_opts = PrintOptions { replace_names: opts.replace_names, interpret_literals: opts.interpret_literals };

    let mut had_error = false;
    for path in &opts.input {
        match assemble_one(&reader, path, &opts, print_opts) {
            Ok(()) => {}
            Err(err) => {
                eprintln!("{err:#}");
                had_error = true;
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn assemble_one(reader: &AsmFileReader, path: &std::path::Path, opts: &Opts, print_opts: PrintOptions) -> Result<()> {
    let program = z80asm::assemble(reader, path).with_context(|| format!("failed to assemble {}", path.display()))?;

    if !opts.quiet {
        print!("{}", z80asm::print(&program, print_opts));
    }

    if let Some(output) = &opts.output {
        let image = z80asm::emit(&program);
        fs::write(output, image).with_context(|| format!("failed to write output file: {}", output.display()))?;
    }

    Ok(())
}
