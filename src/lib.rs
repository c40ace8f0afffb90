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

pub mod ast;
pub mod compiler;
pub mod emulator;
pub mod encoder;
pub mod errors;
pub mod file_reader;
pub mod instruction_table;
pub mod layouter;
pub mod parser;
pub mod printer;

use std::path::Path;

use anyhow::{Context, Result};

use ast::Program;
use file_reader::FileReader;
use printer::PrintOptions;

/// The full pipeline — parse, lay out, compile — stopping at the first
/// stage that reports an error. Each stage's composite `ErrorList` is
/// wrapped with `anyhow::Context` naming the stage, matching §7's
/// "between passes, an error stops the pipeline" rule.
pub fn assemble<F: FileReader>(reader: &F, path: &Path) -> Result<Program> {
    let mut program =
        parser::parse_file(reader, path).map_err(anyhow::Error::from).context("failed during parsing")?;
    layouter::layout(&mut program).map_err(anyhow::Error::from).context("failed during layout")?;
    compiler::compile(&mut program).map_err(anyhow::Error::from).context("failed during compilation")?;
    Ok(program)
}

/// Same pipeline, from an in-memory source string. `filename` is used only
/// for diagnostics.
pub fn assemble_str(source: &str, filename: &str) -> Result<Program> {
    let mut program =
        parser::parse_str(source, filename).map_err(anyhow::Error::from).context("failed during parsing")?;
    layouter::layout(&mut program).map_err(anyhow::Error::from).context("failed during layout")?;
    compiler::compile(&mut program).map_err(anyhow::Error::from).context("failed during compilation")?;
    Ok(program)
}

/// Flatten an assembled program into its binary image.
pub fn emit(program: &Program) -> Vec<u8> {
    compiler::emit(program)
}

/// Render an assembled program as a listing.
pub fn print(program: &Program, opts: PrintOptions) -> String {
    printer::print_program(program, opts)
}
