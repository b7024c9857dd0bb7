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

use anyhow::{Context, Result};
use clap::Parser as clap_parser;
use sicxe_asm::assemble;
use sicxe_asm::diagnostics::NullSink;
use sicxe_asm::file_reader::AsmFileReader;
use sicxe_asm::options::AssemblerOptions;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(clap_parser)]
#[clap(version = "0.1.0")]
struct Opts {
    /// Path to the SIC/XE source file
    #[clap(short, long)]
    input: PathBuf,

    /// Path to write the assembled object program to
    #[clap(short, long, default_value = "object_program_output.txt")]
    output: PathBuf,

    /// Enable literal pools, program blocks and EXTDEF/EXTREF handling
    #[clap(short = 'x', long)]
    extended: bool,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    if !has_source_extension(&opts.input) {
        eprintln!(
            "warning: input file '{}' does not have a .asm or .txt extension",
            opts.input.display()
        );
    }

    let reader = AsmFileReader;
    let options = AssemblerOptions::new(opts.extended);
    let mut sink = NullSink;

    let object_program = assemble(&opts.input, options, &reader, &mut sink)
        .with_context(|| format!("failed to assemble {}", opts.input.display()))?;

    fs::write(&opts.output, object_program)
        .with_context(|| format!("failed to write object program to {}", opts.output.display()))?;

    println!(
        "Successfully assembled {} to {}",
        opts.input.display(),
        opts.output.display()
    );

    Ok(())
}

fn has_source_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("asm") | Some("txt")
    )
}
