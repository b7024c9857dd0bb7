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
pub mod diagnostics;
pub mod encoder;
pub mod errors;
pub mod expr;
pub mod file_reader;
pub mod literal;
pub mod options;
pub mod preprocessor;
pub mod section;
pub mod tables;
pub mod writer;

use anyhow::{Context, Result};
use diagnostics::DiagnosticSink;
use file_reader::FileReader;
use options::AssemblerOptions;
use std::path::Path;
use writer::ObjectFileWriter;

extern crate pest;
extern crate pest_derive;

/// Assembles the source file at `source_path` into SIC/XE object
/// program text: one H/D/R/T/M/E group per control section, separated
/// by a blank line.
pub fn assemble<F: FileReader>(
    source_path: &Path,
    options: AssemblerOptions,
    reader: &F,
    sink: &mut dyn DiagnosticSink,
) -> Result<String> {
    let source = reader
        .read_to_string(source_path)
        .with_context(|| format!("failed to read input file {}", source_path.display()))?;

    let mut sections =
        preprocessor::process(&source).context("failed during preprocessing stage")?;

    for section in &mut sections {
        section
            .pass1(&options, sink)
            .with_context(|| format!("failed during pass 1 of section '{}'", section.name))?;
        section
            .pass2(&options, sink)
            .with_context(|| format!("failed during pass 2 of section '{}'", section.name))?;
    }

    let writer = ObjectFileWriter::new();
    let mut output: Vec<u8> = Vec::new();
    for section in &sections {
        writer
            .write_section(section, &mut output)
            .with_context(|| format!("failed writing object code for section '{}'", section.name))?;
        output.push(b'\n');
    }

    String::from_utf8(output).context("object program output was not valid UTF-8")
}
