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

//! Renders a finished `Section` as SIC/XE object program text: H, D, R,
//! T, M and E records.

use crate::errors::AssemblyError;
use crate::section::Section;
use anyhow::{Context, Result};
use std::io::Write;

const TEXT_RECORD_MAX_HEX_CHARS: usize = 60;
const GROUP_SIZE: usize = 5;

#[derive(Debug, Default)]
pub struct ObjectFileWriter;

impl ObjectFileWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_section(&self, section: &Section, out: &mut impl Write) -> Result<()> {
        self.write_header(section, out)?;
        self.write_extdef(section, out)?;
        self.write_extref(section, out)?;
        self.write_text_records(section, out)?;
        self.write_modification_records(section, out)?;
        self.write_end(section, out)?;
        Ok(())
    }

    fn write_header(&self, section: &Section, out: &mut impl Write) -> Result<()> {
        let first = section
            .instructions
            .first()
            .and_then(|i| i.location)
            .map(|l| l.address)
            .unwrap_or(0);
        let last = section
            .instructions
            .last()
            .and_then(|i| i.location)
            .map(|l| l.address)
            .unwrap_or(0);
        let name = section
            .instructions
            .first()
            .map(|i| i.symbol.as_str())
            .unwrap_or(&section.name);

        writeln!(out, "H{:<6}{:06X}{:06X}", name, first, last - first).context("writing H record")?;
        Ok(())
    }

    fn write_extdef(&self, section: &Section, out: &mut impl Write) -> Result<()> {
        if section.extdef_table.is_empty() {
            return Ok(());
        }
        let mut symbols: Vec<(&str, u32)> = section
            .extdef_table
            .values()
            .map(|s| (s.name.as_str(), s.addr.unwrap_or(0)))
            .collect();
        symbols.sort_by_key(|(name, _)| *name);

        for group in symbols.chunks(GROUP_SIZE) {
            write!(out, "D")?;
            for (name, addr) in group {
                write!(out, "{name:<6}{addr:06X}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_extref(&self, section: &Section, out: &mut impl Write) -> Result<()> {
        if section.extref_table.is_empty() {
            return Ok(());
        }
        let mut names: Vec<&str> = section.extref_table.keys().map(String::as_str).collect();
        names.sort();

        for group in names.chunks(GROUP_SIZE) {
            write!(out, "R")?;
            for name in group {
                write!(out, "{name:<6}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_text_records(&self, section: &Section, out: &mut impl Write) -> Result<()> {
        let mut current_start: Option<u32> = None;
        let mut current_text = String::new();

        for instruction in &section.instructions {
            if matches!(instruction.mnemonic.as_str(), "RESW" | "RESB" | "USE") {
                if !current_text.is_empty() {
                    self.write_single_text_record(out, current_start.unwrap(), &current_text)?;
                    current_text.clear();
                }
                continue;
            }
            if instruction.object_code.is_empty() {
                continue;
            }

            let address = instruction.location.map(|l| l.address).unwrap_or(0);
            if current_text.is_empty() {
                current_start = Some(address);
            }
            if current_text.len() + instruction.object_code.len() > TEXT_RECORD_MAX_HEX_CHARS {
                self.write_single_text_record(out, current_start.unwrap(), &current_text)?;
                current_text.clear();
                current_start = Some(address);
            }
            current_text.push_str(&instruction.object_code);
        }

        if !current_text.is_empty() {
            self.write_single_text_record(out, current_start.unwrap(), &current_text)?;
        }

        Ok(())
    }

    fn write_single_text_record(&self, out: &mut impl Write, start: u32, text: &str) -> Result<()> {
        writeln!(out, "T{:06X}{:02X}{}", start, text.len() / 2, text).context("writing T record")?;
        Ok(())
    }

    fn write_modification_records(&self, section: &Section, out: &mut impl Write) -> Result<()> {
        if section.modification_records.is_empty() {
            return Ok(());
        }
        let mut sorted = section.modification_records.clone();
        sorted.sort_by_key(|r| r.location);
        for record in &sorted {
            writeln!(
                out,
                "M{:06X}{:02X}{}{}",
                record.location, record.length_nibbles, record.sign, record.reference
            )
            .context("writing M record")?;
        }
        Ok(())
    }

    fn write_end(&self, section: &Section, out: &mut impl Write) -> Result<()> {
        write!(out, "E")?;
        if let Some(last) = section.instructions.last() {
            if last.mnemonic == "END" && !last.operand.is_empty() {
                let entry = section.symbol_table.get(&last.operand).ok_or_else(|| {
                    AssemblyError::MissingSymbol {
                        section: section.name.clone(),
                        symbol: last.operand.clone(),
                    }
                })?;
                write!(out, "{:06X}", entry.addr.unwrap_or(0))?;
            }
        }
        writeln!(out)?;
        writeln!(out)?;
        Ok(())
    }
}
