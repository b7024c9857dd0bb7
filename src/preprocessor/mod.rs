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

//! Tokenizes source text into instructions and partitions them into
//! sections at `START`/`CSECT` boundaries.

use crate::ast::Instruction;
use crate::errors::AssemblyError;
use crate::section::Section;
use crate::tables;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "./preprocessor/grammar.pest"]
struct LineParser;

fn build_instruction(
    index: u32,
    symbol: &str,
    mnemonic: &str,
    operand: &str,
) -> Result<Instruction, AssemblyError> {
    let mut format_type = 0u8;
    let mut symbol = symbol.to_string();
    let mut mnemonic = mnemonic.to_string();
    let mut operand = operand.to_string();

    if symbol.contains('+') {
        format_type = 4;
        symbol = symbol.replace('+', "");
    } else if mnemonic.contains('+') {
        format_type = 4;
        mnemonic = mnemonic.replace('+', "");
    }

    // No label present: the symbol slot actually holds the mnemonic.
    if tables::lookup_opcode(&symbol).is_some() || tables::is_directive(&symbol) || symbol == "*" {
        operand = mnemonic;
        mnemonic = symbol;
        symbol = String::new();
    }

    // A label collides with a reserved mnemonic/directive name; keep it
    // but mark it so later lookups can't mistake it for the real thing.
    if tables::lookup_opcode(&symbol).is_some() || tables::is_directive(&symbol) {
        symbol = format!("WRONG_SYMBOL_NAME_{symbol}");
    }

    if tables::lookup_opcode(&mnemonic).is_none() && !tables::is_directive(&mnemonic) {
        return Err(AssemblyError::InvalidMnemonic {
            index: index as usize,
            mnemonic,
        });
    }

    if format_type != 4 {
        if let Some(entry) = tables::lookup_opcode(&mnemonic) {
            format_type = entry.format;
        }
    }

    Ok(Instruction::new(index, format_type, &symbol, &mnemonic, &operand))
}

/// Tokenizes `source` and groups the resulting instructions into
/// sections. The first section is always named `"DEFAULT"` and holds
/// everything up to the first `CSECT`; a missing `END` is synthesized
/// with a sentinel index rather than treated as an error.
pub fn process(source: &str) -> Result<Vec<Section>, AssemblyError> {
    let mut parsed = LineParser::parse(Rule::program, source)?;
    let program = parsed.next().expect("program rule always produces one pair");

    let mut instructions = Vec::new();
    let mut index: u32 = 0;

    for line_pair in program.into_inner() {
        if line_pair.as_rule() != Rule::content_line {
            continue;
        }

        let fields: Vec<String> = line_pair
            .into_inner()
            .filter(|p| p.as_rule() == Rule::field)
            .map(|p| p.as_str().to_string())
            .collect();
        if fields.is_empty() {
            continue;
        }

        let symbol = fields.first().cloned().unwrap_or_default();
        let mnemonic = fields.get(1).cloned().unwrap_or_default();
        let mut operand = fields.get(2).cloned().unwrap_or_default();
        if mnemonic == "BYTE" && fields.len() > 3 {
            operand = fields[2..].join(" ");
        }

        instructions.push(build_instruction(index, &symbol, &mnemonic, &operand)?);
        index += 1;
    }

    Ok(partition_sections(instructions))
}

fn partition_sections(instructions: Vec<Instruction>) -> Vec<Section> {
    let mut sections = vec![Section::new("DEFAULT")];

    for instruction in instructions {
        if instruction.mnemonic == "END" {
            sections[0].add_instruction(instruction);
            break;
        }
        if instruction.mnemonic == "CSECT" {
            sections.push(Section::new(&instruction.symbol));
        }
        sections.last_mut().unwrap().add_instruction(instruction);
    }

    for section in &mut sections {
        if !section.has_end() {
            section.add_instruction(Instruction::new(u32::MAX, 0, "", "END", ""));
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_label_mnemonic_operand() {
        let sections = process("COPY START 0\nFIRST STL RETADR\nEND FIRST\n").unwrap();
        assert_eq!(sections.len(), 1);
        let instrs = &sections[0].instructions;
        assert_eq!(instrs[0].symbol, "COPY");
        assert_eq!(instrs[0].mnemonic, "START");
        assert_eq!(instrs[1].mnemonic, "STL");
        assert_eq!(instrs[1].operand, "RETADR");
    }

    #[test]
    fn shifts_label_slot_when_no_label_present() {
        let sections = process("RSUB\nEND\n").unwrap();
        let instr = &sections[0].instructions[0];
        assert_eq!(instr.symbol, "");
        assert_eq!(instr.mnemonic, "RSUB");
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        let err = process("BOGUS 1\nEND\n").unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidMnemonic { .. }));
    }

    #[test]
    fn synthesizes_missing_end() {
        let sections = process("COPY START 0\n").unwrap();
        assert!(sections[0].has_end());
    }

    #[test]
    fn skips_comment_and_blank_lines() {
        let sections = process(". full line comment\n\nCOPY START 0 . trailing comment\nEND\n").unwrap();
        assert_eq!(sections[0].instructions[0].symbol, "COPY");
    }

    #[test]
    fn splits_multiple_sections_at_csect() {
        let sections = process("COPY START 0\nALPHA CSECT\nEND\n").unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].name, "ALPHA");
    }

    #[test]
    fn quoted_byte_operand_keeps_embedded_characters() {
        let sections = process("EOF BYTE C'EOF'\nEND\n").unwrap();
        assert_eq!(sections[0].instructions[0].operand, "C'EOF'");
    }
}
