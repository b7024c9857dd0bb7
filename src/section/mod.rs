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

//! A single control section: its instructions, symbol table, literal
//! pool and the two passes that turn them into object code.

mod address;
mod program_block;

use crate::ast::{Instruction, ModificationRecord, SymbolTable};
use crate::diagnostics::{
    DiagnosticEvent, DiagnosticSink, InstructionEntry, ModificationRecordEntry, SymbolTableEntry,
};
use crate::errors::AssemblyError;
use crate::expr::{self, ExternalRef};
use crate::literal::LiteralManager;
use crate::options::AssemblerOptions;
use crate::{encoder, tables};

pub struct Section {
    pub name: String,
    pub instructions: Vec<Instruction>,
    pub symbol_table: SymbolTable,
    pub extdef_table: SymbolTable,
    pub extref_table: SymbolTable,
    pub modification_records: Vec<ModificationRecord>,
    pub literal_pool: LiteralManager,
    pub current_location: u32,
    pub base_register_value: Option<u32>,
}

impl Section {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            instructions: Vec::new(),
            symbol_table: SymbolTable::new(),
            extdef_table: SymbolTable::new(),
            extref_table: SymbolTable::new(),
            modification_records: Vec::new(),
            literal_pool: LiteralManager::new(),
            current_location: 0,
            base_register_value: None,
        }
    }

    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn has_end(&self) -> bool {
        self.instructions.iter().any(|i| i.mnemonic == "END")
    }

    fn add_modification_record(&mut self, record: ModificationRecord) {
        self.modification_records.push(record);
    }

    /// Emits a modification record for every EXTREF symbol `refs`
    /// reports, deduplicating against records already recorded for the
    /// same location and reference.
    fn record_external_references(&mut self, refs: &[ExternalRef], mnemonic: &str, location: u32) {
        let (record_location, length) = if mnemonic == "WORD" {
            (location, 6)
        } else {
            (location + 1, 5)
        };
        for reference in refs {
            let exists = self
                .modification_records
                .iter()
                .any(|m| m.location == record_location && m.reference == reference.name);
            if !exists {
                self.add_modification_record(ModificationRecord {
                    location: record_location,
                    length_nibbles: length,
                    sign: reference.sign,
                    reference: reference.name.clone(),
                });
            }
        }
    }

    /// Evaluates an operand expression at `self.current_location`,
    /// recording any external references it mentions along the way.
    fn evaluate_operand(&mut self, operand: &str, mnemonic: &str) -> i64 {
        let outcome = expr::evaluate(operand, self.current_location, &self.symbol_table, &self.extref_table);
        let location = self.current_location;
        self.record_external_references(&outcome.external_refs, mnemonic, location);
        outcome.value
    }

    /// Same as `evaluate_operand` but against an explicit location,
    /// used by `generate_object_code` where the section's running
    /// location counter has already moved past the instruction.
    fn record_modification_at(&mut self, operand: &str, mnemonic: &str, location: u32) {
        let outcome = expr::evaluate(operand, location, &self.symbol_table, &self.extref_table);
        self.record_external_references(&outcome.external_refs, mnemonic, location);
    }

    /// Evaluates an operand against a specific location rather than the
    /// running counter. Used by the `WORD` encoder in Pass 2, after the
    /// counter has moved on.
    pub(crate) fn evaluate_operand_at(&mut self, operand: &str, mnemonic: &str, location: u32) -> i64 {
        let outcome = expr::evaluate(operand, location, &self.symbol_table, &self.extref_table);
        self.record_external_references(&outcome.external_refs, mnemonic, location);
        outcome.value
    }

    /// Advances `current_location` past instruction `i`, validating
    /// `RESW`/`RESB`/`BYTE` reservations along the way.
    fn update_location_counter(&mut self, i: usize) -> Result<(), AssemblyError> {
        let index = self.instructions[i].index as usize;
        let mnemonic = self.instructions[i].mnemonic.clone();
        let operand = self.instructions[i].operand.clone();
        let format_type = self.instructions[i].format_type;

        match mnemonic.as_str() {
            "RESW" => {
                let result = self.evaluate_operand(&operand, &mnemonic);
                if result != 0 {
                    if result < 0 {
                        return Err(AssemblyError::NegativeReservation {
                            index,
                            directive: "RESW".to_string(),
                            value: result,
                        });
                    }
                    self.current_location += 3 * result as u32;
                }
            }
            "RESB" => {
                let result = self.evaluate_operand(&operand, &mnemonic);
                if result != 0 {
                    if result < 0 {
                        return Err(AssemblyError::NegativeReservation {
                            index,
                            directive: "RESB".to_string(),
                            value: result,
                        });
                    }
                    self.current_location += result as u32;
                }
            }
            "BYTE" => {
                self.current_location += byte_constant_length(&operand, index)?;
            }
            "WORD" => {
                let result = self.evaluate_operand(&operand, &mnemonic);
                if result != 0 {
                    let symbol = self.instructions[i].symbol.clone();
                    if let Some(entry) = self.symbol_table.get_mut(&symbol) {
                        entry.addr = Some(self.current_location);
                    }
                }
                self.current_location += 3;
            }
            "RSUB" => {
                self.current_location += 3;
            }
            "ORG" => {
                let result = self.evaluate_operand(&operand, &mnemonic);
                if result != 0 {
                    self.current_location = result as u32;
                }
            }
            _ => {
                if format_type > 0 {
                    self.current_location += format_type as u32;
                }
            }
        }

        Ok(())
    }

    /// Interns `=...` literal operands and expands the pending literal
    /// pool into synthetic `BYTE` instructions at every `LTORG`/`END`.
    fn process_literal_pool(&mut self) -> Result<(), AssemblyError> {
        let mut i = 0;
        while i < self.instructions.len() {
            let index = self.instructions[i].index as usize;
            let mnemonic = self.instructions[i].mnemonic.clone();
            let operand = self.instructions[i].operand.clone();

            if !operand.is_empty() && mnemonic != "LTORG" && mnemonic != "END" {
                if mnemonic == "*" {
                    self.instructions[i].mnemonic = "BYTE".to_string();
                }
                if operand.starts_with('=') {
                    let replacement =
                        self.literal_pool
                            .add_literal(&operand)
                            .map_err(|reason| AssemblyError::InvalidLiteralFormat { index, reason })?;
                    self.instructions[i].operand = replacement;
                }
            } else if mnemonic == "LTORG" || mnemonic == "END" {
                let literals = self.literal_pool.current_literals().to_vec();
                for literal in literals.into_iter().rev() {
                    let literal_instruction =
                        Instruction::new(i as u32, 0, &literal.name, "BYTE", &literal.data);
                    self.instructions.insert(i, literal_instruction);
                    for later in &mut self.instructions[i + 1..] {
                        later.index += 1;
                    }
                }
                self.literal_pool.clear_table();
            }
            i += 1;
        }
        Ok(())
    }

    fn set_external_definition_location(&mut self) -> Result<(), AssemblyError> {
        let names: Vec<String> = self.extdef_table.keys().cloned().collect();
        for name in names {
            let addr = self
                .symbol_table
                .get(&name)
                .ok_or_else(|| AssemblyError::UndefinedExternalDefinition {
                    section: self.name.clone(),
                    symbol: name.clone(),
                })?
                .addr;
            self.extdef_table.get_mut(&name).unwrap().addr = addr;
        }
        Ok(())
    }

    fn reorder_index(&mut self) {
        self.instructions.sort_by_key(|i| i.index);
    }

    fn generate_object_code(&mut self, options: &AssemblerOptions) {
        let mut base_value: i64 = 0;

        for i in 0..self.instructions.len() {
            let mnemonic = self.instructions[i].mnemonic.clone();
            let operand = self.instructions[i].operand.clone();

            if mnemonic == "BASE" {
                base_value = self.evaluate_operand(&operand, &mnemonic);
                continue;
            }

            // Pre-resolving EXTREF modification records and stripping a
            // trailing ",X" suffix off the operand only makes sense once
            // EXTREF/program-block support is in play; with it off, the
            // encoder detects indexing straight off the raw operand.
            if options.extended_mode && operand != "*" {
                let location = self.instructions[i].location.map(|l| l.address);
                if mnemonic == "WORD" {
                    if let Some(loc) = location {
                        self.record_modification_at(&operand, &mnemonic, loc);
                    }
                } else if tables::lookup_opcode(&mnemonic).is_some() {
                    let format_type = self.instructions[i].format_type;
                    if format_type == 3 || format_type == 4 {
                        let (indexed, base_operand) = split_indexed_operand(&operand);
                        self.instructions[i].indexed = indexed;
                        self.instructions[i].operand = base_operand.clone();
                        let addressed = base_operand
                            .strip_prefix(['#', '@'])
                            .unwrap_or(&base_operand)
                            .to_string();
                        if let Some(loc) = location {
                            self.record_modification_at(&addressed, &mnemonic, loc);
                        }
                    }
                }
            }

            let location = match self.instructions[i].location {
                Some(l) => l,
                None => continue,
            };
            let result = encoder::generate_object_code(self, i, location, base_value);
            match result {
                Ok(code) => self.instructions[i].object_code = code,
                Err(_) => self.instructions[i].object_code = String::new(),
            }
        }
    }

    pub fn pass1(
        &mut self,
        options: &AssemblerOptions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), AssemblyError> {
        if options.extended_mode {
            self.process_literal_pool()?;
            sink.emit(&self.name, DiagnosticEvent::LiteralTable(self.literal_table_snapshot()));

            self.process_program_block()?;
        }

        self.process_symbol()?;
        sink.emit(&self.name, DiagnosticEvent::SymbolTable(self.symbol_table_snapshot(&self.symbol_table)));

        self.calculate_address()?;

        if options.extended_mode {
            self.set_external_definition_location()?;
            sink.emit(
                &self.name,
                DiagnosticEvent::ExternalReferences(self.symbol_table_snapshot(&self.extref_table)),
            );
            sink.emit(
                &self.name,
                DiagnosticEvent::ExternalDefinitions(self.symbol_table_snapshot(&self.extdef_table)),
            );
        }

        Ok(())
    }

    pub fn pass2(
        &mut self,
        options: &AssemblerOptions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), AssemblyError> {
        if options.extended_mode {
            self.reorder_index();
        }

        self.generate_object_code(options);
        sink.emit(&self.name, DiagnosticEvent::ModificationRecords(self.modification_record_snapshot()));
        sink.emit(&self.name, DiagnosticEvent::Instructions(self.instruction_snapshot()));

        Ok(())
    }

    fn literal_table_snapshot(&self) -> Vec<crate::diagnostics::LiteralTableEntry> {
        self.literal_pool
            .current_literals()
            .iter()
            .map(|l| crate::diagnostics::LiteralTableEntry {
                name: l.name.clone(),
                data: l.data.clone(),
                used_count: l.used_count,
            })
            .collect()
    }

    fn symbol_table_snapshot(&self, table: &SymbolTable) -> Vec<SymbolTableEntry> {
        let mut entries: Vec<SymbolTableEntry> = table
            .values()
            .map(|s| SymbolTableEntry {
                name: s.name.clone(),
                address: s.addr,
                external: s.is_external,
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn modification_record_snapshot(&self) -> Vec<ModificationRecordEntry> {
        self.modification_records
            .iter()
            .map(|m| ModificationRecordEntry {
                location: m.location,
                length_nibbles: m.length_nibbles,
                sign: m.sign,
                reference: m.reference.clone(),
            })
            .collect()
    }

    fn instruction_snapshot(&self) -> Vec<InstructionEntry> {
        self.instructions
            .iter()
            .map(|i| InstructionEntry {
                index: i.index,
                address: i.location.map(|l| l.address),
                mnemonic: i.mnemonic.clone(),
                operand: i.operand.clone(),
                object_code: i.object_code.clone(),
            })
            .collect()
    }
}

/// Splits `operand` on a trailing `,X` indexed-addressing suffix,
/// returning whether indexing applies and the operand with the suffix
/// removed. Replaces the original assembler's `mnemonic||operand`-keyed
/// `x_directive_mode` map with a field set directly on the instruction.
fn split_indexed_operand(operand: &str) -> (bool, String) {
    match operand.rsplit_once(',') {
        Some((base, index)) if index.eq_ignore_ascii_case("x") => (true, base.to_string()),
        _ => (false, operand.to_string()),
    }
}

fn byte_constant_length(operand: &str, index: usize) -> Result<u32, AssemblyError> {
    let invalid = |reason: String| AssemblyError::InvalidByteConstant { index, reason };

    if operand.starts_with(['C', 'c']) {
        if !((operand.starts_with("C'") || operand.starts_with("c'")) && operand.ends_with('\'')) {
            return Err(invalid(format!("malformed character constant '{operand}'")));
        }
        let content = &operand[2..operand.len() - 1];
        Ok(content.chars().count() as u32)
    } else if operand.starts_with(['X', 'x']) {
        if !((operand.starts_with("X'") || operand.starts_with("x'")) && operand.ends_with('\'')) {
            return Err(invalid(format!("malformed hexadecimal constant '{operand}'")));
        }
        let hex_content = &operand[2..operand.len() - 1];
        if !hex_content.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid(format!("invalid hexadecimal value '{hex_content}'")));
        }
        if hex_content.len() % 2 != 0 {
            return Err(invalid(format!("odd-length hex constant '{hex_content}'")));
        }
        Ok((hex_content.len() / 2) as u32)
    } else {
        Err(invalid(format!("unrecognized BYTE constant type '{operand}'")))
    }
}
