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

//! Symbol table construction and the two location-counter walks that
//! depend on it.

use super::Section;
use crate::ast::{Location, Symbol};
use crate::errors::AssemblyError;

impl Section {
    /// Seeds the symbol/EXTDEF/EXTREF tables from every labeled
    /// instruction, then resolves every symbol's address by repeatedly
    /// walking the instruction stream. A symbol's address may depend on
    /// one defined later in program order (e.g. a backward `EQU`
    /// referencing a forward label through an intervening `ORG`), so
    /// the walk repeats until nothing is left unresolved.
    ///
    /// Bounded at `symbol_table.len() + 1` iterations: a converging
    /// table resolves at least one more symbol per pass, so it cannot
    /// need more passes than it has symbols. Failing to converge within
    /// that bound means the table never will.
    pub(super) fn process_symbol(&mut self) -> Result<(), AssemblyError> {
        for instruction in &self.instructions {
            if !instruction.symbol.is_empty() {
                self.symbol_table
                    .entry(instruction.symbol.clone())
                    .or_insert_with(|| Symbol::defined(instruction.symbol.clone()));
            }
            match instruction.mnemonic.as_str() {
                "EXTDEF" => {
                    for name in split_symbol_list(&instruction.operand) {
                        self.extdef_table.insert(name.clone(), Symbol::external_def(name));
                    }
                }
                "EXTREF" => {
                    for name in split_symbol_list(&instruction.operand) {
                        self.extref_table.insert(name.clone(), Symbol::external_ref(name));
                    }
                }
                _ => {}
            }
        }

        let max_iterations = self.symbol_table.len() as u32 + 1;
        let mut iterations = 0u32;

        loop {
            let unresolved_before = self.symbol_table.values().filter(|s| s.addr.is_none()).count();
            if unresolved_before == 0 {
                break;
            }
            if iterations >= max_iterations {
                return Err(AssemblyError::SemanticErrorNoLine {
                    reason: format!(
                        "symbol table for section '{}' did not converge after {} passes",
                        self.name, max_iterations
                    ),
                });
            }
            iterations += 1;

            self.resolve_symbols_one_pass()?;

            let unresolved_after = self.symbol_table.values().filter(|s| s.addr.is_none()).count();
            if unresolved_after >= unresolved_before {
                return Err(AssemblyError::SemanticErrorNoLine {
                    reason: format!(
                        "symbol table for section '{}' made no progress resolving addresses",
                        self.name
                    ),
                });
            }
        }

        self.current_location = 0;
        Ok(())
    }

    fn resolve_symbols_one_pass(&mut self) -> Result<(), AssemblyError> {
        self.current_location = 0;

        for i in 0..self.instructions.len() {
            let symbol = self.instructions[i].symbol.clone();
            let mnemonic = self.instructions[i].mnemonic.clone();
            let operand = self.instructions[i].operand.clone();
            let format_type = self.instructions[i].format_type;
            let index = self.instructions[i].index as usize;

            if !symbol.is_empty() {
                if let Some(entry) = self.symbol_table.get_mut(&symbol) {
                    entry.addr = Some(self.current_location);
                }
                if let Some(entry) = self.extdef_table.get_mut(&symbol) {
                    entry.addr = Some(self.current_location);
                }
            }

            match mnemonic.as_str() {
                "START" => {
                    let addr = parse_start_address(&operand, index)?;
                    self.current_location = addr;
                    if let Some(entry) = self.symbol_table.get_mut(&symbol) {
                        entry.addr = Some(addr);
                    }
                }
                "RESW" | "RESB" | "BYTE" => {
                    if let Some(entry) = self.symbol_table.get_mut(&symbol) {
                        entry.addr = Some(self.current_location);
                    }
                    self.update_location_counter(i)?;
                }
                "WORD" => {
                    self.update_location_counter(i)?;
                }
                "EQU" => {
                    let result = self.evaluate_operand(&operand, &mnemonic);
                    if result != 0 {
                        if let Some(entry) = self.symbol_table.get_mut(&symbol) {
                            entry.addr = Some(result as u32);
                        }
                        self.instructions[i].location = Some(Location::new(result as u32));
                    }
                }
                "RSUB" => {
                    self.instructions[i].operand = "#0".to_string();
                    self.update_location_counter(i)?;
                }
                "BASE" => {
                    let result = self.evaluate_operand(&operand, &mnemonic);
                    if result != 0 {
                        self.base_register_value = Some(result as u32);
                        self.instructions[i].operand = result.to_string();
                    }
                }
                "CSECT" => {
                    self.current_location = 0;
                    if let Some(entry) = self.symbol_table.get_mut(&symbol) {
                        entry.addr = Some(0);
                    }
                }
                "ORG" => {
                    let result = self.evaluate_operand(&operand, &mnemonic);
                    if result != 0 {
                        self.current_location = result as u32;
                        self.instructions[i].operand = result.to_string();
                    }
                }
                _ => {
                    if format_type > 0 {
                        self.update_location_counter(i)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// A second walk, run once the symbol table is fully resolved,
    /// assigning every instruction its final `Location`.
    pub(super) fn calculate_address(&mut self) -> Result<(), AssemblyError> {
        self.current_location = 0;

        for i in 0..self.instructions.len() {
            let mnemonic = self.instructions[i].mnemonic.clone();
            let operand = self.instructions[i].operand.clone();
            let index = self.instructions[i].index as usize;

            if mnemonic != "EQU" {
                self.instructions[i].location = Some(Location::new(self.current_location));
            }

            match mnemonic.as_str() {
                "START" => {
                    let start = parse_start_address(&operand, index)?;
                    self.instructions[i].location = Some(Location::new(start));
                    self.current_location = start;
                }
                "CSECT" => {
                    self.current_location = 0;
                    self.instructions[i].location = Some(Location::new(0));
                }
                "WORD" => {
                    self.current_location += 3;
                }
                _ => {
                    self.update_location_counter(i)?;
                }
            }
        }

        Ok(())
    }
}

fn split_symbol_list(operand: &str) -> Vec<String> {
    operand
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_start_address(operand: &str, index: usize) -> Result<u32, AssemblyError> {
    u32::from_str_radix(operand.trim(), 16).map_err(|_| AssemblyError::SemanticError {
        index,
        reason: format!("START operand '{operand}' is not a valid hexadecimal address"),
    })
}
