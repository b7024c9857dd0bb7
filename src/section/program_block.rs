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

//! Groups instructions into program blocks (`START`/`CSECT` name the
//! default blocks, `USE` switches between them) and flattens them back
//! into one sequence in block-permutation order, with `END` moved to
//! the very end.

use super::Section;
use crate::ast::Instruction;
use crate::errors::AssemblyError;
use std::collections::HashMap;

impl Section {
    pub(super) fn process_program_block(&mut self) -> Result<(), AssemblyError> {
        let mut blocks: HashMap<String, Vec<Instruction>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut default_block = String::new();
        let mut current_block: Option<String> = None;
        let mut end_instruction: Option<Instruction> = None;

        let instructions = std::mem::take(&mut self.instructions);

        for (idx, mut instruction) in instructions.into_iter().enumerate() {
            match instruction.mnemonic.as_str() {
                "START" => {
                    default_block = instruction.symbol.clone();
                    blocks.entry(default_block.clone()).or_default();
                    if !order.contains(&default_block) {
                        order.push(default_block.clone());
                    }
                    current_block = Some(default_block.clone());
                }
                "CSECT" => {
                    blocks.entry(instruction.symbol.clone()).or_default();
                    if !order.contains(&instruction.symbol) {
                        order.push(instruction.symbol.clone());
                    }
                    current_block = Some(instruction.symbol.clone());
                }
                "END" => {
                    if end_instruction.is_some() {
                        return Err(AssemblyError::DuplicateEnd {
                            section: self.name.clone(),
                        });
                    }
                    end_instruction = Some(instruction);
                    continue;
                }
                "USE" => {
                    if instruction.operand.is_empty() {
                        current_block = Some(default_block.clone());
                    } else {
                        let name = instruction.operand.clone();
                        blocks.entry(name.clone()).or_default();
                        if !order.contains(&name) {
                            order.push(name.clone());
                        }
                        current_block = Some(name);
                    }
                }
                _ => {
                    if current_block.is_none() {
                        return Err(AssemblyError::StructuralError {
                            index: idx,
                            reason: "instruction encountered before any block was defined".to_string(),
                        });
                    }
                }
            }

            instruction.index = idx as u32;
            if let Some(block) = &current_block {
                blocks.entry(block.clone()).or_default().push(instruction);
            }
        }

        let mut reordered: Vec<Instruction> = order
            .into_iter()
            .flat_map(|name| blocks.remove(&name).unwrap_or_default())
            .collect();

        if let Some(mut end_instruction) = end_instruction {
            let next_index = reordered.iter().map(|i| i.index).max().map(|m| m + 1).unwrap_or(0);
            end_instruction.index = next_index;
            reordered.push(end_instruction);
        }

        self.instructions = reordered;
        Ok(())
    }
}
