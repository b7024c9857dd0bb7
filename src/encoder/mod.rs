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

//! Dispatches a single instruction to its format-specific encoder.
//! Section state (symbol/extref tables, base register, modification
//! records) is passed in as a parameter rather than held by a generator
//! object with a back-reference to its section.

mod byteword;
mod flags;

use crate::ast::Location;
use crate::errors::AssemblyError;
use crate::section::Section;
use crate::tables;

pub fn generate_object_code(
    section: &mut Section,
    i: usize,
    location: Location,
    base_value: i64,
) -> Result<String, AssemblyError> {
    let mnemonic = section.instructions[i].mnemonic.clone();
    let index = section.instructions[i].index as usize;

    match mnemonic.as_str() {
        "BYTE" => {
            let operand = section.instructions[i].operand.clone();
            byteword::encode_byte(&operand, index)
        }
        "WORD" => {
            let operand = section.instructions[i].operand.clone();
            let value = section.evaluate_operand_at(&operand, "WORD", location.address);
            Ok(byteword::encode_word(value))
        }
        "RSUB" => Ok("4F0000".to_string()),
        _ => match section.instructions[i].format_type {
            1 => Ok(format1(&mnemonic, index)?),
            2 => format2(&mnemonic, &section.instructions[i].operand, index),
            3 => flags::format3(section, i, location, base_value),
            4 => flags::format4(section, i, location),
            _ => Ok(String::new()),
        },
    }
}

fn format1(mnemonic: &str, index: usize) -> Result<String, AssemblyError> {
    let opcode = tables::lookup_opcode(mnemonic)
        .ok_or_else(|| AssemblyError::InvalidMnemonic {
            index,
            mnemonic: mnemonic.to_string(),
        })?
        .opcode;
    Ok(format!("{opcode:02X}"))
}

fn format2(mnemonic: &str, operand: &str, index: usize) -> Result<String, AssemblyError> {
    let opcode = tables::lookup_opcode(mnemonic)
        .ok_or_else(|| AssemblyError::InvalidMnemonic {
            index,
            mnemonic: mnemonic.to_string(),
        })?
        .opcode;

    let mut registers = operand.split(',').map(str::trim);
    let r1_name = registers.next().unwrap_or("A");
    let r2_name = registers.next().unwrap_or("A");

    let r1 = tables::lookup_register(r1_name).ok_or_else(|| AssemblyError::StructuralError {
        index,
        reason: format!("unknown register '{r1_name}'"),
    })?;
    let r2 = tables::lookup_register(r2_name).ok_or_else(|| AssemblyError::StructuralError {
        index,
        reason: format!("unknown register '{r2_name}'"),
    })?;

    Ok(format!("{opcode:02X}{r1:01X}{r2:01X}"))
}
