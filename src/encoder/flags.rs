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

//! Format 3/4 nixbpe flag computation and object code assembly.

use crate::ast::{Location, ModificationRecord};
use crate::errors::AssemblyError;
use crate::section::Section;
use crate::tables;

fn mnemonic_opcode(mnemonic: &str) -> Result<u8, AssemblyError> {
    tables::lookup_opcode(mnemonic)
        .map(|entry| entry.opcode)
        .ok_or_else(|| AssemblyError::SemanticErrorNoLine {
            reason: format!("unknown opcode '{mnemonic}' during object code generation"),
        })
}

/// Splits a trailing `,X` index suffix off `operand`, returning whether
/// indexing applies and the remaining operand text. In extended mode
/// the section has already done this and set `Instruction::indexed`;
/// without it, the raw `,` is still present and gets caught here —
/// either way the caller only needs the resulting `x` bit.
fn split_index_suffix(operand: &str) -> (bool, &str) {
    match operand.rsplit_once(',') {
        Some((base, _)) => (true, base),
        None => (false, operand),
    }
}

fn get_target_address(section: &Section, operand: &str) -> u32 {
    let operand = operand.strip_prefix(['#', '@']).unwrap_or(operand);
    if let Ok(value) = operand.parse::<u32>() {
        return value;
    }
    if let Some(symbol) = section.symbol_table.get(operand) {
        return symbol.addr.unwrap_or(0);
    }
    if let Some(symbol) = section.extref_table.get(operand) {
        return symbol.addr.unwrap_or(0);
    }
    0
}

fn addressing_mode(operand: &str) -> (u8, u8) {
    if operand.starts_with('#') {
        (0, 1)
    } else if operand.starts_with('@') {
        (1, 0)
    } else {
        (1, 1)
    }
}

fn assemble_format3(opcode: u8, n: u8, i: u8, x: u8, b: u8, p: u8, e: u8, disp: u32) -> String {
    let opcode6 = (opcode >> 2) as u32;
    let flags = ((n as u32) << 5)
        | ((i as u32) << 4)
        | ((x as u32) << 3)
        | ((b as u32) << 2)
        | ((p as u32) << 1)
        | (e as u32);
    let code = (opcode6 << 18) | (flags << 12) | (disp & 0xFFF);
    format!("{code:06X}")
}

pub fn format3(
    section: &mut Section,
    i: usize,
    location: Location,
    base_value: i64,
) -> Result<String, AssemblyError> {
    let mnemonic = section.instructions[i].mnemonic.clone();
    let raw_operand = section.instructions[i].operand.clone();
    let format_type = section.instructions[i].format_type;
    let index = section.instructions[i].index as usize;

    let (mut x, operand) = split_index_suffix(&raw_operand);
    if section.instructions[i].indexed {
        x = true;
    }
    let x = if x { 1u8 } else { 0u8 };

    let (n, i_flag) = addressing_mode(operand);
    let target_address = get_target_address(section, operand);

    if let Some(rest) = operand.strip_prefix('#') {
        if let Ok(literal) = rest.parse::<u32>() {
            if target_address == literal {
                if let Some(loc) = section.instructions[i].location.as_mut() {
                    loc.is_relative = false;
                }
                let opcode = mnemonic_opcode(&mnemonic)?;
                return Ok(assemble_format3(opcode, n, i_flag, x, 0, 0, 0, literal & 0x7FF));
            }
        }
    }

    let pc_relative = target_address as i64 - (location.address as i64 + format_type as i64);
    let base_relative = target_address as i64 - base_value;

    let (b, p, disp, is_relative) = if (-2048..=2047).contains(&pc_relative) {
        (
            0u8,
            1u8,
            (pc_relative & 0xFFF) as u32,
            !(operand.starts_with('@') || operand.starts_with('#')),
        )
    } else if (0..=4095).contains(&base_relative) {
        (
            1u8,
            0u8,
            (base_relative & 0xFFF) as u32,
            !(operand.starts_with('@') || operand.starts_with('#')),
        )
    } else {
        return Err(AssemblyError::DisplacementOutOfRange {
            index,
            mnemonic,
            displacement: pc_relative,
        });
    };

    if let Some(loc) = section.instructions[i].location.as_mut() {
        loc.is_relative = is_relative;
    }

    let opcode = mnemonic_opcode(&mnemonic)?;
    Ok(assemble_format3(opcode, n, i_flag, x, b, p, 0, disp))
}

pub fn format4(section: &mut Section, i: usize, location: Location) -> Result<String, AssemblyError> {
    let mnemonic = section.instructions[i].mnemonic.clone();
    let raw_operand = section.instructions[i].operand.clone();

    let (mut x, operand) = split_index_suffix(&raw_operand);
    if section.instructions[i].indexed {
        x = true;
    }
    let x = if x { 1u8 } else { 0u8 };

    let (n, i_flag) = addressing_mode(operand);
    let address = get_target_address(section, operand);

    let opcode = mnemonic_opcode(&mnemonic)?;
    let opcode6 = (opcode >> 2) as u32;
    let flags = ((n as u32) << 5) | ((i_flag as u32) << 4) | ((x as u32) << 3) | 1; // b=p=0, e=1
    let code = (opcode6 << 26) | (flags << 20) | (address & 0xFFFFF);

    if n == 1 && i_flag == 1 {
        let bare = operand.strip_prefix(['#', '@']).unwrap_or(operand);
        let is_symbolic = !bare.chars().all(|c| c.is_ascii_digit())
            && (section.symbol_table.contains_key(bare) || section.extref_table.contains_key(bare));
        if is_symbolic {
            let record_location = location.address + 1;
            let exists = section
                .modification_records
                .iter()
                .any(|m| m.location == record_location && m.reference == bare);
            if !exists {
                section.modification_records.push(ModificationRecord {
                    location: record_location,
                    length_nibbles: 5,
                    sign: '+',
                    reference: bare.to_string(),
                });
            }
        }
    }

    Ok(format!("{code:08X}"))
}
