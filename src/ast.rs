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

//! The core data model: instructions, symbols, locations and literals.
//! Instructions are deliberately a flat record of strings (mnemonic,
//! operand) rather than a typed enum per opcode — encoding is table
//! driven, and operands carry arbitrary symbol±symbol/symbol±constant
//! expressions that aren't known until the symbol table is built.

use std::collections::HashMap;

/// A resolved memory location. `is_relative` records whether the final
/// Format 3 encoding used PC/base-relative addressing, for relocation
/// reporting only — it does not affect how the bytes are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub address: u32,
    pub is_relative: bool,
}

impl Location {
    pub fn new(address: u32) -> Self {
        Self {
            address,
            is_relative: false,
        }
    }
}

/// A label, EXTDEF or EXTREF entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub addr: Option<u32>,
    pub is_external: bool,
}

impl Symbol {
    pub fn defined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addr: None,
            is_external: false,
        }
    }

    pub fn external_def(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addr: None,
            is_external: true,
        }
    }

    pub fn external_ref(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addr: Some(0),
            is_external: true,
        }
    }
}

pub type SymbolTable = HashMap<String, Symbol>;

/// A single instruction, directive or synthetic literal-pool entry.
/// `format_type = 0` marks directives that emit no instruction
/// encoding of their own (EQU, START, BASE, EXTDEF/EXTREF, ...).
#[derive(Debug, Clone)]
pub struct Instruction {
    pub index: u32,
    pub format_type: u8,
    pub symbol: String,
    pub mnemonic: String,
    pub operand: String,
    pub object_code: String,
    pub location: Option<Location>,
    /// Set once Pass 1 determines indexed addressing is in effect for
    /// this instruction's operand (replaces the original's fragile
    /// `mnemonic||operand`-keyed map).
    pub indexed: bool,
}

impl Instruction {
    pub fn new(index: u32, format_type: u8, symbol: &str, mnemonic: &str, operand: &str) -> Self {
        Self {
            index,
            format_type,
            symbol: symbol.to_string(),
            mnemonic: mnemonic.to_string(),
            operand: operand.to_string(),
            object_code: String::new(),
            location: None,
            indexed: false,
        }
    }
}

/// A modification record destined for the M record of the object
/// program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationRecord {
    pub location: u32,
    pub length_nibbles: u8,
    pub sign: char,
    pub reference: String,
}

/// An interned literal constant (`=C'...'` / `=X'...'`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub name: String,
    pub data: String,
    pub used_count: u32,
}
