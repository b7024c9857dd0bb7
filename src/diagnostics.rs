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

//! Structured table snapshots emitted at the same points the original
//! assembler's console-dump analyzer ran, for callers that want to
//! inspect pass state without reaching into `Section` internals.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SymbolTableEntry {
    pub name: String,
    pub address: Option<u32>,
    pub external: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiteralTableEntry {
    pub name: String,
    pub data: String,
    pub used_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModificationRecordEntry {
    pub location: u32,
    pub length_nibbles: u8,
    pub sign: char,
    pub reference: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructionEntry {
    pub index: u32,
    pub address: Option<u32>,
    pub mnemonic: String,
    pub operand: String,
    pub object_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub enum DiagnosticEvent {
    LiteralTable(Vec<LiteralTableEntry>),
    SymbolTable(Vec<SymbolTableEntry>),
    ExternalDefinitions(Vec<SymbolTableEntry>),
    ExternalReferences(Vec<SymbolTableEntry>),
    ModificationRecords(Vec<ModificationRecordEntry>),
    Instructions(Vec<InstructionEntry>),
}

/// Receives table snapshots as each pass produces them. `Section::pass1`
/// and `Section::pass2` call `emit` at the same points the original
/// assembler printed its six `tabulate` dumps (LITTAB, SYMTAB, EXTREF,
/// EXTDEF, MODREC, INSTR) — what a caller does with the event is up to
/// it.
pub trait DiagnosticSink {
    fn emit(&mut self, section_name: &str, event: DiagnosticEvent);
}

/// The default sink: discards everything. Assembling without wanting
/// the tables shouldn't cost anything beyond building them.
#[derive(Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _section_name: &str, _event: DiagnosticEvent) {}
}
