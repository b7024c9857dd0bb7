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

use sicxe_asm::assemble;
use sicxe_asm::diagnostics::NullSink;
use sicxe_asm::file_reader::MockFileReader;
use sicxe_asm::options::AssemblerOptions;
use std::path::Path;

fn run(source: &str, extended_mode: bool) -> anyhow::Result<String> {
    let mut reader = MockFileReader::default();
    reader.add_file("test.asm", source);
    let mut sink = NullSink;
    assemble(
        Path::new("test.asm"),
        AssemblerOptions::new(extended_mode),
        &reader,
        &mut sink,
    )
}

#[test]
fn minimal_program_produces_header_text_and_end_records() {
    let source = "\
COPY    START   1000
FIRST   STL     RETADR
        RSUB
RETADR  RESW    1
        END     FIRST
";
    let output = run(source, false).unwrap();
    assert!(output.starts_with("HCOPY  001000"));
    assert!(output.contains("\nT001000"));
    assert!(output.contains("\nE001000"));
}

#[test]
fn immediate_literal_encodes_inline_without_relocation() {
    let source = "\
COPY    START   0
        LDA     #3
        RSUB
        END     COPY
";
    let output = run(source, false).unwrap();
    let text_line = output.lines().find(|l| l.starts_with('T')).unwrap();
    // opcode 0x00, n=0 i=1, disp = 3
    assert!(text_line.contains("010003"));
}

#[test]
fn out_of_pc_range_operand_falls_back_to_base_relative() {
    let source = "\
COPY    START   0
        BASE    BUFFER
        LDA     BUFFER
        RSUB
        RESW    4100
BUFFER  RESB    1
        END     COPY
";
    let result = run(source, false);
    assert!(result.is_ok(), "expected base-relative fallback to succeed: {result:?}");
}

#[test]
fn indexed_addressing_sets_the_x_bit() {
    let source = "\
COPY    START   0
        LDA     BUFFER,X
        RSUB
BUFFER  RESB    1
        END     COPY
";
    let output = run(source, false).unwrap();
    let text_line = output.lines().find(|l| l.starts_with('T')).unwrap();
    // opcode byte 0x00, flags nibble with x set: n=1 i=1 x=1 -> 0xB on high nibble of flags
    let object_code = &text_line[9..];
    let flags_nibble = u8::from_str_radix(&object_code[2..3], 16).unwrap();
    assert_eq!(flags_nibble & 0x8, 0x8, "expected x bit set in {object_code}");
}

#[test]
fn literal_pool_is_emitted_at_ltorg() {
    let source = "\
COPY    START   0
        LDA     =C'EOF'
        LTORG
        RSUB
        END     COPY
";
    let output = run(source, true).unwrap();
    // C'EOF' -> 45 4F 46
    assert!(output.contains("454F46"));
}

#[test]
fn multi_section_program_emits_extdef_extref_and_modification_records() {
    // A single `END` terminates the whole file, so it must be the very
    // last line for both control sections to be picked up.
    let source = "\
PROGA   START   0
        EXTREF  SUBRTN
        EXTDEF  ENTRY
ENTRY   JSUB    SUBRTN
        RSUB
PROGB   CSECT
        EXTREF  ENTRY
        EXTDEF  SUBRTN
SUBRTN  RSUB
        END     ENTRY
";
    let output = run(source, true).unwrap();
    assert!(output.contains("DENTRY "));
    assert!(output.contains("RSUBRTN"));
    assert!(output.contains("\nM"));
}

#[test]
fn undefined_external_definition_is_an_error() {
    let source = "\
COPY    START   0
        EXTDEF  MISSING
        RSUB
        END     COPY
";
    let result = run(source, true);
    assert!(result.is_err());
}

#[test]
fn byte_format3_instruction_rejects_out_of_range_displacement_without_base() {
    let source = "\
COPY    START   0
        LDA     FAR
        RESW    4100
FAR     RESB    1
        END     COPY
";
    let result = run(source, false);
    assert!(result.is_err());
}

#[test]
fn word_directive_evaluates_symbol_arithmetic() {
    let source = "\
COPY    START   0
ALPHA   WORD    5
BETA    WORD    ALPHA+1
        RSUB
        END     COPY
";
    let output = run(source, false).unwrap();
    let text_line = output.lines().find(|l| l.starts_with('T')).unwrap();
    assert!(text_line.contains("000005000001"));
}
