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

//! `BYTE`/`WORD` object code encoding.

use crate::errors::AssemblyError;

/// `C'EOF'` -> `454F46`, `X'F1'` -> `F1`. Format validity was already
/// checked when the location counter advanced past this instruction, so
/// this only has to pick the right transform.
pub fn encode_byte(operand: &str, index: usize) -> Result<String, AssemblyError> {
    if operand.starts_with(['C', 'c']) {
        let content = &operand[2..operand.len() - 1];
        Ok(content.bytes().map(|b| format!("{b:02X}")).collect())
    } else if operand.starts_with(['X', 'x']) {
        Ok(operand[2..operand.len() - 1].to_ascii_uppercase())
    } else {
        Err(AssemblyError::InvalidByteConstant {
            index,
            reason: format!("unrecognized BYTE constant type '{operand}'"),
        })
    }
}

/// Masks a signed value to 24 bits and renders it as 6 hex digits.
pub fn encode_word(value: i64) -> String {
    format!("{:06X}", (value & 0xFFFFFF) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_character_constant() {
        assert_eq!(encode_byte("C'EOF'", 0).unwrap(), "454F46");
    }

    #[test]
    fn encodes_hex_constant() {
        assert_eq!(encode_byte("X'F1'", 0).unwrap(), "F1");
    }

    #[test]
    fn masks_negative_word_to_24_bits() {
        assert_eq!(encode_word(-1), "FFFFFF");
    }

    #[test]
    fn encodes_positive_word() {
        assert_eq!(encode_word(3), "000003");
    }
}
