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

//! A small explicit evaluator for operand expressions, restricted to
//! `symbol`, `constant`, `symbol+constant`, `symbol-symbol`, etc. —
//! chains of identifiers/integers joined by `+`/`-`.
//!
//! This replaces the original assembler's approach of substring-
//! substituting symbol names into the operand text and feeding the
//! result to a dynamic `eval`. Substring substitution is unsafe (a
//! symbol name can be a substring of another), so tokens are matched
//! whole here instead.

use crate::ast::SymbolTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRef {
    pub name: String,
    pub sign: char,
}

/// The result of evaluating one operand expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalOutcome {
    /// The numeric result, or 0 if any token could not be resolved.
    pub value: i64,
    /// Every EXTREF-table name that appeared in the operand, in order,
    /// with the sign of the operator immediately preceding it (or `+`
    /// if it opens the expression).
    pub external_refs: Vec<ExternalRef>,
    /// Whether every token in the expression resolved to a number.
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(i64),
    Ident(String),
    Plus,
    Minus,
}

fn tokenize(operand: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = operand.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '+' {
            chars.next();
            tokens.push(Token::Plus);
        } else if c == '-' {
            chars.next();
            tokens.push(Token::Minus);
        } else if c.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() {
                    digits.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Number(digits.parse().unwrap_or(0)));
        } else {
            let mut ident = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            if ident.is_empty() {
                // Unrecognized character; consume it so we terminate.
                chars.next();
            } else {
                tokens.push(Token::Ident(ident));
            }
        }
    }

    tokens
}

/// Evaluates an operand expression against a section's symbol table,
/// reporting every external reference encountered along the way.
///
/// `*` resolves to `current_location` regardless of `extref_table`.
pub fn evaluate(
    operand: &str,
    current_location: u32,
    symbol_table: &SymbolTable,
    extref_table: &SymbolTable,
) -> EvalOutcome {
    if operand.trim() == "*" {
        return EvalOutcome {
            value: current_location as i64,
            external_refs: Vec::new(),
            resolved: true,
        };
    }

    let tokens = tokenize(operand);
    let mut external_refs = Vec::new();
    let mut resolved = true;
    let mut total: i64 = 0;
    let mut sign: i64 = 1;
    // The sign recorded on a modification record: '+' at the start of
    // the expression or right after a '+', '-' right after a '-'.
    let mut record_sign = '+';
    let mut expect_operand = true;

    for token in &tokens {
        match token {
            Token::Plus => {
                sign = 1;
                record_sign = '+';
                expect_operand = true;
            }
            Token::Minus => {
                sign = -1;
                record_sign = '-';
                expect_operand = true;
            }
            Token::Number(n) => {
                total += sign * n;
                expect_operand = false;
            }
            Token::Ident(name) => {
                if let Some(symbol) = symbol_table.get(name) {
                    if let Some(addr) = symbol.addr {
                        total += sign * addr as i64;
                    } else {
                        resolved = false;
                    }
                } else if extref_table.contains_key(name) {
                    external_refs.push(ExternalRef {
                        name: name.clone(),
                        sign: record_sign,
                    });
                    resolved = false;
                } else {
                    resolved = false;
                }
                expect_operand = false;
            }
        }
    }

    if tokens.is_empty() || expect_operand {
        resolved = false;
    }

    EvalOutcome {
        value: if resolved { total } else { 0 },
        external_refs,
        resolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Symbol;

    fn table_with(pairs: &[(&str, u32)]) -> SymbolTable {
        pairs
            .iter()
            .map(|(name, addr)| {
                (
                    name.to_string(),
                    Symbol {
                        name: name.to_string(),
                        addr: Some(*addr),
                        is_external: false,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn resolves_plain_constant() {
        let symbols = SymbolTable::new();
        let extrefs = SymbolTable::new();
        let outcome = evaluate("4096", 0, &symbols, &extrefs);
        assert_eq!(outcome.value, 4096);
        assert!(outcome.resolved);
    }

    #[test]
    fn resolves_symbol_plus_constant() {
        let symbols = table_with(&[("BUFFER", 0x1000)]);
        let extrefs = SymbolTable::new();
        let outcome = evaluate("BUFFER+4", 0, &symbols, &extrefs);
        assert_eq!(outcome.value, 0x1004);
        assert!(outcome.resolved);
    }

    #[test]
    fn does_not_confuse_symbols_that_are_substrings() {
        let symbols = table_with(&[("A", 1), ("ABC", 100)]);
        let extrefs = SymbolTable::new();
        let outcome = evaluate("ABC", 0, &symbols, &extrefs);
        assert_eq!(outcome.value, 100);
    }

    #[test]
    fn star_resolves_to_current_location() {
        let symbols = SymbolTable::new();
        let extrefs = SymbolTable::new();
        let outcome = evaluate("*", 0x2020, &symbols, &extrefs);
        assert_eq!(outcome.value, 0x2020);
        assert!(outcome.resolved);
    }

    #[test]
    fn external_reference_is_reported_with_sign() {
        let symbols = SymbolTable::new();
        let mut extrefs = SymbolTable::new();
        extrefs.insert("BUFFER".to_string(), Symbol::external_ref("BUFFER"));
        let outcome = evaluate("BUFFER", 0, &symbols, &extrefs);
        assert!(!outcome.resolved);
        assert_eq!(outcome.external_refs.len(), 1);
        assert_eq!(outcome.external_refs[0].sign, '+');

        let outcome = evaluate("-BUFFER", 0, &symbols, &extrefs);
        assert_eq!(outcome.external_refs[0].sign, '-');
    }
}
