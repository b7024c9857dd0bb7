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

//! Interns `=C'...'`/`=X'...'` literal operands into synthetic names,
//! so `LTORG`/`END` can later emit them as `BYTE` instructions.

use crate::ast::Literal;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct LiteralManager {
    current: Vec<Literal>,
    index: HashMap<String, String>,
    next_id: u32,
    archived: Vec<Literal>,
}

impl LiteralManager {
    pub fn new() -> Self {
        Self {
            current: Vec::new(),
            index: HashMap::new(),
            next_id: 1,
            archived: Vec::new(),
        }
    }

    /// Interns a literal operand (e.g. `=C'EOF'`) and returns the
    /// synthetic name (`literal1`, `literal2`, ...) that should replace
    /// it in the instruction's operand field.
    ///
    /// Returns `Err` if the operand is malformed (missing the leading
    /// `=` or an unterminated quote), mirroring the original assembler's
    /// literal-format validation.
    pub fn add_literal(&mut self, literal_value: &str) -> Result<String, String> {
        if let Some(existing) = self.index.get(literal_value) {
            if let Some(entry) = self.current.iter_mut().find(|l| &l.name == existing) {
                entry.used_count += 1;
            }
            return Ok(existing.clone());
        }

        let data = literal_value
            .strip_prefix('=')
            .ok_or_else(|| format!("literal operand '{literal_value}' is missing its '=' prefix"))?;
        if !((data.starts_with("C'") || data.starts_with("c'") || data.starts_with("X'") || data.starts_with("x'"))
            && data.ends_with('\''))
        {
            return Err(format!("malformed literal constant '{literal_value}'"));
        }

        let name = format!("literal{}", self.next_id);
        self.next_id += 1;
        self.current.push(Literal {
            name: name.clone(),
            data: data.to_string(),
            used_count: 1,
        });
        self.index.insert(literal_value.to_string(), name.clone());
        Ok(name)
    }

    /// The literal table accumulated since the last `LTORG`/`END`.
    pub fn current_literals(&self) -> &[Literal] {
        &self.current
    }

    /// Archives the current table (for later inspection/diagnostics)
    /// and starts a fresh one.
    pub fn clear_table(&mut self) {
        self.archived.append(&mut self.current);
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interns_a_new_literal() {
        let mut pool = LiteralManager::new();
        let name = pool.add_literal("=C'EOF'").unwrap();
        assert_eq!(name, "literal1");
        assert_eq!(pool.current_literals()[0].data, "C'EOF'");
    }

    #[test]
    fn reuses_identical_literals() {
        let mut pool = LiteralManager::new();
        let first = pool.add_literal("=X'F1'").unwrap();
        let second = pool.add_literal("=X'F1'").unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.current_literals()[0].used_count, 2);
    }

    #[test]
    fn rejects_malformed_literal() {
        let mut pool = LiteralManager::new();
        assert!(pool.add_literal("=C'EOF").is_err());
        assert!(pool.add_literal("C'EOF'").is_err());
    }

    #[test]
    fn clear_table_empties_current_and_resets_dedup() {
        let mut pool = LiteralManager::new();
        pool.add_literal("=C'EOF'").unwrap();
        pool.clear_table();
        assert!(pool.current_literals().is_empty());
        let name = pool.add_literal("=C'EOF'").unwrap();
        assert_eq!(name, "literal2");
    }
}
