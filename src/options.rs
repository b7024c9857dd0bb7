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

/// Replaces the original assembler's process-global `bonus` flag.
/// Threaded explicitly through `assemble()` and `Section::pass1`/`pass2`
/// rather than read from a global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Enables literal-pool emission, program-block reordering and
    /// external-definition/reference handling.
    pub extended_mode: bool,
}

impl AssemblerOptions {
    pub fn new(extended_mode: bool) -> Self {
        Self { extended_mode }
    }
}
