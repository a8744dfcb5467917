//! Calibration program emitter.

use std::fmt;

use crate::calibration::{CalibrationDefinition, CalibrationSet};

/// Print a calibration set as a program fragment.
///
/// The output parses back to the same set.
pub fn emit_fragment(set: &CalibrationSet) -> String {
    let mut emitter = Emitter::new();
    for definition in set.iter() {
        emitter.emit_definition(definition);
    }
    emitter.output
}

/// Print a single definition.
pub fn emit_definition(definition: &CalibrationDefinition) -> String {
    let mut emitter = Emitter::new();
    emitter.emit_definition(definition);
    emitter.output
}

struct Emitter {
    output: String,
    indent: usize,
}

impl Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    fn emit_definition(&mut self, definition: &CalibrationDefinition) {
        let mut header = format!("DEFCAL {}", definition.name);
        if !definition.parameters.is_empty() {
            let params: Vec<String> = definition
                .parameters
                .iter()
                .map(|p| format!("%{p}"))
                .collect();
            header.push_str(&format!("({})", params.join(", ")));
        }
        for site in &definition.operands {
            header.push_str(&format!(" {site}"));
        }
        header.push(':');
        self.writeln(&header);

        self.indent += 1;
        for instruction in &definition.body {
            self.writeln(&instruction.to_string());
        }
        self.indent -= 1;
    }

    fn writeln(&mut self, line: &str) {
        let indent = "    ".repeat(self.indent);
        self.output.push_str(&indent);
        self.output.push_str(line);
        self.output.push('\n');
    }
}

impl fmt::Display for CalibrationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&emit_definition(self))
    }
}

impl fmt::Display for CalibrationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&emit_fragment(self))
    }
}
