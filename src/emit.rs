//! Table emitters.
//!
//! The derived table is only useful once it is written down in a form some
//! consumer loads at start-up. All formats render the same dense 256-entry
//! table; they only differ in how one record is spelled, so each emitter
//! plugs its record rendering into the shared driver.
use crate::table::{InstrInfo, InstrTable};
use serde::Serialize;
use std::fmt::Write;

/// Renders an instruction table into output text, one record at a time.
pub trait Emitter {
    /// Renders the record for one opcode into the output buffer.
    fn emit_record(&mut self, opcode: u8, info: &InstrInfo, code: &mut String);

    fn begin(&mut self, _code: &mut String) {}

    fn finish(&mut self, _code: &mut String) {}

    fn emit(&mut self, table: &InstrTable) -> String {
        let mut code = String::new();
        self.begin(&mut code);
        for (opcode, info) in table.iter() {
            self.emit_record(opcode, info, &mut code);
        }
        self.finish(&mut code);
        code
    }
}

/// The output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Rust,
    Json,
    Text,
}

impl Format {
    pub fn parse(name: &str) -> Option<Format> {
        match name {
            "rust" => Some(Format::Rust),
            "json" => Some(Format::Json),
            "text" => Some(Format::Text),
            _ => None,
        }
    }

    pub fn emitter(self) -> Box<dyn Emitter> {
        match self {
            Format::Rust => Box::new(RustEmitter::new()),
            Format::Json => Box::new(JsonEmitter::new()),
            Format::Text => Box::new(TextEmitter::new()),
        }
    }
}

/// Emits the table as a Rust array literal an interpreter includes at build
/// time for opcode dispatch.
#[derive(Debug, Default)]
pub struct RustEmitter {}

impl RustEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Emitter for RustEmitter {
    fn begin(&mut self, code: &mut String) {
        code.push_str("// Generated from wat2wasm verbose disassembly. Do not edit.\n");
        code.push_str("use crate::wasm_model::*;\n");
        code.push_str("\n");
        code.push_str("pub const INSTRS: [InstrInfo; 256] = [\n");
    }

    fn emit_record(&mut self, opcode: u8, info: &InstrInfo, code: &mut String) {
        let _ = writeln!(
            code,
            "    InstrInfo {{ opcode: {:#04x}, name: {:?}, result: ValueType::{}, operand: ValueType::{}, has_immediate: {}, takes_alignment: {} }},",
            opcode,
            info.name,
            info.result.ident(),
            info.operand.ident(),
            info.has_immediate,
            info.takes_alignment,
        );
    }

    fn finish(&mut self, code: &mut String) {
        code.push_str("];\n");
    }
}

#[derive(Debug, Serialize)]
struct JsonRecord {
    opcode: u8,
    name: String,
    result: &'static str,
    operand: &'static str,
    has_immediate: bool,
    takes_alignment: bool,
}

/// Emits the table as a JSON array, for consumers in other languages and for
/// build scripts that splice the data into generated source.
#[derive(Debug, Default)]
pub struct JsonEmitter {
    records: Vec<JsonRecord>,
}

impl JsonEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Emitter for JsonEmitter {
    fn emit_record(&mut self, opcode: u8, info: &InstrInfo, _code: &mut String) {
        self.records.push(JsonRecord {
            opcode,
            name: info.name.clone(),
            result: info.result.ident(),
            operand: info.operand.ident(),
            has_immediate: info.has_immediate,
            takes_alignment: info.takes_alignment,
        });
    }

    fn finish(&mut self, code: &mut String) {
        let json = serde_json::to_string_pretty(&self.records)
            .expect("instruction records serialize to JSON");
        code.push_str(&json);
        code.push('\n');
    }
}

/// Emits an aligned human-readable listing, handy for eyeballing what the
/// scrape actually collected.
#[derive(Debug, Default)]
pub struct TextEmitter {}

impl TextEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Emitter for TextEmitter {
    fn emit_record(&mut self, opcode: u8, info: &InstrInfo, code: &mut String) {
        let _ = writeln!(
            code,
            "op: {:02x}  name: {:<24} args: {:<5} result: {:<6} operand: {:<6} aligned: {}",
            opcode,
            info.name,
            info.has_immediate,
            info.result,
            info.operand,
            info.takes_alignment,
        );
    }
}
