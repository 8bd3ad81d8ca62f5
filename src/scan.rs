//! Disassembly line classifier.
//!
//! `wat2wasm -v` annotates every byte group of the output module with a line
//! of the shape
//!
//! ```text
//! 0001973: d2                                        ; ref.func
//! ```
//!
//! The part between `:` and `;` is the raw byte value, the comment is either
//! an instruction mnemonic or a label describing an immediate operand
//! (`alignment`, `function index`, ...). Lines with any other shape (section
//! headers, error messages) are not records at all.
use crate::ty::ValueType;
use chumsky::prelude::*;

/// One classified disassembly record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Trimmed hex byte value between `:` and `;`.
    pub value: String,
    /// Trimmed comment: a mnemonic or an immediate label.
    pub name: String,
    /// Introduces an opcode (as opposed to describing an immediate).
    pub is_instruction: bool,
    /// The `alignment` immediate label of a load/store instruction.
    pub is_alignment: bool,
    /// Value type produced, from the first dot-segment of the mnemonic.
    pub result: ValueType,
    /// Value type consumed, from the second dot-segment if there is one.
    pub operand: ValueType,
}

impl Record {
    fn new(value: String, name: String) -> Self {
        let parts: Vec<&str> = name.split('.').collect();
        // split() always yields at least one part
        let result = ValueType::from_token(parts[0]);
        // The second segment of a load/store mnemonic (`load8_s`, `store16`)
        // describes a memory access width, not an operand type.
        let operand = match parts.as_slice() {
            [head, tail] if !touches_memory(head) && !touches_memory(tail) => {
                ValueType::from_token(tail)
            }
            _ => ValueType::Void,
        };

        let is_alignment = name == "alignment";
        let is_instruction = !value.contains(char::is_whitespace)
            && !name.contains(char::is_whitespace)
            && !is_alignment
            // A bare type token is a block/result type annotation.
            && !matches!(name.as_str(), "i32" | "i64" | "f32" | "f64");

        Self {
            value,
            name,
            is_instruction,
            is_alignment,
            result,
            operand,
        }
    }
}

fn touches_memory(segment: &str) -> bool {
    segment.contains("load") || segment.contains("store")
}

/// Matches `<offset>: <bytes> ; <comment>` where the line holds exactly one
/// `:` and, after it, exactly one `;`. Yields the raw (bytes, comment) pair.
fn record_parser() -> impl Parser<char, (String, String), Error = Simple<char>> {
    let offset = filter(|c: &char| *c != ':').repeated();
    let field = filter(|c: &char| *c != ':' && *c != ';')
        .repeated()
        .collect::<String>();

    offset
        .then_ignore(just(':'))
        .ignore_then(field.clone())
        .then_ignore(just(';'))
        .then(field)
        .then_ignore(end())
}

/// Classifies one line of disassembly text.
///
/// Returns `None` for anything that is not a well-formed record: headers,
/// lines with a second comment, lines without a value field. That is a
/// skip signal for the caller, never an error.
pub fn classify(line: &str) -> Option<Record> {
    let (value, name) = record_parser().parse(line).ok()?;
    Some(Record::new(
        value.trim().to_string(),
        name.trim().to_string(),
    ))
}

/// A materialized line sequence with per-index classification.
///
/// The table builder revisits earlier lines while attaching immediate flags,
/// so every line is classified exactly once up front and looked up by index
/// afterwards.
pub struct Scanner {
    records: Vec<Option<Record>>,
}

impl Scanner {
    pub fn new(lines: &[String]) -> Self {
        let parser = record_parser();
        let records = lines
            .iter()
            .map(|line| {
                parser
                    .parse(line.as_str())
                    .ok()
                    .map(|(value, name)| {
                        Record::new(value.trim().to_string(), name.trim().to_string())
                    })
            })
            .collect();

        Self { records }
    }

    /// The classification of line `index`, or `None` if the line is out of
    /// range or did not match the record shape.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
