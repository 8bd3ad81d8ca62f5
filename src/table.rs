//! Instruction table builder.
//!
//! Folds a classified disassembly line stream into a dense, opcode-indexed
//! table of instruction metadata. Instruction lines register (or re-register)
//! an opcode; the immediate lines that follow flip the entry's immediate and
//! alignment flags.
use crate::scan::Scanner;
use crate::ty::ValueType;
use std::collections::HashMap;

/// Metadata scraped for one opcode.
///
/// The default value is the placeholder for opcodes never seen in the input:
/// empty mnemonic, `Void` types, no immediates. Consumers must treat such an
/// entry as "unsupported instruction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrInfo {
    /// Mnemonic, empty when the opcode was never observed.
    pub name: String,
    /// At least one immediate operand follows the opcode byte.
    pub has_immediate: bool,
    /// The immediates include a memory alignment.
    pub takes_alignment: bool,
    /// Value type produced.
    pub result: ValueType,
    /// Value type consumed.
    pub operand: ValueType,
}

/// Dense table with one entry per opcode byte, indexed directly by it.
#[derive(Debug, PartialEq, Eq)]
pub struct InstrTable {
    entries: Box<[InstrInfo; 256]>,
}

impl InstrTable {
    pub fn get(&self, opcode: u8) -> &InstrInfo {
        &self.entries[opcode as usize]
    }

    /// All 256 entries in ascending opcode order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &InstrInfo)> {
        self.entries.iter().enumerate().map(|(i, e)| (i as u8, e))
    }
}

/// Builds the opcode table from a raw disassembly line sequence.
///
/// Known limitation: `br_table` target lists do not fit the
/// one-opcode-then-immediates pattern, so their detail lines fail the
/// owner lookup and are dropped. The `br_table` entry itself still gets
/// `has_immediate` from the target count line that directly follows it.
#[derive(Debug, Default)]
pub struct TableBuilder {
    ops: HashMap<u8, InstrInfo>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the full forward pass and finalizes the dense table.
    pub fn build(&mut self, lines: &[String]) -> InstrTable {
        let scanner = Scanner::new(lines);

        for i in 0..scanner.len() {
            let Some(rec) = scanner.get(i) else {
                continue;
            };

            if rec.is_instruction {
                let Some(opcode) = parse_opcode(&rec.value) else {
                    continue;
                };
                let entry = self.ops.entry(opcode).or_default();
                // Last seen definition wins for name and types. The flags
                // stay untouched: once a detail line set one, a later
                // occurrence of the same opcode must not clear it.
                entry.name = rec.name.clone();
                entry.result = rec.result;
                entry.operand = rec.operand;
            } else {
                self.attach_detail(&scanner, i);
            }
        }

        self.apply_overrides();
        self.finish()
    }

    /// Walks backwards from the detail line at `index` to the line that owns
    /// it, skipping over alignment labels, and flips the owner's flags.
    ///
    /// The walk gives up when a line fails to classify or when the owner was
    /// never registered; both happen inside `br_table` immediate lists and
    /// the detail line is simply dropped.
    fn attach_detail(&mut self, scanner: &Scanner, index: usize) {
        let mut saw_alignment = false;
        let mut i = index;

        let owner = loop {
            if i == 0 {
                return;
            }
            i -= 1;
            match scanner.get(i) {
                None => return,
                Some(rec) if rec.is_alignment => saw_alignment = true,
                Some(rec) => break rec,
            }
        };

        let Some(opcode) = parse_opcode(&owner.value) else {
            return;
        };
        if let Some(entry) = self.ops.get_mut(&opcode) {
            entry.has_immediate = true;
            entry.takes_alignment |= saw_alignment;
        }
    }

    /// The generic dot-segment rule cannot tell a function-index immediate
    /// from a value type token, so `call` and `ref.func` are patched by hand.
    fn apply_overrides(&mut self) {
        for entry in self.ops.values_mut() {
            if entry.name == "call" || entry.name == "ref.func" {
                entry.operand = ValueType::Func;
            }
        }
    }

    fn finish(&mut self) -> InstrTable {
        let mut ops = std::mem::take(&mut self.ops);
        let entries = std::array::from_fn(|i| ops.remove(&(i as u8)).unwrap_or_default());

        InstrTable {
            entries: Box::new(entries),
        }
    }
}

fn parse_opcode(value: &str) -> Option<u8> {
    u8::from_str_radix(value, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(ToString::to_string).collect()
    }

    fn build(src: &[&str]) -> InstrTable {
        TableBuilder::new().build(&lines(src))
    }

    #[test]
    fn table_is_dense_and_ordered() {
        let table = build(&["000000: 00                       ; unreachable"]);
        let opcodes: Vec<u8> = table.iter().map(|(op, _)| op).collect();
        assert_eq!(opcodes.len(), 256);
        assert!(opcodes.iter().tuple_windows().all(|(a, b)| a < b));
        assert_eq!(table.get(0x00).name, "unreachable");
        // everything else is the placeholder
        assert_eq!(table.get(0x01), &InstrInfo::default());
        assert_eq!(table.get(0xff), &InstrInfo::default());
    }

    #[test]
    fn ref_func_end_to_end() {
        let table = build(&[
            "0001973: d2                                        ; ref.func",
            "0001973: 00                                        ; function index",
        ]);
        let entry = table.get(0xd2);
        assert_eq!(entry.name, "ref.func");
        assert!(entry.has_immediate);
        assert!(!entry.takes_alignment);
        assert_eq!(entry.result, ValueType::Void);
        assert_eq!(entry.operand, ValueType::Func);
    }

    #[test]
    fn call_operand_is_forced_to_func() {
        let table = build(&[
            "000100: 10                       ; call",
            "000101: 02                       ; function index",
        ]);
        let entry = table.get(0x10);
        assert_eq!(entry.name, "call");
        assert!(entry.has_immediate);
        assert_eq!(entry.operand, ValueType::Func);
    }

    #[test]
    fn load_alignment_sequence() {
        let table = build(&[
            "000019: 28                       ; i32.load",
            "00001a: 02                       ; alignment",
            "00001b: 00                       ; load offset",
        ]);
        let entry = table.get(0x28);
        assert_eq!(entry.name, "i32.load");
        assert!(entry.has_immediate);
        assert!(entry.takes_alignment);
        assert_eq!(entry.result, ValueType::I32);
        // the `load` segment is a width, not an operand type
        assert_eq!(entry.operand, ValueType::Void);
    }

    #[test]
    fn flags_survive_re_registration() {
        let table = build(&[
            "000020: 41                       ; i32.const",
            "000021: 2a                       ; i32 literal",
            // the same opcode shows up again without immediates in tow
            "000030: 41                       ; i32.const",
        ]);
        let entry = table.get(0x41);
        assert_eq!(entry.name, "i32.const");
        assert!(entry.has_immediate, "flag must stay set across occurrences");
    }

    #[test]
    fn later_definition_wins_for_name_and_types() {
        let table = build(&[
            "000020: 41                       ; i32.const",
            "000030: 41                       ; f64.const",
        ]);
        let entry = table.get(0x41);
        assert_eq!(entry.name, "f64.const");
        assert_eq!(entry.result, ValueType::F64);
    }

    #[test]
    fn orphan_detail_at_start_of_input() {
        // backward scan runs past the start: the detail is dropped
        let table = build(&["000000: 05                       ; function index"]);
        assert_eq!(table.get(0x05), &InstrInfo::default());
    }

    #[test]
    fn orphan_detail_behind_unclassifiable_line() {
        let table = build(&[
            "; section boundary",
            "000001: 07                       ; some immediate",
        ]);
        assert!(table.iter().all(|(_, e)| e == &InstrInfo::default()));
    }

    #[test]
    fn unregistered_owner_is_dropped() {
        // br_table shape: the owner line classifies but was never registered
        // as an instruction (multi-byte value), so nothing is updated.
        let table = build(&[
            "000040: 0e 02                    ; br_table",
            "000041: 00                       ; branch target",
        ]);
        assert_eq!(table.get(0x0e), &InstrInfo::default());
    }

    #[test]
    fn alignment_flag_needs_a_detail_after_the_alignment_line() {
        // the alignment flag is only recorded once a later detail line walks
        // back over the alignment label
        let table = build(&[
            "000019: 2a                       ; f32.load",
            "00001a: 02                       ; alignment",
        ]);
        let entry = table.get(0x2a);
        // the alignment line itself lands directly on the opcode line
        assert!(entry.has_immediate);
        assert!(!entry.takes_alignment);
    }

    #[test]
    fn build_is_idempotent() {
        let src = [
            "000000: 00                       ; unreachable",
            "000019: 28                       ; i32.load",
            "00001a: 02                       ; alignment",
            "00001b: 00                       ; load offset",
            "000100: 10                       ; call",
            "000101: 02                       ; function index",
            "junk line",
        ];
        let first = build(&src);
        let second = build(&src);
        assert_eq!(first, second);
    }
}
