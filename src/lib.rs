//! Scrapes WebAssembly instruction metadata out of `wat2wasm -v` verbose
//! disassembly and derives a dense 256-entry opcode table: mnemonic, result
//! and operand value types, and whether the instruction carries an immediate
//! constant or a memory alignment immediate. The table is emitted as a Rust
//! array literal, JSON, or an aligned text listing for an interpreter to
//! consume at start-up.
pub mod dump;
pub mod emit;
pub mod scan;
pub mod table;
pub mod ty;
