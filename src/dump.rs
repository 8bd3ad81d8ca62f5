//! Raw disassembly acquisition.
//!
//! The scraper does not decode WASM bytes itself. It runs the external
//! `wat2wasm` compiler in verbose mode and reads the annotated dump the
//! compiler prints to stderr. Because compiling every input on every run is
//! slow, the raw lines of each input are cached next to it as
//! `<input>.cache` and reused on later runs.
use itertools::Itertools;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("cannot run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` produced non-UTF-8 output")]
    Encoding { command: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// How to obtain disassembly for an input file.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    /// Path to the `wat2wasm` binary.
    pub wat2wasm: PathBuf,
    /// Read and write `<input>.cache` files.
    pub use_cache: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            wat2wasm: PathBuf::from("wat2wasm"),
            use_cache: true,
        }
    }
}

/// Keeps only the per-function sections of a verbose dump.
///
/// `wat2wasm -v` separates sections with `"\n; function "` markers. The
/// preamble before the first marker and the last two sections (data segments
/// and trailing diagnostics) carry no instruction records and are cut off.
pub fn function_sections(stderr: &str) -> Vec<String> {
    let sections: Vec<&str> = stderr.split("\n; function ").collect();
    if sections.len() < 3 {
        return Vec::new();
    }

    sections[1..sections.len() - 2]
        .join("\n")
        .lines()
        .map(ToString::to_string)
        .collect()
}

/// Runs `wat2wasm -v` on one input and returns the scraped lines.
pub fn disassemble(path: &Path, opts: &DumpOptions) -> Result<Vec<String>, DumpError> {
    let module = std::env::temp_dir().join("optable.wasm");
    let command = opts.wat2wasm.display().to_string();

    let output = Command::new(&opts.wat2wasm)
        .arg(path)
        .arg("-v")
        .arg(format!("--output={}", module.display()))
        .output()
        .map_err(|source| DumpError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        // The verbose dump lands on stderr either way; a failed compile just
        // yields fewer (or no) function sections.
        eprintln!("warning: `{}` exited with {} for {}", command, output.status, path.display());
    }

    let stderr = String::from_utf8(output.stderr)
        .map_err(|_| DumpError::Encoding { command })?;

    Ok(function_sections(&stderr))
}

fn cache_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".cache");
    PathBuf::from(name)
}

/// Disassembly lines for one input, via the cache when possible.
pub fn lines_for_file(path: &Path, opts: &DumpOptions) -> Result<Vec<String>, DumpError> {
    let cache = cache_path(path);
    if opts.use_cache && cache.is_file() {
        let text = fs::read_to_string(&cache)?;
        return Ok(text.lines().map(ToString::to_string).collect());
    }

    let lines = disassemble(path, opts)?;
    if opts.use_cache {
        fs::write(&cache, lines.iter().join("\n"))?;
    }

    Ok(lines)
}

fn discover(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), DumpError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            discover(&path, found)?;
        } else if path.extension().map_or(false, |ext| ext == "wat") {
            found.push(path);
        }
    }

    Ok(())
}

/// Gathers the disassembly of every input, in path order.
///
/// Directories are walked recursively for `.wat` files; plain files are taken
/// as they are. The files are sorted before disassembly so the concatenated
/// line sequence (and with it the derived table) does not depend on
/// directory iteration order.
pub fn collect_lines(inputs: &[PathBuf], opts: &DumpOptions) -> Result<Vec<String>, DumpError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            discover(input, &mut files)?;
        } else {
            files.push(input.clone());
        }
    }
    files.sort();

    let mut lines = Vec::new();
    for file in &files {
        eprintln!("disassembling {}", file.display());
        lines.extend(lines_for_file(file, opts)?);
    }

    Ok(lines)
}
