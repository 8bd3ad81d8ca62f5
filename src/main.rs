use optable::dump::{self, DumpOptions};
use optable::emit::Format;
use optable::table::TableBuilder;
use std::env;
use std::io;
use std::io::Read;
use std::path::PathBuf;

fn main() {
    let mut inputs: Vec<PathBuf> = Vec::new();
    let mut format = Format::Rust;
    let mut opts = DumpOptions::default();

    for arg in env::args().skip(1) {
        if let Some(name) = arg.strip_prefix("--format=") {
            format = match Format::parse(name) {
                Some(format) => format,
                None => {
                    eprintln!("Unknown format `{}` (expected rust, json or text)", name);
                    std::process::exit(exitcode::USAGE);
                }
            };
        } else if let Some(path) = arg.strip_prefix("--wat2wasm=") {
            opts.wat2wasm = PathBuf::from(path);
        } else if arg == "--no-cache" {
            opts.use_cache = false;
        } else {
            inputs.push(PathBuf::from(arg));
        }
    }

    // Read input: raw disassembly from STDIN if no paths were given.
    let lines: Vec<String> = if inputs.is_empty() {
        let mut src = String::new();
        let stdin = io::stdin();

        stdin
            .lock()
            .read_to_string(&mut src)
            .expect("Read disassembly");
        src.lines().map(ToString::to_string).collect()
    } else {
        match dump::collect_lines(&inputs, &opts) {
            Err(err) => {
                eprintln!("Disassembly error: {}", err);
                std::process::exit(exitcode::IOERR);
            }
            Ok(lines) => lines,
        }
    };
    eprintln!("scraped {} disassembly lines", lines.len());

    let mut builder = TableBuilder::new();
    let table = builder.build(&lines);

    let mut emitter = format.emitter();
    print!("{}", emitter.emit(&table));
}
