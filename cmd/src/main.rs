use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use pretty_env_logger::env_logger::Env;

/// Minimal class-file loader, disassembler, and bytecode interpreter.
///
/// The positional `mode` argument is literally `-display` or `-run` (spec
/// §6), not a `--flag`; `allow_hyphen_values` keeps clap's matcher from
/// trying to parse it as an option.
#[derive(Parser, Debug)]
#[clap(name = "embervm", version, about)]
struct Opts {
    #[clap(allow_hyphen_values = true, value_parser = parse_mode)]
    mode: Mode,

    /// Path to the class file to load.
    path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Display,
    Run,
}

fn parse_mode(input: &str) -> Result<Mode, String> {
    match input {
        "-display" => Ok(Mode::Display),
        "-run" => Ok(Mode::Run),
        other => Err(format!("unknown mode {other:?}, expected -display or -run")),
    }
}

fn main() {
    pretty_env_logger::formatted_builder()
        .parse_env(Env::default().default_filter_or("info,vm=debug"))
        .init();
    let opts = Opts::parse();

    log::info!("loading {}", opts.path.display());
    let class = match reader::base::parse(&opts.path) {
        Ok(class) => class,
        Err(err) => {
            log::error!("failed to load class file: {err}");
            exit(1);
        }
    };
    log::info!("loaded class {}", class.class_name());

    match opts.mode {
        Mode::Display => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            if let Err(err) = disasm::disassemble(&mut lock, &class) {
                log::error!("failed to write disassembly: {err}");
                exit(1);
            }
        }
        Mode::Run => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            if let Err(err) = vm::execute(&class, &mut lock) {
                log::error!("execution failed: {err}");
                exit(1);
            }
        }
    }
}
