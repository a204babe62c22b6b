use lispcalc::{Config, Interpreter};
use rustyline::error::ReadlineError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: lispcalc [-f FILE | EXPR...]";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_file(cx: &Interpreter, path: &str) -> Result<(), String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("lispcalc: failed to read {}: {}", path, e))?;
    info!(path, "running script");
    cx.eval_str(&source).map(|_| ()).map_err(|e| format!("Error: {}", e))
}

fn repl(cx: &Interpreter, config: &Config) -> Result<(), String> {
    let editor_config = rustyline::Config::builder()
        .max_history_size(config.history_size)
        .map_err(|e| e.to_string())?
        .build();
    let mut rl = rustyline::DefaultEditor::with_config(editor_config).map_err(|e| e.to_string())?;
    if let Some(history) = &config.history_file {
        let _ = rl.load_history(history);
    }

    println!("lisp calculator, try (+ 1 2), (set x 5) or (if (> x 3) \"big\" \"small\")");
    println!("type quit to leave");
    loop {
        match rl.readline(&config.prompt) {
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(format!("Readline err: {:?}", e)),
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() { continue; }
                let _ = rl.add_history_entry(input);
                if input == "quit" || input == "exit" { break; }
                if let Some(result) = cx.calc(input) {
                    println!("{}", result);
                }
            }
        }
    }

    if let Some(history) = &config.history_file {
        if let Err(e) = rl.save_history(history) {
            warn!(error = %e, "couldn't save history");
        }
    }
    Ok(())
}

fn main() -> Result<(), String> {
    init_logging();
    let config = Config::from_env();
    let cx = Interpreter::with_config(config.clone());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => repl(&cx, &config),
        Some("-f") => match args.get(1) {
            Some(path) => {
                if let Err(e) = run_file(&cx, path) {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
                Ok(())
            },
            None => Err(USAGE.to_string()),
        },
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            Ok(())
        },
        Some(_) => {
            if let Some(result) = cx.calc(&args.join(" ")) {
                println!("{}", result);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::run_file;
    use lispcalc::Interpreter;

    fn script(name: &str, source: &str) -> String {
        let path = std::env::temp_dir().join(format!("lispcalc-{}-{}.lisp", name, std::process::id()));
        std::fs::write(&path, source).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_run_file() {
        let cx = Interpreter::new();
        let ok = script("ok", "(set x 2)\n; comment\n(set y (* x 21))\n");
        assert_eq!(run_file(&cx, &ok), Ok(()));
        assert_eq!(cx.calc("y"), Some(format!("42")));

        let bad = script("bad", "(set z 1)\n(+ z undefined)\n");
        assert_eq!(run_file(&cx, &bad), Err(format!("Error: unbound name 'undefined'")));
        let missing = run_file(&cx, "/nonexistent/lispcalc.lisp").unwrap_err();
        assert!(missing.starts_with("lispcalc: failed to read"), "{}", missing);
        let _ = std::fs::remove_file(ok);
        let _ = std::fs::remove_file(bad);
    }
}
