// Xene: table-driven interpreter and test-case grader

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use xene::grader::{self, GraderConfig, Request};
use xene::interpreter::constants::{DEFAULT_TIMEOUT, INPUT_TIMEOUT};
use xene::interpreter::Context;
use xene::memory::value::Value;
use xene::parser;
use xene::ui::App;

/// Options shared by the subcommands
struct Options {
    input: Option<String>,
    timeout: Duration,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("xene");

    let (Some(command), Some(target)) = (args.get(1), args.get(2)) else {
        usage(program_name);
        std::process::exit(1);
    };

    let options = match parse_options(&args[3..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            usage(program_name);
            std::process::exit(1);
        }
    };

    match command.as_str() {
        "run" => run(target, &options),
        "tokens" => list_tokens(target),
        "grade" => grade(target, &options),
        "view" => view(target, &options),
        other => {
            eprintln!("Error: Unknown command '{}'", other);
            usage(program_name);
            std::process::exit(1);
        }
    }
}

fn usage(program_name: &str) {
    eprintln!("Usage:");
    eprintln!(
        "  {} run <file> [--input <expr>] [--timeout-ms <n>]   # Run a program",
        program_name
    );
    eprintln!(
        "  {} tokens <file>                                    # List the program's tokens",
        program_name
    );
    eprintln!(
        "  {} grade <request.json | ->                         # Grade a JSON request",
        program_name
    );
    eprintln!(
        "  {} view <file> [--timeout-ms <n>]                   # Open the viewer",
        program_name
    );
}

fn parse_options(rest: &[String]) -> Result<Options, String> {
    let mut options = Options {
        input: None,
        timeout: DEFAULT_TIMEOUT,
    };
    let mut iter = rest.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("Missing value for '{}'", flag))?;
        match flag.as_str() {
            "--input" => options.input = Some(value.clone()),
            "--timeout-ms" => {
                let ms: u64 = value
                    .parse()
                    .map_err(|_| format!("Invalid timeout '{}'", value))?;
                options.timeout = Duration::from_millis(ms);
            }
            other => return Err(format!("Unknown option '{}'", other)),
        }
    }
    Ok(options)
}

fn read_source(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    if !Path::new(path).exists() {
        eprintln!("Error: File '{}' not found", path);
        std::process::exit(1);
    }
    Ok(fs::read_to_string(path)?)
}

fn run(path: &str, options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(path)?;

    eprintln!("Parsing {}...", path);
    let program = match parser::parse(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Parser error: {}", e);
            std::process::exit(1);
        }
    };

    let input = match &options.input {
        None => Value::Int(0),
        Some(text) => match eval_input(text) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("Input error: {}", e);
                std::process::exit(1);
            }
        },
    };

    eprintln!("Executing program...");
    let mut ctx = Context::new(options.timeout);
    ctx.set_input(input);
    match ctx.call_rendered(&program, Vec::new(), true) {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            std::process::exit(1);
        }
    }
}

fn eval_input(text: &str) -> Result<Value, xene::Error> {
    let code = parser::parse(text)?;
    Ok(Context::new(INPUT_TIMEOUT).call(&code, Vec::new())?)
}

fn list_tokens(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(path)?;
    let program = match parser::parse(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Parser error: {}", e);
            std::process::exit(1);
        }
    };

    let mut count = 0;
    if let Some(callable) = program.as_callable() {
        for token in parser::tokens(callable) {
            println!(
                "{}\t{}\t{}\t{}:{}",
                token.lit,
                token.kind.name(),
                token.pos.offset,
                token.pos.line,
                token.pos.column
            );
            count += 1;
        }
    }
    eprintln!("Total tokens collected: {}", count);
    Ok(())
}

fn grade(path: &str, options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let body = read_source(path)?;
    let request: Request = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: Invalid request body: {}", e);
            std::process::exit(1);
        }
    };

    let config = GraderConfig {
        program_timeout: options.timeout,
        ..GraderConfig::default()
    };

    eprintln!("Processing code: {}", request.code);
    let response = grader::interpret(&request, &config);
    if response.success {
        eprintln!("Total tokens collected: {}", response.tokens.len());
        let cases = response
            .test_case_result
            .iter()
            .chain(&response.hidden_test_case_result);
        for (i, result) in cases.enumerate() {
            if result.result {
                eprintln!("Case {}: passed", i + 1);
            } else {
                eprintln!("Case {}: failed: {}", i + 1, result.message);
            }
        }
    } else {
        eprintln!("{}", response.message);
    }

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

fn view(path: &str, options: &Options) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(path)?;

    eprintln!("Running {}...", path);
    let mut app = App::load(&source, options.timeout);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
