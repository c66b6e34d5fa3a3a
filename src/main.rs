use std::{
    fs,
    io::{self, BufRead, Read, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{ArgEnum, Parser};
use ll1_course_helper::{Analysis, Grammar, ParseResult};

#[derive(Clone, Copy, PartialEq, Eq, ArgEnum)]
enum OutputFormat {
    Plain,
    Latex,
    Json,
}

/// Compute FIRST/FOLLOW sets, check LL(1) conditions, build the predictive
/// parsing table and parse strings with it.
///
/// Grammar rules are written `A=alt/alt/...`, one left side per line.
/// Uppercase letters are non-terminals, `ε` is the empty string.
#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    /// Grammar file; read from standard input when absent
    grammar: Option<PathBuf>,
    /// Print the productions
    #[clap(long)]
    productions: bool,
    /// Print FIRST and FOLLOW sets
    #[clap(long)]
    sets: bool,
    /// Print the parsing table
    #[clap(long)]
    table: bool,
    /// Print LL(1) conflicts
    #[clap(long)]
    check: bool,
    #[clap(short, long, arg_enum, default_value = "plain")]
    format: OutputFormat,
    /// String to parse; repeatable. Without it and with a grammar file,
    /// strings are read interactively
    #[clap(short, long = "input")]
    inputs: Vec<String>,
}

fn main() -> Result<()> {
    let mut args = Args::parse();
    if !(args.productions || args.sets || args.table || args.check) {
        args.sets = true;
        args.table = true;
        args.check = true;
    }

    let text = match &args.grammar {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read grammar from standard input")?;
            text
        }
    };

    let g = Grammar::parse(&text)?;
    let analysis = g.analyze();
    print_analysis(&args, &g, &analysis)?;

    let interactive = args.inputs.is_empty() && args.grammar.is_some();
    if args.inputs.is_empty() && !interactive {
        return Ok(());
    }
    if !analysis.is_ll1() {
        if !args.check {
            eprintln!("{}", analysis.report.to_plaintext());
        }
        bail!("the grammar is not LL(1); parsing skipped");
    }

    for input in &args.inputs {
        print_parse(args.format, input, &analysis.table.parse(&g, input))?;
    }

    if interactive {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            eprint!("\nEnter a string to parse (or 'exit' to quit): ");
            io::stderr().flush()?;
            let line = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            let input = match session_input(&line) {
                Some(input) => input,
                None => break,
            };
            print_parse(args.format, input, &analysis.table.parse(&g, input))?;
        }
    }

    Ok(())
}

/// One line read by the interactive session, without its line ending.
/// Whitespace is part of the input, as with `-i`.
fn session_input(line: &str) -> Option<&str> {
    let input = line.strip_suffix('\r').unwrap_or(line);
    if input == "exit" {
        None
    } else {
        Some(input)
    }
}

fn print_analysis(args: &Args, g: &Grammar, analysis: &Analysis) -> Result<()> {
    if args.productions {
        let t = g.to_production_output_vec();
        println!(
            "{}",
            match args.format {
                OutputFormat::Plain | OutputFormat::Json => t.to_plaintext(),
                OutputFormat::Latex => t.to_latex(),
            }
        );
    }
    if args.sets {
        let t = g.to_non_terminal_output_vec(&analysis.first, &analysis.follow);
        println!(
            "{}",
            match args.format {
                OutputFormat::Plain => t.to_plaintext(),
                OutputFormat::Latex => t.to_latex(),
                OutputFormat::Json => t.to_json()?,
            }
        );
    }
    if args.table {
        let t = analysis.table.to_output();
        println!(
            "{}",
            match args.format {
                OutputFormat::Plain => t.to_plaintext(),
                OutputFormat::Latex => t.to_latex(),
                OutputFormat::Json => serde_json::to_string(&t)?,
            }
        );
    }
    if args.check {
        match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&analysis.report)?),
            OutputFormat::Plain | OutputFormat::Latex => {
                println!("{}", analysis.report.to_plaintext());
                for collision in analysis.table.collisions() {
                    println!("Overwritten: {}", collision);
                }
                if analysis.is_ll1() {
                    println!("The grammar is LL(1).");
                } else {
                    println!("The grammar is NOT LL(1).");
                }
            }
        }
    }
    Ok(())
}

fn print_parse(format: OutputFormat, input: &str, result: &ParseResult) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    println!("\n--- Parsing: \"{}\" ---\n", input);
    println!("{}", result.trace_to_plaintext());
    match (result.tree(), result.error()) {
        (Some(tree), _) => {
            println!("\nString ACCEPTED!\n");
            println!("{}", tree.to_plaintext());
        }
        (None, Some(error)) => println!("\nString REJECTED: {}", error),
        (None, None) => println!("\nString REJECTED!"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::session_input;
    use pretty_assertions::assert_eq;

    #[test]
    fn session_keeps_whitespace() {
        assert_eq!(session_input(" i + i "), Some(" i + i "));
        assert_eq!(session_input("i+i\r"), Some("i+i"));
        assert_eq!(session_input(""), Some(""));
    }

    #[test]
    fn session_stops_on_exit() {
        assert_eq!(session_input("exit"), None);
        assert_eq!(session_input("exit\r"), None);
        assert_eq!(session_input(" exit"), Some(" exit"));
    }
}
