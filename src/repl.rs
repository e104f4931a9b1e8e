//! Interactive shell: bare command words handled ahead of lexing,
//! brace-counting for multi-line input, a persistent environment, and
//! `repr`-form echo of non-null results.

use std::io::{self, Write};

use log::debug;

use crate::environment::Environment;
use crate::error::{self, KiraError};
use crate::value::Value;

const BANNER: &str = r"
 _  __ ___ ____  _
| |/ /|_ _|  _ \/ \
| ' /  | || |_) / _ \
| . \  | ||  _ / ___ \
|_|\_\|___|_| /_/   \_\

Kira Programming Language
Type 'help' for commands, 'exit' to quit
";

const HELP_TEXT: &str = r"
Kira REPL Commands:
  help     - Show this help message
  exit     - Exit the REPL
  clear    - Clear the screen
  env      - Show all variables in current environment
  reset    - Reset environment (clear all variables)

Language Quick Reference:
  let x = 5              - Declare variable
  const PI = 3.14        - Declare constant
  fn add(a, b) { a + b } - Define function
  if x > 0 { ... }       - Conditional
  while x > 0 { ... }    - While loop
  for i in range(10) { } - For loop
  [1, 2, 3]              - Array literal
  {""a"": 1, ""b"": 2}   - Dictionary literal

Built-in functions:
  print, println, input, len, type, str, int, float,
  range, push, pop, first, last, rest, keys, values,
  abs, min, max, sum, sorted, reversed, join, split,
  upper, lower, strip, replace, contains
";

pub fn run() {
    println!("{BANNER}");

    let mut env = Environment::new();
    let stdin = io::stdin();

    loop {
        print!("kira> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let Some(mut line) = read_line(&stdin) else {
            println!("\nGoodbye!");
            break;
        };

        match line.trim() {
            "" => continue,
            "exit" => {
                println!("Goodbye!");
                break;
            }
            "help" => {
                println!("{HELP_TEXT}");
                continue;
            }
            "clear" => {
                print!("\x1b[2J\x1b[H");
                let _ = io::stdout().flush();
                continue;
            }
            "env" => {
                print_env(&env);
                continue;
            }
            "reset" => {
                env = Environment::new();
                println!("Environment reset.");
                continue;
            }
            _ => {}
        }

        while brace_count(&line) > 0 {
            print!("...   ");
            if io::stdout().flush().is_err() {
                break;
            }
            let Some(next) = read_line(&stdin) else {
                break;
            };
            line.push('\n');
            line.push_str(&next);
        }

        debug!("evaluating REPL input: {line:?}");
        match error::run(&line, &env) {
            Ok(Value::Null) => {}
            Ok(value) => println!("{}", value.to_repr_string()),
            Err(err) => print_error(&err),
        }
    }
}

fn read_line(stdin: &io::Stdin) -> Option<String> {
    let mut buf = String::new();
    match stdin.read_line(&mut buf) {
        Ok(0) => None, // EOF
        Ok(_) => {
            if buf.ends_with('\n') {
                buf.pop();
                if buf.ends_with('\r') {
                    buf.pop();
                }
            }
            Some(buf)
        }
        Err(_) => None,
    }
}

fn brace_count(text: &str) -> i64 {
    let opens = text.matches('{').count() as i64;
    let closes = text.matches('}').count() as i64;
    opens - closes
}

fn print_env(env: &Environment) {
    println!("Variables:");
    for (name, value, is_const) in env.local_bindings() {
        let suffix = if is_const { " (const)" } else { "" };
        println!("  {name}{suffix} = {}", value.to_repr_string());
    }
}

fn print_error(err: &KiraError) {
    let label = match err {
        KiraError::Lexer(_) => "Lexer Error",
        KiraError::Parser(_) => "Parse Error",
        KiraError::Runtime(_) => "Runtime Error",
    };
    let message = match err {
        KiraError::Lexer(e) => e.message.clone(),
        KiraError::Parser(e) => e.message.clone(),
        KiraError::Runtime(e) => e.message.clone(),
    };
    println!("{label}: {message}");
}
