use temper::{compile, render, Store};

use std::{env, fs, process::ExitCode};

fn main() -> ExitCode {
    let mut arguments = env::args().skip(1);
    let path = match arguments.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: temper <template>");
            return ExitCode::FAILURE;
        }
    };

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("error: unable to read `{path}`: {error}");
            return ExitCode::FAILURE;
        }
    };

    let template = match compile(&text) {
        Ok(template) => template,
        Err(error) => {
            eprintln!("{:#}", error.with_name(path.as_str()));
            return ExitCode::FAILURE;
        }
    };

    match render(&template, &Store::new()) {
        Ok(output) => {
            print!("{output}");

            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{:#}", error.with_name(path.as_str()));

            ExitCode::FAILURE
        }
    }
}
