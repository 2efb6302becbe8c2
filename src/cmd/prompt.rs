use std::io::{self, Write};

use crate::error::{AppError, AppResult};

/// Asks until the answer is `yes` or `no`.
pub fn confirm(question: &str) -> AppResult<bool> {
    loop {
        match read_line(&format!("{question} [yes, no] ? "))?.as_str() {
            "yes" => return Ok(true),
            "no" => return Ok(false),
            other => println!("Error: '{other}' unknown, please try again"),
        }
    }
}

/// Reads a password without echoing it. The value is kept as typed.
pub fn secret(field: &str) -> AppResult<String> {
    let value = rpassword::prompt_password(format!("{field}: "))?;
    require_secret(field, value)
}

fn require_secret(field: &str, value: String) -> AppResult<String> {
    if value.is_empty() {
        return Err(AppError::Configuration(format!("{field} must not be empty")));
    }
    Ok(value)
}

fn read_line(prompt: &str) -> AppResult<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(AppError::Configuration(
            "standard input closed while waiting for an answer".to_string(),
        ));
    }
    Ok(input.trim().to_string())
}
