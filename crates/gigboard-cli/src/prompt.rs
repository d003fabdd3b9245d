//! Interactive stdin prompts.

use std::io::{self, BufRead, Write};

use gigboard_session::Confirmation;

/// Print `prompt` and read one line from stdin, without its line ending.
pub fn read_line(prompt: &str) -> io::Result<String> {
  print!("{prompt}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

/// `value` if given, otherwise ask on stdin.
pub fn password_or_stdin(value: Option<String>) -> io::Result<String> {
  match value {
    Some(password) => Ok(password),
    None => read_line("Password: "),
  }
}

fn is_yes(answer: &str) -> bool {
  matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Asks `[y/N]` on stdin. Anything but `y`/`yes`, including a read error,
/// counts as no.
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
  fn confirm(&self, prompt: &str) -> bool {
    read_line(&format!("{prompt} [y/N] ")).is_ok_and(|answer| is_yes(&answer))
  }
}

#[cfg(test)]
mod tests {
  use super::is_yes;

  #[test]
  fn only_yes_confirms() {
    assert!(is_yes("y"));
    assert!(is_yes(" YES "));
    assert!(!is_yes(""));
    assert!(!is_yes("n"));
    assert!(!is_yes("yep"));
  }
}
