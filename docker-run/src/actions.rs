//! GitHub Actions workflow-command plumbing: step outputs and error
//! annotations.

use anyhow::{Context, Result};
use std::env;
use std::fs::OpenOptions;
use std::io::Write;

/// Record a step output in the file named by `GITHUB_OUTPUT`. Outside of a
/// workflow the variable is unset and this does nothing.
pub fn set_output(name: &str, value: &str) -> Result<()> {
    let Some(path) = env::var_os("GITHUB_OUTPUT").filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open GITHUB_OUTPUT file {:?}", path))?;
    writeln!(file, "{}={}", name, value)
        .with_context(|| format!("Failed to write output '{}'", name))?;
    Ok(())
}

/// Emit an `::error::` annotation on stdout.
pub fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}

fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn set_output_appends_to_github_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "earlier=1\n").unwrap();
        env::set_var("GITHUB_OUTPUT", &path);

        set_output("status", "success").unwrap();

        env::remove_var("GITHUB_OUTPUT");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "earlier=1\nstatus=success\n"
        );
    }

    #[test]
    #[serial]
    fn set_output_without_github_output_is_noop() {
        env::remove_var("GITHUB_OUTPUT");
        set_output("status", "success").unwrap();
    }

    #[test]
    fn escape_data_encodes_newlines_and_percent() {
        assert_eq!(escape_data("50% done\nnext\r"), "50%25 done%0Anext%0D");
    }

    #[test]
    fn escape_data_leaves_plain_text() {
        assert_eq!(escape_data("Container is not running."), "Container is not running.");
    }
}
