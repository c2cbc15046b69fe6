use crate::error::ExecError;
use std::collections::BTreeMap;
use std::env;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Environment variables to re-export inside the container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Snapshot the current process environment. Entries that are not valid
    /// Unicode cannot be written as shell text and are skipped.
    pub fn capture() -> Self {
        let mut vars = BTreeMap::new();
        for (key, value) in env::vars_os() {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => {
                    vars.insert(key, value);
                }
                (Ok(key), Err(_)) => {
                    tracing::warn!(variable = %key, "skipping variable with non-UTF-8 value");
                }
                (Err(key), _) => {
                    tracing::warn!(variable = ?key, "skipping variable with non-UTF-8 name");
                }
            }
        }
        Self { vars }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Render as `export NAME="VALUE"` lines, one per variable, with embedded
    /// double quotes backslash-escaped. Other shell metacharacters (`$`, `` ` ``,
    /// `\`) are left alone and will be expanded when the file is sourced.
    pub fn render(&self) -> String {
        self.vars
            .iter()
            .map(|(key, value)| format!("export {}=\"{}\"", key, escape_value(value)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the rendered snapshot to a fresh `env-*.sh` file in `dir`.
    ///
    /// The file holds every exported value, secrets included, so it is
    /// created owner-only (`0600` on unix). Dropping the handle deletes it.
    pub fn write_to(&self, dir: &Path) -> Result<NamedTempFile, ExecError> {
        let context = || format!("Failed to write environment file in {}", dir.display());
        let mut file = tempfile::Builder::new()
            .prefix("env-")
            .suffix(".sh")
            .tempfile_in(dir)
            .map_err(|err| ExecError::io(context(), err))?;
        file.write_all(self.render().as_bytes())
            .and_then(|()| file.flush())
            .map_err(|err| ExecError::io(context(), err))?;
        Ok(file)
    }
}

fn escape_value(value: &str) -> String {
    value.replace('"', "\\\"")
}
