use chrono::Utc;
use uuid::Uuid;

/// Per-invocation suffix shared by the script name and, when isolated, the
/// environment file name: `<unix-millis>-<8 hex>`.
///
/// The millisecond timestamp keeps names sortable; the random part keeps two
/// invocations in the same millisecond apart.
pub fn invocation_suffix() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &random[..8])
}

/// Join a directory inside the container with a file name.
pub(crate) fn remote_join(dir: &str, file_name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), file_name)
}

/// Generated bash script run inside the container.
///
/// `workdir` and `commands` are spliced into the script verbatim. They are
/// trusted input: no quoting or validation is applied, so `commands` may hold
/// any number of lines and shell constructs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandScript {
    pub name: String,
    pub remote_path: String,
    pub env_path: String,
    pub workdir: String,
    pub commands: String,
}

impl CommandScript {
    pub fn new(
        remote_tmp: &str,
        suffix: &str,
        env_path: impl Into<String>,
        workdir: impl Into<String>,
        commands: impl Into<String>,
    ) -> Self {
        let name = format!("script-{}.sh", suffix);
        Self {
            remote_path: remote_join(remote_tmp, &name),
            name,
            env_path: env_path.into(),
            workdir: workdir.into(),
            commands: commands.into(),
        }
    }

    /// The script deletes itself first, so it is gone from the container even
    /// when the user's commands fail.
    pub fn render(&self) -> String {
        format!(
            "#!/bin/bash\nrm -f {}\nsource {}\ncd {}\n{}\n",
            self.remote_path, self.env_path, self.workdir, self.commands
        )
    }
}
