//! Service launch commands
//!
//! Pure functions from a service config to the argv that starts it.
//! `None` means the service was not requested.

use crate::spec::{JupyterConfig, RStudioConfig};
use serde::Serialize;

/// Conda-managed interpreter
pub const CONDA_PYTHON: &str = "/opt/conda/bin/python3";

/// Interpreter found on `PATH`
pub const SYSTEM_PYTHON: &str = "python3";

/// RStudio server binary
pub const RSERVER_BIN: &str = "/usr/lib/rstudio-server/bin/rserver";

/// Argument vector for launching a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServiceCommand(Vec<String>);

impl ServiceCommand {
    pub fn args(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for ServiceCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// Command starting the Jupyter notebook server
pub fn jupyter_command(
    config: Option<&JupyterConfig>,
    working_dir: &str,
    conda_enabled: bool,
) -> Option<ServiceCommand> {
    let config = config?;

    let python = if conda_enabled {
        CONDA_PYTHON
    } else {
        SYSTEM_PYTHON
    };

    let mut cmd: Vec<String> = [
        python,
        "-m",
        "notebook",
        "--ip",
        "0.0.0.0",
        "--notebook-dir",
        working_dir,
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let password = if config.password.is_empty() {
        "''"
    } else {
        config.password.as_str()
    };
    cmd.extend(
        ["--NotebookApp.password", password, "--NotebookApp.token", "''"].map(String::from),
    );

    if config.port != 0 {
        cmd.push("--port".to_string());
        cmd.push(config.port.to_string());
    }

    Some(ServiceCommand(cmd))
}

/// Command starting RStudio server.
///
/// The server runs as root and always starts in its own default directory.
pub fn rstudio_command(config: Option<&RStudioConfig>) -> Option<ServiceCommand> {
    config.map(|_| ServiceCommand(vec!["sudo".to_string(), RSERVER_BIN.to_string()]))
}
