use std::path::{Path, PathBuf};
use std::process::Command;
use anyhow::{bail, Context, Result};
use log::{debug, info};

use iicr_models::SimulatorCommand;

/// Anything that turns an ms command into ms output text.
pub trait CoalescentSimulator: Sync {
    fn run(&self, command: &SimulatorCommand) -> Result<String>;
}

/// Runs `ms` through the shell, from the directory `path2ms`.
#[derive(Debug, Clone)]
pub struct MsSimulator {
    path: PathBuf,
}

impl MsSimulator {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// The shell line executed for `command`.
    pub fn shell_line(&self, command: &SimulatorCommand) -> String {
        if self.path.as_os_str().is_empty() {
            command.to_string()
        } else {
            format!("{}", self.path.join(command.to_string()).display())
        }
    }
}

impl CoalescentSimulator for MsSimulator {
    fn run(&self, command: &SimulatorCommand) -> Result<String> {
        let line = self.shell_line(command);
        info!("Running: {}", line);
        let output = Command::new("sh")
            .arg("-c")
            .arg(&line)
            .output()
            .with_context(|| format!("Failed to spawn '{}'", line))?;
        if !output.status.success() {
            bail!("'{}' exited with {}: {}", line, output.status,
                String::from_utf8_lossy(&output.stderr).trim());
        }
        let stdout = String::from_utf8(output.stdout)
            .with_context(|| format!("Output of '{}' is not UTF-8", line))?;
        debug!("'{}' produced {} bytes", line, stdout.len());
        Ok(stdout)
    }
}

/// Returns the same output for every command.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct CannedSimulator(pub String);

#[cfg(test)]
impl CoalescentSimulator for CannedSimulator {
    fn run(&self, _command: &SimulatorCommand) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_line() {
        let cmd = SimulatorCommand::from("ms 2 10 -T");
        assert_eq!(MsSimulator::new("").shell_line(&cmd), "ms 2 10 -T");
        assert_eq!(MsSimulator::new("/opt/msdir").shell_line(&cmd), "/opt/msdir/ms 2 10 -T");
    }

    #[test]
    fn test_shell_run() {
        let sim = MsSimulator::new("");
        let out = sim.run(&SimulatorCommand::from("echo '(1:0.5,2:0.5);'")).unwrap();
        assert_eq!(out.trim(), "(1:0.5,2:0.5);");
        assert!(sim.run(&SimulatorCommand::from("exit 3")).is_err());
    }

    #[test]
    fn test_canned() {
        let sim = CannedSimulator("time:\t0.3\n".into());
        assert_eq!(sim.run(&SimulatorCommand::from("ms 2 1")).unwrap(), "time:\t0.3\n");
    }
}
