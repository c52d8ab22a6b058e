//! # Environment Probe
//!
//! Runs a tool once with a version-style argument and reports whether it
//! exited cleanly. The probe never fails: a missing executable, a non-zero
//! exit or a timeout all come back as `success: false` with whatever error
//! text was available.

use std::process::Stdio;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::process::Command;

pub const DEFAULT_PROBE_PROGRAM: &str = "dotnet";
pub const DEFAULT_PROBE_ARG: &str = "--version";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// The command line the probe runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCommand {
    pub program: String,
    pub args: Vec<String>,
    /// `None` waits for the child indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ProbeCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROBE_PROGRAM.to_string(),
            args: vec![DEFAULT_PROBE_ARG.to_string()],
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub success: bool,
    /// `None` if the process never started, timed out, or was killed by a signal.
    pub exit_code: Option<i32>,
    pub error_output: String,
}

impl ProbeReport {
    fn failed(error_output: String) -> Self {
        Self {
            success: false,
            exit_code: None,
            error_output,
        }
    }
}

/// Spawns the probe command and waits for it to exit.
///
/// Stdout is captured and discarded; stderr is returned as `error_output`.
pub async fn check_tool(command: &ProbeCommand) -> ProbeReport {
    debug!("Probing `{} {}`", command.program, command.args.join(" "));

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);

    let output = match command.timeout {
        Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Probe `{}` timed out after {:?}", command.program, limit);
                return ProbeReport::failed(format!(
                    "{} did not exit within {:?}",
                    command.program, limit
                ));
            }
        },
        None => cmd.output().await,
    };

    match output {
        Ok(output) => {
            let report = ProbeReport {
                success: output.status.success(),
                exit_code: output.status.code(),
                error_output: String::from_utf8_lossy(&output.stderr).into_owned(),
            };
            info!(
                "Probe `{}` exited with {:?} (success: {})",
                command.program, report.exit_code, report.success
            );
            report
        }
        Err(e) => {
            warn!("Probe `{}` could not be started: {}", command.program, e);
            ProbeReport::failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> ProbeCommand {
        ProbeCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            timeout: None,
        }
    }

    #[test]
    fn test_default_command_is_dotnet_version() {
        let command = ProbeCommand::default();
        assert_eq!(command.program, "dotnet");
        assert_eq!(command.args, vec!["--version".to_string()]);
        assert!(command.timeout.is_none());
    }

    #[tokio::test]
    async fn test_missing_program_reports_failure() {
        let command = ProbeCommand {
            program: "lazydotnet-no-such-tool-7f3a".to_string(),
            args: vec!["--version".to_string()],
            timeout: None,
        };
        let report = check_tool(&command).await;
        assert!(!report.success);
        assert_eq!(report.exit_code, None);
        assert!(!report.error_output.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let report = check_tool(&shell("echo 8.0.100")).await;
        assert!(report.success);
        assert_eq!(report.exit_code, Some(0));
        assert_eq!(report.error_output, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_captures_stderr() {
        let report = check_tool(&shell("echo 'sdk missing' >&2; exit 3")).await;
        assert!(!report.success);
        assert_eq!(report.exit_code, Some(3));
        assert_eq!(report.error_output.trim_end(), "sdk missing");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_reports_failure() {
        let mut command = shell("sleep 5");
        command.timeout = Some(Duration::from_millis(100));
        let report = check_tool(&command).await;
        assert!(!report.success);
        assert!(report.error_output.contains("did not exit"));
    }
}
