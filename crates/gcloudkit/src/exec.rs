//! External command helpers.
//!
//! Two variants: [`run_streaming`] shows the tool's output live (used for
//! mutations the operator should watch) and [`run_captured`] returns stdout
//! (used for read-only queries). Both keep stderr so failures can be
//! classified.

use crate::error::{Error, Result};
use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;

/// Render a command line for logs and error messages.
pub fn display_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

fn spawn_failed(command: &str, err: &std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        return Error::GcloudNotFound;
    }
    Error::CommandFailed {
        command: command.to_string(),
        stderr: format!("failed to execute: {err}"),
    }
}

fn check(command: &str, output: &Output, subject: Option<&str>) -> Result<()> {
    check_status(command, output.status, &output.stderr, subject)
}

fn check_status(
    command: &str,
    status: ExitStatus,
    stderr: &[u8],
    subject: Option<&str>,
) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(stderr);
    Err(Error::from_gcloud_output(command, &stderr, subject))
}

/// Copy `source` to `sink` as it arrives, returning everything read.
///
/// gcloud prints progress on stderr, often as `\r`-terminated updates, so
/// chunks are forwarded without waiting for a newline. If the sink fails the
/// copy continues into the buffer only, so the child never blocks on a full
/// pipe.
fn tee(mut source: impl Read, mut sink: impl Write) -> io::Result<Vec<u8>> {
    let mut captured = Vec::new();
    let mut buf = [0u8; 4096];
    let mut echo = true;
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        captured.extend_from_slice(&buf[..n]);
        if echo && let Err(e) = sink.write_all(&buf[..n]).and_then(|()| sink.flush()) {
            log::debug!("Stopped echoing command stderr: {e}");
            echo = false;
        }
    }
    Ok(captured)
}

/// Run a command with stdout inherited and stderr teed.
///
/// stderr is echoed to the terminal as it arrives and captured for
/// classification.
pub fn run_streaming(program: &str, args: &[&str], subject: Option<&str>) -> Result<()> {
    let command = display_command(program, args);
    log::info!("Executing: {command}");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_failed(&command, &e))?;

    let reader = child
        .stderr
        .take()
        .map(|pipe| thread::spawn(move || tee(pipe, io::stderr())));

    let status = child.wait()?;
    let stderr = match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| Error::Other(format!("stderr reader for '{command}' panicked")))??,
        None => Vec::new(),
    };

    check_status(&command, status, &stderr, subject)?;
    log::info!("Command finished successfully.");
    Ok(())
}

/// Run a command and return its trimmed stdout.
pub fn run_captured(program: &str, args: &[&str], subject: Option<&str>) -> Result<String> {
    let command = display_command(program, args);
    log::debug!("Querying: {command}");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_failed(&command, &e))?;

    check(&command, &output, subject)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        assert_eq!(display_command("gcloud", &[]), "gcloud");
        assert_eq!(
            display_command("gcloud", &["config", "set", "project", "p1"]),
            "gcloud config set project p1"
        );
    }

    #[test]
    fn test_missing_program_maps_to_gcloud_not_found() {
        let err = run_captured("gcpboot-definitely-missing-binary", &["--version"], None)
            .unwrap_err();
        assert!(matches!(err, Error::GcloudNotFound));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captured_trims_stdout() {
        let out = run_captured("sh", &["-c", "printf '  value\\n\\n'"], None).unwrap();
        assert_eq!(out, "value");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captured_classifies_stderr() {
        let err = run_captured(
            "sh",
            &["-c", "echo 'ERROR: NOT_FOUND: nope' >&2; exit 1"],
            Some("gs://b"),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_streaming_classifies_conflict() {
        let err = run_streaming(
            "sh",
            &["-c", "echo 'ALREADY_EXISTS: bucket' >&2; exit 1"],
            Some("gs://b"),
        )
        .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_tee_forwards_and_captures() {
        let input = "Create in progress for [projects/acme].\rWaiting for operation...done.\n";
        let mut echoed = Vec::new();
        let captured = tee(input.as_bytes(), &mut echoed).unwrap();
        assert_eq!(captured, input.as_bytes());
        assert_eq!(echoed, input.as_bytes());
    }

    #[test]
    fn test_tee_keeps_capturing_after_sink_fails() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let input = vec![b'x'; 10_000];
        let captured = tee(input.as_slice(), Broken).unwrap();
        assert_eq!(captured.len(), 10_000);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_streaming_classifies_after_noisy_stderr() {
        // More than a pipe buffer of progress output before the failure
        let script = "i=0; while [ $i -lt 2000 ]; do echo 'Waiting for operation to complete...' >&2; i=$((i+1)); done; echo 'ERROR: ALREADY_EXISTS: bucket' >&2; exit 1";
        let err = run_streaming("sh", &["-c", script], Some("gs://b")).unwrap_err();
        assert!(err.is_conflict());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_streaming_success() {
        assert!(run_streaming("sh", &["-c", "exit 0"], None).is_ok());
    }
}
