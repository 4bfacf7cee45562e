//! Barcode scanner bridge.
//!
//! Runs an external decoder (for example `zbarcam --raw`) and reports the
//! first code it prints. The decoder is killed when the scanner stops.

use crate::event::Event;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Events reported by a running scan session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerEvent {
  /// A code was decoded
  Detected { session: u64, code: String },
  /// The decoder failed or exited without producing a code
  Failed { session: u64, message: String },
}

#[derive(Debug, Error)]
pub enum ScanError {
  #[error("no scanner command configured")]
  NotConfigured,
  #[error("failed to start scanner `{program}`: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },
}

/// Handle to the external decoder process.
#[derive(Debug, Default)]
pub struct Scanner {
  command: Vec<String>,
  task: Option<JoinHandle<()>>,
  session: u64,
}

impl Scanner {
  pub fn new(command: Vec<String>) -> Self {
    Self {
      command,
      task: None,
      session: 0,
    }
  }

  /// Whether an external decoder is configured.
  pub fn is_external(&self) -> bool {
    !self.command.is_empty()
  }

  pub fn is_running(&self) -> bool {
    self.task.is_some()
  }

  /// Whether an event belongs to the session that is currently running.
  pub fn is_current(&self, event: &ScannerEvent) -> bool {
    let session = match event {
      ScannerEvent::Detected { session, .. } | ScannerEvent::Failed { session, .. } => *session,
    };
    self.is_running() && session == self.session
  }

  /// Start the decoder. Any previous session is stopped first.
  pub fn start(&mut self, tx: mpsc::UnboundedSender<Event>) -> Result<(), ScanError> {
    self.stop();

    let (program, args) = self.command.split_first().ok_or(ScanError::NotConfigured)?;
    let mut child = Command::new(program)
      .args(args)
      .stdin(std::process::Stdio::null())
      .stdout(std::process::Stdio::piped())
      .stderr(std::process::Stdio::null())
      .kill_on_drop(true)
      .spawn()
      .map_err(|source| ScanError::Spawn {
        program: program.clone(),
        source,
      })?;

    self.session += 1;
    let session = self.session;
    info!(session, program = %program, "scanner started");

    let stdout = child.stdout.take();
    self.task = Some(tokio::spawn(async move {
      // The child lives in this task; aborting the task kills it.
      let _child = child;
      let event = match stdout {
        Some(stdout) => read_first_code(stdout, session).await,
        None => ScannerEvent::Failed {
          session,
          message: "scanner has no output stream".to_string(),
        },
      };
      let _ = tx.send(Event::Scanner(event));
    }));

    Ok(())
  }

  /// Stop the decoder. Safe to call when nothing is running.
  pub fn stop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
      debug!(session = self.session, "scanner stopped");
    }
  }
}

impl Drop for Scanner {
  fn drop(&mut self) {
    self.stop();
  }
}

async fn read_first_code(stdout: tokio::process::ChildStdout, session: u64) -> ScannerEvent {
  let mut lines = BufReader::new(stdout).lines();
  loop {
    match lines.next_line().await {
      Ok(Some(line)) => {
        let code = normalize_code(&line);
        if !code.is_empty() {
          return ScannerEvent::Detected { session, code };
        }
      }
      Ok(None) => {
        return ScannerEvent::Failed {
          session,
          message: "scanner exited without reading a code".to_string(),
        }
      }
      Err(e) => {
        warn!(session, error = %e, "failed to read scanner output");
        return ScannerEvent::Failed {
          session,
          message: format!("failed to read scanner output: {}", e),
        };
      }
    }
  }
}

/// Decoders such as zbar prefix the symbology (`EAN-13:0123...`) unless
/// run with `--raw`; keep only the payload.
pub fn normalize_code(line: &str) -> String {
  let line = line.trim();
  match line.split_once(':') {
    Some((kind, payload))
      if !kind.is_empty()
        && kind
          .chars()
          .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_') =>
    {
      payload.trim().to_string()
    }
    _ => line.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  fn sh(script: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), script.to_string()]
  }

  async fn next_scanner_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> ScannerEvent {
    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
      .await
      .expect("scanner did not report in time")
      .expect("channel closed");
    match event {
      Event::Scanner(e) => e,
      other => panic!("unexpected event {:?}", other),
    }
  }

  #[test]
  fn test_normalize_code() {
    assert_eq!(normalize_code("  7501234567890 \r"), "7501234567890");
    assert_eq!(normalize_code("EAN-13:7501234567890"), "7501234567890");
    assert_eq!(normalize_code("QR-Code:http://x"), "QR-Code:http://x");
  }

  #[test]
  fn test_not_configured() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut scanner = Scanner::new(Vec::new());
    assert!(!scanner.is_external());
    assert!(matches!(scanner.start(tx), Err(ScanError::NotConfigured)));
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn test_reports_first_code() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scanner = Scanner::new(sh("echo; echo ABC123; echo XYZ"));
    scanner.start(tx).unwrap();

    let event = next_scanner_event(&mut rx).await;
    assert!(scanner.is_current(&event));
    assert_eq!(
      event,
      ScannerEvent::Detected {
        session: 1,
        code: "ABC123".to_string()
      }
    );

    scanner.stop();
    scanner.stop();
    assert!(!scanner.is_running());
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn test_exit_without_code_fails() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scanner = Scanner::new(sh("exit 0"));
    scanner.start(tx).unwrap();

    let event = next_scanner_event(&mut rx).await;
    assert!(matches!(event, ScannerEvent::Failed { session: 1, .. }));
  }

  #[tokio::test]
  async fn test_missing_program_fails_to_start() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut scanner = Scanner::new(vec!["stockr-no-such-decoder".to_string()]);
    assert!(matches!(scanner.start(tx), Err(ScanError::Spawn { .. })));
    assert!(!scanner.is_running());
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn test_stale_session_is_not_current() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scanner = Scanner::new(sh("echo FIRST"));
    scanner.start(tx.clone()).unwrap();
    let first = next_scanner_event(&mut rx).await;

    scanner.start(tx).unwrap();
    assert!(!scanner.is_current(&first));
    scanner.stop();
  }
}
