//! External Command Annotator
//!
//! Runs an external program as the annotator:
//!
//! ```text
//! caption text --stdin--> [program args...] --stdout--> AnnotatedDocument JSON
//! ```
//!
//! A non-zero exit status is reported with the program's stderr.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::core::annotations::provider::{ensure_document_matches, Annotator};
use crate::core::annotations::AnnotatedDocument;
use crate::core::process::configure_std_command;
use crate::core::{CoreError, CoreResult};

/// Annotator backed by an external process
pub struct CommandAnnotator {
    program: String,
    args: Vec<String>,
}

impl CommandAnnotator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds an annotator from a whitespace-separated command line.
    ///
    /// No shell quoting is interpreted.
    pub fn from_command_line(command_line: &str) -> CoreResult<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            CoreError::ValidationError("Annotator command is empty".to_string())
        })?;
        Ok(Self::new(program, parts.collect()))
    }

    /// Program being run
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Annotator for CommandAnnotator {
    fn name(&self) -> &str {
        &self.program
    }

    fn annotate(&self, text: &str) -> CoreResult<AnnotatedDocument> {
        info!("Running annotator {}", self.program);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        configure_std_command(&mut cmd);

        let mut child = cmd.spawn().map_err(|e| {
            CoreError::AnnotatorFailed(format!("Failed to start {}: {}", self.program, e))
        })?;

        // stdin is written while stdout drains; large inputs deadlock otherwise
        let stdin = child.stdin.take();
        let input = text.to_string();
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });

        let output = child.wait_with_output().map_err(|e| {
            CoreError::AnnotatorFailed(format!("Failed to wait for {}: {}", self.program, e))
        })?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Annotator {} closed stdin early: {}", self.program, e),
            Err(_) => debug!("Annotator {} stdin writer panicked", self.program),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::AnnotatorFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let doc: AnnotatedDocument = serde_json::from_slice(&output.stdout).map_err(|e| {
            CoreError::AnnotatorFailed(format!("{} produced invalid JSON: {}", self.program, e))
        })?;
        doc.validate()?;
        ensure_document_matches(self.name(), &doc, text)?;

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_line() {
        let annotator = CommandAnnotator::from_command_line("  python annotate.py --model sm ").unwrap();
        assert_eq!(annotator.program(), "python");
        assert_eq!(annotator.args, vec!["annotate.py", "--model", "sm"]);
        assert!(CommandAnnotator::from_command_line("   ").is_err());
    }

    #[test]
    fn test_missing_program() {
        let annotator = CommandAnnotator::new("cuecards-no-such-annotator", vec![]);
        let result = annotator.annotate("hi");
        assert!(matches!(result, Err(CoreError::AnnotatorFailed(_))));
    }

    #[cfg(unix)]
    fn sh(script: &str) -> CommandAnnotator {
        CommandAnnotator::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_document_from_stdout() {
        let annotator = sh(
            r#"cat > /dev/null; printf '%s' '{"tokens":[{"text":"hi","head":0,"sent":0,"whitespace":false}],"sentences":[{"start":0,"end":1}]}'"#,
        );

        let doc = annotator.annotate("hi").unwrap();
        assert_eq!(doc.text(), "hi");
        assert_eq!(annotator.name(), "sh");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_annotator_failure() {
        let annotator = sh("cat > /dev/null; echo boom >&2; exit 3");

        let err = annotator.annotate("hi").unwrap_err();
        assert!(matches!(err, CoreError::AnnotatorFailed(msg) if msg.contains("boom")));
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_json_is_annotator_failure() {
        let annotator = sh("cat > /dev/null; echo not-json");
        assert!(matches!(
            annotator.annotate("hi"),
            Err(CoreError::AnnotatorFailed(_))
        ));
    }
}
