//! Process execution for `yt-dlp`.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use ytdlm_core::FetchError;

use super::protocol::PRINT_TEMPLATE;

/// Format selector: best video plus best audio, or the best single file.
pub const FORMAT_SELECTOR: &str = "bestvideo+bestaudio/best";

/// Output template relative to the target directory.
pub const OUTPUT_TEMPLATE: &str = "%(extractor)s/%(title)s.%(ext)s";

/// Stderr tail kept in error messages.
const STDERR_TAIL_LINES: usize = 20;

/// Build the argument list for one download.
pub fn build_args(url: &str, target_dir: &Path) -> Vec<OsString> {
    let output = target_dir.join(OUTPUT_TEMPLATE);
    vec![
        "-f".into(),
        FORMAT_SELECTOR.into(),
        "-o".into(),
        output.into_os_string(),
        "--embed-metadata".into(),
        "--no-progress".into(),
        "--quiet".into(),
        "--no-simulate".into(),
        "--print".into(),
        PRINT_TEMPLATE.into(),
        // Everything after this is a URL, even if it starts with '-'.
        "--".into(),
        url.into(),
    ]
}

/// Run `program` with `args` and return its stdout on success.
pub async fn run(program: &Path, args: &[OsString]) -> Result<String, FetchError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // A terminal Ctrl-C goes to the foreground group only; the daemon
    // decides when the child may stop.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => FetchError::NotInstalled(program.display().to_string()),
        _ => FetchError::Spawn(format!("{}: {e}", program.display())),
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| FetchError::Io("Missing stdout".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| FetchError::Io("Missing stderr".to_string()))?;

    let mut stderr_reader = BufReader::new(stderr);
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Err(e) = stderr_reader.read_to_end(&mut buf).await {
            tracing::debug!(error = %e, "Failed to read yt-dlp stderr");
        }
        buf
    });

    let mut captured = String::new();
    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| FetchError::Io(e.to_string()))?
    {
        tracing::trace!(target: "ytdlm::ytdlp", "{line}");
        captured.push_str(&line);
        captured.push('\n');
    }

    let status = child
        .wait()
        .await
        .map_err(|e| FetchError::Io(e.to_string()))?;

    let stderr_buf = stderr_task.await.unwrap_or_default();
    let stderr_text = String::from_utf8_lossy(&stderr_buf);

    if !status.success() {
        return Err(FetchError::Failed {
            exit_code: status.code(),
            stderr: tail(&stderr_text, STDERR_TAIL_LINES),
        });
    }

    if !stderr_text.trim().is_empty() {
        tracing::debug!(stderr = %tail(&stderr_text, STDERR_TAIL_LINES), "yt-dlp warnings");
    }

    Ok(captured)
}

fn tail(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
