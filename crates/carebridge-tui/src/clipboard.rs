use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Clipboard helpers tried in order: macOS, Wayland, X11
const PROVIDERS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
];

/// Pipe `text` into the first clipboard helper that starts
pub fn copy(text: &str) -> bool {
    PROVIDERS.iter().any(|(program, args)| pipe_to(program, args, text))
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> bool {
    let Ok(mut child) = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    else {
        debug!(program, "Clipboard helper not available");
        return false;
    };

    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()).is_ok(),
        None => false,
    };
    // Dropping stdin above closes the pipe so the helper can exit
    let exited = child.wait().map(|status| status.success()).unwrap_or(false);
    written && exited
}
