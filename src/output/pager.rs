use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use log::debug;

/// Scoped takeover of standard output. While the session is open all output
/// flows through an interactive pager; `finish` (or `Drop`) closes the pipe
/// and waits for the pager to exit.
///
/// If the pager exits early, the next write hits a broken pipe and the whole
/// process terminates with a non-zero status instead of erroring upward.
pub struct Pager {
    inner: Inner,
}

enum Inner {
    Stdout(io::Stdout),
    Child {
        stdin: Option<ChildStdin>,
        child: Child,
    },
}

impl Pager {
    /// Opens a pager session on stdout. Passes through untouched when stdout
    /// is not a terminal or the resolved pager is the no-op viewer `cat`.
    pub fn open() -> io::Result<Pager> {
        if !io::stdout().is_terminal() {
            return Ok(Pager::passthrough());
        }
        let cmdline = match env::var("PAGER") {
            Ok(v) if !v.is_empty() => v,
            _ => default_pager(),
        };
        if cmdline == "cat" {
            return Ok(Pager::passthrough());
        }
        debug!("Paging output through: {cmdline}");
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&cmdline).stdin(Stdio::piped());
        // Quit-if-one-screen, raw control passthrough, no screen clearing.
        if env::var_os("LESS").is_none() {
            cmd.env("LESS", "FXR");
        }
        if env::var_os("LV").is_none() {
            cmd.env("LV", "-c");
        }
        let mut child = cmd.spawn()?;
        let stdin = child.stdin.take();
        Ok(Pager {
            inner: Inner::Child { stdin, child },
        })
    }

    fn passthrough() -> Pager {
        Pager {
            inner: Inner::Stdout(io::stdout()),
        }
    }

    /// Closes the pipe and waits for the pager to terminate.
    pub fn finish(mut self) -> io::Result<()> {
        if let Inner::Child { stdin, child } = &mut self.inner {
            drop(stdin.take());
            child.wait()?;
        }
        Ok(())
    }
}

impl Write for Pager {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = match &mut self.inner {
            Inner::Stdout(out) => out.write(buf),
            Inner::Child { stdin: Some(w), .. } => w.write(buf),
            Inner::Child { stdin: None, .. } => return Ok(buf.len()),
        };
        match result {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => exit_broken_pipe(self),
            other => other,
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = match &mut self.inner {
            Inner::Stdout(out) => out.flush(),
            Inner::Child { stdin: Some(w), .. } => w.flush(),
            Inner::Child { stdin: None, .. } => Ok(()),
        };
        match result {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => exit_broken_pipe(self),
            other => other,
        }
    }
}

// The pager went away (user pressed `q`). Reap it and leave quietly.
fn exit_broken_pipe(pager: &mut Pager) -> ! {
    if let Inner::Child { stdin, child } = &mut pager.inner {
        drop(stdin.take());
        let _ = child.wait();
    }
    std::process::exit(1);
}

impl Drop for Pager {
    fn drop(&mut self) {
        if let Inner::Child { stdin, child } = &mut self.inner {
            drop(stdin.take());
            let _ = child.wait();
        }
    }
}

/// Debian policy prefers a configured `pager` command; `more` is the
/// POSIX-guaranteed fallback.
fn default_pager() -> String {
    if find_in_path("pager") {
        "pager".to_string()
    } else {
        "more".to_string()
    }
}

fn find_in_path(name: &str) -> bool {
    let Some(path) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&path).any(|dir| is_executable(&dir.join(name)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
