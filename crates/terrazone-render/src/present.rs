//! Showing saved figures to the user.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{info, warn};

/// Presents a saved figure. Failures are logged, never returned.
pub trait Presenter {
    fn present(&self, path: &Path);
}

/// Does not display anything; logs where the figure was written.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Presenter for Headless {
    fn present(&self, path: &Path) {
        info!("Figure available at {}", path.display());
    }
}

/// Opens figures with the platform's default viewer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemViewer;

impl SystemViewer {
    fn command(path: &Path) -> Command {
        if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(path);
            cmd
        } else {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }

    /// True when a graphical session is likely available.
    pub fn display_available() -> bool {
        if cfg!(any(target_os = "macos", target_os = "windows")) {
            return true;
        }
        std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
    }
}

impl Presenter for SystemViewer {
    fn present(&self, path: &Path) {
        if !Self::display_available() {
            warn!(
                "No display available, not showing {} (figure was saved)",
                path.display()
            );
            return;
        }

        match spawn_detached(Self::command(path)) {
            Ok(pid) => info!(
                "Opened {} in the system viewer (pid {}, detached)",
                path.display(),
                pid
            ),
            Err(e) => warn!("Could not open {}: {}", path.display(), e),
        }
    }
}

/// Start `cmd` with null stdio and return its pid.
///
/// The viewer outlives the run, so the child handle is dropped without
/// waiting on it.
fn spawn_detached(mut cmd: Command) -> std::io::Result<u32> {
    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(child.id())
}

/// Presenter for the `show` setting.
pub fn presenter(show: bool) -> Box<dyn Presenter> {
    if show {
        Box::new(SystemViewer)
    } else {
        Box::new(Headless)
    }
}
