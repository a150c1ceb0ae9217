//! Image rendering through the Graphviz `dot` executable

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

/// Name of the Graphviz layout executable
pub const DOT_EXECUTABLE: &str = "dot";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("dot executable not found on PATH")]
    NotOnPath(#[source] which::Error),

    #[error("dotPath not found: {}", path.display())]
    DotPathMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("dot executable not found in directory: {}", .0.display())]
    NotInDirectory(PathBuf),

    #[error("failed to start dot: {}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("dot command failed: {output}")]
    Failed { status: ExitStatus, output: String },

    #[error("dot command timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to wait for dot")]
    Wait(#[source] io::Error),
}

/// Locates the `dot` executable.
///
/// `dot_path` may name the executable itself or a directory containing
/// it. When unset or empty, `dot` is looked up on `PATH`.
pub fn find_executable(dot_path: Option<&Path>) -> Result<PathBuf, RenderError> {
    let Some(dot_path) = dot_path.filter(|p| !p.as_os_str().is_empty()) else {
        return which::which(DOT_EXECUTABLE).map_err(RenderError::NotOnPath);
    };

    let metadata = fs::metadata(dot_path).map_err(|source| RenderError::DotPathMissing {
        path: dot_path.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Ok(dot_path.to_path_buf());
    }

    let candidate = dot_path.join(DOT_EXECUTABLE);
    let windows = candidate.with_extension("exe");
    [candidate, windows]
        .into_iter()
        .find(|c| c.is_file())
        .ok_or_else(|| RenderError::NotInDirectory(dot_path.to_path_buf()))
}

/// Path of the rendered image: `output` with its extension replaced by
/// `file_type`
pub fn image_path(output: &Path, file_type: &str) -> PathBuf {
    output.with_extension(file_type)
}

/// Runs `dot -T<file_type> <dot_file> -o <image_file>`.
///
/// With a timeout, the process is killed once it runs longer than allowed.
pub fn render_image(
    executable: &Path,
    dot_file: &Path,
    image_file: &Path,
    file_type: &str,
    timeout: Option<Duration>,
) -> Result<(), RenderError> {
    debug!(
        executable = %executable.display(),
        dot_file = %dot_file.display(),
        image_file = %image_file.display(),
        file_type,
        "Running dot"
    );

    let mut child = Command::new(executable)
        .arg(format!("-T{file_type}"))
        .arg(dot_file)
        .arg("-o")
        .arg(image_file)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| RenderError::Spawn {
            path: executable.to_path_buf(),
            source,
        })?;

    // Both pipes are drained while waiting so a chatty dot never blocks
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = match timeout {
        Some(limit) => wait_until_exit(&mut child, limit)?,
        None => child.wait().map_err(RenderError::Wait)?,
    };

    if !status.success() {
        let mut combined = collect(stdout);
        combined.push_str(&collect(stderr));

        return Err(RenderError::Failed {
            status,
            output: combined.trim().to_string(),
        });
    }

    info!(path = %image_file.display(), "Rendered image");
    Ok(())
}

/// Reads `pipe` to its end on a separate thread
fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

/// Output gathered by a [`drain`] thread, lossily decoded
fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    let bytes = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Polls `child` until it exits, killing it when `limit` passes first
fn wait_until_exit(child: &mut Child, limit: Duration) -> Result<ExitStatus, RenderError> {
    let deadline = Instant::now() + limit;

    loop {
        if let Some(status) = child.try_wait().map_err(RenderError::Wait)? {
            return Ok(status);
        }

        if Instant::now() >= deadline {
            // Reap after kill; the process may already have exited
            let _ = child.kill();
            let _ = child.wait();
            return Err(RenderError::Timeout(limit));
        }

        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn fake_dot(dir: &Path, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn image_path_replaces_extension() {
        assert_eq!(image_path(Path::new("out/graph.dot"), "png"), PathBuf::from("out/graph.png"));
        assert_eq!(image_path(Path::new("graph"), "svg"), PathBuf::from("graph.svg"));
    }

    #[test]
    fn explicit_file_is_returned() {
        let dir = TempDir::new().unwrap();
        let exe = dir.path().join("dot");
        fs::write(&exe, "").unwrap();

        assert_eq!(find_executable(Some(&exe)).unwrap(), exe);
    }

    #[test]
    fn directory_is_searched() {
        let dir = TempDir::new().unwrap();
        let exe = dir.path().join("dot");
        fs::write(&exe, "").unwrap();

        assert_eq!(find_executable(Some(dir.path())).unwrap(), exe);
    }

    #[test]
    fn directory_with_exe_suffix_is_searched() {
        let dir = TempDir::new().unwrap();
        let exe = dir.path().join("dot.exe");
        fs::write(&exe, "").unwrap();

        assert_eq!(find_executable(Some(dir.path())).unwrap(), exe);
    }

    #[test]
    fn directory_without_dot_fails() {
        let dir = TempDir::new().unwrap();

        let err = find_executable(Some(dir.path())).unwrap_err();
        assert!(matches!(err, RenderError::NotInDirectory(_)));
        assert!(err.to_string().contains("dot executable not found in directory"));
    }

    #[test]
    fn missing_dot_path_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let err = find_executable(Some(&missing)).unwrap_err();
        assert!(matches!(err, RenderError::DotPathMissing { .. }));
        assert!(err.to_string().contains("dotPath not found"));
    }

    #[test]
    fn empty_dot_path_uses_path_lookup() {
        let from_path = which::which(DOT_EXECUTABLE).ok();
        let found = find_executable(Some(Path::new(""))).ok();

        assert_eq!(found, from_path);
    }

    #[cfg(unix)]
    #[test]
    fn render_runs_executable_with_arguments() {
        let dir = TempDir::new().unwrap();
        let args_file = dir.path().join("args.txt");
        let exe = fake_dot(
            dir.path(),
            "dot",
            &format!("echo \"$@\" > '{}'\ncp \"$2\" \"$4\"", args_file.display()),
        );

        let dot_file = dir.path().join("graph.dot");
        let image_file = dir.path().join("graph.png");
        fs::write(&dot_file, "digraph {\n}\n").unwrap();

        render_image(&exe, &dot_file, &image_file, "png", None).unwrap();

        let args = fs::read_to_string(&args_file).unwrap();
        assert_eq!(
            args.trim(),
            format!("-Tpng {} -o {}", dot_file.display(), image_file.display())
        );
        assert_eq!(fs::read_to_string(&image_file).unwrap(), "digraph {\n}\n");
    }

    #[cfg(unix)]
    #[test]
    fn render_failure_reports_output() {
        let dir = TempDir::new().unwrap();
        let exe = fake_dot(dir.path(), "dot", "echo 'syntax error in line 1' >&2\nexit 1");

        let err = render_image(
            &exe,
            &dir.path().join("graph.dot"),
            &dir.path().join("graph.png"),
            "png",
            Some(Duration::from_secs(10)),
        )
        .unwrap_err();

        assert!(matches!(err, RenderError::Failed { .. }));
        assert_eq!(err.to_string(), "dot command failed: syntax error in line 1");
    }

    #[cfg(unix)]
    #[test]
    fn large_output_does_not_stall_render() {
        let dir = TempDir::new().unwrap();
        let exe = fake_dot(
            dir.path(),
            "dot",
            "head -c 200000 /dev/zero | tr '\\0' w >&2\nhead -c 200000 /dev/zero | tr '\\0' w\nexit 0",
        );

        let started = Instant::now();
        render_image(
            &exe,
            &dir.path().join("graph.dot"),
            &dir.path().join("graph.png"),
            "png",
            Some(Duration::from_secs(10)),
        )
        .unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn large_output_is_reported_on_failure() {
        let dir = TempDir::new().unwrap();
        let exe = fake_dot(
            dir.path(),
            "dot",
            "head -c 100000 /dev/zero | tr '\\0' w >&2\necho ' bad graph' >&2\nexit 3",
        );

        let err = render_image(
            &exe,
            &dir.path().join("graph.dot"),
            &dir.path().join("graph.png"),
            "png",
            Some(Duration::from_secs(10)),
        )
        .unwrap_err();

        match err {
            RenderError::Failed { status, output } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(output.len(), 100_000 + " bad graph".len());
                assert!(output.ends_with("bad graph"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn render_times_out() {
        let dir = TempDir::new().unwrap();
        let exe = fake_dot(dir.path(), "dot", "exec sleep 10");

        let err = render_image(
            &exe,
            &dir.path().join("graph.dot"),
            &dir.path().join("graph.png"),
            "png",
            Some(Duration::from_millis(100)),
        )
        .unwrap_err();

        assert!(matches!(err, RenderError::Timeout(_)));
    }

    #[test]
    fn missing_executable_fails_to_spawn() {
        let dir = TempDir::new().unwrap();

        let err = render_image(
            &dir.path().join("no-such-dot"),
            &dir.path().join("graph.dot"),
            &dir.path().join("graph.png"),
            "svg",
            None,
        )
        .unwrap_err();

        assert!(matches!(err, RenderError::Spawn { .. }));
    }
}
