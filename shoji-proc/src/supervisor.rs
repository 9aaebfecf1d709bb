//! Spawning and supervising a child process.
//!
//! A [`ManagedProcess`] owns a child plus three pump threads: one feeding
//! an external source into the child's stdin, two draining stdout and
//! stderr into external sinks. Pumps stop cooperatively via a shared token
//! checked between transfers; shutdown escalates from the token to SIGTERM
//! to SIGKILL with a bounded wait at each rung, so an unresponsive child
//! can never hang its supervisor indefinitely.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::SpawnError;

/// How many cooperative polls each shutdown rung waits before escalating.
const SHUTDOWN_RETRIES: usize = 10;
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

const PUMP_BUFFER: usize = 4096;

/// Where a supervised process is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Running,
    /// `cancel()` has begun; pumps are being stopped.
    Interrupting,
    Terminated,
}

/// State shared with the pump threads.
struct PumpShared {
    cancel: AtomicBool,
    pid: u32,
}

impl PumpShared {
    fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// A pump hit an unexpected error: take the whole process down rather
    /// than fail silently. The other pumps unblock when their pipes close.
    fn trigger_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
        terminate_pid(self.pid);
    }
}

#[cfg(unix)]
fn terminate_pid(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
}

#[cfg(not(unix))]
fn terminate_pid(_pid: u32) {}

/// Builder for a supervised child, in the shape of `std::process::Command`
/// but producing a pumped [`ManagedProcess`].
pub struct ProcessBuilder {
    command: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl ProcessBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        ProcessBuilder {
            command: command.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I: IntoIterator<Item = S>, S: Into<String>>(mut self, args: I) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Start the child with redirected stdio and spin up the three pumps.
    pub fn spawn<I, O, E>(self, input: I, output: O, errors: E) -> Result<ManagedProcess, SpawnError>
    where
        I: Read + Send + 'static,
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        let mut command = Command::new(&self.command);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| SpawnError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        let stdin = child.stdin.take().ok_or(SpawnError::MissingStdio)?;
        let stdout = child.stdout.take().ok_or(SpawnError::MissingStdio)?;
        let stderr = child.stderr.take().ok_or(SpawnError::MissingStdio)?;

        let shared = Arc::new(PumpShared {
            cancel: AtomicBool::new(false),
            pid: child.id(),
        });

        let pumps = vec![
            spawn_pump("stdin-writer", input, stdin, Arc::clone(&shared)),
            spawn_pump("stdout-reader", stdout, output, Arc::clone(&shared)),
            spawn_pump("stderr-reader", stderr, errors, Arc::clone(&shared)),
        ];

        log::debug!("spawned {} (pid {})", self.command, shared.pid);

        Ok(ManagedProcess {
            child,
            shared,
            pumps,
            state: Lifecycle::Running,
        })
    }
}

fn spawn_pump<R, W>(name: &'static str, from: R, to: W, shared: Arc<PumpShared>) -> JoinHandle<()>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    let on_failure = Arc::clone(&shared);
    thread::Builder::new()
        .name(name.into())
        .spawn(move || pump(from, to, &shared, name))
        .unwrap_or_else(move |e| {
            // Out of threads at spawn time; treat like a pump failure.
            log::error!("could not start {name} pump: {e}");
            on_failure.trigger_cancel();
            thread::spawn(|| {})
        })
}

/// Copy bytes until EOF, cancellation, or error. Errors outside
/// cancellation cancel the owning process instead of vanishing.
fn pump<R: Read, W: Write>(mut from: R, mut to: W, shared: &PumpShared, name: &str) {
    let mut buffer = [0u8; PUMP_BUFFER];
    loop {
        if shared.cancel_requested() {
            break;
        }
        match from.read(&mut buffer) {
            Ok(0) => break,
            Ok(count) => {
                if let Err(e) = to.write_all(&buffer[..count]).and_then(|_| to.flush()) {
                    if !shared.cancel_requested() {
                        log::warn!("{name} pump write failed: {e}; cancelling process");
                        shared.trigger_cancel();
                    }
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                if !shared.cancel_requested() {
                    log::warn!("{name} pump read failed: {e}; cancelling process");
                    shared.trigger_cancel();
                }
                break;
            }
        }
    }
    log::debug!("{name} pump stopped");
}

/// A live child process with its stdio pumps.
pub struct ManagedProcess {
    child: Child,
    shared: Arc<PumpShared>,
    pumps: Vec<JoinHandle<()>>,
    state: Lifecycle,
}

impl ManagedProcess {
    pub fn id(&self) -> u32 {
        self.shared.pid
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Block until the child exits normally, then wind down the pumps.
    /// The output pumps are left to drain to EOF so nothing the child
    /// wrote in its final moments is dropped.
    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait()?;
        self.state = Lifecycle::Terminated;
        self.reap_pumps();
        Ok(status)
    }

    /// Non-blocking exit check.
    pub fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Escalating shutdown: cooperative token first, then SIGTERM, then
    /// SIGKILL. Bounded at every rung; never blocks indefinitely on an
    /// unresponsive child.
    pub fn cancel(&mut self) {
        self.state = Lifecycle::Interrupting;
        self.shared.cancel.store(true, Ordering::Relaxed);

        // Give the pumps a chance to notice the token.
        for _ in 0..SHUTDOWN_RETRIES {
            if self.pumps.iter().all(JoinHandle::is_finished) {
                break;
            }
            thread::sleep(SHUTDOWN_POLL);
        }

        if matches!(self.child.try_wait(), Ok(None)) {
            terminate_pid(self.shared.pid);
            for _ in 0..SHUTDOWN_RETRIES {
                if !matches!(self.child.try_wait(), Ok(None)) {
                    break;
                }
                thread::sleep(SHUTDOWN_POLL);
            }
        }

        if matches!(self.child.try_wait(), Ok(None)) {
            // The designed last resort; not an error worth surfacing.
            log::warn!("child {} ignored SIGTERM, killing", self.shared.pid);
            let _ = self.child.kill();
        }
        let _ = self.child.wait();

        self.reap_pumps();
        self.state = Lifecycle::Terminated;
    }

    /// Join pumps that have stopped; a pump stuck in a blocking read with
    /// no way to interrupt it is detached rather than waited on forever.
    fn reap_pumps(&mut self) {
        for _ in 0..SHUTDOWN_RETRIES {
            if self.pumps.iter().all(JoinHandle::is_finished) {
                break;
            }
            thread::sleep(SHUTDOWN_POLL);
        }
        for handle in self.pumps.drain(..) {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                log::warn!(
                    "detaching unresponsive {:?} pump",
                    handle.thread().name().unwrap_or("stdio")
                );
            }
        }
    }
}

impl Drop for ManagedProcess {
    fn drop(&mut self) {
        if self.state != Lifecycle::Terminated {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_spawn_echo_and_pump_output() {
        let out = SharedBuf::default();
        let mut process = ProcessBuilder::new("/bin/echo")
            .arg("hello pumps")
            .spawn(io::empty(), out.clone(), io::sink())
            .expect("spawn echo");

        let status = process.wait().expect("wait");
        assert!(status.success());
        assert!(out.contents().contains("hello pumps"));
        assert_eq!(process.state(), Lifecycle::Terminated);
    }

    #[test]
    fn test_stdin_pump_feeds_child() {
        let out = SharedBuf::default();
        let mut process = ProcessBuilder::new("/bin/cat")
            .spawn(Cursor::new(b"fed through\n".to_vec()), out.clone(), io::sink())
            .expect("spawn cat");

        let status = process.wait().expect("wait");
        assert!(status.success());
        assert_eq!(out.contents(), "fed through\n");
    }

    #[test]
    fn test_stderr_pump() {
        let err = SharedBuf::default();
        let mut process = ProcessBuilder::new("/bin/sh")
            .args(["-c", "echo oops 1>&2"])
            .spawn(io::empty(), io::sink(), err.clone())
            .expect("spawn sh");

        process.wait().expect("wait");
        assert!(err.contents().contains("oops"));
    }

    #[test]
    fn test_working_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = SharedBuf::default();
        let mut process = ProcessBuilder::new("/bin/pwd")
            .current_dir(dir.path())
            .spawn(io::empty(), out.clone(), io::sink())
            .expect("spawn pwd");

        process.wait().expect("wait");
        let expected = dir.path().canonicalize().expect("canonicalize");
        let printed = out.contents();
        assert!(
            printed.trim_end().ends_with(expected.to_str().unwrap()),
            "pwd printed {printed:?}, expected suffix {expected:?}"
        );
    }

    #[test]
    fn test_spawn_failure_is_structured() {
        let result = ProcessBuilder::new("/no/such/binary")
            .spawn(io::empty(), io::sink(), io::sink());
        match result {
            Err(SpawnError::Spawn { command, source }) => {
                assert_eq!(command, "/no/such/binary");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected SpawnError::Spawn, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_cancel_terminates_sleeping_child() {
        let mut process = ProcessBuilder::new("/bin/sleep")
            .arg("30")
            .spawn(io::empty(), io::sink(), io::sink())
            .expect("spawn sleep");

        let start = Instant::now();
        process.cancel();
        assert_eq!(process.state(), Lifecycle::Terminated);
        // Cooperative polls plus two escalation rungs, nowhere near 30s.
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(matches!(process.try_wait(), Ok(Some(_))));
    }
}
