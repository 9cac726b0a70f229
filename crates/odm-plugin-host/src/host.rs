//! Plugin process launcher and call handle.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use odm_plugin::{HandshakeConfig, RpcClient};

use crate::error::HostError;

/// Tracing target for host-side process management.
const HOST_TARGET: &str = "odm_plugin_host::host";

/// Grace period a plugin gets to exit after its stdin closes.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Poll interval while waiting for the child to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Describes how to launch a plugin executable.
///
/// Immutable once built; [`PluginHost::launch`] can be called repeatedly
/// to start independent plugin processes.
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use odm_plugin::HandshakeConfig;
/// use odm_plugin_host::PluginHost;
///
/// let host = PluginHost::new(PathBuf::from("/usr/local/bin/tester-plugin"))
///     .with_args(vec!["--quiet".into()])
///     .with_handshake(HandshakeConfig::default());
/// assert_eq!(host.args().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PluginHost {
    executable: PathBuf,
    args: Vec<String>,
    handshake: HandshakeConfig,
}

impl PluginHost {
    /// Creates a host for the given executable with the default handshake.
    #[must_use]
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            args: Vec::new(),
            handshake: HandshakeConfig::default(),
        }
    }

    /// Sets the arguments passed to the plugin executable.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Replaces the handshake descriptor.
    #[must_use]
    pub fn with_handshake(mut self, handshake: HandshakeConfig) -> Self {
        self.handshake = handshake;
        self
    }

    /// Returns the plugin executable path.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Returns the arguments passed to the plugin executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the handshake descriptor.
    #[must_use]
    pub const fn handshake(&self) -> &HandshakeConfig {
        &self.handshake
    }

    /// Spawns the plugin process and completes the handshake.
    ///
    /// The magic cookie is placed in the child's environment before spawn;
    /// the returned handle is ready to dispatch `Execute` calls.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::BinaryNotFound`] or [`HostError::SpawnFailed`]
    /// when the process cannot start, and [`HostError::Rpc`] when the
    /// greeting is missing, malformed, or carries the wrong protocol
    /// version. The child is torn down before a handshake error returns.
    pub fn launch(&self) -> Result<PluginHandle, HostError> {
        debug!(
            target: HOST_TARGET,
            executable = %self.executable.display(),
            args = ?self.args,
            "spawning plugin process"
        );

        let mut command = Command::new(&self.executable);
        command
            .args(&self.args)
            .env(
                self.handshake.magic_cookie_key(),
                self.handshake.magic_cookie_value(),
            )
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                HostError::BinaryNotFound {
                    command: self.executable.display().to_string(),
                    source: Arc::new(source),
                }
            } else {
                HostError::SpawnFailed {
                    message: format!("failed to start {}", self.executable.display()),
                    source: Some(Arc::new(source)),
                }
            }
        })?;

        let stdin = child.stdin.take().ok_or_else(|| HostError::SpawnFailed {
            message: String::from("failed to capture stdin"),
            source: None,
        })?;
        let stdout = child.stdout.take().ok_or_else(|| HostError::SpawnFailed {
            message: String::from("failed to capture stdout"),
            source: None,
        })?;
        let stderr_thread = child.stderr.take().map(spawn_stderr_drain);

        debug!(
            target: HOST_TARGET,
            pid = child.id(),
            "plugin process spawned, awaiting greeting"
        );

        match RpcClient::connect(BufReader::new(stdout), stdin, &self.handshake) {
            Ok(client) => Ok(PluginHandle {
                child,
                client: Some(client),
                stderr_thread,
            }),
            Err(error) => {
                warn!(
                    target: HOST_TARGET,
                    pid = child.id(),
                    error = %error,
                    "handshake failed, killing plugin process"
                );
                drop(child.kill());
                drop(child.wait());
                if let Some(thread) = stderr_thread {
                    drop(thread.join());
                }
                Err(error.into())
            }
        }
    }
}

/// A launched plugin process with a connected RPC stub.
///
/// The handle owns the child; dropping it without calling
/// [`PluginHandle::shutdown`] kills the process.
#[derive(Debug)]
pub struct PluginHandle {
    child: Child,
    client: Option<RpcClient<BufReader<ChildStdout>, ChildStdin>>,
    stderr_thread: Option<JoinHandle<()>>,
}

impl PluginHandle {
    /// Invokes the remote `Execute` method.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Rpc`] carrying the remote error verbatim or a
    /// transport failure.
    pub fn execute(&mut self, body: &str) -> Result<String, HostError> {
        Ok(self.client_mut()?.execute(body)?)
    }

    /// Invokes the remote `Execute` method with a deadline the plugin can
    /// observe through its call context.
    ///
    /// # Errors
    ///
    /// Same as [`PluginHandle::execute`].
    pub fn execute_with_timeout(
        &mut self,
        body: &str,
        timeout: Duration,
    ) -> Result<String, HostError> {
        Ok(self.client_mut()?.execute_with_timeout(body, timeout)?)
    }

    /// Closes the plugin's stdin and waits for it to exit, killing it when
    /// the grace period runs out.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Io`] when the child's status cannot be read.
    pub fn shutdown(mut self) -> Result<(), HostError> {
        // Dropping the client closes the child's stdin; the serve loop sees
        // EOF and exits.
        drop(self.client.take());

        let start = Instant::now();
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    debug!(target: HOST_TARGET, ?status, "plugin process exited");
                    break;
                }
                Ok(None) => {
                    if start.elapsed() > SHUTDOWN_GRACE {
                        warn!(
                            target: HOST_TARGET,
                            pid = self.child.id(),
                            "plugin did not exit within the grace period, killing it"
                        );
                        drop(self.child.kill());
                        drop(self.child.wait());
                        break;
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(source) => {
                    drop(self.child.kill());
                    drop(self.child.wait());
                    return Err(HostError::Io {
                        source: Arc::new(source),
                    });
                }
            }
        }

        if let Some(thread) = self.stderr_thread.take() {
            drop(thread.join());
        }
        Ok(())
    }

    fn client_mut(
        &mut self,
    ) -> Result<&mut RpcClient<BufReader<ChildStdout>, ChildStdin>, HostError> {
        self.client
            .as_mut()
            .ok_or(HostError::Rpc(odm_plugin::PluginError::Disconnected))
    }
}

impl Drop for PluginHandle {
    fn drop(&mut self) {
        if self.client.is_none() {
            // shutdown() already reaped the child.
            return;
        }
        drop(self.client.take());
        if let Err(error) = self.child.kill() {
            warn!(
                target: HOST_TARGET,
                error = %error,
                "failed to kill plugin process on drop"
            );
        } else {
            drop(self.child.wait());
        }
    }
}

/// Drains the child's stderr to structured logging.
///
/// Keeps the pipe from filling up and surfaces whatever the plugin logs.
fn spawn_stderr_drain(stderr: std::process::ChildStderr) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let reader = BufReader::new(stderr);
        for line in reader.lines() {
            match line {
                Ok(text) => {
                    if !text.trim().is_empty() {
                        debug!(target: HOST_TARGET, plugin_stderr = %text, "plugin stderr output");
                    }
                }
                Err(_) => break,
            }
        }
    })
}
