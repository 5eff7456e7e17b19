//! x64dbg-automate client
//!
//! Drives x64dbg/x32dbg through the x64dbg-automate plugin. The ZeroMQ
//! transport is async; a private current-thread runtime runs each request
//! to completion so callers see a plain blocking API.

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::Instant;
use tokio::runtime::Runtime;
use zeromq::{ReqSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

use super::config::SessionConfig;
use super::protocol;
use super::{DebuggerSession, SessionLauncher};
use crate::domain::{ImportError, VirtualAddress};

/// Expression x64dbg evaluates to the main module's base address
const MODULE_BASE_EXPR: &str = "mod.main()";

/// Launches the resolved debugger and connects to its automation plugin
#[derive(Debug, Clone)]
pub struct AutomateLauncher {
    debugger: PathBuf,
    config: SessionConfig,
}

impl AutomateLauncher {
    #[must_use]
    pub fn new(debugger: PathBuf, config: SessionConfig) -> Self {
        Self { debugger, config }
    }

    /// Connect to the plugin inside an already running debugger and load `target`
    ///
    /// # Errors
    /// Returns a session error if `child` exits first, the plugin never
    /// advertises a port, or the target cannot be loaded before the startup
    /// timeout.
    pub fn attach(
        &self,
        child: &mut Child,
        target: &Path,
    ) -> Result<AutomateSession, ImportError> {
        let port = wait_for_session_port(&self.config, child)?;
        info!("x64dbg-automate session on port {port}");
        let mut session = AutomateSession::connect(port, self.config.clone())?;
        session.load_executable(target)?;
        Ok(session)
    }
}

impl SessionLauncher for AutomateLauncher {
    type Session = AutomateSession;

    fn start_session(&self, target: &Path) -> Result<AutomateSession, ImportError> {
        let mut child = Command::new(&self.debugger).spawn().map_err(|e| {
            ImportError::Session(format!("failed to start {}: {e}", self.debugger.display()))
        })?;
        info!("Started {} (pid {})", self.debugger.display(), child.id());

        // Nothing has been handed out yet, so a failed startup takes the
        // debugger down with it
        self.attach(&mut child, target).inspect_err(|_| {
            if let Err(e) = child.kill().and_then(|()| child.wait().map(drop)) {
                warn!("Failed to stop debugger after startup error: {e}");
            }
        })
    }
}

/// Poll for the plugin's lock file until it names a port
fn wait_for_session_port(config: &SessionConfig, child: &mut Child) -> Result<u16, ImportError> {
    let lock_path = config.lock_dir.join(protocol::lock_file_name(child.id()));
    let deadline = Instant::now() + config.startup_timeout;

    loop {
        if let Ok(contents) = fs::read_to_string(&lock_path) {
            if let Some(port) = protocol::parse_lock_file(&contents) {
                return Ok(port);
            }
        }
        if let Some(status) = child.try_wait()? {
            return Err(ImportError::Session(format!(
                "debugger exited ({status}) before the automation plugin started"
            )));
        }
        if Instant::now() >= deadline {
            return Err(ImportError::SessionTimeout(format!(
                "automation plugin lock file {}",
                lock_path.display()
            )));
        }
        std::thread::sleep(config.poll_interval);
    }
}

/// Connected x64dbg-automate session
pub struct AutomateSession {
    runtime: Runtime,
    socket: Option<ReqSocket>,
    config: SessionConfig,
    endpoint: String,
}

impl AutomateSession {
    /// Connect to a plugin already listening on `port`
    ///
    /// # Errors
    /// Returns a session error if the runtime cannot be built or the
    /// connection is not established within the request timeout.
    pub fn connect(port: u16, config: SessionConfig) -> Result<Self, ImportError> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let endpoint = format!("tcp://127.0.0.1:{port}");

        let mut socket = ReqSocket::new();
        runtime
            .block_on(async {
                tokio::time::timeout(config.request_timeout, socket.connect(&endpoint)).await
            })
            .map_err(|_| ImportError::SessionTimeout(format!("connection to {endpoint}")))?
            .map_err(|e| ImportError::Session(format!("connect to {endpoint}: {e}")))?;
        debug!("Connected to {endpoint}");

        Ok(Self { runtime, socket: Some(socket), config, endpoint })
    }

    fn request<A, R>(&mut self, request: &A) -> Result<R, ImportError>
    where
        A: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let socket = self
            .socket
            .as_mut()
            .ok_or_else(|| ImportError::Session("session already detached".to_string()))?;
        debug!("-> {request:?}");
        let payload = protocol::encode(request)?;

        let timeout = self.config.request_timeout;
        let round_trip = async {
            socket.send(ZmqMessage::from(payload)).await?;
            socket.recv().await
        };
        // The timer must be created inside the runtime
        let reply = self
            .runtime
            .block_on(async { tokio::time::timeout(timeout, round_trip).await })
            .map_err(|_| ImportError::SessionTimeout(format!("reply from {}", self.endpoint)))?
            .map_err(|e| ImportError::Session(format!("{}: {e}", self.endpoint)))?;

        let frame = reply
            .get(0)
            .ok_or_else(|| ImportError::Session("empty reply".to_string()))?;
        protocol::decode(frame)
    }

    /// Evaluate an expression in the debugger
    ///
    /// # Errors
    /// Returns a session error if the request fails or the debugger cannot
    /// evaluate `expression`.
    pub fn eval(&mut self, expression: &str) -> Result<u64, ImportError> {
        self.try_eval(expression)?
            .ok_or_else(|| ImportError::Session(format!("failed to evaluate {expression}")))
    }

    /// Evaluate an expression, with `None` when the debugger cannot evaluate it
    ///
    /// # Errors
    /// Returns a session error if the request itself fails.
    pub fn try_eval(&mut self, expression: &str) -> Result<Option<u64>, ImportError> {
        let (value, ok): (u64, bool) = self.request(&(protocol::REQ_DBG_EVAL, expression))?;
        Ok(ok.then_some(value))
    }

    /// Run a debugger command, returning whether it succeeded
    ///
    /// # Errors
    /// Returns a session error if the request fails.
    pub fn command(&mut self, command: &str) -> Result<bool, ImportError> {
        self.request(&(protocol::REQ_DBG_CMD_EXEC_DIRECT, command))
    }

    /// Whether the debugger currently has a debuggee
    ///
    /// # Errors
    /// Returns a session error if the request fails.
    pub fn is_debugging(&mut self) -> Result<bool, ImportError> {
        self.request(&(protocol::REQ_DBG_IS_DEBUGGING,))
    }

    /// Load `target` and wait until its main module is mapped
    fn load_executable(&mut self, target: &Path) -> Result<(), ImportError> {
        if !self.command(&protocol::init_command(target))? {
            return Err(ImportError::Session(format!(
                "debugger refused to load {}",
                target.display()
            )));
        }

        let deadline = Instant::now() + self.config.startup_timeout;
        loop {
            // Only "not loaded yet" is retried; request failures are fatal
            if self.is_debugging()? {
                if let Some(base) = self.try_eval(MODULE_BASE_EXPR)?.filter(|&base| base != 0) {
                    info!("{} loaded at 0x{base:x}", target.display());
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(ImportError::SessionTimeout(format!("{} to load", target.display())));
            }
            std::thread::sleep(self.config.poll_interval);
        }
    }
}

impl DebuggerSession for AutomateSession {
    fn module_base(&mut self) -> Result<u64, ImportError> {
        self.eval(MODULE_BASE_EXPR)
    }

    fn set_label(&mut self, address: VirtualAddress, name: &str) -> Result<bool, ImportError> {
        self.request(&(protocol::REQ_SET_LABEL, address.0, name))
    }

    fn log(&mut self, message: &str) -> Result<(), ImportError> {
        if !self.command(&protocol::log_command(message))? {
            warn!("Debugger rejected log message");
        }
        Ok(())
    }

    fn detach(&mut self) -> Result<(), ImportError> {
        let Some(socket) = self.socket.take() else {
            return Ok(());
        };
        let errors = self.runtime.block_on(socket.close());
        if errors.is_empty() {
            debug!("Detached from {}", self.endpoint);
            Ok(())
        } else {
            let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
            Err(ImportError::Session(format!("detach: {}", joined.join("; "))))
        }
    }
}
