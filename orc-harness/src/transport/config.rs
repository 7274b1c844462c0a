//! Spawn configuration for the process transport.

/// Default local shell.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Default remote-login command.
pub const DEFAULT_LOGIN_COMMAND: &str = "ssh";

/// What to run on the far side of the PTY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnTarget {
    /// An interactive shell on this machine.
    Local {
        /// Shell program to run.
        shell: String,
    },

    /// An interactive session on a remote host via a login command.
    Remote {
        /// Target host (hostname or IP address).
        host: String,
        /// User to log in as.
        user: String,
        /// Optional port, passed as `-p <port>`.
        port: Option<u16>,
        /// Login program (e.g. `ssh`).
        login_command: String,
    },
}

impl SpawnTarget {
    /// A local shell target using [`DEFAULT_SHELL`].
    pub fn local() -> Self {
        SpawnTarget::Local {
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    /// A remote target reached with [`DEFAULT_LOGIN_COMMAND`].
    pub fn remote(host: impl Into<String>, user: impl Into<String>) -> Self {
        SpawnTarget::Remote {
            host: host.into(),
            user: user.into(),
            port: None,
            login_command: DEFAULT_LOGIN_COMMAND.to_string(),
        }
    }

    /// Program and arguments to spawn.
    pub fn argv(&self) -> Vec<String> {
        match self {
            SpawnTarget::Local { shell } => vec![shell.clone()],
            SpawnTarget::Remote {
                host,
                user,
                port,
                login_command,
            } => {
                let mut argv = vec![login_command.clone()];
                if let Some(port) = port {
                    argv.push("-p".to_string());
                    argv.push(port.to_string());
                }
                argv.push(format!("{}@{}", user, host));
                argv
            }
        }
    }

    /// The command line as it would be typed into a shell.
    pub fn command_line(&self) -> String {
        self.argv().join(" ")
    }

    /// Whether this target is a local shell.
    pub fn is_local(&self) -> bool {
        matches!(self, SpawnTarget::Local { .. })
    }
}

/// Process spawn configuration.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    /// What to spawn.
    pub target: SpawnTarget,

    /// Terminal width for the PTY.
    pub terminal_width: u16,

    /// Terminal height for the PTY.
    pub terminal_height: u16,

    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
}

impl SpawnConfig {
    /// Create a spawn configuration for the given target.
    pub fn new(target: SpawnTarget) -> Self {
        Self {
            target,
            terminal_width: 511,
            terminal_height: 24,
            env: vec![("TERM".to_string(), "dumb".to_string())],
        }
    }
}
