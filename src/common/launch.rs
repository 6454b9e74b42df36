use crate::{
    common::LibraryEntry,
    error::{Error, LaunchError, Result},
};
use enum_dispatch::enum_dispatch;
use std::{
    io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

const STEAM_SCHEME: &str = "steam://";

/// What starting an entry resolves to
#[enum_dispatch(Launchable)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    ProtocolTarget,
    ExecutableTarget,
}

/// Trait for things that can start an OS process
#[enum_dispatch]
pub trait Launchable {
    /// Start the process through the given dispatcher's opener and spawner
    fn launch(&self, dispatcher: &Dispatcher) -> Result<(), LaunchError>;
}

impl LaunchTarget {
    /// Decide how an entry should be started
    pub fn resolve(entry: &LibraryEntry) -> Self {
        if entry.is_protocol_reference {
            ProtocolTarget::from_reference(&entry.executable_path).into()
        } else {
            ExecutableTarget {
                path: PathBuf::from(&entry.executable_path),
            }
            .into()
        }
    }
}

/// A URI handed to the default handler of its scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolTarget {
    pub uri: String,
}

impl ProtocolTarget {
    /// Normalize a protocol reference.
    /// Bare numbers are Steam app ids, anything else gets the Steam scheme if it lacks it.
    pub fn from_reference(reference: &str) -> Self {
        let uri = if reference.trim().parse::<i64>().is_ok() {
            format!("{STEAM_SCHEME}rungameid/{}", reference.trim())
        } else if has_steam_scheme(reference) {
            reference.to_owned()
        } else {
            format!("{STEAM_SCHEME}{reference}")
        };

        Self { uri }
    }
}

impl Launchable for ProtocolTarget {
    fn launch(&self, dispatcher: &Dispatcher) -> Result<(), LaunchError> {
        let mut cmd = dispatcher.opener.command(&self.uri);
        dispatcher
            .spawner
            .spawn(&mut cmd)
            .map_err(|e| LaunchError::Protocol(e.to_string()))
    }
}

/// An executable on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableTarget {
    pub path: PathBuf,
}

impl ExecutableTarget {
    /// The folder the process is started in
    pub fn working_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

impl Launchable for ExecutableTarget {
    fn launch(&self, dispatcher: &Dispatcher) -> Result<(), LaunchError> {
        if self.path.to_string_lossy().trim().is_empty() || !self.path.is_file()
        {
            return Err(LaunchError::ExecutableNotFound);
        }

        let mut cmd = Command::new(&self.path);
        if let Some(dir) = self.working_dir() {
            cmd.current_dir(dir);
        }

        dispatcher
            .spawner
            .spawn(&mut cmd)
            .map_err(|e| LaunchError::Executable(e.to_string()))
    }
}

/// Whether a reference already starts with `steam://`, ignoring case
pub(crate) fn has_steam_scheme(reference: &str) -> bool {
    reference
        .get(..STEAM_SCHEME.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(STEAM_SCHEME))
}

/// Command used to open a URI with its default handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opener {
    program: String,
    args: Vec<String>,
}

impl Opener {
    /// The platform's "open with default handler" command
    pub fn platform_default() -> Self {
        let (program, args): (&str, &[&str]) = if cfg!(target_os = "windows") {
            ("cmd", &["/C", "start", ""])
        } else if cfg!(target_os = "macos") {
            ("open", &[])
        } else {
            ("xdg-open", &[])
        };

        Self {
            program: program.to_owned(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse a user-supplied command line, the URI is appended as the last argument
    pub fn from_command_line(cmd: &str) -> Result<Self> {
        let mut words = shlex::split(cmd)
            .filter(|words| !words.is_empty())
            .ok_or_else(|| Error::BadCmd(cmd.to_owned()))?;
        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
        })
    }

    /// Use the configured command if there is one, else the platform default
    pub fn from_config(cmd: Option<&str>) -> Result<Self> {
        cmd.map_or_else(|| Ok(Self::platform_default()), Self::from_command_line)
    }

    fn command(&self, uri: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(uri);
        cmd
    }
}

/// Starts prepared commands
pub trait Spawner {
    fn spawn(&self, command: &mut Command) -> io::Result<()>;
}

/// Spawns detached processes with their output discarded
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl Spawner for SystemSpawner {
    #[mutants::skip] // Cannot test directly, runs external command
    fn spawn(&self, command: &mut Command) -> io::Result<()> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(())
    }
}

/// Starts library entries
pub struct Dispatcher {
    opener: Opener,
    spawner: Box<dyn Spawner>,
}

impl Dispatcher {
    pub fn new(opener: Opener) -> Self {
        Self::with_spawner(opener, SystemSpawner)
    }

    pub fn with_spawner(opener: Opener, spawner: impl Spawner + 'static) -> Self {
        Self {
            opener,
            spawner: Box::new(spawner),
        }
    }

    /// Start the process for an entry. The library is never touched.
    pub fn launch(&self, entry: &LibraryEntry) -> Result<(), LaunchError> {
        let target = LaunchTarget::resolve(entry);
        tracing::info!(id = %entry.id, title = %entry.title, ?target, "launching");

        target.launch(self).inspect_err(|err| {
            tracing::warn!(id = %entry.id, %err, "launch failed");
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("opener", &self.opener)
            .finish_non_exhaustive()
    }
}
