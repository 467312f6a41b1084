// SPDX-License-Identifier: GPL-3.0-only

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use pool_btrfs::BtrfsBackend;
use pool_sys::{CommandInvocation, CommandOutput, CommandRunner, FilesystemProbe, FsUsage, SysError};

/// What the scripted tool does for the next command.
pub enum Step {
    /// Exit 0 printing this stdout
    Output(String),
    /// Exit 0 printing these bytes
    RawOutput(Vec<u8>),
    /// Exit 1 printing this stderr
    Fail(String),
    /// The program cannot be started
    SpawnError,
    /// Exit 0 after creating a directory at the last argument
    CreateTarget,
}

/// Command runner replaying a fixed script and recording what it was asked to run.
pub struct ScriptedRunner {
    steps: RefCell<VecDeque<Step>>,
    calls: RefCell<Vec<CommandInvocation>>,
}

impl ScriptedRunner {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: RefCell::new(steps.into_iter().collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(CommandInvocation::render)
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &CommandInvocation) -> pool_sys::Result<CommandOutput> {
        self.calls.borrow_mut().push(invocation.clone());

        let step = self
            .steps
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected command: {}", invocation.render()));

        match step {
            Step::Output(stdout) => Ok(CommandOutput {
                stdout: stdout.into_bytes(),
                stderr: String::new(),
            }),
            Step::RawOutput(stdout) => Ok(CommandOutput {
                stdout,
                stderr: String::new(),
            }),
            Step::Fail(stderr) => Err(SysError::CommandFailed {
                command: invocation.render(),
                status: "exit status: 1".to_string(),
                stderr,
            }),
            Step::SpawnError => Err(SysError::Spawn {
                command: invocation.render(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
            Step::CreateTarget => {
                let target = invocation.args.last().expect("command without arguments");
                std::fs::create_dir_all(target).expect("create scripted target");
                Ok(CommandOutput::default())
            }
        }
    }
}

/// In-memory filesystem view.
#[derive(Default)]
pub struct FakeFilesystem {
    /// statvfs result; `None` makes the query fail
    pub usage: Option<FsUsage>,
    pub accessible: HashSet<PathBuf>,
    pub existing: HashSet<PathBuf>,
}

impl FakeFilesystem {
    pub fn with_usage(fragment_size: u64, blocks: u64, free_blocks: u64) -> Self {
        Self {
            usage: Some(FsUsage {
                fragment_size,
                blocks,
                free_blocks,
            }),
            ..Self::default()
        }
    }

    pub fn accessible(mut self, path: &str) -> Self {
        self.accessible.insert(PathBuf::from(path));
        self
    }

    pub fn existing(mut self, path: &str) -> Self {
        self.existing.insert(PathBuf::from(path));
        self
    }
}

impl FilesystemProbe for FakeFilesystem {
    fn usage(&self, path: &Path) -> pool_sys::Result<FsUsage> {
        self.usage.ok_or_else(|| SysError::Statvfs {
            path: path.to_path_buf(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        })
    }

    fn check_access(&self, path: &Path) -> pool_sys::Result<()> {
        if self.accessible.contains(path) {
            Ok(())
        } else {
            Err(SysError::Access {
                path: path.to_path_buf(),
                source: Errno::EACCES,
            })
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
    }
}

pub fn backend<'a, F: FilesystemProbe>(
    runner: &'a ScriptedRunner,
    fs: F,
) -> BtrfsBackend<&'a ScriptedRunner, F> {
    BtrfsBackend::with_parts("btrfs", runner, fs)
}

/// One line of `btrfs subvolume list -uq` output.
pub fn listing_line(id: u64, parent: Option<&str>, uuid: &str, path: &str) -> String {
    format!(
        "ID {id} gen {} top level 5 parent_uuid {} uuid {uuid} path {path}\n",
        id + 100,
        parent.unwrap_or("-"),
    )
}
