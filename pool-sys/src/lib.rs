// SPDX-License-Identifier: GPL-3.0-only

//! Low-level system operations for storage pool backends
//!
//! This crate owns every direct interaction with the host that a backend
//! needs:
//! - Running external tools and capturing their output
//! - Filesystem statistics (statvfs)
//! - Access and existence checks on paths
//!
//! Both concerns are exposed as traits ([`CommandRunner`], [`FilesystemProbe`])
//! so backends can be driven by scripted fakes in tests.

pub mod command;
pub mod error;
pub mod fs;

pub use command::{CommandInvocation, CommandOutput, CommandRunner, SystemRunner, locate_tool};
pub use error::{Result, SysError};
pub use fs::{FilesystemProbe, FsUsage, HostFilesystem};
