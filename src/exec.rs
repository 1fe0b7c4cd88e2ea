use crate::types::{Output, Stage};

use std::convert::Infallible;
use std::error;
use std::ffi::{self, CString};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::Write;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use nix::fcntl::OFlag;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, ForkResult};

/// Status reported when the engine itself fails, as opposed to any exit
/// code a started program can produce.
pub const EXEC_FAILURE: i32 = -1;

#[derive(Debug)]
enum ExecError {
	Nix(nix::Error),
	Nul(ffi::NulError),
}
impl From<nix::Error> for ExecError {
	fn from(e: nix::Error) -> ExecError {
		ExecError::Nix(e)
	}
}
impl From<ffi::NulError> for ExecError {
	fn from(e: ffi::NulError) -> ExecError {
		ExecError::Nul(e)
	}
}
impl fmt::Display for ExecError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			ExecError::Nix(ref e) => write!(f, "Nix error: {}", e),
			ExecError::Nul(ref e) => write!(f, "Nul char error: {}", e),
		}
	}
}
impl error::Error for ExecError {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match *self {
			ExecError::Nix(ref e) => Some(e),
			ExecError::Nul(ref e) => Some(e),
		}
	}
}

fn dup_owned(fd: RawFd) -> nix::Result<OwnedFd> {
	let duplicate = unistd::dup(fd)?;
	// dup just handed us this descriptor, nothing else owns it
	Ok(unsafe { OwnedFd::from_raw_fd(duplicate) })
}

/// The caller's stdin and stdout, duplicated aside. Dropping it points
/// the real descriptors back at the saved streams.
struct SavedStdio {
	stdin: OwnedFd,
	stdout: OwnedFd,
}

impl SavedStdio {
	fn capture() -> nix::Result<SavedStdio> {
		Ok(SavedStdio {
			stdin: dup_owned(libc::STDIN_FILENO)?,
			stdout: dup_owned(libc::STDOUT_FILENO)?,
		})
	}
}

impl Drop for SavedStdio {
	fn drop(&mut self) {
		let stdin = unistd::dup2(self.stdin.as_raw_fd(), libc::STDIN_FILENO);
		let stdout = unistd::dup2(self.stdout.as_raw_fd(), libc::STDOUT_FILENO);
		if stdin.is_err() || stdout.is_err() {
			let _ = writeln!(io::stderr(), "Error restoring standard streams.");
		}
	}
}

/// Run a whole stage chain as external processes. The caller's standard
/// input and output refer to the same streams before and after the call,
/// even though stages redirect them while running.
pub fn run_external(chain: &Stage) -> i32 {
	let saved = match SavedStdio::capture() {
		Ok(saved) => saved,
		Err(e) => {
			let _ = writeln!(io::stderr(), "Error saving standard streams: {}", e);
			return EXEC_FAILURE;
		},
	};
	run_stage(chain, saved.stdin.as_raw_fd(), &saved)
}

fn run_stage(stage: &Stage, upstream: RawFd, fallback: &SavedStdio) -> i32 {
	// Every stage gets a fresh pipe. Even when the stage writes elsewhere
	// a successor still needs a read end to observe end-of-stream from.
	let (pipe_read, pipe_write) = match unistd::pipe2(OFlag::O_CLOEXEC) {
		Ok(ends) => ends,
		Err(_) => {
			let _ = writeln!(io::stderr(), "Error creating pipe.");
			return EXEC_FAILURE;
		},
	};

	let input_file = match stage.input_source {
		Some(ref path) => match File::open(path) {
			Ok(file) => Some(file),
			Err(_) => {
				let _ = writeln!(io::stderr(), "Error opening input file.");
				return EXEC_FAILURE;
			},
		},
		None => None,
	};
	let stdin_fd = input_file.as_ref().map_or(upstream, |file| file.as_raw_fd());

	let mut output_file = None;
	let stdout_fd = match stage.output {
		Output::Pipe => pipe_write.as_raw_fd(),
		Output::Inherit => fallback.stdout.as_raw_fd(),
		Output::Append(ref path) => match OpenOptions::new().append(true).open(path) {
			Ok(file) => {
				let fd = file.as_raw_fd();
				output_file = Some(file);
				fd
			},
			Err(_) => {
				let _ = writeln!(io::stderr(), "Error opening output file to append.");
				return EXEC_FAILURE;
			},
		},
		Output::Truncate(ref path) => {
			match OpenOptions::new().write(true).create(true).truncate(true).open(path) {
				Ok(file) => {
					let fd = file.as_raw_fd();
					output_file = Some(file);
					fd
				},
				Err(_) => {
					let _ = writeln!(io::stderr(), "Error opening output file to create/truncate.");
					return EXEC_FAILURE;
				},
			}
		},
	};

	if unistd::dup2(stdin_fd, libc::STDIN_FILENO).is_err()
		|| unistd::dup2(stdout_fd, libc::STDOUT_FILENO).is_err()
	{
		let _ = writeln!(io::stderr(), "Error redirecting standard streams.");
		return EXEC_FAILURE;
	}

	let child = match unsafe { unistd::fork() } {
		Ok(ForkResult::Parent { child }) => child,
		Ok(ForkResult::Child) => {
			// The child keeps only its redirected stdio; the read end
			// belongs to the downstream reader alone.
			drop(pipe_read);
			exec_child(stage)
		},
		Err(_) => {
			let _ = writeln!(io::stderr(), "Error forking child process.");
			return EXEC_FAILURE;
		},
	};

	// Close our write end before waiting: the reader sees end-of-stream
	// once the child alone holds it. The redirect files are done too,
	// the child has its own copies.
	drop(pipe_write);
	drop(input_file);
	drop(output_file);

	let status = match waitpid(child, None) {
		Ok(WaitStatus::Exited(_, code)) => code,
		Ok(WaitStatus::Signaled(_, signal, _)) => 128 + signal as i32,
		Ok(_) | Err(_) => EXEC_FAILURE,
	};

	match stage.next {
		Some(ref next) => run_stage(next, pipe_read.as_raw_fd(), fallback),
		None => status,
	}
}

fn do_exec_child(stage: &Stage) -> Result<Infallible, ExecError> {
	let argv = stage
		.arguments
		.iter()
		.map(|arg| CString::new(arg.as_str()))
		.collect::<Result<Vec<CString>, ffi::NulError>>()?;
	unistd::execvp(&argv[0], &argv)?;
	unreachable!()
}

fn exec_child(stage: &Stage) -> ! {
	let status = match do_exec_child(stage) {
		Ok(never) => match never {},
		Err(ExecError::Nix(_)) => {
			let _ = writeln!(io::stderr(), "{}: command not found", stage.arguments[0]);
			127
		},
		Err(e) => {
			let _ = writeln!(io::stderr(), "{}", e);
			126
		},
	};
	unsafe { libc::_exit(status) }
}
