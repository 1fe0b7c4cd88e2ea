use crate::builtin::BuiltinSet;
use crate::{exec, parser};

use std::io;
use std::io::Write;

/// Parse one input line and run it, returning the new exit status.
///
/// A blank line returns `last_status` untouched; a parse failure is
/// reported and returns [`exec::EXEC_FAILURE`] without spawning anything.
/// The first stage's command name is tried against `builtins` before
/// process dispatch. Builtins receive the bare argument vector only: the
/// parser is relied on not to hand them redirections or pipes. Only a
/// builtin may set `should_exit`.
pub fn dispatch(input: &str, last_status: i32, builtins: &BuiltinSet, should_exit: &mut bool) -> i32 {
	let chain = match parser::parse(input) {
		Err(e) => {
			let _ = writeln!(io::stderr(), "Input parse error: {}", e);
			return exec::EXEC_FAILURE;
		},
		Ok(None) => {
			return last_status;
		},
		Ok(Some(chain)) => chain,
	};

	if let Some(handler) = builtins.lookup(&chain.arguments[0]) {
		return handler(&chain.arguments, last_status, should_exit);
	}
	exec::run_external(&chain)
}
