use msh::builtin::BuiltinSet;
use msh::dispatch::dispatch;

use std::io;
use std::io::{BufRead, Write};
use std::process;

const PROMPT: &str = "msh> ";

fn main() {
	let builtins = BuiltinSet::standard();
	let stdin = io::stdin();
	let mut stdin = stdin.lock();
	let mut stdout = io::stdout();
	let mut line = String::new();
	let mut last_status = 0;
	let mut should_exit = false;

	while !should_exit {
		let _ = stdout.write_all(PROMPT.as_bytes());
		let _ = stdout.flush();
		line.clear();
		match stdin.read_line(&mut line) {
			Ok(0) => break,
			Ok(_) => {},
			Err(e) => {
				let _ = writeln!(io::stderr(), "Error reading input: {}", e);
				break;
			},
		}
		last_status = dispatch(&line, last_status, &builtins, &mut should_exit);
	}
	process::exit(last_status);
}
