use std::env;
use std::io;
use std::io::Write;
use std::path::PathBuf;

/// `handler(arguments, last_status, should_exit) -> status`
pub type Handler = fn(&[String], i32, &mut bool) -> i32;

#[derive(Clone, Copy)]
pub struct Builtin {
	pub name: &'static str,
	pub handler: Handler,
}

/// Ordered name-to-handler table; the first matching entry wins.
pub struct BuiltinSet {
	entries: Vec<Builtin>,
}

impl BuiltinSet {
	pub fn new(entries: Vec<Builtin>) -> BuiltinSet {
		BuiltinSet { entries: entries }
	}

	pub fn standard() -> BuiltinSet {
		BuiltinSet::new(vec![
			Builtin { name: "exit", handler: builtin_exit },
			Builtin { name: "cd", handler: builtin_cd },
			Builtin { name: "status", handler: builtin_status },
		])
	}

	pub fn lookup(&self, name: &str) -> Option<Handler> {
		self.entries.iter().find(|b| b.name == name).map(|b| b.handler)
	}
}

fn builtin_exit(arguments: &[String], _last_status: i32, should_exit: &mut bool) -> i32 {
	*should_exit = true;
	match arguments.get(1) {
		None => 0,
		Some(arg) => match arg.parse() {
			Ok(status) => status,
			Err(_) => {
				let _ = writeln!(io::stderr(), "exit: numeric argument required");
				2
			},
		},
	}
}

fn builtin_cd(arguments: &[String], _last_status: i32, _should_exit: &mut bool) -> i32 {
	let target = match arguments.get(1) {
		Some(dir) => PathBuf::from(dir),
		None => match env::var_os("HOME") {
			Some(home) => PathBuf::from(home),
			None => {
				let _ = writeln!(io::stderr(), "cd: HOME not set");
				return 1;
			},
		},
	};
	if let Err(e) = env::set_current_dir(&target) {
		let _ = writeln!(io::stderr(), "cd: {}: {}", target.display(), e);
		return 1;
	}
	0
}

fn builtin_status(_arguments: &[String], last_status: i32, _should_exit: &mut bool) -> i32 {
	let _ = writeln!(io::stdout(), "{}", last_status);
	last_status
}
