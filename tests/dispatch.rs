use msh::builtin::{Builtin, BuiltinSet};
use msh::dispatch::dispatch;
use msh::exec::EXEC_FAILURE;

use std::env;
use std::fs;
use std::sync::{Mutex, MutexGuard};

// External commands redirect the test process's stdio, and cd moves its
// working directory; both are process-global.
static SHELL_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
	SHELL_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn blank_input_keeps_the_previous_status() {
	let builtins = BuiltinSet::standard();
	let mut should_exit = false;
	assert_eq!(dispatch("", 7, &builtins, &mut should_exit), 7);
	assert_eq!(dispatch("   \t\n", 7, &builtins, &mut should_exit), 7);
	assert!(!should_exit);
}

#[test]
fn parse_failure_reports_and_spawns_nothing() {
	let builtins = BuiltinSet::standard();
	let mut should_exit = false;
	assert_eq!(dispatch("| cat\n", 3, &builtins, &mut should_exit), EXEC_FAILURE);
	assert_eq!(dispatch("echo >\n", 3, &builtins, &mut should_exit), EXEC_FAILURE);
	assert!(!should_exit);
}

#[test]
fn exit_builtin_requests_shutdown() {
	let builtins = BuiltinSet::standard();
	let mut should_exit = false;
	assert_eq!(dispatch("exit\n", 9, &builtins, &mut should_exit), 0);
	assert!(should_exit);

	let mut should_exit = false;
	assert_eq!(dispatch("exit 5\n", 0, &builtins, &mut should_exit), 5);
	assert!(should_exit);
}

#[test]
fn status_builtin_echoes_the_previous_status() {
	let builtins = BuiltinSet::standard();
	let mut should_exit = false;
	assert_eq!(dispatch("status\n", 4, &builtins, &mut should_exit), 4);
	assert!(!should_exit);
}

#[test]
fn registry_entry_shadows_an_external_command() {
	fn fake_echo(_: &[String], _: i32, _: &mut bool) -> i32 {
		42
	}
	let builtins = BuiltinSet::new(vec![Builtin { name: "echo", handler: fake_echo }]);
	let mut should_exit = false;
	assert_eq!(dispatch("echo hi\n", 0, &builtins, &mut should_exit), 42);
}

#[test]
fn unknown_name_runs_an_external_command() {
	let _guard = lock();
	let dir = tempfile::tempdir().unwrap();
	let out = dir.path().join("out.txt");
	let builtins = BuiltinSet::standard();
	let mut should_exit = false;

	let line = format!("echo hi > {}\n", out.display());
	assert_eq!(dispatch(&line, 0, &builtins, &mut should_exit), 0);
	assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
	assert!(!should_exit);
}

#[test]
fn whole_line_pipeline_runs_end_to_end() {
	let _guard = lock();
	let dir = tempfile::tempdir().unwrap();
	let out = dir.path().join("out.txt");
	let builtins = BuiltinSet::standard();
	let mut should_exit = false;

	let line = format!("echo hello | cat | cat > {}\n", out.display());
	assert_eq!(dispatch(&line, 0, &builtins, &mut should_exit), 0);
	assert_eq!(fs::read_to_string(&out).unwrap(), "hello\n");
}

#[test]
fn missing_command_comes_back_as_127() {
	let _guard = lock();
	let builtins = BuiltinSet::standard();
	let mut should_exit = false;
	assert_eq!(dispatch("msh-no-such-program\n", 0, &builtins, &mut should_exit), 127);
}

#[test]
fn cd_builtin_changes_the_working_directory() {
	let _guard = lock();
	let original = env::current_dir().unwrap();
	let dir = tempfile::tempdir().unwrap();
	let builtins = BuiltinSet::standard();
	let mut should_exit = false;

	let line = format!("cd {}\n", dir.path().display());
	assert_eq!(dispatch(&line, 0, &builtins, &mut should_exit), 0);
	assert_eq!(env::current_dir().unwrap(), dir.path().canonicalize().unwrap());

	assert_eq!(dispatch("cd /no/such/directory\n", 0, &builtins, &mut should_exit), 1);

	env::set_current_dir(original).unwrap();
}
