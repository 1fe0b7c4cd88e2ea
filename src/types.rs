use std::path::PathBuf;

/// Where a stage's standard output goes.
#[derive(Debug, PartialEq, Eq)]
pub enum Output {
	/// The stream the shell itself was given.
	Inherit,
	/// The pipe feeding the next stage.
	Pipe,
	Append(PathBuf),
	Truncate(PathBuf),
}

/// One command in a pipeline, owning the link to its successor.
#[derive(Debug)]
pub struct Stage {
	pub arguments: Vec<String>,
	pub input_source: Option<PathBuf>,
	pub output: Output,
	pub next: Option<Box<Stage>>,
}

impl Drop for Stage {
	fn drop(&mut self) {
		// Unlink successors first; the default recursive drop would
		// otherwise use one stack frame per stage.
		let mut next = self.next.take();
		while let Some(mut stage) = next {
			next = stage.next.take();
		}
	}
}
