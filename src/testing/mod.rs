mod fake_command_runner;
mod test_project;

pub use fake_command_runner::FakeCommandRunner;
pub use test_project::{TestContext, TestProject};
