//! Process Launcher Implementations

mod system;

pub use system::SystemProcessLauncher;
