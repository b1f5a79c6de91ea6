pub mod devices;
pub mod watch;
