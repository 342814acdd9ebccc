pub mod console;

pub use console::StdoutReporter;
