pub mod escape;
pub mod logging;
pub mod spans;

pub use logging::truncate_text;
