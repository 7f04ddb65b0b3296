pub mod document_renderer;
pub mod import_renderer;
pub mod normalizer;
pub mod output_writer;
pub mod parser;
pub mod preflight;
pub mod report_writer;
pub mod shuffler;
pub mod variants;

pub use document_renderer::DocumentRenderer;
pub use import_renderer::ImportRenderer;
pub use normalizer::Normalizer;
pub use output_writer::{OutputFile, OutputWriter};
pub use parser::LineParser;
pub use preflight::Preflight;
pub use report_writer::{DocumentOutcome, ReportWriter};
pub use shuffler::AnswerShuffler;
pub use variants::VariantExpander;
