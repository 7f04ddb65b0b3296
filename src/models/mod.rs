pub mod kind;
pub mod loaders;
pub mod record;
pub mod registry;
pub mod typed;

pub use kind::QuestionKind;
pub use loaders::{load_document, SourceDocument};
pub use record::{Answer, AnswerLabel, QuestionRecord};
pub use registry::TypeRegistry;
pub use typed::{DocItem, QuestionBody, TypedQuestion};
