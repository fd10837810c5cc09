//! Docsmith Docs - summarization and document generation
//!
//! Turns a repository tree into a path-keyed analysis result and renders the
//! README and code documentation from it.

pub mod code_docs;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod readme;
pub mod session;
pub mod summarizer;

pub use code_docs::*;
pub use output::*;
pub use pipeline::*;
pub use prompts::*;
pub use readme::*;
pub use session::*;
pub use summarizer::*;
