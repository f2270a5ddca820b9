pub mod api;
pub mod ast;
pub mod error;
pub mod lang;
pub mod lexer;
#[cfg(feature = "lsp")]
pub mod lsp;
pub mod parser;
pub mod position;
pub mod token;
pub mod utils;

pub use api::{extract, Batch, UsageSheet};
pub use ast::ApiDoc;
pub use error::{DocError, SyntaxError};
pub use lang::{BlockRule, Language};
pub use lexer::{BlockKind, DocBlock, ScanOutput};
pub use parser::find_root_element_name;
pub use position::{Location, Position, Range};
