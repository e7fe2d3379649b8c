//! A compact XPath-1.0-style expression language over `roxmltree` data trees.
//!
//! Layout rules use it to select data nodes (`ProcessNode select="item"`), to compute
//! values (`Value select="concat(@first, ' ', @last)"`) and to test conditions
//! (`Pagetype test="sd:odd(sd:current-page())"`). Functions with a prefix are routed to
//! an [`ExtensionFunctions`] implementation supplied by the caller.

pub mod ast;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod functions;
pub mod parser;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use datasource::DataNode;
pub use engine::{EvaluationContext, Value, VariableResolver, evaluate};
pub use error::XPathError;
pub use functions::{ExtensionFunctions, NoExtensions};
pub use parser::parse_expression;
