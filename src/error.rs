use crate::typesetter::TypesetError;
use crate::version::VersionMismatch;
use gridpress_layout::LayoutError;
use gridpress_resource::ResourceError;
use gridpress_style::StyleParseError;
use gridpress_xpath::XPathError;
use gridpress_xref::XrefError;
use log::error;
use std::fmt;
use thiserror::Error;

/// Everything that can stop a run.
#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("Layout rules must use the namespace '{expected}', found '{found}'")]
    NamespaceMismatch { expected: String, found: String },

    #[error(transparent)]
    Version(#[from] VersionMismatch),

    #[error("Layout rules are not well-formed XML: {0}")]
    RuleSyntax(roxmltree::Error),

    #[error("Data document is not well-formed XML: {0}")]
    DataSyntax(roxmltree::Error),

    #[error("Element <{element}> (line {line}) requires the attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: String,
        line: u32,
    },

    #[error("Invalid value '{value}' for attribute '{attribute}' of <{element}>: {reason}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
        reason: String,
    },

    #[error("Test of page type '{pagetype}' must yield a single boolean, got {found}")]
    MalformedPredicate { pagetype: String, found: String },

    #[error("No page type is eligible for the current data")]
    NoPagetype,

    #[error("Page creation requested while a page is being created")]
    ReentrantPageCreation,

    #[error("No layout rule matches the root data element <{0}>")]
    MissingRootRule(String),

    #[error("Expression '{expression}' failed: {source}")]
    Expression {
        expression: String,
        #[source]
        source: XPathError,
    },

    #[error("Element <{element}> (line {line}): {message}")]
    Rule {
        element: String,
        line: u32,
        message: String,
    },

    #[error(transparent)]
    XPath(#[from] XPathError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Xref(#[from] XrefError),

    #[error(transparent)]
    Style(#[from] StyleParseError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Typeset(#[from] TypesetError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An [`ErrorKind`] plus whether it has been logged already. Nested dispatch
/// frames report an error once; outer frames pass it on unchanged.
#[derive(Debug)]
pub struct PublishError {
    kind: ErrorKind,
    reported: bool,
}

impl PublishError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            reported: false,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    /// Logs the error unless it was logged before.
    pub fn report(self) -> Self {
        self.report_with("")
    }

    /// Logs the error with a location prefix unless it was logged before.
    pub fn report_with(mut self, context: impl fmt::Display) -> Self {
        if !self.reported {
            let context = context.to_string();
            if context.is_empty() {
                error!("{}", self.kind);
            } else {
                error!("{}: {}", context, self.kind);
            }
            self.reported = true;
        }
        self
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl From<ErrorKind> for PublishError {
    fn from(kind: ErrorKind) -> Self {
        PublishError::new(kind)
    }
}

macro_rules! publish_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for PublishError {
                fn from(e: $source) -> Self {
                    PublishError::new(ErrorKind::from(e))
                }
            }
        )*
    };
}

publish_error_from!(
    VersionMismatch,
    XPathError,
    LayoutError,
    XrefError,
    StyleParseError,
    ResourceError,
    TypesetError,
    std::io::Error,
    serde_json::Error,
);
