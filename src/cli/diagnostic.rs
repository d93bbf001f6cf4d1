//! Miette-based error diagnostics for CLI error presentation.
//!
//! Provides rich error types with source code context, labels, and help
//! suggestions for improved user experience when errors occur.
//!
//! The struct fields are used by miette's derive macros at runtime to
//! render formatted error output with code snippets and annotations.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use super::output;
use crate::error::{ConfigError, Error};

/// Configuration syntax error with source location context.
///
/// Displays the configuration file content with a labeled span pointing
/// to the problematic location, along with an optional help message.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(wearwolf::config))]
pub struct ConfigSyntaxError {
    /// Human-readable error message.
    pub message: String,

    /// Source content (typically the configuration file).
    #[source_code]
    pub src: String,

    /// Byte offset and length of the problematic region.
    #[label("here")]
    pub span: SourceSpan,

    /// Optional help text with suggestions for fixing the error.
    #[help]
    pub help: Option<String>,
}

impl ConfigSyntaxError {
    /// Create a new configuration error with source location.
    #[must_use]
    pub fn new(message: impl Into<String>, src: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            message: message.into(),
            src: src.into(),
            span,
            help: None,
        }
    }

    /// Add a help suggestion to the error.
    ///
    /// Returns the modified error for method chaining.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Print an error to stderr, with source context where available.
///
/// TOML parse failures render as an annotated snippet of the offending
/// file; everything else falls back to the plain error line. JSON mode
/// always gets the plain line so output stays machine-readable.
pub fn render(error: &Error) {
    if let Error::Config(ConfigError::Parse {
        path,
        content,
        source,
    }) = error
    {
        if !output::is_json() {
            let span = source
                .span()
                .map(SourceSpan::from)
                .unwrap_or_else(|| (0, 0).into());
            let diagnostic = ConfigSyntaxError::new(source.message(), content.clone(), span)
                .with_help(format!(
                    "fix the highlighted TOML in {path}, then run `wearwolf config validate`"
                ));
            eprintln!("{:?}", miette::Report::new(diagnostic));
            return;
        }
    }

    output::error(&error.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Config;
    use std::path::Path;

    #[test]
    fn test_with_help_chains() {
        let diag = ConfigSyntaxError::new("bad value", "level = 3", (0, 5).into())
            .with_help("use a string");
        assert_eq!(diag.help.as_deref(), Some("use a string"));
        assert_eq!(diag.message, "bad value");
    }

    #[test]
    fn test_parse_failure_becomes_annotated_report() {
        let content = "[logging]\nlevel = \n";
        let error = Config::parse_toml(content, Path::new("bad.toml")).unwrap_err();

        match &error {
            Error::Config(ConfigError::Parse { source, .. }) => {
                // the span falls inside the source we keep for rendering
                if let Some(span) = source.span() {
                    assert!(span.start <= content.len());
                }
            }
            other => panic!("expected Parse error, got {other:?}"),
        }

        // must not panic while rendering
        render(&error);
    }
}
