//! Safe evaluation of user-authored code overrides.
//!
//! Source text is parsed with a closed grammar into [`DslNode`]s; it is never
//! executed. Evaluation failures are captured in the result instead of being
//! returned as errors, so the editor can show them against the attempted source.

mod expr;
mod lexer;

pub use expr::ExprParser;
pub use lexer::{Lexer, Token, TokenKind};

use crate::config::EngineConfig;
use crate::error::{Result, ThemeError};
use crate::model::DslNode;
use crate::path::FlatPathMap;
use serde::{Deserialize, Serialize};

/// Outcome of compiling a code override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledOverride {
    /// Compiled object with placeholders, or an empty object on failure.
    pub compiled: DslNode,
    /// Flat view of `compiled` with placeholders as structured values.
    pub flat: FlatPathMap,
    /// Evaluation error message, if any.
    pub error: Option<String>,
}

impl CompiledOverride {
    /// Whether compilation succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Whether the override contributes nothing.
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// The stored error as a [`ThemeError`].
    pub fn as_error(&self) -> Option<ThemeError> {
        self.error.as_ref().map(|message| ThemeError::CodeEvaluation {
            message: message.clone(),
        })
    }
}

/// Parse `source` into a DSL object, failing on anything outside the grammar.
pub fn parse_override(source: &str, config: &EngineConfig) -> Result<DslNode> {
    if source.len() > config.max_source_len {
        return Err(ThemeError::CodeEvaluation {
            message: format!(
                "Source is {} bytes, the limit is {}",
                source.len(),
                config.max_source_len
            ),
        });
    }

    let tokens = Lexer::new(source).tokenize()?;
    if tokens.first().map(|t| &t.kind) == Some(&TokenKind::Eof) {
        return Ok(DslNode::empty_object());
    }

    let node = ExprParser::new(tokens, config.max_nesting_depth).parse_program()?;
    match node {
        DslNode::Object { .. } => Ok(node),
        _ => Err(ThemeError::CodeEvaluation {
            message: "Code override must evaluate to an object".to_string(),
        }),
    }
}

/// Compile a code override. Never fails: errors are stored in the result.
pub fn compile_override(source: &str, config: &EngineConfig) -> CompiledOverride {
    match parse_override(source, config) {
        Ok(compiled) => {
            let flat = compiled.flatten();
            tracing::debug!("Compiled code override into {} path(s)", flat.len());
            CompiledOverride {
                compiled,
                flat,
                error: None,
            }
        }
        Err(err) => {
            let message = match err {
                ThemeError::CodeEvaluation { message } => message,
                other => other.to_string(),
            };
            tracing::debug!("Code override rejected: {}", message);
            CompiledOverride {
                compiled: DslNode::empty_object(),
                flat: FlatPathMap::new(),
                error: Some(message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_success() {
        let result = compile_override(
            "{ palette: { primary: { main: '#00ff00' } } }",
            &EngineConfig::default(),
        );
        assert!(result.is_ok());
        assert_eq!(result.flat.get("palette.primary.main"), Some(&json!("#00ff00")));
    }

    #[test]
    fn test_compile_empty_source_is_empty_override() {
        let result = compile_override("  // nothing yet\n", &EngineConfig::default());
        assert!(result.is_ok());
        assert!(result.is_empty());
    }

    #[test]
    fn test_compile_malformed_source() {
        let result = compile_override(
            "{ palette: { primary: { main: #invalid",
            &EngineConfig::default(),
        );
        assert!(result.error.is_some());
        assert!(result.flat.is_empty());
        assert!(result.compiled.is_empty_object());
    }

    #[test]
    fn test_compile_non_object_rejected() {
        let result = compile_override("[1, 2]", &EngineConfig::default());
        insta::assert_snapshot!(
            result.error.unwrap_or_default(),
            @"Code override must evaluate to an object"
        );
    }

    #[test]
    fn test_compile_source_length_limit() {
        let config = EngineConfig {
            max_source_len: 8,
            ..Default::default()
        };
        let result = compile_override("{ spacing: 4 }", &config);
        assert!(result.error.unwrap_or_default().contains("limit is 8"));
    }

    #[test]
    fn test_compile_deep_nesting_is_handled() {
        let source = format!("{{ a: {}1{} }}", "[".repeat(10_000), "]".repeat(10_000));
        let result = compile_override(&source, &EngineConfig::default());
        assert!(result.error.is_some());
    }
}
