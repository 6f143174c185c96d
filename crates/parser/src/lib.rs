//! Plugbay Parser - Parsers for plugin identifiers and repository URLs using nom combinators.

mod combinators;
mod error;
mod lexer;
mod reference;

pub use error::ParseError;
pub use reference::MarketplaceRef;

use nom::IResult;
use plugbay_core::{GitHubRepo, UniqueIdentifier};

use crate::lexer::{Span, span};

/// Parses a platform identifier such as `acme/search:1.2.0@3f2a...`.
pub fn parse_unique_identifier(input: &str) -> Result<UniqueIdentifier, ParseError> {
    run(input, "plugin identifier", combinators::unique_identifier)
}

/// Parses a marketplace reference such as `acme/search@1.2.0`.
pub fn parse_marketplace_ref(input: &str) -> Result<MarketplaceRef, ParseError> {
    run(input, "marketplace reference", combinators::marketplace_ref)
}

/// Parses a GitHub repository URL or `owner/repo` shorthand.
pub fn parse_github_url(input: &str) -> Result<GitHubRepo, ParseError> {
    run(input, "GitHub repository URL", combinators::github_repo)
}

fn run<'a, T>(
    input: &'a str,
    expected: &str,
    parser: fn(Span<'a>) -> IResult<Span<'a>, T>,
) -> Result<T, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::eof(expected, input));
    }

    match parser(span(trimmed)) {
        Ok((_, value)) => Ok(value),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = e.input.location_offset();
            let message = if offset >= trimmed.len() {
                "unexpected end of input".to_string()
            } else {
                format!("unexpected '{}'", &trimmed[offset..])
            };
            Err(ParseError::new(expected, message, trimmed, offset))
        }
        Err(nom::Err::Incomplete(_)) => Err(ParseError::eof(expected, trimmed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_roundtrip() {
        let text = "acme/weather:1.4.2@9f86d081884c7d65";
        let id = parse_unique_identifier(text).unwrap();
        assert_eq!(id.to_string(), text);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let repo = parse_github_url("  https://github.com/acme/weather  ").unwrap();
        assert_eq!(repo.slug(), "acme/weather");
    }

    #[test]
    fn test_error_points_at_failure() {
        let err = parse_unique_identifier("acme/weather").unwrap_err();
        assert_eq!(err.offset(), Some(12));
        assert!(err.to_string().contains("plugin identifier"));

        let err = parse_github_url("https://gitlab.com/acme/weather").unwrap_err();
        assert!(err.to_string().contains("GitHub repository URL"));
    }

    #[test]
    fn test_empty_input() {
        let err = parse_marketplace_ref("   ").unwrap_err();
        assert!(err.message.contains("end of input"));
    }

    #[test]
    fn test_converts_into_core_error() {
        let err: plugbay_core::PlugbayError = parse_marketplace_ref("nope").unwrap_err().into();
        assert!(matches!(err, plugbay_core::PlugbayError::Parse { .. }));
    }
}
