//! Nom parser combinators for plugin references.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::char,
    combinator::{eof, map, opt},
    sequence::preceded,
};

use plugbay_core::{GitHubRepo, UniqueIdentifier};

use crate::lexer::Span;
use crate::reference::MarketplaceRef;

// ============================================================================
// Segments
// ============================================================================

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_')
}

/// Parses a plugin, author or repository name.
pub fn name_segment(input: Span) -> IResult<Span, String> {
    map(take_while1(is_name_char), |s: Span| s.fragment().to_string()).parse(input)
}

/// Parses a GitHub owner (letters, digits and dashes).
fn owner_segment(input: Span) -> IResult<Span, String> {
    map(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
        |s: Span| s.fragment().to_string(),
    )
    .parse(input)
}

/// Parses a version such as `1.2.0`, `v1.2.0` or `1.0.0-beta.1`.
pub fn version_segment(input: Span) -> IResult<Span, String> {
    map(take_while1(is_version_char), |s: Span| s.fragment().to_string()).parse(input)
}

fn checksum_segment(input: Span) -> IResult<Span, String> {
    map(
        take_while1(|c: char| c.is_ascii_alphanumeric()),
        |s: Span| s.fragment().to_string(),
    )
    .parse(input)
}

// ============================================================================
// Unique identifiers
// ============================================================================

/// Parses `[author/]name:version[@checksum]`.
pub fn unique_identifier(input: Span) -> IResult<Span, UniqueIdentifier> {
    let (input, first) = name_segment(input)?;
    let (input, second) = opt(preceded(char('/'), name_segment)).parse(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, version) = version_segment(input)?;
    let (input, checksum) = opt(preceded(char('@'), checksum_segment)).parse(input)?;
    let (input, _) = eof(input)?;

    let (author, name) = match second {
        Some(name) => (first, name),
        None => (String::new(), first),
    };

    Ok((
        input,
        UniqueIdentifier {
            author,
            name,
            version,
            checksum,
        },
    ))
}

// ============================================================================
// Marketplace references
// ============================================================================

/// Parses `author/name[@version]` or `author/name[:version]`.
pub fn marketplace_ref(input: Span) -> IResult<Span, MarketplaceRef> {
    let (input, author) = name_segment(input)?;
    let (input, _) = char('/').parse(input)?;
    let (input, name) = name_segment(input)?;
    let (input, version) =
        opt(preceded(alt((char('@'), char(':'))), version_segment)).parse(input)?;
    let (input, _) = eof(input)?;

    Ok((
        input,
        MarketplaceRef {
            author,
            name,
            version,
        },
    ))
}

// ============================================================================
// GitHub repositories
// ============================================================================

/// Parses the optional `https://[www.]github.com/` prefix.
fn github_prefix(input: Span) -> IResult<Span, ()> {
    let (input, _) = opt(alt((tag_no_case("https://"), tag_no_case("http://")))).parse(input)?;
    let (input, _) = opt(tag_no_case("www.")).parse(input)?;
    let (input, _) = tag_no_case("github.com/").parse(input)?;
    Ok((input, ()))
}

/// Parses a repository URL or `owner/repo` shorthand.
///
/// A trailing `.git` and a trailing slash are dropped.
pub fn github_repo(input: Span) -> IResult<Span, GitHubRepo> {
    let (input, _) = opt(github_prefix).parse(input)?;
    let (input, owner) = owner_segment(input)?;
    let (input, _) = char('/').parse(input)?;
    let (input, repo) = name_segment(input)?;
    let (input, _) = opt(char('/')).parse(input)?;
    let (input, _) = eof(input)?;

    let repo = repo.strip_suffix(".git").unwrap_or(&repo).to_string();
    Ok((input, GitHubRepo { owner, repo }))
}
