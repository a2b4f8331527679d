//! Integration tests using TOML fixtures.
//!
//! This test harness loads test cases from TOML files in the `fixtures/` directory
//! and runs them against the citelink library.

mod common;

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde::Deserialize;

/// A test fixture loaded from a TOML file.
#[derive(Debug, Deserialize)]
struct Fixture {
    /// Name of the test case
    name: String,
    /// Input Markdown text
    markdown: String,
    /// Sources file content (JSON, JSONL or envelope)
    #[serde(default)]
    sources: String,
    /// Expected rendered body
    #[serde(default)]
    expected_html: Option<String>,
    /// Expected link targets, in document order
    #[serde(default)]
    expected_targets: Option<Vec<String>>,
    /// Expected references list; empty string means none
    #[serde(default)]
    expected_references: Option<String>,
}

/// Load all fixtures from a directory.
fn load_fixtures(dir: &Path) -> Vec<(String, Fixture)> {
    let mut fixtures = Vec::new();

    if !dir.exists() {
        return fixtures;
    }

    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();

        if path.extension().is_some_and(|e| e == "toml") {
            let content = fs::read_to_string(&path).unwrap();
            let fixture: Fixture = toml::from_str(&content).unwrap();
            let name = path.file_stem().unwrap().to_string_lossy().to_string();
            fixtures.push((name, fixture));
        }
    }

    fixtures.sort_by(|a, b| a.0.cmp(&b.0));
    fixtures
}

/// Run linking tests - verify the linked tree and rendered body.
fn run_linking_test(name: &str, fixture: &Fixture) {
    let mut tree = citelink::parse_document(&fixture.markdown);
    let text_before = tree.text_content();
    citelink::Pipeline::default().apply(&mut tree);

    assert_eq!(
        tree.text_content(),
        text_before,
        "Test '{}' changed the document text",
        name
    );

    if let Some(expected) = &fixture.expected_targets {
        assert_eq!(
            &common::link_targets(&tree),
            expected,
            "Test '{}' link targets mismatch",
            name
        );
    }

    if let Some(expected) = &fixture.expected_html {
        assert_eq!(
            citelink::render_html(&tree).trim(),
            expected.trim(),
            "Test '{}' output mismatch",
            name
        );
    }
}

/// Run rendering tests - verify the references list against the sources.
fn run_rendering_test(name: &str, fixture: &Fixture) {
    let official = citelink::Config::default().official_domains;
    let sources = citelink::parse_sources(&fixture.sources, &official)
        .unwrap_or_else(|e| panic!("Test '{}' has invalid sources: {}", name, e));

    let references = citelink::render_references(&fixture.markdown, &sources);

    if let Some(expected) = &fixture.expected_references {
        if expected.is_empty() {
            assert!(
                references.is_none(),
                "Test '{}' expected no references, got {:?}",
                name,
                references
            );
        } else {
            assert_eq!(
                references.as_deref().map(str::trim),
                Some(expected.trim()),
                "Test '{}' references mismatch",
                name
            );
        }
    }

    if let Some(expected) = &fixture.expected_html {
        assert_eq!(
            citelink::render_markdown(&fixture.markdown).trim(),
            expected.trim(),
            "Test '{}' output mismatch",
            name
        );
    }
}

#[test]
fn test_linking_fixtures() {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/linking");
    let fixtures = load_fixtures(&fixtures_dir);
    assert!(!fixtures.is_empty(), "no linking fixtures found");

    for (name, fixture) in fixtures {
        println!("Running linking test: {}", fixture.name);
        run_linking_test(&name, &fixture);
    }
}

#[test]
fn test_rendering_fixtures() {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/rendering");
    let fixtures = load_fixtures(&fixtures_dir);
    assert!(!fixtures.is_empty(), "no rendering fixtures found");

    for (name, fixture) in fixtures {
        println!("Running rendering test: {}", fixture.name);
        run_rendering_test(&name, &fixture);
    }
}

#[test]
fn test_full_document() {
    // Given: the shared answer and its sources
    let official = citelink::Config::default().official_domains;
    let sources = citelink::parse_sources(common::TEST_SOURCES, &official).unwrap();

    // When: we render body and references and assemble them
    let body = citelink::render_markdown(common::TEST_MARKDOWN);
    let references = citelink::render_references(common::TEST_MARKDOWN, &sources);
    let output = citelink::generate_output(&body, references.as_deref(), "Sources");

    // Then: every citation link has a matching anchor
    for number in ["1", "2", "3"] {
        assert!(output.contains(&format!("<a href=\"#ref-{}\">[{}]</a>", number, number)));
        assert!(output.contains(&format!("<li id=\"ref-{}\">", number)));
    }
    // And: the citation inside the authored link stays plain text
    assert!(output.contains("<a href=\"https://www.ndis.gov.au/guide\">the guide [1]</a>"));
    assert!(output.contains("<h2 class=\"references-header\">Sources</h2>"));
}
