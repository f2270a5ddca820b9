#![cfg(feature = "lsp")]

// Position queries against a tree built from multiple files. The ranges the
// scanner and parser record are the only thing these lookups rely on, so this
// doubles as a coordinate-fidelity test. Queries name the file they are asked
// about: blocks from different files occupy the same line numbers, and only
// the uri disambiguates them.

use docblock_core::lsp::{find_node_at, hover_text, FoundNode};
use docblock_core::{Batch, Language, Position, UsageSheet};

const DOC_FILE: &str = concat!(
    "// <apidoc version=\"1.0.0\">\n",
    "// <title>Demo</title>\n",
    "// <license text=\"MIT\" url=\"https://opensource.org/licenses/MIT\" />\n",
    "// </apidoc>\n",
);

const API_FILE: &str = concat!(
    "package demo\n",
    "\n",
    "// <api method=\"GET\" summary=\"fetch\">\n",
    "// <path path=\"/things/{id}\">\n",
    "// <param name=\"id\" type=\"number\" summary=\"thing id\" />\n",
    "// </path>\n",
    "// <response status=\"200\" mimetype=\"json\" />\n",
    "// </api>\n",
);

fn doc() -> docblock_core::ApiDoc {
    let go = Language::find("go").unwrap();
    let batch = Batch::new();
    assert_eq!(batch.add_file(DOC_FILE, go, "doc.go"), 0);
    assert_eq!(batch.add_file(API_FILE, go, "api.go"), 0);
    let (doc, errors) = batch.finish();
    assert!(errors.is_empty());
    doc
}

#[test]
fn test_version_attribute_lookup() {
    let doc = doc();
    // Line 0 of doc.go: `// <apidoc version="1.0.0">`, character 11 is in
    // the version attribute.
    let found = find_node_at(&doc, "doc.go", Position::new(0, 11)).unwrap();
    assert_eq!(found.usage_key(), Some("usage-apidoc-version"));
}

#[test]
fn test_license_attribute_lookup() {
    let doc = doc();
    // Line 2: `// <license text="MIT" ... />`, character 12 is in `text`.
    let found = find_node_at(&doc, "doc.go", Position::new(2, 12)).unwrap();
    assert_eq!(found.usage_key(), Some("usage-license-text"));
}

#[test]
fn test_overlapping_lines_resolved_by_file() {
    let doc = doc();
    // Both files have markup on line 2: the <license> element in doc.go and
    // the <api> element in api.go. The same position must answer per file.
    let found = find_node_at(&doc, "doc.go", Position::new(2, 12)).unwrap();
    assert_eq!(found.usage_key(), Some("usage-license-text"));
    let found = find_node_at(&doc, "api.go", Position::new(2, 12)).unwrap();
    assert_eq!(found.usage_key(), Some("usage-api-method"));

    // doc.go has nothing on line 4 and beyond; api.go does.
    assert!(find_node_at(&doc, "doc.go", Position::new(4, 13)).is_none());
    assert!(find_node_at(&doc, "api.go", Position::new(4, 13)).is_some());
}

#[test]
fn test_api_entry_lookup_across_files() {
    let doc = doc();
    // api.go line 2 holds the <api> element; character 4 is the tag name,
    // which belongs to the entry itself rather than any attribute.
    let found = find_node_at(&doc, "api.go", Position::new(2, 4)).unwrap();
    assert!(matches!(found, FoundNode::Api(_)));

    // Line 4 character 13 sits inside the nested param's name attribute.
    let found = find_node_at(&doc, "api.go", Position::new(4, 13)).unwrap();
    assert_eq!(found.usage_key(), Some("usage-param-name"));
}

#[test]
fn test_response_status_lookup() {
    let doc = doc();
    // Line 6: `// <response status="200" ... />`, character 14 is in status.
    let found = find_node_at(&doc, "api.go", Position::new(6, 14)).unwrap();
    assert_eq!(found.usage_key(), Some("usage-response-status"));
}

#[test]
fn test_position_outside_everything() {
    let doc = doc();
    assert!(find_node_at(&doc, "doc.go", Position::new(0, 0)).is_none());
    assert!(find_node_at(&doc, "api.go", Position::new(50, 0)).is_none());
    assert!(find_node_at(&doc, "unknown.go", Position::new(0, 11)).is_none());
}

#[test]
fn test_hover_help_via_usage_sheet() {
    let doc = doc();
    let sheet = UsageSheet::builtin();
    let help = hover_text(&doc, "doc.go", Position::new(0, 11), &sheet).unwrap();
    assert!(help.contains("version"));
}
