// End-to-end extraction across the supported comment syntaxes: the same
// documentation must come out identical no matter which language carried it.

use docblock_core::{extract, Batch, Language};

fn parse_one_api(source: &str, lang: &str, uri: &str) -> docblock_core::ApiDoc {
    let lang = Language::find(lang).unwrap();
    let batch = Batch::new();
    assert_eq!(batch.add_file(source, lang, uri), 0, "no errors expected");
    let (doc, errors) = batch.finish();
    assert!(errors.is_empty());
    doc
}

#[test]
fn test_go_line_comments() {
    let src = concat!(
        "package main\n",
        "// <api method=\"GET\" summary=\"ping\">\n",
        "// <path path=\"/ping\" />\n",
        "// </api>\n",
        "func main() {}\n",
    );
    let doc = parse_one_api(src, "go", "main.go");
    assert_eq!(doc.apis.len(), 1);
    assert_eq!(doc.apis[0].method.v(), "GET");
    assert_eq!(doc.apis[0].path.as_ref().unwrap().path.v(), "/ping");
}

#[test]
fn test_rust_doc_comments() {
    let src = concat!(
        "/// <api method=\"GET\" summary=\"ping\">\n",
        "/// <path path=\"/ping\" />\n",
        "/// </api>\n",
        "fn ping() {}\n",
    );
    let doc = parse_one_api(src, "rust", "lib.rs");
    assert_eq!(doc.apis[0].summary.as_ref().unwrap().v(), "ping");
}

#[test]
fn test_c_block_comment_with_prefix() {
    let src = concat!(
        "/**\n",
        " * <api method=\"POST\" summary=\"create\">\n",
        " * <path path=\"/users\" />\n",
        " * </api>\n",
        " */\n",
        "int create(void);\n",
    );
    let doc = parse_one_api(src, "c", "users.h");
    assert_eq!(doc.apis[0].method.v(), "POST");
}

#[test]
fn test_python_docstring() {
    let src = concat!(
        "\"\"\"\n",
        "<api method=\"DELETE\" summary=\"remove\">\n",
        "<path path=\"/users/{id}\">\n",
        "<param name=\"id\" type=\"number\" />\n",
        "</path>\n",
        "</api>\n",
        "\"\"\"\n",
        "def remove(id): pass\n",
    );
    let doc = parse_one_api(src, "python", "users.py");
    let path = doc.apis[0].path.as_ref().unwrap();
    assert_eq!(path.params[0].name.v(), "id");
}

#[test]
fn test_ruby_block_comment() {
    let src = concat!(
        "=begin\n",
        "<api method=\"GET\" summary=\"list\">\n",
        "<path path=\"/items\" />\n",
        "</api>\n",
        "=end\n",
        "def list; end\n",
    );
    let doc = parse_one_api(src, "ruby", "items.rb");
    assert_eq!(doc.apis[0].summary.as_ref().unwrap().v(), "list");
}

#[test]
fn test_php_hash_comments() {
    let src = concat!(
        "<?php\n",
        "# <api method=\"GET\" summary=\"ping\">\n",
        "# <path path=\"/ping\" />\n",
        "# </api>\n",
    );
    let doc = parse_one_api(src, "php", "ping.php");
    assert_eq!(doc.apis.len(), 1);
}

#[test]
fn test_comment_marker_inside_string_ignored() {
    let src = concat!(
        "s := \"// <api method=\\\"GET\\\" /> not documentation\"\n",
        "// <api method=\"PUT\">\n",
        "// <path path=\"/real\" />\n",
        "// </api>\n",
    );
    let doc = parse_one_api(src, "go", "strings.go");
    assert_eq!(doc.apis.len(), 1);
    assert_eq!(doc.apis[0].method.v(), "PUT");
}

#[test]
fn test_ordinary_comments_do_not_parse() {
    let src = concat!(
        "// just a note about the code below\n",
        "x := 1\n",
        "/* a block comment without markup */\n",
    );
    let doc = parse_one_api(src, "go", "plain.go");
    assert!(doc.apis.is_empty());
    assert!(doc.base.is_none());
}

#[test]
fn test_same_doc_across_languages() {
    let go = parse_one_api(
        "// <api method=\"GET\">\n// <path path=\"/x\" />\n// </api>\n",
        "go",
        "a.go",
    );
    let py = parse_one_api(
        "\"\"\"\n<api method=\"GET\">\n<path path=\"/x\" />\n</api>\n\"\"\"\n",
        "python",
        "a.py",
    );
    assert_eq!(go.apis[0].method.v(), py.apis[0].method.v());
    assert_eq!(
        go.apis[0].path.as_ref().unwrap().path.v(),
        py.apis[0].path.as_ref().unwrap().path.v()
    );
}

#[test]
fn test_extract_positions_are_absolute() {
    let src = "x := 1\ny := 2\n  // <api />\n";
    let out = extract(src, Language::find("go").unwrap(), "pos.go");
    assert_eq!(out.blocks.len(), 1);
    let loc = &out.blocks[0].location;
    assert_eq!(loc.range.start.line, 2);
    assert_eq!(loc.range.start.character, 2);
}

#[test]
fn test_extension_lookup_end_to_end() {
    let lang = Language::by_extension("rs").unwrap();
    let out = extract("/// <api method=\"GET\" />\n", lang, "x.rs");
    assert_eq!(out.blocks.len(), 1);
}
