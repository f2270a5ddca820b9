use docblock_core::{Batch, Language};

fn main() {
    let source = r#"
package demo

// <apidoc version="1.0.0">
// <title>Demo Service</title>
// <tag name="users" title="User management" />
// </apidoc>

// <api method="GET" summary="list users">
// <path path="/users" />
// <tag>users</tag>
// <response status="200" mimetype="application/json" />
// </api>
func listUsers() {}
"#;

    let go = Language::find("go").unwrap();
    let batch = Batch::new();
    batch.add_file(source, go, "demo.go");

    let (doc, errors) = batch.finish();
    for error in &errors {
        eprintln!("{:?}", miette::Report::new(error.clone()));
    }

    match doc.to_json() {
        Ok(json) => println!("Extracted documentation:\n{json}"),
        Err(e) => eprintln!("Serialization failed: {e}"),
    }
}
