// Multi-file accumulation: one <apidoc> block plus any number of <api> blocks
// spread across files, in any order, merged into a single tree.

use docblock_core::{Batch, Language};

fn go() -> &'static Language {
    Language::find("go").unwrap()
}

const DOC_FILE: &str = concat!(
    "// <apidoc version=\"1.2.3\">\n",
    "// <title>Store API</title>\n",
    "// <tag name=\"orders\" title=\"Order management\" />\n",
    "// <server name=\"prod\" url=\"https://api.example.com\" />\n",
    "// <mimetype>application/json</mimetype>\n",
    "// </apidoc>\n",
);

const ORDERS_FILE: &str = concat!(
    "// <api method=\"GET\" summary=\"list orders\">\n",
    "// <path path=\"/orders\" />\n",
    "// <tag>orders</tag>\n",
    "// <server>prod</server>\n",
    "// <response status=\"200\" mimetype=\"application/json\" type=\"object\">\n",
    "// <param name=\"total\" type=\"number\" summary=\"order count\" />\n",
    "// </response>\n",
    "// </api>\n",
    "\n",
    "// <api method=\"POST\" summary=\"create order\">\n",
    "// <path path=\"/orders\" />\n",
    "// <response status=\"201\" mimetype=\"application/json\" />\n",
    "// </api>\n",
);

#[test]
fn test_merge_across_files() {
    let batch = Batch::new();
    assert_eq!(batch.add_file(DOC_FILE, go(), "doc.go"), 0);
    assert_eq!(batch.add_file(ORDERS_FILE, go(), "orders.go"), 0);
    let (doc, errors) = batch.finish();
    assert!(errors.is_empty());

    assert_eq!(doc.version.as_ref().unwrap().v(), "1.2.3");
    assert_eq!(doc.title.as_ref().unwrap().v(), "Store API");
    assert_eq!(doc.apis.len(), 2);
    assert!(doc.tag_exists("orders"));
    assert!(doc.server_exists("prod"));

    // Tag references on the entries point at the declared tag.
    let list = &doc.apis[0];
    assert!(doc.tag_exists(list.tags[0].v()));
    assert!(doc.server_exists(list.servers[0].v()));
}

#[test]
fn test_file_order_does_not_matter() {
    let forward = Batch::new();
    forward.add_file(DOC_FILE, go(), "doc.go");
    forward.add_file(ORDERS_FILE, go(), "orders.go");

    let reverse = Batch::new();
    reverse.add_file(ORDERS_FILE, go(), "orders.go");
    reverse.add_file(DOC_FILE, go(), "doc.go");

    let (a, _) = forward.finish();
    let (b, _) = reverse.finish();
    assert_eq!(a.title, b.title);
    assert_eq!(a.apis.len(), b.apis.len());
    assert_eq!(a.tags, b.tags);
}

#[test]
fn test_empty_batch() {
    let (doc, errors) = Batch::new().finish();
    assert!(doc.base.is_none());
    assert!(doc.apis.is_empty());
    assert!(errors.is_empty());
}

#[test]
fn test_concurrent_add_file() {
    let batch = Batch::new();
    let sources: Vec<String> = (0..16)
        .map(|i| {
            format!(
                "// <api method=\"GET\" summary=\"endpoint {i}\">\n// <path path=\"/e/{i}\" />\n// </api>\n"
            )
        })
        .collect();

    std::thread::scope(|s| {
        for (i, src) in sources.iter().enumerate() {
            let batch = &batch;
            s.spawn(move || batch.add_file(src, go(), &format!("f{i}.go")));
        }
    });

    let (doc, errors) = batch.finish();
    assert!(errors.is_empty());
    assert_eq!(doc.apis.len(), 16);
}

#[test]
fn test_json_serialization_of_merged_tree() {
    let batch = Batch::new();
    batch.add_file(DOC_FILE, go(), "doc.go");
    batch.add_file(ORDERS_FILE, go(), "orders.go");
    let (doc, _) = batch.finish();

    let json = doc.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["version"]["value"]["value"], "1.2.3");
    assert_eq!(value["apis"].as_array().unwrap().len(), 2);
    assert_eq!(
        value["tags"][0]["name"]["value"]["value"],
        "orders"
    );

    let yaml = doc.to_yaml().unwrap();
    assert!(yaml.contains("Store API"));
}

#[test]
fn test_mixed_languages_in_one_batch() {
    let batch = Batch::new();
    batch.add_file(DOC_FILE, go(), "doc.go");
    batch.add_file(
        "/// <api method=\"PUT\">\n/// <path path=\"/rusty\" />\n/// </api>\n",
        Language::find("rust").unwrap(),
        "lib.rs",
    );
    batch.add_file(
        "\"\"\"\n<api method=\"PATCH\">\n<path path=\"/snaky\" />\n</api>\n\"\"\"\n",
        Language::find("python").unwrap(),
        "app.py",
    );
    let (doc, errors) = batch.finish();
    assert!(errors.is_empty());
    assert_eq!(doc.apis.len(), 2);
    assert_eq!(doc.title.as_ref().unwrap().v(), "Store API");
}
