use hybrid_row::prelude::*;

const NAMESPACE_JSON: &str = r#"{
    "name": "telemetry",
    "schemas": [
        {
            "name": "reading",
            "id": 10,
            "properties": [
                {
                    "path": "device",
                    "type": { "type": "primitive", "kind": "guid", "storage": "fixed", "nullable": true }
                },
                {
                    "path": "value",
                    "type": { "type": "primitive", "kind": "float64", "storage": "fixed", "nullable": true }
                },
                {
                    "path": "labels",
                    "type": {
                        "type": "array",
                        "items": { "type": "primitive", "kind": "utf8", "storage": "sparse", "nullable": false },
                        "nullable": true
                    }
                },
                {
                    "path": "site",
                    "type": { "type": "udt", "name": "site", "nullable": true }
                }
            ]
        },
        {
            "name": "site",
            "id": 11,
            "properties": [
                {
                    "path": "name",
                    "type": { "type": "primitive", "kind": "utf8", "storage": "variable", "nullable": true, "length": 128 }
                }
            ]
        }
    ]
}"#;

#[test]
fn namespace_parses_from_json_and_compiles() {
    let ns: Namespace = serde_json::from_str(NAMESPACE_JSON).unwrap();
    assert_eq!(ns.schemas().len(), 2);

    let resolver = LayoutResolverNamespace::new(ns, None);
    let reading = resolver.resolve(SchemaId::new(10));
    assert_eq!(reading.num_fixed(), 2);

    let labels = reading.try_find("labels").unwrap();
    assert_eq!(labels.layout_type().code(), LayoutCode::TypedArrayScope);

    // The UDT reference resolves by name to the sibling schema.
    let site = reading.try_find("site").unwrap();
    assert_eq!(site.type_args().schema_id(), SchemaId::new(11));
}

#[test]
fn namespace_serializes_back_to_text() {
    let ns: Namespace = serde_json::from_str(NAMESPACE_JSON).unwrap();
    let text = serde_json::to_string(&ns).unwrap();
    let reparsed: Namespace = serde_json::from_str(&text).unwrap();
    assert_eq!(reparsed, ns);
}
