use std::sync::Arc;

use hybrid_row::layout::typ;
use hybrid_row::prelude::*;

fn empty_schema_resolver(id: SchemaId) -> Arc<dyn LayoutResolver> {
    let mut ns = Namespace::default();
    ns.schemas.push(Schema::new("table", id));
    Arc::new(LayoutResolverNamespace::new(ns, None))
}

fn new_row(resolver: &Arc<dyn LayoutResolver>, id: SchemaId) -> RowBuffer {
    let layout = resolver.resolve(id);
    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    row
}

#[test]
fn sparse_scalars_round_trip() {
    let id = SchemaId::new(1);
    let resolver = empty_schema_resolver(id);
    let mut row = new_row(&resolver, id);

    let mut root = RowCursor::create(&row);
    root.find(&row, "count");
    row.write_sparse_i64(&mut root, -77, UpdateOptions::Upsert).unwrap();

    let mut root = RowCursor::create(&row);
    root.find(&row, "label");
    row.write_sparse_utf8(&mut root, "widget", UpdateOptions::Upsert).unwrap();

    let mut root = RowCursor::create(&row);
    root.find(&row, "flag");
    row.write_sparse_bool(&mut root, true, UpdateOptions::Upsert).unwrap();

    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "count");
    assert_eq!(row.read_sparse_i64(&mut cursor).unwrap(), -77);

    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "label");
    assert_eq!(row.read_sparse_utf8(&mut cursor).unwrap(), "widget");

    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "flag");
    assert!(row.read_sparse_bool(&mut cursor).unwrap());
}

#[test]
fn insert_and_update_enforce_presence() {
    let id = SchemaId::new(2);
    let resolver = empty_schema_resolver(id);
    let mut row = new_row(&resolver, id);

    // Update of a missing field fails.
    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "a");
    assert_eq!(
        row.write_sparse_i32(&mut cursor, 1, UpdateOptions::Update),
        Err(Error::NotFound)
    );

    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "a");
    row.write_sparse_i32(&mut cursor, 1, UpdateOptions::Insert).unwrap();

    // Insert of an existing field fails.
    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "a");
    assert_eq!(
        row.write_sparse_i32(&mut cursor, 2, UpdateOptions::Insert),
        Err(Error::Exists)
    );

    // Upsert overwrites in place.
    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "a");
    row.write_sparse_i32(&mut cursor, 3, UpdateOptions::Upsert).unwrap();
    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "a");
    assert_eq!(row.read_sparse_i32(&mut cursor).unwrap(), 3);
}

#[test]
fn reading_with_the_wrong_type_is_a_mismatch() {
    let id = SchemaId::new(3);
    let resolver = empty_schema_resolver(id);
    let mut row = new_row(&resolver, id);

    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "a");
    row.write_sparse_utf8(&mut cursor, "text", UpdateOptions::Upsert).unwrap();

    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "a");
    assert_eq!(row.read_sparse_i32(&mut cursor), Err(Error::TypeMismatch));
}

#[test]
fn deleting_sparse_fields() {
    let id = SchemaId::new(4);
    let resolver = empty_schema_resolver(id);
    let mut row = new_row(&resolver, id);

    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "a");
    row.write_sparse_i32(&mut cursor, 9, UpdateOptions::Upsert).unwrap();
    let length = row.length();

    // Deleting a missing field is a no-op.
    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "missing");
    row.delete_sparse(&mut cursor).unwrap();
    assert_eq!(row.length(), length);

    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "a");
    row.delete_sparse(&mut cursor).unwrap();
    assert!(row.length() < length);

    let mut cursor = RowCursor::create(&row);
    cursor.find(&row, "a");
    assert_eq!(row.read_sparse_i32(&mut cursor), Err(Error::NotFound));
}

#[test]
fn object_scopes_nest() {
    let id = SchemaId::new(5);
    let resolver = empty_schema_resolver(id);
    let mut row = new_row(&resolver, id);

    let mut root = RowCursor::create(&row);
    root.find(&row, "address");
    let mut address = row
        .write_scope(&mut root, &typ::OBJECT, TypeArgumentList::default(), UpdateOptions::Upsert)
        .unwrap();

    address.find(&row, "city");
    row.write_sparse_utf8(&mut address, "Dublin", UpdateOptions::Upsert).unwrap();
    address.find(&row, "zip");
    row.write_sparse_i32(&mut address, 42424, UpdateOptions::Upsert).unwrap();

    let mut root = RowCursor::create(&row);
    root.find(&row, "address");
    let mut address = row.read_scope(&root).unwrap();
    address.find(&row, "city");
    assert_eq!(row.read_sparse_utf8(&mut address).unwrap(), "Dublin");

    let mut root = RowCursor::create(&row);
    root.find(&row, "address");
    let mut address = row.read_scope(&root).unwrap();
    address.find(&row, "zip");
    assert_eq!(row.read_sparse_i32(&mut address).unwrap(), 42424);
}

#[test]
fn find_by_token_avoids_path_bytes() {
    let id = SchemaId::new(6);
    let mut schema = Schema::new("table", id);
    schema.properties.push(Property::new(
        "known",
        PropertyType::primitive(TypeKind::Int32, StorageKind::Sparse, true),
    ));
    let mut ns = Namespace::default();
    ns.schemas.push(schema);
    let resolver: Arc<dyn LayoutResolver> = Arc::new(LayoutResolverNamespace::new(ns, None));
    let mut row = new_row(&resolver, id);
    let layout = resolver.resolve(id);

    let mut cursor = RowCursor::create(&row);
    let token = layout.tokenizer().try_find_token("known").unwrap().clone();
    cursor.find_token(&row, &token);
    row.write_sparse_i32(&mut cursor, 5, UpdateOptions::Upsert).unwrap();

    let mut cursor = RowCursor::create(&row);
    cursor.find_token(&row, &token);
    assert!(cursor.exists());
    assert_eq!(cursor.token(), token.id());
    assert_eq!(row.read_sparse_i32(&mut cursor).unwrap(), 5);
}
