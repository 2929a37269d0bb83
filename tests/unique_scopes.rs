use std::sync::Arc;

use hybrid_row::layout::typ;
use hybrid_row::prelude::*;

fn schema_with(property: Property) -> (Arc<dyn LayoutResolver>, SchemaId) {
    let id = SchemaId::new(1);
    let mut schema = Schema::new("table", id);
    schema.properties.push(property);
    let mut ns = Namespace::default();
    ns.schemas.push(schema);
    (Arc::new(LayoutResolverNamespace::new(ns, None)), id)
}

fn set_of_utf8() -> Property {
    Property::new(
        "a",
        PropertyType::Set {
            items: Box::new(PropertyType::primitive(
                TypeKind::Utf8,
                StorageKind::Sparse,
                false,
            )),
            nullable: true,
            immutable: false,
        },
    )
}

fn map_of_utf8_to_int32() -> Property {
    Property::new(
        "m",
        PropertyType::Map {
            keys: Box::new(PropertyType::primitive(
                TypeKind::Utf8,
                StorageKind::Sparse,
                false,
            )),
            values: Box::new(PropertyType::primitive(
                TypeKind::Int32,
                StorageKind::Sparse,
                false,
            )),
            nullable: true,
            immutable: false,
        },
    )
}

fn read_set(row: &RowBuffer) -> Vec<String> {
    let mut root = RowCursor::create(row);
    root.find(row, "a");
    let mut items = row.read_scope(&root).unwrap();
    let mut values = Vec::new();
    while items.move_next(row) {
        values.push(row.read_sparse_utf8(&mut items).unwrap().to_owned());
    }
    values
}

#[test]
fn typed_set_uniqueness() {
    let (resolver, id) = schema_with(set_of_utf8());
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let args = layout.try_find("a").unwrap().type_args().clone();

    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let mut items = row
        .write_scope(&mut root, &typ::TYPED_SET, args, UpdateOptions::Upsert)
        .unwrap();

    // Writes into a unique scope require the deferred-index mode.
    assert_eq!(
        row.write_sparse_utf8(&mut items, "xyz", UpdateOptions::Upsert),
        Err(Error::InsufficientPermissions)
    );

    items.set_defer_unique_index(true);
    for value in ["xyz", "abc", "xyz"] {
        row.write_sparse_utf8(&mut items, value, UpdateOptions::Upsert).unwrap();
        items.move_next(&row);
    }

    // The duplicate trips the rebuild without mutating the row.
    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let mut scope = row.read_scope(&root).unwrap();
    assert_eq!(row.unique_index_rebuild(&mut scope), Err(Error::Exists));
    assert_eq!(read_set(&row), vec!["xyz", "abc", "xyz"]);

    // Remove the duplicate and rebuild again.
    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let mut scope = row.read_scope(&root).unwrap();
    assert!(scope.move_to(&row, 2));
    row.delete_sparse(&mut scope).unwrap();

    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let mut scope = row.read_scope(&root).unwrap();
    row.unique_index_rebuild(&mut scope).unwrap();

    // Iteration now yields ascending collation order.
    assert_eq!(read_set(&row), vec!["abc", "xyz"]);

    // Rebuild is idempotent.
    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let mut scope = row.read_scope(&root).unwrap();
    row.unique_index_rebuild(&mut scope).unwrap();
    assert_eq!(read_set(&row), vec!["abc", "xyz"]);
}

fn stage_pair(row: &mut RowBuffer, args: &TypeArgumentList, key: &str, value: i32) -> RowCursor {
    let mut temp = RowCursor::create(row);
    temp.find(row, "");
    let mut pair = row
        .write_scope(&mut temp, &typ::TYPED_TUPLE, args.clone(), UpdateOptions::Upsert)
        .unwrap();
    row.write_sparse_utf8(&mut pair, key, UpdateOptions::Upsert).unwrap();
    pair.move_next(row);
    row.write_sparse_i32(&mut pair, value, UpdateOptions::Upsert).unwrap();
    temp
}

fn read_map(row: &RowBuffer) -> Vec<(String, i32)> {
    let mut root = RowCursor::create(row);
    root.find(row, "m");
    let mut items = row.read_scope(&root).unwrap();
    let mut entries = Vec::new();
    while items.move_next(row) {
        let mut pair = row.read_scope(&items).unwrap();
        assert!(pair.move_next(row));
        let key = row.read_sparse_utf8(&mut pair).unwrap().to_owned();
        assert!(pair.move_next(row));
        let value = row.read_sparse_i32(&mut pair).unwrap();
        entries.push((key, value));
        items.skip(row, &mut pair);
    }
    entries
}

#[test]
fn typed_map_move_insert() {
    let (resolver, id) = schema_with(map_of_utf8_to_int32());
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let args = layout.try_find("m").unwrap().type_args().clone();

    let mut root = RowCursor::create(&row);
    root.find(&row, "m");
    row.write_scope(&mut root, &typ::TYPED_MAP, args.clone(), UpdateOptions::Upsert)
        .unwrap();

    // Move ("abc", 123) into the map.
    let mut src = stage_pair(&mut row, &args, "abc", 123);
    let mut root = RowCursor::create(&row);
    root.find(&row, "m");
    let mut map = row.read_scope(&root).unwrap();
    row.move_field(&mut map, &mut src, UpdateOptions::Upsert).unwrap();
    assert_eq!(read_map(&row), vec![("abc".to_owned(), 123)]);

    // Inserting the same key again fails and consumes the staged pair.
    let mut src = stage_pair(&mut row, &args, "abc", 456);
    let mut root = RowCursor::create(&row);
    root.find(&row, "m");
    let mut map = row.read_scope(&root).unwrap();
    assert_eq!(
        row.move_field(&mut map, &mut src, UpdateOptions::Insert),
        Err(Error::Exists)
    );
    assert_eq!(read_map(&row), vec![("abc".to_owned(), 123)]);

    // A different key lands in key order.
    let mut src = stage_pair(&mut row, &args, "xyz", 789);
    let mut root = RowCursor::create(&row);
    root.find(&row, "m");
    let mut map = row.read_scope(&root).unwrap();
    row.move_field(&mut map, &mut src, UpdateOptions::Upsert).unwrap();
    assert_eq!(
        read_map(&row),
        vec![("abc".to_owned(), 123), ("xyz".to_owned(), 789)]
    );
    assert_eq!(map.count(), 2);
}

#[test]
fn map_upsert_replaces_matching_key() {
    let (resolver, id) = schema_with(map_of_utf8_to_int32());
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let args = layout.try_find("m").unwrap().type_args().clone();

    let mut root = RowCursor::create(&row);
    root.find(&row, "m");
    row.write_scope(&mut root, &typ::TYPED_MAP, args.clone(), UpdateOptions::Upsert)
        .unwrap();

    for (key, value) in [("k", 1), ("k", 2)] {
        let mut src = stage_pair(&mut row, &args, key, value);
        let mut root = RowCursor::create(&row);
        root.find(&row, "m");
        let mut map = row.read_scope(&root).unwrap();
        row.move_field(&mut map, &mut src, UpdateOptions::Upsert).unwrap();
    }

    assert_eq!(read_map(&row), vec![("k".to_owned(), 2)]);
}

#[test]
fn find_in_unique_scope_locates_elements() {
    let (resolver, id) = schema_with(set_of_utf8());
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let args = layout.try_find("a").unwrap().type_args().clone();

    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let mut items = row
        .write_scope(&mut root, &typ::TYPED_SET, args.clone(), UpdateOptions::Upsert)
        .unwrap();
    items.set_defer_unique_index(true);
    for value in ["abc", "xyz"] {
        row.write_sparse_utf8(&mut items, value, UpdateOptions::Upsert).unwrap();
        items.move_next(&row);
    }

    // Stage a pattern matching "xyz".
    let mut pattern = RowCursor::create(&row);
    pattern.find(&row, "");
    row.write_sparse_utf8(&mut pattern, "xyz", UpdateOptions::Upsert).unwrap();

    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let scope = row.read_scope(&root).unwrap();
    let mut found = row.find_in_unique_scope(&scope, &mut pattern).unwrap();
    assert_eq!(found.index(), 1);
    assert_eq!(row.read_sparse_utf8(&mut found).unwrap(), "xyz");

    // The pattern was consumed by the search.
    let mut probe = RowCursor::create(&row);
    probe.find(&row, "");
    assert!(!probe.exists());

    // A missing element reports NotFound; the pattern is still consumed.
    let mut pattern = RowCursor::create(&row);
    pattern.find(&row, "");
    row.write_sparse_utf8(&mut pattern, "zzz", UpdateOptions::Upsert).unwrap();
    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let scope = row.read_scope(&root).unwrap();
    assert_eq!(
        row.find_in_unique_scope(&scope, &mut pattern),
        Err(Error::NotFound)
    );
    let mut probe = RowCursor::create(&row);
    probe.find(&row, "");
    assert!(!probe.exists());
}
