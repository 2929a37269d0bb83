use std::sync::Arc;

use hybrid_row::prelude::*;

fn resolver_for(schema: Schema) -> Arc<dyn LayoutResolver> {
    let mut ns = Namespace::default();
    ns.schemas.push(schema);
    Arc::new(LayoutResolverNamespace::new(ns, None))
}

#[test]
fn fixed_scalar_round_trip() {
    let mut schema = Schema::new("table", SchemaId::new(-1));
    schema.properties.push(Property::new(
        "a",
        PropertyType::primitive(TypeKind::Int32, StorageKind::Fixed, true),
    ));
    let resolver = resolver_for(schema);
    let layout = resolver.resolve(SchemaId::new(-1));

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let root = RowCursor::create(&row);
    let a = layout.try_find("a").unwrap();

    row.write_fixed_i32(&root, a, 42).unwrap();
    assert_eq!(row.read_fixed_i32(&root, a).unwrap(), 42);

    row.delete_fixed(&root, a).unwrap();
    assert_eq!(row.read_fixed_i32(&root, a), Err(Error::NotFound));

    // The bit is already clear.
    assert_eq!(row.delete_fixed(&root, a), Err(Error::NotFound));

    row.write_fixed_i32(&root, a, 0).unwrap();
    assert_eq!(row.read_fixed_i32(&root, a).unwrap(), 0);
}

#[test]
fn non_nullable_column_is_always_present() {
    let mut schema = Schema::new("table", SchemaId::new(2));
    schema.properties.push(Property::new(
        "req",
        PropertyType::primitive(TypeKind::Int64, StorageKind::Fixed, false),
    ));
    let resolver = resolver_for(schema);
    let layout = resolver.resolve(SchemaId::new(2));

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let root = RowCursor::create(&row);
    let req = layout.try_find("req").unwrap();

    // A default row reads zero without an explicit write.
    assert_eq!(row.read_fixed_i64(&root, req).unwrap(), 0);

    row.write_fixed_i64(&root, req, -5).unwrap();
    assert_eq!(row.read_fixed_i64(&root, req).unwrap(), -5);

    // Non-nullable columns cannot be deleted.
    assert_eq!(row.delete_fixed(&root, req), Err(Error::TypeMismatch));
}

#[test]
fn booleans_live_in_the_bitmask() {
    let mut schema = Schema::new("table", SchemaId::new(3));
    schema.properties.push(Property::new(
        "x",
        PropertyType::primitive(TypeKind::Boolean, StorageKind::Fixed, true),
    ));
    schema.properties.push(Property::new(
        "y",
        PropertyType::primitive(TypeKind::Boolean, StorageKind::Fixed, true),
    ));
    let resolver = resolver_for(schema);
    let layout = resolver.resolve(SchemaId::new(3));

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let length = row.length();
    let root = RowCursor::create(&row);
    let x = layout.try_find("x").unwrap();
    let y = layout.try_find("y").unwrap();

    row.write_fixed_bool(&root, x, true).unwrap();
    row.write_fixed_bool(&root, y, false).unwrap();
    assert!(row.read_fixed_bool(&root, x).unwrap());
    assert!(!row.read_fixed_bool(&root, y).unwrap());

    // Boolean values take no space outside the bitmask.
    assert_eq!(row.length(), length);

    row.write_fixed_bool(&root, x, false).unwrap();
    assert!(!row.read_fixed_bool(&root, x).unwrap());
}

#[test]
fn fixed_length_strings_are_padded() {
    let mut schema = Schema::new("table", SchemaId::new(4));
    schema.properties.push(Property::new(
        "tag",
        PropertyType::Primitive {
            kind: TypeKind::Binary,
            storage: StorageKind::Fixed,
            nullable: true,
            length: 8,
        },
    ));
    let resolver = resolver_for(schema);
    let layout = resolver.resolve(SchemaId::new(4));

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let root = RowCursor::create(&row);
    let tag = layout.try_find("tag").unwrap();

    row.write_fixed_binary(&root, tag, b"abc").unwrap();
    assert_eq!(
        row.read_fixed_binary(&root, tag).unwrap(),
        b"abc\0\0\0\0\0"
    );
}

#[test]
fn read_only_cursor_rejects_writes() {
    let mut schema = Schema::new("table", SchemaId::new(5));
    schema.properties.push(Property::new(
        "a",
        PropertyType::primitive(TypeKind::Int32, StorageKind::Fixed, true),
    ));
    let resolver = resolver_for(schema);
    let layout = resolver.resolve(SchemaId::new(5));

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let root = RowCursor::create(&row);
    let a = layout.try_find("a").unwrap();
    row.write_fixed_i32(&root, a, 7).unwrap();

    let ro = root.as_read_only();
    assert_eq!(
        row.write_fixed_i32(&ro, a, 8),
        Err(Error::InsufficientPermissions)
    );
    assert_eq!(row.delete_fixed(&ro, a), Err(Error::InsufficientPermissions));

    // Reads still succeed through a read-only cursor.
    assert_eq!(row.read_fixed_i32(&ro, a).unwrap(), 7);
}
