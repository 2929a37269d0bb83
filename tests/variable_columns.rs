use std::sync::Arc;

use hybrid_row::prelude::*;

fn three_string_schema() -> (Arc<dyn LayoutResolver>, SchemaId) {
    let id = SchemaId::new(1);
    let mut schema = Schema::new("table", id);
    for path in ["a", "b", "c"] {
        schema.properties.push(Property::new(
            path,
            PropertyType::Primitive {
                kind: TypeKind::Utf8,
                storage: StorageKind::Variable,
                nullable: true,
                length: 100,
            },
        ));
    }
    let mut ns = Namespace::default();
    ns.schemas.push(schema);
    (Arc::new(LayoutResolverNamespace::new(ns, None)), id)
}

#[test]
fn variable_string_interleave() {
    let (resolver, id) = three_string_schema();
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let mut root = RowCursor::create(&row);
    let a = layout.try_find("a").unwrap();
    let b = layout.try_find("b").unwrap();
    let c = layout.try_find("c").unwrap();

    let original = "abcdefghijklmnopqrst";
    assert_eq!(original.len(), 20);
    row.write_variable_utf8(&mut root, a, original).unwrap();
    row.write_variable_utf8(&mut root, b, original).unwrap();
    row.write_variable_utf8(&mut root, c, original).unwrap();
    let full_length = row.length();

    // Shrinking a shifts every later column left.
    row.write_variable_utf8(&mut root, a, "ab").unwrap();
    assert_eq!(row.length(), full_length - 18);
    assert_eq!(row.read_variable_utf8(&root, b).unwrap(), original);
    assert_eq!(row.read_variable_utf8(&root, c).unwrap(), original);

    // Growing a shifts them right again.
    let max = "x".repeat(100);
    row.write_variable_utf8(&mut root, a, &max).unwrap();
    assert_eq!(row.read_variable_utf8(&root, a).unwrap(), max);
    assert_eq!(row.read_variable_utf8(&root, c).unwrap(), original);

    // A value beyond the declared maximum leaves the row unchanged.
    let length_before = row.length();
    let too_big = "x".repeat(200);
    assert_eq!(
        row.write_variable_utf8(&mut root, a, &too_big),
        Err(Error::TooBig)
    );
    assert_eq!(row.length(), length_before);
    assert_eq!(row.read_variable_utf8(&root, a).unwrap(), max);
}

#[test]
fn variable_delete_shifts_the_tail() {
    let (resolver, id) = three_string_schema();
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let mut root = RowCursor::create(&row);
    let a = layout.try_find("a").unwrap();
    let b = layout.try_find("b").unwrap();

    row.write_variable_utf8(&mut root, a, "first").unwrap();
    row.write_variable_utf8(&mut root, b, "second").unwrap();
    let length = row.length();

    row.delete_variable(&root, a).unwrap();
    assert_eq!(row.length(), length - 6);
    assert_eq!(row.read_variable_utf8(&root, a), Err(Error::NotFound));
    assert_eq!(row.read_variable_utf8(&root, b).unwrap(), "second");

    // Deleting an absent column is a no-op.
    row.delete_variable(&root, a).unwrap();
    assert_eq!(row.length(), length - 6);
}

#[test]
fn variable_integers_use_compact_encoding() {
    let id = SchemaId::new(2);
    let mut schema = Schema::new("table", id);
    schema.properties.push(Property::new(
        "v",
        PropertyType::primitive(TypeKind::VarInt, StorageKind::Variable, true),
    ));
    schema.properties.push(Property::new(
        "u",
        PropertyType::primitive(TypeKind::VarUInt, StorageKind::Variable, true),
    ));
    let mut ns = Namespace::default();
    ns.schemas.push(schema);
    let resolver: Arc<dyn LayoutResolver> = Arc::new(LayoutResolverNamespace::new(ns, None));
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let base_length = row.length();
    let mut root = RowCursor::create(&row);
    let v = layout.try_find("v").unwrap();
    let u = layout.try_find("u").unwrap();

    row.write_variable_varint(&mut root, v, -1).unwrap();
    row.write_variable_varuint(&mut root, u, 127).unwrap();
    assert_eq!(row.read_variable_varint(&root, v).unwrap(), -1);
    assert_eq!(row.read_variable_varuint(&root, u).unwrap(), 127);

    // Small magnitudes take one byte each.
    assert_eq!(row.length(), base_length + 2);

    // Rewriting with a larger magnitude grows in place.
    row.write_variable_varint(&mut root, v, i64::MAX).unwrap();
    assert_eq!(row.read_variable_varint(&root, v).unwrap(), i64::MAX);
    assert_eq!(row.read_variable_varuint(&root, u).unwrap(), 127);
    assert_eq!(row.length(), base_length + 11);
}
