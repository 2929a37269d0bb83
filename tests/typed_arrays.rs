use std::sync::Arc;

use hybrid_row::layout::typ;
use hybrid_row::prelude::*;

fn array_schema() -> (Arc<dyn LayoutResolver>, SchemaId) {
    let id = SchemaId::new(1);
    let mut schema = Schema::new("table", id);
    schema.properties.push(Property::new(
        "a",
        PropertyType::Array {
            items: Some(Box::new(PropertyType::primitive(
                TypeKind::Int32,
                StorageKind::Sparse,
                false,
            ))),
            nullable: true,
            immutable: false,
        },
    ));
    let mut ns = Namespace::default();
    ns.schemas.push(schema);
    (Arc::new(LayoutResolverNamespace::new(ns, None)), id)
}

fn read_all(row: &RowBuffer, root: &mut RowCursor) -> Vec<i32> {
    let mut items = row.read_scope(root).unwrap();
    let mut values = Vec::new();
    while items.move_next(row) {
        values.push(row.read_sparse_i32(&mut items).unwrap());
    }
    values
}

#[test]
fn typed_array_of_int32() {
    let (resolver, id) = array_schema();
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let args = layout.try_find("a").unwrap().type_args().clone();

    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let mut items = row
        .write_scope(&mut root, &typ::TYPED_ARRAY, args, UpdateOptions::Upsert)
        .unwrap();
    for value in [42, 43, 44] {
        row.write_sparse_i32(&mut items, value, UpdateOptions::Upsert).unwrap();
        items.move_next(&row);
    }

    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    assert_eq!(read_all(&row, &mut root), vec![42, 43, 44]);

    // Delete the middle element.
    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let mut scope = row.read_scope(&root).unwrap();
    assert!(scope.move_to(&row, 1));
    row.delete_sparse(&mut scope).unwrap();

    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    assert_eq!(read_all(&row, &mut root), vec![42, 44]);

    // Only two elements remain.
    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let mut scope = row.read_scope(&root).unwrap();
    assert_eq!(scope.count(), 2);
    assert!(!scope.move_to(&row, 2));
}

#[test]
fn typed_array_rejects_mismatched_elements() {
    let (resolver, id) = array_schema();
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    let args = layout.try_find("a").unwrap().type_args().clone();

    let mut root = RowCursor::create(&row);
    root.find(&row, "a");
    let mut items = row
        .write_scope(&mut root, &typ::TYPED_ARRAY, args, UpdateOptions::Upsert)
        .unwrap();

    assert_eq!(
        row.write_sparse_utf8(&mut items, "nope", UpdateOptions::Upsert),
        Err(Error::TypeConstraint)
    );
    row.write_sparse_i32(&mut items, 1, UpdateOptions::Upsert).unwrap();
}

#[test]
fn untyped_array_holds_heterogeneous_items() {
    let id = SchemaId::new(9);
    let mut ns = Namespace::default();
    ns.schemas.push(Schema::new("table", id));
    let resolver: Arc<dyn LayoutResolver> = Arc::new(LayoutResolverNamespace::new(ns, None));
    let layout = resolver.resolve(id);

    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());

    let mut root = RowCursor::create(&row);
    root.find(&row, "mixed");
    let mut items = row
        .write_scope(&mut root, &typ::ARRAY, TypeArgumentList::default(), UpdateOptions::Upsert)
        .unwrap();
    row.write_sparse_i32(&mut items, 7, UpdateOptions::InsertAt).unwrap();
    items.move_next(&row);
    row.write_sparse_utf8(&mut items, "seven", UpdateOptions::InsertAt).unwrap();

    let mut root = RowCursor::create(&row);
    root.find(&row, "mixed");
    let mut items = row.read_scope(&root).unwrap();
    assert!(items.move_next(&row));
    assert_eq!(row.read_sparse_i32(&mut items).unwrap(), 7);
    assert!(items.move_next(&row));
    assert_eq!(row.read_sparse_utf8(&mut items).unwrap(), "seven");
    assert!(!items.move_next(&row));
}
