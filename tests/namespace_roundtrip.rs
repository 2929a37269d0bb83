use hybrid_row::prelude::*;
use hybrid_row::schema::{
    EnumSchema, EnumValue, NAMESPACE_SCHEMA_ID, PartitionKey, PrimarySortKey, SchemaLanguageVersion,
    SchemaOptions, SortDirection, StaticKey,
};

fn sample_namespace() -> Namespace {
    let mut orders = Schema::new("Order", SchemaId::new(100));
    orders.version = SchemaLanguageVersion::V2;
    orders.comment = Some("one order per row".to_owned());
    orders.options = SchemaOptions {
        disallow_unschematized: true,
        ..SchemaOptions::default()
    };
    orders.partition_keys.push(PartitionKey {
        path: "customer".to_owned(),
    });
    orders.primary_sort_keys.push(PrimarySortKey {
        path: "placed".to_owned(),
        direction: SortDirection::Descending,
    });
    orders.static_keys.push(StaticKey {
        path: "region".to_owned(),
    });
    orders.properties.push(Property::new(
        "customer",
        PropertyType::Primitive {
            kind: TypeKind::Utf8,
            storage: StorageKind::Variable,
            nullable: false,
            length: 64,
        },
    ));
    orders.properties.push(Property::new(
        "placed",
        PropertyType::primitive(TypeKind::UnixDateTime, StorageKind::Fixed, true),
    ));
    orders.properties.push(Property::new(
        "lines",
        PropertyType::Array {
            items: Some(Box::new(PropertyType::Udt {
                name: "OrderLine".to_owned(),
                schema_id: SchemaId::new(101),
                nullable: false,
                immutable: false,
            })),
            nullable: true,
            immutable: false,
        },
    ));
    orders.properties.push(Property::new(
        "tags",
        PropertyType::Set {
            items: Box::new(PropertyType::primitive(
                TypeKind::Utf8,
                StorageKind::Sparse,
                false,
            )),
            nullable: true,
            immutable: true,
        },
    ));

    let mut line = Schema::new("OrderLine", SchemaId::new(101));
    let mut detail = Property::new(
        "detail",
        PropertyType::Object {
            properties: vec![
                Property::new(
                    "sku",
                    PropertyType::primitive(TypeKind::Utf8, StorageKind::Sparse, false),
                ),
                Property::new(
                    "quantity",
                    PropertyType::primitive(TypeKind::Int32, StorageKind::Sparse, false),
                ),
            ],
            nullable: true,
            immutable: false,
        },
    );
    detail.comment = Some("line detail".to_owned());
    detail.api_name = Some("Detail".to_owned());
    line.properties.push(detail);
    line.properties.push(Property::new(
        "amounts",
        PropertyType::Map {
            keys: Box::new(PropertyType::primitive(
                TypeKind::Utf8,
                StorageKind::Sparse,
                false,
            )),
            values: Box::new(PropertyType::primitive(
                TypeKind::Decimal,
                StorageKind::Sparse,
                true,
            )),
            nullable: true,
            immutable: false,
        },
    ));
    line.properties.push(Property::new(
        "status",
        PropertyType::Tagged {
            items: vec![PropertyType::primitive(
                TypeKind::Int32,
                StorageKind::Sparse,
                false,
            )],
            nullable: true,
            immutable: false,
        },
    ));

    Namespace {
        name: "commerce".to_owned(),
        version: SchemaLanguageVersion::V2,
        comment: Some("sample namespace".to_owned()),
        schemas: vec![orders, line],
        enums: vec![EnumSchema {
            name: "Color".to_owned(),
            base_kind: TypeKind::Int32,
            comment: None,
            values: vec![
                EnumValue {
                    name: "Red".to_owned(),
                    value: 1,
                    comment: None,
                },
                EnumValue {
                    name: "Green".to_owned(),
                    value: 2,
                    comment: Some("the default".to_owned()),
                },
            ],
        }],
    }
}

#[test]
fn namespace_round_trips_through_a_row() {
    let ns = sample_namespace();

    let resolver = hybrid_row::schema::system_resolver();
    let layout = resolver.resolve(NAMESPACE_SCHEMA_ID);
    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    ns.write(&mut row).unwrap();

    let read_back = Namespace::read(&row).unwrap();
    assert_eq!(read_back, ns);
}

#[test]
fn namespace_survives_reserialization_of_bytes() {
    let ns = sample_namespace();

    let resolver = hybrid_row::schema::system_resolver();
    let layout = resolver.resolve(NAMESPACE_SCHEMA_ID);
    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    ns.write(&mut row).unwrap();

    // Round-trip the raw bytes through a second buffer.
    let bytes = row.as_bytes().to_vec();
    let mut reloaded = RowBuffer::new();
    assert!(reloaded.read_from(&bytes, HybridRowVersion::V1, resolver.clone()));
    let read_back = Namespace::read(&reloaded).unwrap();
    assert_eq!(read_back, ns);
}

#[test]
fn empty_namespace_round_trips() {
    let ns = Namespace::default();

    let resolver = hybrid_row::schema::system_resolver();
    let layout = resolver.resolve(NAMESPACE_SCHEMA_ID);
    let mut row = RowBuffer::new();
    row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
    ns.write(&mut row).unwrap();

    let read_back = Namespace::read(&row).unwrap();
    assert_eq!(read_back, ns);
}

#[test]
fn compiled_namespace_schemas_resolve() {
    let ns = sample_namespace();
    let resolver = LayoutResolverNamespace::new(ns, None);
    let order = resolver.resolve(SchemaId::new(100));
    assert_eq!(order.name(), "Order");
    assert_eq!(order.num_variable(), 1);
    assert_eq!(order.num_fixed(), 1);

    let lines = order.try_find("lines").unwrap();
    assert_eq!(
        lines.type_args()[0].type_args().schema_id(),
        SchemaId::new(101)
    );

    let line = resolver.resolve(SchemaId::new(101));
    assert!(line.try_find("detail.sku").is_some());
    assert!(line.try_find("detail.quantity").is_some());
}
