//! The pre-compiled system schemas used for schema persistence and
//! record framing.
//!
//! These schemas describe `Namespace`, `Schema`, `Property`, and the other
//! schema-model types as hybrid rows, closing the bootstrap loop: schemas
//! are themselves persisted as rows governed by these schemas.  The
//! `Segment` and `Record` schemas govern the framing layer.

use std::sync::{Arc, OnceLock};

use super::{Namespace, Property, PropertyType, Schema, SchemaId, StorageKind, TypeKind};
use crate::layout::{LayoutResolver, LayoutResolverNamespace};

/// Schema id of the `Segment` framing row.
pub const SEGMENT_SCHEMA_ID: SchemaId = SchemaId::new(2147473648);
/// Schema id of the `Record` framing row.
pub const RECORD_SCHEMA_ID: SchemaId = SchemaId::new(2147473649);
/// Schema id of the `Namespace` row.
pub const NAMESPACE_SCHEMA_ID: SchemaId = SchemaId::new(2147473650);
/// Schema id of the `Schema` row.
pub const SCHEMA_SCHEMA_ID: SchemaId = SchemaId::new(2147473651);
/// Schema id of the `SchemaOptions` row.
pub const SCHEMA_OPTIONS_SCHEMA_ID: SchemaId = SchemaId::new(2147473652);
/// Schema id of the `PartitionKey` row.
pub const PARTITION_KEY_SCHEMA_ID: SchemaId = SchemaId::new(2147473653);
/// Schema id of the `PrimarySortKey` row.
pub const PRIMARY_SORT_KEY_SCHEMA_ID: SchemaId = SchemaId::new(2147473654);
/// Schema id of the `StaticKey` row.
pub const STATIC_KEY_SCHEMA_ID: SchemaId = SchemaId::new(2147473655);
/// Schema id of the `Property` row.
pub const PROPERTY_SCHEMA_ID: SchemaId = SchemaId::new(2147473656);
/// Schema id of the `PropertyType` row.
pub const PROPERTY_TYPE_SCHEMA_ID: SchemaId = SchemaId::new(2147473657);
/// Schema id of the `EnumSchema` row.
pub const ENUM_SCHEMA_SCHEMA_ID: SchemaId = SchemaId::new(2147473658);
/// Schema id of the `EnumValue` row.
pub const ENUM_VALUE_SCHEMA_ID: SchemaId = SchemaId::new(2147473659);

fn fixed(path: &str, kind: TypeKind) -> Property {
    Property::new(path, PropertyType::primitive(kind, StorageKind::Fixed, true))
}

fn variable(path: &str, kind: TypeKind) -> Property {
    Property::new(
        path,
        PropertyType::primitive(kind, StorageKind::Variable, true),
    )
}

fn udt(path: &str, schema_id: SchemaId) -> Property {
    Property::new(
        path,
        PropertyType::Udt {
            name: String::new(),
            schema_id,
            nullable: true,
            immutable: false,
        },
    )
}

fn udt_array(path: &str, schema_id: SchemaId) -> Property {
    Property::new(
        path,
        PropertyType::Array {
            items: Some(Box::new(PropertyType::Udt {
                name: String::new(),
                schema_id,
                nullable: false,
                immutable: false,
            })),
            nullable: true,
            immutable: false,
        },
    )
}

fn system_schema(name: &str, schema_id: SchemaId, properties: Vec<Property>) -> Schema {
    let mut schema = Schema::new(name, schema_id);
    schema.properties = properties;
    schema
}

/// Builds the namespace of system schemas.
#[must_use]
pub fn system_namespace() -> Namespace {
    let mut ns = Namespace {
        name: "SystemSchema".to_owned(),
        ..Namespace::default()
    };

    ns.schemas.push(system_schema(
        "Segment",
        SEGMENT_SCHEMA_ID,
        vec![
            fixed("length", TypeKind::Int32),
            variable("comment", TypeKind::Utf8),
            variable("sdl", TypeKind::Utf8),
        ],
    ));

    ns.schemas.push(system_schema(
        "Record",
        RECORD_SCHEMA_ID,
        vec![
            fixed("length", TypeKind::Int32),
            fixed("crc32", TypeKind::UInt32),
        ],
    ));

    ns.schemas.push(system_schema(
        "Namespace",
        NAMESPACE_SCHEMA_ID,
        vec![
            fixed("version", TypeKind::UInt8),
            variable("name", TypeKind::Utf8),
            variable("comment", TypeKind::Utf8),
            udt_array("schemas", SCHEMA_SCHEMA_ID),
            udt_array("enums", ENUM_SCHEMA_SCHEMA_ID),
        ],
    ));

    ns.schemas.push(system_schema(
        "Schema",
        SCHEMA_SCHEMA_ID,
        vec![
            fixed("id", TypeKind::Int32),
            fixed("version", TypeKind::UInt8),
            variable("name", TypeKind::Utf8),
            variable("comment", TypeKind::Utf8),
            udt("options", SCHEMA_OPTIONS_SCHEMA_ID),
            udt_array("partitionkeys", PARTITION_KEY_SCHEMA_ID),
            udt_array("primarykeys", PRIMARY_SORT_KEY_SCHEMA_ID),
            udt_array("statickeys", STATIC_KEY_SCHEMA_ID),
            udt_array("properties", PROPERTY_SCHEMA_ID),
        ],
    ));

    ns.schemas.push(system_schema(
        "SchemaOptions",
        SCHEMA_OPTIONS_SCHEMA_ID,
        vec![
            fixed("disallowunschematized", TypeKind::Boolean),
            fixed("enablepropertyleveltimestamps", TypeKind::Boolean),
            fixed("disablesystemprefix", TypeKind::Boolean),
            fixed("abstract", TypeKind::Boolean),
        ],
    ));

    ns.schemas.push(system_schema(
        "PartitionKey",
        PARTITION_KEY_SCHEMA_ID,
        vec![variable("path", TypeKind::Utf8)],
    ));

    ns.schemas.push(system_schema(
        "PrimarySortKey",
        PRIMARY_SORT_KEY_SCHEMA_ID,
        vec![
            fixed("direction", TypeKind::UInt8),
            variable("path", TypeKind::Utf8),
        ],
    ));

    ns.schemas.push(system_schema(
        "StaticKey",
        STATIC_KEY_SCHEMA_ID,
        vec![variable("path", TypeKind::Utf8)],
    ));

    ns.schemas.push(system_schema(
        "Property",
        PROPERTY_SCHEMA_ID,
        vec![
            variable("path", TypeKind::Utf8),
            variable("comment", TypeKind::Utf8),
            variable("apiname", TypeKind::Utf8),
            udt("type", PROPERTY_TYPE_SCHEMA_ID),
        ],
    ));

    ns.schemas.push(system_schema(
        "PropertyType",
        PROPERTY_TYPE_SCHEMA_ID,
        vec![
            fixed("kind", TypeKind::UInt8),
            fixed("storage", TypeKind::UInt8),
            fixed("nullable", TypeKind::Boolean),
            fixed("immutable", TypeKind::Boolean),
            fixed("length", TypeKind::Int32),
            fixed("schemaid", TypeKind::Int32),
            variable("name", TypeKind::Utf8),
            udt_array("items", PROPERTY_TYPE_SCHEMA_ID),
            udt_array("properties", PROPERTY_SCHEMA_ID),
        ],
    ));

    ns.schemas.push(system_schema(
        "EnumSchema",
        ENUM_SCHEMA_SCHEMA_ID,
        vec![
            fixed("basekind", TypeKind::UInt8),
            variable("name", TypeKind::Utf8),
            variable("comment", TypeKind::Utf8),
            udt_array("values", ENUM_VALUE_SCHEMA_ID),
        ],
    ));

    ns.schemas.push(system_schema(
        "EnumValue",
        ENUM_VALUE_SCHEMA_ID,
        vec![
            fixed("value", TypeKind::Int64),
            variable("name", TypeKind::Utf8),
            variable("comment", TypeKind::Utf8),
        ],
    ));

    ns
}

/// The process-wide resolver seeded with the system schemas.
#[must_use]
pub fn system_resolver() -> Arc<dyn LayoutResolver> {
    static RESOLVER: OnceLock<Arc<LayoutResolverNamespace>> = OnceLock::new();
    let resolver = RESOLVER
        .get_or_init(|| Arc::new(LayoutResolverNamespace::new(system_namespace(), None)))
        .clone();
    resolver
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_system_schemas_load() {
        let resolver = system_resolver();
        let ids = [
            SEGMENT_SCHEMA_ID,
            RECORD_SCHEMA_ID,
            NAMESPACE_SCHEMA_ID,
            SCHEMA_SCHEMA_ID,
            SCHEMA_OPTIONS_SCHEMA_ID,
            PARTITION_KEY_SCHEMA_ID,
            PRIMARY_SORT_KEY_SCHEMA_ID,
            STATIC_KEY_SCHEMA_ID,
            PROPERTY_SCHEMA_ID,
            PROPERTY_TYPE_SCHEMA_ID,
            ENUM_SCHEMA_SCHEMA_ID,
            ENUM_VALUE_SCHEMA_ID,
        ];
        for id in ids {
            assert_eq!(resolver.resolve(id).schema_id(), id);
        }

        // System schema ids are unique.
        for id in ids {
            assert_eq!(ids.iter().filter(|&&other| other == id).count(), 1);
        }
    }
}
