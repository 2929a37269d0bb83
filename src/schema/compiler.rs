//! Schema tree to layout compilation.

use super::{Namespace, Property, PropertyType, Schema, TypeKind};
use crate::layout::{
    Layout, LayoutBuilder, LayoutType, StorageKind, TypeArgument, TypeArgumentList, typ,
};

impl Schema {
    /// Compiles this schema against its namespace into an immutable layout.
    ///
    /// # Panics
    /// Panics on malformed schemas: a variable column of a fixed-only type,
    /// a UDT reference that resolves to nothing, or a tagged type with an
    /// arity other than one or two.
    #[must_use]
    pub fn compile(&self, ns: &Namespace) -> Layout {
        let mut builder = LayoutBuilder::new(&self.name, self.schema_id);
        for p in &self.properties {
            add_property(&mut builder, ns, p, true);
        }
        builder.build()
    }
}

fn add_property(builder: &mut LayoutBuilder, ns: &Namespace, p: &Property, top_level: bool) {
    match &p.property_type {
        PropertyType::Primitive {
            kind,
            storage,
            nullable,
            length,
        } => {
            let typ = layout_type_of(*kind);
            // Nested object fields are always sparse regardless of the
            // declared storage.
            let storage = if top_level { *storage } else { StorageKind::Sparse };
            match storage {
                StorageKind::Fixed => builder.add_fixed_column(&p.path, typ, *nullable, *length),
                StorageKind::Variable => {
                    assert!(typ.allow_variable(), "{} cannot be variable-length", typ);
                    builder.add_variable_column(&p.path, typ, *length);
                }
                StorageKind::Sparse => builder.add_sparse_column(&p.path, typ),
            }
        }
        PropertyType::Object {
            properties,
            immutable,
            ..
        } => {
            builder.add_object_scope(&p.path, object_type(*immutable));
            for child in properties {
                add_property(builder, ns, child, false);
            }
            builder.end_object_scope();
        }
        scope => {
            let ta = type_argument_of(scope, ns);
            builder.add_typed_scope(&p.path, ta.layout_type(), ta.type_args().clone());
        }
    }
}

/// Maps a property type to the type argument used when it appears inside a
/// typed scope or as a typed scope itself.
fn type_argument_of(pt: &PropertyType, ns: &Namespace) -> TypeArgument {
    match pt {
        PropertyType::Primitive { kind, .. } => TypeArgument::of(layout_type_of(*kind)),
        PropertyType::Object { immutable, .. } => TypeArgument::of(object_type(*immutable)),
        PropertyType::Array {
            items, immutable, ..
        } => match items {
            None => TypeArgument::of(pick(*immutable, &typ::ARRAY, &typ::IMMUTABLE_ARRAY)),
            Some(item) => TypeArgument::new(
                pick(*immutable, &typ::TYPED_ARRAY, &typ::IMMUTABLE_TYPED_ARRAY),
                TypeArgumentList::from(item_argument(item, ns)),
            ),
        },
        PropertyType::Set {
            items, immutable, ..
        } => TypeArgument::new(
            pick(*immutable, &typ::TYPED_SET, &typ::IMMUTABLE_TYPED_SET),
            TypeArgumentList::from(item_argument(items, ns)),
        ),
        PropertyType::Map {
            keys,
            values,
            immutable,
            ..
        } => TypeArgument::new(
            pick(*immutable, &typ::TYPED_MAP, &typ::IMMUTABLE_TYPED_MAP),
            vec![item_argument(keys, ns), item_argument(values, ns)].into(),
        ),
        PropertyType::Tuple {
            items, immutable, ..
        } => TypeArgument::new(
            pick(*immutable, &typ::TYPED_TUPLE, &typ::IMMUTABLE_TYPED_TUPLE),
            items
                .iter()
                .map(|i| item_argument(i, ns))
                .collect::<Vec<_>>()
                .into(),
        ),
        PropertyType::Tagged {
            items, immutable, ..
        } => {
            let scope_type = match items.len() {
                1 => pick(*immutable, &typ::TAGGED, &typ::IMMUTABLE_TAGGED),
                2 => pick(*immutable, &typ::TAGGED2, &typ::IMMUTABLE_TAGGED2),
                n => panic!("tagged types must have one or two values, not {n}"),
            };
            let mut args = vec![TypeArgument::of(&typ::UINT8)];
            args.extend(items.iter().map(|i| item_argument(i, ns)));
            TypeArgument::new(scope_type, args.into())
        }
        PropertyType::Udt {
            name,
            schema_id,
            immutable,
            ..
        } => {
            let id = if schema_id.is_invalid() {
                ns.schemas()
                    .iter()
                    .find(|s| s.name() == name.as_str())
                    .unwrap_or_else(|| panic!("no schema named {name} in namespace"))
                    .schema_id()
            } else {
                *schema_id
            };
            TypeArgument::new(
                pick(*immutable, &typ::UDT, &typ::IMMUTABLE_UDT),
                TypeArgumentList::from_schema_id(id),
            )
        }
    }
}

/// Elements of typed scopes that are declared nullable wrap in a nullable
/// scope so that absence is representable.
fn item_argument(item: &PropertyType, ns: &Namespace) -> TypeArgument {
    let ta = type_argument_of(item, ns);
    if item.nullable() {
        TypeArgument::new(&typ::NULLABLE, TypeArgumentList::from(ta))
    } else {
        ta
    }
}

fn object_type(immutable: bool) -> &'static LayoutType {
    pick(immutable, &typ::OBJECT, &typ::IMMUTABLE_OBJECT)
}

fn pick(
    immutable: bool,
    mutable: &'static LayoutType,
    frozen: &'static LayoutType,
) -> &'static LayoutType {
    if immutable { frozen } else { mutable }
}

fn layout_type_of(kind: TypeKind) -> &'static LayoutType {
    match kind {
        TypeKind::Null => &typ::NULL,
        TypeKind::Boolean => &typ::BOOLEAN,
        TypeKind::Int8 => &typ::INT8,
        TypeKind::Int16 => &typ::INT16,
        TypeKind::Int32 => &typ::INT32,
        TypeKind::Int64 => &typ::INT64,
        TypeKind::UInt8 => &typ::UINT8,
        TypeKind::UInt16 => &typ::UINT16,
        TypeKind::UInt32 => &typ::UINT32,
        TypeKind::UInt64 => &typ::UINT64,
        TypeKind::VarInt => &typ::VAR_INT,
        TypeKind::VarUInt => &typ::VAR_UINT,
        TypeKind::Float32 => &typ::FLOAT32,
        TypeKind::Float64 => &typ::FLOAT64,
        TypeKind::Float128 => &typ::FLOAT128,
        TypeKind::Decimal => &typ::DECIMAL,
        TypeKind::DateTime => &typ::DATE_TIME,
        TypeKind::UnixDateTime => &typ::UNIX_DATE_TIME,
        TypeKind::Guid => &typ::GUID,
        TypeKind::MongoDbObjectId => &typ::MONGO_OBJECT_ID,
        TypeKind::Utf8 => &typ::UTF8,
        TypeKind::Binary => &typ::BINARY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutCode;
    use crate::schema::SchemaId;

    #[test]
    fn compiles_mixed_storage_schema() {
        let mut schema = Schema::new("table", SchemaId::new(-1));
        schema.properties.push(Property::new(
            "a",
            PropertyType::primitive(TypeKind::Int32, StorageKind::Fixed, true),
        ));
        schema.properties.push(Property::new(
            "b",
            PropertyType::Primitive {
                kind: TypeKind::Utf8,
                storage: StorageKind::Variable,
                nullable: true,
                length: 100,
            },
        ));
        schema.properties.push(Property::new(
            "c",
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
        let ns = Namespace::default();
        let layout = schema.compile(&ns);

        assert_eq!(layout.num_fixed(), 1);
        assert_eq!(layout.num_variable(), 1);
        let c = layout.try_find("c").unwrap();
        assert_eq!(c.layout_type().code(), LayoutCode::TypedArrayScope);
        assert_eq!(c.type_args().len(), 1);
        assert_eq!(
            c.type_args()[0].layout_type().code(),
            LayoutCode::Int32
        );
    }

    #[test]
    fn nullable_items_wrap_in_nullable_scope() {
        let mut schema = Schema::new("t", SchemaId::new(1));
        schema.properties.push(Property::new(
            "xs",
            PropertyType::Array {
                items: Some(Box::new(PropertyType::primitive(
                    TypeKind::Utf8,
                    StorageKind::Sparse,
                    true,
                ))),
                nullable: true,
                immutable: false,
            },
        ));
        let layout = schema.compile(&Namespace::default());
        let xs = layout.try_find("xs").unwrap();
        assert_eq!(
            xs.type_args()[0].layout_type().code(),
            LayoutCode::NullableScope
        );
        assert_eq!(
            xs.type_args()[0].type_args()[0].layout_type().code(),
            LayoutCode::Utf8
        );
    }

    #[test]
    fn udt_resolves_by_name() {
        let mut ns = Namespace::default();
        ns.schemas.push(Schema::new("child", SchemaId::new(5)));
        let mut parent = Schema::new("parent", SchemaId::new(6));
        parent.properties.push(Property::new(
            "c",
            PropertyType::Udt {
                name: "child".to_owned(),
                schema_id: SchemaId::invalid(),
                nullable: true,
                immutable: false,
            },
        ));
        ns.schemas.push(parent);

        let layout = ns.schemas()[1].compile(&ns);
        let c = layout.try_find("c").unwrap();
        assert_eq!(c.layout_type().code(), LayoutCode::Schema);
        assert_eq!(c.type_args().schema_id(), SchemaId::new(5));
    }

    #[test]
    fn map_compiles_to_key_value_args() {
        let mut schema = Schema::new("t", SchemaId::new(1));
        schema.properties.push(Property::new(
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
        ));
        let layout = schema.compile(&Namespace::default());
        let m = layout.try_find("m").unwrap();
        assert_eq!(m.layout_type().code(), LayoutCode::TypedMapScope);
        assert_eq!(m.type_args().len(), 2);
    }
}
