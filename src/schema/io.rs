//! Namespace persistence: reading and writing the schema data model as
//! hybrid rows governed by the system schemas.

use super::system::{
    ENUM_SCHEMA_SCHEMA_ID, ENUM_VALUE_SCHEMA_ID, NAMESPACE_SCHEMA_ID, PARTITION_KEY_SCHEMA_ID,
    PRIMARY_SORT_KEY_SCHEMA_ID, PROPERTY_SCHEMA_ID, PROPERTY_TYPE_SCHEMA_ID,
    SCHEMA_OPTIONS_SCHEMA_ID, SCHEMA_SCHEMA_ID, STATIC_KEY_SCHEMA_ID,
};
use super::{
    EnumSchema, EnumValue, Namespace, PartitionKey, PrimarySortKey, Property, PropertyType, Schema,
    SchemaId, SchemaLanguageVersion, SchemaOptions, SortDirection, StaticKey, StorageKind,
    TypeKind,
};
use crate::error::{Error, Result};
use crate::layout::{Layout, LayoutColumn, TypeArgument, TypeArgumentList, typ};
use crate::row::{RowBuffer, RowCursor, UpdateOptions};

// Discriminants for the structural property kinds; primitive kinds use
// their TypeKind value.
const KIND_OBJECT: u8 = 32;
const KIND_ARRAY: u8 = 33;
const KIND_SET: u8 = 34;
const KIND_MAP: u8 = 35;
const KIND_TUPLE: u8 = 36;
const KIND_TAGGED: u8 = 37;
const KIND_UDT: u8 = 38;

const STORAGE_FIXED: u8 = 0;
const STORAGE_VARIABLE: u8 = 1;
const STORAGE_SPARSE: u8 = 2;

impl Namespace {
    /// Serializes this namespace into a row initialized with the
    /// `Namespace` system layout.
    pub fn write(&self, row: &mut RowBuffer) -> Result<()> {
        write_namespace(self, row)
    }

    /// Deserializes a namespace from a row.
    pub fn read(row: &RowBuffer) -> Result<Namespace> {
        read_namespace(row)
    }
}

/// Serializes a namespace into a row initialized with the `Namespace`
/// system layout.
pub fn write_namespace(ns: &Namespace, row: &mut RowBuffer) -> Result<()> {
    assert_eq!(row.header().schema_id(), NAMESPACE_SCHEMA_ID);
    let mut scope = RowCursor::create(row);
    let layout = scope.layout().clone();

    if ns.version != SchemaLanguageVersion::Unspecified {
        row.write_fixed_u8(&scope, col(&layout, "version"), ns.version as u8)?;
    }
    if !ns.name.is_empty() {
        row.write_variable_utf8(&mut scope, col(&layout, "name"), &ns.name)?;
    }
    if let Some(comment) = &ns.comment {
        row.write_variable_utf8(&mut scope, col(&layout, "comment"), comment)?;
    }

    if !ns.schemas.is_empty() {
        scope.find(row, "schemas");
        write_udt_array(row, &mut scope, SCHEMA_SCHEMA_ID, &ns.schemas, write_schema)?;
    }
    if !ns.enums.is_empty() {
        scope.find(row, "enums");
        write_udt_array(row, &mut scope, ENUM_SCHEMA_SCHEMA_ID, &ns.enums, write_enum_schema)?;
    }
    Ok(())
}

/// Deserializes a namespace from a row.
pub fn read_namespace(row: &RowBuffer) -> Result<Namespace> {
    assert_eq!(row.header().schema_id(), NAMESPACE_SCHEMA_ID);
    let mut scope = RowCursor::create(row);
    let layout = scope.layout().clone();

    let mut ns = Namespace {
        version: opt(row.read_fixed_u8(&scope, col(&layout, "version")))?
            .map_or(SchemaLanguageVersion::Unspecified, SchemaLanguageVersion::from_u8),
        name: opt(row.read_variable_utf8(&scope, col(&layout, "name")))?
            .unwrap_or_default()
            .to_owned(),
        comment: opt(row.read_variable_utf8(&scope, col(&layout, "comment")))?
            .map(str::to_owned),
        ..Namespace::default()
    };

    while scope.move_next(row) {
        match row.read_sparse_path(&scope).to_owned().as_str() {
            "schemas" => ns.schemas = read_udt_array(row, &mut scope, read_schema)?,
            "enums" => ns.enums = read_udt_array(row, &mut scope, read_enum_schema)?,
            _ => {}
        }
    }
    Ok(ns)
}

fn write_schema(row: &mut RowBuffer, scope: &mut RowCursor, schema: &Schema) -> Result<()> {
    let layout = scope.layout().clone();
    row.write_fixed_i32(scope, col(&layout, "id"), schema.schema_id.id())?;
    if schema.version != SchemaLanguageVersion::Unspecified {
        row.write_fixed_u8(scope, col(&layout, "version"), schema.version as u8)?;
    }
    row.write_variable_utf8(scope, col(&layout, "name"), &schema.name)?;
    if let Some(comment) = &schema.comment {
        row.write_variable_utf8(scope, col(&layout, "comment"), comment)?;
    }

    if schema.options != SchemaOptions::default() {
        scope.find(row, "options");
        let mut child = row.write_scope(
            scope,
            &typ::UDT,
            TypeArgumentList::from_schema_id(SCHEMA_OPTIONS_SCHEMA_ID),
            UpdateOptions::Upsert,
        )?;
        write_schema_options(row, &mut child, &schema.options)?;
        scope.skip(row, &mut child);
    }
    if !schema.partition_keys.is_empty() {
        scope.find(row, "partitionkeys");
        write_udt_array(
            row,
            scope,
            PARTITION_KEY_SCHEMA_ID,
            &schema.partition_keys,
            |row, child, key: &PartitionKey| {
                let layout = child.layout().clone();
                row.write_variable_utf8(child, col(&layout, "path"), &key.path)
            },
        )?;
    }
    if !schema.primary_sort_keys.is_empty() {
        scope.find(row, "primarykeys");
        write_udt_array(
            row,
            scope,
            PRIMARY_SORT_KEY_SCHEMA_ID,
            &schema.primary_sort_keys,
            |row, child, key: &PrimarySortKey| {
                let layout = child.layout().clone();
                row.write_fixed_u8(child, col(&layout, "direction"), key.direction as u8)?;
                row.write_variable_utf8(child, col(&layout, "path"), &key.path)
            },
        )?;
    }
    if !schema.static_keys.is_empty() {
        scope.find(row, "statickeys");
        write_udt_array(
            row,
            scope,
            STATIC_KEY_SCHEMA_ID,
            &schema.static_keys,
            |row, child, key: &StaticKey| {
                let layout = child.layout().clone();
                row.write_variable_utf8(child, col(&layout, "path"), &key.path)
            },
        )?;
    }
    if !schema.properties.is_empty() {
        scope.find(row, "properties");
        write_udt_array(row, scope, PROPERTY_SCHEMA_ID, &schema.properties, write_property)?;
    }
    Ok(())
}

fn read_schema(row: &RowBuffer, scope: &mut RowCursor) -> Result<Schema> {
    let layout = scope.layout().clone();
    let mut schema = Schema::new("", SchemaId::invalid());
    schema.schema_id = SchemaId::new(
        opt(row.read_fixed_i32(scope, col(&layout, "id")))?.unwrap_or_default(),
    );
    schema.version = opt(row.read_fixed_u8(scope, col(&layout, "version")))?
        .map_or(SchemaLanguageVersion::Unspecified, SchemaLanguageVersion::from_u8);
    schema.name = opt(row.read_variable_utf8(scope, col(&layout, "name")))?
        .unwrap_or_default()
        .to_owned();
    schema.comment = opt(row.read_variable_utf8(scope, col(&layout, "comment")))?
        .map(str::to_owned);

    while scope.move_next(row) {
        match row.read_sparse_path(scope).to_owned().as_str() {
            "options" => {
                let mut child = row.read_scope(scope)?;
                schema.options = read_schema_options(row, &mut child)?;
                scope.skip(row, &mut child);
            }
            "partitionkeys" => {
                schema.partition_keys = read_udt_array(row, scope, |row, child| {
                    let layout = child.layout().clone();
                    Ok(PartitionKey {
                        path: opt(row.read_variable_utf8(child, col(&layout, "path")))?
                            .unwrap_or_default()
                            .to_owned(),
                    })
                })?;
            }
            "primarykeys" => {
                schema.primary_sort_keys = read_udt_array(row, scope, |row, child| {
                    let layout = child.layout().clone();
                    Ok(PrimarySortKey {
                        direction: match opt(
                            row.read_fixed_u8(child, col(&layout, "direction")),
                        )?
                        .unwrap_or_default()
                        {
                            1 => SortDirection::Descending,
                            _ => SortDirection::Ascending,
                        },
                        path: opt(row.read_variable_utf8(child, col(&layout, "path")))?
                            .unwrap_or_default()
                            .to_owned(),
                    })
                })?;
            }
            "statickeys" => {
                schema.static_keys = read_udt_array(row, scope, |row, child| {
                    let layout = child.layout().clone();
                    Ok(StaticKey {
                        path: opt(row.read_variable_utf8(child, col(&layout, "path")))?
                            .unwrap_or_default()
                            .to_owned(),
                    })
                })?;
            }
            "properties" => {
                schema.properties = read_udt_array(row, scope, read_property)?;
            }
            _ => {}
        }
    }
    Ok(schema)
}

fn write_schema_options(
    row: &mut RowBuffer,
    scope: &mut RowCursor,
    options: &SchemaOptions,
) -> Result<()> {
    let layout = scope.layout().clone();
    if options.disallow_unschematized {
        row.write_fixed_bool(scope, col(&layout, "disallowunschematized"), true)?;
    }
    if options.enable_property_level_timestamps {
        row.write_fixed_bool(scope, col(&layout, "enablepropertyleveltimestamps"), true)?;
    }
    if options.disable_system_prefix {
        row.write_fixed_bool(scope, col(&layout, "disablesystemprefix"), true)?;
    }
    if options.abstract_schema {
        row.write_fixed_bool(scope, col(&layout, "abstract"), true)?;
    }
    Ok(())
}

fn read_schema_options(row: &RowBuffer, scope: &mut RowCursor) -> Result<SchemaOptions> {
    let layout = scope.layout().clone();
    Ok(SchemaOptions {
        disallow_unschematized: opt(
            row.read_fixed_bool(scope, col(&layout, "disallowunschematized")),
        )?
        .unwrap_or_default(),
        enable_property_level_timestamps: opt(
            row.read_fixed_bool(scope, col(&layout, "enablepropertyleveltimestamps")),
        )?
        .unwrap_or_default(),
        disable_system_prefix: opt(
            row.read_fixed_bool(scope, col(&layout, "disablesystemprefix")),
        )?
        .unwrap_or_default(),
        abstract_schema: opt(row.read_fixed_bool(scope, col(&layout, "abstract")))?
            .unwrap_or_default(),
    })
}

fn write_property(row: &mut RowBuffer, scope: &mut RowCursor, p: &Property) -> Result<()> {
    let layout = scope.layout().clone();
    row.write_variable_utf8(scope, col(&layout, "path"), &p.path)?;
    if let Some(comment) = &p.comment {
        row.write_variable_utf8(scope, col(&layout, "comment"), comment)?;
    }
    if let Some(api_name) = &p.api_name {
        row.write_variable_utf8(scope, col(&layout, "apiname"), api_name)?;
    }

    scope.find(row, "type");
    let mut child = row.write_scope(
        scope,
        &typ::UDT,
        TypeArgumentList::from_schema_id(PROPERTY_TYPE_SCHEMA_ID),
        UpdateOptions::Upsert,
    )?;
    write_property_type(row, &mut child, &p.property_type)?;
    scope.skip(row, &mut child);
    Ok(())
}

fn read_property(row: &RowBuffer, scope: &mut RowCursor) -> Result<Property> {
    let layout = scope.layout().clone();
    let mut property = Property::new(
        opt(row.read_variable_utf8(scope, col(&layout, "path")))?.unwrap_or_default(),
        PropertyType::primitive(TypeKind::Null, StorageKind::Sparse, true),
    );
    property.comment =
        opt(row.read_variable_utf8(scope, col(&layout, "comment")))?.map(str::to_owned);
    property.api_name =
        opt(row.read_variable_utf8(scope, col(&layout, "apiname")))?.map(str::to_owned);

    while scope.move_next(row) {
        if row.read_sparse_path(scope) == "type" {
            let mut child = row.read_scope(scope)?;
            property.property_type = read_property_type(row, &mut child)?;
            scope.skip(row, &mut child);
        }
    }
    Ok(property)
}

fn write_property_type(row: &mut RowBuffer, scope: &mut RowCursor, pt: &PropertyType) -> Result<()> {
    let layout = scope.layout().clone();

    let kind_col = col(&layout, "kind");
    let nullable_col = col(&layout, "nullable");
    let immutable_col = col(&layout, "immutable");
    match pt {
        PropertyType::Primitive {
            kind,
            storage,
            nullable,
            length,
        } => {
            row.write_fixed_u8(scope, kind_col, *kind as u8)?;
            let storage = match storage {
                StorageKind::Fixed => STORAGE_FIXED,
                StorageKind::Variable => STORAGE_VARIABLE,
                StorageKind::Sparse => STORAGE_SPARSE,
            };
            row.write_fixed_u8(scope, col(&layout, "storage"), storage)?;
            row.write_fixed_bool(scope, nullable_col, *nullable)?;
            if *length != 0 {
                row.write_fixed_i32(scope, col(&layout, "length"), *length as i32)?;
            }
        }
        PropertyType::Object {
            properties,
            nullable,
            immutable,
        } => {
            row.write_fixed_u8(scope, kind_col, KIND_OBJECT)?;
            row.write_fixed_bool(scope, nullable_col, *nullable)?;
            row.write_fixed_bool(scope, immutable_col, *immutable)?;
            if !properties.is_empty() {
                scope.find(row, "properties");
                write_udt_array(row, scope, PROPERTY_SCHEMA_ID, properties, write_property)?;
            }
        }
        PropertyType::Array {
            items,
            nullable,
            immutable,
        } => {
            row.write_fixed_u8(scope, kind_col, KIND_ARRAY)?;
            row.write_fixed_bool(scope, nullable_col, *nullable)?;
            row.write_fixed_bool(scope, immutable_col, *immutable)?;
            if let Some(item) = items {
                write_item_types(row, scope, std::slice::from_ref(&**item))?;
            }
        }
        PropertyType::Set {
            items,
            nullable,
            immutable,
        } => {
            row.write_fixed_u8(scope, kind_col, KIND_SET)?;
            row.write_fixed_bool(scope, nullable_col, *nullable)?;
            row.write_fixed_bool(scope, immutable_col, *immutable)?;
            write_item_types(row, scope, std::slice::from_ref(&**items))?;
        }
        PropertyType::Map {
            keys,
            values,
            nullable,
            immutable,
        } => {
            row.write_fixed_u8(scope, kind_col, KIND_MAP)?;
            row.write_fixed_bool(scope, nullable_col, *nullable)?;
            row.write_fixed_bool(scope, immutable_col, *immutable)?;
            let pair = [(**keys).clone(), (**values).clone()];
            write_item_types(row, scope, &pair)?;
        }
        PropertyType::Tuple {
            items,
            nullable,
            immutable,
        } => {
            row.write_fixed_u8(scope, kind_col, KIND_TUPLE)?;
            row.write_fixed_bool(scope, nullable_col, *nullable)?;
            row.write_fixed_bool(scope, immutable_col, *immutable)?;
            write_item_types(row, scope, items)?;
        }
        PropertyType::Tagged {
            items,
            nullable,
            immutable,
        } => {
            row.write_fixed_u8(scope, kind_col, KIND_TAGGED)?;
            row.write_fixed_bool(scope, nullable_col, *nullable)?;
            row.write_fixed_bool(scope, immutable_col, *immutable)?;
            write_item_types(row, scope, items)?;
        }
        PropertyType::Udt {
            name,
            schema_id,
            nullable,
            immutable,
        } => {
            row.write_fixed_u8(scope, kind_col, KIND_UDT)?;
            row.write_fixed_bool(scope, nullable_col, *nullable)?;
            row.write_fixed_bool(scope, immutable_col, *immutable)?;
            if !schema_id.is_invalid() {
                row.write_fixed_i32(scope, col(&layout, "schemaid"), schema_id.id())?;
            }
            if !name.is_empty() {
                row.write_variable_utf8(scope, col(&layout, "name"), name)?;
            }
        }
    }
    Ok(())
}

fn write_item_types(
    row: &mut RowBuffer,
    scope: &mut RowCursor,
    items: &[PropertyType],
) -> Result<()> {
    scope.find(row, "items");
    write_udt_array(row, scope, PROPERTY_TYPE_SCHEMA_ID, items, write_property_type)
}

fn read_property_type(row: &RowBuffer, scope: &mut RowCursor) -> Result<PropertyType> {
    let layout = scope.layout().clone();

    let kind = opt(row.read_fixed_u8(scope, col(&layout, "kind")))?.unwrap_or_default();
    let storage = opt(row.read_fixed_u8(scope, col(&layout, "storage")))?.unwrap_or_default();
    let nullable =
        opt(row.read_fixed_bool(scope, col(&layout, "nullable")))?.unwrap_or_default();
    let immutable =
        opt(row.read_fixed_bool(scope, col(&layout, "immutable")))?.unwrap_or_default();
    let length = opt(row.read_fixed_i32(scope, col(&layout, "length")))?.unwrap_or_default();
    let schema_id =
        opt(row.read_fixed_i32(scope, col(&layout, "schemaid")))?.unwrap_or_default();
    let name = opt(row.read_variable_utf8(scope, col(&layout, "name")))?
        .unwrap_or_default()
        .to_owned();

    let mut items = Vec::new();
    let mut properties = Vec::new();
    while scope.move_next(row) {
        match row.read_sparse_path(scope).to_owned().as_str() {
            "items" => items = read_udt_array(row, scope, read_property_type)?,
            "properties" => properties = read_udt_array(row, scope, read_property)?,
            _ => {}
        }
    }

    Ok(match kind {
        KIND_OBJECT => PropertyType::Object {
            properties,
            nullable,
            immutable,
        },
        KIND_ARRAY => PropertyType::Array {
            items: items.into_iter().next().map(Box::new),
            nullable,
            immutable,
        },
        KIND_SET => PropertyType::Set {
            items: Box::new(items.into_iter().next().ok_or(Error::InvalidRow)?),
            nullable,
            immutable,
        },
        KIND_MAP => {
            let mut items = items.into_iter();
            PropertyType::Map {
                keys: Box::new(items.next().ok_or(Error::InvalidRow)?),
                values: Box::new(items.next().ok_or(Error::InvalidRow)?),
                nullable,
                immutable,
            }
        }
        KIND_TUPLE => PropertyType::Tuple {
            items,
            nullable,
            immutable,
        },
        KIND_TAGGED => PropertyType::Tagged {
            items,
            nullable,
            immutable,
        },
        KIND_UDT => PropertyType::Udt {
            name,
            schema_id: SchemaId::new(schema_id),
            nullable,
            immutable,
        },
        kind => PropertyType::Primitive {
            kind: TypeKind::from_u8(kind).ok_or(Error::InvalidRow)?,
            storage: match storage {
                STORAGE_FIXED => StorageKind::Fixed,
                STORAGE_VARIABLE => StorageKind::Variable,
                _ => StorageKind::Sparse,
            },
            nullable,
            length: length as u32,
        },
    })
}

fn write_enum_schema(row: &mut RowBuffer, scope: &mut RowCursor, e: &EnumSchema) -> Result<()> {
    let layout = scope.layout().clone();
    row.write_fixed_u8(scope, col(&layout, "basekind"), e.base_kind as u8)?;
    row.write_variable_utf8(scope, col(&layout, "name"), &e.name)?;
    if let Some(comment) = &e.comment {
        row.write_variable_utf8(scope, col(&layout, "comment"), comment)?;
    }
    if !e.values.is_empty() {
        scope.find(row, "values");
        write_udt_array(
            row,
            scope,
            ENUM_VALUE_SCHEMA_ID,
            &e.values,
            |row, child, v: &EnumValue| {
                let layout = child.layout().clone();
                row.write_fixed_i64(child, col(&layout, "value"), v.value)?;
                row.write_variable_utf8(child, col(&layout, "name"), &v.name)?;
                if let Some(comment) = &v.comment {
                    row.write_variable_utf8(child, col(&layout, "comment"), comment)?;
                }
                Ok(())
            },
        )?;
    }
    Ok(())
}

fn read_enum_schema(row: &RowBuffer, scope: &mut RowCursor) -> Result<EnumSchema> {
    let layout = scope.layout().clone();
    let mut e = EnumSchema {
        name: opt(row.read_variable_utf8(scope, col(&layout, "name")))?
            .unwrap_or_default()
            .to_owned(),
        base_kind: TypeKind::from_u8(
            opt(row.read_fixed_u8(scope, col(&layout, "basekind")))?.unwrap_or_default(),
        )
        .ok_or(Error::InvalidRow)?,
        comment: opt(row.read_variable_utf8(scope, col(&layout, "comment")))?
            .map(str::to_owned),
        values: Vec::new(),
    };

    while scope.move_next(row) {
        if row.read_sparse_path(scope) == "values" {
            e.values = read_udt_array(row, scope, |row, child| {
                let layout = child.layout().clone();
                Ok(EnumValue {
                    value: opt(row.read_fixed_i64(child, col(&layout, "value")))?
                        .unwrap_or_default(),
                    name: opt(row.read_variable_utf8(child, col(&layout, "name")))?
                        .unwrap_or_default()
                        .to_owned(),
                    comment: opt(row.read_variable_utf8(child, col(&layout, "comment")))?
                        .map(str::to_owned),
                })
            })?;
        }
    }
    Ok(e)
}

/// Writes a typed array of UDT elements at the cursor.
fn write_udt_array<T>(
    row: &mut RowBuffer,
    scope: &mut RowCursor,
    element_id: SchemaId,
    elements: &[T],
    mut write_element: impl FnMut(&mut RowBuffer, &mut RowCursor, &T) -> Result<()>,
) -> Result<()> {
    let args = TypeArgumentList::from(TypeArgument::new(
        &typ::UDT,
        TypeArgumentList::from_schema_id(element_id),
    ));
    let mut items = row.write_scope(scope, &typ::TYPED_ARRAY, args, UpdateOptions::Upsert)?;
    for element in elements {
        let mut child = row.write_scope(
            &mut items,
            &typ::UDT,
            TypeArgumentList::from_schema_id(element_id),
            UpdateOptions::Upsert,
        )?;
        write_element(row, &mut child, element)?;
        items.move_next_past(row, &mut child);
    }
    scope.skip(row, &mut items);
    Ok(())
}

/// Reads a typed array of UDT elements at the cursor.
fn read_udt_array<T>(
    row: &RowBuffer,
    scope: &mut RowCursor,
    mut read_element: impl FnMut(&RowBuffer, &mut RowCursor) -> Result<T>,
) -> Result<Vec<T>> {
    let mut items = row.read_scope(scope)?;
    let mut elements = Vec::with_capacity(items.count() as usize);
    while items.move_next(row) {
        let mut child = row.read_scope(&items)?;
        elements.push(read_element(row, &mut child)?);
        items.skip(row, &mut child);
    }
    scope.skip(row, &mut items);
    Ok(elements)
}

fn col<'a>(layout: &'a Layout, path: &str) -> &'a LayoutColumn {
    layout
        .try_find(path)
        .unwrap_or_else(|| panic!("system layout {} lacks column {path}", layout.name()))
}

fn opt<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::NotFound) => Ok(None),
        Err(err) => Err(err),
    }
}
