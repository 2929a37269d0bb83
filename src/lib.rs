#![deny(missing_docs)]
//! Compact, self-describing, schema-directed binary row encoding.
//!
//! A hybrid row combines a schematized prefix — fixed-width columns at
//! precomputed offsets and length-prefixed variable columns, both guarded by
//! presence bits — with an extensible sparse suffix of self-describing
//! fields supporting nested scopes: objects, arrays, sets, maps, tuples,
//! tagged unions, nullables, and embedded user-defined types.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use hybrid_row::prelude::*;
//!
//! // Describe a schema.
//! let mut schema = Schema::new("point", SchemaId::new(1));
//! schema.properties.push(Property::new(
//!     "x",
//!     PropertyType::primitive(TypeKind::Int32, StorageKind::Fixed, true),
//! ));
//! schema.properties.push(Property::new(
//!     "y",
//!     PropertyType::primitive(TypeKind::Int32, StorageKind::Fixed, true),
//! ));
//! let mut ns = Namespace::default();
//! ns.schemas.push(schema);
//!
//! // Compile it and write a row.
//! let resolver = Arc::new(LayoutResolverNamespace::new(ns, None));
//! let layout = resolver.resolve(SchemaId::new(1));
//!
//! let mut row = RowBuffer::new();
//! row.init_layout(HybridRowVersion::V1, &layout, resolver.clone());
//! let root = RowCursor::create(&row);
//! let x = layout.try_find("x").unwrap();
//! row.write_fixed_i32(&root, x, 42)?;
//! assert_eq!(row.read_fixed_i32(&root, x)?, 42);
//! # Ok::<_, hybrid_row::Error>(())
//! ```
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`schema`] | Schema data model, compilation, system schemas |
//! | [`layout`] | Compiled layouts, type descriptors, resolvers |
//! | [`row`] | [`RowBuffer`](row::RowBuffer) and [`RowCursor`](row::RowCursor) |
//! | [`recordio`] | Segment/record framing over byte streams |
//! | [`codec`] | Varint primitives |
//! | [`types`] | Opaque scalar value wrappers |
//!
//! # Cargo features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `serde` | | Serialize/deserialize the schema data model as text |
//! | `tracing` | | Diagnostic events from the resolver and parser |

pub mod codec;
pub mod error;
pub mod layout;
pub mod recordio;
pub mod row;
pub mod schema;
pub mod types;

pub use error::{Error, Result};

/// Prelude exporting the common surface.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::layout::{
        Layout, LayoutBuilder, LayoutCode, LayoutColumn, LayoutResolver, LayoutResolverNamespace,
        StorageKind, TypeArgument, TypeArgumentList,
    };
    pub use crate::recordio::{Production, Record, RecordIoParser, Segment};
    pub use crate::row::{HybridRowHeader, HybridRowVersion, RowBuffer, RowCursor, UpdateOptions};
    pub use crate::schema::{
        Namespace, Property, PropertyType, Schema, SchemaId, TypeKind, system_resolver,
    };
}
