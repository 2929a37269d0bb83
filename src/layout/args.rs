//! Type arguments of parameterized layout types.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::typ::LayoutType;
use crate::schema::SchemaId;

/// The full logical type of a field: a physical layout type plus its type
/// arguments.
#[derive(Clone)]
pub struct TypeArgument {
    typ: &'static LayoutType,
    args: TypeArgumentList,
}

impl TypeArgument {
    /// A type argument with nested arguments.
    #[must_use]
    pub fn new(typ: &'static LayoutType, args: TypeArgumentList) -> TypeArgument {
        TypeArgument { typ, args }
    }

    /// A type argument for an unparameterized type.
    #[must_use]
    pub fn of(typ: &'static LayoutType) -> TypeArgument {
        TypeArgument {
            typ,
            args: TypeArgumentList::default(),
        }
    }

    /// The physical layout type.
    #[must_use]
    pub fn layout_type(&self) -> &'static LayoutType {
        self.typ
    }

    /// The nested type arguments.
    #[must_use]
    pub fn type_args(&self) -> &TypeArgumentList {
        &self.args
    }
}

impl Default for TypeArgument {
    fn default() -> Self {
        TypeArgument::of(&super::typ::NULL)
    }
}

impl PartialEq for TypeArgument {
    fn eq(&self, other: &Self) -> bool {
        self.typ.code() == other.typ.code() && self.args == other.args
    }
}

impl Eq for TypeArgument {}

impl Hash for TypeArgument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.typ.code().hash(state);
        self.args.hash(state);
    }
}

impl fmt::Debug for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.typ.is_udt() {
            return write!(f, "{}<{}>", self.typ, self.args.schema_id().id());
        }
        write!(f, "{}{}", self.typ, self.args)
    }
}

/// A small immutable list of type arguments, shared by reference.
///
/// For user-defined types the list instead carries the [`SchemaId`] of the
/// nested layout.  Copies are O(1); equality is by content.
#[derive(Clone, Default)]
pub struct TypeArgumentList {
    args: Arc<[TypeArgument]>,
    schema_id: SchemaId,
}

impl TypeArgumentList {
    /// A list carrying only a UDT schema id.
    #[must_use]
    pub fn from_schema_id(schema_id: SchemaId) -> TypeArgumentList {
        TypeArgumentList {
            args: Arc::from([]),
            schema_id,
        }
    }

    /// The number of type arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// True if the list carries no type arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// For UDT fields, the schema id of the nested layout.
    #[must_use]
    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }

    /// The arguments as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[TypeArgument] {
        &self.args
    }

    /// Iterates the arguments.
    pub fn iter(&self) -> std::slice::Iter<'_, TypeArgument> {
        self.args.iter()
    }
}

impl std::ops::Index<usize> for TypeArgumentList {
    type Output = TypeArgument;

    fn index(&self, index: usize) -> &TypeArgument {
        &self.args[index]
    }
}

impl From<Vec<TypeArgument>> for TypeArgumentList {
    fn from(args: Vec<TypeArgument>) -> Self {
        TypeArgumentList {
            args: args.into(),
            schema_id: SchemaId::invalid(),
        }
    }
}

impl From<TypeArgument> for TypeArgumentList {
    fn from(arg: TypeArgument) -> Self {
        vec![arg].into()
    }
}

impl<'a> IntoIterator for &'a TypeArgumentList {
    type Item = &'a TypeArgument;
    type IntoIter = std::slice::Iter<'a, TypeArgument>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}

impl PartialEq for TypeArgumentList {
    fn eq(&self, other: &Self) -> bool {
        self.schema_id == other.schema_id && self.args == other.args
    }
}

impl Eq for TypeArgumentList {}

impl Hash for TypeArgumentList {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema_id.hash(state);
        for arg in self.args.iter() {
            arg.hash(state);
        }
    }
}

impl fmt::Debug for TypeArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for TypeArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(">")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::typ;

    #[test]
    fn equality_is_structural() {
        let a = TypeArgumentList::from(vec![TypeArgument::of(&typ::INT32)]);
        let b = TypeArgumentList::from(vec![TypeArgument::of(&typ::INT32)]);
        let c = TypeArgumentList::from(vec![TypeArgument::of(&typ::UTF8)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, TypeArgumentList::from_schema_id(SchemaId::new(7)));
    }

    #[test]
    fn clone_shares_storage() {
        let a = TypeArgumentList::from(vec![
            TypeArgument::of(&typ::INT32),
            TypeArgument::of(&typ::UTF8),
        ]);
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.args, &b.args));
        assert_eq!(b.len(), 2);
    }
}
