//! JSDoc annotation records.
//!
//! The pass never parses comment text; upstream passes attach these
//! records to nodes and the pass reads, merges and re-attaches them so
//! that the type checker still sees accurate annotations after lowering.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// A type expression tree, as it appears inside an annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
    /// A type name: `Foo`, `Array`.
    Name(String),
    /// Non-nullable: `!T`.
    Bang(Box<TypeExpr>),
    /// Unknown (`?`) or nullable (`?T`).
    Qmark(Option<Box<TypeExpr>>),
    /// Variadic: `...` or `...T`.
    Ellipsis(Option<Box<TypeExpr>>),
    /// Parameterized: `Array<T>`.
    Generic(String, Vec<TypeExpr>),
}

impl TypeExpr {
    /// The wildcard type `?`.
    pub fn unknown() -> TypeExpr {
        TypeExpr::Qmark(None)
    }

    /// `!Array<elem>`.
    pub fn non_null_array_of(elem: TypeExpr) -> TypeExpr {
        TypeExpr::Bang(Box::new(TypeExpr::Generic("Array".to_string(), vec![elem])))
    }

    /// `!name`.
    pub fn non_null_name(name: &str) -> TypeExpr {
        TypeExpr::Bang(Box::new(TypeExpr::Name(name.to_string())))
    }

    pub fn is_ellipsis(&self) -> bool {
        matches!(self, TypeExpr::Ellipsis(_))
    }

    /// For `...T`, the element type `T`; for anything else, the type itself.
    pub fn ellipsis_element(&self) -> TypeExpr {
        match self {
            TypeExpr::Ellipsis(Some(inner)) => (**inner).clone(),
            TypeExpr::Ellipsis(None) => TypeExpr::unknown(),
            other => other.clone(),
        }
    }
}

/// An attached annotation record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsDoc {
    /// `@type`.
    pub ty: Option<TypeExpr>,
    /// `@return`.
    pub return_type: Option<TypeExpr>,
    /// `@param`s, in declaration order.
    pub params: IndexMap<String, TypeExpr>,
    /// `@this`.
    pub this_type: Option<TypeExpr>,
    /// `@extends` on a constructor.
    pub base_type: Option<TypeExpr>,
    /// `@extends` entries on an interface.
    pub extended_interfaces: Vec<TypeExpr>,
    /// `@suppress` names.
    pub suppressions: FxHashSet<String>,
    pub is_constructor: bool,
    pub is_interface: bool,
    pub is_struct: bool,
    pub is_dict: bool,
    pub is_unrestricted: bool,
    pub is_export: bool,
    /// Opaque property bits carried through lowering; merged bitwise.
    pub property_bitfield: u64,
}

impl JsDoc {
    pub fn parameter_type(&self, name: &str) -> Option<&TypeExpr> {
        self.params.get(name)
    }
}

/// Builder mirroring the record-then-build protocol the transforms drive.
#[derive(Clone, Debug, Default)]
pub struct JsDocBuilder {
    doc: JsDoc,
}

impl JsDocBuilder {
    pub fn new() -> JsDocBuilder {
        JsDocBuilder::default()
    }

    /// Start from a copy of an existing record, or empty when absent.
    pub fn maybe_copy_from(existing: Option<&JsDoc>) -> JsDocBuilder {
        JsDocBuilder {
            doc: existing.cloned().unwrap_or_default(),
        }
    }

    pub fn record_type(&mut self, ty: TypeExpr) -> &mut Self {
        self.doc.ty = Some(ty);
        self
    }

    pub fn record_return_type(&mut self, ty: TypeExpr) -> &mut Self {
        self.doc.return_type = Some(ty);
        self
    }

    pub fn record_parameter(&mut self, name: &str, ty: TypeExpr) -> &mut Self {
        self.doc.params.insert(name.to_string(), ty);
        self
    }

    pub fn record_this_type(&mut self, ty: TypeExpr) -> &mut Self {
        self.doc.this_type = Some(ty);
        self
    }

    pub fn record_base_type(&mut self, ty: TypeExpr) -> &mut Self {
        self.doc.base_type = Some(ty);
        self
    }

    pub fn record_extended_interface(&mut self, ty: TypeExpr) -> &mut Self {
        self.doc.extended_interfaces.push(ty);
        self
    }

    pub fn record_constructor(&mut self) -> &mut Self {
        self.doc.is_constructor = true;
        self
    }

    pub fn record_struct(&mut self) -> &mut Self {
        self.doc.is_struct = true;
        self
    }

    pub fn record_export(&mut self) -> &mut Self {
        self.doc.is_export = true;
        self
    }

    pub fn record_suppressions(&mut self, suppressions: &FxHashSet<String>) -> &mut Self {
        self.doc.suppressions.extend(suppressions.iter().cloned());
        self
    }

    pub fn merge_property_bitfield_from(&mut self, other: &JsDoc) -> &mut Self {
        self.doc.property_bitfield |= other.property_bitfield;
        self
    }

    pub fn is_interface_recorded(&self) -> bool {
        self.doc.is_interface
    }

    pub fn is_struct_recorded(&self) -> bool {
        self.doc.is_struct
    }

    pub fn is_dict_recorded(&self) -> bool {
        self.doc.is_dict
    }

    pub fn is_unrestricted_recorded(&self) -> bool {
        self.doc.is_unrestricted
    }

    pub fn build(self) -> JsDoc {
        self.doc
    }
}
