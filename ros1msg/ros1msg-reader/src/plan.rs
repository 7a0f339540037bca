//! Compilation of message definitions into a reusable decode plan.
//!
//! Every definition becomes a [`TypePlan`] whose non-constant fields carry
//! an element rule ([`ElementPlan`]), an array layout ([`Layout`]) and, where
//! the encoded width does not depend on the data, a constant size. Complex
//! references are resolved to [`TypeId`] indices here, so decoding never
//! looks a type up by name.

use std::sync::Arc;

use ros1msg_core::{FieldDefinition, MessageDefinition};

use crate::{codec::Builtin, error::SchemaError, resolver::resolve_complex};

/// Index of a type inside its [`DecodePlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(usize);

/// How a single element of a field is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementPlan {
    Scalar(Builtin),
    String,
    Complex(TypeId),
}

/// Whether a field holds one element or an array of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Single,
    /// `T[N]`: exactly `N` elements, no prefix.
    Fixed(usize),
    /// `T[]`: `uint32` count prefix followed by the elements.
    Dynamic,
}

/// A non-constant field of a [`TypePlan`].
#[derive(Debug, Clone)]
pub struct FieldPlan {
    name: Arc<str>,
    element: ElementPlan,
    layout: Layout,
    fixed_size: Option<usize>,
}

impl FieldPlan {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn element(&self) -> ElementPlan {
        self.element
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Encoded size when it does not depend on the message contents.
    pub fn fixed_size(&self) -> Option<usize> {
        self.fixed_size
    }
}

/// Compiled form of one [`MessageDefinition`].
#[derive(Debug, Clone)]
pub struct TypePlan {
    name: Option<String>,
    fields: Vec<FieldPlan>,
    fixed_size: Option<usize>,
    min_size: usize,
}

impl TypePlan {
    /// Definition name; `None` for the root type.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<root>")
    }

    pub fn fields(&self) -> &[FieldPlan] {
        &self.fields
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Encoded size when every field has a constant size.
    pub fn fixed_size(&self) -> Option<usize> {
        self.fixed_size
    }

    /// Smallest possible encoded size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }
}

/// Immutable decoder for one schema, built once and shared across decodes.
#[derive(Debug, Clone)]
pub struct DecodePlan {
    types: Vec<TypePlan>,
    root: TypeId,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    Active,
    Done,
}

impl DecodePlan {
    /// Compile `definitions`, which must contain exactly one unnamed root type.
    ///
    /// Fails on unresolved or ambiguous complex references, unknown builtin
    /// type names and types that refer back to themselves, directly or
    /// through other types and arrays.
    pub fn compile(definitions: &[MessageDefinition]) -> Result<Self, SchemaError> {
        if definitions.is_empty() {
            return Err(SchemaError::Empty);
        }
        let roots: Vec<usize> = definitions
            .iter()
            .enumerate()
            .filter(|(_, def)| def.is_root())
            .map(|(index, _)| index)
            .collect();
        let [root] = roots.as_slice() else {
            return Err(SchemaError::RootCount(roots.len()));
        };

        let mut types = definitions
            .iter()
            .map(|def| compile_type(definitions, def))
            .collect::<Result<Vec<_>, _>>()?;

        let mut visits = vec![Visit::Pending; types.len()];
        for index in 0..types.len() {
            measure(&mut types, &mut visits, index)?;
        }

        Ok(Self {
            types,
            root: TypeId(*root),
        })
    }

    pub fn root(&self) -> TypeId {
        self.root
    }

    pub fn root_type(&self) -> &TypePlan {
        self.type_plan(self.root)
    }

    pub fn type_plan(&self, id: TypeId) -> &TypePlan {
        &self.types[id.0]
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeId, &TypePlan)> {
        self.types.iter().enumerate().map(|(i, ty)| (TypeId(i), ty))
    }

    /// Find a compiled type by its definition name.
    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .position(|ty| ty.name() == Some(name))
            .map(TypeId)
    }

    /// Constant width of one element, if it has one.
    pub(crate) fn element_width(&self, element: ElementPlan) -> Option<usize> {
        match element {
            ElementPlan::Scalar(builtin) => Some(builtin.width()),
            ElementPlan::String => None,
            ElementPlan::Complex(id) => self.type_plan(id).fixed_size,
        }
    }

    /// Smallest possible encoded size of one element.
    pub(crate) fn element_min_size(&self, element: ElementPlan) -> usize {
        match element {
            ElementPlan::Scalar(builtin) => builtin.width(),
            ElementPlan::String => 4,
            ElementPlan::Complex(id) => self.type_plan(id).min_size,
        }
    }

    /// Bytes that must remain after the prefix of a dynamic array holding
    /// `count` elements.
    ///
    /// Zero-width elements are charged one byte each, so a count can never
    /// exceed the rest of the buffer.
    pub(crate) fn dynamic_array_floor(&self, element: ElementPlan, count: usize) -> usize {
        count.saturating_mul(self.element_min_size(element).max(1))
    }
}

fn compile_type(
    definitions: &[MessageDefinition],
    def: &MessageDefinition,
) -> Result<TypePlan, SchemaError> {
    let fields = def
        .fields
        .iter()
        .filter(|field| !field.is_constant)
        .map(|field| compile_field(definitions, def, field))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TypePlan {
        name: def.name.clone(),
        fields,
        fixed_size: None,
        min_size: 0,
    })
}

fn compile_field(
    definitions: &[MessageDefinition],
    owner: &MessageDefinition,
    field: &FieldDefinition,
) -> Result<FieldPlan, SchemaError> {
    let element = if field.is_complex {
        ElementPlan::Complex(TypeId(resolve_complex(definitions, owner, field)?))
    } else if field.type_name == "string" {
        ElementPlan::String
    } else {
        let builtin = Builtin::from_type_name(&field.type_name).ok_or_else(|| {
            SchemaError::UnknownBuiltin {
                owner: owner.display_name().to_string(),
                field: field.name.clone(),
                type_name: field.type_name.clone(),
            }
        })?;
        ElementPlan::Scalar(builtin)
    };

    let layout = match (field.is_array, field.array_length) {
        (false, _) => Layout::Single,
        (true, Some(len)) => Layout::Fixed(len),
        (true, None) => Layout::Dynamic,
    };

    Ok(FieldPlan {
        name: Arc::from(field.name.as_str()),
        element,
        layout,
        fixed_size: None,
    })
}

/// Fill in constant and minimum sizes depth-first, rejecting any type that
/// is reachable from itself.
fn measure(types: &mut [TypePlan], visits: &mut [Visit], index: usize) -> Result<(), SchemaError> {
    match visits[index] {
        Visit::Done => return Ok(()),
        Visit::Active => {
            return Err(SchemaError::RecursiveType {
                type_name: types[index].display_name().to_string(),
            });
        }
        Visit::Pending => {}
    }
    visits[index] = Visit::Active;

    let mut fixed_size = Some(0usize);
    let mut min_size = 0usize;
    for field_index in 0..types[index].fields.len() {
        let element = types[index].fields[field_index].element;
        let layout = types[index].fields[field_index].layout;

        // A dynamic array contributes only its count prefix to the sizes,
        // but its element type still takes part in the cycle check.
        if layout == Layout::Dynamic {
            if let ElementPlan::Complex(TypeId(nested)) = element {
                measure(types, visits, nested)?;
            }
            fixed_size = None;
            min_size = min_size.saturating_add(4);
            continue;
        }

        let (element_fixed, element_min) = match element {
            ElementPlan::Scalar(builtin) => (Some(builtin.width()), builtin.width()),
            ElementPlan::String => (None, 4),
            ElementPlan::Complex(TypeId(nested)) => {
                measure(types, visits, nested)?;
                (types[nested].fixed_size, types[nested].min_size)
            }
        };

        let (field_fixed, field_min) = match layout {
            Layout::Fixed(len) => (
                element_fixed.and_then(|w| w.checked_mul(len)),
                element_min.saturating_mul(len),
            ),
            Layout::Single | Layout::Dynamic => (element_fixed, element_min),
        };

        types[index].fields[field_index].fixed_size = field_fixed;
        fixed_size = fixed_size
            .zip(field_fixed)
            .and_then(|(total, size)| total.checked_add(size));
        min_size = min_size.saturating_add(field_min);
    }

    types[index].fixed_size = fixed_size;
    types[index].min_size = min_size;
    visits[index] = Visit::Done;
    Ok(())
}
