//! Complex-type name resolution.
//!
//! A field refers to another definition either by bare name (`Header`) or
//! by package-qualified name (`std_msgs/Header`). Lookup order:
//!
//! 1. **Exact match** against the definition names, for qualified
//!    references only.
//! 2. **Suffix match**: the unique named definition whose name ends with
//!    `/` followed by the reference, so `Header` and `std_msgs/Header` both
//!    find `std_msgs/Header`. A bare `Header` never matches a definition
//!    that is itself named `Header`.
//! 3. **Error**: nothing matched, or the suffix matched more than once.

use ros1msg_core::{FieldDefinition, MessageDefinition};

use crate::error::SchemaError;

/// Index of the definition `field` refers to.
pub(crate) fn resolve_complex(
    definitions: &[MessageDefinition],
    owner: &MessageDefinition,
    field: &FieldDefinition,
) -> Result<usize, SchemaError> {
    let wanted = field.type_name.as_str();
    let named = || {
        definitions
            .iter()
            .enumerate()
            .filter_map(|(index, def)| def.name.as_deref().map(|name| (index, name)))
    };

    if wanted.contains('/')
        && let Some((index, _)) = named().find(|(_, name)| *name == wanted)
    {
        return Ok(index);
    }

    let suffix = format!("/{wanted}");
    let matches: Vec<(usize, &str)> = named().filter(|(_, name)| name.ends_with(&suffix)).collect();
    match matches.as_slice() {
        [(index, _)] => Ok(*index),
        [] => Err(SchemaError::UnresolvedType {
            owner: owner.display_name().to_string(),
            field: field.name.clone(),
            type_name: wanted.to_string(),
        }),
        _ => Err(SchemaError::AmbiguousType {
            owner: owner.display_name().to_string(),
            field: field.name.clone(),
            type_name: wanted.to_string(),
            candidates: matches.iter().map(|(_, name)| name.to_string()).collect(),
        }),
    }
}
