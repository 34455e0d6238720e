//! Detects resources that are already declared in configuration.

use tracing::debug;

use crate::address::{ResourceAddress, ResourceMode};
use crate::config::{ConfigTree, SourceRange};
use crate::error::ScaffoldError;

/// Check whether the resource behind `address` is already declared.
///
/// Returns the conflicting declaration's source range, or `None` when the
/// module exists and declares no such managed resource. Matching is done at
/// resource level: instance keys on the address and on its module calls are
/// ignored because configuration declares resources, not instances.
pub fn check<'t>(
    address: &ResourceAddress,
    tree: &'t ConfigTree,
) -> Result<Option<&'t SourceRange>, ScaffoldError> {
    let module = tree
        .descendant(&address.module.call_names())
        .ok_or_else(|| ScaffoldError::ModuleNotFound(address.module.to_string()))?;

    if address.mode != ResourceMode::Managed {
        return Ok(None);
    }

    let conflict = module.managed_resources.get(&address.config_key());
    if let Some(range) = conflict {
        debug!(address = %address, declared_at = %range, "resource already declared");
    }
    Ok(conflict)
}

/// Like [`check`], but turns a conflict into [`ScaffoldError::ResourceAlreadyExists`].
pub fn ensure_absent(address: &ResourceAddress, tree: &ConfigTree) -> Result<(), ScaffoldError> {
    match check(address, tree)? {
        Some(range) => Err(ScaffoldError::ResourceAlreadyExists {
            address: address.to_string(),
            declared_at: range.clone(),
        }),
        None => Ok(()),
    }
}
