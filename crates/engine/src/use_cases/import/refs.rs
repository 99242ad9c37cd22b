//! Reference resolution against a [`TriggerIdMap`].
//!
//! One fixed priority for every reference: the order lookup, then the
//! source-ID lookup, then UUID passthrough. A passed-through UUID that is
//! not part of the import batch resolves with a warning.

use uuid::Uuid;

use playkit_domain::{EntityKind, EntityRef};

use super::id_map::TriggerIdMap;

/// A resolved reference, possibly with a warning attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRef {
    pub id: Uuid,
    pub warning: Option<String>,
}

pub fn resolve_ref(
    id_map: &TriggerIdMap,
    kind: EntityKind,
    reference: &EntityRef,
) -> Result<ResolvedRef, String> {
    match reference {
        EntityRef::Order(order) => id_map
            .by_order(kind, *order)
            .map(|id| ResolvedRef { id, warning: None })
            .ok_or_else(|| format!("Missing {} mapping for order {}", kind, order)),
        EntityRef::Id(raw) => {
            if let Some(id) = id_map.by_source_id(kind, raw) {
                return Ok(ResolvedRef { id, warning: None });
            }

            let id = Uuid::parse_str(raw.trim())
                .map_err(|_| format!("Missing {} mapping for source ID \"{}\"", kind, raw))?;

            let warning = (!id_map.in_import_batch(&id)).then(|| {
                format!("{} id \"{}\" not in import batch", kind.display_name(), id)
            });
            Ok(ResolvedRef { id, warning })
        }
    }
}
