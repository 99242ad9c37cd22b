//! Entity ID map used to resolve symbolic references.
//!
//! For every referenceable kind (phase, step, role, artifact) the map holds
//! an order lookup and a source-ID lookup. `import_batch_uuids` is the union
//! of every value of every lookup; it is computed once when the map is built
//! and the map has no mutators, so it cannot drift from the lookups.

use std::collections::{BTreeMap, HashMap, HashSet};

use uuid::Uuid;

use playkit_domain::{EntityKind, Game, GameId};

/// Lookups for one entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindIds {
    by_order: BTreeMap<u32, Uuid>,
    by_source_id: HashMap<String, Uuid>,
}

impl KindIds {
    pub fn by_order(&self) -> &BTreeMap<u32, Uuid> {
        &self.by_order
    }

    pub fn by_source_id(&self) -> &HashMap<String, Uuid> {
        &self.by_source_id
    }

    fn values(&self) -> impl Iterator<Item = &Uuid> {
        self.by_order.values().chain(self.by_source_id.values())
    }
}

/// Immutable ID lookups for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerIdMap {
    namespace: Uuid,
    phases: KindIds,
    steps: KindIds,
    roles: KindIds,
    artifacts: KindIds,
    import_batch_uuids: HashSet<Uuid>,
}

impl TriggerIdMap {
    pub fn builder() -> TriggerIdMapBuilder {
        TriggerIdMapBuilder::default()
    }

    pub fn ids(&self, kind: EntityKind) -> &KindIds {
        match kind {
            EntityKind::Phase => &self.phases,
            EntityKind::Step => &self.steps,
            EntityKind::Role => &self.roles,
            EntityKind::Artifact => &self.artifacts,
        }
    }

    pub fn by_order(&self, kind: EntityKind, order: u32) -> Option<Uuid> {
        self.ids(kind).by_order.get(&order).copied()
    }

    pub fn by_source_id(&self, kind: EntityKind, source_id: &str) -> Option<Uuid> {
        self.ids(kind).by_source_id.get(source_id).copied()
    }

    pub fn import_batch_uuids(&self) -> &HashSet<Uuid> {
        &self.import_batch_uuids
    }

    pub fn in_import_batch(&self, id: &Uuid) -> bool {
        self.import_batch_uuids.contains(id)
    }

    /// Namespace for IDs derived from this map (the game ID when built from a game).
    pub fn namespace(&self) -> Uuid {
        self.namespace
    }

    /// Deterministic ID for anything in this game that has no provided ID.
    pub fn derive_id(&self, scope: &str, position: impl std::fmt::Display) -> Uuid {
        derive_entity_id(self.namespace, scope, position)
    }
}

/// Collects lookups, then freezes them into a [`TriggerIdMap`].
#[derive(Debug, Default)]
pub struct TriggerIdMapBuilder {
    namespace: Uuid,
    phases: KindIds,
    steps: KindIds,
    roles: KindIds,
    artifacts: KindIds,
}

impl TriggerIdMapBuilder {
    pub fn namespace(mut self, namespace: Uuid) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn insert(mut self, kind: EntityKind, order: u32, source_id: Option<&str>, id: Uuid) -> Self {
        let ids = match kind {
            EntityKind::Phase => &mut self.phases,
            EntityKind::Step => &mut self.steps,
            EntityKind::Role => &mut self.roles,
            EntityKind::Artifact => &mut self.artifacts,
        };
        ids.by_order.insert(order, id);
        if let Some(source_id) = source_id {
            ids.by_source_id.insert(source_id.to_string(), id);
        }
        self
    }

    pub fn build(self) -> TriggerIdMap {
        let import_batch_uuids = [&self.phases, &self.steps, &self.roles, &self.artifacts]
            .into_iter()
            .flat_map(|ids| ids.values())
            .copied()
            .collect();

        TriggerIdMap {
            namespace: self.namespace,
            phases: self.phases,
            steps: self.steps,
            roles: self.roles,
            artifacts: self.artifacts,
            import_batch_uuids,
        }
    }
}

/// UUIDv5 of `scope:position` inside `namespace`.
pub fn derive_entity_id(namespace: Uuid, scope: &str, position: impl std::fmt::Display) -> Uuid {
    Uuid::new_v5(&namespace, format!("{}:{}", scope, position).as_bytes())
}

/// Stable ID for a new game, derived from its key.
pub fn derive_game_id(game_key: &str) -> GameId {
    GameId::from_uuid(Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("playkit:game:{}", game_key).as_bytes(),
    ))
}

/// The provided ID, or one derived from the entity's kind and order.
pub fn entity_id(game_id: GameId, kind: EntityKind, provided: Option<Uuid>, order: u32) -> Uuid {
    provided.unwrap_or_else(|| derive_entity_id(game_id.to_uuid(), kind.as_str(), order))
}

/// Build the ID map for a parsed game.
pub fn build_trigger_id_map(game: &Game, game_id: GameId) -> TriggerIdMap {
    let mut builder = TriggerIdMap::builder().namespace(game_id.to_uuid());

    for phase in &game.phases {
        let id = entity_id(game_id, EntityKind::Phase, phase.id.map(Uuid::from), phase.order);
        builder = builder.insert(EntityKind::Phase, phase.order, phase.source_id.as_deref(), id);
    }
    for step in &game.steps {
        let id = entity_id(game_id, EntityKind::Step, step.id.map(Uuid::from), step.order);
        builder = builder.insert(EntityKind::Step, step.order, step.source_id.as_deref(), id);
    }
    for role in &game.roles {
        let id = entity_id(game_id, EntityKind::Role, role.id.map(Uuid::from), role.order);
        builder = builder.insert(EntityKind::Role, role.order, role.source_id.as_deref(), id);
    }
    for artifact in &game.artifacts {
        let id = entity_id(
            game_id,
            EntityKind::Artifact,
            artifact.id.map(Uuid::from),
            artifact.order,
        );
        builder = builder.insert(
            EntityKind::Artifact,
            artifact.order,
            artifact.source_id.as_deref(),
            id,
        );
    }

    let map = builder.build();
    tracing::debug!(
        game_key = %game.game_key,
        batch_size = map.import_batch_uuids().len(),
        "Built trigger ID map"
    );
    map
}
