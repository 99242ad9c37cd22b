//! Builds the resolved upsert payload for one parsed game.
//!
//! Runs metadata validation, builds the ID map, resolves step and variant
//! references and rewrites triggers. A payload is produced only when no
//! stage reported an error.

use playkit_domain::{
    ArtifactId, ArtifactVariantId, EntityKind, EntityRef, Game, GameId, ImportRunId, PhaseId,
    RoleId, StepId, Visibility,
};
use uuid::Uuid;

use crate::infrastructure::ports::{
    ArtifactRow, ArtifactVariantRow, GameRow, GameUpsertPayload, PhaseRow, RoleRow, StepRow,
};

use super::id_map::{build_trigger_id_map, entity_id};
use super::metadata::validate_artifact_metadata;
use super::refs::resolve_ref;
use super::trigger_refs::rewrite_all_trigger_refs;
use super::types::{ImportIssue, IssueLog};

/// Payload plus every issue found while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadBuild {
    pub payload: Option<GameUpsertPayload>,
    pub errors: Vec<ImportIssue>,
    pub warnings: Vec<ImportIssue>,
}

pub fn build_upsert_payload(
    game: &Game,
    game_id: GameId,
    is_update: bool,
    import_run_id: ImportRunId,
) -> PayloadBuild {
    let label = game.label();
    let mut issues = IssueLog::default();

    let metadata = validate_artifact_metadata(&game.artifacts, label);
    issues.extend(metadata.issues);

    let id_map = build_trigger_id_map(game, game_id);

    let phases: Vec<PhaseRow> = game
        .phases
        .iter()
        .map(|phase| PhaseRow {
            id: PhaseId::from_uuid(entity_id(
                game_id,
                EntityKind::Phase,
                phase.id.map(Uuid::from),
                phase.order,
            )),
            order: phase.order,
            phase_type: phase.phase_type,
            name: phase.name.clone(),
            description: phase.description.clone(),
            duration_seconds: phase.duration_seconds,
            timer_visible: phase.timer_visible,
            auto_advance: phase.auto_advance,
        })
        .collect();

    let mut steps = Vec::with_capacity(game.steps.len());
    for (index, step) in game.steps.iter().enumerate() {
        let phase_id = step.phase.as_ref().and_then(|reference| {
            let column = ref_column(&format!("steps[{}]", index), reference, "phase_order", "phase_id");
            resolve_into(&id_map, EntityKind::Phase, reference, column, label, &mut issues)
        });
        steps.push(StepRow {
            id: StepId::from_uuid(entity_id(
                game_id,
                EntityKind::Step,
                step.id.map(Uuid::from),
                step.order,
            )),
            phase_id: phase_id.map(PhaseId::from_uuid),
            order: step.order,
            title: step.title.clone(),
            body: step.body.clone(),
            duration_seconds: step.duration_seconds,
            leader_script: step.leader_script.clone(),
        });
    }

    let roles: Vec<RoleRow> = game
        .roles
        .iter()
        .map(|role| RoleRow {
            id: RoleId::from_uuid(entity_id(
                game_id,
                EntityKind::Role,
                role.id.map(Uuid::from),
                role.order,
            )),
            order: role.order,
            name: role.name.clone(),
            public_description: role.public_description.clone(),
            private_instructions: role.private_instructions.clone(),
            min_count: role.min_count,
            max_count: role.max_count,
            assignment_strategy: role.assignment_strategy,
        })
        .collect();

    let mut artifacts = Vec::with_capacity(game.artifacts.len());
    let mut artifact_variants = Vec::with_capacity(game.variant_count());
    for (index, (artifact, valid)) in game.artifacts.iter().zip(metadata.artifacts).enumerate() {
        let artifact_id = ArtifactId::from_uuid(entity_id(
            game_id,
            EntityKind::Artifact,
            artifact.id.map(Uuid::from),
            artifact.order,
        ));

        for (variant_index, variant) in artifact.variants.iter().enumerate() {
            let path = format!("artifacts[{}].variants[{}]", index, variant_index);
            let visible_to_role_id = match (variant.visibility, variant.visible_to_role.as_ref()) {
                (Visibility::RolePrivate, Some(reference)) => {
                    let column =
                        ref_column(&path, reference, "visible_to_role_order", "visible_to_role_id");
                    resolve_into(&id_map, EntityKind::Role, reference, column, label, &mut issues)
                        .map(RoleId::from_uuid)
                }
                (Visibility::RolePrivate, None) => {
                    issues.push(
                        ImportIssue::error(
                            format!("{}.visible_to_role_id", path),
                            "role_private variant requires a visible_to_role reference",
                        )
                        .labelled(label),
                    );
                    None
                }
                (Visibility::Public, Some(reference)) => {
                    issues.push(
                        ImportIssue::error(
                            ref_column(&path, reference, "visible_to_role_order", "visible_to_role_id"),
                            "public variant must not reference a role",
                        )
                        .labelled(label),
                    );
                    None
                }
                (Visibility::Public, None) => None,
            };

            let variant_id = variant.id.unwrap_or_else(|| {
                ArtifactVariantId::from_uuid(id_map.derive_id(
                    "artifact_variant",
                    format!("{}:{}", artifact.order, variant.order),
                ))
            });
            artifact_variants.push(ArtifactVariantRow {
                id: variant_id,
                artifact_id,
                order: variant.order,
                title: variant.title.clone(),
                body: variant.body.clone(),
                visibility: variant.visibility,
                visible_to_role_id,
            });
        }

        if let Some(valid) = valid {
            artifacts.push(ArtifactRow {
                id: artifact_id,
                order: artifact.order,
                artifact_type: valid.artifact_type,
                title: artifact.title.clone(),
                description: artifact.description.clone(),
                tags: artifact.tags.clone(),
                metadata: valid.canonical,
            });
        }
    }

    let rewrite = rewrite_all_trigger_refs(&game.triggers, &id_map, label);
    issues.errors.extend(rewrite.errors);
    issues.warnings.extend(rewrite.warnings);

    let payload = (!issues.has_errors()).then(|| GameUpsertPayload {
        game_id,
        is_update,
        import_run_id,
        game: GameRow {
            game_key: game.game_key.clone(),
            name: game.name.clone(),
            description: game.description.clone(),
            play_mode: game.play_mode,
            status: game.status,
        },
        phases,
        steps,
        roles,
        artifacts,
        artifact_variants,
        triggers: rewrite.triggers,
    });

    PayloadBuild {
        payload,
        errors: issues.errors,
        warnings: issues.warnings,
    }
}

fn ref_column(path: &str, reference: &EntityRef, order_field: &str, id_field: &str) -> String {
    match reference {
        EntityRef::Order(_) => format!("{}.{}", path, order_field),
        EntityRef::Id(_) => format!("{}.{}", path, id_field),
    }
}

fn resolve_into(
    id_map: &super::id_map::TriggerIdMap,
    kind: EntityKind,
    reference: &EntityRef,
    column: String,
    label: &str,
    issues: &mut IssueLog,
) -> Option<Uuid> {
    match resolve_ref(id_map, kind, reference) {
        Ok(resolved) => {
            if let Some(warning) = resolved.warning {
                issues.push(ImportIssue::warning(column, warning).labelled(label));
            }
            Some(resolved.id)
        }
        Err(message) => {
            issues.push(ImportIssue::error(column, message).labelled(label));
            None
        }
    }
}
