//! Hit sequences and ability data arriving as JSON.
#![cfg(feature = "serde")]

use combat_core::{
    AbilityDefinition, AbilityEffect, EffectDuration, EntityRegistry, HitPipeline, PeakHit,
    StatusEffectKind,
};

#[test]
fn generated_hit_sequence_settles_in_order_field_order() {
    let mut registry = EntityRegistry::new();
    let target = registry.spawn(100);
    assert_eq!(target.0, 0);

    let hits: Vec<PeakHit> = serde_json::from_str(
        r#"[
            { "target": 0, "attacker": null, "damage": 40.0, "order": 2 },
            { "target": 0, "attacker": null, "damage": 70.0, "order": 1 },
            { "target": null, "attacker": null, "damage": 5.0, "order": 0 }
        ]"#,
    )
    .unwrap();

    let summary = HitPipeline::new().resolve(&mut registry, &hits);

    assert_eq!(summary.hits, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.deaths, 1);
    assert!(registry.is_dead(target));
}

#[test]
fn ability_definition_loads_from_data() {
    let ability: AbilityDefinition = serde_json::from_str(
        r#"{
            "name": "iron skin",
            "trigger": "TurnStart",
            "target": "Caster",
            "effect": { "AddStatusEffect": {
                "name": "iron skin",
                "kind": "DamageTakenReduction",
                "value": 0.7,
                "duration": "Permanent"
            } }
        }"#,
    )
    .unwrap();

    let AbilityEffect::AddStatusEffect(effect) = &ability.effect else {
        panic!("expected a status effect, got {:?}", ability.effect);
    };
    assert_eq!(effect.kind, StatusEffectKind::DamageTakenReduction);
    assert_eq!(effect.duration, EffectDuration::Permanent);
    assert!(effect.duration.is_permanent());
}
