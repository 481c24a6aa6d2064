use crate::linker::entity::LinkedEntity;
use crate::policy::LinkStatus;
use crate::text::normalize;
use ordermap::OrderMap;

fn dedup_key(entity: &LinkedEntity) -> String {
    match entity.status {
        LinkStatus::Resolved => format!(
            "{}\u{0}ID::{}",
            entity.label,
            entity.linked_id.as_deref().unwrap_or("")
        ),
        _ => format!(
            "{}\u{0}SF::{}",
            entity.label,
            normalize(&entity.surface_form)
        ),
    }
}

/// Merges entities that collide on the dedup key (resolved entities collide
/// by `(label, linked_id)`, everything else by `(label, normalized surface
/// form)`), keeping the higher-ranked status and the union of provenance
/// spans in first-seen order.
pub fn dedup_entities(entities: Vec<LinkedEntity>) -> Vec<LinkedEntity> {
    let mut merged: OrderMap<String, LinkedEntity> = OrderMap::new();

    for entity in entities {
        let key = dedup_key(&entity);
        match merged.get_mut(&key) {
            None => {
                merged.insert(key, entity);
            }
            Some(existing) => {
                for offset in &entity.provenances {
                    if !existing.provenances.contains(offset) {
                        existing.provenances.push(offset.clone());
                    }
                }
                if entity.status.rank() > existing.status.rank() {
                    let provenances = std::mem::take(&mut existing.provenances);
                    let mut winner = entity;
                    for offset in provenances {
                        if !winner.provenances.contains(&offset) {
                            winner.provenances.push(offset);
                        }
                    }
                    *existing = winner;
                }
            }
        }
    }

    merged.into_values().collect()
}
