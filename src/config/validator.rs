//! Config validation: referential integrity between models, associations and entities.

use crate::config::FullConfig;
use crate::entity::EntityName;
use crate::error::ConfigError;
use crate::schema::AssociationKind;
use std::collections::{HashMap, HashSet};

pub fn validate(config: &FullConfig) -> Result<(), ConfigError> {
    let mut models = HashMap::new();
    for m in &config.models {
        if models.insert(m.name.as_str(), m).is_some() {
            return Err(ConfigError::Duplicate {
                kind: "model",
                name: m.name.clone(),
            });
        }
    }

    for m in &config.models {
        if !m.columns.iter().any(|c| c.name == m.primary_key) {
            return Err(ConfigError::InvalidPrimaryKey {
                model: m.name.clone(),
                column: m.primary_key.clone(),
            });
        }
    }

    for m in &config.models {
        for a in &m.associations {
            let target = *models.get(a.target.as_str()).ok_or_else(|| ConfigError::MissingReference {
                kind: "association target",
                id: format!("{}.{} -> {}", m.name, a.name, a.target),
            })?;
            let owner = match a.kind {
                AssociationKind::BelongsTo => m,
                AssociationKind::HasOne | AssociationKind::HasMany => target,
            };
            if !owner.columns.iter().any(|c| c.name == a.foreign_key) {
                return Err(ConfigError::MissingReference {
                    kind: "foreign key",
                    id: format!("{}.{}", owner.name, a.foreign_key),
                });
            }
        }
    }

    if let Some(entities) = &config.entities {
        let mut plurals = HashSet::new();
        for e in entities {
            let model = models.get(e.model.as_str()).ok_or_else(|| ConfigError::MissingReference {
                kind: "model",
                id: e.model.clone(),
            })?;
            let name = e.name.clone().unwrap_or_else(|| {
                EntityName::from_table(model.table_name.as_deref().unwrap_or(&model.name))
            });
            if !plurals.insert(name.plural.clone()) {
                return Err(ConfigError::Duplicate {
                    kind: "entity",
                    name: name.plural,
                });
            }
        }
    }
    Ok(())
}
