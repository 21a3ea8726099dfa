//! Resolved config: the catalog, compiled hooks and per-entity options ready for [`ApiBuilder`](crate::api::ApiBuilder).

use crate::config::{validate, FullConfig, HookConfig, MatchConfig};
use crate::entity::EntityOptions;
use crate::error::ConfigError;
use crate::hooks::{Hook, HookMatch};
use crate::schema::{Catalog, ModelSchema};
use regex::Regex;

#[derive(Debug)]
pub struct ResolvedConfig {
    pub catalog: Catalog,
    /// Model name and options, in declaration order.
    pub entities: Vec<(String, EntityOptions)>,
    pub hooks: Vec<Hook>,
}

/// Validate and build the resolved config.
pub fn resolve(config: &FullConfig) -> Result<ResolvedConfig, ConfigError> {
    validate(config)?;

    let catalog: Catalog = config
        .models
        .iter()
        .map(|m| ModelSchema {
            name: m.name.clone(),
            table_name: m.table_name.clone().unwrap_or_else(|| m.name.clone()),
            schema: m.schema.clone(),
            primary_key: m.primary_key.clone(),
            columns: m.columns.clone(),
            associations: m.associations.clone(),
        })
        .collect();

    let entities = match &config.entities {
        Some(entities) => entities
            .iter()
            .map(|e| {
                let options = EntityOptions {
                    name: e.name.clone(),
                    hooks: compile_hooks(&e.hooks)?,
                    actions: e.actions.clone(),
                };
                Ok((e.model.clone(), options))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?,
        None => config
            .models
            .iter()
            .map(|m| (m.name.clone(), EntityOptions::default()))
            .collect(),
    };

    Ok(ResolvedConfig {
        catalog,
        entities,
        hooks: compile_hooks(&config.hooks)?,
    })
}

fn compile_hooks(hooks: &[HookConfig]) -> Result<Vec<Hook>, ConfigError> {
    hooks.iter().map(compile_hook).collect()
}

fn compile_hook(config: &HookConfig) -> Result<Hook, ConfigError> {
    let matcher = match &config.match_ {
        None => HookMatch::Any,
        Some(MatchConfig::Exact(name)) => HookMatch::Exact(name.clone()),
        Some(MatchConfig::Pattern { pattern }) => {
            HookMatch::Pattern(Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?)
        }
        Some(MatchConfig::Other(value)) => {
            tracing::warn!(trigger = %config.trigger, value = %value, "hook match has an unsupported shape and will never match");
            HookMatch::Unmatchable
        }
    };
    let mut hook = Hook::new(config.trigger).with_matcher(matcher);
    hook.set_prevent(config.prevent);
    Ok(hook)
}
