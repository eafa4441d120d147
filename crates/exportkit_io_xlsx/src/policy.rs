//! Conditional field inclusion, resolved once per export call.

use std::collections::BTreeMap;
use std::fmt;

use crate::spec::{EnumFieldCondition, SpecFieldDescriptor, SpecValueDomain, XlsxExportError};
use crate::util::validate_unique_field_names;

/// Mode flags consulted by [`resolve_fields`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecModeFlags {
    /// Advanced mode exports every toggled field.
    pub if_advanced_mode: bool,
    /// Named feature toggles.
    pub toggles: BTreeMap<String, bool>,
}

impl SpecModeFlags {
    /// Flags with the given advanced mode and no toggles.
    pub fn new(if_advanced_mode: bool) -> Self {
        Self {
            if_advanced_mode,
            toggles: BTreeMap::new(),
        }
    }

    /// Add or replace a toggle.
    pub fn with_toggle(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.toggles.insert(name.into(), enabled);
        self
    }

    /// Toggle state, `None` when undefined.
    pub fn toggle(&self, name: &str) -> Option<bool> {
        self.toggles.get(name).copied()
    }

    /// Whether fields gated by `name` are exported under these flags.
    pub fn is_toggle_on(&self, name: &str) -> bool {
        self.if_advanced_mode || self.toggle(name).unwrap_or(false)
    }
}

/// Descriptor list after policy resolution; immutable for the rest of the call.
pub struct SpecFieldSet<T> {
    fields: Vec<SpecFieldDescriptor<T>>,
    l_names_dropped: Vec<String>,
}

impl<T> Clone for SpecFieldSet<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            l_names_dropped: self.l_names_dropped.clone(),
        }
    }
}

impl<T> fmt::Debug for SpecFieldSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecFieldSet")
            .field("fields", &self.fields)
            .field("l_names_dropped", &self.l_names_dropped)
            .finish()
    }
}

impl<T> SpecFieldSet<T> {
    /// Resolved descriptors in original order.
    pub fn fields(&self) -> &[SpecFieldDescriptor<T>] {
        &self.fields
    }

    /// Header texts in column order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    /// Names excluded by the policy.
    pub fn dropped(&self) -> &[String] {
        &self.l_names_dropped
    }

    /// Position of a field by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Number of resolved fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether every field was excluded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Filter `descriptors` under `flags`.
///
/// Configuration is validated over the full list before filtering, so an
/// excluded field still fails the call when misconfigured:
/// - a name used twice with different domains is [`XlsxExportError::ConflictingDomain`],
/// - any other repeated name is [`XlsxExportError::DuplicateField`],
/// - a toggle missing from `flags` is [`XlsxExportError::UnknownToggle`].
pub fn resolve_fields<T>(
    descriptors: Vec<SpecFieldDescriptor<T>>,
    flags: &SpecModeFlags,
) -> Result<SpecFieldSet<T>, XlsxExportError> {
    validate_descriptors(&descriptors, flags)?;

    let mut fields = Vec::with_capacity(descriptors.len());
    let mut l_names_dropped = Vec::new();
    for field in descriptors {
        if is_field_included(&field.condition, flags) {
            fields.push(field);
        } else {
            l_names_dropped.push(field.name);
        }
    }

    tracing::debug!(
        n_kept = fields.len(),
        n_dropped = l_names_dropped.len(),
        if_advanced_mode = flags.if_advanced_mode,
        "Resolved field set"
    );

    Ok(SpecFieldSet {
        fields,
        l_names_dropped,
    })
}

fn is_field_included(condition: &EnumFieldCondition, flags: &SpecModeFlags) -> bool {
    match condition {
        EnumFieldCondition::Always => true,
        EnumFieldCondition::AdvancedOnly => flags.if_advanced_mode,
        EnumFieldCondition::Toggle(name) => flags.is_toggle_on(name),
    }
}

fn validate_descriptors<T>(
    descriptors: &[SpecFieldDescriptor<T>],
    flags: &SpecModeFlags,
) -> Result<(), XlsxExportError> {
    let mut dict_domain_by_name: BTreeMap<&str, Option<&SpecValueDomain>> = BTreeMap::new();
    for field in descriptors {
        let domain = field.effective_domain();
        if let Some(domain_seen) = dict_domain_by_name.insert(field.name.as_str(), domain)
            && domain_seen != domain
        {
            return Err(XlsxExportError::ConflictingDomain {
                field: field.name.clone(),
            });
        }

        if let EnumFieldCondition::Toggle(toggle) = &field.condition
            && flags.toggle(toggle).is_none()
        {
            return Err(XlsxExportError::UnknownToggle {
                field: field.name.clone(),
                toggle: toggle.clone(),
            });
        }
    }

    let l_names: Vec<&str> = descriptors.iter().map(|field| field.name.as_str()).collect();
    validate_unique_field_names(&l_names).map_err(XlsxExportError::DuplicateField)
}
