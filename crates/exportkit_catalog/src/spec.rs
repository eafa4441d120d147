//! Export settings and errors.

use std::collections::BTreeMap;

use exportkit_io_xlsx::{SpecModeFlags, XlsxExportError};
use exportkit_io_xml::XmlExportError;
use serde::Deserialize;

use crate::conf::{C_TOGGLE_PRODUCT_ATTRIBUTES, C_VERSION_DEFAULT, TUP_PRODUCT_EDITOR_TOGGLES};

////////////////////////////////////////////////////////////////////////////////
// #region Settings

/// Host-provided export settings.
///
/// Every key is optional when deserialized; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecExportSettings {
    /// Export every toggled product field regardless of `product_editor`.
    pub if_product_advanced_mode: bool,
    /// Product editor toggles by name; unknown names are ignored.
    pub product_editor: BTreeMap<String, bool>,
    /// Back lookup fields with dropdown lists.
    pub if_use_dropdown_lists: bool,
    /// Add attribute detail blocks under product rows.
    pub if_export_product_attributes: bool,
    /// Version marker written on markup document roots.
    pub version: String,
}

impl Default for SpecExportSettings {
    fn default() -> Self {
        Self {
            if_product_advanced_mode: false,
            product_editor: BTreeMap::new(),
            if_use_dropdown_lists: true,
            if_export_product_attributes: true,
            version: C_VERSION_DEFAULT.to_string(),
        }
    }
}

impl SpecExportSettings {
    /// Field policy flags; toggles the settings leave unset are off.
    pub fn mode_flags(&self) -> SpecModeFlags {
        let mut flags = SpecModeFlags::new(self.if_product_advanced_mode);
        for c_toggle in TUP_PRODUCT_EDITOR_TOGGLES {
            let if_enabled = self.product_editor.get(c_toggle).copied().unwrap_or(false);
            flags = flags.with_toggle(c_toggle, if_enabled);
        }
        flags
    }

    /// Whether product sheets carry attribute detail blocks.
    pub fn is_product_attributes_exported(&self) -> bool {
        self.if_export_product_attributes
            && (self.if_product_advanced_mode
                || self
                    .product_editor
                    .get(C_TOGGLE_PRODUCT_ATTRIBUTES)
                    .copied()
                    .unwrap_or(false))
    }

    /// Root marker, falling back to the built-in version.
    pub fn version_or_default(&self) -> &str {
        if self.version.trim().is_empty() {
            C_VERSION_DEFAULT
        } else {
            &self.version
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures reported by catalog exports.
#[derive(Debug, thiserror::Error)]
pub enum CatalogExportError {
    /// Tabular pipeline failure.
    #[error(transparent)]
    Xlsx(#[from] XlsxExportError),
    /// Markup pipeline failure.
    #[error(transparent)]
    Xml(#[from] XmlExportError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::C_TOGGLE_SEO;

    #[test]
    fn test_unset_toggles_are_off() {
        let settings = SpecExportSettings {
            product_editor: BTreeMap::from([(C_TOGGLE_SEO.to_string(), true)]),
            ..Default::default()
        };
        let flags = settings.mode_flags();
        assert_eq!(flags.toggle(C_TOGGLE_SEO), Some(true));
        assert_eq!(flags.toggle(C_TOGGLE_PRODUCT_ATTRIBUTES), Some(false));
        assert!(!flags.if_advanced_mode);
    }

    #[test]
    fn test_attributes_need_toggle_or_advanced_mode() {
        let mut settings = SpecExportSettings::default();
        assert!(!settings.is_product_attributes_exported());

        settings.if_product_advanced_mode = true;
        assert!(settings.is_product_attributes_exported());

        settings.if_export_product_attributes = false;
        assert!(!settings.is_product_attributes_exported());
    }

    #[test]
    fn test_blank_version_falls_back() {
        let settings = SpecExportSettings {
            version: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.version_or_default(), C_VERSION_DEFAULT);
    }
}
