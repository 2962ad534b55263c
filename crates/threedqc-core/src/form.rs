//! Flat, user-editable representation of a [`SchemaConfig`]
//!
//! Every numeric bound becomes a text field keyed by its dotted JSON path
//! (`fileSizeInKb.maximum`). Every requirement flag becomes a pair of exclusive checkboxes
//! keyed `<path>.yes` and `<path>.no`. `encode` and `decode` are exact inverses.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::schema::SchemaConfig;

/// Key of the free-text version field.
pub const VERSION_FIELD: &str = "version";

macro_rules! schema_fields {
    (
        ints { $($ikey:literal => $($ipath:ident).+;)* }
        flags { $($fkey:literal => $($fpath:ident).+;)* }
    ) => {
        /// Keys of every integer field, in form order.
        pub const INT_FIELDS: &[&str] = &[$($ikey),*];

        /// Keys of every requirement flag (without the `.yes`/`.no` suffix), in form order.
        pub const FLAG_FIELDS: &[&str] = &[$($fkey),*];

        fn int_values(cfg: &SchemaConfig) -> Vec<(&'static str, i64)> {
            vec![$(($ikey, cfg$(.$ipath)+)),*]
        }

        fn flag_values(cfg: &SchemaConfig) -> Vec<(&'static str, bool)> {
            vec![$(($fkey, cfg$(.$fpath)+)),*]
        }

        fn int_slot<'a>(cfg: &'a mut SchemaConfig, key: &str) -> Option<&'a mut i64> {
            match key {
                $($ikey => Some(&mut cfg$(.$ipath)+),)*
                _ => None,
            }
        }

        fn flag_slot<'a>(cfg: &'a mut SchemaConfig, key: &str) -> Option<&'a mut bool> {
            match key {
                $($fkey => Some(&mut cfg$(.$fpath)+),)*
                _ => None,
            }
        }
    };
}

schema_fields! {
    ints {
        "fileSizeInKb.maximum" => file_size_in_kb.maximum;
        "fileSizeInKb.minimum" => file_size_in_kb.minimum;
        "materials.maximum" => materials.maximum;
        "materials.minimum" => materials.minimum;
        "model.objectCount.nodes.maximum" => model.object_count.nodes.maximum;
        "model.objectCount.nodes.minimum" => model.object_count.nodes.minimum;
        "model.objectCount.meshes.maximum" => model.object_count.meshes.maximum;
        "model.objectCount.meshes.minimum" => model.object_count.meshes.minimum;
        "model.objectCount.primitives.maximum" => model.object_count.primitives.maximum;
        "model.objectCount.primitives.minimum" => model.object_count.primitives.minimum;
        "model.triangles.maximum" => model.triangles.maximum;
        "model.triangles.minimum" => model.triangles.minimum;
        "product.dimensions.height.maximum" => product.dimensions.height.maximum;
        "product.dimensions.height.minimum" => product.dimensions.height.minimum;
        "product.dimensions.height.percentTolerance" => product.dimensions.height.percent_tolerance;
        "product.dimensions.length.maximum" => product.dimensions.length.maximum;
        "product.dimensions.length.minimum" => product.dimensions.length.minimum;
        "product.dimensions.length.percentTolerance" => product.dimensions.length.percent_tolerance;
        "product.dimensions.width.maximum" => product.dimensions.width.maximum;
        "product.dimensions.width.minimum" => product.dimensions.width.minimum;
        "product.dimensions.width.percentTolerance" => product.dimensions.width.percent_tolerance;
        "textures.height.maximum" => textures.height.maximum;
        "textures.height.minimum" => textures.height.minimum;
        "textures.width.maximum" => textures.width.maximum;
        "textures.width.minimum" => textures.width.minimum;
        "textures.pbrColorRange.maximum" => textures.pbr_color_range.maximum;
        "textures.pbrColorRange.minimum" => textures.pbr_color_range.minimum;
        "uvs.gutterWidth.resolution256" => uvs.gutter_width.resolution_256;
        "uvs.gutterWidth.resolution512" => uvs.gutter_width.resolution_512;
        "uvs.gutterWidth.resolution1024" => uvs.gutter_width.resolution_1024;
        "uvs.gutterWidth.resolution2048" => uvs.gutter_width.resolution_2048;
        "uvs.gutterWidth.resolution4096" => uvs.gutter_width.resolution_4096;
        "uvs.pixelsPerMeter.maximum" => uvs.pixels_per_meter.maximum;
        "uvs.pixelsPerMeter.minimum" => uvs.pixels_per_meter.minimum;
    }
    flags {
        "model.requireBeveledEdges" => model.require_beveled_edges;
        "model.requireCleanRootNodeTransform" => model.require_clean_root_node_transform;
        "model.requireManifoldEdges" => model.require_manifold_edges;
        "textures.requireDimensionsBePowersOfTwo" => textures.require_dimensions_be_powers_of_two;
        "textures.requireDimensionsBeQuadratic" => textures.require_dimensions_be_quadratic;
        "uvs.requireNotInverted" => uvs.require_not_inverted;
        "uvs.requireNotOverlapping" => uvs.require_not_overlapping;
        "uvs.requireRangeZeroToOne" => uvs.require_range_zero_to_one;
    }
}

/// Failure to turn a form back into a [`SchemaConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("schema field '{0}' is missing")]
    Missing(String),

    #[error("schema field '{field}' is not an integer: '{value}'")]
    NotAnInteger { field: String, value: String },

    #[error("schema field '{0}' must have exactly one of yes/no selected")]
    AmbiguousChoice(String),
}

impl DecodeError {
    /// The form key the error refers to.
    pub fn field(&self) -> &str {
        match self {
            DecodeError::Missing(field) => field,
            DecodeError::NotAnInteger { field, .. } => field,
            DecodeError::AmbiguousChoice(field) => field,
        }
    }
}

/// Failure to apply an edit to a form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown schema field '{0}'")]
    UnknownField(String),

    #[error("schema field '{field}' expects yes or no, got '{value}'")]
    NotAChoice { field: String, value: String },
}

/// One editable control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text(String),
    Checked(bool),
}

/// Flat form state for the schema editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaForm {
    fields: BTreeMap<String, FormField>,
}

fn choice_key(key: &str, yes: bool) -> String {
    format!("{}.{}", key, if yes { "yes" } else { "no" })
}

fn parse_choice(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "y" | "1" => Some(true),
        "no" | "false" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Write every field of `cfg` into a fresh form.
pub fn encode(cfg: &SchemaConfig) -> SchemaForm {
    let mut form = SchemaForm::default();
    form.fields
        .insert(VERSION_FIELD.to_string(), FormField::Text(cfg.version.clone()));
    for (key, value) in int_values(cfg) {
        form.fields
            .insert(key.to_string(), FormField::Text(value.to_string()));
    }
    for (key, value) in flag_values(cfg) {
        form.fields
            .insert(choice_key(key, true), FormField::Checked(value));
        form.fields
            .insert(choice_key(key, false), FormField::Checked(!value));
    }
    form
}

/// Read every field of `form` back into a config. Nothing is defaulted.
pub fn decode(form: &SchemaForm) -> Result<SchemaConfig, DecodeError> {
    let mut cfg = SchemaConfig::default();

    cfg.version = form
        .text(VERSION_FIELD)
        .ok_or_else(|| DecodeError::Missing(VERSION_FIELD.to_string()))?
        .to_string();

    for &key in INT_FIELDS {
        let raw = form
            .text(key)
            .ok_or_else(|| DecodeError::Missing(key.to_string()))?;
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| DecodeError::NotAnInteger {
                field: key.to_string(),
                value: raw.to_string(),
            })?;
        if let Some(slot) = int_slot(&mut cfg, key) {
            *slot = value;
        }
    }

    for &key in FLAG_FIELDS {
        let yes = form.checked(&choice_key(key, true));
        let no = form.checked(&choice_key(key, false));
        let value = match (yes, no) {
            (Some(true), Some(false)) => true,
            (Some(false), Some(true)) => false,
            (None, None) => return Err(DecodeError::Missing(key.to_string())),
            _ => return Err(DecodeError::AmbiguousChoice(key.to_string())),
        };
        if let Some(slot) = flag_slot(&mut cfg, key) {
            *slot = value;
        }
    }

    Ok(cfg)
}

impl SchemaForm {
    pub fn from_config(cfg: &SchemaConfig) -> Self {
        encode(cfg)
    }

    pub fn to_config(&self) -> Result<SchemaConfig, DecodeError> {
        decode(self)
    }

    /// Current text of a text field.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FormField::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Current state of a checkbox (`<flag>.yes` or `<flag>.no`).
    pub fn checked(&self, key: &str) -> Option<bool> {
        match self.fields.get(key) {
            Some(FormField::Checked(checked)) => Some(*checked),
            _ => None,
        }
    }

    /// Overwrite a text field. The value is stored verbatim; validation happens on decode.
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> Result<(), FormError> {
        if key != VERSION_FIELD && !INT_FIELDS.contains(&key) {
            return Err(FormError::UnknownField(key.to_string()));
        }
        self.fields
            .insert(key.to_string(), FormField::Text(value.into()));
        Ok(())
    }

    /// Select yes or no for a requirement flag, keeping the pair complementary.
    pub fn choose(&mut self, key: &str, yes: bool) -> Result<(), FormError> {
        if !FLAG_FIELDS.contains(&key) {
            return Err(FormError::UnknownField(key.to_string()));
        }
        self.fields
            .insert(choice_key(key, true), FormField::Checked(yes));
        self.fields
            .insert(choice_key(key, false), FormField::Checked(!yes));
        Ok(())
    }

    /// Apply a `key=value` style edit to whichever kind of field `key` names.
    pub fn assign(&mut self, key: &str, value: &str) -> Result<(), FormError> {
        if FLAG_FIELDS.contains(&key) {
            let yes = parse_choice(value).ok_or_else(|| FormError::NotAChoice {
                field: key.to_string(),
                value: value.to_string(),
            })?;
            self.choose(key, yes)
        } else {
            self.set_text(key, value)
        }
    }

    /// Iterate over every control in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
