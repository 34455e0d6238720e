//! Rendering policy.

use crate::value::ValueSource;

/// Controls which attributes are rendered and how.
///
/// Built once per invocation and never changed during a render pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderOptions {
    /// Render optional attributes and optional nested blocks.
    pub include_optional: bool,
    /// Give non-required attributes a zero value instead of an unset marker.
    pub include_defaults: bool,
    /// Attach schema descriptions as comments.
    pub include_descriptions: bool,
    /// Values of an existing resource to pre-fill from.
    pub import_source: Option<ValueSource>,
}

impl RenderOptions {
    /// Options for a blank scaffold: required attributes only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include optional attributes.
    pub fn with_optional(mut self, include: bool) -> Self {
        self.include_optional = include;
        self
    }

    /// Use zero values for non-required attributes.
    pub fn with_defaults(mut self, include: bool) -> Self {
        self.include_defaults = include;
        self
    }

    /// Attach descriptions.
    pub fn with_descriptions(mut self, include: bool) -> Self {
        self.include_descriptions = include;
        self
    }

    /// Pre-fill from an existing resource's values.
    pub fn with_import_source(mut self, source: ValueSource) -> Self {
        self.import_source = Some(source);
        self
    }
}
