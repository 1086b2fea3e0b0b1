//! Bounded query templates.
//!
//! Templates are Overpass QL with a `{{bbox}}` placeholder, the same
//! convention overpass-turbo uses. Substitution writes the bounds as
//! `south,west,north,east`.

use thiserror::Error;

use crate::facility::Layer;
use crate::geo::BoundingBox;

/// Placeholder replaced with the viewport bounds.
pub const BBOX_PLACEHOLDER: &str = "{{bbox}}";

const DRINKING_WATER_QUERY: &str = r#"[out:json][timeout:25];
(
  node["amenity"="drinking_water"]({{bbox}});
  node["amenity"="water_point"]["drinking_water"!="no"]({{bbox}});
  node["man_made"="water_tap"]["drinking_water"="yes"]({{bbox}});
);
out body;"#;

const TOILETS_QUERY: &str = r#"[out:json][timeout:25];
(
  node["amenity"="toilets"]({{bbox}});
  way["amenity"="toilets"]({{bbox}});
);
out center;"#;

/// Query template errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("query template for layer '{0}' has no {{{{bbox}}}} placeholder")]
    MissingPlaceholder(Layer),
}

/// A geodata query for one layer, parameterised by bounding box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    layer: Layer,
    text: String,
}

impl QueryTemplate {
    /// Create a template; it must contain [`BBOX_PLACEHOLDER`].
    pub fn new(layer: Layer, text: impl Into<String>) -> Result<Self, QueryError> {
        let text = text.into();
        if !text.contains(BBOX_PLACEHOLDER) {
            return Err(QueryError::MissingPlaceholder(layer));
        }
        Ok(Self { layer, text })
    }

    /// Built-in template for a layer.
    pub fn for_layer(layer: Layer) -> Self {
        let text = match layer {
            Layer::Water => DRINKING_WATER_QUERY,
            Layer::Toilets => TOILETS_QUERY,
        };
        Self {
            layer,
            text: text.to_string(),
        }
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute every placeholder with `south,west,north,east`.
    pub fn render(&self, bounds: &BoundingBox) -> String {
        self.text
            .replace(BBOX_PLACEHOLDER, &bounds.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_have_placeholder() {
        for layer in Layer::ALL {
            let template = QueryTemplate::for_layer(layer);
            assert_eq!(template.layer(), layer);
            assert!(template.text().contains(BBOX_PLACEHOLDER));
            assert!(template.text().contains("[out:json]"));
        }
    }

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let bounds = BoundingBox::new(56.9, 24.0, 57.0, 24.2).unwrap();
        let rendered = QueryTemplate::for_layer(Layer::Toilets).render(&bounds);

        assert!(!rendered.contains(BBOX_PLACEHOLDER));
        assert_eq!(rendered.matches("(56.9,24,57,24.2)").count(), 2);
    }

    #[test]
    fn test_custom_template_requires_placeholder() {
        let result = QueryTemplate::new(Layer::Water, "node[amenity=fountain];out;");
        assert_eq!(result, Err(QueryError::MissingPlaceholder(Layer::Water)));

        let ok = QueryTemplate::new(Layer::Water, "node[amenity=fountain]({{bbox}});out;");
        assert!(ok.is_ok());
    }

    #[test]
    fn test_missing_placeholder_message() {
        let err = QueryError::MissingPlaceholder(Layer::Toilets);
        assert_eq!(
            err.to_string(),
            "query template for layer 'toilets' has no {{bbox}} placeholder"
        );
    }
}
