//! Per-layer synchronization state.

use super::events::FacilitySet;
use crate::facility::Layer;
use crate::fetch::QueryTemplate;
use crate::geo::BoundingBox;

/// State the coordinator keeps for one facility layer.
#[derive(Debug, Clone)]
pub struct LayerState {
    template: QueryTemplate,
    enabled: bool,
    displayed: Option<FacilitySet>,
    /// Bounds of the most recently issued fetch, successful or not.
    last_fetched_bounds: Option<BoundingBox>,
    /// Number of the most recently issued fetch.
    generation: u64,
}

impl LayerState {
    pub fn new(template: QueryTemplate, enabled: bool) -> Self {
        Self {
            template,
            enabled,
            displayed: None,
            last_fetched_bounds: None,
            generation: 0,
        }
    }

    pub fn layer(&self) -> Layer {
        self.template.layer()
    }

    pub fn template(&self) -> &QueryTemplate {
        &self.template
    }

    pub fn set_template(&mut self, template: QueryTemplate) {
        self.template = template;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn displayed(&self) -> Option<&FacilitySet> {
        self.displayed.as_ref()
    }

    pub fn last_fetched_bounds(&self) -> Option<&BoundingBox> {
        self.last_fetched_bounds.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record a new fetch for `bounds` and return its generation.
    pub(crate) fn issue(&mut self, bounds: BoundingBox) -> u64 {
        self.last_fetched_bounds = Some(bounds);
        self.generation += 1;
        self.generation
    }

    /// Whether a result for `generation` may still be applied.
    pub(crate) fn accepts(&self, generation: u64) -> bool {
        self.enabled && generation == self.generation
    }

    pub(crate) fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disable the layer and drop its displayed set.
    ///
    /// Last fetched bounds are kept so re-enabling still respects them.
    pub(crate) fn disable(&mut self) {
        self.enabled = false;
        self.displayed = None;
    }

    pub(crate) fn display(&mut self, set: FacilitySet) {
        self.displayed = Some(set);
    }

    pub(crate) fn clear(&mut self) {
        self.displayed = None;
    }
}
