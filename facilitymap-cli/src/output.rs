//! Terminal rendering of session events.

use console::style;

use facilitymap::facility::{AnnotatedFacility, FacilityDetails, Wheelchair};
use facilitymap::sync::{FacilitySet, LocationOrigin, ReferenceSource, RenderEvent};

/// Prints render events as plain terminal lines.
#[derive(Debug, Clone, Copy)]
pub struct EventPrinter {
    /// Maximum facilities listed per set, nearest first.
    limit: usize,
}

impl EventPrinter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn print(&self, event: &RenderEvent) {
        for line in self.render(event) {
            println!("{}", line);
        }
    }

    /// Lines describing `event`.
    pub fn render(&self, event: &RenderEvent) -> Vec<String> {
        match event {
            RenderEvent::LocationResolved {
                origin: LocationOrigin::User,
                reference,
            } => {
                let at = reference.map(|p| p.to_string()).unwrap_or_default();
                vec![format!("{} You are at {}", style("●").green(), at)]
            }
            RenderEvent::LocationResolved {
                origin: LocationOrigin::Fallback,
                ..
            } => vec![format!(
                "{} Location unavailable, showing the default area",
                style("●").yellow()
            )],
            RenderEvent::LocationFailed { error } => {
                vec![format!("{} Could not locate you: {}", style("!").yellow(), error)]
            }
            RenderEvent::Facilities(set) => self.render_set(set),
            RenderEvent::Empty { layer, bounds } => vec![format!(
                "{} No {} facilities in {}",
                style("○").dim(),
                layer,
                bounds
            )],
            RenderEvent::FetchFailed { layer, error } => vec![format!(
                "{} {} update failed: {} ({})",
                style("!").red(),
                layer,
                error.user_message(),
                error
            )],
            RenderEvent::Cleared { layer } => {
                vec![format!("{} {} hidden", style("○").dim(), layer)]
            }
        }
    }

    fn render_set(&self, set: &FacilitySet) -> Vec<String> {
        let from = match set.reference_source {
            ReferenceSource::User => "you".to_string(),
            ReferenceSource::ViewportCenter => format!("map center {}", set.reference),
        };

        let mut lines = vec![format!(
            "{} {} {} facilities, distances from {}",
            style("■").cyan(),
            style(set.len()).bold(),
            style(set.layer).bold(),
            from
        )];

        let mut ordered: Vec<&AnnotatedFacility> = set.facilities.iter().collect();
        ordered.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

        for facility in ordered.iter().take(self.limit) {
            lines.push(facility_line(facility));
        }
        if set.len() > self.limit {
            lines.push(format!("    … {} more", set.len() - self.limit));
        }

        lines
    }
}

fn facility_line(facility: &AnnotatedFacility) -> String {
    let marker = if facility.is_nearest {
        style("★").yellow().to_string()
    } else {
        " ".to_string()
    };

    let mut line = format!(
        "  {} {:>8}  {}",
        marker,
        format_distance(facility.distance_m),
        facility.item.id
    );
    if let Some(name) = facility.item.name() {
        line.push_str("  ");
        line.push_str(name);
    }

    let notes = detail_notes(&facility.item.details);
    if !notes.is_empty() {
        line.push_str(&format!("  ({})", notes.join(", ")));
    }

    line
}

fn detail_notes(details: &FacilityDetails) -> Vec<String> {
    let mut notes = Vec::new();

    match details.fee() {
        Some(true) => notes.push("fee".to_string()),
        Some(false) => notes.push("free".to_string()),
        None => {}
    }

    match details {
        FacilityDetails::DrinkingWater {
            bottle_refill,
            seasonal,
            ..
        } => {
            if *bottle_refill == Some(true) {
                notes.push("bottle refill".to_string());
            }
            if *seasonal == Some(true) {
                notes.push("seasonal".to_string());
            }
        }
        FacilityDetails::Toilets {
            wheelchair,
            opening_hours,
            changing_table,
            ..
        } => {
            match wheelchair {
                Some(Wheelchair::Yes) => notes.push("wheelchair".to_string()),
                Some(Wheelchair::Limited) => notes.push("limited wheelchair access".to_string()),
                Some(Wheelchair::No) | None => {}
            }
            if *changing_table == Some(true) {
                notes.push("changing table".to_string());
            }
            if let Some(hours) = opening_hours {
                notes.push(hours.clone());
            }
        }
    }

    notes
}

/// Human-readable distance: meters below 1 km, otherwise kilometers.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}
