use serde::{Deserialize, Serialize};

/// Flat color tint laid over the preview and baked into snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    Transparent,
    Orange,
    Brown,
    Pink,
}

impl Filter {
    pub const ALL: [Filter; 4] = [Filter::Transparent, Filter::Orange, Filter::Brown, Filter::Pink];

    pub fn css_color(&self) -> &'static str {
        match self {
            Filter::Transparent => "transparent",
            Filter::Orange => "rgba(255, 165, 0, 0.4)",
            Filter::Brown => "rgba(165, 42, 42, 0.4)",
            Filter::Pink => "rgba(255, 192, 203, 0.4)",
        }
    }

    /// Color to composite on a snapshot, `None` when there is nothing to draw
    pub fn overlay(&self) -> Option<&'static str> {
        match self {
            Filter::Transparent => None,
            _ => Some(self.css_color()),
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Filter::Transparent => "transparent",
            Filter::Orange => "orange",
            Filter::Brown => "brown",
            Filter::Pink => "pink",
        }
    }

    /// Resolve a swatch from its `class` attribute; unknown swatches clear the tint
    pub fn from_class_list(class_list: &str) -> Self {
        class_list
            .split_whitespace()
            .find_map(|class| Filter::ALL.into_iter().find(|f| f.class_name() == class))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_class_list() {
        assert_eq!(Filter::from_class_list("filter orange active"), Filter::Orange);
        assert_eq!(Filter::from_class_list("filter pink"), Filter::Pink);
        assert_eq!(Filter::from_class_list("filter"), Filter::Transparent);
    }

    #[test]
    fn test_overlay_colors() {
        assert_eq!(Filter::Transparent.overlay(), None);
        assert_eq!(Filter::Brown.overlay(), Some("rgba(165, 42, 42, 0.4)"));
    }
}
