//! Built-in catalog of popular destinations.

use serde::Serialize;

/// A suggested destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Destination {
    /// Display name, also used as the trip's destination.
    pub name: &'static str,
    /// Country the destination is in.
    pub country: &'static str,
    /// One-line pitch.
    pub description: &'static str,
    /// Symbol name of the destination's icon.
    pub icon: &'static str,
    /// Popularity, as a percentage.
    pub popularity: u8,
    /// Identifier in the external travel catalog.
    pub location_id: &'static str,
    /// Cover image shown for trips to this destination.
    pub image_url: &'static str,
}

/// Cover image for destinations not in the catalog.
pub const DEFAULT_IMAGE_URL: &str = "https://images.unsplash.com/photo-1484589065579-248aad0d8b13?q=80&w=3459&auto=format&fit=crop";

/// The popular destinations, most popular first.
pub const POPULAR: [Destination; 5] = [
    Destination {
        name: "Paris",
        country: "France",
        description: "The City of Light featuring the Eiffel Tower and world-class cuisine",
        icon: "building.columns.fill",
        popularity: 98,
        location_id: "187147",
        image_url: "https://plus.unsplash.com/premium_photo-1661919210043-fd847a58522d?q=80&w=3020&auto=format&fit=crop",
    },
    Destination {
        name: "Bali",
        country: "Indonesia",
        description: "Tropical paradise with beautiful beaches and rich culture",
        icon: "leaf.fill",
        popularity: 95,
        location_id: "294226",
        image_url: "https://images.unsplash.com/photo-1554481923-a6918bd997bc?q=80&w=3465&auto=format&fit=crop",
    },
    Destination {
        name: "Tokyo",
        country: "Japan",
        description: "Modern metropolis blending traditional culture with cutting-edge technology",
        icon: "building.2.fill",
        popularity: 94,
        location_id: "298184",
        image_url: "https://images.unsplash.com/photo-1551641506-ee5bf4cb45f1?q=80&w=3568&auto=format&fit=crop",
    },
    Destination {
        name: "Santorini",
        country: "Greece",
        description: "Stunning white-washed buildings overlooking the Aegean Sea",
        icon: "sun.max.fill",
        popularity: 92,
        location_id: "189433",
        image_url: "https://images.unsplash.com/photo-1731684019094-673232b34cf6?q=80&w=3474&auto=format&fit=crop",
    },
    Destination {
        name: "New York City",
        country: "USA",
        description: "The Big Apple - world's most iconic cityscape and cultural hub",
        icon: "building.fill",
        popularity: 91,
        location_id: "60763",
        image_url: "https://images.unsplash.com/photo-1539630179772-93574399faf7?q=80&w=3542&auto=format&fit=crop",
    },
];

/// Finds a catalog destination by name, ignoring case.
#[must_use]
pub fn find(name: &str) -> Option<&'static Destination> {
    let name = name.trim();
    POPULAR
        .iter()
        .find(|destination| destination.name.eq_ignore_ascii_case(name))
}

/// The cover image for a destination name.
///
/// Exact catalog names get their own image; anything else gets a generic
/// travel image.
#[must_use]
pub fn cover_image_url(name: &str) -> &'static str {
    POPULAR
        .iter()
        .find(|destination| destination.name == name)
        .map_or(DEFAULT_IMAGE_URL, |destination| destination.image_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_ordered_by_popularity() {
        assert!(POPULAR.windows(2).all(|w| w[0].popularity >= w[1].popularity));
    }

    #[test]
    fn find_ignores_case() {
        assert_eq!(find("new york city").map(|d| d.country), Some("USA"));
        assert!(find("Atlantis").is_none());
    }

    #[test]
    fn unknown_destinations_get_default_image() {
        assert_eq!(cover_image_url("Reykjavik"), DEFAULT_IMAGE_URL);
        assert_ne!(cover_image_url("Tokyo"), DEFAULT_IMAGE_URL);
    }
}
