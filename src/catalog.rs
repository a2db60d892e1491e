use std::fmt;

/// A target size offered for export, e.g. 1920×1080 "Full HD".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResolutionSpec {
    pub width: u32,
    pub height: u32,
    pub label: &'static str,
}

impl ResolutionSpec {
    pub const fn new(width: u32, height: u32, label: &'static str) -> Self {
        Self {
            width,
            height,
            label,
        }
    }

    /// Key under which this resolution is tracked in the selection store.
    pub fn key(&self) -> ResolutionKey {
        ResolutionKey::new(self.width, self.height)
    }
}

/// `"{width}x{height}"`, the identity of a resolution inside a selection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolutionKey(String);

impl ResolutionKey {
    pub fn new(width: u32, height: u32) -> Self {
        Self(format!("{width}x{height}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// General purpose sizes: (width, height, label)
pub const STANDARD_RESOLUTIONS: &[ResolutionSpec] = &[
    ResolutionSpec::new(200, 200, "Thumbnail"),
    ResolutionSpec::new(800, 600, "Small"),
    ResolutionSpec::new(1200, 900, "Medium"),
    ResolutionSpec::new(1920, 1080, "Full HD"),
    ResolutionSpec::new(3840, 2160, "4K"),
];

// IAB display ad sizes
pub const BANNER_RESOLUTIONS: &[ResolutionSpec] = &[
    ResolutionSpec::new(728, 90, "Leaderboard"),
    ResolutionSpec::new(468, 60, "Full Banner"),
    ResolutionSpec::new(320, 50, "Mobile Banner"),
    ResolutionSpec::new(300, 250, "Medium Rectangle"),
    ResolutionSpec::new(336, 280, "Large Rectangle"),
    ResolutionSpec::new(300, 600, "Half Page"),
    ResolutionSpec::new(160, 600, "Wide Skyscraper"),
    ResolutionSpec::new(970, 250, "Billboard"),
];

/// Which catalog a deployment offers. Persisted with the app settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum CatalogKind {
    #[default]
    Standard,
    Banner,
}

impl CatalogKind {
    pub const ALL: [Self; 2] = [Self::Standard, Self::Banner];

    pub fn resolutions(self) -> &'static [ResolutionSpec] {
        match self {
            Self::Standard => STANDARD_RESOLUTIONS,
            Self::Banner => BANNER_RESOLUTIONS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "Standard (5 sizes)",
            Self::Banner => "Banners (8 sizes)",
        }
    }
}
