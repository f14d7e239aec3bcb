use crate::error::DecorError;
use crate::models::image::SourceImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    ModernMinimalist,
    BohemianChic,
    IndustrialLoft,
    MidCenturyModern,
    Scandinavian,
    Cyberpunk,
    LuxuryArtDeco,
}

impl Style {
    pub const ALL: [Style; 7] = [
        Style::ModernMinimalist,
        Style::BohemianChic,
        Style::IndustrialLoft,
        Style::MidCenturyModern,
        Style::Scandinavian,
        Style::Cyberpunk,
        Style::LuxuryArtDeco,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Style::ModernMinimalist => "Modern Minimalist",
            Style::BohemianChic => "Bohemian Chic",
            Style::IndustrialLoft => "Industrial Loft",
            Style::MidCenturyModern => "Mid-Century Modern",
            Style::Scandinavian => "Scandinavian",
            Style::Cyberpunk => "Cyberpunk",
            Style::LuxuryArtDeco => "Luxury Art Deco",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Style::ModernMinimalist => "modern-minimalist",
            Style::BohemianChic => "bohemian-chic",
            Style::IndustrialLoft => "industrial-loft",
            Style::MidCenturyModern => "mid-century-modern",
            Style::Scandinavian => "scandinavian",
            Style::Cyberpunk => "cyberpunk",
            Style::LuxuryArtDeco => "luxury-art-deco",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Style {
    type Err = DecorError;

    /// Accepts either the display name ("Mid-Century Modern") or the slug
    /// ("mid-century-modern"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        Style::ALL
            .iter()
            .copied()
            .find(|style| style.slug() == normalized)
            .ok_or_else(|| {
                DecorError::ValidationError(format!(
                    "Unknown style '{}'. Expected one of: {}",
                    s,
                    Style::ALL
                        .iter()
                        .map(|style| style.display_name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignMode {
    /// Restyle an uploaded room photo.
    #[default]
    Redesign,
    /// Design a room from nothing but the style and notes.
    Scratch,
}

impl fmt::Display for DesignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignMode::Redesign => f.write_str("redesign"),
            DesignMode::Scratch => f.write_str("scratch"),
        }
    }
}

impl FromStr for DesignMode {
    type Err = DecorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redesign" => Ok(DesignMode::Redesign),
            "scratch" | "from-scratch" => Ok(DesignMode::Scratch),
            other => Err(DecorError::ValidationError(format!(
                "Unknown mode '{}'. Expected 'redesign' or 'scratch'",
                other
            ))),
        }
    }
}

/// What the user asked for in one interaction.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub style: Style,
    pub notes: String,
    pub source_image: Option<SourceImage>,
    pub mode: DesignMode,
}

impl GenerationRequest {
    pub fn new(style: Style, notes: impl Into<String>) -> Self {
        Self {
            style,
            notes: notes.into(),
            source_image: None,
            mode: DesignMode::default(),
        }
    }

    pub fn with_source_image(mut self, image: SourceImage) -> Self {
        self.source_image = Some(image);
        self
    }

    pub fn with_mode(mut self, mode: DesignMode) -> Self {
        self.mode = mode;
        self
    }

    /// A redesign needs a photo to redesign; scratch mode needs nothing.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.mode == DesignMode::Redesign && self.source_image.is_none() {
            return Err(DecorError::ValidationError(
                "Redesign mode needs a room photo. Upload one or switch to scratch mode".into(),
            ));
        }
        Ok(())
    }
}
