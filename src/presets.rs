//! Built-in scripts for the site's presentation pages.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{Card, ConfigError, PresentationConfig, PresentationDocument, StartMode};
use crate::input::ControlStyle;
use crate::kernel::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    BrandQuestions,
    CeoCmo,
    India,
    Startup,
    Global,
}

#[derive(Debug, Error)]
#[error("unknown preset '{0}' (expected one of: brand-questions, ceo-cmo, india, startup, global)")]
pub struct UnknownPreset(pub String);

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::BrandQuestions,
        Preset::CeoCmo,
        Preset::India,
        Preset::Startup,
        Preset::Global,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::BrandQuestions => "brand-questions",
            Preset::CeoCmo => "ceo-cmo",
            Preset::India => "india",
            Preset::Startup => "startup",
            Preset::Global => "global",
        }
    }

    pub fn document(&self) -> Result<PresentationDocument, ConfigError> {
        match self {
            Preset::BrandQuestions => brand_questions(),
            Preset::CeoCmo => ceo_cmo(),
            Preset::India => india(),
            Preset::Startup => startup(),
            Preset::Global => global(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

fn manual_page(intro: Option<Card>, outro: Option<Card>) -> PresentationConfig {
    PresentationConfig {
        start_mode: StartMode::Manual,
        intro,
        outro,
        ..PresentationConfig::default()
    }
}

// Autoplaying pages start muted and hand Space to the mute toggle.
fn autoplay_page() -> PresentationConfig {
    PresentationConfig {
        start_mode: StartMode::Autoplay,
        looping: true,
        start_muted: true,
        control_style: ControlStyle::MuteToggle,
        ..PresentationConfig::default()
    }
}

pub fn brand_questions() -> Result<PresentationDocument, ConfigError> {
    let config = manual_page(
        Some(Card::new(
            "Brand Strategy Questions",
            "Click play to begin your brand exploration journey",
        )),
        Some(Card::new(
            "Brand Strategy Complete",
            "Thank you for exploring your brand identity. Click restart to begin again.",
        )),
    );
    PresentationDocument::new(
        config,
        vec![
            Segment::question("What is your Brand promise?", "How is your Brand remembered as?", 3000)
                .with_audio("audio1"),
            Segment::question(
                "Is your Brand more than a name?",
                "What is your Brand remembered for?",
                3000,
            )
            .with_audio("audio2"),
            Segment::question(
                "What emotions are invoked by your Brand?",
                "What does your Brand translate to?",
                3000,
            )
            .with_audio("audio3"),
            Segment::question(
                "What values are synonymous with your Brand?",
                "Your Brand is synonymous with the Promise you impress as a Brand, with your values and the reason you establish to be remembered, related to, preferred, and loved.",
                11000,
            )
            .with_audio("audio4"),
            Segment::question(
                "Are you building business without building brand value?",
                "In all You do, be sure to genuinely connect as a Brand, impress, engage and build Brand value",
                9000,
            )
            .with_audio("audio5"),
        ],
    )
}

pub fn ceo_cmo() -> Result<PresentationDocument, ConfigError> {
    PresentationDocument::new(
        autoplay_page(),
        vec![
            Segment::question(
                "Is your critical decision-making powered by on-ground insights and reliable intelligence?",
                "We understand you'd not need one to tell you what to do, but all that's needed is reliable insight, intelligence and informed perspective, to insulate & empower your decision making.",
                12000,
            )
            .with_audio("audio6"),
            Segment::question(
                "Is your strategy / business / investment plan tested and backed by robust intelligence?",
                "We own the responsibility of your consequential decision-making - bank on us, with confidence.",
                6000,
            )
            .with_audio("audio7"),
        ],
    )
}

pub fn india() -> Result<PresentationDocument, ConfigError> {
    PresentationDocument::new(
        autoplay_page(),
        vec![
            Segment::question(
                "Looking for clarity, guidance around your plans for India?",
                "As promising as India is, as an expansive market, the diversity, bureaucracy and complexity are just as real.",
                11000,
            )
            .with_audio("audio8"),
            Segment::question(
                "Are you confident that your interests in India are best protected?",
                "As a trusted advisor with international trade bodies, we not only bring to you the understanding of the market but also an approach that protects and prioritizes your interests. We make things happen for you - from advisory to execution.",
                23000,
            )
            .with_audio("audio10"),
        ],
    )
}

pub fn startup() -> Result<PresentationDocument, ConfigError> {
    PresentationDocument::new(
        manual_page(None, None),
        vec![Segment::question(
            "Are you a start-up looking for support but worried of costs?",
            "No matter the stage of journey you are at as a start-up, we can help you at the point where your need meets our value-promise. With flexible engagement models, our support ranges across feasibility assessments, investor engagement and market access and penetration.",
            15000,
        )
        .with_audio("audio12")],
    )
}

pub fn global() -> Result<PresentationDocument, ConfigError> {
    let config = manual_page(
        Some(Card::new(
            "Global Market Expansion",
            "Click play to discover how we enable global market entry",
        )),
        Some(Card::new(
            "Global Market Strategy Complete",
            "Ready to expand globally? Explore our case studies below.",
        )),
    );
    PresentationDocument::new(
        config,
        vec![Segment::question(
            "What's stopping from entering / expanding into new export markets?",
            "Are you limited by lack of international marketing resources? We help represent promising Brands in a professional capacity and help crack deals in international markets, with sound strategy based on on-ground intelligence and action.",
            15000,
        )
        .with_audio("audio11")],
    )
}

/// Heading and phrase pairs rotated by the landing-page typewriter.
pub const TYPEWRITER_PAIRS: [(&str, &str); 5] = [
    (
        "Power-Position Your Brand",
        "Discover & Drive Differentiation, Craft Compelling Communication",
    ),
    ("Enabling Global Emergence", "International Market Penetration"),
    (
        "India Market Entry and Acceleration",
        "Protected Interests, Powered Navigation & Strategic Approach",
    ),
    ("Hand-Holding Start-ups", "Feasibility Assessments & Investor Engagement"),
    ("CEO & CMO Support", "Intelligence-Powered Trusted Advisory"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_builds() {
        for preset in Preset::ALL {
            let doc = preset.document().unwrap();
            assert!(!doc.script.is_empty(), "{} is empty", preset);
            assert!(doc.script.iter().all(|s| s.audio().is_some()));
        }
    }

    #[test]
    fn brand_questions_timings() {
        let doc = brand_questions().unwrap();
        let durations: Vec<u64> = doc.script.iter().map(|s| s.duration_ms()).collect();
        assert_eq!(durations, vec![3000, 3000, 3000, 11000, 9000]);
        assert_eq!(doc.config.start_mode, StartMode::Manual);
        assert!(doc.config.intro.is_some());
    }

    #[test]
    fn autoplay_pages_start_muted_and_loop() {
        for doc in [ceo_cmo().unwrap(), india().unwrap()] {
            assert!(doc.config.start_muted);
            assert!(doc.config.looping);
            assert!(doc.config.wraps_manual_navigation());
            assert_eq!(doc.config.control_style, ControlStyle::MuteToggle);
        }
    }

    #[test]
    fn names_parse_back() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
        assert_eq!(" India ".parse::<Preset>().unwrap(), Preset::India);
        assert!("carousel".parse::<Preset>().is_err());
    }
}
