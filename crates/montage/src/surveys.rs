//! Archive surveys the planner knows how to request images from.

use crate::{Error, Result};
use serde::Serialize;

/// One band of a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurveyBand {
    /// Band name as used in `survey:band:color`
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

/// An archive survey and its bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    /// Survey name as used in `survey:band:color`
    pub name: &'static str,
    /// Full title
    pub title: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Available bands
    pub bands: &'static [SurveyBand],
    /// Example band specification
    pub example: &'static str,
}

impl Survey {
    /// Band by name, ignoring case.
    pub fn band(&self, name: &str) -> Option<&'static SurveyBand> {
        self.bands.iter().find(|b| b.name.eq_ignore_ascii_case(name))
    }
}

/// Colour channels a band can be mapped to, with what each feeds.
pub const COLOR_CHANNELS: &[(&str, &str)] = &[
    (crate::request::RED, "Red channel in final color image"),
    (crate::request::GREEN, "Green channel in final color image"),
    (crate::request::BLUE, "Blue channel in final color image"),
];

/// Every supported survey.
pub const SURVEYS: &[Survey] = &[
    Survey {
        name: "2MASS",
        title: "Two Micron All-Sky Survey",
        description: "Near-infrared survey covering the entire sky",
        bands: &[
            SurveyBand { name: "j", description: "J-band (1.25 μm)" },
            SurveyBand { name: "h", description: "H-band (1.65 μm)" },
            SurveyBand { name: "k", description: "K-band (2.17 μm)" },
        ],
        example: "2mass:j:red",
    },
    Survey {
        name: "DSS",
        title: "Digitized Sky Survey",
        description: "Optical sky survey from photographic plates",
        bands: &[
            SurveyBand { name: "DSS2B", description: "DSS2 Blue (B-band)" },
            SurveyBand { name: "DSS2R", description: "DSS2 Red (R-band)" },
            SurveyBand { name: "DSS2IR", description: "DSS2 Infrared (I-band)" },
        ],
        example: "dss:DSS2B:blue",
    },
    Survey {
        name: "SDSS",
        title: "Sloan Digital Sky Survey",
        description: "Modern multi-band optical survey",
        bands: &[
            SurveyBand { name: "u", description: "Ultraviolet" },
            SurveyBand { name: "g", description: "Green" },
            SurveyBand { name: "r", description: "Red" },
            SurveyBand { name: "i", description: "Near-infrared" },
            SurveyBand { name: "z", description: "Infrared" },
        ],
        example: "sdss:g:green",
    },
];

/// Survey by name, ignoring case.
pub fn find(name: &str) -> Option<&'static Survey> {
    SURVEYS.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Check that `survey` offers `band`.
///
/// # Errors
///
/// [`Error::UnknownSurvey`] or [`Error::UnknownSurveyBand`].
pub fn check_band(survey: &str, band: &str) -> Result<&'static SurveyBand> {
    let found = find(survey).ok_or_else(|| Error::UnknownSurvey {
        survey: survey.to_string(),
        known: SURVEYS.iter().map(|s| s.name.to_lowercase()).collect::<Vec<_>>().join(", "),
    })?;
    found.band(band).ok_or_else(|| Error::UnknownSurveyBand {
        survey: found.name.to_string(),
        band: band.to_string(),
        known: found.bands.iter().map(|b| b.name).collect::<Vec<_>>().join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ignores_case() {
        assert_eq!(find("2mass").map(|s| s.name), Some("2MASS"));
        assert_eq!(find("Sdss").map(|s| s.name), Some("SDSS"));
        assert!(find("wise").is_none());
    }

    #[test]
    fn test_check_band() {
        assert_eq!(check_band("dss", "DSS2IR").unwrap().description, "DSS2 Infrared (I-band)");
        assert_eq!(check_band("2mass", "K").unwrap().name, "k");

        let err = check_band("dss", "j").unwrap_err();
        assert!(matches!(&err, Error::UnknownSurveyBand { survey, band, .. } if survey == "DSS" && band == "j"));
        assert!(err.to_string().contains("DSS2B, DSS2R, DSS2IR"));

        let err = check_band("wise", "w1").unwrap_err();
        assert!(matches!(&err, Error::UnknownSurvey { survey, .. } if survey == "wise"));
        assert!(err.to_string().contains("2mass, dss, sdss"));
    }

    #[test]
    fn test_examples_name_real_bands() {
        for survey in SURVEYS {
            let spec: crate::BandSpec = survey.example.parse().unwrap();
            assert!(check_band(&spec.survey, &spec.band).is_ok(), "{}", survey.example);
            assert!(COLOR_CHANNELS.iter().any(|(c, _)| *c == spec.color));
        }
    }
}
