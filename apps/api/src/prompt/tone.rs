//! Tone and report-structure directives for prompt construction.
//!
//! Directive text is fixed per enum value and never interpolated from user
//! input, so the instruction skeleton of a prompt cannot be altered by the
//! caller. Unknown explicit values are rejected; only absent values fall
//! back to the defaults.

use serde::{Deserialize, Serialize};

use crate::prompt::PromptError;

/// Tone selected by the caller for email or report generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Professional,
    Casual,
    Formal,
    Friendly,
}

/// Output-shape directive for report generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStructure {
    ExecutiveSummary,
    Detailed,
    BulletPoints,
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Professional
    }
}

impl Default for ReportStructure {
    fn default() -> Self {
        ReportStructure::Detailed
    }
}

impl Tone {
    /// Parses an explicit tone value. `None` falls back to the default;
    /// an unrecognized value is a validation failure, never a silent coercion.
    pub fn parse(value: Option<&str>) -> Result<Tone, PromptError> {
        match value {
            None => Ok(Tone::default()),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "professional" => Ok(Tone::Professional),
                "casual" => Ok(Tone::Casual),
                "formal" => Ok(Tone::Formal),
                "friendly" => Ok(Tone::Friendly),
                _ => Err(PromptError::InvalidTone(raw.to_string())),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Formal => "formal",
            Tone::Friendly => "friendly",
        }
    }

    /// Fixed tone directive used in email prompts.
    pub fn email_directive(&self) -> &'static str {
        match self {
            Tone::Professional => {
                "Use a professional and respectful tone. Maintain formality while being \
                 approachable. Avoid overly casual language or slang."
            }
            Tone::Casual => {
                "Use a casual and friendly tone while maintaining professionalism. It's \
                 acceptable to be conversational, but remain respectful."
            }
            Tone::Formal => {
                "Use a formal and reserved tone. Maintain proper business etiquette and avoid \
                 contractions. Use formal salutations and closings."
            }
            Tone::Friendly => {
                "Use a warm and friendly tone while remaining professional. Show enthusiasm \
                 and approachability in your language."
            }
        }
    }

    /// Fixed tone directive used in report prompts.
    pub fn report_directive(&self) -> &'static str {
        match self {
            Tone::Professional => {
                "Use a professional and objective tone. Present information clearly and \
                 factually. Maintain consistency throughout the report."
            }
            Tone::Casual => {
                "Use a casual yet informative tone. Present information in an accessible way \
                 while maintaining credibility and clarity."
            }
            Tone::Formal => {
                "Use a formal and academic tone. Employ precise language and avoid \
                 contractions. Structure content with proper headings and logical flow."
            }
            Tone::Friendly => {
                "Use an approachable and engaging tone. Make complex information accessible \
                 while maintaining professionalism and accuracy."
            }
        }
    }
}

impl ReportStructure {
    /// Parses an explicit structure value; `None` defaults to `detailed`.
    pub fn parse(value: Option<&str>) -> Result<ReportStructure, PromptError> {
        match value {
            None => Ok(ReportStructure::default()),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "executive_summary" => Ok(ReportStructure::ExecutiveSummary),
                "detailed" => Ok(ReportStructure::Detailed),
                "bullet_points" => Ok(ReportStructure::BulletPoints),
                _ => Err(PromptError::InvalidStructure(raw.to_string())),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStructure::ExecutiveSummary => "executive_summary",
            ReportStructure::Detailed => "detailed",
            ReportStructure::BulletPoints => "bullet_points",
        }
    }

    /// Fixed sectioning and length guidance per structure.
    pub fn directive(&self) -> &'static str {
        match self {
            ReportStructure::ExecutiveSummary => {
                "- Start with a concise executive summary (2-3 paragraphs)\n\
                 - Highlight key findings and recommendations\n\
                 - Focus on high-level insights and actionable conclusions\n\
                 - Keep the overall length concise (500-800 words)"
            }
            ReportStructure::Detailed => {
                "- Include a brief introduction\n\
                 - Organize content into clear sections with headings\n\
                 - Provide detailed analysis and supporting information\n\
                 - Include a conclusion section summarizing key takeaways\n\
                 - Aim for comprehensive coverage (1000-1500 words)"
            }
            ReportStructure::BulletPoints => {
                "- Use bullet points for main ideas\n\
                 - Organize into logical categories or sections\n\
                 - Keep each point concise and focused\n\
                 - Use sub-bullets for supporting details where appropriate\n\
                 - Prioritize clarity and scannability"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_tone_defaults_to_professional() {
        assert_eq!(Tone::parse(None).unwrap(), Tone::Professional);
    }

    #[test]
    fn test_tone_parse_is_case_insensitive() {
        assert_eq!(Tone::parse(Some("FORMAL")).unwrap(), Tone::Formal);
        assert_eq!(Tone::parse(Some("  casual ")).unwrap(), Tone::Casual);
    }

    #[test]
    fn test_unknown_tone_is_rejected_not_coerced() {
        let err = Tone::parse(Some("sarcastic")).unwrap_err();
        assert!(matches!(err, PromptError::InvalidTone(ref v) if v == "sarcastic"));
    }

    #[test]
    fn test_absent_structure_defaults_to_detailed() {
        assert_eq!(
            ReportStructure::parse(None).unwrap(),
            ReportStructure::Detailed
        );
    }

    #[test]
    fn test_unknown_structure_is_rejected() {
        assert!(ReportStructure::parse(Some("haiku")).is_err());
    }

    #[test]
    fn test_structure_directives_carry_word_targets() {
        assert!(ReportStructure::ExecutiveSummary
            .directive()
            .contains("500-800 words"));
        assert!(ReportStructure::Detailed
            .directive()
            .contains("1000-1500 words"));
        // Bullet points deliberately carry no numeric target.
        assert!(!ReportStructure::BulletPoints.directive().contains("words"));
    }

    #[test]
    fn test_each_tone_has_distinct_email_directive() {
        let directives = [
            Tone::Professional.email_directive(),
            Tone::Casual.email_directive(),
            Tone::Formal.email_directive(),
            Tone::Friendly.email_directive(),
        ];
        for (i, a) in directives.iter().enumerate() {
            for b in directives.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
