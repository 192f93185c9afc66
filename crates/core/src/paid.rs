//! Paid-ad brief validation and templated ad content.
//!
//! Paid content generation is not wired to an automation yet; the ad copy,
//! headlines, CTA suggestions, image prompt, and video hooks are built from
//! templates over the brief.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const PAID_STATUS_DRAFT: &str = "draft";
pub const PAID_STATUS_GENERATED: &str = "generated";
pub const PAID_STATUS_SAVED: &str = "saved";

const DEFAULT_VARIATIONS: i32 = 3;
const MAX_VARIATIONS: i32 = 10;

fn default_true() -> bool {
    true
}

fn default_variations() -> i32 {
    DEFAULT_VARIATIONS
}

/// The paid-content brief.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaidContentForm {
    #[serde(default)]
    pub campaign_name: String,
    #[serde(default)]
    pub primary_goal: String,
    #[serde(default)]
    pub target_platform: String,
    #[serde(default)]
    pub audience_type: String,
    #[serde(default)]
    pub audience_characteristics: String,
    #[serde(default)]
    pub age_range: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub budget_type: String,
    #[serde(default)]
    pub budget_amount: Option<f64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub optimization_preference: String,
    #[serde(default)]
    pub content_idea: String,
    #[serde(default)]
    pub brand_tone: String,
    #[serde(default)]
    pub cta_objective: String,
    #[serde(default)]
    pub visual_style: String,
    #[serde(default = "default_true")]
    pub generate_ad_copy: bool,
    #[serde(default = "default_true")]
    pub generate_headlines: bool,
    #[serde(default = "default_true")]
    pub generate_cta_text: bool,
    #[serde(default = "default_true")]
    pub generate_image_prompt: bool,
    #[serde(default = "default_true")]
    pub generate_video_hooks: bool,
    #[serde(default = "default_variations")]
    pub number_of_variations: i32,
}

impl PaidContentForm {
    pub fn validate(&self) -> Result<(), CoreError> {
        let required = [
            ("campaign_name", self.campaign_name.as_str()),
            ("primary_goal", self.primary_goal.as_str()),
            ("target_platform", self.target_platform.as_str()),
            ("audience_type", self.audience_type.as_str()),
            ("audience_characteristics", self.audience_characteristics.as_str()),
            ("budget_type", self.budget_type.as_str()),
            ("optimization_preference", self.optimization_preference.as_str()),
            ("content_idea", self.content_idea.as_str()),
            ("brand_tone", self.brand_tone.as_str()),
            ("cta_objective", self.cta_objective.as_str()),
            ("visual_style", self.visual_style.as_str()),
        ];
        let mut missing: Vec<&str> = required
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        match self.budget_amount {
            Some(amount) if amount.is_finite() && amount > 0.0 => {}
            _ => missing.push("budget_amount"),
        }

        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "Please fill in all required fields: {}",
                missing.join(", ")
            )));
        }

        if !(1..=MAX_VARIATIONS).contains(&self.number_of_variations) {
            return Err(CoreError::Validation(format!(
                "number_of_variations must be between 1 and {MAX_VARIATIONS}"
            )));
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(CoreError::Validation(
                    "end_date must not be before start_date".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// One regenerable output of the paid-content flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdField {
    AdCopy,
    Headlines,
    CtaSuggestions,
    ImagePrompt,
    VideoHooks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAdContent {
    pub ad_copy: String,
    pub headlines: Vec<String>,
    pub cta_suggestions: Vec<String>,
    pub image_prompt: String,
    pub video_hooks: Vec<String>,
}

/// First-pass content for a validated brief.
pub fn generate_ad_content(form: &PaidContentForm) -> GeneratedAdContent {
    let name = form.campaign_name.trim();
    let idea = form.content_idea.trim();
    GeneratedAdContent {
        ad_copy: format!(
            "Transform your business with our innovative solution! {idea}. Perfect for {} audiences looking to achieve their goals.",
            form.audience_type.to_lowercase()
        ),
        headlines: vec![
            format!("{name}: Your Success Starts Here"),
            format!("Discover the Power of {name}"),
            format!("Join Thousands Who Trust {name}"),
        ],
        cta_suggestions: vec![
            form.cta_objective.clone(),
            "Get Started Now".to_string(),
            format!("{} - Limited Time", form.cta_objective),
        ],
        image_prompt: format!(
            "Create a {} image showing {idea}. Style: {}, professional quality, optimized for {}.",
            form.visual_style.to_lowercase(),
            form.brand_tone.to_lowercase(),
            form.target_platform
        ),
        video_hooks: vec![
            format!("\"What if I told you {idea}...\""),
            format!("\"Stop scrolling! Here's why {name} is different...\""),
            "\"The secret to success? Let me show you...\"".to_string(),
        ],
    }
}

/// Replace one field with its alternate template.
pub fn regenerate_field(
    form: &PaidContentForm,
    current: &GeneratedAdContent,
    field: AdField,
) -> GeneratedAdContent {
    let name = form.campaign_name.trim();
    let idea = form.content_idea.trim();
    let mut next = current.clone();
    match field {
        AdField::AdCopy => {
            next.ad_copy = format!(
                "Discover the power of {name}! {idea}. Designed for {} audiences who want real results.",
                form.audience_type.to_lowercase()
            );
        }
        AdField::Headlines => {
            next.headlines = vec![
                format!("{name}: Change Everything Today"),
                format!("Why {name} Is the Smart Choice"),
                format!("Unlock Your Potential with {name}"),
            ];
        }
        AdField::CtaSuggestions => {
            next.cta_suggestions = vec![
                format!("{} Today", form.cta_objective),
                "Start Your Journey".to_string(),
                "Claim Your Offer".to_string(),
            ];
        }
        AdField::ImagePrompt => {
            next.image_prompt = format!(
                "Professional {} image featuring {idea}. Tone: {}, high-quality, platform: {}.",
                form.visual_style.to_lowercase(),
                form.brand_tone.to_lowercase(),
                form.target_platform
            );
        }
        AdField::VideoHooks => {
            next.video_hooks = vec![
                "\"Ready to transform your approach? Watch this...\"".to_string(),
                "\"This is what you've been missing...\"".to_string(),
                "\"Before you scroll away, see this...\"".to_string(),
            ];
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PaidContentForm {
        PaidContentForm {
            campaign_name: "Spring Sale".into(),
            primary_goal: "Sales".into(),
            target_platform: "Meta".into(),
            audience_type: "Warm".into(),
            audience_characteristics: "Returning shoppers".into(),
            budget_type: "Daily".into(),
            budget_amount: Some(50.0),
            optimization_preference: "Conversions".into(),
            content_idea: "20% off everything".into(),
            brand_tone: "Friendly".into(),
            cta_objective: "Buy Now".into(),
            visual_style: "Lifestyle".into(),
            number_of_variations: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_form_is_valid() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut f = form();
        f.budget_amount = Some(0.0);
        let err = f.validate().unwrap_err();
        assert!(err.to_string().contains("budget_amount"));
    }

    #[test]
    fn test_blank_required_fields_listed() {
        let mut f = form();
        f.campaign_name = " ".into();
        f.visual_style.clear();
        let msg = f.validate().unwrap_err().to_string();
        assert!(msg.contains("campaign_name"));
        assert!(msg.contains("visual_style"));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut f = form();
        f.start_date = NaiveDate::from_ymd_opt(2024, 6, 2);
        f.end_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_generated_content_uses_brief() {
        let content = generate_ad_content(&form());
        assert!(content.ad_copy.contains("warm audiences"));
        assert_eq!(content.headlines[0], "Spring Sale: Your Success Starts Here");
        assert_eq!(content.cta_suggestions[2], "Buy Now - Limited Time");
        assert!(content.image_prompt.contains("optimized for Meta"));
    }

    #[test]
    fn test_regenerate_touches_only_one_field() {
        let f = form();
        let first = generate_ad_content(&f);
        let next = regenerate_field(&f, &first, AdField::Headlines);
        assert_ne!(next.headlines, first.headlines);
        assert_eq!(next.ad_copy, first.ad_copy);
        assert_eq!(next.video_hooks, first.video_hooks);
    }

    #[test]
    fn test_defaults_from_json() {
        let f: PaidContentForm = serde_json::from_str("{}").unwrap();
        assert!(f.generate_ad_copy);
        assert_eq!(f.number_of_variations, 3);
    }
}
