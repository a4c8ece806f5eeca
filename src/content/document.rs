//! The content document: every piece of editable site copy for one language.
//!
//! The managed shape is fixed and identical across languages. Keys the editor
//! does not manage (placeholders, badges, button captions used by the public
//! renderer) are kept in each record's `extra` map and written back verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Unmanaged keys of a record, in stored order.
pub type Extra = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub hero: Hero,
    pub modules: Modules,
    pub pricing: Pricing,
    pub testimonials: Testimonials,
    pub contact: ContactLabels,
    pub footer: Footer,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub title: String,
    pub tagline: String,
    pub subtitle: String,
    pub cta: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modules {
    pub title: String,
    pub items: Vec<ModuleItem>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleItem {
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub title: String,
    pub period: String,
    pub plans: Plans,
    #[serde(flatten)]
    pub extra: Extra,
}

/// The closed set of pricing plans. Exactly these three keys exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plans {
    pub light: Plan,
    pub start: Plan,
    pub pro: Plan,
}

impl Plans {
    pub fn get(&self, key: PlanKey) -> &Plan {
        match key {
            PlanKey::Light => &self.light,
            PlanKey::Start => &self.start,
            PlanKey::Pro => &self.pro,
        }
    }

    pub fn get_mut(&mut self, key: PlanKey) -> &mut Plan {
        match key {
            PlanKey::Light => &mut self.light,
            PlanKey::Start => &mut self.start,
            PlanKey::Pro => &mut self.pro,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub title: String,
    pub price: String,
    pub features: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKey {
    Light,
    Start,
    Pro,
}

impl PlanKey {
    pub const ALL: [PlanKey; 3] = [PlanKey::Light, PlanKey::Start, PlanKey::Pro];

    pub fn as_str(self) -> &'static str {
        match self {
            PlanKey::Light => "light",
            PlanKey::Start => "start",
            PlanKey::Pro => "pro",
        }
    }

    pub fn from_key(key: &str) -> Option<PlanKey> {
        PlanKey::ALL.into_iter().find(|plan| plan.as_str() == key)
    }
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonials {
    pub title: String,
    pub items: Vec<Testimonial>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub name: String,
    pub role: String,
    pub content: String,
    pub rating: Rating,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Labels of the contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactLabels {
    pub title: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub plan: String,
    pub message: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    pub copyright: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct RatingOutOfRange(pub i64);

/// Testimonial star rating, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Rating, RatingOutOfRange> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(RatingOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ==================== Shipped Content Tests ====================

    #[test]
    fn test_shipped_documents_parse() {
        let ru = fixtures::ru();
        let en = fixtures::en();
        assert!(!ru.hero.title.is_empty());
        assert!(!en.hero.title.is_empty());
    }

    #[test]
    fn test_shipped_documents_share_list_lengths() {
        let ru = fixtures::ru();
        let en = fixtures::en();
        assert_eq!(ru.modules.items.len(), en.modules.items.len());
        assert_eq!(ru.testimonials.items.len(), en.testimonials.items.len());
        for plan in PlanKey::ALL {
            assert_eq!(
                ru.pricing.plans.get(plan).features.len(),
                en.pricing.plans.get(plan).features.len(),
                "feature count differs for plan {}",
                plan
            );
        }
    }

    #[test]
    fn test_shipped_documents_share_unmanaged_keys() {
        let ru = fixtures::ru();
        let en = fixtures::en();
        let keys = |extra: &Extra| extra.keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys(&ru.contact.extra), keys(&en.contact.extra));
        assert_eq!(keys(&ru.pricing.extra), keys(&en.pricing.extra));
    }

    // ==================== Unmanaged Key Tests ====================

    #[test]
    fn test_unmanaged_keys_survive_round_trip() {
        let ru = fixtures::ru();
        assert!(ru.contact.extra.contains_key("submit"));

        let json = serde_json::to_string(&ru).expect("Should serialize");
        let back: ContentDocument = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(ru, back);
        assert_eq!(back.contact.extra.get("submit"), ru.contact.extra.get("submit"));
    }

    #[test]
    fn test_managed_keys_are_not_duplicated_into_extra() {
        let ru = fixtures::ru();
        assert!(!ru.hero.extra.contains_key("title"));
        assert!(!ru.contact.extra.contains_key("email"));
    }

    // ==================== Shape Tests ====================

    #[test]
    fn test_missing_section_is_rejected() {
        let mut value = serde_json::to_value(fixtures::ru()).unwrap();
        value.as_object_mut().unwrap().remove("footer");
        let result: Result<ContentDocument, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_fourth_plan_is_rejected() {
        let mut value = serde_json::to_value(fixtures::ru()).unwrap();
        let light = value["pricing"]["plans"]["light"].clone();
        value["pricing"]["plans"]
            .as_object_mut()
            .unwrap()
            .insert("enterprise".to_string(), light);
        let result: Result<ContentDocument, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_plan_is_rejected() {
        let mut value = serde_json::to_value(fixtures::ru()).unwrap();
        value["pricing"]["plans"].as_object_mut().unwrap().remove("pro");
        let result: Result<ContentDocument, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_testimonial_without_rating_is_rejected() {
        let mut value = serde_json::to_value(fixtures::ru()).unwrap();
        value["testimonials"]["items"][0]
            .as_object_mut()
            .unwrap()
            .remove("rating");
        let result: Result<ContentDocument, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    // ==================== Rating Tests ====================

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert_eq!(Rating::new(1).unwrap().get(), 1);
        assert_eq!(Rating::new(5).unwrap().get(), 5);
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
    }

    #[test]
    fn test_rating_serializes_as_integer() {
        let rating = Rating::new(4).unwrap();
        assert_eq!(serde_json::to_value(rating).unwrap(), json!(4));
    }

    #[test]
    fn test_out_of_range_rating_fails_to_deserialize() {
        let result: Result<Rating, _> = serde_json::from_value(json!(9));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("between 1 and 5"), "unexpected error: {}", err);
    }

    #[test]
    fn test_fractional_rating_fails_to_deserialize() {
        let result: Result<Rating, _> = serde_json::from_value(json!(4.5));
        assert!(result.is_err());
    }

    // ==================== PlanKey Tests ====================

    #[test]
    fn test_plan_key_lookup() {
        assert_eq!(PlanKey::from_key("light"), Some(PlanKey::Light));
        assert_eq!(PlanKey::from_key("start"), Some(PlanKey::Start));
        assert_eq!(PlanKey::from_key("pro"), Some(PlanKey::Pro));
        assert_eq!(PlanKey::from_key("enterprise"), None);
        assert_eq!(PlanKey::from_key("Pro"), None);
    }

    #[test]
    fn test_plans_get_mut_targets_one_plan() {
        let mut doc = fixtures::ru();
        doc.pricing.plans.get_mut(PlanKey::Start).price = "$99".to_string();
        assert_eq!(doc.pricing.plans.start.price, "$99");
        assert_ne!(doc.pricing.plans.light.price, "$99");
        assert_ne!(doc.pricing.plans.pro.price, "$99");
    }
}
