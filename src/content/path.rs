//! Path-addressed edits over the content document.
//!
//! A dot-separated path such as `pricing.plans.start.price` or
//! `testimonials.items.1.rating` is split into key and index segments and
//! matched against the closed set of editable locations. Anything outside
//! that set is rejected; no path ever creates a field.

use super::document::{ContentDocument, ModuleItem, PlanKey, Rating, Testimonial};
use super::error::ContentError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

const SECTIONS: [&str; 6] = ["hero", "modules", "pricing", "testimonials", "contact", "footer"];

/// One segment of a dotted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Split a dotted path into segments. All-digit segments are list indices.
pub fn segments(path: &str) -> Result<Vec<Segment<'_>>, ContentError> {
    if path.is_empty() {
        return Err(ContentError::unknown_path(path, "path is empty"));
    }

    path.split('.')
        .map(|raw| {
            if raw.is_empty() {
                Err(ContentError::unknown_path(path, "path contains an empty segment"))
            } else if raw.bytes().all(|b| b.is_ascii_digit()) {
                raw.parse::<usize>().map(Segment::Index).map_err(|_| {
                    ContentError::unknown_path(path, format!("list index '{}' is too large", raw))
                })
            } else {
                Ok(Segment::Key(raw))
            }
        })
        .collect()
}

macro_rules! field_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $key:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            pub fn from_key(key: &str) -> Option<$name> {
                match key {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

field_enum!(HeroField {
    Title => "title",
    Tagline => "tagline",
    Subtitle => "subtitle",
    Cta => "cta",
});

field_enum!(ModuleItemField {
    Title => "title",
    Content => "content",
});

field_enum!(PlanField {
    Title => "title",
    Price => "price",
    Features => "features",
});

field_enum!(TestimonialField {
    Name => "name",
    Role => "role",
    Content => "content",
    Rating => "rating",
});

field_enum!(
    /// Labels of the contact form the editor manages.
    ContactField {
        Title => "title",
        Name => "name",
        Email => "email",
        Phone => "phone",
        Company => "company",
        Plan => "plan",
        Message => "message",
    }
);

/// An editable location in a [`ContentDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentPath {
    Hero(HeroField),
    ModulesTitle,
    ModuleItems,
    ModuleItem(usize, ModuleItemField),
    PricingTitle,
    PricingPeriod,
    Plan(PlanKey, PlanField),
    PlanFeature(PlanKey, usize),
    TestimonialsTitle,
    TestimonialItems,
    Testimonial(usize, TestimonialField),
    Contact(ContactField),
    FooterCopyright,
}

/// An ordered sequence inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListPath {
    ModuleItems,
    TestimonialItems,
    PlanFeatures(PlanKey),
}

impl ContentPath {
    pub fn parse(path: &str) -> Result<ContentPath, ContentError> {
        use Segment::{Index, Key};

        let segs = segments(path)?;
        let unknown = |reason: String| ContentError::unknown_path(path, reason);

        match segs.as_slice() {
            [Key("hero"), Key(field)] => HeroField::from_key(field)
                .map(ContentPath::Hero)
                .ok_or_else(|| unknown(format!("'{}' is not a hero field", field))),

            [Key("modules"), Key("title")] => Ok(ContentPath::ModulesTitle),
            [Key("modules"), Key("items")] => Ok(ContentPath::ModuleItems),
            [Key("modules"), Key("items"), Index(index), Key(field)] => {
                ModuleItemField::from_key(field)
                    .map(|f| ContentPath::ModuleItem(*index, f))
                    .ok_or_else(|| unknown(format!("'{}' is not a module item field", field)))
            }

            [Key("pricing"), Key("title")] => Ok(ContentPath::PricingTitle),
            [Key("pricing"), Key("period")] => Ok(ContentPath::PricingPeriod),
            [Key("pricing"), Key("plans"), Key(plan), rest @ ..] => {
                let plan = PlanKey::from_key(plan).ok_or_else(|| {
                    unknown(format!("'{}' is not a plan (expected light, start or pro)", plan))
                })?;
                match rest {
                    [Key(field)] => PlanField::from_key(field)
                        .map(|f| ContentPath::Plan(plan, f))
                        .ok_or_else(|| unknown(format!("'{}' is not a plan field", field))),
                    [Key("features"), Index(index)] => Ok(ContentPath::PlanFeature(plan, *index)),
                    [] => Err(unknown(format!("plan '{}' is a record, not a field", plan))),
                    _ => Err(unknown(format!(
                        "nothing editable below 'pricing.plans.{}.{}'",
                        plan, rest[0]
                    ))),
                }
            }

            [Key("testimonials"), Key("title")] => Ok(ContentPath::TestimonialsTitle),
            [Key("testimonials"), Key("items")] => Ok(ContentPath::TestimonialItems),
            [Key("testimonials"), Key("items"), Index(index), Key(field)] => {
                TestimonialField::from_key(field)
                    .map(|f| ContentPath::Testimonial(*index, f))
                    .ok_or_else(|| unknown(format!("'{}' is not a testimonial field", field)))
            }

            [Key("contact"), Key(field)] => ContactField::from_key(field)
                .map(ContentPath::Contact)
                .ok_or_else(|| unknown(format!("'{}' is not a contact label", field))),

            [Key("footer"), Key("copyright")] => Ok(ContentPath::FooterCopyright),

            _ => Err(unknown(diagnose(&segs))),
        }
    }

    /// The list this path addresses as a whole, if any.
    pub fn as_list(self) -> Option<ListPath> {
        match self {
            ContentPath::ModuleItems => Some(ListPath::ModuleItems),
            ContentPath::TestimonialItems => Some(ListPath::TestimonialItems),
            ContentPath::Plan(plan, PlanField::Features) => Some(ListPath::PlanFeatures(plan)),
            _ => None,
        }
    }

    /// Read the current value at this path.
    pub fn get(self, doc: &ContentDocument) -> Result<Value, ContentError> {
        let value = match self {
            ContentPath::Hero(field) => Value::String(hero_slot_ref(doc, field).clone()),
            ContentPath::ModulesTitle => Value::String(doc.modules.title.clone()),
            ContentPath::ModuleItems => to_value(self, &doc.modules.items)?,
            ContentPath::ModuleItem(index, field) => {
                let item = item_ref(&doc.modules.items, index, ListPath::ModuleItems)?;
                Value::String(match field {
                    ModuleItemField::Title => item.title.clone(),
                    ModuleItemField::Content => item.content.clone(),
                })
            }
            ContentPath::PricingTitle => Value::String(doc.pricing.title.clone()),
            ContentPath::PricingPeriod => Value::String(doc.pricing.period.clone()),
            ContentPath::Plan(plan, field) => {
                let plan = doc.pricing.plans.get(plan);
                match field {
                    PlanField::Title => Value::String(plan.title.clone()),
                    PlanField::Price => Value::String(plan.price.clone()),
                    PlanField::Features => to_value(self, &plan.features)?,
                }
            }
            ContentPath::PlanFeature(plan, index) => {
                let features = &doc.pricing.plans.get(plan).features;
                Value::String(item_ref(features, index, ListPath::PlanFeatures(plan))?.clone())
            }
            ContentPath::TestimonialsTitle => Value::String(doc.testimonials.title.clone()),
            ContentPath::TestimonialItems => to_value(self, &doc.testimonials.items)?,
            ContentPath::Testimonial(index, field) => {
                let item = item_ref(&doc.testimonials.items, index, ListPath::TestimonialItems)?;
                match field {
                    TestimonialField::Name => Value::String(item.name.clone()),
                    TestimonialField::Role => Value::String(item.role.clone()),
                    TestimonialField::Content => Value::String(item.content.clone()),
                    TestimonialField::Rating => Value::from(item.rating.get()),
                }
            }
            ContentPath::Contact(field) => Value::String(contact_slot_ref(doc, field).clone()),
            ContentPath::FooterCopyright => Value::String(doc.footer.copyright.clone()),
        };
        Ok(value)
    }

    /// Replace the value at this path.
    ///
    /// The value is converted and the target located before anything is
    /// written, so on error the document is unchanged.
    pub fn set(self, doc: &mut ContentDocument, value: Value) -> Result<(), ContentError> {
        match self {
            ContentPath::Hero(field) => {
                let text = text(self, value)?;
                *hero_slot(doc, field) = text;
            }
            ContentPath::ModulesTitle => doc.modules.title = text(self, value)?,
            ContentPath::ModuleItems => doc.modules.items = typed::<Vec<ModuleItem>>(self, value)?,
            ContentPath::ModuleItem(index, field) => {
                let text = text(self, value)?;
                let item = item_mut(&mut doc.modules.items, index, ListPath::ModuleItems)?;
                match field {
                    ModuleItemField::Title => item.title = text,
                    ModuleItemField::Content => item.content = text,
                }
            }
            ContentPath::PricingTitle => doc.pricing.title = text(self, value)?,
            ContentPath::PricingPeriod => doc.pricing.period = text(self, value)?,
            ContentPath::Plan(plan, field) => match field {
                PlanField::Title => doc.pricing.plans.get_mut(plan).title = text(self, value)?,
                PlanField::Price => doc.pricing.plans.get_mut(plan).price = text(self, value)?,
                PlanField::Features => {
                    doc.pricing.plans.get_mut(plan).features = typed::<Vec<String>>(self, value)?
                }
            },
            ContentPath::PlanFeature(plan, index) => {
                let text = text(self, value)?;
                let features = &mut doc.pricing.plans.get_mut(plan).features;
                *item_mut(features, index, ListPath::PlanFeatures(plan))? = text;
            }
            ContentPath::TestimonialsTitle => doc.testimonials.title = text(self, value)?,
            ContentPath::TestimonialItems => {
                doc.testimonials.items = typed::<Vec<Testimonial>>(self, value)?
            }
            ContentPath::Testimonial(index, field) => {
                let items = &mut doc.testimonials.items;
                match field {
                    TestimonialField::Rating => {
                        let rating = rating(self, value)?;
                        item_mut(items, index, ListPath::TestimonialItems)?.rating = rating;
                    }
                    TestimonialField::Name => {
                        let text = text(self, value)?;
                        item_mut(items, index, ListPath::TestimonialItems)?.name = text;
                    }
                    TestimonialField::Role => {
                        let text = text(self, value)?;
                        item_mut(items, index, ListPath::TestimonialItems)?.role = text;
                    }
                    TestimonialField::Content => {
                        let text = text(self, value)?;
                        item_mut(items, index, ListPath::TestimonialItems)?.content = text;
                    }
                }
            }
            ContentPath::Contact(field) => {
                let text = text(self, value)?;
                *contact_slot(doc, field) = text;
            }
            ContentPath::FooterCopyright => doc.footer.copyright = text(self, value)?,
        }
        Ok(())
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentPath::Hero(field) => write!(f, "hero.{}", field.as_str()),
            ContentPath::ModulesTitle => f.write_str("modules.title"),
            ContentPath::ModuleItems => f.write_str("modules.items"),
            ContentPath::ModuleItem(index, field) => {
                write!(f, "modules.items.{}.{}", index, field.as_str())
            }
            ContentPath::PricingTitle => f.write_str("pricing.title"),
            ContentPath::PricingPeriod => f.write_str("pricing.period"),
            ContentPath::Plan(plan, field) => write!(f, "pricing.plans.{}.{}", plan, field.as_str()),
            ContentPath::PlanFeature(plan, index) => {
                write!(f, "pricing.plans.{}.features.{}", plan, index)
            }
            ContentPath::TestimonialsTitle => f.write_str("testimonials.title"),
            ContentPath::TestimonialItems => f.write_str("testimonials.items"),
            ContentPath::Testimonial(index, field) => {
                write!(f, "testimonials.items.{}.{}", index, field.as_str())
            }
            ContentPath::Contact(field) => write!(f, "contact.{}", field.as_str()),
            ContentPath::FooterCopyright => f.write_str("footer.copyright"),
        }
    }
}

impl ListPath {
    /// Parse a path that must address a whole list.
    pub fn parse(path: &str) -> Result<ListPath, ContentError> {
        ContentPath::parse(path)?
            .as_list()
            .ok_or_else(|| ContentError::unknown_path(path, "path does not address a list"))
    }

    /// The path of one field of one element.
    ///
    /// Feature lists hold plain strings, so their elements are addressed
    /// with an empty field name.
    pub fn item(self, index: usize, field: &str) -> Result<ContentPath, ContentError> {
        let unknown = |reason: String| {
            ContentError::unknown_path(&format!("{}.{}.{}", self, index, field), reason)
        };
        match self {
            ListPath::ModuleItems => ModuleItemField::from_key(field)
                .map(|f| ContentPath::ModuleItem(index, f))
                .ok_or_else(|| unknown(format!("'{}' is not a module item field", field))),
            ListPath::TestimonialItems => TestimonialField::from_key(field)
                .map(|f| ContentPath::Testimonial(index, f))
                .ok_or_else(|| unknown(format!("'{}' is not a testimonial field", field))),
            ListPath::PlanFeatures(plan) if field.is_empty() => {
                Ok(ContentPath::PlanFeature(plan, index))
            }
            ListPath::PlanFeatures(_) => {
                Err(unknown("features are plain strings and have no fields".to_string()))
            }
        }
    }

    pub fn len(self, doc: &ContentDocument) -> usize {
        match self {
            ListPath::ModuleItems => doc.modules.items.len(),
            ListPath::TestimonialItems => doc.testimonials.items.len(),
            ListPath::PlanFeatures(plan) => doc.pricing.plans.get(plan).features.len(),
        }
    }

    pub fn is_empty(self, doc: &ContentDocument) -> bool {
        self.len(doc) == 0
    }

    /// Append a new element, returning its index.
    pub fn push(self, doc: &mut ContentDocument, value: Value) -> Result<usize, ContentError> {
        let whole = self.as_content_path();
        let index = match self {
            ListPath::ModuleItems => {
                let item = typed::<ModuleItem>(whole, value)?;
                doc.modules.items.push(item);
                doc.modules.items.len() - 1
            }
            ListPath::TestimonialItems => {
                let item = typed::<Testimonial>(whole, value)?;
                doc.testimonials.items.push(item);
                doc.testimonials.items.len() - 1
            }
            ListPath::PlanFeatures(plan) => {
                let feature = text(whole, value)?;
                let features = &mut doc.pricing.plans.get_mut(plan).features;
                features.push(feature);
                features.len() - 1
            }
        };
        Ok(index)
    }

    /// Remove the element at `index`, shifting later elements down.
    pub fn remove(self, doc: &mut ContentDocument, index: usize) -> Result<(), ContentError> {
        let len = self.len(doc);
        if index >= len {
            return Err(ContentError::IndexOutOfRange {
                path: self.to_string(),
                index,
                len,
            });
        }
        match self {
            ListPath::ModuleItems => {
                doc.modules.items.remove(index);
            }
            ListPath::TestimonialItems => {
                doc.testimonials.items.remove(index);
            }
            ListPath::PlanFeatures(plan) => {
                doc.pricing.plans.get_mut(plan).features.remove(index);
            }
        }
        Ok(())
    }

    fn as_content_path(self) -> ContentPath {
        match self {
            ListPath::ModuleItems => ContentPath::ModuleItems,
            ListPath::TestimonialItems => ContentPath::TestimonialItems,
            ListPath::PlanFeatures(plan) => ContentPath::Plan(plan, PlanField::Features),
        }
    }
}

impl fmt::Display for ListPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_content_path().fmt(f)
    }
}

/// Explain why a segment sequence matched no editable location.
fn diagnose(segs: &[Segment<'_>]) -> String {
    use Segment::{Index, Key};

    match segs {
        [] => "path is empty".to_string(),
        [Index(index), ..] => format!("path must start with a section name, found index {}", index),
        [Key(section), ..] if !SECTIONS.contains(section) => {
            format!("'{}' is not a content section", section)
        }
        [Key(section)] => format!("'{}' is a section, not an editable field", section),
        [Key(section), Key("items"), next, ..] if matches!(next, Key(_)) => {
            format!("expected a list index after '{}.items', found '{}'", section, next)
        }
        [Key(section), Key("items"), Index(_)] => {
            format!("expected a field name after the '{}.items' index", section)
        }
        [Key(section), Key("items"), Index(index), _, ..] => {
            format!("nothing editable below '{}.items.{}'", section, index)
        }
        [Key(section), Index(index), ..] => {
            format!("'{}' is not a list, cannot index it with {}", section, index)
        }
        [Key(section), Key(field), ..] => {
            format!("'{}.{}' does not exist or has no editable children", section, field)
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn text(path: ContentPath, value: Value) -> Result<String, ContentError> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(ContentError::invalid_value(
            &path.to_string(),
            format!("expected a string, got {}", kind(&other)),
        )),
    }
}

/// Ratings arrive as integers, or as numeric strings from form inputs.
fn rating(path: ContentPath, value: Value) -> Result<Rating, ContentError> {
    let invalid = |reason: String| ContentError::invalid_value(&path.to_string(), reason);
    let number = match &value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid(format!("expected an integer rating, got {}", kind(&value))))?;
    Rating::new(number).map_err(|e| invalid(e.to_string()))
}

fn typed<T: DeserializeOwned>(path: ContentPath, value: Value) -> Result<T, ContentError> {
    serde_json::from_value(value)
        .map_err(|e| ContentError::invalid_value(&path.to_string(), e.to_string()))
}

fn to_value<T: serde::Serialize>(path: ContentPath, value: &T) -> Result<Value, ContentError> {
    serde_json::to_value(value)
        .map_err(|e| ContentError::invalid_value(&path.to_string(), e.to_string()))
}

fn item_ref<T>(items: &[T], index: usize, list: ListPath) -> Result<&T, ContentError> {
    items.get(index).ok_or_else(|| ContentError::IndexOutOfRange {
        path: list.to_string(),
        index,
        len: items.len(),
    })
}

fn item_mut<T>(items: &mut [T], index: usize, list: ListPath) -> Result<&mut T, ContentError> {
    let len = items.len();
    items.get_mut(index).ok_or_else(|| ContentError::IndexOutOfRange {
        path: list.to_string(),
        index,
        len,
    })
}

fn hero_slot(doc: &mut ContentDocument, field: HeroField) -> &mut String {
    match field {
        HeroField::Title => &mut doc.hero.title,
        HeroField::Tagline => &mut doc.hero.tagline,
        HeroField::Subtitle => &mut doc.hero.subtitle,
        HeroField::Cta => &mut doc.hero.cta,
    }
}

fn hero_slot_ref(doc: &ContentDocument, field: HeroField) -> &String {
    match field {
        HeroField::Title => &doc.hero.title,
        HeroField::Tagline => &doc.hero.tagline,
        HeroField::Subtitle => &doc.hero.subtitle,
        HeroField::Cta => &doc.hero.cta,
    }
}

fn contact_slot(doc: &mut ContentDocument, field: ContactField) -> &mut String {
    let contact = &mut doc.contact;
    match field {
        ContactField::Title => &mut contact.title,
        ContactField::Name => &mut contact.name,
        ContactField::Email => &mut contact.email,
        ContactField::Phone => &mut contact.phone,
        ContactField::Company => &mut contact.company,
        ContactField::Plan => &mut contact.plan,
        ContactField::Message => &mut contact.message,
    }
}

fn contact_slot_ref(doc: &ContentDocument, field: ContactField) -> &String {
    let contact = &doc.contact;
    match field {
        ContactField::Title => &contact.title,
        ContactField::Name => &contact.name,
        ContactField::Email => &contact.email,
        ContactField::Phone => &contact.phone,
        ContactField::Company => &contact.company,
        ContactField::Plan => &contact.plan,
        ContactField::Message => &contact.message,
    }
}
