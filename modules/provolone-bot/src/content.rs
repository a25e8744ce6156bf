//! Post copy: preset posts, custom combinations, calls for recommendations
//! and verified-shop spotlights.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::store::VenueStore;

/// A generated post before publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub text: String,
    pub emoji: String,
}

impl PostDraft {
    fn new(text: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emoji: emoji.into(),
        }
    }

    /// The message as published: emoji, space, text.
    pub fn message(&self) -> String {
        format!("{} {}", self.emoji, self.text)
    }

    /// Prompt for the image providers, with hashtags and emoji dropped.
    pub fn image_prompt(&self) -> String {
        let scene: String = self
            .text
            .split_whitespace()
            .filter(|w| !w.starts_with('#'))
            .map(|w| w.chars().filter(|c| c.is_ascii()).collect::<String>())
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "Appetizing professional food photograph of a turkey and provolone sandwich, \
             natural light, shallow depth of field. Scene: {scene}"
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    Preset,
    Custom,
    ShopRecommendation,
    ShopFeature,
}

const POST_KINDS: &[PostKind] = &[
    PostKind::Preset,
    PostKind::Custom,
    PostKind::ShopRecommendation,
    PostKind::ShopFeature,
];

const PRESET_POSTS: &[(&str, &str)] = &[
    ("🦃 Today's special: Thick-cut turkey with aged provolone on fresh sourdough. Simple perfection! #TurkeyProvolone #Sandwich", "🥪"),
    ("Nothing beats the classic combo - premium turkey breast and creamy provolone. What's your go-to bread choice? 🍞", "🦃"),
    ("Pro tip: Let your provolone come to room temperature before assembling. It makes ALL the difference! 🧀✨", "💡"),
    ("Turkey and provolone with a touch of mayo, lettuce, and tomato. Sometimes the classics are classic for a reason! 🍅", "🥬"),
    ("Craving that perfect balance of savory turkey and mild, nutty provolone? You're in the right place! 😋", "🎯"),
    ("Fun fact: Provolone pairs with turkey because its buttery texture complements the lean protein perfectly! 🧠", "🤓"),
    ("Friday feeling: Grilled turkey and provolone panini. Crispy outside, melty inside. Pure bliss! 🔥", "🍳"),
    ("Weekend vibes: Turkey, provolone, avocado, and a drizzle of olive oil on ciabatta. Living the dream! 🥑", "🌟"),
    ("Cold turkey and provolone for lunch, or warm and melted? Tell us your preference in the comments! 💭", "🤔"),
    ("The secret ingredient in any great turkey and provolone? Love. And maybe a little mustard. 💛", "❤️"),
    ("Rainy day comfort food: Turkey and provolone grilled cheese with a side of tomato soup. Perfection! ☔", "🍲"),
    ("Monday motivation: Start your week with a perfectly balanced turkey and provolone on everything bagel! 💪", "🥯"),
    ("Sandwich science: The ideal turkey-to-provolone ratio is 3:1. Trust us, we've done the research! 📊", "🔬"),
    ("Throwback to simpler times when a turkey and provolone sandwich solved all of life's problems. Still does! 🕰️", "✨"),
];

const RECOMMENDATION_POSTS: &[(&str, &str)] = &[
    ("🏪 Local Love Alert! What's your favorite sandwich shop for turkey and provolone? Drop their name below! If your comment gets 5+ likes, we'll feature them! 👇", "❤️"),
    ("🗺️ Help us map the best turkey and provolone in town! Comment your go-to sandwich spot below. 5+ likes = instant feature! 🌟", "📍"),
    ("🏆 Sandwich Shop Spotlight time! Tell us about a local place that makes an amazing turkey and provolone. Community votes (5+ likes) get them featured! 🥪", "🎯"),
    ("🤝 Supporting local businesses one sandwich at a time! What shop in your area serves the best turkey and provolone? Let the community decide with likes! ❤️", "🏪"),
];

const BREADS: &[&str] = &[
    "sourdough", "ciabatta", "whole wheat", "rye", "focaccia", "kaiser roll", "everything bagel",
    "french bread", "pumpernickel",
];

const ADD_ONS: &[&str] = &[
    "crisp lettuce", "ripe tomatoes", "red onion", "pickles", "avocado", "sprouts",
    "roasted red peppers", "cucumber",
];

const CONDIMENTS: &[&str] = &[
    "mayo", "mustard", "pesto", "olive oil", "balsamic glaze", "herb aioli", "honey mustard",
    "chipotle mayo",
];

/// Spotlights need a list worth choosing from.
const MIN_VENUES_FOR_SPOTLIGHT: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentGenerator;

impl ContentGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Pick a post kind at random and draft it.
    pub fn draft<R: Rng + ?Sized>(&self, rng: &mut R, store: &VenueStore) -> PostDraft {
        let kind = POST_KINDS.choose(rng).copied().unwrap_or(PostKind::Preset);
        self.draft_kind(kind, rng, store)
    }

    /// Draft a specific kind. A spotlight with too few venues, or with no
    /// verified venue, falls back to a custom post.
    pub fn draft_kind<R: Rng + ?Sized>(
        &self,
        kind: PostKind,
        rng: &mut R,
        store: &VenueStore,
    ) -> PostDraft {
        match kind {
            PostKind::Preset => pick_pair(PRESET_POSTS, rng),
            PostKind::ShopRecommendation => pick_pair(RECOMMENDATION_POSTS, rng),
            PostKind::ShopFeature => match spotlight(rng, store) {
                Some(draft) => draft,
                None => custom(rng),
            },
            PostKind::Custom => custom(rng),
        }
    }
}

fn pick_pair<R: Rng + ?Sized>(table: &[(&str, &str)], rng: &mut R) -> PostDraft {
    let (text, emoji) = table.choose(rng).copied().unwrap_or(PRESET_POSTS[0]);
    PostDraft::new(text, emoji)
}

fn pick<'t, R: Rng + ?Sized>(table: &[&'t str], rng: &mut R) -> &'t str {
    table.choose(rng).copied().unwrap_or_default()
}

fn spotlight<R: Rng + ?Sized>(rng: &mut R, store: &VenueStore) -> Option<PostDraft> {
    if store.len() < MIN_VENUES_FOR_SPOTLIGHT {
        return None;
    }
    let verified: Vec<_> = store.verified().collect();
    let shop = verified.choose(rng)?;
    Some(PostDraft::new(
        format!(
            "🌟 Sandwich Shop Spotlight: {} in {}! Known for their {}. Have you tried them? Let us know in the comments! 🥪",
            shop.name,
            shop.location,
            shop.specialty.to_lowercase()
        ),
        "👑",
    ))
}

fn custom<R: Rng + ?Sized>(rng: &mut R) -> PostDraft {
    let bread = pick(BREADS, rng);
    let add_on = pick(ADD_ONS, rng);
    let condiment = pick(CONDIMENTS, rng);

    let drafts = [
        PostDraft::new(
            format!("🥪 Today's creation: Turkey and provolone on {bread} with {add_on} and {condiment}. What would you add?"),
            "🤤",
        ),
        PostDraft::new(
            format!("Experimenting with turkey and provolone on {bread}. The {condiment} really makes it pop! 🎉"),
            "👨‍🍳",
        ),
        PostDraft::new(
            format!("Sometimes you need that perfect {bread} base for your turkey and provolone. Add some {add_on} and you're golden! ✨"),
            "🏆",
        ),
    ];
    let idx = rng.random_range(0..drafts.len());
    drafts[idx].clone()
}
