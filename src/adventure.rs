//! Text adventure demo.
//!
//! All storytelling happens in an external generation service reached
//! through [`NarrativeGenerator`]. This module only builds prompts, turns a
//! story into an image prompt and substitutes fixed text when the service
//! returns nothing.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub const START_SYSTEM_PROMPT: &str = r#"You are a creative adventure game dungeon master. Create a rich, immersive text adventure game story in a fantasy world.

Your role is to:
1. Create an exciting opening scene for a fantasy adventure
2. Describe the environment vividly with sensory details
3. Introduce interesting characters, objects, and locations
4. Present clear choices and paths for the player
5. Keep the story engaging with plot hooks and mysteries
6. Respond to player actions with consequences and new discoveries

Style guidelines:
- Write 3-4 paragraphs for each scene
- Include descriptions of sights, sounds, and atmosphere
- End with hints about what the player can do
- Be creative with magical creatures and fantasy elements
- Make it feel like an epic adventure

IMPORTANT: You are writing a text adventure game. Do not include any meta-commentary about being an AI or game system. Just write the story creatively."#;

pub const START_USER_PROMPT: &str = "Start a new fantasy adventure. The player begins standing at the entrance of an ancient, mysterious dungeon. Describe the scene vividly.";

pub const ACTION_SYSTEM_PROMPT: &str = r#"You are a creative adventure game dungeon master running an immersive fantasy text adventure game.

Your role is to:
1. Respond naturally to player actions with consequences
2. Describe new environments vividly with sensory details
3. Introduce new challenges, puzzles, and discoveries
4. Reward creative thinking with interesting outcomes
5. Keep the story moving forward with plot developments
6. Maintain consistency with previous scenes
7. Create tension and excitement throughout the adventure

Style guidelines:
- Write 3-4 paragraphs for each response
- Describe what happens as a result of the player's action
- Include sights, sounds, smells, and atmosphere
- Introduce new elements to explore (items, NPCs, locations)
- End with hints about further actions or discoveries
- Be creative with magical effects and fantasy elements
- If the player's action doesn't make sense, describe the result or suggest alternate approaches
- Handle combat, exploration, interactions, puzzles with appropriate descriptions

IMPORTANT: Always stay in character as the adventure narrator. Never break the fourth wall or mention you're an AI. Just continue the story naturally based on their action."#;

pub const IMAGE_STYLE_SUFFIX: &str = "Pixel art style, fantasy video game scene, retro RPG aesthetic, 16-bit graphics, detailed game environment, magical atmosphere, cinematic view, game screenshot style, vibrant colors, digital art.";

/// Story used when the model answers the opening prompt with nothing.
pub const EMPTY_OPENING_STORY: &str = "The adventure begins...";

/// Story used when the model answers an action with nothing.
pub const EMPTY_ACTION_STORY: &str = "Something interesting happens...";

/// Returned alongside the error when the opening scene cannot be generated.
pub const OPENING_FALLBACK_STORY: &str = "You stand before an ancient stone dungeon entrance. Weathered vines climb the dark walls, and a mysterious blue light flickers from within. A weathered sign hangs nearby, but the words are worn away by time. The air is thick with the scent of adventure and danger. What do you do?";

/// Returned alongside the error when an action cannot be processed.
pub const ACTION_FALLBACK_STORY: &str = "As you take action, the dungeon seems to shift and change around you. Strange whispers echo through the corridors, and you sense that powerful magic is at work. You press forward, deeper into the unknown...";

const IMAGE_PROMPT_STORY_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("narrative generation is not configured")]
    Disabled,

    #[error("request to generation service failed: {0}")]
    Network(String),

    #[error("generation service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("unexpected response from generation service: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Rate limits, server errors and network failures may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Network(_) => true,
            GenerationError::Upstream { status, .. } => *status == 429 || *status >= 500,
            GenerationError::Disabled | GenerationError::InvalidResponse(_) => false,
        }
    }
}

/// A system instruction plus the player-facing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativePrompt {
    pub system: String,
    pub user: String,
}

impl NarrativePrompt {
    pub fn opening() -> Self {
        Self {
            system: START_SYSTEM_PROMPT.to_string(),
            user: START_USER_PROMPT.to_string(),
        }
    }

    pub fn action(previous_scene: &str, command: &str) -> Self {
        Self {
            system: ACTION_SYSTEM_PROMPT.to_string(),
            user: format!(
                "Previous scene: {}\n\nPlayer action: {}\n\nContinue the story based on this action. Describe what happens next.",
                previous_scene, command
            ),
        }
    }
}

/// Capability boundary to the external language and image models.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate_narrative(&self, prompt: &NarrativePrompt) -> Result<String, GenerationError>;

    /// Raw PNG bytes of a scene illustration.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GenerationError>;
}

/// Used when no API key is configured. Every call fails, so visitors get
/// the fallback story.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNarrator;

#[async_trait]
impl NarrativeGenerator for DisabledNarrator {
    async fn generate_narrative(&self, _prompt: &NarrativePrompt) -> Result<String, GenerationError> {
        Err(GenerationError::Disabled)
    }

    async fn generate_image(&self, _prompt: &str) -> Result<Vec<u8>, GenerationError> {
        Err(GenerationError::Disabled)
    }
}

/// One rendered step of the adventure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub story: String,
    /// `data:` URL of the illustration, empty if none could be generated
    pub image_url: String,
}

/// Image prompt: the opening of the story plus the fixed art style.
pub fn image_prompt(story: &str) -> String {
    let opening: String = story.chars().take(IMAGE_PROMPT_STORY_CHARS).collect();
    format!("{}. {}", opening, IMAGE_STYLE_SUFFIX)
}

pub fn image_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

pub async fn start(generator: &dyn NarrativeGenerator) -> Result<Scene, GenerationError> {
    info!("Starting a new adventure");
    play(generator, &NarrativePrompt::opening(), EMPTY_OPENING_STORY).await
}

pub async fn act(
    generator: &dyn NarrativeGenerator,
    previous_scene: &str,
    command: &str,
) -> Result<Scene, GenerationError> {
    info!("Adventure action ({} chars)", command.chars().count());
    let prompt = NarrativePrompt::action(previous_scene, command);
    play(generator, &prompt, EMPTY_ACTION_STORY).await
}

/// Generate the story, then try to illustrate it. A failed illustration
/// leaves the scene without an image.
async fn play(
    generator: &dyn NarrativeGenerator,
    prompt: &NarrativePrompt,
    empty_story: &str,
) -> Result<Scene, GenerationError> {
    let story = generator.generate_narrative(prompt).await?;
    let story = if story.trim().is_empty() {
        empty_story.to_string()
    } else {
        story
    };

    let image_url = match generator.generate_image(&image_prompt(&story)).await {
        Ok(png) => image_data_url(&png),
        Err(e) => {
            warn!("Scene illustration failed: {}", e);
            String::new()
        }
    };

    Ok(Scene { story, image_url })
}
