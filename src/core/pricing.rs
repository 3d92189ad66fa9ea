use serde::Serialize;
use serde_json::json;

use crate::core::models::entry::Metadata;

/// A priced usage event, recorded with `UsageLedger::record_charge`. Prices are
/// approximations; unknown models fall back to the helper's default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charge {
    pub service: String,
    pub operation: String,
    pub cost_usd: f64,
    pub metadata: Metadata,
}

impl Charge {
    fn new(service: &str, operation: &str, cost_usd: f64, metadata: serde_json::Value) -> Self {
        Self {
            service: service.to_string(),
            operation: operation.to_string(),
            cost_usd,
            metadata: metadata.as_object().cloned().unwrap_or_default(),
        }
    }
}

/// A flat price for one named model.
#[derive(Debug, Clone)]
pub struct ModelPrice {
    pub model: &'static str,
    pub price: f64,
}

/// Per-model price table with a fallback for unrecognized names.
#[derive(Debug)]
pub struct PriceTable {
    pub entries: &'static [ModelPrice],
    pub default_price: f64,
}

impl PriceTable {
    pub fn lookup(&self, model: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|p| p.model == model)
            .map(|p| p.price)
    }

    pub fn price_for(&self, model: &str) -> f64 {
        self.lookup(model).unwrap_or(self.default_price)
    }
}

/// OpenAI, dollars per 1K tokens (dall-e-3 is per image).
pub static OPENAI: PriceTable = PriceTable {
    entries: &[
        ModelPrice { model: "gpt-4", price: 0.03 },
        ModelPrice { model: "gpt-4-turbo", price: 0.01 },
        ModelPrice { model: "gpt-3.5-turbo", price: 0.0015 },
        ModelPrice { model: "dall-e-3", price: 0.04 },
    ],
    default_price: 0.01,
};

/// fal.ai image models, dollars per image.
pub static FAL_IMAGE: PriceTable = PriceTable {
    entries: &[
        ModelPrice { model: "flux-dev", price: 0.003 },
        ModelPrice { model: "flux-pro", price: 0.05 },
        ModelPrice { model: "stable-diffusion-xl", price: 0.002 },
    ],
    default_price: 0.003,
};

/// fal.ai video models, dollars per clip.
pub static FAL_VIDEO: PriceTable = PriceTable {
    entries: &[
        ModelPrice { model: "runway-gen3", price: 0.50 },
        ModelPrice { model: "luma", price: 0.30 },
        ModelPrice { model: "kling", price: 0.40 },
    ],
    default_price: 0.50,
};

/// Gemini image models. Free during preview.
pub static GEMINI_IMAGE: PriceTable = PriceTable {
    entries: &[
        ModelPrice { model: "gemini-2.5-flash-image", price: 0.0 },
        ModelPrice { model: "gemini-3-pro-image-preview", price: 0.0 },
    ],
    default_price: 0.0,
};

pub const ELEVENLABS_PER_1K_CHARS: f64 = 0.30;
pub const BROWSER_USE_CLOUD_SESSION: f64 = 0.50;
pub const HEYGEN_PER_SECOND: f64 = 0.05;
/// Runway Gen-3 bills per 5-second unit.
pub const RUNWAY_PER_5_SECONDS: f64 = 0.50;
/// Suno bills per 30-second unit.
pub const SUNO_PER_30_SECONDS: f64 = 0.10;

const EXA_QUERY_LIMIT: usize = 100;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
pub const DEFAULT_FAL_IMAGE_MODEL: &str = "flux-dev";
pub const DEFAULT_FAL_VIDEO_MODEL: &str = "runway-gen3";
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_HEYGEN_MODEL: &str = "talking_photo";
pub const DEFAULT_RUNWAY_MODEL: &str = "gen3";

pub fn openai(operation: &str, tokens: u64, model: Option<&str>) -> Charge {
    let model = model.unwrap_or(DEFAULT_OPENAI_MODEL);
    let cost = (tokens as f64 / 1000.0) * OPENAI.price_for(model);
    Charge::new(
        "OpenAI",
        operation,
        cost,
        json!({ "model": model, "tokens": tokens }),
    )
}

pub fn fal_image(prompt: &str, model: Option<&str>) -> Charge {
    let model = model.unwrap_or(DEFAULT_FAL_IMAGE_MODEL);
    Charge::new(
        "fal.ai (Images)",
        "image_generation",
        FAL_IMAGE.price_for(model),
        json!({ "model": model, "prompt_length": prompt.chars().count() }),
    )
}

pub fn fal_video(prompt: &str, model: Option<&str>) -> Charge {
    let model = model.unwrap_or(DEFAULT_FAL_VIDEO_MODEL);
    Charge::new(
        "fal.ai (Video)",
        "video_generation",
        FAL_VIDEO.price_for(model),
        json!({ "model": model, "prompt_length": prompt.chars().count() }),
    )
}

pub fn elevenlabs(characters: u64) -> Charge {
    let cost = (characters as f64 / 1000.0) * ELEVENLABS_PER_1K_CHARS;
    Charge::new(
        "ElevenLabs",
        "text_to_speech",
        cost,
        json!({ "characters": characters }),
    )
}

/// Exa search is on the free tier. The query is kept, truncated.
pub fn exa_search(query: &str) -> Charge {
    let query: String = query.chars().take(EXA_QUERY_LIMIT).collect();
    Charge::new("Exa MCP", "web_search", 0.0, json!({ "query": query }))
}

pub fn browser_use(cloud_mode: bool) -> Charge {
    let (operation, cost) = if cloud_mode {
        ("cloud_session", BROWSER_USE_CLOUD_SESSION)
    } else {
        ("local_session", 0.0)
    };
    Charge::new(
        "Browser-Use",
        operation,
        cost,
        json!({ "cloud_mode": cloud_mode }),
    )
}

pub fn gemini_image(prompt: &str, model: Option<&str>) -> Charge {
    let model = model.unwrap_or(DEFAULT_GEMINI_IMAGE_MODEL);
    Charge::new(
        "Gemini (Nano Banana)",
        "image_generation",
        GEMINI_IMAGE.price_for(model),
        json!({ "model": model, "prompt_length": prompt.chars().count() }),
    )
}

pub fn heygen_video(duration_seconds: u64, model: Option<&str>) -> Charge {
    let model = model.unwrap_or(DEFAULT_HEYGEN_MODEL);
    Charge::new(
        "HeyGen",
        "video_generation",
        duration_seconds as f64 * HEYGEN_PER_SECOND,
        json!({ "duration_seconds": duration_seconds, "model": model }),
    )
}

pub fn runway_video(duration_seconds: u64, model: Option<&str>) -> Charge {
    let model = model.unwrap_or(DEFAULT_RUNWAY_MODEL);
    Charge::new(
        "Runway",
        "video_generation",
        (duration_seconds as f64 / 5.0) * RUNWAY_PER_5_SECONDS,
        json!({ "duration_seconds": duration_seconds, "model": model }),
    )
}

pub fn suno_music(duration_seconds: u64) -> Charge {
    Charge::new(
        "Suno",
        "music_generation",
        (duration_seconds as f64 / 30.0) * SUNO_PER_30_SECONDS,
        json!({ "duration_seconds": duration_seconds }),
    )
}
