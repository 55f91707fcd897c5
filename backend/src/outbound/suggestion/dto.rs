//! Wire types for the `generate` endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct GenerateRequestDto<'a> {
    pub(super) model: &'a str,
    pub(super) prompt: String,
    pub(super) max_tokens: u32,
    pub(super) temperature: f32,
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateResponseDto {
    #[serde(default)]
    pub(super) generations: Vec<GenerationDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerationDto {
    pub(super) text: String,
}

impl GenerateResponseDto {
    pub(super) fn into_first_text(self) -> Option<String> {
        self.generations
            .into_iter()
            .next()
            .map(|generation| generation.text)
    }
}
