use once_cell::sync::Lazy;

use super::manifest::{ToolManifest, ToolPort};

pub const GENERATE_FROM_TEXT: &str = "generate_image_from_text";
pub const GENERATE_FROM_IMAGE: &str = "generate_image_from_image";

pub const PROMPT: &str = "prompt";
pub const INPUT_IMAGE_PATH: &str = "input_image_path";

static TOOLS: Lazy<Vec<ToolManifest>> = Lazy::new(|| {
    vec![
        ToolManifest::builder(GENERATE_FROM_TEXT)
            .description(
                "Generate an image from a text prompt using Gemini 2.5 Flash Image. \
                 Returns only the file path.",
            )
            .input(
                ToolPort::new(PROMPT)
                    .with_description("Text description of the image to generate")
                    .required(),
            )
            .build(),
        ToolManifest::builder(GENERATE_FROM_IMAGE)
            .description(
                "Generate a new image from an input image and a text prompt using \
                 Gemini 2.5 Flash Image. Returns only the file path.",
            )
            .input(
                ToolPort::new(INPUT_IMAGE_PATH)
                    .with_description("Path to the input image file (supports ~ for home directory)")
                    .required(),
            )
            .input(
                ToolPort::new(PROMPT)
                    .with_description("Text description of how to transform the input image")
                    .required(),
            )
            .build(),
    ]
});

/// Static catalogue of the tools this server exposes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToolRegistry;

impl ToolRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn list_tools(&self) -> &'static [ToolManifest] {
        TOOLS.as_slice()
    }

    pub fn manifest(&self, name: &str) -> Option<&'static ToolManifest> {
        TOOLS.iter().find(|manifest| manifest.name == name)
    }
}
