//! Embed options passed to the player on creation.

use ytclip_models::{ClipRange, Theme};

/// Options understood by the embed API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedOptions {
    pub autoplay: bool,
    /// Transport controls are hidden while previewing a clip.
    pub show_controls: bool,
    pub modest_branding: bool,
    pub suppress_related: bool,
    /// Initial seek target in whole seconds.
    pub start_offset: u64,
    pub theme: Theme,
}

impl EmbedOptions {
    /// Options for a free-playback (`clip == None`) or clip-preview session.
    pub fn for_session(clip: Option<&ClipRange>, theme: Theme) -> Self {
        Self {
            autoplay: true,
            show_controls: clip.is_none(),
            modest_branding: true,
            suppress_related: true,
            start_offset: clip.map(|c| c.start_secs()).unwrap_or(0),
            theme,
        }
    }

    /// Options as embed `playerVars`.
    pub fn player_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("autoplay", u8::from(self.autoplay).to_string()),
            ("controls", u8::from(self.show_controls).to_string()),
            ("modestbranding", u8::from(self.modest_branding).to_string()),
            ("rel", u8::from(!self.suppress_related).to_string()),
            ("start", self.start_offset.to_string()),
            ("theme", self.theme.as_str().to_string()),
        ]
    }
}
