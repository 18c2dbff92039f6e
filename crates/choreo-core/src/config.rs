use glam::Vec3;

use crate::error::ConfigError;
use crate::math::{fract, hash11};

/// Shared configuration for every choreography unit in a scene.
///
/// Sibling units read tree dimensions, spiral turns and damping speeds from
/// here rather than keeping their own copies, so they stay consistent.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChoreoConfig {
    pub tree: TreeConfig,
    pub spiral: SpiralConfig,
    pub damping: DampingConfig,
    pub durations: PhaseDurations,
    pub text: TextConfig,
    pub explosion: ExplosionConfig,
    pub snow: SnowConfig,
    pub budget: BudgetConfig,
    pub interaction: InteractionConfig,
    pub palette: Palette,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    pub height: f32,
    pub base_radius: f32,
    /// Number of branch tiers.
    pub layers: u32,
    /// World Y of the tree base.
    pub base_y: f32,
    /// Share of particles placed on the tier surface.
    pub surface_fraction: f32,
    /// Exponent of the bottom-heavy height distribution.
    pub height_bias: f32,
    /// Exponent of the in-tier radius falloff.
    pub tier_curve: f32,
    /// Radius at the top of a tier relative to the cone envelope there.
    pub tier_taper: f32,
    /// Downward sag at full outward distance.
    pub droop: f32,
    pub jitter: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            height: 7.0,
            base_radius: 2.8,
            layers: 7,
            base_y: -3.5,
            surface_fraction: 0.75,
            height_bias: 1.8,
            tier_curve: 0.8,
            tier_taper: 0.55,
            droop: 0.35,
            jitter: 0.04,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpiralConfig {
    /// Whole turns around the tree. Integral so the helix ends line up.
    pub turns: u32,
    /// Distance from the cone envelope to the halo.
    pub radius_offset: f32,
    /// Spiral parameter consumed per second.
    pub ascent_speed: f32,
    /// Radians per second the whole halo spins.
    pub rotation_speed: f32,
    /// `k` of the fade-in/fade-out windows.
    pub fade_sharpness: f32,
    pub flicker_base: f32,
    pub flicker_amplitude: f32,
    pub flicker_frequency: f32,
    /// Magnitude of the offsets rerolled when a particle respawns.
    pub respawn_jitter: f32,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            turns: 5,
            radius_offset: 0.35,
            ascent_speed: 0.06,
            rotation_speed: 0.25,
            fade_sharpness: 8.0,
            flicker_base: 0.75,
            flicker_amplitude: 0.25,
            flicker_frequency: 3.0,
            respawn_jitter: 0.08,
        }
    }
}

/// Exponential decay rates (per second).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DampingConfig {
    pub explosion: f32,
    pub reset: f32,
    pub entrance: f32,
}

impl Default for DampingConfig {
    fn default() -> Self {
        Self {
            explosion: 1.2,
            reset: 2.0,
            entrance: 2.4,
        }
    }
}

/// Duration hints in seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhaseDurations {
    pub entrance: f32,
    pub morph: f32,
    pub explosion: f32,
    pub reform: f32,
    pub halo_fade: f32,
    pub snow_fade: f32,
    pub celebration_form: f32,
    pub celebration_hold: f32,
    pub celebration_disperse: f32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            entrance: 2.5,
            morph: 3.0,
            explosion: 3.5,
            reform: 2.5,
            halo_fade: 1.5,
            snow_fade: 2.0,
            celebration_form: 2.0,
            celebration_hold: 3.0,
            celebration_disperse: 2.5,
        }
    }
}

impl PhaseDurations {
    fn iter(&self) -> [(&'static str, f32); 9] {
        [
            ("entrance", self.entrance),
            ("morph", self.morph),
            ("explosion", self.explosion),
            ("reform", self.reform),
            ("halo_fade", self.halo_fade),
            ("snow_fade", self.snow_fade),
            ("celebration_form", self.celebration_form),
            ("celebration_hold", self.celebration_hold),
            ("celebration_disperse", self.celebration_disperse),
        ]
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextConfig {
    /// Lines of the main field's greeting.
    pub lines: Vec<String>,
    /// Lines of the celebration burst.
    pub celebration_lines: Vec<String>,
    /// Bitmap font size in pixels.
    pub font_size: f32,
    /// Pixel stride of the bitmap scan.
    pub density: u32,
    /// World width of the widest line.
    pub world_width: f32,
    /// Line pitch as a multiple of the font size.
    pub line_spacing: f32,
    /// World Y the text block is centered on.
    pub y_offset: f32,
    /// Alpha above which a sampled pixel becomes a particle.
    pub alpha_threshold: u8,
    /// Z thickness of the sampled text.
    pub depth: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            lines: vec!["Merry".to_string(), "Christmas".to_string()],
            celebration_lines: vec!["Happy".to_string(), "Holidays".to_string()],
            font_size: 96.0,
            density: 4,
            world_width: 8.0,
            line_spacing: 1.2,
            y_offset: 0.0,
            alpha_threshold: 128,
            depth: 0.3,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExplosionConfig {
    /// Multiplier on global progress before the per-particle delay.
    pub scale: f32,
    pub noise_weight: f32,
    pub height_weight: f32,
    /// Erode from the top of the tree down instead of bottom up.
    pub top_first: bool,
    pub upward_force: f32,
    /// Outward travel at full local progress.
    pub spread: f32,
    pub fade_start: f32,
    pub fade_end: f32,
    /// Scatter intensity while drifting as dust.
    pub drift_scatter: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            scale: 1.6,
            noise_weight: 0.3,
            height_weight: 0.5,
            top_first: true,
            upward_force: 4.0,
            spread: 3.0,
            fade_start: 0.55,
            fade_end: 0.95,
            drift_scatter: 0.6,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SnowConfig {
    /// Size of the box flakes fall through, centered on `center`.
    pub extent: Vec3,
    pub center: Vec3,
    pub fall_speed: f32,
    pub sway: f32,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            extent: Vec3::new(14.0, 12.0, 14.0),
            center: Vec3::new(0.0, 1.0, 0.0),
            fall_speed: 0.6,
            sway: 0.3,
        }
    }
}

/// Particle counts per unit. The integration layer caps these to what the
/// device can draw.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BudgetConfig {
    pub tree: usize,
    pub halo: usize,
    pub snow: usize,
    /// Lower bound on the celebration field when its text samples sparsely.
    pub celebration_min: usize,
    /// Radius of the scatter shell the celebration text forms from.
    pub shell_radius: f32,
    pub shell_thickness: f32,
    /// Scatter intensity peak during dispersal and entrance convergence.
    pub scatter_peak: f32,
    /// Scatter intensity while shapes hold still.
    pub idle_scatter: f32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            tree: 12_000,
            halo: 1_500,
            snow: 1_200,
            celebration_min: 2_000,
            shell_radius: 6.0,
            shell_thickness: 1.5,
            scatter_peak: 0.8,
            idle_scatter: 0.03,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InteractionConfig {
    /// Seconds without pointer input before the scene counts as idle.
    pub idle_timeout: f32,
    /// Radians of rotation per unit of horizontal drag (NDC).
    pub drag_sensitivity: f32,
    /// Decay rate of the post-release spin.
    pub rotation_damping: f32,
    /// Radians per second while idle.
    pub auto_rotate_speed: f32,
    /// Spring stiffness of the hover glow.
    pub hover_stiffness: f32,
    /// Fractional base-size boost at full hover.
    pub hover_size_boost: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: 8.0,
            drag_sensitivity: 3.0,
            rotation_damping: 3.0,
            auto_rotate_speed: 0.15,
            hover_stiffness: 10.0,
            hover_size_boost: 0.25,
        }
    }
}

/// One to three colors plus the size hints shared by every field.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Palette {
    pub colors: Vec<[f32; 3]>,
    pub base_size: f32,
    /// Relative spread of per-particle size around 1.0.
    pub size_variance: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![[1.0, 0.84, 0.45], [0.35, 0.9, 0.55], [1.0, 0.35, 0.4]],
            base_size: 0.08,
            size_variance: 0.6,
        }
    }
}

impl Palette {
    /// Pick a color for a particle from its stable seed.
    ///
    /// Depends only on the seed, so a palette change recolors every particle
    /// without touching any other attribute.
    pub fn color_for(&self, seed: f32) -> Vec3 {
        if self.colors.is_empty() {
            return Vec3::ONE;
        }
        let n = self.colors.len();
        let idx = ((seed * n as f32) as usize).min(n - 1);
        let shade = 0.85 + 0.3 * fract(hash11(seed * 977.0));
        Vec3::from_array(self.colors[idx]) * shade
    }

    /// Colors padded to three entries for the uniform block.
    pub fn uniform_colors(&self) -> [[f32; 4]; 3] {
        let mut out = [[1.0; 4]; 3];
        for (slot, c) in out.iter_mut().zip(self.colors.iter()) {
            *slot = [c[0], c[1], c[2], 1.0];
        }
        out
    }
}

impl ChoreoConfig {
    /// Reject values the core does not sanitize itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tree = &self.tree;
        if !(tree.height > 0.0) {
            return Err(ConfigError::TreeHeight(tree.height));
        }
        if !(tree.base_radius > 0.0) {
            return Err(ConfigError::TreeRadius(tree.base_radius));
        }
        if tree.layers == 0 {
            return Err(ConfigError::TreeLayers);
        }
        if !(0.0..=1.0).contains(&tree.surface_fraction) {
            return Err(ConfigError::SurfaceFraction(tree.surface_fraction));
        }
        if self.spiral.turns == 0 {
            return Err(ConfigError::SpiralTurns);
        }
        if self.text.density == 0 {
            return Err(ConfigError::TextDensity);
        }
        if !(self.text.world_width > 0.0) {
            return Err(ConfigError::TextWidth(self.text.world_width));
        }
        if !(self.text.font_size > 0.0) {
            return Err(ConfigError::FontSize(self.text.font_size));
        }
        for (name, value) in self.durations.iter() {
            if !(value > 0.0) {
                return Err(ConfigError::Duration { name, value });
            }
        }
        for (name, value) in [
            ("explosion", self.damping.explosion),
            ("reset", self.damping.reset),
            ("entrance", self.damping.entrance),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::Damping { name, value });
            }
        }
        let n = self.palette.colors.len();
        if !(1..=3).contains(&n) {
            return Err(ConfigError::PaletteSize(n));
        }
        let (start, end) = (self.explosion.fade_start, self.explosion.fade_end);
        if !(0.0 <= start && start < end && end <= 1.0) {
            return Err(ConfigError::FadeWindow { start, end });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ChoreoConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let mut config = ChoreoConfig::default();
        config.durations.morph = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Duration { name: "morph", value: 0.0 })
        );
    }

    #[test]
    fn test_validate_rejects_nan_radius() {
        let mut config = ChoreoConfig::default();
        config.tree.base_radius = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::TreeRadius(_))));
    }

    #[test]
    fn test_palette_color_depends_on_seed_only() {
        let palette = Palette::default();
        assert_eq!(palette.color_for(0.3), palette.color_for(0.3));
        let c = palette.color_for(0.999);
        assert!(c.is_finite());
    }

    #[test]
    fn test_uniform_colors_pad_to_three() {
        let palette = Palette {
            colors: vec![[0.2, 0.4, 0.6]],
            ..Palette::default()
        };
        let colors = palette.uniform_colors();
        assert_eq!(colors[0], [0.2, 0.4, 0.6, 1.0]);
        assert_eq!(colors[2], [1.0, 1.0, 1.0, 1.0]);
    }
}
