use choreo_core::config::Palette;
use choreo_core::render::{pack_particles, FrameUniforms, GpuParticle};
use choreo_core::units::{ChoreographyUnit, Halo};
use choreo_core::{ChoreoConfig, ConfigError, Phase};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_defaults_match_tuned_values() {
    let config = ChoreoConfig::default();
    assert_eq!(config.tree.height_bias, 1.8);
    assert_eq!(config.tree.surface_fraction, 0.75);
    assert_eq!(config.text.alpha_threshold, 128);
    assert_eq!(config.damping.explosion, 1.2);
    assert!(config.spiral.turns >= 1);
    assert_eq!(config.validate(), Ok(()));
}

fn assert_rejected(mutate: fn(&mut ChoreoConfig), expected: ConfigError) {
    let mut config = ChoreoConfig::default();
    mutate(&mut config);
    assert_eq!(config.validate(), Err(expected));
}

#[test]
fn test_validate_reports_each_field() {
    assert_rejected(|c| c.tree.height = -1.0, ConfigError::TreeHeight(-1.0));
    assert_rejected(|c| c.tree.layers = 0, ConfigError::TreeLayers);
    assert_rejected(|c| c.tree.surface_fraction = 1.5, ConfigError::SurfaceFraction(1.5));
    assert_rejected(|c| c.spiral.turns = 0, ConfigError::SpiralTurns);
    assert_rejected(|c| c.text.world_width = 0.0, ConfigError::TextWidth(0.0));
    assert_rejected(|c| c.text.font_size = -4.0, ConfigError::FontSize(-4.0));
    assert_rejected(
        |c| c.damping.reset = 0.0,
        ConfigError::Damping { name: "reset", value: 0.0 },
    );
    assert_rejected(|c| c.palette.colors.clear(), ConfigError::PaletteSize(0));
    assert_rejected(
        |c| c.palette.colors = vec![[1.0; 3]; 4],
        ConfigError::PaletteSize(4),
    );
    assert_rejected(
        |c| c.explosion.fade_start = 0.96,
        ConfigError::FadeWindow { start: 0.96, end: 0.95 },
    );
}

#[test]
fn test_uniform_colors_pad_to_three() {
    let palette = Palette {
        colors: vec![[0.5, 0.25, 0.0]],
        ..Palette::default()
    };
    let colors = palette.uniform_colors();
    assert_eq!(colors[0], [0.5, 0.25, 0.0, 1.0]);
    assert_eq!(colors[1], [1.0; 4]);
    let u = FrameUniforms::new(2.0, Phase::Settled, 1.0, 0.0, 0.1, &palette);
    assert_eq!(u.color_count, 1);
    assert_eq!(u.phase_id, Phase::Settled.id());
}

#[test]
fn test_packed_buffer_mirrors_field() {
    let mut config = ChoreoConfig::default();
    config.budget.halo = 50;
    let mut rng = StdRng::seed_from_u64(31);
    let halo = Halo::new(&config, &mut rng);
    let field = halo.choreography().field();

    let mut out = vec![GpuParticle::default(); 3];
    pack_particles(field, &mut out);
    assert_eq!(out.len(), 50);
    for (i, p) in out.iter().enumerate() {
        assert_eq!(p.position_start, field.position_start()[i].to_array());
        assert_eq!(p.position_end, field.position_end()[i].to_array());
        assert_eq!(p.spiral, field.spiral()[i]);
        assert_eq!(p.random_seed, field.random_seed()[i]);
        assert_eq!(p.kind, field.kind()[i] as u32);
    }
    let bytes: &[u8] = bytemuck::cast_slice(&out);
    assert_eq!(bytes.len(), 50 * 64);
}

#[cfg(feature = "serde")]
#[test]
fn test_partial_json_fills_defaults() {
    let json = r#"{ "tree": { "height": 9.0 }, "spiral": { "turns": 3 } }"#;
    let config: ChoreoConfig = match serde_json::from_str(json) {
        Ok(config) => config,
        Err(e) => panic!("parse failed: {}", e),
    };
    assert_eq!(config.tree.height, 9.0);
    assert_eq!(config.tree.base_radius, ChoreoConfig::default().tree.base_radius);
    assert_eq!(config.spiral.turns, 3);
    assert_eq!(config.validate(), Ok(()));
}
