mod common;

use choreo_core::buffer::FieldBuilder;
use choreo_core::config::{Palette, TreeConfig};
use choreo_core::shapes::text::{sample_text, sample_text_lines};
use choreo_core::shapes::tree::generate_tree;
use choreo_core::units::MainField;
use choreo_core::{ChoreographyUnit, ParticleKind};
use common::{small_config, BlockGlyphs};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_text_to_tree_handoff() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(2024);
    let text = sample_text_lines(&mut BlockGlyphs, &["Merry", "Christmas"], &config.text, &mut rng);
    let tree = generate_tree(1_000, &TreeConfig::default(), &mut rng);

    let field = FieldBuilder::new()
        .start(&text.positions)
        .end(&tree)
        .build(&Palette::default(), &mut rng);

    assert!(!text.is_empty());
    assert_eq!(field.count(), text.len().max(tree.len()));
    for (i, kind) in field.kind().iter().enumerate() {
        let expected = if i < text.len() {
            ParticleKind::Active
        } else {
            ParticleKind::Padding
        };
        assert_eq!(*kind, expected, "particle {}", i);
    }
    assert_eq!(&field.position_start()[..text.len()], &text.positions[..]);
}

#[test]
fn test_padding_hides_inside_target() {
    let mut rng = StdRng::seed_from_u64(8);
    let start = vec![Vec3::ZERO; 10];
    let end: Vec<Vec3> = (0..40).map(|i| Vec3::new(i as f32, 5.0, 0.0)).collect();
    let field = FieldBuilder::new()
        .start(&start)
        .end(&end)
        .padding_jitter(0.05)
        .build(&Palette::default(), &mut rng);

    for i in 10..40 {
        assert_eq!(field.position_end()[i], end[i]);
        assert!((field.position_start()[i] - end[i]).length() < 0.1);
    }
}

#[test]
fn test_short_target_is_cycled_for_padding() {
    let mut rng = StdRng::seed_from_u64(8);
    let start = vec![Vec3::ZERO; 30];
    let end = vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, -2.0, -3.0)];
    let field = FieldBuilder::new()
        .start(&start)
        .end(&end)
        .build(&Palette::default(), &mut rng);
    assert_eq!(field.count(), 30);
    for i in 2..30 {
        assert!((field.position_end()[i] - end[i % 2]).length() < 0.1);
    }
}

#[test]
fn test_min_count_and_empty_shapes() {
    let mut rng = StdRng::seed_from_u64(4);
    let field = FieldBuilder::new()
        .min_count(64)
        .fallback_extent(Vec3::splat(2.0))
        .build(&Palette::default(), &mut rng);
    assert_eq!(field.count(), 64);
    assert_eq!(field.active_count(), 0);
    for p in field.position_end() {
        assert!(p.abs().cmple(Vec3::splat(1.0 + 1e-4)).all());
    }
}

#[test]
fn test_seeds_sizes_colors_well_formed() {
    let mut rng = StdRng::seed_from_u64(6);
    let pts = vec![Vec3::ONE; 200];
    let palette = Palette::default();
    let field = FieldBuilder::new().start(&pts).end(&pts).build(&palette, &mut rng);
    let lo = 1.0 - palette.size_variance * 0.5;
    let hi = 1.0 + palette.size_variance * 0.5;
    for i in 0..field.count() {
        assert!((0.0..1.0).contains(&field.random_seed()[i]));
        assert!(field.size()[i] >= lo - 1e-5 && field.size()[i] <= hi + 1e-5);
        assert_eq!(field.color()[i], palette.color_for(field.random_seed()[i]));
    }
}

#[test]
fn test_count_invariant_across_text_changes() {
    let config = small_config();
    let mut rng = StdRng::seed_from_u64(12);
    let text = sample_text(&mut BlockGlyphs, "Merry", &config.text, &mut rng);
    let mut unit = MainField::new(&text, &config, &mut rng);
    let count = unit.choreography().field().count();

    for (i, line) in ["", "Merry Christmas and a Happy New Year", "Hi", "Christmas"]
        .iter()
        .enumerate()
    {
        let mut text_config = config.text.clone();
        text_config.world_width = 2.0 + i as f32 * 3.0;
        let text = sample_text(&mut BlockGlyphs, line, &text_config, &mut rng);
        unit.rebuild_text(&text, &mut rng);
        let field = unit.choreography().field();
        assert_eq!(field.count(), count, "after {:?}", line);
        assert_eq!(field.active_count(), text.len().min(count));
    }
}

#[test]
fn test_recolor_only_touches_color() {
    let mut rng = StdRng::seed_from_u64(6);
    let pts: Vec<Vec3> = (0..50).map(|i| Vec3::splat(i as f32)).collect();
    let mut field = FieldBuilder::new()
        .start(&pts)
        .end(&pts)
        .build(&Palette::default(), &mut rng);
    let before = field.clone();
    let palette = Palette {
        colors: vec![[0.2, 0.4, 0.8]],
        ..Palette::default()
    };
    field.recolor(&palette);
    assert_eq!(field.position_start(), before.position_start());
    assert_eq!(field.position_end(), before.position_end());
    assert_eq!(field.size(), before.size());
    assert_eq!(field.random_seed(), before.random_seed());
    for c in field.color() {
        assert!((c.y / c.x - 2.0).abs() < 1e-4);
    }
}
