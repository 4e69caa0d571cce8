//! # Particle Field Properties
//!
//! Invariants every effect relies on:
//!
//! 1. **Fade**: opacity never increases with age and is gone by end of life
//! 2. **Capacity**: no sequence of spawns exceeds the configured maximum
//! 3. **Tick splitting**: `tick(a); tick(b)` ages like `tick(a + b)`
//! 4. **Bounce**: nothing escapes a bounded viewport
//! 5. **Expiry**: a 100 s particle is gone after 101 unit ticks
//!
//! Run with: cargo test --package vanguard_fx --test particle_properties

use proptest::prelude::*;
use vanguard_fx::{Boundary, Fade, Particle, ParticleConfig, ParticleField, Vec2, Viewport};

fn fade_strategy() -> impl Strategy<Value = Fade> {
    prop_oneof![
        Just(Fade::Linear),
        (0.0f32..=1.0).prop_map(|fraction| Fade::Hold { fraction }),
    ]
}

proptest! {
    #[test]
    fn opacity_is_non_increasing_and_ends_at_zero(
        lifetime in 0.01f32..1000.0,
        opacity in 0.0f32..=1.0,
        fade in fade_strategy(),
        a in 0.0f32..=1.0,
        b in 0.0f32..=1.0,
    ) {
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let mut particle = Particle::new(Vec2::ZERO, Vec2::ZERO, lifetime)
            .with_opacity(opacity)
            .with_fade(fade);

        particle.age = early * lifetime;
        let first = particle.current_opacity();
        particle.age = late * lifetime;
        let second = particle.current_opacity();
        prop_assert!(second <= first + 1e-6, "{first} -> {second}");

        particle.age = lifetime;
        prop_assert!(particle.current_opacity() <= 0.0);
    }

    #[test]
    fn spawns_never_exceed_capacity(
        capacity in 0usize..64,
        bursts in prop::collection::vec((0u32..40, 0.0f32..500.0, 0.0f32..500.0), 1..30),
    ) {
        let mut field = ParticleField::new(capacity);
        for (count, x, y) in bursts {
            let config = ParticleConfig { spawn_count: count, ..ParticleConfig::default() };
            field.spawn(Vec2::new(x, y), &config);
            prop_assert!(field.len() <= capacity);
        }
    }

    #[test]
    fn split_ticks_age_like_one_tick(
        dt1 in 0.0001f32..5.0,
        dt2 in 0.0001f32..5.0,
        vx in -100.0f32..100.0,
        vy in -100.0f32..100.0,
    ) {
        let particle = Particle::new(Vec2::new(10.0, 10.0), Vec2::new(vx, vy), 1.0e6);

        let mut split = ParticleField::new(1);
        split.push(particle);
        split.tick(dt1);
        split.tick(dt2);

        let mut whole = ParticleField::new(1);
        whole.push(particle);
        whole.tick(dt1 + dt2);

        let split_age = split.iter().next().map(|p| p.age);
        let whole_age = whole.iter().next().map(|p| p.age);
        prop_assert!(split_age.is_some() && whole_age.is_some());
        prop_assert!((split_age.unwrap_or(0.0) - whole_age.unwrap_or(0.0)).abs() < 1e-3);
    }

    #[test]
    fn bounced_particles_stay_inside(
        width in 1.0f32..2000.0,
        height in 1.0f32..2000.0,
        fx in 0.0f32..=1.0,
        fy in 0.0f32..=1.0,
        vx in -2000.0f32..2000.0,
        vy in -2000.0f32..2000.0,
        steps in 1usize..50,
    ) {
        let viewport = Viewport::new(width, height);
        let mut field = ParticleField::new(1).with_boundary(Boundary::Bounce(viewport));
        field.push(Particle::immortal(Vec2::new(fx * width, fy * height), Vec2::new(vx, vy)));

        for _ in 0..steps {
            field.tick(1.0 / 60.0);
            for p in field.iter() {
                prop_assert!((0.0..=width).contains(&p.position.x));
                prop_assert!((0.0..=height).contains(&p.position.y));
            }
        }
    }
}

#[test]
fn outward_velocity_at_edge_is_inverted() {
    let viewport = Viewport::new(200.0, 100.0);
    let mut field = ParticleField::new(2).with_boundary(Boundary::Bounce(viewport));
    field.push(Particle::immortal(Vec2::new(200.0, 50.0), Vec2::new(30.0, 0.0)));
    field.push(Particle::immortal(Vec2::new(20.0, 0.0), Vec2::new(0.0, -40.0)));

    field.tick(0.1);

    let particles: Vec<Particle> = field.iter().copied().collect();
    assert!(particles[0].velocity.x < 0.0);
    assert!(particles[0].position.x <= 200.0);
    assert!(particles[1].velocity.y > 0.0);
    assert!(particles[1].position.y >= 0.0);
}

#[test]
fn particle_expires_after_its_lifetime() {
    let mut field = ParticleField::new(8);
    field.push(Particle::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 100.0));
    assert_eq!(field.len(), 1);

    for _ in 0..101 {
        field.tick(1.0);
    }

    assert_eq!(field.len(), 0);
    assert_eq!(field.stats().expired, 1);
}
