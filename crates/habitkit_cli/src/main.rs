//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `habitkit_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("habitkit_core ping={}", habitkit_core::ping());
    println!("habitkit_core version={}", habitkit_core::core_version());
    println!(
        "habitkit_core palette colors={} icons={}",
        habitkit_core::HABIT_COLORS.len(),
        habitkit_core::HABIT_ICONS.len()
    );
}
