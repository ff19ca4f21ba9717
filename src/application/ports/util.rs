// src/application/ports/util.rs
/// Turns free text into a base slug. Implementations must be pure.
pub trait SlugGenerator: Send + Sync {
    fn slugify(&self, input: &str) -> String;
}
