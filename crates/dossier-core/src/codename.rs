//! Random two-word codenames ("Shadow Fox").
//!
//! Candidates are checked against a [`CodenameRegistry`] a bounded number of
//! times. When every attempt collides, one more candidate is returned without
//! checking, so the result is best-effort unique only.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::CodenameRegistry;

pub const ADJECTIVES: [&str; 13] = [
    "Shadow", "Silent", "Crimson", "Midnight", "Phantom", "Iron", "Silver", "Ghost", "Night",
    "Storm", "Hidden", "Cold", "Dark",
];

pub const NOUNS: [&str; 11] = [
    "Fox", "Viper", "Raven", "Wolf", "Falcon", "Widow", "Cobra", "Jackal", "Panther", "Warden",
    "Mantis",
];

/// Uniqueness checks made before the unchecked fallback.
pub use dossier_config::DEFAULT_MAX_ATTEMPTS;

/// Generates codenames with a bounded number of uniqueness checks.
#[derive(Debug, Clone, Copy)]
pub struct CodenameGenerator {
    max_attempts: usize,
}

impl Default for CodenameGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl CodenameGenerator {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Pick a codename not yet taken in `registry`, if one turns up in time.
    ///
    /// Never writes anything; the caller creates the agent.
    pub fn generate<R, G>(&self, registry: &R, rng: &mut G) -> Result<String, StoreError>
    where
        R: CodenameRegistry + ?Sized,
        G: Rng + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = random_codename(rng);
            if !registry.codename_taken(&candidate)? {
                return Ok(candidate);
            }
            debug!(attempt, candidate = %candidate, "codename already taken");
        }

        let fallback = random_codename(rng);
        debug!(
            attempts = self.max_attempts,
            candidate = %fallback,
            "codename attempts exhausted, returning unchecked candidate"
        );
        Ok(fallback)
    }

    /// [`generate`](Self::generate) using the thread-local RNG.
    pub fn generate_unique<R>(&self, registry: &R) -> Result<String, StoreError>
    where
        R: CodenameRegistry + ?Sized,
    {
        self.generate(registry, &mut rand::thread_rng())
    }
}

/// One uniformly random `"<adjective> <noun>"` pair.
pub fn random_codename<G: Rng + ?Sized>(rng: &mut G) -> String {
    // Both lists are non-empty constants.
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or(ADJECTIVES[0]);
    let noun = NOUNS.choose(rng).copied().unwrap_or(NOUNS[0]);
    format!("{} {}", adjective, noun)
}

/// Whether `name` is one of the generator's adjective/noun pairs.
///
/// Nothing in the registry calls this; it lets tests in this and dependent
/// crates check a generated codename's shape.
pub fn is_generated_shape(name: &str) -> bool {
    match name.split_once(' ') {
        Some((adjective, noun)) => ADJECTIVES.contains(&adjective) && NOUNS.contains(&noun),
        None => false,
    }
}
