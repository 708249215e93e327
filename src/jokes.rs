//! Chicken joke pool for the game-over narrator

use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

/// Built-in jokes; config can replace the pool entirely.
/// Each entry is "setup\npunchline".
pub const CHICKEN_JOKES: &[&str] = &[
    "Why did the chicken cross the road?\nTo get to the other side!",
    "Why did the chicken cross the playground?\nTo get to the other slide!",
    "What do you call a bird that's afraid to fly?\nA chicken!",
    "Why did the chicken join a band?\nBecause it had the drumsticks!",
    "How does a chicken send mail?\nIn a hen-velope!",
    "What do you call a crazy chicken?\nA cuckoo cluck!",
    "Why did the robot cross the road?\nBecause the chicken was away!",
    "What do chickens study in school?\nEgg-nomics!",
    "Which day of the week do chickens hate most?\nFry-day!",
    "What do you call a ghost chicken?\nA poultry-geist!",
    "Why did the chicken cross the internet?\nTo get to the other site!",
    "What happens when a chicken eats gunpowder?\nShe lays hand-gren-eggs!",
];

pub fn default_pool() -> Vec<String> {
    CHICKEN_JOKES.iter().map(|j| j.to_string()).collect()
}

/// Pick one joke. The pool is validated non-empty at startup.
pub fn pick<'a>(pool: &'a [String], rng: &mut Pcg32) -> &'a str {
    pool.choose(rng).map(String::as_str).unwrap_or("")
}
