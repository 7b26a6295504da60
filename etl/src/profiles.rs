use catalog_core::UserId;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::seq::SliceRandom;
use rand::Rng;

pub const MAX_PREFERRED_GENRES: usize = 5;

const GENRE_ABOUTS: &[&str] = &[
    "Fan of {} movies",
    "I really like {} films",
    "Passionate about {} cinema",
    "Love watching {} movies",
    "Enthusiast of {} genre",
    "Big fan of {}",
    "Enjoys {} and more",
    "{} movies are my favorite",
    "Always up for {} films",
    "Can't get enough of {}",
];

const SIMPLE_ABOUTS: &[&str] = &[
    "Movie lover",
    "Film enthusiast",
    "Cinema addict",
    "Just here for the popcorn",
    "Passionate about cinema",
    "Movie buff",
    "Film fanatic",
    "Love watching movies",
    "Always looking for good films",
    "Cinema is my passion",
];

#[derive(Debug, Clone)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub about: String,
    pub preferred_genres: Vec<String>,
}

/// `first.last` lowercased, suffixed with the last four digits of the id.
pub fn username(first_name: &str, last_name: &str, user_id: UserId) -> String {
    format!("{}.{}{}", first_name.to_lowercase(), last_name.to_lowercase(), user_id % 10_000)
}

/// One to five distinct genres in random order.
pub fn pick_genres<R: Rng + ?Sized>(all: &[String], rng: &mut R) -> Vec<String> {
    if all.is_empty() {
        return Vec::new();
    }
    let count = rng.gen_range(1..=MAX_PREFERRED_GENRES).min(all.len());
    all.choose_multiple(rng, count).cloned().collect()
}

/// Short bio. Three in ten are generic; the rest name the first one or two
/// preferred genres.
pub fn about<R: Rng + ?Sized>(preferred: &[String], rng: &mut R) -> String {
    let generic = rng.gen_range(0..10) < 3;
    let subject = match preferred {
        _ if generic => None,
        [] => None,
        [only] => Some(only.clone()),
        [first, second, ..] => Some(format!("{first} and {second}")),
    };
    let about = match subject {
        Some(subject) => GENRE_ABOUTS.choose(rng).map(|t| t.replace("{}", &subject)),
        None => SIMPLE_ABOUTS.choose(rng).map(|s| s.to_string()),
    };
    about.unwrap_or_default()
}

/// Fills the profile part of user documents from fake names and the
/// catalog's genres.
pub struct ProfileGenerator {
    genres: Vec<String>,
}

impl ProfileGenerator {
    pub fn new(genres: Vec<String>) -> Self {
        Self { genres }
    }

    pub fn generate<R: Rng + ?Sized>(&self, user_id: UserId, rng: &mut R) -> Profile {
        let first_name: String = FirstName().fake_with_rng(rng);
        let last_name: String = LastName().fake_with_rng(rng);
        let preferred_genres = pick_genres(&self.genres, rng);
        Profile {
            username: username(&first_name, &last_name, user_id),
            about: about(&preferred_genres, rng),
            first_name,
            last_name,
            preferred_genres,
        }
    }
}
