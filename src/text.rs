//! Display strings for the two supported languages
//!
//! Presentation only; the simulation never reads these.

use serde::{Deserialize, Serialize};

use crate::sim::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    En,
    Nl,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Nl => "nl",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Some(Language::En),
            "nl" | "nederlands" | "dutch" => Some(Language::Nl),
            _ => None,
        }
    }

    pub fn strings(&self) -> &'static Strings {
        match self {
            Language::En => &EN,
            Language::Nl => &NL,
        }
    }
}

/// HUD and screen copy
#[derive(Debug)]
pub struct Strings {
    pub title: &'static str,
    pub instructions: &'static str,
    pub start: &'static str,
    pub restart: &'static str,
    pub try_again: &'static str,
    pub game_over: &'static str,
    pub score: &'static str,
    pub hits_left: &'static str,
    pub games_left: &'static str,
    pub collected: &'static str,
    pub completed: &'static str,
    pub your_code: &'static str,
    pub nickname_taken: &'static str,
    pub submit_failed: &'static str,
    pub leaderboard: &'static str,
    pub no_scores: &'static str,
}

static EN: Strings = Strings {
    title: "The Green Dino Game",
    instructions: "Press SPACE or click to jump over trash! Help clean the environment!",
    start: "Start Game",
    restart: "Restart Game",
    try_again: "Try Again",
    game_over: "Game Over!",
    score: "Score",
    hits_left: "Hits left",
    games_left: "Games left",
    collected: "Collected",
    completed: "Well done! You've completed all 3 games!",
    your_code: "Your code is:",
    nickname_taken: "That nickname is taken, saved as",
    submit_failed: "Could not save your score. Try again?",
    leaderboard: "Global Leaderboard",
    no_scores: "No scores yet. Be the first to play!",
};

static NL: Strings = Strings {
    title: "Het Groene Dino Spel",
    instructions: "Druk op SPATIE of klik om over afval te springen! Help het milieu schoon te maken!",
    start: "Start Spel",
    restart: "Herstart Spel",
    try_again: "Probeer Opnieuw",
    game_over: "Game Over!",
    score: "Score",
    hits_left: "Levens over",
    games_left: "Spellen over",
    collected: "Verzameld",
    completed: "Goed gedaan! Je hebt alle 3 spellen voltooid!",
    your_code: "Je code is:",
    nickname_taken: "Die naam is bezet, opgeslagen als",
    submit_failed: "Score opslaan mislukt. Opnieuw proberen?",
    leaderboard: "Wereldwijd Scorebord",
    no_scores: "Nog geen scores. Wees de eerste die speelt!",
};

/// Display name of a catalog item
pub fn item_name(kind: ItemKind, language: Language) -> &'static str {
    match (kind, language) {
        (ItemKind::TrashBin, Language::En) => "Trash bin",
        (ItemKind::TrashBin, Language::Nl) => "Prullenbak",
        (ItemKind::Paper, Language::En) => "Paper waste",
        (ItemKind::Paper, Language::Nl) => "Papierafval",
        (ItemKind::Bottle, Language::En) => "Bottle",
        (ItemKind::Bottle, Language::Nl) => "Fles",
        (ItemKind::Cup, Language::En) => "Plastic cup",
        (ItemKind::Cup, Language::Nl) => "Plastic beker",
        (ItemKind::Bag, Language::En) => "Plastic bag",
        (ItemKind::Bag, Language::Nl) => "Plastic tas",
        (ItemKind::Recycling, Language::En) => "Recycling",
        (ItemKind::Recycling, Language::Nl) => "Recycling",
        (ItemKind::SolarPanel, Language::En) => "Solar energy",
        (ItemKind::SolarPanel, Language::Nl) => "Zonne-energie",
        (ItemKind::WindTurbine, Language::En) => "Wind energy",
        (ItemKind::WindTurbine, Language::Nl) => "Windenergie",
        (ItemKind::Tree, Language::En) => "Tree planting",
        (ItemKind::Tree, Language::Nl) => "Bomen planten",
        (ItemKind::Bicycle, Language::En) => "Cycling",
        (ItemKind::Bicycle, Language::Nl) => "Fietsen",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parsing() {
        assert_eq!(Language::from_str("NL"), Some(Language::Nl));
        assert_eq!(Language::from_str("english"), Some(Language::En));
        assert_eq!(Language::from_str("fr"), None);
    }

    #[test]
    fn every_item_has_names() {
        for kind in ItemKind::HAZARDS.iter().chain(ItemKind::REWARDS.iter()) {
            assert!(!item_name(*kind, Language::En).is_empty());
            assert!(!item_name(*kind, Language::Nl).is_empty());
        }
    }

    #[test]
    fn tables_differ_per_language() {
        assert_ne!(Language::En.strings().title, Language::Nl.strings().title);
    }
}
