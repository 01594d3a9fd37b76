//! Platform input mapping
//!
//! Turns raw `KeyboardEvent.key` strings into [`Intent`]s. The same key means
//! different things depending on what the session is waiting for: `w` is a
//! letter while typing a name and a hop while playing.

use crate::session::Intent;
use crate::sim::Step;

/// What the session is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    NameEntry,
    Menu,
    Playing,
    GameOver,
    Leaderboard,
}

fn movement(key: &str) -> Option<Step> {
    match key {
        "ArrowUp" | "w" | "W" => Some(Step::Up),
        "ArrowDown" | "s" | "S" => Some(Step::Down),
        "ArrowLeft" | "a" | "A" => Some(Step::Left),
        "ArrowRight" | "d" | "D" => Some(Step::Right),
        _ => None,
    }
}

/// Map a key to an intent; `None` means the shell should ignore it
pub fn map_key(key: &str, ctx: KeyContext) -> Option<Intent> {
    match ctx {
        KeyContext::NameEntry => match key {
            "Enter" => Some(Intent::Confirm),
            "Backspace" => Some(Intent::Backspace),
            _ => single_char(key).map(Intent::TextChar),
        },
        KeyContext::Menu => match key {
            "Enter" | " " => Some(Intent::Confirm),
            "Escape" => Some(Intent::Back),
            "l" | "L" => Some(Intent::ToggleLeaderboard),
            _ => None,
        },
        KeyContext::Playing => movement(key).map(Intent::Move),
        KeyContext::GameOver => match key {
            " " | "r" | "R" => Some(Intent::Restart),
            "Enter" => Some(Intent::Confirm),
            "Escape" => Some(Intent::Back),
            _ => None,
        },
        KeyContext::Leaderboard => match key {
            "ArrowUp" | "PageUp" => Some(Intent::ScrollUp),
            "ArrowDown" | "PageDown" => Some(Intent::ScrollDown),
            " " | "Escape" | "Enter" => Some(Intent::Back),
            "l" | "L" => Some(Intent::ToggleLeaderboard),
            _ => None,
        },
    }
}

/// Printable single-character keys (named keys like "Shift" are longer)
fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_entry_takes_letters() {
        assert_eq!(map_key("w", KeyContext::NameEntry), Some(Intent::TextChar('w')));
        assert_eq!(map_key(" ", KeyContext::NameEntry), Some(Intent::TextChar(' ')));
        assert_eq!(map_key("Backspace", KeyContext::NameEntry), Some(Intent::Backspace));
        assert_eq!(map_key("Shift", KeyContext::NameEntry), None);
        assert_eq!(map_key("Enter", KeyContext::NameEntry), Some(Intent::Confirm));
    }

    #[test]
    fn test_playing_moves() {
        assert_eq!(map_key("w", KeyContext::Playing), Some(Intent::Move(Step::Up)));
        assert_eq!(map_key("ArrowLeft", KeyContext::Playing), Some(Intent::Move(Step::Left)));
        assert_eq!(map_key("D", KeyContext::Playing), Some(Intent::Move(Step::Right)));
        assert_eq!(map_key("Enter", KeyContext::Playing), None);
    }

    #[test]
    fn test_game_over_keys() {
        assert_eq!(map_key(" ", KeyContext::GameOver), Some(Intent::Restart));
        assert_eq!(map_key("Enter", KeyContext::GameOver), Some(Intent::Confirm));
        assert_eq!(map_key("ArrowUp", KeyContext::GameOver), None);
    }

    #[test]
    fn test_menu_and_leaderboard_keys() {
        assert_eq!(map_key("L", KeyContext::Menu), Some(Intent::ToggleLeaderboard));
        assert_eq!(map_key("Escape", KeyContext::Menu), Some(Intent::Back));
        assert_eq!(map_key("PageDown", KeyContext::Leaderboard), Some(Intent::ScrollDown));
        assert_eq!(map_key("ArrowUp", KeyContext::Leaderboard), Some(Intent::ScrollUp));
        assert_eq!(map_key(" ", KeyContext::Leaderboard), Some(Intent::Back));
    }
}
