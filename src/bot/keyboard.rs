//! Keyboards sent alongside replies.

use crate::bot::command::{COUNTRY_LABELS, WORLD_LABELS, WORLD_MARK};
use crate::domain::{Country, TRACKED_COUNTRIES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    /// Payload for inline buttons; reply-keyboard buttons send their label.
    pub callback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent keyboard under the input box.
    Reply(Vec<Vec<Button>>),
    /// Buttons attached to a message.
    Inline(Vec<Vec<Button>>),
}

impl Keyboard {
    pub fn rows(&self) -> &[Vec<Button>] {
        match self {
            Keyboard::Reply(rows) | Keyboard::Inline(rows) => rows,
        }
    }
}

/// Chart menu: world averages, world totals and bars, then the user's country.
pub fn menu_keyboard(country: &Country) -> Keyboard {
    let world = |range: std::ops::Range<usize>| -> Vec<Button> {
        WORLD_LABELS[range]
            .iter()
            .map(|(label, _, _)| Button {
                label: format!("{WORLD_MARK} {label}"),
                callback: None,
            })
            .collect()
    };
    let local = COUNTRY_LABELS
        .iter()
        .map(|(label, _, _)| Button {
            label: format!("{} {label}", country.flag),
            callback: None,
        })
        .collect();

    Keyboard::Reply(vec![world(0..3), world(3..8), local])
}

/// Inline picker over the tracked countries, four per row when they divide evenly.
pub fn country_picker() -> Keyboard {
    let per_row = if TRACKED_COUNTRIES.len() % 4 == 0 { 4 } else { 3 };
    let rows = TRACKED_COUNTRIES
        .chunks(per_row)
        .map(|chunk| {
            chunk
                .iter()
                .map(|c| Button {
                    label: c.display(),
                    callback: Some(c.key.to_string()),
                })
                .collect()
        })
        .collect();
    Keyboard::Inline(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::command::{Command, parse_command};

    #[test]
    fn menu_labels_round_trip_through_the_parser() {
        let italy = Country::by_key("ITALY").unwrap();
        let keyboard = menu_keyboard(italy);
        let sizes: Vec<usize> = keyboard.rows().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 5, 4]);
        for button in keyboard.rows().iter().flatten() {
            assert!(parse_command(&button.label).is_some(), "{}", button.label);
        }
    }

    #[test]
    fn picker_callbacks_select_countries() {
        let keyboard = country_picker();
        assert!(matches!(keyboard, Keyboard::Inline(_)));
        assert_eq!(keyboard.rows().len(), 7);
        let first = &keyboard.rows()[0][0];
        assert_eq!(first.label, "🇺🇸 US");
        let callback = first.callback.as_deref().unwrap();
        assert!(matches!(parse_command(callback), Some(Command::SelectCountry(c)) if c.key == "US"));
    }
}
