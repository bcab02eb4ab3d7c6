use serenity::{
    all::ButtonStyle,
    builder::{CreateActionRow, CreateButton},
};

/// IDs personalizados para los botones
pub mod button_ids {
    pub const PLAY_PAUSE: &str = "music_play_pause";
    pub const SKIP: &str = "music_skip";
    pub const REPEAT: &str = "music_repeat";
    pub const STOP: &str = "music_stop";
}

/// Acción pedida por un botón del reproductor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    PlayPause,
    Skip,
    Repeat,
    Stop,
}

impl ButtonAction {
    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        match custom_id {
            button_ids::PLAY_PAUSE => Some(Self::PlayPause),
            button_ids::SKIP => Some(Self::Skip),
            button_ids::REPEAT => Some(Self::Repeat),
            button_ids::STOP => Some(Self::Stop),
            _ => None,
        }
    }
}

/// Controles del mensaje de "reproduciendo ahora"
pub fn create_player_buttons(is_paused: bool, repeat: bool) -> Vec<CreateActionRow> {
    let play_pause_btn = CreateButton::new(button_ids::PLAY_PAUSE)
        .emoji(if is_paused { '▶' } else { '⏸' })
        .style(if is_paused {
            ButtonStyle::Success
        } else {
            ButtonStyle::Secondary
        });

    let skip_btn = CreateButton::new(button_ids::SKIP)
        .emoji('⏭')
        .style(ButtonStyle::Primary);

    let repeat_btn = CreateButton::new(button_ids::REPEAT)
        .emoji('🔂')
        .style(if repeat {
            ButtonStyle::Success
        } else {
            ButtonStyle::Secondary
        });

    let stop_btn = CreateButton::new(button_ids::STOP)
        .emoji('⏹')
        .style(ButtonStyle::Danger);

    vec![CreateActionRow::Buttons(vec![
        play_pause_btn,
        skip_btn,
        repeat_btn,
        stop_btn,
    ])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn custom_ids_map_to_actions() {
        assert_eq!(
            ButtonAction::from_custom_id(button_ids::PLAY_PAUSE),
            Some(ButtonAction::PlayPause)
        );
        assert_eq!(ButtonAction::from_custom_id(button_ids::SKIP), Some(ButtonAction::Skip));
        assert_eq!(
            ButtonAction::from_custom_id(button_ids::REPEAT),
            Some(ButtonAction::Repeat)
        );
        assert_eq!(ButtonAction::from_custom_id(button_ids::STOP), Some(ButtonAction::Stop));
        assert_eq!(ButtonAction::from_custom_id("track_selection"), None);
    }

    #[test]
    fn controls_fit_in_one_row() {
        assert_eq!(create_player_buttons(false, false).len(), 1);
    }
}
