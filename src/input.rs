use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    Pause,
    Resume,
    SelectPrev,
    SelectNext,
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Up => Some(UiCommand::SelectPrev),
        KeyCode::Down => Some(UiCommand::SelectNext),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UiCommand::Quit),
            'p' => Some(UiCommand::Pause),
            'r' => Some(UiCommand::Resume),
            'k' => Some(UiCommand::SelectPrev),
            'j' => Some(UiCommand::SelectNext),
            _ => None,
        },
        _ => None,
    }
}
