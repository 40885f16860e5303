use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

/// Abstract input understood by applications, independent of the input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ControlSignal {
    /// `q`, `Esc` or `Ctrl-C`.
    Quit,
    /// `Space`, `Up`, `Enter`, or any mouse button press.
    PrimaryAction,
    /// `p`.
    TogglePause,
    /// `t`.
    ToggleTurbo,
}

impl ControlSignal {
    /// Decodes a terminal event. Returns `None` for input that carries no signal.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::Key(key) => Self::from_key(key),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(_),
                ..
            }) => Some(Self::PrimaryAction),
            _ => None,
        }
    }

    fn from_key(key: &KeyEvent) -> Option<Self> {
        // Key repeat and release would double a single press on some terminals.
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Self::Quit),
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Self::Quit),
            KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Some(Self::PrimaryAction),
            KeyCode::Char('p' | 'P') => Some(Self::TogglePause),
            KeyCode::Char('t' | 'T') => Some(Self::ToggleTurbo),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, MouseButton};

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_quit_keys() {
        for event in [
            key(KeyCode::Char('q')),
            key(KeyCode::Esc),
            Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        ] {
            assert_eq!(ControlSignal::from_event(&event), Some(ControlSignal::Quit));
        }
        assert_eq!(ControlSignal::from_event(&key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_primary_action_from_any_device() {
        for event in [
            key(KeyCode::Char(' ')),
            key(KeyCode::Up),
            key(KeyCode::Enter),
            mouse(MouseEventKind::Down(MouseButton::Left)),
            mouse(MouseEventKind::Down(MouseButton::Right)),
        ] {
            assert_eq!(
                ControlSignal::from_event(&event),
                Some(ControlSignal::PrimaryAction)
            );
        }
        assert_eq!(
            ControlSignal::from_event(&mouse(MouseEventKind::Up(MouseButton::Left))),
            None
        );
        assert_eq!(ControlSignal::from_event(&mouse(MouseEventKind::Moved)), None);
    }

    #[test]
    fn test_toggles() {
        assert_eq!(
            ControlSignal::from_event(&key(KeyCode::Char('p'))),
            Some(ControlSignal::TogglePause)
        );
        assert_eq!(
            ControlSignal::from_event(&key(KeyCode::Char('t'))),
            Some(ControlSignal::ToggleTurbo)
        );
    }

    #[test]
    fn test_ignores_release_and_other_events() {
        let release = Event::Key(KeyEvent::new_with_kind_and_state(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        ));
        assert_eq!(ControlSignal::from_event(&release), None);
        assert_eq!(ControlSignal::from_event(&Event::Resize(80, 24)), None);
        assert_eq!(ControlSignal::from_event(&Event::FocusGained), None);
        assert_eq!(ControlSignal::from_event(&key(KeyCode::Left)), None);
    }
}
