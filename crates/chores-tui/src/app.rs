use std::time::{Duration, Instant};

use chores_core::filter::Filter;
use chores_core::store::TaskStore;
use chores_core::view::{TaskListView, TaskRow, build_view};
use chrono::Utc;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tracing::debug;

/// How long the rejected-input shake cue stays on screen.
pub const SHAKE_DURATION: Duration = Duration::from_millis(500);

/// How long a deleted row lingers as a ghost before the redraw drops it.
/// The task is already gone from the store when the ghost appears.
pub const GHOST_DURATION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    List,
}

/// Single-line text buffer with a byte-offset cursor.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
}

impl InputState {
    pub fn prefilled(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.len(),
        }
    }

    fn insert(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.remove(prev);
            self.cursor = prev;
        }
    }

    fn left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    fn right(&mut self) {
        if self.cursor < self.text.len() {
            let rest = &self.text[self.cursor..];
            let next_len = rest.chars().next().map(|c| c.len_utf8()).unwrap_or(0);
            self.cursor += next_len;
        }
    }

    fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.len(),
            _ => {}
        }
    }
}

/// Modal edit state: which task is being edited and the dialog's buffer.
#[derive(Debug, Clone)]
pub struct EditDialog {
    pub id: u64,
    pub input: InputState,
}

/// Cosmetic leftover of a just-deleted row.
#[derive(Debug, Clone)]
pub struct GhostRow {
    pub index: usize,
    pub row: TaskRow,
    pub until: Instant,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Controller state: translates key events into store calls and rebuilds the
/// view model after every mutation.
pub struct App {
    store: TaskStore,
    pub filter: Filter,
    pub focus: Focus,
    pub input: InputState,
    pub list_state: ListState,
    pub edit: Option<EditDialog>,
    pub shake_until: Option<Instant>,
    pub ghost: Option<GhostRow>,
    pub status: Option<StatusMessage>,
    pub view: TaskListView,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: TaskStore) -> Self {
        let filter = Filter::default();
        let view = build_view(store.tasks(), filter, store.count());
        let mut list_state = ListState::default();
        if !view.rows.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            store,
            filter,
            focus: Focus::Input,
            input: InputState::default(),
            list_state,
            edit: None,
            shake_until: None,
            ghost: None,
            status: None,
            view,
            should_quit: false,
        }
    }

    /// Rebuild the view model from the store and clamp the selection, the
    /// full-replace render protocol: rows are never patched in place.
    fn refresh(&mut self) {
        self.view = build_view(self.store.tasks(), self.filter, self.store.count());

        let len = self.view.rows.len();
        if len == 0 {
            self.list_state.select(None);
        } else {
            let selected = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(selected.min(len - 1)));
        }
    }

    pub fn selected_row(&self) -> Option<&TaskRow> {
        self.list_state
            .selected()
            .and_then(|index| self.view.rows.get(index))
    }

    fn set_status(&mut self, text: String, is_error: bool) {
        self.status = Some(StatusMessage { text, is_error });
    }

    fn shake(&mut self) {
        self.shake_until = Some(Instant::now() + SHAKE_DURATION);
    }

    /// Expire the cosmetic timers. Neither gates correctness.
    pub fn tick(&mut self, now: Instant) {
        if self.shake_until.is_some_and(|until| until <= now) {
            self.shake_until = None;
        }
        if self.ghost.as_ref().is_some_and(|ghost| ghost.until <= now) {
            self.ghost = None;
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                self.should_quit = true;
                return;
            }

            if self.edit.is_some() {
                self.handle_edit_input(key);
                return;
            }

            match self.focus {
                Focus::Input => self.handle_add_input(key),
                Focus::List => self.handle_list_input(key),
            }
        }
    }

    fn handle_add_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_add(),
            KeyCode::Esc | KeyCode::Tab | KeyCode::Down => self.focus_list(),
            _ => self.input.handle_key(key),
        }
    }

    fn handle_list_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('a') | KeyCode::Char('i') => {
                self.focus = Focus::Input;
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => {
                if self.list_state.selected().unwrap_or(0) == 0 {
                    self.focus = Focus::Input;
                } else {
                    self.move_selection(-1);
                }
            }
            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit(),
            KeyCode::Char('d') | KeyCode::Char('x') => self.delete_selected(),
            KeyCode::Char('1') => self.set_filter(Filter::All),
            KeyCode::Char('2') => self.set_filter(Filter::Completed),
            KeyCode::Char('3') => self.set_filter(Filter::Pending),
            KeyCode::Tab => self.set_filter(self.filter.next()),
            KeyCode::BackTab => self.set_filter(self.filter.prev()),
            _ => {}
        }
    }

    fn handle_edit_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.confirm_edit(),
            KeyCode::Esc => self.cancel_edit(),
            _ => {
                if let Some(dialog) = self.edit.as_mut() {
                    dialog.input.handle_key(key);
                }
            }
        }
    }

    fn focus_list(&mut self) {
        self.focus = Focus::List;
        if self.list_state.selected().is_none() && !self.view.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if self.view.rows.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as i32;
        let last = self.view.rows.len() as i32 - 1;
        self.list_state
            .select(Some((current + delta).clamp(0, last) as usize));
    }

    fn submit_add(&mut self) {
        match self.store.add(&self.input.text, Utc::now()) {
            Ok(Some(_)) => {
                // Success clears the input; focus stays on it for the next
                // task.
                self.input.clear();
                self.status = None;
                self.refresh();
            }
            Ok(None) => self.shake(),
            Err(err) => self.set_status(format!("{err:#}"), true),
        }
    }

    fn toggle_selected(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };

        match self.store.toggle(row.id, !row.completed) {
            Ok(_) => self.refresh(),
            Err(err) => self.set_status(format!("{err:#}"), true),
        }
    }

    fn open_edit(&mut self) {
        if let Some(row) = self.selected_row() {
            debug!(id = row.id, "opening edit dialog");
            self.edit = Some(EditDialog {
                id: row.id,
                input: InputState::prefilled(&row.text),
            });
        }
    }

    fn confirm_edit(&mut self) {
        let Some(dialog) = self.edit.as_ref() else {
            return;
        };

        // Empty text keeps the dialog open without committing anything.
        if dialog.input.text.trim().is_empty() {
            self.shake();
            return;
        }

        let id = dialog.id;
        let text = dialog.input.text.clone();
        match self.store.edit(id, &text) {
            Ok(_) => {
                self.edit = None;
                self.refresh();
            }
            Err(err) => self.set_status(format!("{err:#}"), true),
        }
    }

    fn cancel_edit(&mut self) {
        // Discards the edit target without touching the store.
        self.edit = None;
    }

    fn delete_selected(&mut self) {
        let Some(index) = self.list_state.selected() else {
            return;
        };
        let Some(row) = self.view.rows.get(index).cloned() else {
            return;
        };

        match self.store.delete(row.id) {
            Ok(_) => {
                self.ghost = Some(GhostRow {
                    index,
                    row,
                    until: Instant::now() + GHOST_DURATION,
                });
                self.refresh();
            }
            Err(err) => self.set_status(format!("{err:#}"), true),
        }
    }

    /// Filter changes re-render only; the store and the slot are untouched.
    fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.refresh();
    }
}
