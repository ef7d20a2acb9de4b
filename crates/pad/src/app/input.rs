use super::*;

impl App {
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Paste(text) => {
                for c in text.chars() {
                    self.type_char(c);
                }
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<bool> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return Ok(true);
        }

        if key.code == KeyCode::F(1) {
            self.show_help = !self.show_help;
            return Ok(false);
        }

        if self.show_help {
            if key.code == KeyCode::Esc {
                self.show_help = false;
            }
            return Ok(false);
        }

        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.alert = None;
            }
            return Ok(false);
        }

        if let Some(ref mut prompt) = self.share_prompt {
            match key.code {
                KeyCode::Esc => self.share_prompt = None,
                KeyCode::Enter => {
                    let email = prompt.buffer.clone();
                    self.share_prompt = None;
                    self.submit_share(email);
                }
                KeyCode::Backspace => prompt.handle_backspace(),
                KeyCode::Left => prompt.move_left(),
                KeyCode::Right => prompt.move_right(),
                KeyCode::Char(c) if !ctrl => prompt.handle_char(c),
                _ => {}
            }
            return Ok(false);
        }

        if ctrl {
            match key.code {
                KeyCode::Char('a') => self.press_auth_button(),
                KeyCode::Char('s') => self.open_share_prompt(),
                _ => {}
            }
            return Ok(false);
        }

        if key.code == KeyCode::Esc {
            self.clear_error();
            return Ok(false);
        }

        if !self.editor_enabled {
            return Ok(false);
        }

        match key.code {
            KeyCode::Char(c) => self.type_char(c),
            KeyCode::Enter => self.type_char('\n'),
            KeyCode::Tab => self.type_char('\t'),
            KeyCode::Backspace => {
                self.editor.handle_backspace();
                self.sync_editor();
            }
            KeyCode::Delete => {
                self.editor.handle_delete();
                self.sync_editor();
            }
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Home => self.editor.move_home(),
            KeyCode::End => self.editor.move_end(),
            _ => {}
        }
        Ok(false)
    }

    fn type_char(&mut self, c: char) {
        if !self.editor_enabled {
            return;
        }
        self.editor.handle_char(c);
        self.sync_editor();
    }

    fn sync_editor(&self) {
        if let Some(ref binding) = self.binding {
            binding.input(&self.editor.buffer);
        }
    }
}
