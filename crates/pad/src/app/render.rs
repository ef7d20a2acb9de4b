use super::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

impl App {
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        self.layout.calculate_layout(area);
        let panels = self.layout.get_panels().to_vec();

        for panel in panels {
            match panel.panel_type {
                PanelType::Topbar => self.render_topbar(frame, panel.rect),
                PanelType::AuthBar => self.render_auth_bar(frame, panel.rect),
                PanelType::Editor => self.render_editor(frame, panel.rect),
                PanelType::StatusBar => self.render_status_bar(frame, panel.rect),
            }
        }

        if let Some(ref prompt) = self.share_prompt {
            self.render_share_prompt(frame, area, prompt);
        }

        if let Some(ref message) = self.alert {
            self.render_alert(frame, area, message);
        }

        if self.show_help {
            self.render_help(frame, area);
        }
    }

    fn render_topbar(&self, frame: &mut Frame, area: Rect) {
        let phase = match self.phase() {
            LoadPhase::Unauthenticated => "○ signed out",
            LoadPhase::Authenticating => "◐ authorizing",
            LoadPhase::Authenticated => "● authorized",
            LoadPhase::Loading => "◐ loading",
            LoadPhase::Ready => "● ready",
            LoadPhase::Failed => "✗ failed",
        };
        let line = Line::from(vec![
            Span::styled(" realtime-pad ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" {} ", self.location)),
            Span::styled(format!(" {phase}"), Style::default().fg(Color::Cyan)),
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
            area,
        );
    }

    fn render_auth_bar(&self, frame: &mut Frame, area: Rect) {
        let button_style = if self.auth_enabled {
            Style::default().fg(Color::Black).bg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let detail = match (self.auth_state(), &self.consent_url) {
            (_, Some(url)) => format!("Open in a browser: {url}"),
            (AuthState::Authenticated, None) => match self.loader.authorizer().user_id() {
                Some(id) => format!("Signed in as {id}"),
                None => "Signed in".to_string(),
            },
            (AuthState::AwaitingUserGesture, None) => "Press Ctrl+A to sign in".to_string(),
            (AuthState::AuthenticatingInteractive, None) => "Waiting for consent...".to_string(),
            (AuthState::AuthenticatingSilent, None) => "Checking stored credential...".to_string(),
            (AuthState::Unauthenticated, None) => String::new(),
        };

        let line = Line::from(vec![
            Span::styled(" Authorize ", button_style),
            Span::raw("  "),
            Span::raw(detail),
        ]);
        frame.render_widget(
            Paragraph::new(line)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::BOTTOM)),
            area,
        );
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let title = match self.file_id {
            Some(ref id) => format!(" {id} "),
            None => " no document ".to_string(),
        };
        let border_style = if self.editor_enabled {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);

        frame.render_widget(Paragraph::new(self.editor.buffer.as_str()).block(block), area);

        let blocking_overlay = self.alert.is_some() || self.share_prompt.is_some() || self.show_help;
        if self.editor_enabled && !blocking_overlay {
            let (line, col) = self.editor.cursor_line_col();
            let x = area.x + 1 + col as u16;
            let y = area.y + 1 + line as u16;
            if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
                frame.set_cursor_position((x, y));
            }
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let (text, style) = match (&self.last_error, &self.status) {
            (Some(error), _) => (format!(" {error}"), Style::default().fg(Color::Red)),
            (None, Some(status)) => (format!(" {status}"), Style::default()),
            (None, None) => (" F1 help · Ctrl+Q quit".to_string(), Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(Paragraph::new(text).style(style), area);
    }

    fn render_share_prompt(&self, frame: &mut Frame, area: Rect, prompt: &InputState) {
        let popup_area = self.centered_rect(60, 20, area);
        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(format!("Email: {}", prompt.buffer)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Share - Enter to send, Esc to cancel "),
            ),
            popup_area,
        );
    }

    fn render_alert(&self, frame: &mut Frame, area: Rect, message: &str) {
        let popup_area = self.centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(message)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Alert - Press Enter ")),
            popup_area,
        );
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help_text = self.keybinds.help_text();
        let popup_area = self.centered_rect(60, 70, area);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Paragraph::new(help_text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help - Press F1 to close "),
            ),
            popup_area,
        );
    }

    fn centered_rect(&self, percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        use ratatui::layout::{Constraint, Direction, Layout};
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(vertical[1])[1]
    }
}
