use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::panel::{Panel, PanelType};

const TOPBAR_HEIGHT: u16 = 1;
const AUTH_BAR_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;

#[derive(Default)]
pub struct LayoutState {
    cached_panels: Vec<Panel>,
}

impl LayoutState {
    pub fn calculate_layout(&mut self, area: Rect) -> &[Panel] {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TOPBAR_HEIGHT),
                Constraint::Length(AUTH_BAR_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(STATUS_HEIGHT),
            ])
            .split(area);

        self.cached_panels = vec![
            Panel {
                panel_type: PanelType::Topbar,
                rect: rows[0],
            },
            Panel {
                panel_type: PanelType::AuthBar,
                rect: rows[1],
            },
            Panel {
                panel_type: PanelType::Editor,
                rect: rows[2],
            },
            Panel {
                panel_type: PanelType::StatusBar,
                rect: rows[3],
            },
        ];

        &self.cached_panels
    }

    pub fn get_panels(&self) -> &[Panel] {
        &self.cached_panels
    }

    pub fn get_editor_rect(&self) -> Option<Rect> {
        self.cached_panels
            .iter()
            .find(|p| matches!(p.panel_type, PanelType::Editor))
            .map(|p| p.rect)
    }
}
