pub struct Keybinds;

impl Default for Keybinds {
    fn default() -> Self {
        Self
    }
}

impl Keybinds {
    pub fn help_text(&self) -> String {
        r#"Keyboard Shortcuts:

Authorization:
  Ctrl + A      Press the Authorize button (when enabled)

Editing:
  Type          Edit the shared text
  Enter         New line
  ← / →         Move cursor
  Home / End    Start / end of text

Document:
  Ctrl + S      Share the document with someone

General:
  F1            Toggle this help
  Esc           Dismiss alert or prompt
  Ctrl + Q      Quit
"#
        .to_string()
    }
}
