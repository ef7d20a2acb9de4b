use super::*;

impl App {
    pub fn process_page_events(&mut self) {
        self.process_state_changes();

        while let Ok(event) = self.page_rx.try_recv() {
            match event {
                PageEvent::AuthButton { enabled } => {
                    self.auth_enabled = enabled;
                    if !enabled {
                        self.auth_armed = false;
                        self.consent_url = None;
                    }
                }
                PageEvent::AuthArmed => {
                    self.auth_armed = true;
                    self.status = Some("Press Ctrl+A to authorize".to_string());
                }
                PageEvent::HistoryPushed(entry) => {
                    self.location = entry.url();
                    self.history.push(entry);
                }
                PageEvent::Alert(message) => {
                    self.alert = Some(message);
                }
                PageEvent::Navigated(href) => {
                    tracing::info!(href, "Navigating away from the document");
                    self.location = href;
                    self.binding = None;
                    self.file_id = None;
                    self.editor_enabled = false;
                    self.editor.clear();
                }
                PageEvent::TextChanged(_) => {
                    // Queued values can be older than local typing.
                    if let Some(ref binding) = self.binding {
                        let current = binding.collaborative_string().text();
                        if self.editor.buffer != current {
                            self.editor.replace(&current);
                        }
                    }
                }
                PageEvent::DocumentBound { file_id, binding } => {
                    self.editor
                        .replace(&binding.collaborative_string().text());
                    self.editor.move_end();
                    self.binding = Some(binding);
                    self.file_id = Some(file_id);
                    self.editor_enabled = true;
                    self.status = Some("Document ready".to_string());
                }
            }
        }

        if let Some(ref mut prompt_rx) = self.prompt_rx {
            if prompt_rx.has_changed().unwrap_or(false) {
                self.consent_url = prompt_rx.borrow_and_update().clone();
            }
        }
    }

    fn process_state_changes(&mut self) {
        if self.phase_rx.has_changed().unwrap_or(false) {
            let phase = *self.phase_rx.borrow_and_update();
            match phase {
                LoadPhase::Loading => self.status = Some("Loading document...".to_string()),
                LoadPhase::Failed => self.report_error("Load", "the document could not be opened"),
                _ => {}
            }
        }

        if self.auth_rx.has_changed().unwrap_or(false) {
            let state = *self.auth_rx.borrow_and_update();
            match state {
                AuthState::AuthenticatingInteractive => {
                    self.status = Some("Waiting for authorization in the browser...".to_string())
                }
                AuthState::Authenticated => self.status = Some("Signed in".to_string()),
                _ => {}
            }
        }
    }

    pub fn process_async_events(&mut self) {
        while let Ok(event) = self.app_async_rx.try_recv() {
            match event {
                AppAsyncEvent::ShareFinished { email, error } => match error {
                    Some(e) => self.report_error(&format!("Sharing with {email} failed"), e),
                    None => {
                        self.clear_error();
                        self.status = Some(format!("Shared with {email}"));
                    }
                },
            }
        }
    }

    pub(super) fn press_auth_button(&mut self) {
        if !self.auth_enabled {
            return;
        }
        let _ = self.clicks_tx.send(());
        self.status = Some("Authorizing...".to_string());
    }

    pub(super) fn open_share_prompt(&mut self) {
        if self.file_id.is_none() {
            self.report_error("Share", "no document is open");
            return;
        }
        if self.drive_api.is_none() {
            self.report_error("Share", "sharing needs a Google account (set google.client_id)");
            return;
        }
        self.share_prompt = Some(InputState::new());
    }

    pub(super) fn submit_share(&mut self, email: String) {
        let email = email.trim().to_string();
        if email.is_empty() {
            return;
        }
        let (Some(api), Some(file_id)) = (self.drive_api.clone(), self.file_id.clone()) else {
            return;
        };
        let Some(credential) = self.loader.authorizer().credential() else {
            self.report_error("Share", "not authorized");
            return;
        };
        let role = self.config.loader.share_role.clone();

        self.status = Some(format!("Sharing with {email}..."));
        self.spawn_app_task(async move {
            let result = api
                .insert_permission(&credential, &file_id, &email, &role)
                .await;
            AppAsyncEvent::ShareFinished {
                email,
                error: result.err().map(|e| format!("{} ({e})", e.user_message())),
            }
        });
    }
}
