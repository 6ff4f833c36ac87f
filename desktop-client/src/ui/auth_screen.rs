use eframe::egui::{self, Color32, RichText};

use crate::state::ClientCommand;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthMode {
    Login,
    Register,
}

/// Login and registration forms. Produces a command when submitted.
pub struct AuthScreen {
    mode: AuthMode,
    username: String,
    email: String,
    password: String,
    confirm_password: String,
    error: Option<String>,
    waiting: bool,
}

impl Default for AuthScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthScreen {
    pub fn new() -> Self {
        Self {
            mode: AuthMode::Login,
            username: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            error: None,
            waiting: false,
        }
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new()
        }
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.waiting = false;
    }

    fn switch_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error = None;
        self.password.clear();
        self.confirm_password.clear();
    }

    /// Checks what can be checked locally and builds the request.
    fn submit(&mut self) -> Option<ClientCommand> {
        self.error = None;
        let command = match self.mode {
            AuthMode::Login => ClientCommand::Login {
                email: self.email.trim().to_string(),
                password: self.password.clone(),
            },
            AuthMode::Register => {
                if self.password != self.confirm_password {
                    self.error = Some("Passwords do not match!".to_string());
                    return None;
                }
                ClientCommand::Register {
                    username: self.username.trim().to_string(),
                    email: self.email.trim().to_string(),
                    password: self.password.clone(),
                }
            }
        };
        self.waiting = true;
        Some(command)
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<ClientCommand> {
        let mut command = None;

        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(RichText::new("🐍 Snake").size(32.0));
            ui.add_space(20.0);

            let title = match self.mode {
                AuthMode::Login => "Login",
                AuthMode::Register => "Create Account",
            };
            ui.heading(title);
            ui.add_space(10.0);

            egui::Grid::new("auth_form")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    if self.mode == AuthMode::Register {
                        ui.label("Username");
                        ui.text_edit_singleline(&mut self.username);
                        ui.end_row();
                    }

                    ui.label("Email");
                    ui.text_edit_singleline(&mut self.email);
                    ui.end_row();

                    ui.label("Password");
                    ui.add(egui::TextEdit::singleline(&mut self.password).password(true));
                    ui.end_row();

                    if self.mode == AuthMode::Register {
                        ui.label("Confirm password");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.confirm_password).password(true),
                        );
                        ui.end_row();
                    }
                });

            ui.add_space(10.0);

            if let Some(error) = &self.error {
                ui.label(RichText::new(error).color(Color32::LIGHT_RED));
                ui.add_space(6.0);
            }

            let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
            let button = ui.add_enabled(!self.waiting, egui::Button::new(title));
            if (button.clicked() || (enter && !self.waiting))
                && let Some(submitted) = self.submit()
            {
                command = Some(submitted);
            }

            if self.waiting {
                ui.spinner();
            }

            ui.add_space(12.0);
            match self.mode {
                AuthMode::Login => {
                    if ui.link("Don't have an account? Register").clicked() {
                        self.switch_mode(AuthMode::Register);
                    }
                }
                AuthMode::Register => {
                    if ui.link("Already have an account? Login").clicked() {
                        self.switch_mode(AuthMode::Login);
                    }
                }
            }
        });

        command
    }
}
