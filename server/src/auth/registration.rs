use common::api::RegisterRequest;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;
pub const PASSWORD_MIN_LEN: usize = 6;

/// Registration input that passed validation. Email is lowercased.
#[derive(Clone, Debug, PartialEq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Collects every problem with the request into one message.
pub fn validate_registration(request: RegisterRequest) -> Result<Registration, String> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();
    let password = request.password;

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err("Please provide username, email, and password".to_string());
    }

    let mut problems = Vec::new();

    let username_len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
        problems.push(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        problems.push("Username can only contain letters, numbers and underscores".to_string());
    }
    if !looks_like_email(&email) {
        problems.push("Please provide a valid email".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        problems.push(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        ));
    }

    if problems.is_empty() {
        Ok(Registration {
            username,
            email,
            password,
        })
    } else {
        Err(problems.join(". "))
    }
}

/// `local@domain.tld` with no whitespace and no empty labels.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}
