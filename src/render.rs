//! Plain-text rendering for the terminal views.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write as _;

use crate::session::SessionState;
use crate::types::{Idea, User};

pub const APP_NAME: &str = "IdeaHub";
pub const USERS_LOGIN_PROMPT: &str = "Login to view users.";
pub const NO_IDEAS: &str = "No ideas yet.";

/// Top navigation line; the last entry depends on the session.
#[must_use]
pub fn nav_bar(state: SessionState) -> String {
    let auth = match state {
        SessionState::Anonymous => "Login",
        SessionState::Authenticated => "Logout",
    };
    format!("{APP_NAME} | New Idea | Users | {auth}")
}

#[must_use]
pub fn idea_card(idea: &Idea) -> String {
    let mut out = format!("{}\n", idea.title);
    if let Some(description) = idea.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "  {description}");
    }
    let _ = write!(out, "  Likes: {}  ID: {}", idea.likes, idea.id);
    out
}

/// Ideas heading plus one card per idea. `can_like` adds the like hint shown
/// only to signed-in users.
#[must_use]
pub fn idea_list(ideas: &[Idea], can_like: bool) -> String {
    let mut out = String::from("Ideas\n");
    if ideas.is_empty() {
        out.push_str(NO_IDEAS);
        return out;
    }
    let cards: Vec<String> = ideas.iter().map(idea_card).collect();
    out.push_str(&cards.join("\n\n"));
    if can_like {
        out.push_str("\n\n(like with `ideahub ideas like <ID>`)");
    }
    out
}

#[must_use]
pub fn user_list(users: &[User]) -> String {
    let mut out = String::from("Users");
    for user in users {
        let _ = write!(out, "\n  - {}", user.username);
    }
    out
}
