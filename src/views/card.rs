use crate::core::SwipeEngine;
use crate::models::CandidateProfile;

pub const NO_MORE_CARDS: &str = "No more cards\nCome back later for more potential matches!";

/// Interests shown on the card behind the current one
const BACKGROUND_INTERESTS: usize = 3;

fn render(profile: &CandidateProfile, max_interests: Option<usize>) -> String {
    let mut lines = Vec::new();

    match profile.age {
        Some(age) => lines.push(format!("{}, {}", profile.full_name(), age)),
        None => lines.push(profile.full_name()),
    }
    if let Some(bio) = profile.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        lines.push(bio.to_string());
    }

    let take = max_interests.unwrap_or(profile.interests.len());
    let tags: Vec<String> = profile
        .interests
        .iter()
        .take(take)
        .map(|i| format!("#{}", i))
        .collect();
    if !tags.is_empty() {
        lines.push(tags.join(" "));
    }
    if let Some(url) = &profile.cover_image_url {
        lines.push(format!("[{}]", url));
    }

    lines.join("\n")
}

/// Foreground card: every interest
pub fn render_card(profile: &CandidateProfile) -> String {
    render(profile, None)
}

/// Card peeking out behind the current one
pub fn render_background_card(profile: &CandidateProfile) -> String {
    render(profile, Some(BACKGROUND_INTERESTS))
}

pub fn render_match_dialog(matched: &CandidateProfile) -> String {
    format!(
        "It's a Match!\nYou and {} {} liked each other!",
        matched.first_name, matched.last_name
    )
}

/// Whole swipe screen for the current engine state
pub fn render_swipe_screen(engine: &SwipeEngine) -> String {
    let Some(current) = engine.current() else {
        return NO_MORE_CARDS.to_string();
    };

    let mut screen = render_card(current);
    if let Some(next) = engine.peek_next() {
        screen.push_str("\n\nUp next:\n");
        screen.push_str(&render_background_card(next));
    }
    screen
}
