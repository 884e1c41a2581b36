// Text for the share button. Opening the link is the host's business.

pub const SHARE_BASE: &str = "https://wa.me/?text=";

pub fn share_message(reaction_time: f64) -> String {
    format!("I tapped the right fruit in {reaction_time:.2}s in Fruit Tap! Can you beat me? 🍉")
}

/// `encoded` must already be URI-component encoded.
pub fn share_link(encoded: &str) -> String {
    format!("{SHARE_BASE}{encoded}")
}
