/// One query block exactly as submitted in the ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuery {
    /// Human-facing name of the slot, e.g. `Query 2`.
    pub source_label: String,
    pub slot: u32,
    pub text: String,
}

impl RawQuery {
    pub fn new(source_label: &str, slot: u32, text: &str) -> Self {
        Self {
            source_label: source_label.to_string(),
            slot,
            text: text.to_string(),
        }
    }
}
