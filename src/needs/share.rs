//! WhatsApp deep-links for sharing a need outside the app.

use crate::needs::repo_types::Need;

const WHATSAPP_BASE: &str = "https://wa.me/";

pub fn share_message(need: &Need) -> String {
    format!(
        "🤝 *Dir-Khir - Community Aid*\n\n\
         *Need:* {}\n\
         *Category:* {}\n\
         *Neighborhood:* {}\n\n\
         *Description:*\n{}\n\n\
         ---\n\
         Help someone in your community! Download Dir-Khir to see how you can assist or post your own needs.",
        need.title,
        need.category.to_uppercase(),
        need.neighborhood,
        need.description,
    )
}

/// `https://wa.me/?text=...`, or addressed to `phone` when it contains any
/// digits. Everything but digits is stripped from the number.
pub fn share_url(message: &str, phone: Option<&str>) -> String {
    let digits: String = phone
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    format!("{WHATSAPP_BASE}{digits}?text={}", urlencoding::encode(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::needs::repo_types::NeedStatus;
    use time::OffsetDateTime;

    fn need() -> Need {
        let now = OffsetDateTime::now_utc();
        Need {
            id: 1,
            user_id: 1,
            title: "Need groceries".into(),
            description: "Milk & bread".into(),
            category: "food".into(),
            status: NeedStatus::Open,
            neighborhood: "Medina".into(),
            created_at: now,
            updated_at: now,
            expires_at: None,
        }
    }

    #[test]
    fn message_lists_need_details() {
        let msg = share_message(&need());
        assert!(msg.contains("*Need:* Need groceries"));
        assert!(msg.contains("*Category:* FOOD"));
        assert!(msg.contains("*Neighborhood:* Medina"));
        assert!(msg.contains("Milk & bread"));
        assert!(msg.ends_with(
            "Download Dir-Khir to see how you can assist or post your own needs."
        ));
    }

    #[test]
    fn url_is_percent_encoded() {
        let url = share_url("Milk & bread?", None);
        assert_eq!(url, "https://wa.me/?text=Milk%20%26%20bread%3F");
    }

    #[test]
    fn phone_is_reduced_to_digits() {
        let url = share_url("hi", Some("+212 (6) 12-34"));
        assert_eq!(url, "https://wa.me/21261234?text=hi");
    }
}
