use serde::Deserialize;

use super::Gateway;
use crate::capabilities::read_json;
use crate::event::Event;
use crate::model::EmailMessage;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmailListResponse {
    #[serde(default)]
    pub emails: Vec<EmailRecord>,
}

/// One message as the mail backend returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmailRecord {
    pub gmail_id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl EmailRecord {
    /// New messages start unread and belong to the case they were fetched for.
    #[must_use]
    pub fn into_message(self, case_id: &str) -> EmailMessage {
        EmailMessage {
            id: self.gmail_id,
            subject: self.subject,
            sender: self.sender,
            recipient: self.to,
            body: self.body_text,
            received_at: self.date,
            read: false,
            case_id: case_id.to_string(),
        }
    }
}

impl Gateway<'_> {
    pub fn list_emails(&self, case_id: &str) {
        let url = self.endpoints.api.endpoint(&["api", "email"]);
        let case_id = case_id.to_string();
        self.get(&url).send(move |result| {
            let result = read_json::<EmailListResponse>(result).map(|list| {
                list.emails
                    .into_iter()
                    .map(|e| e.into_message(&case_id))
                    .collect()
            });
            Event::EmailsLoaded { case_id, result }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_tagged_with_case() {
        let raw = r#"{"emails": [{
            "gmail_id": "18c2f",
            "subject": "Deposition schedule",
            "sender": "opposing@counsel.example",
            "to": "me@firm.example",
            "body_text": "Can we move it to Friday?",
            "date": "Mon, 20 Oct 2025 14:30:00 +0000"
        }]}"#;
        let list: EmailListResponse = serde_json::from_str(raw).unwrap();
        let message = list.emails.into_iter().next().unwrap().into_message("c1");
        assert_eq!(message.id, "18c2f");
        assert_eq!(message.recipient, "me@firm.example");
        assert_eq!(message.case_id, "c1");
        assert!(!message.read);
    }

    #[test]
    fn test_missing_emails_field_is_empty() {
        let list: EmailListResponse = serde_json::from_str("{}").unwrap();
        assert!(list.emails.is_empty());
    }
}
