//! Validated sign-up types.

use chrono::NaiveDate;
use member_store::NewMember;
use serde::{Deserialize, Serialize};

/// Whether the applicant is already in the club's WhatsApp group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhatsappMembership {
    #[serde(rename = "yes")]
    AlreadyMember,
    #[serde(rename = "no")]
    NotMember,
}

impl WhatsappMembership {
    /// Parse the form value (`"yes"` or `"no"`, exact match).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "yes" => Some(WhatsappMembership::AlreadyMember),
            "no" => Some(WhatsappMembership::NotMember),
            _ => None,
        }
    }

    pub fn is_member(self) -> bool {
        self == WhatsappMembership::AlreadyMember
    }
}

/// A sign-up that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Trimmed, at least two characters
    pub name: String,
    /// Trimmed, syntactically valid
    pub email: String,
    /// As entered; 8 to 15 digits once punctuation is stripped
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub whatsapp_membership: WhatsappMembership,
    /// Always true for non-members
    pub invite_opt_in: bool,
    pub updates_opt_in: bool,
}

impl RegistrationRequest {
    /// The record to insert for this request.
    ///
    /// `invited_to_whatsapp` reflects existing membership only; a non-member
    /// who opts in is recorded as still to be invited.
    pub fn to_new_member(&self) -> NewMember {
        NewMember {
            email: self.email.clone(),
            phone: self.phone.clone(),
            name: self.name.clone(),
            date_of_birth: self.date_of_birth,
            invited_to_whatsapp: self.whatsapp_membership.is_member(),
            should_invite_to_whatsapp: self.invite_opt_in,
            should_receive_updates: self.updates_opt_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(membership: WhatsappMembership, invite_opt_in: bool) -> RegistrationRequest {
        RegistrationRequest {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "+254712345678".into(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            whatsapp_membership: membership,
            invite_opt_in,
            updates_opt_in: true,
        }
    }

    #[test]
    fn test_membership_parse() {
        assert_eq!(
            WhatsappMembership::parse("yes"),
            Some(WhatsappMembership::AlreadyMember)
        );
        assert_eq!(
            WhatsappMembership::parse("no"),
            Some(WhatsappMembership::NotMember)
        );
        assert_eq!(WhatsappMembership::parse("Yes"), None);
        assert_eq!(WhatsappMembership::parse(""), None);
    }

    #[test]
    fn test_membership_serialization() {
        let json = serde_json::to_string(&WhatsappMembership::AlreadyMember).unwrap();
        assert_eq!(json, "\"yes\"");
        let json = serde_json::to_string(&WhatsappMembership::NotMember).unwrap();
        assert_eq!(json, "\"no\"");
    }

    #[test]
    fn test_existing_member_is_marked_invited() {
        let member = request(WhatsappMembership::AlreadyMember, false).to_new_member();
        assert!(member.invited_to_whatsapp);
        assert!(!member.should_invite_to_whatsapp);
    }

    #[test]
    fn test_non_member_opt_in_is_not_marked_invited() {
        let member = request(WhatsappMembership::NotMember, true).to_new_member();
        assert!(!member.invited_to_whatsapp);
        assert!(member.should_invite_to_whatsapp);
        assert!(member.should_receive_updates);
        assert_eq!(member.phone, "+254712345678");
    }
}
