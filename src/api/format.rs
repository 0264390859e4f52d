// Wire-format helpers for profile responses.
use serde_json::{json, Value};

use crate::store::ProfileWithOwner;

/// Render a profile with its `user` reference expanded to the owner's
/// display fields, the shape list/lookup endpoints return.
pub fn profile_with_owner(expanded: &ProfileWithOwner) -> Value {
    let mut value = json!(&expanded.profile);
    if let Value::Object(map) = &mut value {
        map.insert("user".to_string(), json!(&expanded.owner));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Profile, Social};
    use crate::store::OwnerRef;
    use uuid::Uuid;

    #[test]
    fn user_field_becomes_owner_object() {
        let user_id = Uuid::new_v4();
        let expanded = ProfileWithOwner {
            profile: Profile {
                id: Uuid::new_v4(),
                user: user_id,
                company: None,
                location: None,
                website: None,
                bio: None,
                status: "Developer".to_string(),
                githubusername: None,
                skills: vec!["Rust".to_string()],
                social: Social::default(),
                experience: Vec::new(),
                education: Vec::new(),
                updated_at: chrono::Utc::now(),
            },
            owner: OwnerRef {
                id: user_id,
                name: "Dev".to_string(),
                avatar: None,
            },
        };

        let value = profile_with_owner(&expanded);
        assert_eq!(value["user"]["name"], "Dev");
        assert_eq!(value["user"]["id"], json!(user_id));
        assert_eq!(value["status"], "Developer");
    }
}
