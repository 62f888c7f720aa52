use atrium_http::{nullable, required_text, AppResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub image: String,
    pub designation: String,
    pub abbr: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewLeader {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "image must not be empty"))]
    pub image: String,
    #[validate(length(min = 1, message = "designation must not be empty"))]
    pub designation: String,
    pub abbr: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
}

impl NewLeader {
    pub fn into_leader(self, id: String) -> Leader {
        Leader {
            id,
            name: self.name,
            image: self.image,
            designation: self.designation,
            abbr: self.abbr,
            featured: self.featured,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub designation: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub abbr: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub featured: Option<Option<bool>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
}

impl LeaderPatch {
    pub fn apply(self, leader: &mut Leader) -> AppResult<()> {
        required_text(&mut leader.name, "name", self.name)?;
        required_text(&mut leader.image, "image", self.image)?;
        required_text(&mut leader.designation, "designation", self.designation)?;
        required_text(&mut leader.description, "description", self.description)?;

        if let Some(abbr) = self.abbr {
            leader.abbr = abbr;
        }
        if let Some(featured) = self.featured {
            leader.featured = featured.unwrap_or_default();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_http::AppError;
    use serde_json::json;

    fn leader() -> Leader {
        NewLeader {
            name: "Peter Pan".into(),
            image: "images/alberto.png".into(),
            designation: "Chief Epicurious Officer".into(),
            abbr: Some("CEO".into()),
            featured: true,
            description: "Our CEO".into(),
        }
        .into_leader("l1".into())
    }

    #[test]
    fn featured_defaults_to_false() {
        let new: NewLeader = serde_json::from_value(json!({
            "name": "Dhanasekaran Witherspoon",
            "image": "images/alberto.png",
            "designation": "Executive Chef",
            "description": "Award winning"
        }))
        .unwrap();

        assert!(new.validate().is_ok());
        assert!(!new.featured);
        assert_eq!(new.abbr, None);
    }

    #[test]
    fn null_clears_abbr_but_not_required_fields() {
        let mut target = leader();
        let patch: LeaderPatch = serde_json::from_value(json!({ "abbr": null })).unwrap();
        patch.apply(&mut target).unwrap();
        assert_eq!(target.abbr, None);

        let patch: LeaderPatch = serde_json::from_value(json!({ "designation": null })).unwrap();
        assert!(matches!(
            patch.apply(&mut target),
            Err(AppError::Validation { .. })
        ));
    }
}
