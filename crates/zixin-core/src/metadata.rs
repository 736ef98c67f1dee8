//! Badge metadata assembly.
//!
//! [`MetadataAssembler::assemble`] is pure: the same profile, image and
//! template always produce the same [`BadgeMetadata`], and the canonical JSON
//! form preserves field and attribute order.
//!
//! Nothing is defaulted: `image` and `externalLink` are omitted when there is
//! nothing to link, attribute values are `null` when the provider did not
//! report them, and description placeholders without a value render empty.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::ComposedImage;
use crate::profile::{NormalizedProfile, ProviderKind};
use crate::program::BadgeTemplate;

/// Value of one metadata attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(u64),
    Text(String),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

/// One `(trait_type, value)` pair. A `None` value serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: Option<AttributeValue>,
}

impl Attribute {
    fn text(trait_type: &str, value: Option<&str>) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: value.map(AttributeValue::from),
        }
    }

    fn number(trait_type: &str, value: Option<u64>) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: value.map(AttributeValue::Number),
        }
    }
}

/// NFT metadata document stored for a soulbound badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeMetadata {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        rename = "externalLink",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_link: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl BadgeMetadata {
    /// Compact JSON in declaration order, as submitted to the storage relay.
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up an attribute by trait name.
    pub fn attribute(&self, trait_type: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.trait_type == trait_type)
    }
}

/// Builds badge metadata.
pub struct MetadataAssembler;

impl MetadataAssembler {
    pub fn assemble(
        profile: &NormalizedProfile,
        image: &ComposedImage,
        template: &BadgeTemplate,
    ) -> BadgeMetadata {
        BadgeMetadata {
            name: format!("{}{}", template.name_prefix, profile.display_name),
            description: render_description(&template.description, profile),
            image: Some(image.url.clone()),
            external_link: external_link(profile),
            attributes: attributes(profile),
        }
    }
}

/// Fill `{display_name}`, `{email}` and `{bio}` placeholders.
pub fn render_description(template: &str, profile: &NormalizedProfile) -> String {
    let attrs = &profile.attributes;
    template
        .replace("{display_name}", &profile.display_name)
        .replace("{email}", attrs.email.as_deref().unwrap_or_default())
        .replace("{bio}", attrs.bio.as_deref().unwrap_or_default())
}

fn external_link(profile: &NormalizedProfile) -> Option<String> {
    match profile.provider {
        ProviderKind::GitHub => profile.attributes.blog.clone(),
        ProviderKind::Facebook | ProviderKind::Google => None,
    }
}

fn attributes(profile: &NormalizedProfile) -> Vec<Attribute> {
    let a = &profile.attributes;
    match profile.provider {
        ProviderKind::Facebook => vec![Attribute::text("id", Some(&profile.id))],
        ProviderKind::Google => vec![
            Attribute::text("id", Some(&profile.id)),
            Attribute::text("locale", a.locale.as_deref()),
            Attribute::text("Given Name", a.given_name.as_deref()),
            Attribute::text("Family Name", a.family_name.as_deref()),
        ],
        ProviderKind::GitHub => vec![
            Attribute::text("Email", a.email.as_deref()),
            Attribute::text("Company", a.company.as_deref()),
            Attribute::text("Location", a.location.as_deref()),
            Attribute::text("Twitter", a.twitter_username.as_deref()),
            Attribute::number("Followers", a.followers),
            Attribute::number("Following", a.following),
            Attribute::number("Public Repos", a.public_repos),
            Attribute::number("Public Gists", a.public_gists),
            Attribute::text("Created At", a.created_at.as_deref()),
            Attribute::text("Updated At", a.updated_at.as_deref()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileAttributes;
    use crate::program::BuiltinProgram;

    fn github_profile() -> NormalizedProfile {
        NormalizedProfile::new(ProviderKind::GitHub, "583231", "octocat", "https://avatar/1")
            .with_attributes(ProfileAttributes {
                bio: Some("Mascot".to_string()),
                blog: Some("https://github.blog".to_string()),
                company: Some("@github".to_string()),
                followers: Some(12),
                following: Some(9),
                public_repos: Some(8),
                created_at: Some("2011-01-25T18:44:36Z".to_string()),
                ..ProfileAttributes::default()
            })
    }

    fn image() -> ComposedImage {
        ComposedImage {
            url: "https://cdn.example/badge.png".to_string(),
        }
    }

    #[test]
    fn test_github_metadata() {
        let template = BuiltinProgram::GitHubZixin.program().template;
        let metadata = MetadataAssembler::assemble(&github_profile(), &image(), &template);

        assert_eq!(metadata.name, "Zixin | Github |octocat");
        assert_eq!(metadata.description, "Mascot");
        assert_eq!(metadata.image.as_deref(), Some("https://cdn.example/badge.png"));
        assert_eq!(metadata.external_link.as_deref(), Some("https://github.blog"));
        assert_eq!(metadata.attributes.len(), 10);
        assert_eq!(
            metadata.attribute("Followers").unwrap().value,
            Some(AttributeValue::Number(12))
        );
        assert_eq!(metadata.attribute("Email").unwrap().value, None);
        assert_eq!(metadata.attributes[0].trait_type, "Email");
        assert_eq!(metadata.attributes[9].trait_type, "Updated At");
    }

    #[test]
    fn test_facebook_metadata() {
        let profile = NormalizedProfile::new(ProviderKind::Facebook, "1022", "Ada", "p");
        let template = BuiltinProgram::FacebookZixin.program().template;
        let metadata = MetadataAssembler::assemble(&profile, &image(), &template);

        assert_eq!(metadata.name, "Zixin | Facebook |Ada");
        assert_eq!(
            metadata.description,
            "A soulbound NFT that represents the ownership of Facebook account of Ada"
        );
        assert!(metadata.external_link.is_none());
        assert_eq!(
            metadata.attributes,
            vec![Attribute {
                trait_type: "id".to_string(),
                value: Some(AttributeValue::Text("1022".to_string())),
            }]
        );
    }

    #[test]
    fn test_google_metadata_carries_absent_as_null() {
        let profile = NormalizedProfile::new(ProviderKind::Google, "1089", "Ada Lovelace", "p")
            .with_attributes(ProfileAttributes {
                email: Some("ada@example.com".to_string()),
                given_name: Some("Ada".to_string()),
                ..ProfileAttributes::default()
            });
        let template = BuiltinProgram::GoogleZixin.program().template;
        let metadata = MetadataAssembler::assemble(&profile, &image(), &template);

        assert_eq!(metadata.name, "Zixin | Google |Ada Lovelace");
        assert!(metadata.description.ends_with("Google account ada@example.com"));
        let names: Vec<&str> = metadata.attributes.iter().map(|a| a.trait_type.as_str()).collect();
        assert_eq!(names, vec!["id", "locale", "Given Name", "Family Name"]);
        assert_eq!(metadata.attribute("locale").unwrap().value, None);

        let json = metadata.to_canonical_json().unwrap();
        assert!(json.contains(r#"{"trait_type":"locale","value":null}"#));
    }

    #[test]
    fn test_missing_bio_renders_empty_description() {
        let mut profile = github_profile();
        profile.attributes.bio = None;
        let template = BuiltinProgram::GitHubZixin.program().template;
        assert_eq!(MetadataAssembler::assemble(&profile, &image(), &template).description, "");
    }

    #[test]
    fn test_absent_github_fields_are_not_defaulted() {
        let mut profile = github_profile();
        profile.attributes.blog = None;
        profile.attributes.bio = None;
        let template = BuiltinProgram::GitHubZixin.program().template;
        let metadata = MetadataAssembler::assemble(&profile, &image(), &template);
        let json = metadata.to_canonical_json().unwrap();

        assert!(metadata.external_link.is_none());
        assert!(!json.contains("externalLink"));
        assert!(json.contains(r#""description":"""#));
        assert!(json.contains(r#"{"trait_type":"Twitter","value":null}"#));
    }

    #[test]
    fn test_canonical_json_field_order() {
        let template = BuiltinProgram::GitHubMrPopular.program().template;
        let metadata = MetadataAssembler::assemble(&github_profile(), &image(), &template);
        let json = metadata.to_canonical_json().unwrap();

        let name_at = json.find("\"name\"").unwrap();
        let description_at = json.find("\"description\"").unwrap();
        let image_at = json.find("\"image\"").unwrap();
        let link_at = json.find("\"externalLink\"").unwrap();
        let attributes_at = json.find("\"attributes\"").unwrap();
        assert!(name_at < description_at);
        assert!(description_at < image_at);
        assert!(image_at < link_at);
        assert!(link_at < attributes_at);
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let template = BuiltinProgram::GitHubZixin.program().template;
        let metadata = MetadataAssembler::assemble(&github_profile(), &image(), &template);
        let json = metadata.to_canonical_json().unwrap();
        let parsed = BadgeMetadata::from_json(&json).unwrap();

        assert_eq!(parsed.name, metadata.name);
        assert_eq!(parsed.description, metadata.description);
        assert_eq!(parsed.attributes, metadata.attributes);
        assert_eq!(parsed.to_canonical_json().unwrap(), json);
    }
}
