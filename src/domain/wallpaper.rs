use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::file::UploadFile;
use crate::domain::types::{CategoryId, Tags, TypeConstraintError, WallpaperId, WallpaperTitle};

/// Category reference as sent by the backend: either the raw id or the
/// populated `{ _id, name }` document.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CategoryRef {
    Embedded {
        #[serde(rename = "_id")]
        id: CategoryId,
        name: String,
    },
    Id(CategoryId),
}

impl CategoryRef {
    pub fn id(&self) -> &CategoryId {
        match self {
            CategoryRef::Embedded { id, .. } => id,
            CategoryRef::Id(id) => id,
        }
    }

    /// Display name when the reference was populated.
    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryRef::Embedded { name, .. } => Some(name.as_str()),
            CategoryRef::Id(_) => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Wallpaper {
    #[serde(rename = "_id")]
    pub id: WallpaperId,
    pub title: String,
    pub image: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub format: Option<WallpaperFormat>,
    #[serde(default)]
    pub status: WallpaperStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperFormat {
    #[default]
    #[serde(alias = "jpeg")]
    Jpg,
    Png,
    Webp,
}

impl WallpaperFormat {
    pub const ALL: [WallpaperFormat; 3] = [Self::Jpg, Self::Png, Self::Webp];

    pub fn as_str(&self) -> &'static str {
        match self {
            WallpaperFormat::Jpg => "jpg",
            WallpaperFormat::Png => "png",
            WallpaperFormat::Webp => "webp",
        }
    }
}

impl Display for WallpaperFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WallpaperFormat {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(WallpaperFormat::Jpg),
            "png" => Ok(WallpaperFormat::Png),
            "webp" => Ok(WallpaperFormat::Webp),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown format '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

impl WallpaperStatus {
    pub const ALL: [WallpaperStatus; 3] = [Self::Active, Self::Inactive, Self::Draft];

    pub fn as_str(&self) -> &'static str {
        match self {
            WallpaperStatus::Active => "active",
            WallpaperStatus::Inactive => "inactive",
            WallpaperStatus::Draft => "draft",
        }
    }
}

impl Display for WallpaperStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WallpaperStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(WallpaperStatus::Active),
            "inactive" => Ok(WallpaperStatus::Inactive),
            "draft" => Ok(WallpaperStatus::Draft),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown status '{other}'"
            ))),
        }
    }
}

/// Settings shared by every file of a batch upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WallpaperSettings {
    pub category: CategoryId,
    pub tags: Tags,
    pub format: WallpaperFormat,
    pub status: WallpaperStatus,
}

/// Multipart payload for `POST /wallpapers`.
#[derive(Clone, Debug)]
pub struct NewWallpaper {
    pub title: WallpaperTitle,
    pub settings: WallpaperSettings,
    pub image: UploadFile,
}

/// Multipart payload for `PUT /wallpapers/:id`; the image is only replaced
/// when provided.
#[derive(Clone, Debug)]
pub struct UpdateWallpaper {
    pub title: WallpaperTitle,
    pub settings: WallpaperSettings,
    pub image: Option<UploadFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ref_accepts_raw_id_and_populated_object() {
        let raw: CategoryRef = serde_json::from_str("\"c1\"").unwrap();
        assert_eq!(raw.id().as_str(), "c1");
        assert_eq!(raw.name(), None);

        let populated: CategoryRef =
            serde_json::from_str(r#"{"_id":"c2","name":"Nature","slug":"nature"}"#).unwrap();
        assert_eq!(populated.id().as_str(), "c2");
        assert_eq!(populated.name(), Some("Nature"));
    }

    #[test]
    fn wallpaper_deserializes_backend_document() {
        let json = r#"{
            "_id": "w1",
            "title": "Sunset",
            "image": "https://cdn.example.com/w1.webp",
            "thumbnail": "https://cdn.example.com/w1_thumb.webp",
            "category": {"_id": "c1", "name": "Nature"},
            "tags": ["sun", "sea"],
            "format": "jpeg",
            "status": "draft",
            "createdAt": "2024-05-01T10:00:00.000Z"
        }"#;

        let wallpaper: Wallpaper = serde_json::from_str(json).unwrap();
        assert_eq!(wallpaper.id.as_str(), "w1");
        assert_eq!(wallpaper.format, Some(WallpaperFormat::Jpg));
        assert_eq!(wallpaper.status, WallpaperStatus::Draft);
        assert_eq!(wallpaper.category.unwrap().name(), Some("Nature"));
        assert!(wallpaper.created_at.is_some());
    }

    #[test]
    fn wallpaper_tolerates_missing_optional_fields() {
        let json = r#"{"_id": "w2", "title": "Plain", "image": "x.png", "category": "c9"}"#;
        let wallpaper: Wallpaper = serde_json::from_str(json).unwrap();
        assert_eq!(wallpaper.status, WallpaperStatus::Active);
        assert!(wallpaper.tags.is_empty());
        assert_eq!(wallpaper.category, Some(CategoryRef::Id(CategoryId::new("c9").unwrap())));
    }

    #[test]
    fn format_and_status_parse_case_insensitively() {
        assert_eq!("PNG".parse::<WallpaperFormat>(), Ok(WallpaperFormat::Png));
        assert_eq!("Inactive".parse::<WallpaperStatus>(), Ok(WallpaperStatus::Inactive));
        assert!("gif".parse::<WallpaperFormat>().is_err());
    }
}
