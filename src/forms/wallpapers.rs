//! Wallpaper create (batch) and edit forms.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::domain::file::UploadFile;
use crate::domain::types::{CategoryId, Tags, WallpaperTitle};
use crate::domain::wallpaper::{
    UpdateWallpaper, Wallpaper, WallpaperFormat, WallpaperSettings, WallpaperStatus,
};
use crate::forms::{FieldErrors, FormError, is_file_present, read_upload};

fn validate_format(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<WallpaperFormat>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("format").with_message("Unknown format".into()))
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<WallpaperStatus>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("status").with_message("Unknown status".into()))
}

fn text(value: &Option<Text<String>>) -> String {
    value
        .as_ref()
        .map(|t| t.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Plain values of the shared settings block, echoed back into the form when
/// validation fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct WallpaperFields {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Choose a category"))]
    pub parent_category: String,
    pub child_category: String,
    pub tags: String,
    #[validate(custom(function = "validate_format"))]
    pub format: String,
    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

impl WallpaperFields {
    /// Values pre-filled for an existing wallpaper. The category pair is
    /// resolved separately against the category tree.
    pub fn from_wallpaper(wallpaper: &Wallpaper) -> Self {
        Self {
            title: Some(wallpaper.title.clone()),
            parent_category: String::new(),
            child_category: String::new(),
            tags: wallpaper.tags.join(", "),
            format: wallpaper.format.unwrap_or_default().to_string(),
            status: wallpaper.status.to_string(),
        }
    }

    /// Defaults of the create screen.
    pub fn initial() -> Self {
        Self {
            format: WallpaperFormat::default().to_string(),
            status: WallpaperStatus::default().to_string(),
            ..Default::default()
        }
    }

    /// Category stored on the wallpaper: the child when chosen, else the parent.
    pub fn category(&self) -> &str {
        if self.child_category.is_empty() {
            &self.parent_category
        } else {
            &self.child_category
        }
    }

    pub fn settings(&self) -> Result<WallpaperSettings, FormError> {
        self.validate()?;

        let category = CategoryId::new(self.category()).map_err(|_| FormError::InvalidCategory)?;
        let format = self
            .format
            .parse::<WallpaperFormat>()
            .map_err(|e| FormError::Malformed(e.to_string()))?;
        let status = self
            .status
            .parse::<WallpaperStatus>()
            .map_err(|e| FormError::Malformed(e.to_string()))?;

        Ok(WallpaperSettings {
            category,
            tags: Tags::parse(&self.tags),
            format,
            status,
        })
    }
}

#[derive(MultipartForm)]
/// Batch upload: every selected image shares one settings block.
pub struct UploadWallpapersForm {
    #[multipart(limit = "25MB")]
    pub images: Vec<TempFile>,
    /// Optional titles paired with `images` by position.
    pub titles: Vec<Text<String>>,
    pub parent_category: Option<Text<String>>,
    pub child_category: Option<Text<String>>,
    pub tags: Option<Text<String>>,
    pub format: Option<Text<String>>,
    pub status: Option<Text<String>>,
}

/// Validated batch upload request.
#[derive(Debug)]
pub struct UploadWallpapersPayload {
    pub settings: WallpaperSettings,
    /// Files in selection order with their optional title.
    pub files: Vec<(UploadFile, Option<String>)>,
}

impl UploadWallpapersForm {
    pub fn fields(&self) -> WallpaperFields {
        WallpaperFields {
            title: None,
            parent_category: text(&self.parent_category),
            child_category: text(&self.child_category),
            tags: text(&self.tags),
            format: text(&self.format),
            status: text(&self.status),
        }
    }

    /// Validates the settings and reads every selected file. All field errors
    /// are collected before giving up.
    pub fn payload(&self) -> Result<UploadWallpapersPayload, FieldErrors> {
        let mut errors = FieldErrors::new();

        let settings = match self.fields().settings() {
            Ok(settings) => Some(settings),
            Err(e) => {
                errors.merge(FieldErrors::from(&e));
                None
            }
        };

        let mut files = Vec::new();
        let selected = self.images.iter().enumerate().filter(|(_, f)| is_file_present(f));
        for (index, image) in selected {
            match read_upload(image) {
                Ok(file) => {
                    let title = self
                        .titles
                        .get(index)
                        .map(|t| t.as_str().trim().to_string())
                        .filter(|t| !t.is_empty());
                    files.push((file, title));
                }
                Err(e) => errors.add("images", e.to_string()),
            }
        }
        if files.is_empty() && errors.get("images").is_none() {
            errors.add("images", "Select at least one image");
        }

        match settings {
            Some(settings) if errors.is_empty() => Ok(UploadWallpapersPayload { settings, files }),
            _ => Err(errors),
        }
    }
}

#[derive(MultipartForm)]
#[multipart(duplicate_field = "deny")]
/// Edit form; accepts at most one replacement image.
pub struct EditWallpaperForm {
    pub title: Option<Text<String>>,
    #[multipart(limit = "25MB")]
    pub image: Option<TempFile>,
    pub parent_category: Option<Text<String>>,
    pub child_category: Option<Text<String>>,
    pub tags: Option<Text<String>>,
    pub format: Option<Text<String>>,
    pub status: Option<Text<String>>,
}

impl EditWallpaperForm {
    pub fn fields(&self) -> WallpaperFields {
        WallpaperFields {
            title: Some(text(&self.title)),
            parent_category: text(&self.parent_category),
            child_category: text(&self.child_category),
            tags: text(&self.tags),
            format: text(&self.format),
            status: text(&self.status),
        }
    }

    pub fn payload(&self) -> Result<UpdateWallpaper, FormError> {
        let fields = self.fields();
        let settings = fields.settings()?;
        let title = WallpaperTitle::new(fields.title.unwrap_or_default())
            .map_err(|_| FormError::InvalidName)?;
        let image = match &self.image {
            Some(file) if is_file_present(file) => Some(read_upload(file)?),
            _ => None,
        };

        Ok(UpdateWallpaper {
            title,
            settings,
            image,
        })
    }
}
