// src/chapters/validators.rs

use super::models::{CreateChapterRequest, CreatePostRequest};
use crate::common::{ValidationResult, Validator};

pub struct ChapterValidator;

impl Validator<CreateChapterRequest> for ChapterValidator {
    fn validate(&self, data: &CreateChapterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Chapter name is required");
        } else if data.name.len() > 100 {
            result.add_error("name", "Chapter name must be less than 100 characters");
        }

        if let Some(description) = &data.description {
            if description.len() > 2000 {
                result.add_error(
                    "description",
                    "Description must be less than 2000 characters",
                );
            }
        }

        if let Some(region) = &data.region {
            if region.len() > 100 {
                result.add_error("region", "Region must be less than 100 characters");
            }
        }

        result
    }
}

impl Validator<CreatePostRequest> for ChapterValidator {
    fn validate(&self, data: &CreatePostRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.trim().is_empty() {
            result.add_error("title", "Post title is required");
        } else if data.title.len() > 200 {
            result.add_error("title", "Post title must be less than 200 characters");
        }

        if data.body.trim().is_empty() {
            result.add_error("body", "Post body is required");
        } else if data.body.len() > 10_000 {
            result.add_error("body", "Post body must be less than 10000 characters");
        }

        result
    }
}
