//! Form validation for create/update payloads.
//!
//! Every mutation validates its input before anything is sent; failures
//! come back as [`PimError::Validation`](crate::PimError::Validation) with
//! messages grouped per field.

use url::Url;

use crate::error::{Result, ValidationErrors};
use crate::models::{
    AttributeInput, BrandInput, CategoryInput, ImageInput, ProductInput, ProductStatusPatch,
};

const MAX_NAME_LEN: usize = 100;
const MAX_TITLE_LEN: usize = 255;
const MAX_BARCODE_LEN: usize = 64;
const MAX_ATTRIBUTE_KEY_LEN: usize = 100;

/// Derive a URL-safe slug: lowercase ASCII alphanumerics joined by single
/// hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Whether `s` already has the shape [`slugify`] produces.
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn check_required(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "is required");
    } else if trimmed.chars().count() > max {
        errors.add(field, format!("must be at most {} characters", max));
    }
}

fn check_slug(errors: &mut ValidationErrors, slug: &str) {
    if !slug.is_empty() && !is_valid_slug(slug) {
        errors.add("slug", "must contain only lowercase letters, digits and single hyphens");
    }
}

fn check_http_url(errors: &mut ValidationErrors, field: &str, value: &str) {
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {}
        Ok(_) => errors.add(field, "must be an http or https URL"),
        Err(_) => errors.add(field, "must be a valid URL"),
    }
}

impl CategoryInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_required(&mut errors, "name", &self.name, MAX_NAME_LEN);
        check_slug(&mut errors, &self.slug);
        if matches!(self.order, Some(n) if n < 0) {
            errors.add("order", "must not be negative");
        }
        errors.into_result()
    }

    /// Fill an empty slug from the name.
    pub fn with_derived_slug(mut self) -> Self {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.name);
        }
        self
    }
}

impl ProductInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_required(&mut errors, "title", &self.title, MAX_TITLE_LEN);
        check_required(&mut errors, "barcode", &self.barcode, MAX_BARCODE_LEN);
        if !self
            .barcode
            .trim()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            errors.add("barcode", "must contain only letters, digits and hyphens");
        }
        match self.category_id {
            None => errors.add("categoryId", "is required"),
            Some(id) if id <= 0 => errors.add("categoryId", "must be a valid category"),
            Some(_) => {}
        }
        if matches!(self.brand_id, Some(id) if id <= 0) {
            errors.add("brandId", "must be a valid brand");
        }
        if self.status.as_str().trim().is_empty() {
            errors.add("status", "is required");
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                errors.add("price", "must be a non-negative number");
            }
        }
        errors.into_result()
    }
}

impl ProductStatusPatch {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if self.status.as_str().trim().is_empty() {
            errors.add("status", "is required");
        }
        errors.into_result()
    }
}

impl BrandInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_required(&mut errors, "name", &self.name, MAX_NAME_LEN);
        check_slug(&mut errors, &self.slug);
        if let Some(logo) = &self.logo_url {
            if !logo.trim().is_empty() {
                check_http_url(&mut errors, "logoUrl", logo);
            }
        }
        errors.into_result()
    }

    /// Fill an empty slug from the name.
    pub fn with_derived_slug(mut self) -> Self {
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.name);
        }
        self
    }
}

impl ImageInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if self.url.trim().is_empty() {
            errors.add("url", "is required");
        } else {
            check_http_url(&mut errors, "url", &self.url);
        }
        if matches!(self.order, Some(n) if n < 0) {
            errors.add("order", "must not be negative");
        }
        errors.into_result()
    }
}

impl AttributeInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_required(&mut errors, "key", &self.key, MAX_ATTRIBUTE_KEY_LEN);
        errors.into_result()
    }
}
