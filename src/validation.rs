use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::entities::{Post, UploadFile, UserId};
use crate::usecases::account::{create_account, sign_in};
use crate::usecases::post::{create, update};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 2, message = "Too Short"))]
    pub name: String,
    #[validate(length(min = 2, message = "Too Short"))]
    pub username: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be atleast 8 characters"))]
    pub password: String,
}

impl SignUpForm {
    pub fn into_input(self) -> create_account::Input {
        create_account::Input {
            name: self.name,
            username: self.username,
            email: self.email,
            password: self.password,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct SignInForm {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be atleast 8 characters"))]
    pub password: String,
}

impl SignInForm {
    pub fn into_input(self) -> sign_in::Input {
        sign_in::Input {
            email: self.email,
            password: self.password,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct PostForm {
    #[validate(custom(function = "caption_length"))]
    pub caption: String,
    #[validate(custom(function = "location_length"))]
    pub location: String,
    /// Comma separated.
    #[serde(default)]
    pub tags: String,
}

impl PostForm {
    /// Form prefilled from an existing post, tags joined back with commas.
    pub fn from_post(post: &Post) -> Self {
        Self {
            caption: post.caption.clone(),
            location: post.location.clone(),
            tags: post.tags.join(","),
        }
    }

    pub fn into_create(self, creator: UserId, file: UploadFile) -> create::Input {
        create::Input {
            creator,
            caption: self.caption,
            file,
            location: self.location,
            tags: self.tags,
        }
    }

    pub fn into_update(self, post: &Post, file: Option<UploadFile>) -> update::Input {
        update::Input {
            post_id: post.id.clone(),
            caption: self.caption,
            file,
            image_url: post.image_url.clone(),
            image_id: post.image_id.clone(),
            location: self.location,
            tags: self.tags,
        }
    }
}

fn bounded(value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();

    match (len < min, len > max) {
        (true, _) => Err(ValidationError::new("length").with_message(Cow::Borrowed("Too Short"))),
        (_, true) => Err(ValidationError::new("length").with_message(Cow::Borrowed("Too Long"))),
        _ => Ok(()),
    }
}

fn caption_length(caption: &str) -> Result<(), ValidationError> { bounded(caption, 5, 2200) }

fn location_length(location: &str) -> Result<(), ValidationError> { bounded(location, 2, 100) }

/// Messages attached to `field`, in declaration order.
pub fn messages(errors: &ValidationErrors, field: &str) -> Vec<String> {
    errors
        .field_errors()
        .iter()
        .filter(|(name, _)| name.to_string() == field)
        .flat_map(|(_, errs)| errs.iter())
        .map(|e| match &e.message {
            Some(m) => m.to_string(),
            None => e.code.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up() -> SignUpForm {
        SignUpForm {
            name: "Ada Lovelace".to_string(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
        }
    }

    #[test]
    fn sign_up_accepts_valid_form() {
        assert!(sign_up().validate().is_ok());
    }

    #[test]
    fn sign_up_messages() {
        let form = SignUpForm {
            name: "A".to_string(),
            password: "short".to_string(),
            ..sign_up()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(messages(&errors, "name"), vec!["Too Short"]);
        assert_eq!(
            messages(&errors, "password"),
            vec!["Password must be atleast 8 characters"]
        );
        assert!(messages(&errors, "username").is_empty());
    }

    #[test]
    fn sign_in_rejects_bad_email() {
        let errors = SignInForm {
            email: "not-an-email".to_string(),
            password: "long enough".to_string(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(messages(&errors, "email"), vec!["Invalid email"]);
    }

    #[test]
    fn caption_bounds() {
        let form = |caption: String| PostForm {
            caption,
            location: "Kyoto".to_string(),
            tags: String::new(),
        };

        assert!(form("hello".to_string()).validate().is_ok());
        assert_eq!(
            messages(&form("hey".to_string()).validate().unwrap_err(), "caption"),
            vec!["Too Short"]
        );
        assert_eq!(
            messages(&form("x".repeat(2201)).validate().unwrap_err(), "caption"),
            vec!["Too Long"]
        );
        assert!(form("x".repeat(2200)).validate().is_ok());
    }

    #[test]
    fn location_bounds() {
        let errors = PostForm {
            caption: "a caption".to_string(),
            location: "K".to_string(),
            tags: String::new(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(messages(&errors, "location"), vec!["Too Short"]);
    }
}
