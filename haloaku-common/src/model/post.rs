use crate::model::Id;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

pub const PESAN_MAX_LEN: usize = 500;
pub const ANONYMOUS_NAME: &str = "Anonymous";

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// `likes` is never stored on the post itself. Every read derives it from the
/// number of like rows referencing the post at query time.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub name: String,
    pub is_anonymous: bool,
    pub dari: String,
    pub untuk: String,
    pub pesan: String,
    pub likes: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Post {
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.is_anonymous {
            ANONYMOUS_NAME
        } else {
            &self.name
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct CreatePost {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_anonymous: bool,
    pub dari: String,
    pub untuk: String,
    pub pesan: String,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum PostValidationError {
    #[error("A name is required unless the letter is anonymous")]
    MissingName,
    #[error("The sender age (dari) is required")]
    MissingDari,
    #[error("The recipient age (untuk) is required")]
    MissingUntuk,
    #[error("The message (pesan) is required")]
    MissingPesan,
    #[error("The message is {0} characters long, at most {PESAN_MAX_LEN} are allowed")]
    PesanTooLong(usize),
}

/// A submission that passed validation. Only obtainable through
/// [`CreatePost::validate`].
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct ValidatedPost {
    name: String,
    is_anonymous: bool,
    dari: String,
    untuk: String,
    pesan: String,
}

impl CreatePost {
    /// Validation the form applies before submitting: [`CreatePost::validate`]
    /// plus the soft cap of [`PESAN_MAX_LEN`] characters on the message. The
    /// server does not enforce the cap.
    pub fn validate_form(self) -> Result<ValidatedPost, PostValidationError> {
        let pesan_len = self.pesan.chars().count();
        if pesan_len > PESAN_MAX_LEN {
            return Err(PostValidationError::PesanTooLong(pesan_len));
        }

        self.validate()
    }

    pub fn validate(self) -> Result<ValidatedPost, PostValidationError> {
        if !self.is_anonymous && is_blank(&self.name) {
            return Err(PostValidationError::MissingName);
        }
        if is_blank(&self.dari) {
            return Err(PostValidationError::MissingDari);
        }
        if is_blank(&self.untuk) {
            return Err(PostValidationError::MissingUntuk);
        }
        if is_blank(&self.pesan) {
            return Err(PostValidationError::MissingPesan);
        }

        let name = if self.is_anonymous {
            ANONYMOUS_NAME.to_owned()
        } else {
            self.name
        };

        Ok(ValidatedPost {
            name,
            is_anonymous: self.is_anonymous,
            dari: self.dari,
            untuk: self.untuk,
            pesan: self.pesan,
        })
    }
}

impl ValidatedPost {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    #[must_use]
    pub fn dari(&self) -> &str {
        &self.dari
    }

    #[must_use]
    pub fn untuk(&self) -> &str {
        &self.untuk
    }

    #[must_use]
    pub fn pesan(&self) -> &str {
        &self.pesan
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
